/// Model state captured at an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    pub accuracy: f64,
    pub step: usize,
    pub state: S,
}

/// Keeps the single highest-accuracy snapshot of a run.
///
/// Only a strictly greater accuracy replaces the held snapshot, so the
/// earliest of tied results wins. States are captured by value.
#[derive(Debug, Clone)]
pub struct BestSnapshot<S> {
    best: Option<Snapshot<S>>,
}

impl<S> Default for BestSnapshot<S> {
    fn default() -> Self {
        BestSnapshot { best: None }
    }
}

impl<S> BestSnapshot<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers an evaluation result. `capture` runs only when the result
    /// improves on the held one. Returns whether it did.
    pub fn observe(&mut self, accuracy: f64, step: usize, capture: impl FnOnce() -> S) -> bool {
        let improved = match &self.best {
            None => true,
            Some(best) => accuracy > best.accuracy,
        };
        if improved {
            self.best = Some(Snapshot { accuracy, step, state: capture() });
        }
        improved
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.accuracy)
    }

    pub fn best(&self) -> Option<&Snapshot<S>> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<Snapshot<S>> {
        self.best
    }
}
