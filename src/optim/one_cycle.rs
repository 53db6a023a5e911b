use std::f64::consts::PI;

use crate::error::{Result, TrainError};
use crate::optim::optimizer::Optimizer;

/// Shape of a one-cycle learning-rate policy.
///
/// The rate starts at `max_lr / div_factor`, rises to `max_lr` over the
/// first `pct_start` of `total_steps`, then anneals to
/// `max_lr / div_factor / final_div_factor` at the last step. Both legs use
/// cosine annealing. Momentum moves the opposite way between
/// `max_momentum` and `base_momentum`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneCyclePolicy {
    pub max_lr: f64,
    pub total_steps: usize,
    pub pct_start: f64,
    pub div_factor: f64,
    pub final_div_factor: f64,
    pub cycle_momentum: bool,
    pub base_momentum: f64,
    pub max_momentum: f64,
}

impl OneCyclePolicy {
    pub fn new(max_lr: f64, total_steps: usize, pct_start: f64) -> OneCyclePolicy {
        OneCyclePolicy {
            max_lr,
            total_steps,
            pct_start,
            div_factor: 25.0,
            final_div_factor: 1e4,
            cycle_momentum: true,
            base_momentum: 0.85,
            max_momentum: 0.95,
        }
    }

    pub fn initial_lr(&self) -> f64 {
        self.max_lr / self.div_factor
    }

    pub fn min_lr(&self) -> f64 {
        self.initial_lr() / self.final_div_factor
    }

    fn validate(&self) -> Result<()> {
        if self.total_steps == 0 {
            return Err(TrainError::schedule("one-cycle total_steps must be at least 1"));
        }
        if !(self.pct_start > 0.0 && self.pct_start < 1.0) {
            return Err(TrainError::schedule(format!(
                "one-cycle pct_start must lie in (0, 1), got {}",
                self.pct_start
            )));
        }
        if !(self.max_lr > 0.0) || !(self.div_factor > 0.0) || !(self.final_div_factor > 0.0) {
            return Err(TrainError::schedule("one-cycle rates and div factors must be positive"));
        }
        Ok(())
    }

    // Last step index of the warmup leg.
    fn warmup_end(&self) -> f64 {
        (self.pct_start * self.total_steps as f64 - 1.0).max(0.0)
    }

    // `(in_warmup, progress within that leg)` for `step`.
    fn phase(&self, step: usize) -> (bool, f64) {
        let step = step as f64;
        let warmup_end = self.warmup_end();
        if step <= warmup_end {
            (true, progress(step, 0.0, warmup_end))
        } else {
            let last = (self.total_steps - 1) as f64;
            (false, progress(step, warmup_end, last))
        }
    }

    /// Learning rate after `step` completed steps.
    pub fn lr_at(&self, step: usize) -> f64 {
        match self.phase(step) {
            (true, pct) => anneal_cos(self.initial_lr(), self.max_lr, pct),
            (false, pct) => anneal_cos(self.max_lr, self.min_lr(), pct),
        }
    }

    /// Momentum after `step` completed steps.
    pub fn momentum_at(&self, step: usize) -> f64 {
        match self.phase(step) {
            (true, pct) => anneal_cos(self.max_momentum, self.base_momentum, pct),
            (false, pct) => anneal_cos(self.base_momentum, self.max_momentum, pct),
        }
    }
}

fn progress(step: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        1.0
    } else {
        ((step - start) / (end - start)).clamp(0.0, 1.0)
    }
}

/// Cosine interpolation from `start` (pct = 0) to `end` (pct = 1).
fn anneal_cos(start: f64, end: f64, pct: f64) -> f64 {
    end + (start - end) / 2.0 * ((PI * pct).cos() + 1.0)
}

/// Drives an optimizer's learning rate (and momentum) along a one-cycle
/// policy. Owns the optimizer for the whole run.
///
/// [`OneCycle::step`] must be called exactly once after every optimizer
/// step. Calling it more than `total_steps` times is an error rather than
/// an extrapolation.
pub struct OneCycle<O: Optimizer> {
    optimizer: O,
    policy: OneCyclePolicy,
    steps_taken: usize,
}

impl<O: Optimizer> OneCycle<O> {
    pub fn new(mut optimizer: O, policy: OneCyclePolicy) -> Result<OneCycle<O>> {
        policy.validate()?;
        optimizer.set_learning_rate(policy.lr_at(0));
        if policy.cycle_momentum {
            optimizer.set_momentum(policy.momentum_at(0));
        }
        Ok(OneCycle { optimizer, policy, steps_taken: 0 })
    }

    /// Advances the schedule by one completed optimizer step.
    pub fn step(&mut self) -> Result<()> {
        if self.steps_taken >= self.policy.total_steps {
            return Err(TrainError::schedule(format!(
                "tried to step {} times; the schedule was built for {} total steps",
                self.steps_taken + 1,
                self.policy.total_steps
            )));
        }
        self.steps_taken += 1;
        self.optimizer.set_learning_rate(self.policy.lr_at(self.steps_taken));
        if self.policy.cycle_momentum {
            self.optimizer.set_momentum(self.policy.momentum_at(self.steps_taken));
        }
        Ok(())
    }

    pub fn current_lr(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn policy(&self) -> &OneCyclePolicy {
        &self.policy
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut O {
        &mut self.optimizer
    }
}
