use std::ops::Deref;

use crate::network::model::Model;

/// Holds a model in frozen (inference) mode for as long as the guard lives.
///
/// The previous mode is restored on drop, which covers early returns and
/// unwinding. While frozen the model is only reachable through `&M`, so
/// nothing can touch its parameters.
pub struct Frozen<'a, M: Model> {
    model: &'a mut M,
    was_training: bool,
}

impl<'a, M: Model> Frozen<'a, M> {
    pub fn new(model: &'a mut M) -> Frozen<'a, M> {
        let was_training = model.is_training();
        model.set_training(false);
        Frozen { model, was_training }
    }
}

impl<M: Model> Deref for Frozen<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: Model> Drop for Frozen<'_, M> {
    fn drop(&mut self) {
        self.model.set_training(self.was_training);
    }
}
