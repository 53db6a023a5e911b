use serde::{Deserialize, Serialize};

use crate::network::model::Param;
use crate::optim::{adamw::AdamW, sgd::Sgd};

/// A first-order optimizer over a model's parameters.
///
/// "Momentum" is β1 for the Adam family and the momentum factor for SGD;
/// the one-cycle schedule cycles it inversely to the learning rate.
pub trait Optimizer {
    /// Applies one update from the gradients accumulated in `params`.
    fn step(&mut self, params: Vec<Param<'_>>);

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, lr: f64);

    fn momentum(&self) -> f64;

    fn set_momentum(&mut self, momentum: f64);
}

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn step(&mut self, params: Vec<Param<'_>>) {
        (**self).step(params)
    }

    fn learning_rate(&self) -> f64 {
        (**self).learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f64) {
        (**self).set_learning_rate(lr)
    }

    fn momentum(&self) -> f64 {
        (**self).momentum()
    }

    fn set_momentum(&mut self, momentum: f64) {
        (**self).set_momentum(momentum)
    }
}

/// Optimizer selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    AdamW,
    Sgd,
}

impl OptimizerKind {
    /// Builds the optimizer with its default hyperparameters. The learning
    /// rate is overwritten by the schedule before the first step.
    pub fn build(self, learning_rate: f64) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::AdamW => Box::new(AdamW::new(learning_rate)),
            OptimizerKind::Sgd => Box::new(Sgd::new(learning_rate, 0.9)),
        }
    }
}
