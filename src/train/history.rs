use serde::{Deserialize, Serialize};

use crate::eval::evaluator::Evaluation;

/// Test loss and accuracy, one entry per evaluation, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveHistory {
    pub losses: Vec<f64>,
    pub accuracies: Vec<f64>,
}

impl CurveHistory {
    pub fn record(&mut self, evaluation: &Evaluation) {
        self.losses.push(evaluation.mean_loss);
        self.accuracies.push(evaluation.accuracy);
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }
}
