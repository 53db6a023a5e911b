use serde::{Deserialize, Serialize};

use crate::data::loader::DataLoader;
use crate::error::{Result, TrainError};
use crate::eval::frozen::Frozen;
use crate::loss::criterion::Criterion;
use crate::network::model::Model;
use crate::task::correctness::Correctness;

/// Accuracy and mean loss over one pass of a held-out loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fraction of correct examples, in [0, 1].
    pub accuracy: f64,
    /// Example-weighted mean loss.
    pub mean_loss: f64,
    pub samples: usize,
}

/// Runs `model` frozen over `loader` in index order.
///
/// Batch losses are weighted by batch size, so a short final batch counts
/// exactly as much as its examples. The model's mode is restored on every
/// path out of this function.
pub fn evaluate<M: Model>(
    model: &mut M,
    loader: &DataLoader,
    criterion: &dyn Criterion,
    correctness: &dyn Correctness,
) -> Result<Evaluation> {
    let frozen = Frozen::new(model);

    let mut loss_sum = 0.0;
    let mut correct = 0usize;
    let mut samples = 0usize;

    for batch in loader.in_order() {
        let batch = batch?;
        let outputs: Vec<Vec<f64>> = batch.inputs.iter().map(|x| frozen.infer(x)).collect();

        loss_sum += criterion.batch_loss(&outputs, &batch.targets) * batch.len() as f64;
        for (output, target) in outputs.iter().zip(&batch.targets) {
            if correctness.is_correct(output, target)? {
                correct += 1;
            }
        }
        samples += batch.len();
    }

    if samples == 0 {
        return Err(TrainError::config("evaluation loader yielded no samples"));
    }

    Ok(Evaluation {
        accuracy: correct as f64 / samples as f64,
        mean_loss: loss_sum / samples as f64,
        samples,
    })
}
