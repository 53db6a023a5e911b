use serde::{Deserialize, Serialize};

use crate::eval::evaluator::Evaluation;

/// Windowed training-loss report, emitted every `loss_report_every`
/// batches of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossReport {
    /// Optimizer steps completed so far in the run.
    pub step: usize,
    pub total_steps: usize,
    /// 1-based batch number within the current pass.
    pub batch: usize,
    /// Mean batch loss since the previous report of this pass.
    pub mean_loss: f64,
    pub lr: f64,
}

/// Result of one periodic (or final) evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub step: usize,
    pub evaluation: Evaluation,
    /// Whether this evaluation replaced the best snapshot.
    pub improved: bool,
}

/// Progress events sent on `LoopConfig::progress_tx`.
///
/// Receivers (tests, dashboards) get events in the order they happen. A
/// dropped receiver does not stop training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainEvent {
    Loss(LossReport),
    Evaluation(EvalReport),
}
