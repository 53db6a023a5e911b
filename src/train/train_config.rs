use std::sync::mpsc;

use crate::train::events::TrainEvent;

/// Cadences and budget for one `TrainingSession`.
///
/// # Fields
/// - `total_steps`       — optimizer steps after which the run ends, even
///                         mid-pass
/// - `loss_report_every` — batches (within a pass) per loss report
/// - `eval_every`        — batches (within a pass) per evaluation; one more
///                         evaluation always runs at the final step
/// - `progress_tx`       — optional channel receiving one `TrainEvent` per
///                         report and evaluation
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub total_steps: usize,
    pub loss_report_every: usize,
    pub eval_every: usize,
    pub progress_tx: Option<mpsc::Sender<TrainEvent>>,
}

impl LoopConfig {
    /// Creates a `LoopConfig` with no progress channel.
    pub fn new(total_steps: usize, loss_report_every: usize, eval_every: usize) -> Self {
        LoopConfig {
            total_steps,
            loss_report_every,
            eval_every,
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<TrainEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}
