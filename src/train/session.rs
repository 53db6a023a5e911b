use std::fmt;
use std::sync::mpsc;

use tracing::{debug, info};

use crate::data::loader::{Batch, DataLoader};
use crate::error::{Result, TrainError};
use crate::eval::evaluator::evaluate;
use crate::loss::criterion::Criterion;
use crate::network::model::Model;
use crate::optim::one_cycle::OneCycle;
use crate::optim::optimizer::Optimizer;
use crate::task::correctness::Correctness;
use crate::train::best::{BestSnapshot, Snapshot};
use crate::train::events::{EvalReport, LossReport, TrainEvent};
use crate::train::history::CurveHistory;
use crate::train::train_config::LoopConfig;

/// Lifecycle of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Parts assembled, nothing checked or run yet.
    Warming,
    /// Inside the step loop.
    Running,
    /// Step budget reached.
    Done,
}

/// Everything a session owns for the duration of a run.
pub struct SessionParts<M: Model, O: Optimizer> {
    pub model: M,
    pub criterion: Box<dyn Criterion>,
    pub correctness: Box<dyn Correctness>,
    pub schedule: OneCycle<O>,
    pub train_loader: DataLoader,
    pub test_loader: DataLoader,
    pub config: LoopConfig,
}

/// What a run leaves behind.
#[derive(Debug, Clone)]
pub struct RunOutcome<S> {
    /// Optimizer steps completed.
    pub steps: usize,
    pub history: CurveHistory,
    pub best: Option<Snapshot<S>>,
}

/// A run that stopped on an error, with whatever it had produced so far.
pub struct RunAborted<S> {
    pub error: TrainError,
    pub partial: RunOutcome<S>,
}

impl<S> fmt::Debug for RunAborted<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunAborted")
            .field("error", &self.error)
            .field("steps", &self.partial.steps)
            .field("evaluations", &self.partial.history.len())
            .finish()
    }
}

impl<S> fmt::Display for RunAborted<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "training aborted after {} steps: {}", self.partial.steps, self.error)
    }
}

impl<S> std::error::Error for RunAborted<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Drives optimization for a fixed step budget, evaluating on a cadence
/// and keeping the best snapshot.
///
/// Each step is: zero gradients, forward, loss, backward, optimizer step,
/// schedule step. The run ends the moment the step counter reaches
/// `total_steps`, after one last evaluation, even in the middle of a pass.
pub struct TrainingSession<M: Model, O: Optimizer> {
    phase: Phase,
    model: M,
    criterion: Box<dyn Criterion>,
    correctness: Box<dyn Correctness>,
    schedule: OneCycle<O>,
    train_loader: DataLoader,
    test_loader: DataLoader,
    config: LoopConfig,
    num_steps: usize,
    history: CurveHistory,
    best: BestSnapshot<M::State>,
}

impl<M: Model, O: Optimizer> TrainingSession<M, O> {
    pub fn new(parts: SessionParts<M, O>) -> Self {
        TrainingSession {
            phase: Phase::Warming,
            model: parts.model,
            criterion: parts.criterion,
            correctness: parts.correctness,
            schedule: parts.schedule,
            train_loader: parts.train_loader,
            test_loader: parts.test_loader,
            config: parts.config,
            num_steps: 0,
            history: CurveHistory::default(),
            best: BestSnapshot::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn steps(&self) -> usize {
        self.num_steps
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Runs to the step budget.
    pub fn run(mut self) -> std::result::Result<RunOutcome<M::State>, RunAborted<M::State>> {
        if let Err(error) = self.check_ready() {
            return Err(self.abort(error));
        }
        self.phase = Phase::Running;
        info!(
            total_steps = self.config.total_steps,
            train_batches = self.train_loader.num_batches(),
            test_samples = self.test_loader.num_samples(),
            "training started"
        );

        let mut pass = 0usize;
        loop {
            pass += 1;
            debug!(pass, step = self.num_steps, "starting pass");
            match self.run_pass() {
                Ok(true) => break,
                Ok(false) => continue,
                Err(error) => return Err(self.abort(error)),
            }
        }

        self.phase = Phase::Done;
        info!(steps = self.num_steps, best_accuracy = ?self.best.accuracy(), "training finished");
        Ok(self.into_outcome())
    }

    fn check_ready(&self) -> Result<()> {
        let total = self.config.total_steps;
        if total == 0 {
            return Err(TrainError::config("total_steps must be at least 1"));
        }
        if self.config.loss_report_every == 0 || self.config.eval_every == 0 {
            return Err(TrainError::config("reporting and evaluation cadences must be at least 1"));
        }
        if self.schedule.policy().total_steps != total || self.schedule.steps_taken() != 0 {
            return Err(TrainError::config(format!(
                "schedule is built for {} steps ({} taken) but the run budget is {}",
                self.schedule.policy().total_steps,
                self.schedule.steps_taken(),
                total
            )));
        }
        if self.train_loader.num_batches() == 0 {
            return Err(TrainError::config(format!(
                "training partition has {} samples, fewer than one batch of {}",
                self.train_loader.dataset().len(),
                self.train_loader.batch_size()
            )));
        }
        if self.test_loader.num_samples() == 0 {
            return Err(TrainError::config(format!(
                "test partition has {} samples, fewer than one batch of {}",
                self.test_loader.dataset().len(),
                self.test_loader.batch_size()
            )));
        }
        Ok(())
    }

    /// One pass over the training loader. Returns `true` once the step
    /// budget is reached.
    fn run_pass(&mut self) -> Result<bool> {
        let total = self.config.total_steps;
        let mut running_loss = 0.0;

        for (i, batch) in self.train_loader.epoch().enumerate() {
            let batch = batch?;
            let loss = train_step(&mut self.model, self.criterion.as_ref(), &mut self.schedule, &batch)?;
            self.num_steps += 1;
            running_loss += loss;

            let batch_number = i + 1;
            if batch_number % self.config.loss_report_every == 0 {
                let report = LossReport {
                    step: self.num_steps,
                    total_steps: total,
                    batch: batch_number,
                    mean_loss: running_loss / self.config.loss_report_every as f64,
                    lr: self.schedule.current_lr(),
                };
                info!(
                    "[{}/{}, {:5}] loss: {:.4}, lr: {:.5}",
                    report.step, report.total_steps, report.batch, report.mean_loss, report.lr
                );
                emit(&self.config.progress_tx, TrainEvent::Loss(report));
                running_loss = 0.0;
            }

            if batch_number % self.config.eval_every == 0 || self.num_steps >= total {
                let evaluation = evaluate(
                    &mut self.model,
                    &self.test_loader,
                    self.criterion.as_ref(),
                    self.correctness.as_ref(),
                )?;
                self.history.record(&evaluation);
                info!(
                    "Num steps: {}, Test Loss: {:.4}, Test Acc: {:.3}",
                    self.num_steps, evaluation.mean_loss, evaluation.accuracy
                );

                let model = &self.model;
                let improved = self.best.observe(evaluation.accuracy, self.num_steps, || model.snapshot());
                if improved {
                    info!("Best model updated: Test Acc: {:.3}", evaluation.accuracy);
                }
                emit(
                    &self.config.progress_tx,
                    TrainEvent::Evaluation(EvalReport { step: self.num_steps, evaluation, improved }),
                );
            }

            if self.num_steps >= total {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn into_outcome(self) -> RunOutcome<M::State> {
        RunOutcome {
            steps: self.num_steps,
            history: self.history,
            best: self.best.into_best(),
        }
    }

    fn abort(self, error: TrainError) -> RunAborted<M::State> {
        RunAborted { error, partial: self.into_outcome() }
    }
}

/// One optimization step over `batch`. Returns the mean batch loss.
fn train_step<M: Model, O: Optimizer>(
    model: &mut M,
    criterion: &dyn Criterion,
    schedule: &mut OneCycle<O>,
    batch: &Batch,
) -> Result<f64> {
    model.zero_grad();
    let scale = 1.0 / batch.len() as f64;
    let mut loss = 0.0;

    for (input, target) in batch.inputs.iter().zip(&batch.targets) {
        let output = model.forward(input);
        if output.len() != target.len() {
            return Err(TrainError::model(format!(
                "model produced {} values for a target of {}",
                output.len(),
                target.len()
            )));
        }
        loss += criterion.loss(&output, target);
        let grad: Vec<f64> = criterion.gradient(&output, target)
            .into_iter()
            .map(|g| g * scale)
            .collect();
        model.backward(&grad);
    }

    schedule.optimizer_mut().step(model.parameters());
    schedule.step()?;
    Ok(loss * scale)
}

fn emit(tx: &Option<mpsc::Sender<TrainEvent>>, event: TrainEvent) {
    if let Some(tx) = tx {
        // A receiver that went away is not a reason to stop training.
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{Dataset, Sample, SharedDataset, VecDataset};
    use crate::loss::mse::MseLoss;
    use crate::network::{Network, NetworkSpec};
    use crate::optim::{adamw::AdamW, one_cycle::OneCyclePolicy};
    use crate::task::correctness::MarginMatch;
    use std::sync::Arc;

    fn threshold_data(n: usize) -> SharedDataset {
        // Target is 1 when the first feature is above 0.5.
        let samples = (0..n)
            .map(|i| {
                let x = (i % 10) as f64 / 10.0;
                Sample::new(vec![x, 1.0 - x], vec![if x > 0.5 { 1.0 } else { 0.0 }])
            })
            .collect();
        Arc::new(VecDataset::new(samples))
    }

    fn session(
        train_len: usize,
        batch_size: usize,
        config: LoopConfig,
    ) -> TrainingSession<Network, AdamW> {
        let model = Network::from_spec(&NetworkSpec::mlp("t", 2, &[(8, 0.0)], 1), 3).unwrap();
        let schedule = OneCycle::new(AdamW::new(0.0), OneCyclePolicy::new(0.05, config.total_steps, 0.3)).unwrap();
        TrainingSession::new(SessionParts {
            model,
            criterion: Box::new(MseLoss),
            correctness: Box::new(MarginMatch::default()),
            schedule,
            train_loader: DataLoader::new(threshold_data(train_len), batch_size, true, true, 1),
            test_loader: DataLoader::new(threshold_data(10), batch_size, false, true, 2),
            config,
        })
    }

    fn events(rx: mpsc::Receiver<TrainEvent>) -> (Vec<LossReport>, Vec<EvalReport>) {
        let mut losses = Vec::new();
        let mut evals = Vec::new();
        for event in rx.try_iter() {
            match event {
                TrainEvent::Loss(r) => losses.push(r),
                TrainEvent::Evaluation(r) => evals.push(r),
            }
        }
        (losses, evals)
    }

    #[test]
    fn stops_exactly_at_budget_mid_pass() {
        // 10 batches per pass; 23 steps ends 3 batches into the third pass.
        let (tx, rx) = mpsc::channel();
        let s = session(40, 4, LoopConfig::new(23, 5, 10).with_progress(tx));
        assert_eq!(s.phase(), Phase::Warming);

        let outcome = s.run().unwrap();
        assert_eq!(outcome.steps, 23);

        let (losses, evals) = events(rx);
        // Evaluations after batch 10 of passes one and two, plus the forced one.
        let eval_steps: Vec<usize> = evals.iter().map(|e| e.step).collect();
        assert_eq!(eval_steps, vec![10, 20, 23]);
        assert_eq!(outcome.history.len(), 3);
        // Loss reports at batches 5 and 10 of the two full passes.
        let report_steps: Vec<usize> = losses.iter().map(|r| r.step).collect();
        assert_eq!(report_steps, vec![5, 10, 15, 20]);
        assert!(losses.iter().all(|r| r.batch == 5 || r.batch == 10));
    }

    #[test]
    fn best_snapshot_tracks_history_maximum() {
        let s = session(40, 4, LoopConfig::new(60, 5, 5));
        let outcome = s.run().unwrap();
        let best = outcome.best.unwrap();
        let max = outcome.history.accuracies.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(best.accuracy, max);
        let first_max = outcome.history.accuracies.iter().position(|&a| a == max).unwrap();
        // Evaluations happen every 5 steps, so the k-th one is at step 5(k+1).
        assert_eq!(best.step, 5 * (first_max + 1));
        for (acc, loss) in outcome.history.accuracies.iter().zip(&outcome.history.losses) {
            assert!((0.0..=1.0).contains(acc));
            assert!(*loss >= 0.0);
        }
    }

    #[test]
    fn loss_reports_average_only_their_window() {
        let (tx, rx) = mpsc::channel();
        // One pass of 20 batches gives two windows of 10.
        let s = session(80, 4, LoopConfig::new(20, 10, 20).with_progress(tx));
        s.run().unwrap();
        let (losses, _) = events(rx);
        assert_eq!(losses.len(), 2);
        assert_eq!(losses[0].batch, 10);
        assert_eq!(losses[1].batch, 20);
        assert!(losses.iter().all(|r| r.mean_loss >= 0.0 && r.mean_loss.is_finite()));
    }

    #[test]
    fn loss_window_resets_after_each_report() {
        // Loss equals the target, so batch k has loss exactly k.
        struct TargetAsLoss;

        impl Criterion for TargetAsLoss {
            fn loss(&self, _predicted: &[f64], expected: &[f64]) -> f64 {
                expected[0]
            }

            fn gradient(&self, predicted: &[f64], _expected: &[f64]) -> Vec<f64> {
                vec![0.0; predicted.len()]
            }
        }

        let samples = (0..40)
            .map(|i| Sample::new(vec![0.0, 0.0], vec![(i / 2 + 1) as f64]))
            .collect();
        let (tx, rx) = mpsc::channel();
        let mut s = session(40, 2, LoopConfig::new(20, 10, 20).with_progress(tx));
        s.criterion = Box::new(TargetAsLoss);
        s.train_loader = DataLoader::new(Arc::new(VecDataset::new(samples)), 2, false, true, 0);
        s.run().unwrap();

        let (losses, _) = events(rx);
        let means: Vec<f64> = losses.iter().map(|r| r.mean_loss).collect();
        // Batches 1-10 average 5.5; batches 11-20 average 15.5, not 10.5.
        assert_eq!(means, vec![5.5, 15.5]);
    }

    #[test]
    fn too_little_training_data_fails_before_any_step() {
        let err = session(3, 4, LoopConfig::new(10, 5, 5)).run().unwrap_err();
        assert!(matches!(err.error, TrainError::Config(_)));
        assert_eq!(err.partial.steps, 0);
        assert!(err.partial.best.is_none());
    }

    #[test]
    fn schedule_budget_must_match_run_budget() {
        let mut s = session(40, 4, LoopConfig::new(10, 5, 5));
        s.config.total_steps = 11;
        let err = s.run().unwrap_err();
        assert!(matches!(err.error, TrainError::Config(_)));
    }

    #[test]
    fn failure_mid_run_keeps_partial_results() {
        struct FailsLate(SharedDataset);

        impl Dataset for FailsLate {
            fn len(&self) -> usize {
                self.0.len()
            }

            fn get(&self, index: usize) -> Result<Sample> {
                if index == 39 {
                    Err(TrainError::dataset("corrupt image"))
                } else {
                    self.0.get(index)
                }
            }
        }

        let mut s = session(40, 4, LoopConfig::new(100, 5, 2));
        // Unshuffled, so index 39 is reached in batch 10 of the first pass.
        s.train_loader = DataLoader::new(Arc::new(FailsLate(threshold_data(40))), 4, false, true, 0);
        let err = s.run().unwrap_err();
        assert!(matches!(err.error, TrainError::Dataset(_)));
        assert_eq!(err.partial.steps, 9);
        assert_eq!(err.partial.history.len(), 4);
        assert!(err.partial.best.is_some());
    }

    #[test]
    fn dropped_receiver_does_not_stop_training() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let outcome = session(40, 4, LoopConfig::new(12, 5, 5).with_progress(tx)).run().unwrap();
        assert_eq!(outcome.steps, 12);
    }

    #[test]
    fn training_reduces_test_loss() {
        let outcome = session(200, 4, LoopConfig::new(400, 50, 50)).run().unwrap();
        let losses = &outcome.history.losses;
        assert!(losses.last().unwrap() < losses.first().unwrap());
    }
}
