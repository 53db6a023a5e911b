use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::overrides::ConfigOverrides;
use crate::data::partition::PartitionStrategy;
use crate::error::{Result, TrainError};
use crate::loss::loss_type::LossType;
use crate::optim::optimizer::OptimizerKind;
use crate::task::kind::TaskKind;
use crate::train::train_config::LoopConfig;

/// Compute device tensors live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Cpu,
}

/// Every knob of a training run. Built once before the run and never
/// mutated while it executes.
///
/// Start from [`RunConfig::for_task`], layer overrides on top with
/// [`RunConfig::apply`], then call [`RunConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub task: TaskKind,
    /// Image folder for training data, or the whole pool under `RandomSplit`.
    pub train_source: PathBuf,
    /// Image folder for held-out data. Required by `FractionOfTrain`.
    pub test_source: Option<PathBuf>,
    pub outdir: PathBuf,
    pub total_steps: usize,
    pub batch_size: usize,
    pub max_lr: f64,
    pub train_test_split: f64,
    pub warmup_fraction: f64,
    pub max_data: Option<usize>,
    /// Orientation only: chance that a sample is turned 180°.
    pub rotate_probability: f64,
    pub loss_report_every: usize,
    pub eval_every: usize,
    pub partition: PartitionStrategy,
    pub optimizer: OptimizerKind,
    pub loss: LossType,
    pub image_width: u32,
    pub image_height: u32,
    pub seed: u64,
    pub device: Device,
    /// Parameters to start from instead of a fresh initialization.
    pub checkpoint: Option<PathBuf>,
    /// `NetworkSpec` JSON; the task's default architecture when unset.
    pub architecture: Option<PathBuf>,
}

impl RunConfig {
    /// Defaults for `task`.
    pub fn for_task(task: TaskKind) -> RunConfig {
        match task {
            TaskKind::Orientation => RunConfig {
                task,
                train_source: PathBuf::from("resources/orientation/train"),
                test_source: Some(PathBuf::from("resources/orientation/test")),
                outdir: PathBuf::from("models"),
                total_steps: 10_000,
                batch_size: 8,
                max_lr: 1e-3,
                train_test_split: 0.7,
                warmup_fraction: 0.3,
                max_data: Some(200_000),
                rotate_probability: 0.3,
                loss_report_every: 100,
                eval_every: 2_000,
                partition: PartitionStrategy::FractionOfTrain,
                optimizer: OptimizerKind::AdamW,
                loss: LossType::Mse,
                image_width: 32,
                image_height: 32,
                seed: 42,
                device: Device::Cpu,
                checkpoint: None,
                architecture: None,
            },
            TaskKind::Board => RunConfig {
                task,
                train_source: PathBuf::from("resources/fen_images"),
                test_source: None,
                outdir: PathBuf::from("models"),
                total_steps: 600_000,
                batch_size: 8,
                max_lr: 1e-3,
                train_test_split: 0.97,
                warmup_fraction: 0.3,
                max_data: None,
                rotate_probability: 0.0,
                loss_report_every: 200,
                eval_every: 4_000,
                partition: PartitionStrategy::RandomSplit,
                optimizer: OptimizerKind::AdamW,
                loss: LossType::Mse,
                image_width: 32,
                image_height: 32,
                seed: 42,
                device: Device::Cpu,
                checkpoint: None,
                architecture: None,
            },
        }
    }

    /// Task defaults overlaid with a TOML file.
    pub fn from_toml_file(task: TaskKind, path: &Path) -> Result<RunConfig> {
        let mut config = RunConfig::for_task(task);
        config.apply(ConfigOverrides::load_toml(path)?);
        Ok(config)
    }

    /// Overwrites every field `overrides` sets.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        let o = overrides;
        if let Some(v) = o.train_source { self.train_source = v; }
        if let Some(v) = o.test_source { self.test_source = Some(v); }
        if let Some(v) = o.outdir { self.outdir = v; }
        if let Some(v) = o.total_steps { self.total_steps = v; }
        if let Some(v) = o.batch_size { self.batch_size = v; }
        if let Some(v) = o.max_lr { self.max_lr = v; }
        if let Some(v) = o.train_test_split { self.train_test_split = v; }
        if let Some(v) = o.warmup_fraction { self.warmup_fraction = v; }
        if let Some(v) = o.max_data { self.max_data = Some(v); }
        if let Some(v) = o.rotate_probability { self.rotate_probability = v; }
        if let Some(v) = o.loss_report_every { self.loss_report_every = v; }
        if let Some(v) = o.eval_every { self.eval_every = v; }
        if let Some(v) = o.partition { self.partition = v; }
        if let Some(v) = o.optimizer { self.optimizer = v; }
        if let Some(v) = o.loss { self.loss = v; }
        if let Some(v) = o.image_width { self.image_width = v; }
        if let Some(v) = o.image_height { self.image_height = v; }
        if let Some(v) = o.seed { self.seed = v; }
        if let Some(v) = o.device { self.device = v; }
        if let Some(v) = o.checkpoint { self.checkpoint = Some(v); }
        if let Some(v) = o.architecture { self.architecture = Some(v); }
    }

    /// Rejects configurations that would fail or misbehave mid-run.
    pub fn validate(&self) -> Result<()> {
        if self.total_steps == 0 {
            return Err(TrainError::config("total_steps must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(TrainError::config("batch_size must be at least 1"));
        }
        if self.loss_report_every == 0 || self.eval_every == 0 {
            return Err(TrainError::config("loss_report_every and eval_every must be at least 1"));
        }
        if self.total_steps < self.loss_report_every || self.total_steps < self.eval_every {
            return Err(TrainError::config(format!(
                "total_steps ({}) is smaller than a reporting cadence (loss every {}, eval every {})",
                self.total_steps, self.loss_report_every, self.eval_every
            )));
        }
        if !(self.train_test_split > 0.0 && self.train_test_split < 1.0) {
            return Err(TrainError::config(format!(
                "train_test_split must lie in (0, 1), got {}",
                self.train_test_split
            )));
        }
        if !(self.warmup_fraction > 0.0 && self.warmup_fraction < 1.0) {
            return Err(TrainError::config(format!(
                "warmup_fraction must lie in (0, 1), got {}",
                self.warmup_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.rotate_probability) {
            return Err(TrainError::config(format!(
                "rotate_probability must lie in [0, 1], got {}",
                self.rotate_probability
            )));
        }
        if !(self.max_lr > 0.0) {
            return Err(TrainError::config(format!("max_lr must be positive, got {}", self.max_lr)));
        }
        if self.max_data == Some(0) {
            return Err(TrainError::config("max_data must be at least 1 when set"));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(TrainError::config("image dimensions must be non-zero"));
        }
        if self.partition == PartitionStrategy::FractionOfTrain && self.test_source.is_none() {
            return Err(TrainError::config("the fraction_of_train partition needs a test_source"));
        }
        Ok(())
    }

    /// Flattened input length of one image sample.
    pub fn input_size(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig::new(self.total_steps, self.loss_report_every, self.eval_every)
    }
}
