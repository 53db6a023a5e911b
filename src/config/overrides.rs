use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::run_config::Device;
use crate::data::partition::PartitionStrategy;
use crate::error::Result;
use crate::loss::loss_type::LossType;
use crate::optim::optimizer::OptimizerKind;

/// One configuration layer; `None` leaves the underlying value alone.
///
/// A TOML run file deserializes into this directly, with keys named like
/// the fields of `RunConfig`. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub train_source: Option<PathBuf>,
    pub test_source: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub total_steps: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_lr: Option<f64>,
    pub train_test_split: Option<f64>,
    pub warmup_fraction: Option<f64>,
    pub max_data: Option<usize>,
    pub rotate_probability: Option<f64>,
    pub loss_report_every: Option<usize>,
    pub eval_every: Option<usize>,
    pub partition: Option<PartitionStrategy>,
    pub optimizer: Option<OptimizerKind>,
    pub loss: Option<LossType>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub seed: Option<u64>,
    pub device: Option<Device>,
    pub checkpoint: Option<PathBuf>,
    pub architecture: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn load_toml(path: &Path) -> Result<ConfigOverrides> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            train_source: other.train_source.or(self.train_source),
            test_source: other.test_source.or(self.test_source),
            outdir: other.outdir.or(self.outdir),
            total_steps: other.total_steps.or(self.total_steps),
            batch_size: other.batch_size.or(self.batch_size),
            max_lr: other.max_lr.or(self.max_lr),
            train_test_split: other.train_test_split.or(self.train_test_split),
            warmup_fraction: other.warmup_fraction.or(self.warmup_fraction),
            max_data: other.max_data.or(self.max_data),
            rotate_probability: other.rotate_probability.or(self.rotate_probability),
            loss_report_every: other.loss_report_every.or(self.loss_report_every),
            eval_every: other.eval_every.or(self.eval_every),
            partition: other.partition.or(self.partition),
            optimizer: other.optimizer.or(self.optimizer),
            loss: other.loss.or(self.loss),
            image_width: other.image_width.or(self.image_width),
            image_height: other.image_height.or(self.image_height),
            seed: other.seed.or(self.seed),
            device: other.device.or(self.device),
            checkpoint: other.checkpoint.or(self.checkpoint),
            architecture: other.architecture.or(self.architecture),
        }
    }
}
