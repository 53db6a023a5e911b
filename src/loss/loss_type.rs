use serde::{Serialize, Deserialize};

use crate::loss::{criterion::Criterion, huber::HuberLoss, mse::MseLoss};

/// Selects which criterion a run trains against.
///
/// - `Mse`   — Mean-squared error; what both board tasks train with.
/// - `Huber` — Huber loss (δ=1.0); less sensitive to outlier targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    Huber,
}

impl LossType {
    pub fn criterion(self) -> Box<dyn Criterion> {
        match self {
            LossType::Mse => Box::new(MseLoss),
            LossType::Huber => Box::new(HuberLoss),
        }
    }
}
