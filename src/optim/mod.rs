pub mod adamw;
pub mod one_cycle;
pub mod optimizer;
pub mod sgd;

pub use adamw::AdamW;
pub use one_cycle::{OneCycle, OneCyclePolicy};
pub use optimizer::{Optimizer, OptimizerKind};
pub use sgd::Sgd;
