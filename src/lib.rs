pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod board;
pub mod data;
pub mod task;
pub mod eval;
pub mod train;
pub mod report;
pub mod config;
pub mod pipeline;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Model, Network, NetworkSpec, NetworkState};
pub use loss::{Criterion, LossType, MseLoss};
pub use optim::{AdamW, OneCycle, OneCyclePolicy, Optimizer, Sgd};
pub use task::{Correctness, TaskKind};
pub use eval::{evaluate, Evaluation};
pub use train::{BestSnapshot, CurveHistory, LoopConfig, SessionParts, TrainingSession};
pub use report::{ReportPaths, RunReporter};
pub use config::{ConfigOverrides, RunConfig};
pub use pipeline::execute;
pub use error::{Result, TrainError};
