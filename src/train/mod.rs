pub mod best;
pub mod events;
pub mod history;
pub mod session;
pub mod train_config;

pub use best::{BestSnapshot, Snapshot};
pub use events::{EvalReport, LossReport, TrainEvent};
pub use history::CurveHistory;
pub use session::{Phase, RunAborted, RunOutcome, SessionParts, TrainingSession};
pub use train_config::LoopConfig;
