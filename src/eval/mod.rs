pub mod evaluator;
pub mod frozen;

pub use evaluator::{evaluate, Evaluation};
pub use frozen::Frozen;
