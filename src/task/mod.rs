pub mod correctness;
pub mod kind;

pub use correctness::{Correctness, DecodedMatch, MarginMatch};
pub use kind::TaskKind;
