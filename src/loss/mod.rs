pub mod criterion;
pub mod huber;
pub mod loss_type;
pub mod mse;

pub use criterion::Criterion;
pub use huber::HuberLoss;
pub use loss_type::LossType;
pub use mse::MseLoss;
