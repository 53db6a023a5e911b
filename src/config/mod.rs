pub mod overrides;
pub mod run_config;

pub use overrides::ConfigOverrides;
pub use run_config::{Device, RunConfig};
