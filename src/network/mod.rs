pub mod model;
pub mod network;
pub mod spec;
pub mod state;

pub use model::{Model, Param};
pub use network::Network;
pub use spec::{LayerSpec, NetworkSpec};
pub use state::{LayerState, NetworkState};
