pub mod architecture;
pub mod metrics;
pub mod network;

pub use architecture::{Architecture, LayerSpec};
pub use metrics::{ClassCounts, Confusion, Prediction};
pub use network::Network;
