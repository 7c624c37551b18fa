pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod pool;
pub mod config;
pub mod error;

// Convenience re-exports
pub use math::{Tensor, TensorView, TensorViewMut};
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Architecture, Confusion, Network, Prediction};
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
pub use train::{EpochStats, FitReport, FitStatus, GradientMethod, TrainConfig};
pub use data::{Dataset, DatasetView};
pub use pool::ThreadPool;
pub use config::{DatasetSource, RunConfig};
pub use error::{Error, Result};
