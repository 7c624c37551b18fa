pub mod backprop;
pub mod numeric;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use epoch_stats::{EpochStats, FitReport, FitStatus};
pub use train_config::{GradientMethod, TrainConfig};
