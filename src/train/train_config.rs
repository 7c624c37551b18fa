use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::train::epoch_stats::EpochStats;

/// How the per-batch gradient is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GradientMethod {
    /// Analytic reverse-mode chain rule.
    #[default]
    Backprop,
    /// Central finite differences; slow, useful as a reference.
    FiniteDifference { epsilon: f64 },
}

/// Configuration for a `Network::fit` run.
///
/// # Fields
/// - `learning_rate`: SGD step size, applied as `learning_rate / batch_len`
///   to the gradient summed over a mini-batch
/// - `min_error`: training stops once the full-dataset MSE is at or below this
/// - `max_epochs`: hard cap on full passes over the data
/// - `batch_size`: samples per mini-batch; `1` gives online SGD
/// - `seed`: seeds the shuffling RNG; `None` draws from the OS
/// - `gradient`: gradient estimator
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///   completed epoch. If the receiver is dropped the loop
///   terminates early.
/// - `stop_flag`: optional atomic flag; when set to `true` from another
///   thread the loop terminates after the current epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub min_error: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub gradient: GradientMethod,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(learning_rate: f64, min_error: f64, max_epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            learning_rate,
            min_error,
            max_epochs,
            batch_size,
            seed: None,
            gradient: GradientMethod::Backprop,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gradient(mut self, gradient: GradientMethod) -> Self {
        self.gradient = gradient;
        self
    }

    /// Checks every hyperparameter against a dataset of `rows` samples.
    pub fn validate(&self, rows: usize) -> Result<()> {
        if !(self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!("learning_rate must be positive, got {}", self.learning_rate)));
        }
        if !(self.min_error > 0.0) {
            return Err(Error::InvalidConfig(format!("min_error must be positive, got {}", self.min_error)));
        }
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be at least 1".into()));
        }
        if self.batch_size == 0 || self.batch_size > rows {
            return Err(Error::InvalidConfig(format!(
                "batch_size must be in 1..={rows}, got {}",
                self.batch_size
            )));
        }
        if let GradientMethod::FiniteDifference { epsilon } = self.gradient {
            if !(epsilon > 0.0) {
                return Err(Error::InvalidConfig(format!("epsilon must be positive, got {epsilon}")));
            }
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(1.0, 1e-4, 100_000, 1)
    }
}
