use serde::{Serialize, Deserialize};

/// Per-epoch statistics emitted by `Network::fit`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Epoch budget for this run.
    pub max_epochs: usize,
    /// Mean squared error over the full dataset after this epoch's updates.
    pub cost: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Why a `fit` run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    /// The cost reached `min_error`.
    Converged,
    /// `max_epochs` ran without reaching `min_error`.
    Exhausted,
    /// The stop flag was raised or the progress receiver went away.
    Stopped,
}

/// Outcome of `Network::fit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Completed epochs.
    pub epochs: usize,
    /// Full-dataset cost when training ended.
    pub cost: f64,
    pub status: FitStatus,
}
