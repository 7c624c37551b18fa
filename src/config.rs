use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::network::Architecture;
use crate::train::TrainConfig;

/// Where the binary reads its training rows from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub path: String,
    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_separator() -> char {
    ','
}

/// Everything one `ferrite-mlp` run needs, as read from a JSON file.
///
/// ```json
/// {
///   "architecture": { "widths": [2, 2, 1], "activations": ["sigmoid", "sigmoid"] },
///   "training": { "learning_rate": 1.0, "min_error": 0.001, "max_epochs": 20000, "batch_size": 4 },
///   "dataset": { "path": "xor.csv", "separator": "," },
///   "model_path": "xor.bin"
/// }
/// ```
///
/// Without a `dataset` the built-in 4-bit adder table is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub architecture: Architecture,
    pub training: TrainConfig,
    #[serde(default)]
    pub dataset: Option<DatasetSource>,
    #[serde(default)]
    pub model_path: Option<String>,
}

impl RunConfig {
    pub fn from_json_str(text: &str) -> Result<RunConfig> {
        let config: RunConfig = serde_json::from_str(text)?;
        config.architecture.validate()?;
        Ok(config)
    }

    pub fn load_json(path: &str) -> Result<RunConfig> {
        let text = std::fs::read_to_string(path)?;
        RunConfig::from_json_str(&text)
    }
}
