use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{Error, Result};

/// Describes one dense layer of an architecture.
///
/// Fields:
/// - `size`: number of neurons in this layer
/// - `input_size`: output size of the previous layer, or the raw input
///   dimension for the first layer
/// - `activation`: activation applied after the affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// Layer widths from input to output plus one activation per transition.
///
/// `widths = [2, 3, 1]` with `activations = [tanh, sigmoid]` describes a
/// network taking 2 inputs, one hidden layer of 3 tanh units and a single
/// sigmoid output. Architectures can be stored as JSON independently of any
/// trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    pub widths: Vec<usize>,
    pub activations: Vec<ActivationFunction>,
}

impl Architecture {
    pub fn new(widths: Vec<usize>, activations: Vec<ActivationFunction>) -> Result<Architecture> {
        let arch = Architecture { widths, activations };
        arch.validate()?;
        Ok(arch)
    }

    pub fn validate(&self) -> Result<()> {
        if self.widths.len() < 2 {
            return Err(Error::InvalidArchitecture(format!(
                "need at least an input and an output width, got {} widths",
                self.widths.len()
            )));
        }
        if self.activations.len() != self.widths.len() - 1 {
            return Err(Error::InvalidArchitecture(format!(
                "{} widths need {} activations, got {}",
                self.widths.len(),
                self.widths.len() - 1,
                self.activations.len()
            )));
        }
        if let Some(i) = self.widths.iter().position(|&w| w == 0) {
            return Err(Error::InvalidArchitecture(format!("width at position {i} is zero")));
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.widths[0]
    }

    pub fn output_size(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    /// One `LayerSpec` per transition, input side first.
    pub fn layers(&self) -> Vec<LayerSpec> {
        self.widths
            .windows(2)
            .zip(self.activations.iter())
            .map(|(w, &activation)| LayerSpec { size: w[1], input_size: w[0], activation })
            .collect()
    }

    /// Serializes the architecture to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates an architecture from a JSON file.
    pub fn load_json(path: &str) -> Result<Architecture> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let arch: Architecture = serde_json::from_reader(reader)?;
        arch.validate()?;
        Ok(arch)
    }
}
