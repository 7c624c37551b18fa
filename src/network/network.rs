use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use rand::Rng;

use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::loss::mse::MseLoss;
use crate::math::tensor::{read_size, write_size};
use crate::math::{Tensor, TensorView};
use crate::network::architecture::Architecture;

/// An ordered stack of dense layers.
///
/// Layer `i` consumes the activation of layer `i - 1` (or the raw input for
/// layer 0), so each layer's weight column count equals the previous
/// layer's size. Every constructor enforces this.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    input_size: usize,
    pub(crate) layers: Vec<Layer>,
}

impl Network {
    pub fn new(arch: &Architecture) -> Result<Network> {
        Network::with_rng(arch, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(arch: &Architecture, rng: &mut R) -> Result<Network> {
        arch.validate()?;
        let layers = arch
            .layers()
            .into_iter()
            .map(|spec| Layer::with_rng(spec.size, spec.input_size, spec.activation, rng))
            .collect();
        Ok(Network { input_size: arch.input_size(), layers })
    }

    /// Assembles a network from existing layers, checking that their shapes chain.
    pub fn from_layers(input_size: usize, layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(Error::InvalidArchitecture("a network needs at least one layer".into()));
        }
        let mut expected = input_size;
        for (i, layer) in layers.iter().enumerate() {
            if layer.input_size() != expected {
                return Err(Error::InvalidArchitecture(format!(
                    "layer {i} takes {} inputs but receives {expected}",
                    layer.input_size()
                )));
            }
            expected = layer.size();
        }
        Ok(Network { input_size, layers })
    }

    /// Same shapes and activations with every tensor zeroed; no randomness.
    pub fn zeros_like(&self) -> Network {
        Network {
            input_size: self.input_size,
            layers: self.layers.iter().map(Layer::zeros_like).collect(),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, Layer::size)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn reset_to_zero(&mut self) {
        self.layers.iter_mut().for_each(Layer::reset_to_zero);
    }

    /// Runs `x` (an `input_size × 1` column) through every layer, left to
    /// right. Each layer keeps its z and a for backpropagation; the returned
    /// view is the last layer's activation.
    pub fn forward(&mut self, x: TensorView<'_>) -> TensorView<'_> {
        for i in 0..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            let input = match done.last() {
                Some(prev) => prev.activation(),
                None => x,
            };
            rest[0].forward(input);
        }
        self.output()
    }

    /// Activation of the final layer from the most recent forward pass.
    pub fn output(&self) -> TensorView<'_> {
        self.layers[self.layers.len() - 1].activation()
    }

    /// Forward pass returning an owned copy of the prediction.
    pub fn predict(&mut self, x: &[f64]) -> Vec<f64> {
        let input = Tensor::column(x);
        self.forward(input.view()).to_vec()
    }

    /// Squared error summed over every sample column of `inputs` / `targets`.
    pub fn total_loss(&mut self, inputs: TensorView<'_>, targets: TensorView<'_>) -> f64 {
        assert_eq!(inputs.cols(), targets.cols(), "inputs and targets hold different sample counts");
        (0..inputs.cols())
            .map(|i| {
                let prediction = self.forward(inputs.col(i));
                MseLoss::loss(prediction, targets.col(i))
            })
            .sum()
    }

    /// Mean squared error over the sample columns:
    /// `(1/N) Σ ||forward(x_i) − y_i||²`.
    pub fn cost(&mut self, inputs: TensorView<'_>, targets: TensorView<'_>) -> f64 {
        let n = inputs.cols();
        if n == 0 {
            return 0.0;
        }
        self.total_loss(inputs, targets) / n as f64
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_size(w, self.input_size)?;
        write_size(w, self.layers.len())?;
        for layer in &self.layers {
            layer.write_to(w)?;
        }
        Ok(())
    }

    /// Reads a network written by `write_to`. Either every layer loads and
    /// the shapes chain, or an error is returned.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Network> {
        let input_size = read_size(r)?;
        let len = read_size(r)?;
        let mut layers = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            layers.push(Layer::read_from(r)?);
        }
        Network::from_layers(input_size, layers).map_err(|e| match e {
            Error::InvalidArchitecture(msg) => Error::CorruptModel(msg),
            other => other,
        })
    }

    /// Writes the binary model file.
    pub fn save(&self, path: &str) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::debug!("saved {}-layer network to {path}", self.layers.len());
        Ok(())
    }

    pub fn load(path: &str) -> Result<Network> {
        let mut reader = BufReader::new(File::open(path)?);
        let network = Network::read_from(&mut reader)?;
        log::debug!("loaded {}-layer network from {path}", network.layers.len());
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction::{self, *};
    use rand::{rngs::StdRng, SeedableRng};

    fn arch(widths: &[usize], acts: &[ActivationFunction]) -> Architecture {
        Architecture::new(widths.to_vec(), acts.to_vec()).unwrap()
    }

    #[test]
    fn builds_one_layer_per_transition() {
        let net = Network::new(&arch(&[4, 5, 5, 3], &[Tanh, Tanh, Sigmoid])).unwrap();
        assert_eq!(net.layers().len(), 3);
        assert_eq!(net.layers()[1].weights().shape(), (5, 5));
        assert_eq!(net.layers()[2].weights().shape(), (3, 5));
        assert_eq!((net.input_size(), net.output_size()), (4, 3));
    }

    #[test]
    fn forward_matches_manual_composition() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut net = Network::with_rng(&arch(&[3, 4, 2], &[ReLU, Sigmoid]), &mut rng).unwrap();
        let x = Tensor::column(&[0.2, -0.4, 0.9]);

        let mut first = net.layers()[0].clone();
        let mut second = net.layers()[1].clone();
        let hidden = first.forward(x.view()).to_owned();
        let expected = second.forward(hidden.view()).to_vec();

        assert_eq!(net.forward(x.view()).to_vec(), expected);
        assert_eq!(net.predict(&[0.2, -0.4, 0.9]), expected);
    }

    #[test]
    fn cost_averages_over_samples_not_outputs() {
        let mut net = Network::new(&arch(&[1, 2], &[Identity])).unwrap();
        net.layers_mut()[0].weights_mut().fill(0.0);
        net.layers_mut()[0].biases_mut().fill(1.0);
        // Prediction is always [1, 1]; squared errors are 2 and 0.
        let x = Tensor::from_vec(1, 2, vec![5.0, 7.0]).unwrap();
        let y = Tensor::from_vec(2, 2, vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(net.total_loss(x.view(), y.view()), 2.0);
        assert_eq!(net.cost(x.view(), y.view()), 1.0);
    }

    #[test]
    fn zeros_like_is_deterministic() {
        let net = Network::new(&arch(&[2, 3, 1], &[Tanh, Identity])).unwrap();
        let zero = net.zeros_like();
        assert_eq!(zero, net.zeros_like());
        assert!(zero.layers().iter().all(|l| l.weights().sum() == 0.0 && l.biases().sum() == 0.0));
        assert_eq!(zero.layers()[0].activator(), Tanh);
    }

    #[test]
    fn from_layers_rejects_broken_chains() {
        let layers = vec![Layer::new(3, 2, Sigmoid), Layer::new(1, 4, Sigmoid)];
        assert!(matches!(Network::from_layers(2, layers), Err(Error::InvalidArchitecture(_))));
        assert!(Network::from_layers(2, vec![]).is_err());
    }

    #[test]
    fn save_then_load_reproduces_outputs() {
        let mut net = Network::new(&arch(&[2, 3, 2], &[Tanh, Sigmoid])).unwrap();
        let mut bytes = Vec::new();
        net.write_to(&mut bytes).unwrap();
        let mut back = Network::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(back.input_size(), 2);
        for x in [[0.0, 0.0], [0.5, -1.0], [3.0, 2.0]] {
            assert_eq!(back.predict(&x), net.predict(&x));
        }
    }

    #[test]
    fn truncated_model_is_rejected() {
        let net = Network::new(&arch(&[2, 2, 1], &[Sigmoid, Sigmoid])).unwrap();
        let mut bytes = Vec::new();
        net.write_to(&mut bytes).unwrap();
        for cut in [4, 12, 20, bytes.len() - 1] {
            let err = Network::read_from(&mut &bytes[..cut]).unwrap_err();
            assert!(matches!(err, Error::Truncated { .. }), "cut at {cut}: {err}");
        }
    }

    #[test]
    fn mismatched_layer_chain_is_corrupt() {
        let a = Layer::new(3, 2, Sigmoid);
        let b = Layer::new(1, 4, Sigmoid);
        let mut bytes = Vec::new();
        write_size(&mut bytes, 2).unwrap();
        write_size(&mut bytes, 2).unwrap();
        a.write_to(&mut bytes).unwrap();
        b.write_to(&mut bytes).unwrap();
        assert!(matches!(Network::read_from(&mut bytes.as_slice()), Err(Error::CorruptModel(_))));
    }
}
