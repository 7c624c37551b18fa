use std::io::{Read, Write};

use rand::Rng;

use crate::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::math::{Tensor, TensorView, TensorViewMut};

/// One affine transform followed by an elementwise activation.
///
/// Shapes: `weights` is (out × in), `biases`, `pre_activation` and
/// `activation` are (out × 1). Inputs are single columns of height `in`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub(crate) weights: Tensor,
    pub(crate) biases: Tensor,
    pub(crate) pre_activation: Tensor, // z = Wx + b, kept for the derivative
    pub(crate) activation: Tensor,
    pub(crate) activator: ActivationFunction,
}

impl Layer {
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Layer {
        Layer::with_rng(size, input_size, activation, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(size: usize, input_size: usize, activation: ActivationFunction, rng: &mut R) -> Layer {
        Layer {
            weights: Tensor::random_with(size, input_size, rng),
            biases: Tensor::random_with(size, 1, rng),
            pre_activation: Tensor::zeros(size, 1),
            activation: Tensor::zeros(size, 1),
            activator: activation,
        }
    }

    /// Same shapes and activation, every tensor zero. Used as a gradient accumulator.
    pub fn zeros_like(&self) -> Layer {
        Layer {
            weights: Tensor::zeros(self.weights.rows(), self.weights.cols()),
            biases: Tensor::zeros(self.biases.rows(), 1),
            pre_activation: Tensor::zeros(self.pre_activation.rows(), 1),
            activation: Tensor::zeros(self.activation.rows(), 1),
            activator: self.activator,
        }
    }

    pub fn size(&self) -> usize {
        self.weights.rows()
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn activator(&self) -> ActivationFunction {
        self.activator
    }

    pub fn weights(&self) -> TensorView<'_> {
        self.weights.view()
    }

    pub fn biases(&self) -> TensorView<'_> {
        self.biases.view()
    }

    pub fn weights_mut(&mut self) -> TensorViewMut<'_> {
        self.weights.view_mut()
    }

    pub fn biases_mut(&mut self) -> TensorViewMut<'_> {
        self.biases.view_mut()
    }

    /// z from the last forward pass.
    pub fn pre_activation(&self) -> TensorView<'_> {
        self.pre_activation.view()
    }

    /// a from the last forward pass.
    pub fn activation(&self) -> TensorView<'_> {
        self.activation.view()
    }

    /// `z = W·x + b`, `a = f(z)`; returns `a`.
    pub fn forward(&mut self, x: TensorView<'_>) -> TensorView<'_> {
        assert!(
            x.shape() == (self.input_size(), 1),
            "layer expects a {}x1 input, got {}x{}",
            self.input_size(), x.rows(), x.cols()
        );
        self.pre_activation.matmul(&self.weights, x).add_assign(&self.biases);
        self.activator.apply(self.activation.view_mut(), self.pre_activation.view());
        self.activation.view()
    }

    pub fn reset_to_zero(&mut self) {
        self.weights.fill(0.0);
        self.biases.fill(0.0);
        self.pre_activation.fill(0.0);
        self.activation.fill(0.0);
    }

    /// Writes the activation tag, then the weights, then the biases.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.activator.tag().to_ne_bytes())?;
        self.weights.write_to(w)?;
        self.biases.write_to(w)
    }

    /// Reads a layer written by `write_to`. Scratch buffers are sized from
    /// the loaded biases.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Layer> {
        let mut tag = [0u8; 4];
        r.read_exact(&mut tag).map_err(Error::reading("activation tag"))?;
        let activator = ActivationFunction::from_tag(u32::from_ne_bytes(tag))?;
        let weights = Tensor::read_from(r)?;
        let biases = Tensor::read_from(r)?;
        if biases.shape() != (weights.rows(), 1) {
            return Err(Error::CorruptModel(format!(
                "biases are {}x{} but weights have {} rows",
                biases.rows(), biases.cols(), weights.rows()
            )));
        }
        let size = biases.rows();
        Ok(Layer {
            weights,
            biases,
            pre_activation: Tensor::zeros(size, 1),
            activation: Tensor::zeros(size, 1),
            activator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixed_layer(activator: ActivationFunction) -> Layer {
        let mut layer = Layer::new(2, 3, activator);
        layer.weights = Tensor::from_vec(2, 3, vec![1.0, 0.0, -1.0, 0.5, 0.5, 0.5]).unwrap();
        layer.biases = Tensor::column(&[0.25, -1.0]);
        layer
    }

    #[test]
    fn forward_is_affine_then_activation() {
        let mut layer = fixed_layer(ActivationFunction::Identity);
        let x = Tensor::column(&[1.0, 2.0, 3.0]);
        let a = layer.forward(x.view()).to_vec();
        assert_eq!(a, vec![-1.75, 2.0]);

        let mut relu = fixed_layer(ActivationFunction::ReLU);
        assert_eq!(relu.forward(x.view()).to_vec(), vec![0.0, 2.0]);
        assert_eq!(relu.pre_activation().to_vec(), vec![-1.75, 2.0]);
    }

    #[test]
    fn forward_overwrites_previous_state() {
        let mut layer = fixed_layer(ActivationFunction::Identity);
        layer.forward(Tensor::column(&[9.0, 9.0, 9.0]).view());
        let a = layer.forward(Tensor::column(&[0.0, 0.0, 0.0]).view()).to_vec();
        assert_eq!(a, vec![0.25, -1.0]);
    }

    #[test]
    #[should_panic(expected = "layer expects a 3x1 input")]
    fn forward_rejects_wrong_width() {
        let mut layer = fixed_layer(ActivationFunction::Sigmoid);
        layer.forward(Tensor::column(&[1.0, 2.0]).view());
    }

    #[test]
    fn zeros_like_keeps_shape_and_kind() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Layer::with_rng(4, 2, ActivationFunction::Tanh, &mut rng);
        let zero = layer.zeros_like();
        assert_eq!(zero.weights().shape(), (4, 2));
        assert_eq!(zero.biases().shape(), (4, 1));
        assert_eq!(zero.activator(), ActivationFunction::Tanh);
        assert_eq!(zero.weights().sum(), 0.0);

        let mut layer = layer;
        layer.reset_to_zero();
        assert_eq!(layer, zero);
    }

    #[test]
    fn save_then_load_preserves_outputs() {
        let mut layer = Layer::new(3, 2, ActivationFunction::Sigmoid);
        let mut bytes = Vec::new();
        layer.write_to(&mut bytes).unwrap();
        let mut back = Layer::read_from(&mut bytes.as_slice()).unwrap();

        let x = Tensor::column(&[0.3, -0.7]);
        assert_eq!(back.forward(x.view()).to_vec(), layer.forward(x.view()).to_vec());
        assert_eq!(back.activator(), ActivationFunction::Sigmoid);
    }

    #[test]
    fn load_rejects_unknown_tag() {
        let layer = Layer::new(1, 1, ActivationFunction::ReLU);
        let mut bytes = Vec::new();
        layer.write_to(&mut bytes).unwrap();
        bytes[..4].copy_from_slice(&42u32.to_ne_bytes());
        assert!(matches!(Layer::read_from(&mut bytes.as_slice()), Err(Error::UnknownActivation(42))));
    }
}
