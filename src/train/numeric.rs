use crate::math::{Tensor, TensorView};
use crate::network::network::Network;

#[derive(Clone, Copy)]
enum Param {
    Weights,
    Biases,
}

impl Network {
    /// Finite-difference estimate of the same quantity `backpropagate`
    /// accumulates: the gradient of the summed squared error over the
    /// sample columns, added into `grad`.
    ///
    /// Each parameter is nudged by `±epsilon` and the change in loss divided
    /// by `2 · epsilon`. This costs two full passes over the batch per
    /// parameter, so it is only practical for small networks.
    pub fn numerical_gradient(
        &mut self,
        grad: &mut Network,
        inputs: TensorView<'_>,
        targets: TensorView<'_>,
        epsilon: f64,
    ) {
        assert!(epsilon > 0.0, "epsilon must be positive");
        assert_eq!(grad.layers.len(), self.layers.len(), "gradient network has a different depth");
        for l in 0..self.layers.len() {
            for param in [Param::Weights, Param::Biases] {
                let (rows, cols) = self.param(l, param).shape();
                for i in 0..rows {
                    for j in 0..cols {
                        let original = self.param(l, param).get(i, j);

                        self.param(l, param).set(i, j, original + epsilon);
                        let up = self.total_loss(inputs, targets);
                        self.param(l, param).set(i, j, original - epsilon);
                        let down = self.total_loss(inputs, targets);
                        self.param(l, param).set(i, j, original);

                        let g = grad.param(l, param);
                        let slope = (up - down) / (2.0 * epsilon);
                        g.set(i, j, g.get(i, j) + slope);
                    }
                }
            }
        }
    }

    fn param(&mut self, l: usize, param: Param) -> &mut Tensor {
        let layer = &mut self.layers[l];
        match param {
            Param::Weights => &mut layer.weights,
            Param::Biases => &mut layer.biases,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::activation::ActivationFunction::*;
    use crate::math::Tensor;
    use crate::network::{Architecture, Network};

    #[test]
    fn matches_the_closed_form_of_a_linear_layer() {
        let arch = Architecture::new(vec![2, 1], vec![Identity]).unwrap();
        let mut net = Network::new(&arch).unwrap();
        net.layers_mut()[0].weights_mut().copy_from(&Tensor::from_vec(1, 2, vec![0.5, -1.0]).unwrap());
        net.layers_mut()[0].biases_mut().fill(0.25);

        let x = Tensor::column(&[2.0, 1.0]);
        let y = Tensor::column(&[1.0]);
        let mut grad = net.zeros_like();
        net.numerical_gradient(&mut grad, x.view(), y.view(), 1e-5);

        let g = &grad.layers()[0];
        for (got, want) in g.weights().iter().zip([-3.0, -1.5]) {
            assert!((got - want).abs() < 1e-6, "{got} vs {want}");
        }
        assert!((g.biases().get(0, 0) + 1.5).abs() < 1e-6);
    }

    #[test]
    fn leaves_parameters_untouched() {
        let arch = Architecture::new(vec![3, 2, 2], vec![Tanh, Sigmoid]).unwrap();
        let mut net = Network::new(&arch).unwrap();
        let before = net.clone();
        let x = Tensor::column(&[0.1, 0.2, 0.3]);
        let y = Tensor::column(&[1.0, 0.0]);
        let mut grad = net.zeros_like();
        net.numerical_gradient(&mut grad, x.view(), y.view(), 1e-4);
        for (a, b) in net.layers().iter().zip(before.layers()) {
            assert_eq!(a.weights(), b.weights());
            assert_eq!(a.biases(), b.biases());
        }
    }
}
