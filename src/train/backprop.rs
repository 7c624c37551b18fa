use crate::loss::mse::MseLoss;
use crate::math::TensorView;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;

impl Network {
    /// Adds the gradient of the summed squared error of every sample column
    /// in `inputs` / `targets` into `grad`, which must be shaped like `self`
    /// (see `zeros_like`). `grad` is not cleared first, so one accumulator
    /// can collect a whole mini-batch.
    ///
    /// The accumulator's own scratch buffers carry the chain rule: layer
    /// `l`'s incoming delta lives in `grad.layers[l].pre_activation` and its
    /// `delta ⊙ f'(z)` in `grad.layers[l].activation`.
    pub fn backpropagate(&mut self, grad: &mut Network, inputs: TensorView<'_>, targets: TensorView<'_>) {
        assert_eq!(inputs.cols(), targets.cols(), "inputs and targets hold different sample counts");
        assert_eq!(grad.layers.len(), self.layers.len(), "gradient network has a different depth");
        let last = self.layers.len() - 1;

        for s in 0..inputs.cols() {
            let x = inputs.col(s);
            let output = self.forward(x);
            MseLoss::derivative(grad.layers[last].pre_activation.view_mut(), output, targets.col(s));

            for l in (0..=last).rev() {
                let layer = &self.layers[l];
                let (below, above) = grad.layers.split_at_mut(l);
                let g = &mut above[0];

                layer.activator.apply_derivative(g.activation.view_mut(), layer.pre_activation.view());
                g.activation.hadamard_assign(&g.pre_activation);

                let prev_activation = if l > 0 { self.layers[l - 1].activation.view() } else { x };
                g.weights.matmul_accumulate(&g.activation, prev_activation.transpose());
                g.biases.add_assign(&g.activation);

                if l > 0 {
                    below[l - 1].pre_activation.matmul(layer.weights.transpose(), &g.activation);
                }
            }
        }
    }

    /// One averaged SGD step from a gradient summed over `batch_len` samples.
    pub fn apply_gradient(&mut self, grad: &Network, optimizer: &Sgd, batch_len: usize) {
        for (layer, g) in self.layers.iter_mut().zip(grad.layers.iter()) {
            optimizer.step(layer, g, batch_len);
        }
    }
}
