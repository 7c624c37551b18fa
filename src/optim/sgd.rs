use crate::layers::dense::Layer;

/// Plain stochastic gradient descent.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies the averaged update of one mini-batch:
    /// `param -= (learning_rate / batch_len) * grad`, where `grad` holds the
    /// gradient summed over the `batch_len` samples.
    pub fn step(&self, layer: &mut Layer, grad: &Layer, batch_len: usize) {
        assert!(batch_len > 0, "cannot apply an update from an empty batch");
        let k = -self.learning_rate / batch_len as f64;
        layer.weights.add_scaled(&grad.weights, k);
        layer.biases.add_scaled(&grad.biases, k);
    }
}
