use crate::math::{TensorView, TensorViewMut};

/// Squared-error loss of one sample, summed over the outputs.
pub struct MseLoss;

impl MseLoss {
    /// `Σ (predicted − expected)²`. Not averaged over the output width.
    pub fn loss(predicted: TensorView<'_>, expected: TensorView<'_>) -> f64 {
        assert_eq!(predicted.shape(), expected.shape(), "loss: prediction and target shapes differ");
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| (p - y).powi(2))
            .sum()
    }

    /// Gradient with respect to the prediction: `dst = 2 (predicted − expected)`.
    pub fn derivative(mut dst: TensorViewMut<'_>, predicted: TensorView<'_>, expected: TensorView<'_>) {
        dst.copy_from(predicted).sub_assign(expected).scale(2.0);
    }
}
