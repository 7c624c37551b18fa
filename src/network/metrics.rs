use serde::Serialize;

use crate::data::Dataset;
use crate::error::Result;
use crate::math::TensorView;
use crate::network::network::Network;

/// Per-class outcome counts, one-vs-rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub tp: u64,
    pub fp: u64,
    pub tn: u64,
    pub fn_: u64,
}

/// Confusion matrix over argmax classes. `matrix[t][p]` counts samples of
/// true class `t` predicted as `p`.
#[derive(Debug, Clone, PartialEq)]
pub struct Confusion {
    matrix: Vec<Vec<u64>>,
}

impl Confusion {
    pub fn new(n_classes: usize) -> Confusion {
        Confusion { matrix: vec![vec![0; n_classes]; n_classes] }
    }

    pub fn record(&mut self, predicted: usize, target: usize) {
        self.matrix[target][predicted] += 1;
    }

    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }

    pub fn total(&self) -> u64 {
        self.matrix.iter().flatten().sum()
    }

    pub fn matrix(&self) -> &[Vec<u64>] {
        &self.matrix
    }

    pub fn counts(&self, c: usize) -> ClassCounts {
        let n = self.n_classes();
        let tp = self.matrix[c][c];
        let fp: u64 = (0..n).filter(|&t| t != c).map(|t| self.matrix[t][c]).sum();
        let fn_: u64 = (0..n).filter(|&p| p != c).map(|p| self.matrix[c][p]).sum();
        ClassCounts { tp, fp, fn_, tn: self.total() - tp - fp - fn_ }
    }

    /// Fraction of samples on the diagonal.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: u64 = (0..self.n_classes()).map(|c| self.matrix[c][c]).sum();
        correct as f64 / total as f64
    }

    /// Macro-averaged `tp / (tp + fp)`; a class never predicted scores 0.
    pub fn precision(&self) -> f64 {
        self.macro_average(|c| (c.tp, c.tp + c.fp))
    }

    /// Macro-averaged `tp / (tp + fn)`; a class never seen scores 0.
    pub fn recall(&self) -> f64 {
        self.macro_average(|c| (c.tp, c.tp + c.fn_))
    }

    fn macro_average(&self, ratio: impl Fn(ClassCounts) -> (u64, u64)) -> f64 {
        let n = self.n_classes();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = (0..n)
            .map(|c| match ratio(self.counts(c)) {
                (_, 0) => 0.0,
                (num, den) => num as f64 / den as f64,
            })
            .sum();
        sum / n as f64
    }
}

/// One evaluated sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
    pub output: Vec<f64>,
}

impl Network {
    /// Compares the argmax of the network output with the argmax of the
    /// target for every sample column.
    pub fn confusion(&mut self, inputs: TensorView<'_>, targets: TensorView<'_>) -> Confusion {
        assert_eq!(inputs.cols(), targets.cols(), "inputs and targets hold different sample counts");
        let mut confusion = Confusion::new(self.output_size());
        for s in 0..inputs.cols() {
            let predicted = self.forward(inputs.col(s)).argmax_in_column();
            confusion.record(predicted, targets.col(s).argmax_in_column());
        }
        confusion
    }

    /// Correct argmax classifications over total samples.
    pub fn accuracy(&mut self, inputs: TensorView<'_>, targets: TensorView<'_>) -> f64 {
        self.confusion(inputs, targets).accuracy()
    }

    /// Input, target and network output for every row of `data`, in row order.
    pub fn results(&mut self, data: &Dataset) -> Result<Vec<Prediction>> {
        let (x, y) = data.view().samples(self.input_size())?;
        Ok((0..x.cols())
            .map(|s| Prediction {
                input: x.col(s).to_vec(),
                target: y.col(s).to_vec(),
                output: self.forward(x.col(s)).to_vec(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction::*;
    use crate::math::Tensor;
    use crate::network::Architecture;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn counts_are_one_vs_rest() {
        let mut cm = Confusion::new(3);
        for (p, t) in [(0, 0), (0, 0), (1, 0), (1, 1), (2, 1), (2, 2)] {
            cm.record(p, t);
        }
        assert_eq!(cm.counts(0), ClassCounts { tp: 2, fp: 0, fn_: 1, tn: 3 });
        assert_eq!(cm.counts(1), ClassCounts { tp: 1, fp: 1, fn_: 1, tn: 3 });
        assert_eq!(cm.counts(2), ClassCounts { tp: 1, fp: 1, fn_: 0, tn: 4 });
        assert!(approx_eq(cm.accuracy(), 4.0 / 6.0));
        assert!(approx_eq(cm.precision(), (1.0 + 0.5 + 0.5) / 3.0));
        assert!(approx_eq(cm.recall(), (2.0 / 3.0 + 0.5 + 1.0) / 3.0));
    }

    #[test]
    fn ratios_are_real_valued() {
        let mut cm = Confusion::new(2);
        cm.record(0, 0);
        cm.record(0, 1);
        cm.record(1, 1);
        // Class 0 precision 1/2, class 1 precision 1/1.
        assert!(approx_eq(cm.precision(), 0.75));
        assert!(approx_eq(cm.accuracy(), 2.0 / 3.0));
    }

    #[test]
    fn empty_classes_score_zero() {
        let mut cm = Confusion::new(2);
        cm.record(0, 0);
        assert!(approx_eq(cm.precision(), 0.5));
        assert!(approx_eq(cm.recall(), 0.5));
        assert_eq!(Confusion::new(2).accuracy(), 0.0);
    }

    #[test]
    fn network_classifies_by_argmax() {
        // Output equals the input, so the predicted class is the input argmax.
        let arch = Architecture::new(vec![2, 2], vec![Identity]).unwrap();
        let mut net = Network::new(&arch).unwrap();
        net.layers_mut()[0].weights_mut().copy_from(&Tensor::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap());
        net.layers_mut()[0].biases_mut().fill(0.0);

        let x = Tensor::from_vec(2, 3, vec![0.9, 0.1, 0.4, 0.1, 0.9, 0.6]).unwrap();
        let y = Tensor::from_vec(2, 3, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        assert!(approx_eq(net.accuracy(x.view(), y.view()), 2.0 / 3.0));
        assert_eq!(net.confusion(x.view(), y.view()).counts(1).fp, 1);
    }

    #[test]
    fn results_follow_row_order() {
        let arch = Architecture::new(vec![1, 1], vec![Identity]).unwrap();
        let mut net = Network::new(&arch).unwrap();
        net.layers_mut()[0].weights_mut().fill(2.0);
        net.layers_mut()[0].biases_mut().fill(0.0);
        let data = Dataset::from_rows(&[vec![1.0, 2.0], vec![3.0, 5.0]]).unwrap();
        let results = net.results(&data).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1], Prediction { input: vec![3.0], target: vec![5.0], output: vec![6.0] });
    }
}
