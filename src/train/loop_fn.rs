use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::{EpochStats, FitReport, FitStatus};
use crate::train::train_config::{GradientMethod, TrainConfig};

impl Network {
    /// Trains on `data` with mini-batch SGD until the full-dataset MSE drops
    /// to `config.min_error` or `config.max_epochs` epochs have run.
    ///
    /// Each row of `data` holds `input_size` feature columns followed by
    /// `output_size` target columns. Every epoch shuffles the rows in place,
    /// then walks them in batches of `config.batch_size` (the last batch may
    /// be shorter). Per batch a single gradient accumulator is zeroed, every
    /// sample is accumulated into it, and one update scaled by
    /// `learning_rate / batch_len` is applied.
    ///
    /// # Early termination
    /// The loop ends with `FitStatus::Stopped` if `config.stop_flag` is set
    /// or the `progress_tx` receiver has been dropped.
    ///
    /// # Errors
    /// `InvalidConfig` if a hyperparameter is out of range or the dataset's
    /// column count does not match the network.
    pub fn fit(&mut self, data: &mut Dataset, config: &TrainConfig) -> Result<FitReport> {
        let (input_size, output_size) = (self.input_size(), self.output_size());
        if data.cols() != input_size + output_size {
            return Err(Error::InvalidConfig(format!(
                "dataset has {} columns, network needs {input_size} inputs + {output_size} targets",
                data.cols()
            )));
        }
        config.validate(data.len())?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let optimizer = Sgd::new(config.learning_rate);
        let mut grad = self.zeros_like();

        log::info!(
            "training on {} samples: batch size {}, learning rate {}, target cost {}",
            data.len(),
            config.batch_size,
            config.learning_rate,
            config.min_error
        );

        let mut epochs = 0;
        let mut cost = full_cost(self, data)?;
        let status = loop {
            if cost <= config.min_error {
                break FitStatus::Converged;
            }
            if epochs >= config.max_epochs {
                break FitStatus::Exhausted;
            }
            if stop_requested(config) {
                log::warn!("stop requested after {epochs} epochs");
                break FitStatus::Stopped;
            }

            let started = Instant::now();
            data.shuffle(&mut rng);
            for (b, batch) in data.batches(config.batch_size).enumerate() {
                let (x, y) = batch.samples(input_size)?;
                grad.reset_to_zero();
                match config.gradient {
                    GradientMethod::Backprop => self.backpropagate(&mut grad, x, y),
                    GradientMethod::FiniteDifference { epsilon } => {
                        self.numerical_gradient(&mut grad, x, y, epsilon)
                    }
                }
                self.apply_gradient(&grad, &optimizer, x.cols());
                log::trace!("epoch {} batch {b}: {} samples", epochs + 1, x.cols());
            }
            epochs += 1;
            cost = full_cost(self, data)?;
            log::debug!("epoch {epochs}: cost {cost:.6}");

            if let Some(ref tx) = config.progress_tx {
                let stats = EpochStats {
                    epoch: epochs,
                    max_epochs: config.max_epochs,
                    cost,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                if tx.send(stats).is_err() {
                    log::warn!("progress receiver dropped after {epochs} epochs");
                    break FitStatus::Stopped;
                }
            }
        };

        log::info!("training finished after {epochs} epochs: cost {cost:.6} ({status:?})");
        Ok(FitReport { epochs, cost, status })
    }
}

fn full_cost(network: &mut Network, data: &Dataset) -> Result<f64> {
    let (x, y) = data.view().samples(network.input_size())?;
    Ok(network.cost(x, y))
}

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
}
