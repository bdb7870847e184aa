//! Mini-batch Adam refinement of a [`SineRegression`] core with validation-based early stopping.

use crate::model::error::ModelError;
use crate::model::sine_regression::SineRegression;
use crate::model::DayPredictor;
use bon::Builder;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

/// Hyperparameters for one fine-tuning pass.
///
/// The defaults are the values every deployed model is refreshed with.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct TrainingConfig {
    #[builder(default = 0.0005)]
    pub learning_rate: f64,
    #[builder(default = 0.9)]
    pub beta_1: f64,
    #[builder(default = 0.999)]
    pub beta_2: f64,
    #[builder(default = 1e-7)]
    pub epsilon: f64,
    #[builder(default = 50)]
    pub max_epochs: usize,
    /// Upper bound for the batch size; the effective size is also capped at half the sample.
    #[builder(default = 16)]
    pub max_batch_size: usize,
    /// Fraction of samples, taken from the end, held out for validation.
    #[builder(default = 0.2)]
    pub validation_split: f64,
    /// Epochs without validation improvement before training stops.
    #[builder(default = 10)]
    pub patience: usize,
    #[builder(default = true)]
    pub restore_best_weights: bool,
    /// Fixes shuffling for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TrainingConfig {
    /// `min(max_batch_size, n / 2)`, but never below one sample.
    pub fn batch_size(&self, sample_count: usize) -> usize {
        self.max_batch_size.min(sample_count / 2).max(1)
    }

    /// Number of leading samples used for training; the rest is the validation set.
    pub fn train_len(&self, sample_count: usize) -> usize {
        let split_at = (sample_count as f64 * (1.0 - self.validation_split)).floor() as usize;
        if split_at == 0 {
            sample_count
        } else {
            split_at.min(sample_count)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Mean squared error on the training set.
    pub loss: f64,
    pub mae: f64,
    pub val_loss: Option<f64>,
    pub val_mae: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
    pub batch_size: usize,
    /// Epoch whose weights the core ends with (when best weights are restored).
    pub best_epoch: usize,
    pub stopped_early: bool,
}

/// Adam with the bias correction folded into the step size.
struct Adam {
    learning_rate: f64,
    beta_1: f64,
    beta_2: f64,
    epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    fn new(config: &TrainingConfig, parameter_count: usize) -> Self {
        Self {
            learning_rate: config.learning_rate,
            beta_1: config.beta_1,
            beta_2: config.beta_2,
            epsilon: config.epsilon,
            m: vec![0.0; parameter_count],
            v: vec![0.0; parameter_count],
            t: 0,
        }
    }

    fn step(&mut self, params: &mut [f64], grad: &[f64]) {
        self.t += 1;
        let alpha = self.learning_rate * (1.0 - self.beta_2.powi(self.t)).sqrt()
            / (1.0 - self.beta_1.powi(self.t));
        for i in 0..params.len() {
            self.m[i] = self.beta_1 * self.m[i] + (1.0 - self.beta_1) * grad[i];
            self.v[i] = self.beta_2 * self.v[i] + (1.0 - self.beta_2) * grad[i] * grad[i];
            params[i] -= alpha * self.m[i] / (self.v[i].sqrt() + self.epsilon);
        }
    }
}

fn evaluate(core: &SineRegression, x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.is_empty() {
        return None;
    }
    let n = x.len() as f64;
    let (squared, absolute) = x.iter().zip(y).fold((0.0, 0.0), |(sq, abs), (x, y)| {
        let residual = core.predict(*x) - y;
        (sq + residual * residual, abs + residual.abs())
    });
    Some((squared / n, absolute / n))
}

/// Fits `core` to `(x, y)` in place and returns the per-epoch history.
///
/// Samples are split in their given order: the first [`TrainingConfig::train_len`] are
/// trained on (shuffled every epoch), the remainder is held out. Training stops after
/// `max_epochs`, or once the monitored loss has not improved for `patience` epochs. The
/// monitored loss is the validation loss, or the training loss if nothing is held out.
pub fn fit(
    core: &mut SineRegression,
    x: &[f64],
    y: &[f64],
    config: &TrainingConfig,
) -> Result<TrainingHistory, ModelError> {
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            features: x.len(),
            targets: y.len(),
        });
    }
    if x.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    core.check_shape()?;

    let batch_size = config.batch_size(x.len());
    let train_len = config.train_len(x.len());
    let (x_train, x_val) = x.split_at(train_len);
    let (y_train, y_val) = y.split_at(train_len);
    debug!(
        "Training on {} samples, validating on {}, batch size {}",
        x_train.len(),
        x_val.len(),
        batch_size
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut optimizer = Adam::new(config, core.parameter_count());
    let mut params = core.parameters();
    let mut grad = vec![0.0; params.len()];
    let mut order: Vec<usize> = (0..x_train.len()).collect();

    let mut history = TrainingHistory {
        epochs: Vec::with_capacity(config.max_epochs),
        batch_size,
        best_epoch: 0,
        stopped_early: false,
    };
    let mut best_loss = f64::INFINITY;
    let mut best_params = params.clone();
    let mut wait = 0;

    for epoch in 0..config.max_epochs {
        order.shuffle(&mut rng);
        for batch in order.chunks(batch_size) {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let scale = 2.0 / batch.len() as f64;
            for &i in batch {
                let residual = core.predict(x_train[i]) - y_train[i];
                core.accumulate_gradient(x_train[i], scale * residual, &mut grad);
            }
            optimizer.step(&mut params, &grad);
            core.set_parameters(&params);
        }

        let (loss, mae) = evaluate(core, x_train, y_train).unwrap_or((f64::NAN, f64::NAN));
        let validation = evaluate(core, x_val, y_val);
        let metrics = EpochMetrics {
            epoch,
            loss,
            mae,
            val_loss: validation.map(|(l, _)| l),
            val_mae: validation.map(|(_, m)| m),
        };
        debug!(
            "Epoch {}/{}: loss {:.6} mae {:.6} val_loss {:?}",
            epoch + 1,
            config.max_epochs,
            loss,
            mae,
            metrics.val_loss
        );
        history.epochs.push(metrics);

        let monitored = metrics.val_loss.unwrap_or(loss);
        if monitored < best_loss {
            best_loss = monitored;
            best_params.clone_from(&params);
            history.best_epoch = epoch;
            wait = 0;
        } else {
            wait += 1;
            if wait >= config.patience {
                info!(
                    "Early stopping after epoch {}; best epoch was {}",
                    epoch + 1,
                    history.best_epoch + 1
                );
                history.stopped_early = true;
                break;
            }
        }
    }

    if config.restore_best_weights && best_loss.is_finite() {
        core.set_parameters(&best_params);
    } else {
        history.best_epoch = history.epochs.len().saturating_sub(1);
    }

    Ok(history)
}
