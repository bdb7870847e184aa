//! The regression core: a bank of sine terms summed with a learned bias.

use crate::model::error::ModelError;
use crate::model::DayPredictor;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Standard deviation of the random-normal kernel initializer.
pub const INIT_STD_DEV: f64 = 0.05;

/// Sine terms used by every baseline model.
pub const DEFAULT_NUMBER_OF_SINUSES: usize = 4;

/// One `amplitude * sin(frequency * x + phase)` term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SineTerm {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl SineTerm {
    fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.frequency.is_finite() && self.phase.is_finite()
    }
}

/// `f(x) = Σ amplitude_i * sin(frequency_i * x + phase_i) + bias`
///
/// Takes a single relative day index as input. The architecture is fully described by
/// `number_of_sinuses`, so a model can be rebuilt from that hyperparameter alone and
/// then receive saved weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SineRegression {
    pub number_of_sinuses: usize,
    pub kernel: Vec<SineTerm>,
    pub bias: f64,
}

impl SineRegression {
    /// Freshly initialized core: kernel drawn from N(0, 0.05²), bias zero.
    pub fn new(number_of_sinuses: usize) -> Self {
        Self::with_rng(number_of_sinuses, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(number_of_sinuses: usize, rng: &mut R) -> Self {
        let mut draw = || -> f64 {
            let z: f64 = StandardNormal.sample(rng);
            INIT_STD_DEV * z
        };
        let kernel = (0..number_of_sinuses)
            .map(|_| SineTerm {
                amplitude: draw(),
                frequency: draw(),
                phase: draw(),
            })
            .collect();
        Self {
            number_of_sinuses,
            kernel,
            bias: 0.0,
        }
    }

    /// Checks that the kernel matches the declared architecture.
    pub fn check_shape(&self) -> Result<(), ModelError> {
        if self.kernel.len() != self.number_of_sinuses {
            return Err(ModelError::KernelShape {
                expected: self.number_of_sinuses,
                found: self.kernel.len(),
            });
        }
        Ok(())
    }

    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.kernel.iter().all(SineTerm::is_finite)
    }

    /// Number of trainable scalars (`3 * number_of_sinuses + 1`).
    pub fn parameter_count(&self) -> usize {
        self.kernel.len() * 3 + 1
    }

    /// Flattens the weights as `[a_0, f_0, p_0, a_1, ..., bias]`.
    pub fn parameters(&self) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.parameter_count());
        for term in &self.kernel {
            params.extend([term.amplitude, term.frequency, term.phase]);
        }
        params.push(self.bias);
        params
    }

    /// Inverse of [`SineRegression::parameters`].
    pub fn set_parameters(&mut self, params: &[f64]) {
        debug_assert_eq!(params.len(), self.parameter_count());
        for (term, chunk) in self.kernel.iter_mut().zip(params.chunks_exact(3)) {
            term.amplitude = chunk[0];
            term.frequency = chunk[1];
            term.phase = chunk[2];
        }
        if let Some(bias) = params.last() {
            self.bias = *bias;
        }
    }

    /// Adds `scale * ∂f/∂θ (x)` to `grad`, laid out like [`SineRegression::parameters`].
    pub fn accumulate_gradient(&self, x: f64, scale: f64, grad: &mut [f64]) {
        for (i, term) in self.kernel.iter().enumerate() {
            let angle = term.frequency * x + term.phase;
            let (sin, cos) = angle.sin_cos();
            grad[3 * i] += scale * sin;
            grad[3 * i + 1] += scale * term.amplitude * cos * x;
            grad[3 * i + 2] += scale * term.amplitude * cos;
        }
        let last = grad.len() - 1;
        grad[last] += scale;
    }
}

impl DayPredictor for SineRegression {
    fn predict(&self, x: f64) -> f64 {
        let mut result = 0.0;
        for term in &self.kernel {
            result += term.amplitude * (term.frequency * x + term.phase).sin();
        }
        result + self.bias
    }
}
