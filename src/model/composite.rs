//! The three-stage inference pipeline: day adjustment → sine core → de-normalization.

use crate::model::sine_regression::{SineRegression, SineTerm};
use crate::model::DayPredictor;
use serde::{Deserialize, Serialize};

/// Shifts the incoming day index by the stored offset: `x + denoised_length`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayAdjustment {
    pub denoised_length: f64,
}

impl DayAdjustment {
    pub fn apply(&self, day: f64) -> f64 {
        day + self.denoised_length
    }
}

/// Maps a normalized prediction back to physical units: `y * std_dev + mean`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Denormalize {
    pub mean: f64,
    pub std_dev: f64,
}

impl Denormalize {
    pub fn apply(&self, value: f64) -> f64 {
        value * self.std_dev + self.mean
    }
}

/// A complete forecast model with one named slot per stage.
///
/// Stages are assembled and taken apart by field access; the trainable core is always
/// `self.core`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeModel {
    pub day_adjustment: DayAdjustment,
    pub core: SineRegression,
    pub denormalize: Denormalize,
}

impl CompositeModel {
    pub fn assemble(denoised_length: i64, core: SineRegression, mean: f64, std_dev: f64) -> Self {
        Self {
            day_adjustment: DayAdjustment {
                denoised_length: denoised_length as f64,
            },
            core,
            denormalize: Denormalize { mean, std_dev },
        }
    }
}

impl DayPredictor for CompositeModel {
    fn predict(&self, day: f64) -> f64 {
        let adjusted = self.day_adjustment.apply(day);
        let normalized = self.core.predict(adjusted);
        self.denormalize.apply(normalized)
    }
}

/// Flat inference-only form of a [`CompositeModel`], used for the compact artifact.
///
/// Evaluates with the same operation order as the composite, so both forms produce
/// identical outputs for the same weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceModel {
    pub offset: f64,
    pub terms: Vec<[f64; 3]>,
    pub bias: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&CompositeModel> for InferenceModel {
    fn from(model: &CompositeModel) -> Self {
        Self {
            offset: model.day_adjustment.denoised_length,
            terms: model
                .core
                .kernel
                .iter()
                .map(|t| [t.amplitude, t.frequency, t.phase])
                .collect(),
            bias: model.core.bias,
            mean: model.denormalize.mean,
            std_dev: model.denormalize.std_dev,
        }
    }
}

impl From<&InferenceModel> for CompositeModel {
    fn from(model: &InferenceModel) -> Self {
        let kernel: Vec<SineTerm> = model
            .terms
            .iter()
            .map(|[amplitude, frequency, phase]| SineTerm {
                amplitude: *amplitude,
                frequency: *frequency,
                phase: *phase,
            })
            .collect();
        Self {
            day_adjustment: DayAdjustment {
                denoised_length: model.offset,
            },
            core: SineRegression {
                number_of_sinuses: kernel.len(),
                kernel,
                bias: model.bias,
            },
            denormalize: Denormalize {
                mean: model.mean,
                std_dev: model.std_dev,
            },
        }
    }
}

impl DayPredictor for InferenceModel {
    fn predict(&self, day: f64) -> f64 {
        let x = day + self.offset;
        let mut result = 0.0;
        for [amplitude, frequency, phase] in &self.terms {
            result += amplitude * (frequency * x + phase).sin();
        }
        (result + self.bias) * self.std_dev + self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model() -> CompositeModel {
        let core = SineRegression::with_rng(4, &mut StdRng::seed_from_u64(42));
        CompositeModel::assemble(100, core, 20.0, 5.0)
    }

    #[test]
    fn test_stages_compose() {
        let model = model();
        let day = 3.0;
        let expected = model.core.predict(day + 100.0) * 5.0 + 20.0;
        assert_eq!(model.predict(day), expected);
    }

    #[test]
    fn test_zero_core_predicts_mean() {
        let mut model = model();
        model.core.set_parameters(&vec![0.0; model.core.parameter_count()]);
        assert_eq!(model.predict(-50.0), 20.0);
        assert_eq!(model.predict(1.0e6), 20.0);
    }

    #[test]
    fn test_inference_form_is_bit_identical() {
        let model = model();
        let compact = InferenceModel::from(&model);
        for day in [-1000.0, -1.5, 0.0, 0.5, 7.0, 365.25, 1.0e5] {
            assert_eq!(model.predict(day).to_bits(), compact.predict(day).to_bits());
        }
        assert_eq!(CompositeModel::from(&compact), model);
    }

    #[test]
    fn test_predict_many() {
        let model = model();
        let days = [0.0, 1.0, 2.0];
        let predictions = model.predict_many(&days);
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[2], model.predict(2.0));
    }
}
