use crate::fine_tune::data::{select_training_sample, NoUpdateReason};
use crate::fine_tune::error::FineTuneError;
use crate::model::artifact::{recover_core_with_rng, WeightSource};
use crate::model::composite::CompositeModel;
use crate::model::normalize::Normalizer;
use crate::model::sine_regression::DEFAULT_NUMBER_OF_SINUSES;
use crate::model::trainer::{fit, TrainingConfig, TrainingHistory};
use crate::types::city_frame::CityFrame;
use crate::types::day_index::{REFRESH_WINDOW_END, REFRESH_WINDOW_START};
use crate::types::metadata::ModelMetadata;
use bon::Builder;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Settings shared by every model refreshed in one run.
#[derive(Debug, Clone, Builder)]
pub struct FineTuneConfig {
    #[builder(default = REFRESH_WINDOW_START)]
    pub window_start: NaiveDate,
    #[builder(default = REFRESH_WINDOW_END)]
    pub window_end: NaiveDate,
    /// Valid rows required inside the window.
    #[builder(default = 7)]
    pub min_rows: usize,
    #[builder(default = DEFAULT_NUMBER_OF_SINUSES)]
    pub number_of_sinuses: usize,
    #[builder(default)]
    pub training: TrainingConfig,
    /// Stamped into the refreshed metadata as `updated_date`.
    #[builder(default = Local::now().date_naive())]
    pub today: NaiveDate,
}

impl Default for FineTuneConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
pub struct FineTunedModel {
    pub model: CompositeModel,
    pub metadata: ModelMetadata,
    /// Where the starting weights came from, before training.
    pub weights: WeightSource,
    pub history: TrainingHistory,
}

#[derive(Debug)]
pub enum FineTuneOutcome {
    Updated(Box<FineTunedModel>),
    NoUpdate(NoUpdateReason),
}

/// Refines the baseline at `base_model_path` on the recent observations in `city_file`.
///
/// New values are normalized with the baseline's statistics and days are shifted by its
/// `denoised_length`, so training continues on the scale the baseline was fit on. The
/// returned metadata keeps those statistics and gets `config.today` as its update date.
///
/// Data that cannot support an update (empty window, missing column, too few rows) is
/// reported as [`FineTuneOutcome::NoUpdate`]; nothing is written either way.
pub fn fine_tune_model(
    city_file: &Path,
    parameter: &str,
    base_model_path: &Path,
    metadata: &ModelMetadata,
    config: &FineTuneConfig,
) -> Result<FineTuneOutcome, FineTuneError> {
    let frame = CityFrame::read_csv(city_file)?;
    let sample = match select_training_sample(
        &frame,
        parameter,
        config.window_start,
        config.window_end,
        config.min_rows,
    )? {
        Ok(sample) => sample,
        Err(reason) => {
            warn!(
                "No update for {} {}: {}",
                city_file.display(),
                parameter,
                reason
            );
            return Ok(FineTuneOutcome::NoUpdate(reason));
        }
    };

    let normalizer = Normalizer::from_column(&sample.values)?
        .with_statistics(vec![metadata.mean], vec![metadata.std_dev])?;
    let y: Vec<f64> = normalizer.normalize().into_iter().map(|row| row[0]).collect();
    let x = sample.relative_days(metadata.denoised_length);

    let mut rng = match config.training.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let weights = recover_core_with_rng(base_model_path, config.number_of_sinuses, &mut rng);
    let mut core = weights.core().clone();
    let history = fit(&mut core, &x, &y, &config.training)?;

    let model = CompositeModel::assemble(
        metadata.denoised_length,
        core,
        metadata.mean,
        metadata.std_dev,
    );
    let city = city_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| metadata.city.clone());
    let metadata = metadata.refreshed(&city, parameter, config.today);

    info!(
        "Fine-tuned {} {} on {} rows over {} epochs{}",
        city,
        parameter,
        sample.len(),
        history.epochs.len(),
        if weights.is_fresh_init() {
            " (from fresh initialization)"
        } else {
            ""
        }
    );

    Ok(FineTuneOutcome::Updated(Box::new(FineTunedModel {
        model,
        metadata,
        weights,
        history,
    })))
}
