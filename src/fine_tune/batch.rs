//! Refreshes every baseline model found in a [`ModelLayout`].

use crate::fine_tune::archive::zip_directory;
use crate::fine_tune::data::NoUpdateReason;
use crate::fine_tune::error::FineTuneError;
use crate::fine_tune::layout::{parse_model_stem, ModelLayout};
use crate::fine_tune::tuner::{fine_tune_model, FineTuneConfig, FineTuneOutcome};
use crate::model::artifact::{ModelFormat, NATIVE_EXTENSION};
use crate::types::metadata::ModelMetadata;
use crate::utils::{ensure_dir_exists, write_atomic};
use log::{info, warn};
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingMetadata(PathBuf),
    MalformedName,
    MissingCityData(PathBuf),
    UnreadableMetadata(String),
    NoUpdate(NoUpdateReason),
    Failed(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingMetadata(path) => {
                write!(f, "metadata file not found: {}", path.display())
            }
            SkipReason::MalformedName => write!(f, "file name is not {{city}}_{{parameter}}"),
            SkipReason::MissingCityData(path) => {
                write!(f, "city data file not found: {}", path.display())
            }
            SkipReason::UnreadableMetadata(e) => write!(f, "unreadable metadata: {e}"),
            SkipReason::NoUpdate(reason) => write!(f, "no update: {reason}"),
            SkipReason::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedModel {
    pub name: String,
    pub reason: SkipReason,
}

/// A model that was updated, but from random weights instead of its baseline's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreshInitModel {
    pub name: String,
    pub reason: String,
}

/// What happened to every baseline in one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub updated: Vec<String>,
    pub skipped: Vec<SkippedModel>,
    pub fresh_init: Vec<FreshInitModel>,
    pub archives: Vec<PathBuf>,
}

impl BatchReport {
    fn skip(&mut self, name: &str, reason: SkipReason) {
        warn!("Skipping {}: {}", name, reason);
        self.skipped.push(SkippedModel {
            name: name.to_string(),
            reason,
        });
    }

    pub fn save(&self, path: &Path) -> Result<(), FineTuneError> {
        let json = serde_json::to_vec_pretty(self).map_err(FineTuneError::ReportEncode)?;
        write_atomic(path, &json).map_err(|e| FineTuneError::ReportWrite(path.to_path_buf(), e))
    }
}

/// Baseline native artifacts in `dir`, sorted by file name.
fn list_baselines(dir: &Path) -> Result<Vec<PathBuf>, FineTuneError> {
    let io_error = |e: std::io::Error| FineTuneError::ModelDirRead(dir.to_path_buf(), e);
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && ModelFormat::from_path(&path) == ModelFormat::Native {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Fine-tunes every `{city}_{parameter}.json` baseline and writes the refreshed artifacts.
///
/// Problems with a single model are recorded in the report and never stop the batch.
/// Only setup failures are returned as errors: creating the output directories,
/// listing the baselines or writing an archive. Archives are written only when at least
/// one model was updated.
pub fn update_models(
    layout: &ModelLayout,
    config: &FineTuneConfig,
) -> Result<BatchReport, FineTuneError> {
    for dir in layout.output_dirs() {
        ensure_dir_exists(&dir).map_err(|e| FineTuneError::OutputDirCreation(dir.clone(), e))?;
    }

    let baselines = list_baselines(&layout.baseline_models_dir())?;
    info!(
        "Found {} baseline models in {}",
        baselines.len(),
        layout.baseline_models_dir().display()
    );

    let mut report = BatchReport::default();
    for base_model_path in baselines {
        let Some(stem) = base_model_path.file_stem().map(|s| s.to_string_lossy().into_owned())
        else {
            continue;
        };
        update_one(layout, config, &base_model_path, &stem, &mut report);
    }

    if !report.updated.is_empty() {
        for dir in layout.output_dirs() {
            let zip_path = layout.archive_path(&dir);
            zip_directory(&dir, &zip_path)?;
            report.archives.push(zip_path);
        }
    }

    info!(
        "Updated {} models, skipped {}, {} from fresh initialization",
        report.updated.len(),
        report.skipped.len(),
        report.fresh_init.len()
    );
    Ok(report)
}

fn update_one(
    layout: &ModelLayout,
    config: &FineTuneConfig,
    base_model_path: &Path,
    stem: &str,
    report: &mut BatchReport,
) {
    let info_path = layout.baseline_info_file(stem);
    if !info_path.is_file() {
        report.skip(stem, SkipReason::MissingMetadata(info_path));
        return;
    }
    let Some((city, parameter)) = parse_model_stem(stem) else {
        report.skip(stem, SkipReason::MalformedName);
        return;
    };
    let city_file = layout.city_file(city);
    if !city_file.is_file() {
        report.skip(stem, SkipReason::MissingCityData(city_file));
        return;
    }
    let metadata = match ModelMetadata::load(&info_path) {
        Ok(metadata) => metadata,
        Err(e) => {
            report.skip(stem, SkipReason::UnreadableMetadata(e.to_string()));
            return;
        }
    };

    info!("Updating model {}", stem);
    let tuned = match fine_tune_model(&city_file, parameter, base_model_path, &metadata, config) {
        Ok(FineTuneOutcome::Updated(tuned)) => tuned,
        Ok(FineTuneOutcome::NoUpdate(reason)) => {
            report.skip(stem, SkipReason::NoUpdate(reason));
            return;
        }
        Err(e) => {
            report.skip(stem, SkipReason::Failed(e.to_string()));
            return;
        }
    };

    if let Err(e) = layout.updated_bundle(stem).export(&tuned.model, &tuned.metadata) {
        report.skip(stem, SkipReason::Failed(e.to_string()));
        return;
    }
    if let Some(reason) = tuned.weights.fallback_reason() {
        report.fresh_init.push(FreshInitModel {
            name: stem.to_string(),
            reason: reason.to_string(),
        });
    }
    info!(
        "Saved {}.{} and its metadata and compact forms",
        stem, NATIVE_EXTENSION
    );
    report.updated.push(stem.to_string());
}
