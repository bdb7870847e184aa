use crate::fine_tune::error::FineTuneError;
use crate::utils::write_atomic;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Normalization statistics and bookkeeping stored next to every model artifact.
///
/// Written once at initial training and rewritten by each fine-tuning pass. Serialized as
/// `{mean, std_dev, denoised_length, city, parameter, updated_date}`; `updated_date` is
/// absent from baselines that were never fine-tuned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub mean: f64,
    pub std_dev: f64,
    /// Offset subtracted from absolute day indices to get the model's relative day index.
    pub denoised_length: i64,
    pub city: String,
    pub parameter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<NaiveDate>,
}

impl ModelMetadata {
    pub fn load(path: &Path) -> Result<Self, FineTuneError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FineTuneError::MetadataRead(path.to_path_buf(), e))?;
        serde_json::from_str(&json)
            .map_err(|e| FineTuneError::MetadataParse(path.to_path_buf(), e))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, FineTuneError> {
        serde_json::to_vec(self).map_err(FineTuneError::MetadataEncode)
    }

    pub fn save(&self, path: &Path) -> Result<(), FineTuneError> {
        let json = self.to_json()?;
        write_atomic(path, &json).map_err(|e| FineTuneError::MetadataWrite(path.to_path_buf(), e))
    }

    /// Copy of the baseline statistics stamped with a new city, parameter and update date.
    pub fn refreshed(&self, city: &str, parameter: &str, updated_date: NaiveDate) -> Self {
        Self {
            mean: self.mean,
            std_dev: self.std_dev,
            denoised_length: self.denoised_length,
            city: city.to_string(),
            parameter: parameter.to_string(),
            updated_date: Some(updated_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_baseline_without_updated_date() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"{"mean": 20.0, "std_dev": 5.0, "denoised_length": 100, "city": "Hanoi", "parameter": "temperature"}"#;
        let metadata: ModelMetadata = serde_json::from_str(json)?;
        assert_eq!(metadata.denoised_length, 100);
        assert_eq!(metadata.updated_date, None);
        Ok(())
    }

    #[test]
    fn test_save_writes_schema() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let updated = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let path = dir.path().join("Hanoi_temperature_info.json");
        let metadata = ModelMetadata {
            mean: 20.0,
            std_dev: 5.0,
            denoised_length: 100,
            city: "Hanoi".to_string(),
            parameter: "temperature".to_string(),
            updated_date: None,
        }
        .refreshed("Hanoi", "temperature", updated);
        metadata.save(&path)?;

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(value["updated_date"], "2025-04-09");
        assert_eq!(value["denoised_length"], 100);
        assert_eq!(ModelMetadata::load(&path)?, metadata);
        Ok(())
    }

    #[test]
    fn test_load_reports_path_on_bad_json() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken_info.json");
        std::fs::write(&path, "{not json")?;
        assert!(matches!(
            ModelMetadata::load(&path),
            Err(FineTuneError::MetadataParse(p, _)) if p == path
        ));
        Ok(())
    }
}
