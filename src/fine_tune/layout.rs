use crate::fine_tune::export::ArtifactBundle;
use crate::model::artifact::{COMPACT_EXTENSION, NATIVE_EXTENSION};
use std::path::{Path, PathBuf};

/// Directory names of the model refresh working tree.
///
/// ```text
/// cities/               per-city CSV files
/// model_keras/          baseline native artifacts
/// model_info/           baseline metadata
/// modelzz/              baseline compact artifacts
/// model_keras_updated/  refreshed native artifacts
/// model_info_updated/   refreshed metadata
/// model_updated/        refreshed compact artifacts
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLayout {
    root: PathBuf,
}

impl ModelLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cities_dir(&self) -> PathBuf {
        self.root.join("cities")
    }

    pub fn baseline_models_dir(&self) -> PathBuf {
        self.root.join("model_keras")
    }

    pub fn baseline_info_dir(&self) -> PathBuf {
        self.root.join("model_info")
    }

    pub fn baseline_compact_dir(&self) -> PathBuf {
        self.root.join("modelzz")
    }

    pub fn updated_models_dir(&self) -> PathBuf {
        self.root.join("model_keras_updated")
    }

    pub fn updated_info_dir(&self) -> PathBuf {
        self.root.join("model_info_updated")
    }

    pub fn updated_compact_dir(&self) -> PathBuf {
        self.root.join("model_updated")
    }

    /// The three output directories, in archiving order.
    pub fn output_dirs(&self) -> [PathBuf; 3] {
        [
            self.updated_models_dir(),
            self.updated_info_dir(),
            self.updated_compact_dir(),
        ]
    }

    pub fn city_file(&self, city: &str) -> PathBuf {
        self.cities_dir().join(format!("{city}.csv"))
    }

    pub fn baseline_info_file(&self, stem: &str) -> PathBuf {
        self.baseline_info_dir().join(info_file_name(stem))
    }

    /// `{dir}.zip` next to the directory.
    pub fn archive_path(&self, dir: &Path) -> PathBuf {
        let mut name = dir.file_name().unwrap_or(dir.as_os_str()).to_os_string();
        name.push(".zip");
        dir.with_file_name(name)
    }

    /// Output paths for the refreshed forms of model `stem`.
    pub fn updated_bundle(&self, stem: &str) -> ArtifactBundle {
        ArtifactBundle {
            native: self
                .updated_models_dir()
                .join(format!("{stem}.{NATIVE_EXTENSION}")),
            metadata: self.updated_info_dir().join(info_file_name(stem)),
            compact: self
                .updated_compact_dir()
                .join(format!("{stem}.{COMPACT_EXTENSION}")),
        }
    }
}

fn info_file_name(stem: &str) -> String {
    format!("{stem}_info.json")
}

/// Splits a model stem like `Hanoi_temperature` into `(city, parameter)`.
///
/// Empty segments are ignored. Segments after the parameter are ignored as well.
pub fn parse_model_stem(stem: &str) -> Option<(&str, &str)> {
    let mut parts = stem.split('_').filter(|p| !p.is_empty());
    let city = parts.next()?;
    let parameter = parts.next()?;
    Some((city, parameter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_stem() {
        assert_eq!(
            parse_model_stem("Hanoi_temperature"),
            Some(("Hanoi", "temperature"))
        );
        assert_eq!(
            parse_model_stem("New York_wind"),
            Some(("New York", "wind"))
        );
        assert_eq!(
            parse_model_stem("Hanoi_humidity_v2"),
            Some(("Hanoi", "humidity"))
        );
        assert_eq!(parse_model_stem("Hanoi"), None);
        assert_eq!(parse_model_stem("_temperature"), None);
        assert_eq!(parse_model_stem("Hanoi_"), None);
    }

    #[test]
    fn test_paths() {
        let layout = ModelLayout::new("/work");
        assert_eq!(
            layout.city_file("Hanoi"),
            PathBuf::from("/work/cities/Hanoi.csv")
        );
        assert_eq!(
            layout.baseline_info_file("Hanoi_temperature"),
            PathBuf::from("/work/model_info/Hanoi_temperature_info.json")
        );
        assert_eq!(
            layout.archive_path(&layout.updated_compact_dir()),
            PathBuf::from("/work/model_updated.zip")
        );

        let bundle = layout.updated_bundle("Hanoi_temperature");
        assert_eq!(
            bundle.native,
            PathBuf::from("/work/model_keras_updated/Hanoi_temperature.json")
        );
        assert_eq!(
            bundle.metadata,
            PathBuf::from("/work/model_info_updated/Hanoi_temperature_info.json")
        );
        assert_eq!(
            bundle.compact,
            PathBuf::from("/work/model_updated/Hanoi_temperature.bin")
        );
    }
}
