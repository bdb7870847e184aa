//! Persisted model forms and recovery of trained weights from them.
//!
//! The native form is pretty-printed JSON of the full [`CompositeModel`] and can be
//! trained further. The compact form is a bincode-encoded [`InferenceModel`] meant for
//! lightweight inference only.

use crate::model::composite::{CompositeModel, InferenceModel};
use crate::model::error::ModelError;
use crate::model::sine_regression::SineRegression;
use crate::utils::write_atomic;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const NATIVE_EXTENSION: &str = "json";
pub const COMPACT_EXTENSION: &str = "bin";
pub const FORMAT_VERSION: u32 = 1;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Native,
    Compact,
    Unknown,
}

impl ModelFormat {
    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(NATIVE_EXTENSION) => ModelFormat::Native,
            Some(COMPACT_EXTENSION) => ModelFormat::Compact,
            _ => ModelFormat::Unknown,
        }
    }
}

#[derive(Serialize)]
struct NativeArtifactRef<'a> {
    format_version: u32,
    model: &'a CompositeModel,
}

#[derive(Deserialize)]
struct NativeArtifact {
    format_version: u32,
    model: CompositeModel,
}

pub fn encode_native(model: &CompositeModel) -> Result<Vec<u8>, ModelError> {
    let artifact = NativeArtifactRef {
        format_version: FORMAT_VERSION,
        model,
    };
    serde_json::to_vec_pretty(&artifact).map_err(ModelError::NativeEncode)
}

pub fn save_native(model: &CompositeModel, path: &Path) -> Result<(), ModelError> {
    let json = encode_native(model)?;
    write_atomic(path, &json).map_err(|e| ModelError::ArtifactWrite(path.to_path_buf(), e))
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ModelError> {
    std::fs::read(path).map_err(|e| ModelError::ArtifactRead(path.to_path_buf(), e))
}

pub fn load_native(path: &Path) -> Result<CompositeModel, ModelError> {
    let bytes = read_artifact(path)?;
    let artifact: NativeArtifact = serde_json::from_slice(&bytes)
        .map_err(|e| ModelError::NativeDecode(path.to_path_buf(), e))?;
    if artifact.format_version != FORMAT_VERSION {
        return Err(ModelError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: artifact.format_version,
        });
    }
    Ok(artifact.model)
}

pub fn encode_compact(model: &InferenceModel) -> Result<Vec<u8>, ModelError> {
    bincode::serde::encode_to_vec(model, BINCODE_CONFIG)
        .map_err(|e| ModelError::CompactEncode(Box::new(e)))
}

pub fn save_compact(model: &InferenceModel, path: &Path) -> Result<(), ModelError> {
    let bytes = encode_compact(model)?;
    write_atomic(path, &bytes).map_err(|e| ModelError::ArtifactWrite(path.to_path_buf(), e))
}

pub fn load_compact(path: &Path) -> Result<InferenceModel, ModelError> {
    let bytes = read_artifact(path)?;
    let decoded = bincode::serde::decode_from_slice::<InferenceModel, _>(&bytes, BINCODE_CONFIG);
    let (model, _) =
        decoded.map_err(|e| ModelError::CompactDecode(path.to_path_buf(), Box::from(e)))?;
    Ok(model)
}

/// Where the core used for fine-tuning came from.
#[derive(Debug)]
pub enum WeightSource {
    /// Trained weights copied out of a saved composite.
    Recovered {
        core: SineRegression,
        artifact: PathBuf,
    },
    /// The saved composite could not be used; training starts from random weights.
    FreshInit {
        core: SineRegression,
        reason: ModelError,
    },
}

impl WeightSource {
    pub fn core(&self) -> &SineRegression {
        match self {
            WeightSource::Recovered { core, .. } | WeightSource::FreshInit { core, .. } => core,
        }
    }

    pub fn is_fresh_init(&self) -> bool {
        matches!(self, WeightSource::FreshInit { .. })
    }

    pub fn fallback_reason(&self) -> Option<&ModelError> {
        match self {
            WeightSource::Recovered { .. } => None,
            WeightSource::FreshInit { reason, .. } => Some(reason),
        }
    }
}

/// Rebuilds a core with `number_of_sinuses` terms and tries to fill it with the weights
/// stored in the composite at `path`.
///
/// Never fails: any problem with the saved model yields [`WeightSource::FreshInit`]
/// carrying the reason.
pub fn recover_core(path: &Path, number_of_sinuses: usize) -> WeightSource {
    recover_core_with_rng(path, number_of_sinuses, &mut rand::rng())
}

pub fn recover_core_with_rng<R: Rng + ?Sized>(
    path: &Path,
    number_of_sinuses: usize,
    rng: &mut R,
) -> WeightSource {
    match load_trained_core(path, number_of_sinuses) {
        Ok(core) => {
            info!("Recovered trained weights from {}", path.display());
            WeightSource::Recovered {
                core,
                artifact: path.to_path_buf(),
            }
        }
        Err(reason) => {
            warn!(
                "Could not recover weights from {} ({}); using fresh initialization",
                path.display(),
                reason
            );
            WeightSource::FreshInit {
                core: SineRegression::with_rng(number_of_sinuses, rng),
                reason,
            }
        }
    }
}

fn load_trained_core(path: &Path, number_of_sinuses: usize) -> Result<SineRegression, ModelError> {
    let core = match ModelFormat::from_path(path) {
        ModelFormat::Native => load_native(path)?.core,
        ModelFormat::Compact => return Err(ModelError::CompactNotTrainable(path.to_path_buf())),
        ModelFormat::Unknown => return Err(ModelError::UnsupportedFormat(path.to_path_buf())),
    };
    core.check_shape()?;
    if core.number_of_sinuses != number_of_sinuses {
        return Err(ModelError::SineCountMismatch {
            expected: number_of_sinuses,
            found: core.number_of_sinuses,
        });
    }
    if !core.is_finite() {
        return Err(ModelError::NonFiniteWeights(path.to_path_buf()));
    }
    Ok(core)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DayPredictor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn model(number_of_sinuses: usize) -> CompositeModel {
        let core = SineRegression::with_rng(number_of_sinuses, &mut StdRng::seed_from_u64(9));
        CompositeModel::assemble(100, core, 20.0, 5.0)
    }

    #[test]
    fn test_format_from_extension() {
        let format = |name: &str| ModelFormat::from_path(Path::new(name));
        assert_eq!(format("Hanoi_temperature.json"), ModelFormat::Native);
        assert_eq!(format("Hanoi_temperature.bin"), ModelFormat::Compact);
        assert_eq!(format("Hanoi_temperature.keras"), ModelFormat::Unknown);
        assert_eq!(format("Hanoi_temperature"), ModelFormat::Unknown);
    }

    #[test]
    fn test_native_and_compact_agree() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let model = model(4);
        let native_path = dir.path().join("m.json");
        let compact_path = dir.path().join("m.bin");
        save_native(&model, &native_path)?;
        save_compact(&InferenceModel::from(&model), &compact_path)?;

        let native = load_native(&native_path)?;
        let compact = load_compact(&compact_path)?;
        assert_eq!(native, model);
        for day in [-10.0, 0.0, 12.5, 400.0] {
            assert_eq!(
                native.predict(day).to_bits(),
                compact.predict(day).to_bits()
            );
        }
        Ok(())
    }

    #[test]
    fn test_recover_from_native() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Hanoi_temperature.json");
        let model = model(4);
        save_native(&model, &path)?;

        let source = recover_core(&path, 4);
        assert!(!source.is_fresh_init());
        assert_eq!(source.core(), &model.core);
        Ok(())
    }

    #[test]
    fn test_missing_file_falls_back() {
        let source = recover_core(Path::new("/nonexistent/Hanoi_temperature.json"), 4);
        assert!(source.is_fresh_init());
        assert!(matches!(source.fallback_reason(), Some(ModelError::ArtifactRead(..))));
        assert_eq!(source.core().kernel.len(), 4);
        assert_eq!(source.core().bias, 0.0);
    }

    #[test]
    fn test_corrupt_file_falls_back() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Hanoi_temperature.json");
        std::fs::write(&path, b"{ not json")?;

        let source = recover_core(&path, 4);
        assert!(matches!(source.fallback_reason(), Some(ModelError::NativeDecode(..))));
        Ok(())
    }

    #[test]
    fn test_incompatible_artifacts_fall_back() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;

        let wrong_count = dir.path().join("three.json");
        save_native(&model(3), &wrong_count)?;
        assert!(matches!(
            recover_core(&wrong_count, 4).fallback_reason(),
            Some(ModelError::SineCountMismatch {
                expected: 4,
                found: 3,
            })
        ));

        let compact = dir.path().join("m.bin");
        save_compact(&InferenceModel::from(&model(4)), &compact)?;
        assert!(matches!(
            recover_core(&compact, 4).fallback_reason(),
            Some(ModelError::CompactNotTrainable(_))
        ));

        let mut bad = model(4);
        bad.core.bias = f64::NAN;
        let non_finite = dir.path().join("nan.json");
        // serde_json writes NaN as null, which fails to decode as f64
        save_native(&bad, &non_finite)?;
        assert!(recover_core(&non_finite, 4).is_fresh_init());

        let future = dir.path().join("future.json");
        let artifact = serde_json::json!({"format_version": 99, "model": model(4)});
        std::fs::write(&future, serde_json::to_vec(&artifact)?)?;
        assert!(matches!(
            recover_core(&future, 4).fallback_reason(),
            Some(ModelError::UnsupportedVersion { version: 99, .. })
        ));
        Ok(())
    }
}
