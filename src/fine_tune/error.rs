use crate::model::error::ModelError;
use crate::types::error::CityDataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FineTuneError {
    #[error("Failed to read model metadata '{0}'")]
    MetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse model metadata '{0}'")]
    MetadataParse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode model metadata")]
    MetadataEncode(#[source] serde_json::Error),

    #[error("Failed to write model metadata '{0}'")]
    MetadataWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to write artifact '{0}'")]
    ArtifactWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to list model directory '{0}'")]
    ModelDirRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write report '{0}'")]
    ReportWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode report")]
    ReportEncode(#[source] serde_json::Error),

    #[error("Failed to build archive '{path}'")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("I/O error while archiving '{0}'")]
    ArchiveIo(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    CityData(#[from] CityDataError),
}
