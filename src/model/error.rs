use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot compute statistics of an empty sample")]
    EmptySample,

    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedSample {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Statistics have {found} columns, sample has {expected}")]
    StatisticsWidth { expected: usize, found: usize },

    #[error("Column {column} is out of range for {width} columns")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("Failed to read model artifact '{0}'")]
    ArtifactRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write model artifact '{0}'")]
    ArtifactWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode native model artifact '{0}'")]
    NativeDecode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode native model artifact")]
    NativeEncode(#[source] serde_json::Error),

    #[error("Failed to decode compact model artifact '{0}'")]
    CompactDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode compact model artifact")]
    CompactEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("Artifact '{path}' has unsupported format version {version}")]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("Unsupported model file format: '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("Compact artifact '{0}' holds no trainable weights")]
    CompactNotTrainable(PathBuf),

    #[error("Saved model has {found} sine terms, expected {expected}")]
    SineCountMismatch { expected: usize, found: usize },

    #[error("Kernel has {found} rows, expected {expected} sine terms")]
    KernelShape { expected: usize, found: usize },

    #[error("Saved model '{0}' contains non-finite weights")]
    NonFiniteWeights(PathBuf),

    #[error("Training needs at least one sample")]
    EmptyTrainingSet,

    #[error("Feature and target lengths differ ({features} vs {targets})")]
    LengthMismatch { features: usize, targets: usize },
}
