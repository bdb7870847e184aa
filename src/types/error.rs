use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CityDataError {
    #[error("Failed to open city data file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Parsing error reading city CSV '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Encoding error writing city CSV '{path}'")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to build city DataFrame")]
    FrameConstruction(#[source] PolarsError),

    #[error("Column '{column}' could not be read as {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Invalid date '{value}' in row {row}")]
    DateParse { row: usize, value: String },

    #[error("Missing date in row {0}")]
    MissingDate(usize),
}
