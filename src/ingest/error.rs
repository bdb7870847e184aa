use crate::types::error::CityDataError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read city coordinate file '{0}'")]
    CityConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse city coordinate file '{0}'")]
    CityConfigParse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode weather response from {0}")]
    ResponseDecode(String, #[source] reqwest::Error),

    #[error("Column '{column}' has {found} values, 'time' has {expected}")]
    MismatchedColumns {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid date '{0}' in weather response")]
    InvalidDate(String),

    #[error("Invalid date window {start} to {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    CityData(#[from] CityDataError),
}
