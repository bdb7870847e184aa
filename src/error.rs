use crate::fine_tune::error::FineTuneError;
use crate::ingest::error::IngestError;
use crate::model::error::ModelError;
use crate::types::error::CityDataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TunerError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    FineTune(#[from] FineTuneError),

    #[error(transparent)]
    CityData(#[from] CityDataError),

    #[error("Could not parse date, expected YYYY-MM-DD")]
    DateParsing,
}
