mod error;
mod fine_tune;
mod ingest;
mod model;
mod types;
mod utils;

pub use error::TunerError;

pub use ingest::client::*;
pub use ingest::ingester::*;
pub use ingest::response::*;

pub use model::artifact::*;
pub use model::composite::*;
pub use model::normalize::*;
pub use model::sine_regression::*;
pub use model::trainer::*;
pub use model::DayPredictor;

pub use fine_tune::archive::*;
pub use fine_tune::batch::*;
pub use fine_tune::data::*;
pub use fine_tune::export::*;
pub use fine_tune::layout::*;
pub use fine_tune::tuner::*;

pub use types::city_frame::*;
pub use types::day_index::*;
pub use types::location::*;
pub use types::metadata::*;
pub use types::parameter::*;

pub use fine_tune::error::FineTuneError;
pub use ingest::error::IngestError;
pub use model::error::ModelError;
pub use types::error::CityDataError;
