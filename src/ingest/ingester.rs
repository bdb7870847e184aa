use crate::ingest::client::{OpenMeteoClient, DEFAULT_BASE_URL};
use crate::ingest::error::IngestError;
use crate::types::city_frame::CityFrame;
use crate::types::day_index::{REFRESH_WINDOW_END, REFRESH_WINDOW_START};
use crate::types::location::{CityCoordinates, LatLon};
use crate::utils::ensure_dir_exists;
use bon::Builder;
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one ingestion run.
#[derive(Debug, Clone, Builder)]
pub struct IngestConfig {
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default = REFRESH_WINDOW_START)]
    pub start_date: NaiveDate,
    #[builder(default = REFRESH_WINDOW_END)]
    pub end_date: NaiveDate,
    /// Pause after each city, to stay polite with the public API.
    #[builder(default = Duration::from_millis(200))]
    pub request_delay: Duration,
    #[builder(into, default = PathBuf::from("cities"))]
    pub output_dir: PathBuf,
    #[builder(into, default = "auto".to_string())]
    pub timezone: String,
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Splits `start..=end` into one inclusive range per calendar year.
pub fn year_slices(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    (start.year()..=end.year())
        .filter_map(|year| {
            let first = NaiveDate::from_ymd_opt(year, 1, 1)?.max(start);
            let last = NaiveDate::from_ymd_opt(year, 12, 31)?.min(end);
            (first <= last).then_some((first, last))
        })
        .collect()
}

/// A year slice that could not be fetched and is missing from the city's file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSlice {
    pub city: String,
    pub year: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub written: Vec<PathBuf>,
    pub failed_slices: Vec<FailedSlice>,
}

pub struct WeatherIngester {
    client: OpenMeteoClient,
    config: IngestConfig,
}

impl WeatherIngester {
    pub fn new(config: IngestConfig) -> Result<Self, IngestError> {
        if config.start_date > config.end_date {
            return Err(IngestError::InvalidWindow {
                start: config.start_date,
                end: config.end_date,
            });
        }
        let client = OpenMeteoClient::new(&config.base_url, &config.timezone, config.timeout)?;
        Ok(Self { client, config })
    }

    /// Fetches every year slice for one city and writes `{output_dir}/{city}.csv`.
    ///
    /// Failed slices are logged, appended to `report` and left out of the file.
    pub async fn ingest_city(
        &self,
        city: &str,
        location: LatLon,
        report: &mut IngestReport,
    ) -> Result<PathBuf, IngestError> {
        let mut observations = Vec::new();
        for (start, end) in year_slices(self.config.start_date, self.config.end_date) {
            match self.client.fetch_daily(location, start, end).await {
                Ok(rows) => observations.extend(rows),
                Err(e) => {
                    warn!("Error for {} {}: {}", city, start.year(), e);
                    report.failed_slices.push(FailedSlice {
                        city: city.to_string(),
                        year: start.year(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        ensure_dir_exists(&self.config.output_dir)
            .map_err(|e| IngestError::OutputDirCreation(self.config.output_dir.clone(), e))?;
        let path = self.config.output_dir.join(format!("{city}.csv"));
        CityFrame::from_observations(&observations)?.write_csv(&path)?;
        info!(
            "{}: {} rows for {} written to {}",
            city,
            observations.len(),
            location,
            path.display()
        );
        report.written.push(path.clone());
        Ok(path)
    }

    /// Ingests all cities in order, pausing `request_delay` after each one.
    pub async fn ingest_all(&self, cities: &CityCoordinates) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();
        for (city, location) in cities.iter() {
            self.ingest_city(city, location, &mut report).await?;
            tokio::time::sleep(self.config.request_delay).await;
        }
        info!(
            "Ingested {} cities, {} failed slices",
            report.written.len(),
            report.failed_slices.len()
        );
        Ok(report)
    }
}
