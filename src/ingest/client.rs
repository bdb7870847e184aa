use crate::ingest::error::IngestError;
use crate::ingest::response::{ArchiveResponse, DAILY_METRICS};
use crate::types::city_frame::DailyObservation;
use crate::types::location::LatLon;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Thin async client for the Open-Meteo historical archive.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, timezone: &str, timeout: Duration) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(IngestError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            timezone: timezone.to_string(),
        })
    }

    /// Fetches the daily mean temperature, mean relative humidity and maximum wind speed
    /// for `location` between `start` and `end` (inclusive).
    pub async fn fetch_daily(
        &self,
        location: LatLon,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>, IngestError> {
        let mut query: Vec<(&str, String)> = vec![
            ("latitude", location.0.to_string()),
            ("longitude", location.1.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ];
        query.extend(DAILY_METRICS.iter().map(|m| ("daily", m.to_string())));
        query.push(("timezone", self.timezone.clone()));

        let url = self.base_url.clone();
        debug!("GET {} for {} ({} to {})", url, location, start, end);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| IngestError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    IngestError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    IngestError::NetworkRequest(url, e)
                });
            }
        };

        let body: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| IngestError::ResponseDecode(url, e))?;
        body.daily.into_observations()
    }
}
