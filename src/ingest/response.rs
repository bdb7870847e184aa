//! Wire types for the Open-Meteo archive API's daily response.

use crate::ingest::error::IngestError;
use crate::types::city_frame::DailyObservation;
use chrono::NaiveDate;
use serde::Deserialize;

pub const TEMPERATURE_METRIC: &str = "temperature_2m_mean";
pub const HUMIDITY_METRIC: &str = "relative_humidity_2m_mean";
pub const WIND_METRIC: &str = "wind_speed_10m_max";

/// Daily metrics requested from the archive, in column order.
pub const DAILY_METRICS: [&str; 3] = [TEMPERATURE_METRIC, HUMIDITY_METRIC, WIND_METRIC];

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub daily: DailyBlock,
}

/// Parallel arrays keyed by metric name. `null` entries are days without a value.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<String>,
    pub temperature_2m_mean: Vec<Option<f64>>,
    pub relative_humidity_2m_mean: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
}

impl DailyBlock {
    pub fn into_observations(self) -> Result<Vec<DailyObservation>, IngestError> {
        let expected = self.time.len();
        for (column, found) in [
            (TEMPERATURE_METRIC, self.temperature_2m_mean.len()),
            (HUMIDITY_METRIC, self.relative_humidity_2m_mean.len()),
            (WIND_METRIC, self.wind_speed_10m_max.len()),
        ] {
            if found != expected {
                return Err(IngestError::MismatchedColumns {
                    column,
                    expected,
                    found,
                });
            }
        }

        self.time
            .into_iter()
            .zip(self.temperature_2m_mean)
            .zip(self.relative_humidity_2m_mean)
            .zip(self.wind_speed_10m_max)
            .map(|(((time, temperature_avg), humidity_avg), wind_speed_max)| {
                let date = NaiveDate::parse_from_str(&time, "%Y-%m-%d")
                    .map_err(|_| IngestError::InvalidDate(time.clone()))?;
                Ok(DailyObservation {
                    date,
                    temperature_avg,
                    humidity_avg,
                    wind_speed_max,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_become_missing() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"{
            "latitude": 21.0,
            "longitude": 105.875,
            "timezone": "Asia/Bangkok",
            "daily": {
                "time": ["2025-03-08", "2025-03-09"],
                "temperature_2m_mean": [21.4, null],
                "relative_humidity_2m_mean": [83, 80],
                "wind_speed_10m_max": [null, 11.2]
            }
        }"#;
        let response: ArchiveResponse = serde_json::from_str(json)?;
        let observations = response.daily.into_observations()?;
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].temperature_avg, Some(21.4));
        assert_eq!(observations[0].wind_speed_max, None);
        assert_eq!(observations[1].temperature_avg, None);
        assert_eq!(observations[1].humidity_avg, Some(80.0));
        Ok(())
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let block = DailyBlock {
            time: vec!["2025-03-08".into(), "2025-03-09".into()],
            temperature_2m_mean: vec![Some(1.0)],
            relative_humidity_2m_mean: vec![Some(1.0), Some(2.0)],
            wind_speed_10m_max: vec![Some(1.0), Some(2.0)],
        };
        assert!(matches!(
            block.into_observations(),
            Err(IngestError::MismatchedColumns {
                column: TEMPERATURE_METRIC,
                expected: 2,
                found: 1,
            })
        ));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let block = DailyBlock {
            time: vec!["08/03/2025".into()],
            temperature_2m_mean: vec![None],
            relative_humidity_2m_mean: vec![None],
            wind_speed_10m_max: vec![None],
        };
        assert!(matches!(block.into_observations(), Err(IngestError::InvalidDate(_))));
    }
}
