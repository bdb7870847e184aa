//! Contains the `CityFrame` structure wrapping a Polars `DataFrame` of daily city observations.

use crate::types::error::CityDataError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub const DATE_COLUMN: &str = "date";
pub const TEMPERATURE_COLUMN: &str = "temperature_avg";
pub const HUMIDITY_COLUMN: &str = "humidity_avg";
pub const WIND_COLUMN: &str = "wind_speed_max";

/// One observed day for a city. `None` marks a value the provider did not report.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub temperature_avg: Option<f64>,
    pub humidity_avg: Option<f64>,
    pub wind_speed_max: Option<f64>,
}

/// A wrapper around a Polars `DataFrame` holding one city's daily weather table.
///
/// The expected columns are `date` (`YYYY-MM-DD`), `temperature_avg`, `humidity_avg`
/// and `wind_speed_max`. Files written by hand or by other tools may carry extra
/// columns; they are kept and can be read with [`CityFrame::values`].
#[derive(Debug, Clone)]
pub struct CityFrame {
    pub frame: DataFrame,
}

impl CityFrame {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Builds a frame from observations in the given order.
    pub fn from_observations(observations: &[DailyObservation]) -> Result<Self, CityDataError> {
        let dates: Vec<String> = observations
            .iter()
            .map(|o| o.date.format("%Y-%m-%d").to_string())
            .collect();
        let temperature: Vec<Option<f64>> =
            observations.iter().map(|o| o.temperature_avg).collect();
        let humidity: Vec<Option<f64>> = observations.iter().map(|o| o.humidity_avg).collect();
        let wind: Vec<Option<f64>> = observations.iter().map(|o| o.wind_speed_max).collect();

        let frame = df!(
            DATE_COLUMN => dates,
            TEMPERATURE_COLUMN => temperature,
            HUMIDITY_COLUMN => humidity,
            WIND_COLUMN => wind
        )
        .map_err(CityDataError::FrameConstruction)?;

        Ok(Self::new(frame))
    }

    /// Reads a city CSV with a header row.
    pub fn read_csv(path: &Path) -> Result<Self, CityDataError> {
        if !path.is_file() {
            return Err(CityDataError::Io(
                path.to_path_buf(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "city data file not found"),
            ));
        }
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| CityDataError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?
            .finish()
            .map_err(|e| CityDataError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self::new(frame))
    }

    /// Writes the frame as CSV with a header row. Missing values become empty cells.
    pub fn write_csv(&mut self, path: &Path) -> Result<(), CityDataError> {
        let mut file = File::create(path).map_err(|e| CityDataError::Io(path.to_path_buf(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut self.frame)
            .map_err(|e| CityDataError::CsvWrite {
                path: path.to_path_buf(),
                source: e,
            })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.frame.column(column).is_ok()
    }

    /// Parses the `date` column. Timestamps are truncated to their date part.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, CityDataError> {
        let series = self
            .frame
            .column(DATE_COLUMN)
            .and_then(|c| c.as_materialized_series().cast(&DataType::String))
            .map_err(|e| CityDataError::ColumnType {
                column: DATE_COLUMN.to_string(),
                expected: "string",
                source: e,
            })?;
        let strings = series.str().map_err(|e| CityDataError::ColumnType {
            column: DATE_COLUMN.to_string(),
            expected: "string",
            source: e,
        })?;

        strings
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let value = value.ok_or(CityDataError::MissingDate(row))?;
                let day_part = value.get(..10).unwrap_or(value);
                NaiveDate::parse_from_str(day_part, "%Y-%m-%d").map_err(|_| {
                    CityDataError::DateParse {
                        row,
                        value: value.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Reads a numeric column. Nulls and NaNs are returned as `None`.
    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>, CityDataError> {
        let type_error = |e: PolarsError| CityDataError::ColumnType {
            column: column.to_string(),
            expected: "f64",
            source: e,
        };
        let series = self
            .frame
            .column(column)
            .and_then(|c| c.as_materialized_series().cast(&DataType::Float64))
            .map_err(type_error)?;
        let floats = series.f64().map_err(type_error)?;

        Ok(floats
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Pairs each date with the value of `column`, keeping rows with `start <= date <= end`.
    pub fn daily_series(
        &self,
        column: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, CityDataError> {
        let dates = self.dates()?;
        let values = self.values(column)?;
        Ok(dates
            .into_iter()
            .zip(values)
            .filter(|(date, _)| *date >= start && *date <= end)
            .collect())
    }

    /// Collects the frame back into typed observations.
    pub fn observations(&self) -> Result<Vec<DailyObservation>, CityDataError> {
        let dates = self.dates()?;
        let temperature = self.values(TEMPERATURE_COLUMN)?;
        let humidity = self.values(HUMIDITY_COLUMN)?;
        let wind = self.values(WIND_COLUMN)?;

        Ok(dates
            .into_iter()
            .zip(temperature)
            .zip(humidity)
            .zip(wind)
            .map(|(((date, temperature), humidity), wind)| DailyObservation {
                date,
                temperature_avg: temperature,
                humidity_avg: humidity,
                wind_speed_max: wind,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_write_then_read_observations() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Hanoi.csv");
        let observations = vec![
            DailyObservation {
                date: date(2025, 3, 8),
                temperature_avg: Some(21.5),
                humidity_avg: Some(80.0),
                wind_speed_max: Some(12.3),
            },
            DailyObservation {
                date: date(2025, 3, 9),
                temperature_avg: None,
                humidity_avg: Some(78.0),
                wind_speed_max: None,
            },
        ];

        CityFrame::from_observations(&observations)?.write_csv(&path)?;
        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.starts_with("date,temperature_avg,humidity_avg,wind_speed_max"));

        let frame = CityFrame::read_csv(&path)?;
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.observations()?, observations);
        Ok(())
    }

    #[test]
    fn test_header_only_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Empty.csv");
        CityFrame::from_observations(&[])?.write_csv(&path)?;

        let frame = CityFrame::read_csv(&path)?;
        assert_eq!(frame.height(), 0);
        assert!(frame.observations()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_daily_series_window_is_inclusive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Paris.csv");
        let mut file = File::create(&path)?;
        writeln!(file, "date,temperature_avg,humidity_avg,wind_speed_max")?;
        writeln!(file, "2025-03-07,1.0,50,10")?;
        writeln!(file, "2025-03-08,2.0,50,10")?;
        writeln!(file, "2025-03-09,NaN,50,10")?;
        writeln!(file, "2025-04-08,4.0,50,10")?;
        writeln!(file, "2025-04-09,5.0,50,10")?;
        drop(file);

        let frame = CityFrame::read_csv(&path)?;
        let series = frame.daily_series(TEMPERATURE_COLUMN, date(2025, 3, 8), date(2025, 4, 8))?;
        assert_eq!(
            series,
            vec![
                (date(2025, 3, 8), Some(2.0)),
                (date(2025, 3, 9), None),
                (date(2025, 4, 8), Some(4.0)),
            ]
        );

        // Integer-typed columns are widened to f64
        let humidity = frame.values(HUMIDITY_COLUMN)?;
        assert_eq!(humidity[0], Some(50.0));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = CityFrame::read_csv(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(CityDataError::Io(_, _))));
    }

    #[test]
    fn test_has_column() -> Result<(), CityDataError> {
        let frame = CityFrame::from_observations(&[])?;
        assert!(frame.has_column(WIND_COLUMN));
        assert!(!frame.has_column("pressure"));
        Ok(())
    }
}
