//! Selection of the recent observations a model is fine-tuned on.

use crate::types::city_frame::CityFrame;
use crate::types::day_index::day_index;
use crate::types::error::CityDataError;
use crate::types::parameter::data_column;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Why a city file yields no model update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoUpdateReason {
    /// No rows fall inside the fine-tuning window.
    EmptyWindow { start: NaiveDate, end: NaiveDate },
    /// The city file has no column for the parameter.
    MissingColumn(String),
    /// Every value in the window is missing.
    NoUsableRows,
    InsufficientRows { found: usize, required: usize },
}

impl Display for NoUpdateReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NoUpdateReason::EmptyWindow { start, end } => {
                write!(f, "no data between {start} and {end}")
            }
            NoUpdateReason::MissingColumn(column) => write!(f, "column '{column}' not found"),
            NoUpdateReason::NoUsableRows => {
                write!(f, "no valid data after dropping missing values")
            }
            NoUpdateReason::InsufficientRows { found, required } => {
                write!(f, "only {found} valid rows, at least {required} required")
            }
        }
    }
}

/// Observations left after windowing and dropping missing values, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl TrainingSample {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Day indices shifted into the model's relative coordinate system.
    ///
    /// Saturates instead of overflowing for out-of-range `denoised_length` values.
    pub fn relative_days(&self, denoised_length: i64) -> Vec<f64> {
        self.dates
            .iter()
            .map(|d| day_index(*d).saturating_sub(denoised_length) as f64)
            .collect()
    }
}

/// Picks `parameter`'s values from `frame` for `start..=end`, dropping missing values.
///
/// The outer error is for unreadable data; the inner one explains why the file is usable
/// but cannot update the model.
pub fn select_training_sample(
    frame: &CityFrame,
    parameter: &str,
    start: NaiveDate,
    end: NaiveDate,
    min_rows: usize,
) -> Result<Result<TrainingSample, NoUpdateReason>, CityDataError> {
    let column = data_column(parameter);
    if !frame.has_column(column) {
        return Ok(Err(NoUpdateReason::MissingColumn(column.to_string())));
    }

    let series = frame.daily_series(column, start, end)?;
    if series.is_empty() {
        return Ok(Err(NoUpdateReason::EmptyWindow { start, end }));
    }

    let (dates, values): (Vec<NaiveDate>, Vec<f64>) = series
        .into_iter()
        .filter_map(|(date, value)| value.map(|v| (date, v)))
        .unzip();
    if values.is_empty() {
        return Ok(Err(NoUpdateReason::NoUsableRows));
    }
    if values.len() < min_rows {
        return Ok(Err(NoUpdateReason::InsufficientRows {
            found: values.len(),
            required: min_rows,
        }));
    }

    Ok(Ok(TrainingSample { dates, values }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_city(path: &Path, rows: &[(&str, &str)]) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "date,temperature_avg,humidity_avg,wind_speed_max")?;
        for (day, temperature) in rows {
            writeln!(file, "{day},{temperature},70,10")?;
        }
        Ok(())
    }

    fn select(path: &Path, parameter: &str) -> Result<TrainingSample, NoUpdateReason> {
        let frame = CityFrame::read_csv(path).unwrap();
        select_training_sample(&frame, parameter, date(2025, 3, 8), date(2025, 4, 8), 7).unwrap()
    }

    #[test]
    fn test_missing_values_dropped_before_row_check() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Hanoi.csv");
        let mut rows: Vec<(String, &str)> = (10..=17)
            .map(|d| (format!("2025-03-{d}"), "21.0"))
            .collect();
        rows[2].1 = "NaN";
        rows[5].1 = "";
        let rows: Vec<(&str, &str)> = rows.iter().map(|(d, t)| (d.as_str(), *t)).collect();
        write_city(&path, &rows)?;

        // 8 rows in the window, 2 missing
        assert_eq!(
            select(&path, "temperature"),
            Err(NoUpdateReason::InsufficientRows {
                found: 6,
                required: 7,
            })
        );
        Ok(())
    }

    #[test]
    fn test_window_filters_and_shifts_days() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("Paris.csv");
        let mut rows: Vec<String> = vec!["2025-03-01".into(), "2025-04-09".into()];
        rows.extend((8..=15).map(|d| format!("2025-03-{d:02}")));
        let rows: Vec<(&str, &str)> = rows.iter().map(|d| (d.as_str(), "12.5")).collect();
        write_city(&path, &rows)?;

        let sample = select(&path, "temperature").expect("usable sample");
        assert_eq!(sample.len(), 8);
        assert_eq!(sample.dates[0], date(2025, 3, 8));
        // 2025-03-08 is day 1893
        assert_eq!(sample.relative_days(100)[0], 1793.0);
        Ok(())
    }

    #[test]
    fn test_relative_days_saturate() {
        let sample = TrainingSample {
            dates: vec![date(2025, 3, 8)],
            values: vec![12.5],
        };
        assert_eq!(sample.relative_days(i64::MIN), vec![i64::MAX as f64]);
        assert_eq!(
            sample.relative_days(i64::MAX),
            vec![(1893 - i64::MAX) as f64]
        );
    }

    #[test]
    fn test_unusable_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;

        let outside = dir.path().join("Rome.csv");
        write_city(&outside, &[("2024-01-01", "8.0")])?;
        assert!(matches!(
            select(&outside, "temperature"),
            Err(NoUpdateReason::EmptyWindow { .. })
        ));
        assert_eq!(
            select(&outside, "pressure"),
            Err(NoUpdateReason::MissingColumn("pressure".to_string()))
        );

        let all_missing = dir.path().join("Oslo.csv");
        let rows = [("2025-03-10", "NaN"), ("2025-03-11", "NaN")];
        write_city(&all_missing, &rows)?;
        assert_eq!(
            select(&all_missing, "temperature"),
            Err(NoUpdateReason::NoUsableRows)
        );
        Ok(())
    }
}
