//! Conversion between calendar dates and the integer day index the models are fit on.

use crate::error::TunerError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

/// First day of the model coordinate system (index 0).
pub const ZERO_DATE: NaiveDate = ymd(2020, 1, 1);

/// First day of recent observations fetched and fine-tuned on.
pub const REFRESH_WINDOW_START: NaiveDate = ymd(2025, 3, 8);

/// Last day (inclusive) of recent observations fetched and fine-tuned on.
pub const REFRESH_WINDOW_END: NaiveDate = ymd(2025, 4, 8);

/// Anything that can be resolved to a single calendar date.
///
/// Strings are expected in `YYYY-MM-DD` form.
pub trait AnyDate {
    fn to_naive_date(self) -> Option<NaiveDate>;
}

impl AnyDate for NaiveDate {
    fn to_naive_date(self) -> Option<NaiveDate> {
        Some(self)
    }
}

impl AnyDate for NaiveDateTime {
    fn to_naive_date(self) -> Option<NaiveDate> {
        Some(self.date())
    }
}

impl<Tz: TimeZone> AnyDate for DateTime<Tz> {
    fn to_naive_date(self) -> Option<NaiveDate> {
        Some(self.date_naive())
    }
}

impl AnyDate for &str {
    fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.trim(), "%Y-%m-%d").ok()
    }
}

impl AnyDate for String {
    fn to_naive_date(self) -> Option<NaiveDate> {
        self.as_str().to_naive_date()
    }
}

impl AnyDate for &String {
    fn to_naive_date(self) -> Option<NaiveDate> {
        self.as_str().to_naive_date()
    }
}

/// Number of days between [`ZERO_DATE`] and `date`. Dates before the zero date are negative.
///
/// # Errors
///
/// Returns [`TunerError::DateParsing`] if `date` cannot be resolved to a calendar date.
pub fn days_since_zero_date(date: impl AnyDate) -> Result<i64, TunerError> {
    let date = date.to_naive_date().ok_or(TunerError::DateParsing)?;
    Ok(day_index(date))
}

/// Infallible form of [`days_since_zero_date`] for already parsed dates.
pub fn day_index(date: NaiveDate) -> i64 {
    (date - ZERO_DATE).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_zero_date_is_day_zero() -> Result<(), TunerError> {
        assert_eq!(days_since_zero_date("2020-01-01")?, 0);
        assert_eq!(days_since_zero_date("2020-01-02")?, 1);
        Ok(())
    }

    #[test]
    fn test_parsed_date_matches_string() -> Result<(), TunerError> {
        let parsed = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        assert_eq!(
            days_since_zero_date(parsed)?,
            days_since_zero_date("2025-03-08")?
        );
        assert_eq!(
            days_since_zero_date(parsed.and_hms_opt(13, 45, 0).unwrap())?,
            days_since_zero_date(String::from("2025-03-08"))?
        );
        let utc = Utc.with_ymd_and_hms(2025, 3, 8, 23, 0, 0).unwrap();
        assert_eq!(days_since_zero_date(utc)?, days_since_zero_date(parsed)?);
        Ok(())
    }

    #[test]
    fn test_leap_year_and_negative_offsets() -> Result<(), TunerError> {
        // 2020 is a leap year
        assert_eq!(days_since_zero_date("2021-01-01")?, 366);
        assert_eq!(days_since_zero_date("2019-12-31")?, -1);
        Ok(())
    }

    #[test]
    fn test_invalid_string() {
        assert!(matches!(
            days_since_zero_date("08/03/2025"),
            Err(TunerError::DateParsing)
        ));
        assert!(matches!(
            days_since_zero_date("2025-02-30"),
            Err(TunerError::DateParsing)
        ));
    }
}
