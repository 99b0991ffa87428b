use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

/// Message returned for every rejected date string.
pub const DATE_FORMAT_HINT: &str = "Invalid date format. Use DD/MM/YYYY";

lazy_static! {
    // Two-digit day and month, four-digit year. chrono alone would accept "1/2/2026".
    static ref STRICT_DATE_REGEX: Regex = Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap();
}

/// Parses a `DD/MM/YYYY` date into a UTC midnight timestamp.
///
/// Anything that is not exactly in that layout, or that names a day the calendar does not
/// have (`31/02/2026`), is rejected with [`AppError::InvalidDate`]. There is no fallback to
/// other layouts.
pub fn parse_strict_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if !STRICT_DATE_REGEX.is_match(raw) {
        return Err(AppError::InvalidDate(DATE_FORMAT_HINT.into()));
    }
    let date = NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .map_err(|_| AppError::InvalidDate(DATE_FORMAT_HINT.into()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::InvalidDate(DATE_FORMAT_HINT.into()))?;
    Ok(midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parses_valid_date_to_utc_midnight() {
        let parsed = parse_strict_date("24/12/2026").unwrap();
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.month(), 12);
        assert_eq!(parsed.day(), 24);
        assert_eq!(parsed.to_rfc3339(), "2026-12-24T00:00:00+00:00");
    }

    #[test]
    fn test_accepts_leap_day() {
        assert!(parse_strict_date("29/02/2028").is_ok());
    }

    #[test]
    fn test_rejects_other_layouts() {
        for raw in [
            "2026-12-24",
            "12/24/2026",
            "1/2/2026",
            "24/12/26",
            "24-12-2026",
            " 24/12/2026",
            "24/12/2026T00:00",
            "",
            "tomorrow",
        ] {
            assert!(
                matches!(parse_strict_date(raw), Err(AppError::InvalidDate(_))),
                "{raw:?} should have been rejected"
            );
        }
    }

    #[test]
    fn test_rejects_impossible_calendar_dates() {
        assert!(parse_strict_date("31/02/2026").is_err());
        assert!(parse_strict_date("29/02/2027").is_err());
        assert!(parse_strict_date("00/01/2026").is_err());
        assert!(parse_strict_date("15/13/2026").is_err());
    }
}
