//! Shared helpers for the route handlers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::ApiError;

/// Parses an optional date query parameter.
///
/// Accepts full RFC 3339 timestamps (`2026-08-05T12:00:00Z`) or plain dates
/// (`2026-08-05`, midnight UTC), which is what the clients send.
pub fn parse_date_param(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = value else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_time(NaiveTime::MIN);
        return Ok(Some(DateTime::from_naive_utc_and_offset(midnight, Utc)));
    }

    Err(ApiError::validation(format!(
        "{} must be a date (YYYY-MM-DD) or an RFC 3339 timestamp",
        field
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        assert!(parse_date_param("startDate", None).unwrap().is_none());

        let plain = parse_date_param("startDate", Some("2026-08-05"))
            .unwrap()
            .unwrap();
        assert_eq!(plain.to_rfc3339(), "2026-08-05T00:00:00+00:00");

        let full = parse_date_param("startDate", Some("2026-08-05T10:30:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(full.to_rfc3339(), "2026-08-05T10:30:00+00:00");

        assert!(parse_date_param("startDate", Some("08/05/2026")).is_err());
    }
}
