use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Parse a timestamp permissively, normalizing to UTC.
///
/// Accepts RFC 3339 (offsets are converted to UTC), ISO-8601 with either a
/// `T` or a space separator, US `month/day/year` forms, and bare dates
/// (taken as midnight). Naive values are interpreted as UTC.
/// Returns `None` for anything unrecognised.
///
/// # Examples
/// ```
/// use water_quality_processor::utils::parse_timestamp;
///
/// let ts = parse_timestamp("2023-07-15 08:30:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2023-07-15T08:30:00+00:00");
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // "2023-07-15 08:30:00+02:00" style offsets
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Parse a finite floating point number; blanks, text, NaN and infinities yield `None`
pub fn parse_finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_iso_and_space_separated() {
        let a = parse_timestamp("2023-07-15T08:30:00").unwrap();
        let b = parse_timestamp("2023-07-15 08:30:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hour(), 8);
        assert_eq!(a.minute(), 30);
    }

    #[test]
    fn test_parse_offset_converts_to_utc() {
        let ts = parse_timestamp("2023-07-15T08:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 6);

        let ts = parse_timestamp("2023-07-15T08:30:00Z").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_parse_us_formats_and_dates() {
        let ts = parse_timestamp("10/17/2021 14:05:09").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2021, 10, 17));
        assert_eq!(ts.second(), 9);

        let ts = parse_timestamp("10/17/2021").unwrap();
        assert_eq!(ts.hour(), 0);

        let ts = parse_timestamp("2021-10-17").unwrap();
        assert_eq!(ts.day(), 17);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let ts = parse_timestamp("2021-10-17 14:05:09.250").unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_unparseable_timestamp() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2021-13-45").is_none());
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite(" 12.5 "), Some(12.5));
        assert_eq!(parse_finite("-3"), Some(-3.0));
        assert_eq!(parse_finite("abc"), None);
        assert_eq!(parse_finite(""), None);
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("inf"), None);
    }
}
