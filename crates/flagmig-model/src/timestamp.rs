//! Timestamp parsing and serde helpers
//!
//! Dates are written as RFC 3339 and read leniently: TOML local date-times,
//! space-separated YAML timestamps and bare dates are accepted and taken as
//! UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Point in time with the author's offset preserved
pub type Timestamp = DateTime<FixedOffset>;

/// Text that could not be read as a timestamp
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp: '{0}'")]
pub struct TimestampError(pub String);

const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp from text
///
/// # Errors
/// Returns error if the text matches none of the accepted layouts
pub fn parse(text: &str) -> Result<Timestamp, TimestampError> {
    let text = text.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(ts);
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(Utc.from_utc_datetime(&naive).into());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).into())
        .ok_or_else(|| TimestampError(text.to_string()))
}

/// Render a timestamp as RFC 3339 (`Z` for a zero offset)
#[inline]
#[must_use]
pub fn format(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serde adapter for `Option<Timestamp>` fields
pub mod option {
    use super::Timestamp;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    /// Serialize as RFC 3339 text
    ///
    /// # Errors
    /// Propagates serializer errors
    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize leniently, see [`super::parse`]
    ///
    /// # Errors
    /// Returns error if the value is not text or not a timestamp
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| super::parse(&text).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2021-02-01T10:00:00.100-05:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(format(&ts), "2021-02-01T10:00:00.100-05:00");
    }

    #[test]
    fn zero_offset_formats_as_z() {
        let ts = parse("2021-02-01T10:00:00+00:00").unwrap();
        assert_eq!(format(&ts), "2021-02-01T10:00:00Z");
    }

    #[test]
    fn naive_forms_are_utc() {
        let local = parse("2021-02-01T10:00:00").unwrap();
        let spaced = parse("2021-02-01 10:00:00").unwrap();
        let expected = parse("2021-02-01T10:00:00Z").unwrap();
        assert_eq!(local, expected);
        assert_eq!(spaced, expected);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let ts = parse("2021-02-01").unwrap();
        assert_eq!(ts, parse("2021-02-01T00:00:00Z").unwrap());
    }

    #[test]
    fn equality_is_by_instant() {
        let a = parse("2021-02-01T10:00:00+02:00").unwrap();
        let b = parse("2021-02-01T08:00:00Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse("next tuesday").unwrap_err();
        assert_eq!(err.to_string(), "invalid timestamp: 'next tuesday'");
    }
}
