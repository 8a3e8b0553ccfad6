//! Lenient timestamp parsing.
//!
//! The backend emits both offset-carrying RFC 3339 strings and naive ISO-8601
//! strings depending on the column. Offsets are normalised to UTC and dropped.
//! Use with `#[serde(with = "eventhub_core::types::timestamp")]`.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Format used when sending timestamps back to the backend.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a timestamp in any of the accepted forms.
///
/// Returns `None` when the input matches none of them.
#[must_use]
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Serialize a timestamp in [`WIRE_FORMAT`].
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(WIRE_FORMAT))
}

/// Deserialize a timestamp in any accepted form.
///
/// # Errors
///
/// Fails when the string is not a recognised timestamp.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// The same helpers for `Option<NaiveDateTime>` fields.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional timestamp, `null` when absent.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => super::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp; `null` and a missing field are `None`.
    ///
    /// # Errors
    ///
    /// Fails when a present string is not a recognised timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                super::parse(&raw)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
            })
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parses_naive_iso() {
        assert_eq!(parse("2025-03-14T09:30:00"), Some(at(9, 30, 0)));
        let fractional = parse("2025-03-14T09:30:00.123456").unwrap();
        assert_eq!(fractional.format(WIRE_FORMAT).to_string(), "2025-03-14T09:30:00");
    }

    #[test]
    fn parses_datetime_local_input() {
        assert_eq!(parse("2025-03-14T09:30"), Some(at(9, 30, 0)));
    }

    #[test]
    fn normalises_offsets_to_utc() {
        assert_eq!(parse("2025-03-14T11:30:00+02:00"), Some(at(9, 30, 0)));
        assert_eq!(parse("2025-03-14T09:30:00Z"), Some(at(9, 30, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse("next tuesday"), None);
        assert_eq!(parse(""), None);
    }
}
