use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Textual form used both in storage and on the wire.
pub const EVENT_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn format_event_dt(dt: &NaiveDateTime) -> String {
    dt.format(EVENT_DT_FORMAT).to_string()
}

/// Parse a client-supplied event time. Offsets are normalized to UTC.
pub fn parse_event_dt(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

/// serde `deserialize_with` helper for optional event times.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_event_dt(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid event_dt: {}", raw))),
    }
}
