//! `deployed_at` parsing.
//!
//! Two shapes are accepted:
//! - RFC 3339 with an explicit offset, normalised to UTC;
//! - ISO-8601 without an offset (what the API emits for its naive UTC
//!   datetimes), read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{CoreError, Result};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a raw `deployed_at` value into a UTC instant.
pub fn parse_deployed_at(raw: &str) -> Result<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CoreError::InvalidTimestamp {
            value: raw.to_string(),
            reason: "empty timestamp".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, NAIVE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| CoreError::InvalidTimestamp {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
