//! Parsing the input batch into [`PlayerMessage`]s.
//!
//! The batch is a JSON array of objects:
//!
//! ```json
//! [
//!   { "player_id": 1, "text": "hello there", "timestamp": "2024-05-01T10:00:00" },
//!   { "player_id": 2, "text": "this is broken", "timestamp": "2024-05-01T10:00:05Z" }
//! ]
//! ```
//!
//! Any bad record fails the whole batch with
//! [`ParleyError::MalformedInput`]; nothing is partially accepted.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ParleyError, Result};
use crate::types::{PlayerId, PlayerMessage, Timestamp};

/// Naive date-time layouts accepted in addition to RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// One record exactly as it appears on the wire.
#[derive(Debug, Deserialize)]
struct RawMessage {
    player_id: i64,
    text: String,
    timestamp: String,
}

/// Parse an ISO-8601 date-time.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T12:00:00+02:00`)
/// and naive date-times with a `T` or space separator, optional seconds and
/// optional fractional seconds. A bare date means midnight. Naive values are
/// taken to be UTC.
///
/// # Errors
/// Returns a description of the problem if no layout matches.
pub fn parse_timestamp(raw: &str) -> std::result::Result<Timestamp, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| format!("unparsable timestamp '{raw}'"))
}

/// Parse a JSON batch of player messages, preserving input order.
///
/// # Errors
/// Returns `ParleyError::MalformedInput` if the document is not a JSON array,
/// or if any record is missing a field, has a wrongly typed field, or carries
/// a timestamp [`parse_timestamp`] rejects.
pub fn parse_batch(json: &str) -> Result<Vec<PlayerMessage>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| ParleyError::MalformedInput {
            index: None,
            reason: format!("expected a JSON array of message records: {e}"),
        })?;

    let messages = records
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_record(index, value))
        .collect::<Result<Vec<_>>>()?;

    debug!(count = messages.len(), "Parsed input batch");
    Ok(messages)
}

/// Read and parse a batch file.
///
/// # Errors
/// Returns `ParleyError::Io` if the file cannot be read, otherwise the same
/// errors as [`parse_batch`].
pub fn read_batch(path: &Path) -> Result<Vec<PlayerMessage>> {
    let content = std::fs::read_to_string(path)?;
    parse_batch(&content)
}

fn parse_record(index: usize, value: serde_json::Value) -> Result<PlayerMessage> {
    let raw: RawMessage =
        serde_json::from_value(value).map_err(|e| ParleyError::malformed(index, e.to_string()))?;
    let timestamp = parse_timestamp(&raw.timestamp).map_err(|e| ParleyError::malformed(index, e))?;

    Ok(PlayerMessage {
        player_id: PlayerId(raw.player_id),
        text: raw.text,
        timestamp,
    })
}
