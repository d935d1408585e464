//! Typed decoding of stored columns.
//!
//! Free functions over a positioned [`rusqlite::Row`], reused by every
//! query in the storage layer. Writers always store valid JSON and RFC
//! 3339 timestamps, so a failed decode of a required column is a data
//! corruption error, not a recoverable condition.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde_json::{Map, Value};
use url::Url;

/// Encode a timestamp for storage.
///
/// Fixed-precision RFC 3339 UTC text: lexical order equals chronological
/// order, so `max()` and range comparisons in SQL match comparisons on
/// the decoded values.
pub fn encode_datetime(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode column `idx` as a JSON object.
///
/// Fails if the stored text is not a JSON object.
pub fn json_object(row: &Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    let text: String = row.get(idx)?;
    let object: Map<String, Value> = serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
    Ok(Value::Object(object))
}

/// Decode column `idx` as a JSON array. A null column decodes as an
/// empty array.
pub fn json_array(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<Value>> {
    let text: Option<String> = row.get(idx)?;
    match text {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
    }
}

/// Decode column `idx` as a required timestamp.
pub fn datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_datetime(&text, idx)
}

/// Decode column `idx` as an optional timestamp. A null column decodes
/// as `None`.
pub fn datetime_or_null(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    match text {
        None => Ok(None),
        Some(text) => parse_datetime(&text, idx).map(Some),
    }
}

/// Decode column `idx` as text, substituting `default` for null.
pub fn text_or(row: &Row<'_>, idx: usize, default: &str) -> rusqlite::Result<String> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.unwrap_or_else(|| default.to_string()))
}

/// Decode column `idx` as a URL. Null, empty, or unparseable text
/// decodes as `None`; this never errors.
pub fn url_or_null(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Url>> {
    let text = text_or(row, idx, "")?;
    Ok(Url::parse(&text).ok())
}

fn parse_datetime(text: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
