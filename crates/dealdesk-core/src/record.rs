//! Field extraction helpers for untrusted remote records.
//!
//! Remote documents and scrape results arrive as loosely-shaped JSON. These
//! helpers pull individual fields out without trusting the overall shape: a
//! field of the wrong type is reported as absent rather than failing the
//! record, and only the fields a caller asks for are ever read.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a raw record could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Borrow the record as a JSON object.
///
/// # Errors
///
/// Returns [`RecordError::NotAnObject`] for arrays, scalars and `null`.
pub fn as_object(record: &Value) -> Result<&Map<String, Value>, RecordError> {
    record.as_object().ok_or(RecordError::NotAnObject)
}

/// First present, non-null value among `names`.
#[must_use]
pub fn first_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

#[must_use]
pub fn string_field(obj: &Map<String, Value>, name: &str) -> Option<String> {
    obj.get(name).and_then(Value::as_str).map(str::to_owned)
}

/// A finite JSON number. Strings such as `"10"` are not coerced.
#[must_use]
pub fn number_field(obj: &Map<String, Value>, name: &str) -> Option<f64> {
    obj.get(name).and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// Identifier-like value: strings pass through, numbers are rendered in
/// their JSON form (`1` → `"1"`).
#[must_use]
pub fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// RFC 3339 timestamp, normalised to UTC.
#[must_use]
pub fn timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
