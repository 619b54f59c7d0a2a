use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{self, RecordError};

/// A product the user follows across marketplaces, stored in the products
/// collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProduct {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

impl TrackedProduct {
    /// Parse a tracked product from a raw document.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the record is not an object or has no
    /// identifier.
    pub fn from_record(raw: &Value) -> Result<Self, RecordError> {
        let obj = record::as_object(raw)?;
        let id = record::first_field(obj, &["$id", "id"])
            .and_then(record::id_value)
            .ok_or(RecordError::MissingField("$id"))?;

        Ok(Self {
            id,
            created_at: record::first_field(obj, &["$createdAt", "createdAt"])
                .and_then(record::timestamp_value),
            title: record::string_field(obj, "title"),
        })
    }
}
