use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{self, RecordError};

/// A sales deal as stored in the CRM document collection.
///
/// Only `id` and `status` are required; every other field is optional because
/// remote records carry no completeness guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub price: Option<f64>,
    /// Raw pipeline status; expected to match a configured column id.
    pub status: String,
    pub customer_name: Option<String>,
}

impl Deal {
    /// Parse a deal from a raw document.
    ///
    /// Accepts the store's system fields (`$id`, `$createdAt`) as well as
    /// plain `id` / `createdAt`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the record is not an object or lacks an
    /// identifier or a string `status`.
    pub fn from_record(raw: &Value) -> Result<Self, RecordError> {
        let obj = record::as_object(raw)?;

        let id = record::first_field(obj, &["$id", "id"])
            .and_then(record::id_value)
            .ok_or(RecordError::MissingField("$id"))?;
        let status =
            record::string_field(obj, "status").ok_or(RecordError::MissingField("status"))?;

        let created_at = record::first_field(obj, &["$createdAt", "createdAt"])
            .and_then(record::timestamp_value);
        let customer_name = obj
            .get("customer")
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            id,
            created_at,
            name: record::string_field(obj, "name"),
            price: record::number_field(obj, "price"),
            status,
            customer_name,
        })
    }
}

/// A deal projected onto a board column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub created_at: Option<DateTime<Utc>>,
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub company_name: Option<String>,
    /// Display name of the containing column, not the deal's raw status.
    pub status: String,
}

impl BoardItem {
    #[must_use]
    pub fn project(deal: Deal, column_name: &str) -> Self {
        Self {
            created_at: deal.created_at,
            id: deal.id,
            name: deal.name,
            price: deal.price,
            company_name: deal.customer_name,
            status: column_name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub items: Vec<BoardItem>,
}
