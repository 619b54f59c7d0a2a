use dealdesk_core::record::{self, RecordError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::Source;

/// A marketplace listing reduced to the fields the aggregator understands.
///
/// Missing or wrongly-typed fields stay absent; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub link: Option<String>,
    /// Marketplace article number. Not unique within or across sources.
    /// Only string articles are kept; numbers are not coerced.
    pub article: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Position in the marketplace's search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
}

impl Product {
    /// Map a raw scraped listing from `source`, keeping only the fields that
    /// marketplace is known to report.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] when `raw` is not a JSON object.
    pub fn from_raw(source: Source, raw: &Value) -> Result<Self, RecordError> {
        let obj = record::as_object(raw)?;

        let image = if source.keeps_image() {
            record::string_field(obj, "image")
        } else {
            None
        };
        let index = if source.keeps_index() {
            obj.get("index").and_then(Value::as_u64)
        } else {
            None
        };

        Ok(Self {
            title: record::string_field(obj, "title"),
            price: record::number_field(obj, "price"),
            link: record::string_field(obj, "link"),
            article: record::string_field(obj, "article"),
            image,
            index,
        })
    }

    #[must_use]
    pub fn price_in(&self, min: f64, max: f64) -> bool {
        self.price.is_some_and(|p| p >= min && p <= max)
    }
}
