use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body of a document-store `listDocuments` call.
///
/// Documents are kept as raw JSON; typed views (deals, products) are derived
/// from them by the consumers that know the collection's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    /// Total reported by the store. Some deployments omit it.
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub documents: Vec<Value>,
}

impl DocumentList {
    #[must_use]
    pub fn new(documents: Vec<Value>) -> Self {
        Self {
            total: None,
            documents,
        }
    }

    /// The reported total, or the number of documents in this page when the
    /// store did not report one.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
            .unwrap_or_else(|| u64::try_from(self.documents.len()).unwrap_or(u64::MAX))
    }
}
