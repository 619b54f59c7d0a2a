use thiserror::Error;

/// Errors returned by the document-store client.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid document store endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// 401 or 403: missing or insufficient credentials.
    #[error("document store rejected credentials ({status}) for {url}")]
    Unauthorized { status: u16, url: String },

    #[error("collection not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
