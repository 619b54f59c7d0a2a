use thiserror::Error;

/// Error recorded on a cache entry or surfaced through an observer.
///
/// Messages are stored as strings so the error can be cloned into every
/// snapshot that reads it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The producer failed. The entry keeps its last successful payload.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The `select` transform rejected the payload. Deterministic, so it is
    /// never retried on its own.
    #[error("transform failed: {0}")]
    Transform(String),
}
