use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Fetching,
    Success,
    Error,
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryStatus::Idle => write!(f, "idle"),
            QueryStatus::Fetching => write!(f, "fetching"),
            QueryStatus::Success => write!(f, "success"),
            QueryStatus::Error => write!(f, "error"),
        }
    }
}

/// Snapshot of one cache entry.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    /// Last successfully fetched payload. Survives later fetch failures.
    pub data: Option<Arc<T>>,
    pub error: Option<QueryError>,
    /// When `data` was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
    /// Set by invalidation; the next fetch request will hit the producer.
    pub is_invalidated: bool,
}

impl<T> QueryState<T> {
    #[must_use]
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
            is_invalidated: false,
        }
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Fetching
    }

    /// `true` when the latest fetch failed but an older payload is still
    /// being served.
    #[must_use]
    pub fn is_stale_while_error(&self) -> bool {
        self.status == QueryStatus::Error && self.data.is_some()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
            is_invalidated: self.is_invalidated,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}
