//! Keyed fetch-and-cache store.
//!
//! Each key owns one entry. A fetch for a key runs as its own tokio task, so
//! its result is committed even if every caller awaiting it goes away.
//! Callers that ask for a key while its fetch is running attach to that
//! fetch instead of starting another one.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::AbortHandle;

use crate::error::QueryError;
use crate::state::{QueryState, QueryStatus};

type InFlight = Shared<BoxFuture<'static, ()>>;

struct Entry<T> {
    state: QueryState<T>,
    in_flight: Option<InFlight>,
    abort: Option<AbortHandle>,
    /// Status to restore if the running fetch is cancelled.
    prior_status: QueryStatus,
    /// Whether the entry was invalidated when the running fetch started.
    prior_invalidated: bool,
    /// Bumped for every fetch started or cancelled; a completing task only
    /// commits if its generation is still current.
    generation: u64,
}

impl<T> Entry<T> {
    fn new() -> Self {
        Self {
            state: QueryState::idle(),
            in_flight: None,
            abort: None,
            prior_status: QueryStatus::Idle,
            prior_invalidated: false,
            generation: 0,
        }
    }

    fn needs_fetch(&self) -> bool {
        self.state.status == QueryStatus::Idle || self.state.is_invalidated
    }
}

struct Inner<K, T> {
    entries: Mutex<HashMap<K, Entry<T>>>,
}

impl<K, T> Inner<K, T>
where
    K: Eq + Hash + Debug,
{
    fn entries(&self) -> MutexGuard<'_, HashMap<K, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, key: &K, generation: u64, result: Result<T, String>) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(key = ?key, "entry removed before fetch completed; dropping result");
            return;
        };
        if entry.generation != generation {
            tracing::debug!(key = ?key, "fetch superseded; dropping result");
            return;
        }

        // `is_invalidated` is left alone: it was cleared when this fetch
        // started, so a set flag means the key was invalidated mid-fetch.
        entry.in_flight = None;
        entry.abort = None;

        match result {
            Ok(data) => {
                entry.state.data = Some(Arc::new(data));
                entry.state.error = None;
                entry.state.status = QueryStatus::Success;
                entry.state.updated_at = Some(Utc::now());
                tracing::debug!(key = ?key, "fetch committed");
            }
            Err(reason) => {
                tracing::warn!(
                    key = ?key,
                    error = %reason,
                    has_stale_data = entry.state.data.is_some(),
                    "fetch failed"
                );
                entry.state.error = Some(QueryError::Fetch(reason));
                entry.state.status = QueryStatus::Error;
            }
        }
    }
}

/// Shared handle to a keyed cache of `T` payloads.
///
/// Cloning the handle is cheap; all clones see the same entries.
pub struct QueryCache<K, T> {
    inner: Arc<Inner<K, T>>,
}

impl<K, T> Clone for QueryCache<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, T> Default for QueryCache<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> QueryCache<K, T>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current snapshot for `key`. Unknown keys read as idle.
    #[must_use]
    pub fn state(&self, key: &K) -> QueryState<T> {
        self.inner
            .entries()
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    /// Resolve `key`, calling `fetcher` only when needed.
    ///
    /// - a fetch is already running: wait for it, `fetcher` is not called;
    /// - the entry is idle or invalidated: start a fetch with `fetcher`;
    /// - otherwise serve the cached state, including a cached error.
    ///
    /// Must be called from within a tokio runtime. `fetcher` is invoked while
    /// the cache is locked and must not call back into it.
    pub async fn fetch<F, Fut, E>(&self, key: K, fetcher: F) -> QueryState<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        if let Some(waiter) = self.begin(&key, fetcher) {
            waiter.await;
        }
        self.state(&key)
    }

    fn begin<F, Fut, E>(&self, key: &K, fetcher: F) -> Option<InFlight>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let mut entries = self.inner.entries();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

        if let Some(in_flight) = &entry.in_flight {
            tracing::debug!(key = ?key, "attaching to in-flight fetch");
            return Some(in_flight.clone());
        }
        if !entry.needs_fetch() {
            return None;
        }

        // Build the future before touching the entry so a panicking
        // fetcher leaves it as it was.
        let produce = fetcher();

        entry.generation += 1;
        entry.prior_status = entry.state.status;
        entry.prior_invalidated = entry.state.is_invalidated;
        entry.state.status = QueryStatus::Fetching;
        entry.state.is_invalidated = false;
        tracing::debug!(key = ?key, generation = entry.generation, "starting fetch");

        let generation = entry.generation;
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(produce).catch_unwind().await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => {
                    tracing::error!(key = ?task_key, "fetch task panicked");
                    Err("fetch task panicked".to_owned())
                }
            };
            inner.commit(&task_key, generation, result);
        });

        entry.abort = Some(handle.abort_handle());
        let waiter = async move {
            // A cancelled task resolves with a JoinError; the entry was
            // already restored by `cancel`.
            let _ = handle.await;
        }
        .boxed()
        .shared();
        entry.in_flight = Some(waiter.clone());
        Some(waiter)
    }

    /// Mark `key` so the next fetch request calls its producer again.
    /// Invalidating while a fetch is running keeps the mark after that fetch
    /// commits. Returns `false` if the key is unknown.
    pub fn invalidate(&self, key: &K) -> bool {
        match self.inner.entries().get_mut(key) {
            Some(entry) => {
                entry.state.is_invalidated = true;
                tracing::debug!(key = ?key, "entry invalidated");
                true
            }
            None => false,
        }
    }

    pub fn invalidate_all(&self) {
        for entry in self.inner.entries().values_mut() {
            entry.state.is_invalidated = true;
        }
    }

    /// Abort the running fetch for `key` and restore the entry's status from
    /// before that fetch started. Returns `false` if nothing was running.
    pub fn cancel(&self, key: &K) -> bool {
        let mut entries = self.inner.entries();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        let Some(abort) = entry.abort.take() else {
            return false;
        };

        abort.abort();
        entry.in_flight = None;
        entry.generation += 1;
        entry.state.status = entry.prior_status;
        entry.state.is_invalidated |= entry.prior_invalidated;
        tracing::debug!(key = ?key, restored = %entry.prior_status, "fetch cancelled");
        true
    }

    /// Drop the entry for `key`, aborting any running fetch.
    pub fn remove(&self, key: &K) -> bool {
        match self.inner.entries().remove(key) {
            Some(entry) => {
                if let Some(abort) = entry.abort {
                    abort.abort();
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        for (_, entry) in self.inner.entries().drain() {
            if let Some(abort) = entry.abort {
                abort.abort();
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries().is_empty()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
