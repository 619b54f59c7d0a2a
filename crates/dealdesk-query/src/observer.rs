//! A consumer's view of one cache key: the key, how to fetch it, and the
//! `select` transform that shapes the raw payload for display.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};

use crate::cache::QueryCache;
use crate::error::QueryError;
use crate::state::QueryStatus;

type Fetcher<K, T> = Arc<dyn Fn(&K) -> BoxFuture<'static, Result<T, String>> + Send + Sync>;
type Selector<T, V> = Arc<dyn Fn(&T) -> Result<V, String> + Send + Sync>;

/// What a consumer sees: the selected view plus the entry's status.
#[derive(Debug)]
pub struct QueryResult<V> {
    pub status: QueryStatus,
    pub data: Option<Arc<V>>,
    pub error: Option<QueryError>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<V> QueryResult<V> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

impl<V> Clone for QueryResult<V> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

struct Memo<T, V> {
    raw: Arc<T>,
    view: Result<Arc<V>, QueryError>,
}

struct MemoState<T, V> {
    current: Option<Memo<T, V>>,
    /// Most recent successful view, served when `select` fails.
    last_good: Option<Arc<V>>,
}

/// Binds a key, a fetcher and a `select` transform to a shared cache.
///
/// `select` runs once per distinct raw payload: repeated reads of an
/// unchanged entry return the same `Arc<V>`.
pub struct QueryObserver<K, T, V> {
    cache: QueryCache<K, T>,
    key: K,
    fetcher: Fetcher<K, T>,
    select: Selector<T, V>,
    memo: Mutex<MemoState<T, V>>,
}

impl<K, T, V> QueryObserver<K, T, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// `fetcher` receives the observer's current key. `select` must be pure.
    pub fn new<F, Fut, E, S, SE>(cache: QueryCache<K, T>, key: K, fetcher: F, select: S) -> Self
    where
        F: Fn(&K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
        S: Fn(&T) -> Result<V, SE> + Send + Sync + 'static,
        SE: Display + 'static,
    {
        let fetcher: Fetcher<K, T> =
            Arc::new(move |key: &K| fetcher(key).map(|r| r.map_err(|e| e.to_string())).boxed());
        let select: Selector<T, V> = Arc::new(move |raw: &T| select(raw).map_err(|e| e.to_string()));

        Self {
            cache,
            key,
            fetcher,
            select,
            memo: Mutex::new(MemoState {
                current: None,
                last_good: None,
            }),
        }
    }

    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Point the observer at another dataset. The next [`fetch`](Self::fetch)
    /// resolves the new key.
    pub fn set_key(&mut self, key: K) {
        if key != self.key {
            self.key = key;
            let memo = self.memo.get_mut().unwrap_or_else(PoisonError::into_inner);
            memo.current = None;
            memo.last_good = None;
        }
    }

    /// Resolve the key through the cache and return the selected view.
    pub async fn fetch(&self) -> QueryResult<V> {
        let fetcher = Arc::clone(&self.fetcher);
        let key = self.key.clone();
        self.cache
            .fetch(self.key.clone(), move || fetcher(&key))
            .await;
        self.result()
    }

    /// Invalidate the key and fetch it again.
    pub async fn refetch(&self) -> QueryResult<V> {
        self.cache.invalidate(&self.key);
        self.fetch().await
    }

    /// Read the current entry without fetching.
    #[must_use]
    pub fn result(&self) -> QueryResult<V> {
        let state = self.cache.state(&self.key);
        let mut result = QueryResult {
            status: state.status,
            data: None,
            error: state.error,
            updated_at: state.updated_at,
        };

        if let Some(raw) = &state.data {
            let (view, last_good) = self.select_memoized(raw);
            match view {
                Ok(view) => result.data = Some(view),
                Err(err) => {
                    result.status = QueryStatus::Error;
                    result.error = Some(err);
                    result.data = last_good;
                }
            }
        }

        result
    }

    fn select_memoized(&self, raw: &Arc<T>) -> (Result<Arc<V>, QueryError>, Option<Arc<V>>) {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = &memo.current {
            if Arc::ptr_eq(&current.raw, raw) {
                return (current.view.clone(), memo.last_good.clone());
            }
        }

        let view = (self.select)(raw).map(Arc::new).map_err(|reason| {
            tracing::warn!(key = ?self.key, error = %reason, "select transform failed");
            QueryError::Transform(reason)
        });
        if let Ok(v) = &view {
            memo.last_good = Some(Arc::clone(v));
        }
        memo.current = Some(Memo {
            raw: Arc::clone(raw),
            view: view.clone(),
        });

        (view, memo.last_good.clone())
    }
}
