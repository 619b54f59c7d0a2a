use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

type TestCache = QueryCache<&'static str, i32>;

/// Fetcher that counts invocations and resolves to `value` after `delay`.
fn counted(
    calls: &Arc<AtomicUsize>,
    value: Result<i32, &'static str>,
    delay: Duration,
) -> impl FnOnce() -> BoxFuture<'static, Result<i32, String>> {
    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(delay).await;
            value.map_err(str::to_owned)
        }
        .boxed()
    }
}

async fn wait_for_status(cache: &TestCache, key: &'static str, status: QueryStatus) {
    for _ in 0..200 {
        if cache.state(&key).status == status {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("entry {key} never reached {status}");
}

#[tokio::test]
async fn unknown_key_reads_idle() {
    let cache = TestCache::new();
    let state = cache.state(&"deals");
    assert_eq!(state.status, QueryStatus::Idle);
    assert!(state.data.is_none());
    assert!(state.error.is_none());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn fetch_populates_entry() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let state = cache
        .fetch("deals", counted(&calls, Ok(7), Duration::ZERO))
        .await;

    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.as_deref(), Some(&7));
    assert!(state.updated_at.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn cached_entry_is_served_without_refetching() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = cache
        .fetch("deals", counted(&calls, Ok(7), Duration::ZERO))
        .await;
    let second = cache
        .fetch("deals", counted(&calls, Ok(8), Duration::ZERO))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let (a, b) = (first.data.unwrap(), second.data.unwrap());
    assert!(Arc::ptr_eq(&a, &b), "expected the same payload allocation");
}

#[tokio::test]
async fn concurrent_fetches_for_one_key_share_a_single_call() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b) = tokio::join!(
        cache.fetch("deals", counted(&calls, Ok(1), Duration::from_millis(20))),
        cache.fetch("deals", counted(&calls, Ok(2), Duration::from_millis(20))),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.data.as_deref(), Some(&1));
    assert!(Arc::ptr_eq(a.data.as_ref().unwrap(), b.data.as_ref().unwrap()));
}

#[tokio::test]
async fn different_keys_fetch_independently() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b) = tokio::join!(
        cache.fetch("deals", counted(&calls, Ok(1), Duration::from_millis(5))),
        cache.fetch("customers", counted(&calls, Ok(2), Duration::ZERO)),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(a.data.as_deref(), Some(&1));
    assert_eq!(b.data.as_deref(), Some(&2));
}

#[tokio::test]
async fn first_fetch_failure_has_no_data() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let state = cache
        .fetch("deals", counted(&calls, Err("offline"), Duration::ZERO))
        .await;

    assert_eq!(state.status, QueryStatus::Error);
    assert!(state.data.is_none());
    assert!(!state.is_stale_while_error());
    assert_eq!(state.error, Some(QueryError::Fetch("offline".to_owned())));
}

#[tokio::test]
async fn failure_after_success_keeps_stale_data() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .fetch("deals", counted(&calls, Ok(7), Duration::ZERO))
        .await;
    assert!(cache.invalidate(&"deals"));
    let state = cache
        .fetch("deals", counted(&calls, Err("503"), Duration::ZERO))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(state.status, QueryStatus::Error);
    assert_eq!(state.data.as_deref(), Some(&7));
    assert!(state.is_stale_while_error());
    assert!(!state.is_invalidated);
}

#[tokio::test]
async fn errored_entry_is_not_refetched_until_invalidated() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .fetch("deals", counted(&calls, Err("offline"), Duration::ZERO))
        .await;
    let again = cache
        .fetch("deals", counted(&calls, Ok(1), Duration::ZERO))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(again.status, QueryStatus::Error);

    cache.invalidate(&"deals");
    let recovered = cache
        .fetch("deals", counted(&calls, Ok(1), Duration::ZERO))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(recovered.status, QueryStatus::Success);
    assert!(recovered.error.is_none());
}

#[tokio::test]
async fn invalidate_unknown_key_returns_false() {
    let cache = TestCache::new();
    assert!(!cache.invalidate(&"nothing"));
}

#[tokio::test]
async fn invalidate_all_marks_every_entry() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.fetch("a", counted(&calls, Ok(1), Duration::ZERO)).await;
    cache.fetch("b", counted(&calls, Ok(2), Duration::ZERO)).await;

    cache.invalidate_all();

    assert!(cache.state(&"a").is_invalidated);
    assert!(cache.state(&"b").is_invalidated);
}

#[tokio::test]
async fn cancel_restores_prior_state() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));
    cache
        .fetch("deals", counted(&calls, Ok(7), Duration::ZERO))
        .await;
    cache.invalidate(&"deals");

    let consumer = tokio::spawn({
        let cache = cache.clone();
        async move {
            cache
                .fetch("deals", || futures::future::pending::<Result<i32, String>>())
                .await
        }
    });
    wait_for_status(&cache, "deals", QueryStatus::Fetching).await;

    assert!(cache.cancel(&"deals"));
    let state = consumer.await.unwrap();

    assert_eq!(state.status, QueryStatus::Success);
    assert_eq!(state.data.as_deref(), Some(&7));
    assert!(state.is_invalidated, "cancelled refetch keeps the invalidation");
    assert!(!cache.cancel(&"deals"), "nothing left to cancel");
}

#[tokio::test]
async fn fetch_commits_after_consumer_goes_away() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let consumer = tokio::spawn({
        let cache = cache.clone();
        let fetcher = counted(&calls, Ok(9), Duration::from_millis(10));
        async move { cache.fetch("deals", fetcher).await }
    });
    wait_for_status(&cache, "deals", QueryStatus::Fetching).await;
    consumer.abort();

    wait_for_status(&cache, "deals", QueryStatus::Success).await;
    assert_eq!(cache.state(&"deals").data.as_deref(), Some(&9));
}

#[tokio::test]
async fn remove_drops_the_entry() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));
    cache
        .fetch("deals", counted(&calls, Ok(7), Duration::ZERO))
        .await;

    assert!(cache.remove(&"deals"));
    assert!(!cache.remove(&"deals"));
    assert_eq!(cache.state(&"deals").status, QueryStatus::Idle);

    cache
        .fetch("deals", counted(&calls, Ok(8), Duration::ZERO))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clear_empties_the_cache() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));
    cache.fetch("a", counted(&calls, Ok(1), Duration::ZERO)).await;
    cache.fetch("b", counted(&calls, Ok(2), Duration::ZERO)).await;

    cache.clear();

    assert!(cache.is_empty());
}

#[tokio::test]
async fn panicking_fetch_is_reported_as_error() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let state = cache
        .fetch("deals", || {
            futures::future::lazy(|_| -> Result<i32, String> { panic!("producer blew up") })
        })
        .await;

    assert_eq!(state.status, QueryStatus::Error);
    assert_eq!(
        state.error,
        Some(QueryError::Fetch("fetch task panicked".to_owned()))
    );

    assert!(cache.invalidate(&"deals"));
    let recovered = cache
        .fetch("deals", counted(&calls, Ok(7), Duration::ZERO))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(recovered.status, QueryStatus::Success);
    assert_eq!(recovered.data.as_deref(), Some(&7));
}

#[tokio::test]
async fn invalidation_during_fetch_forces_another_fetch() {
    let cache = TestCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let in_flight = tokio::spawn({
        let cache = cache.clone();
        let fetcher = counted(&calls, Ok(1), Duration::from_millis(20));
        async move { cache.fetch("deals", fetcher).await }
    });
    wait_for_status(&cache, "deals", QueryStatus::Fetching).await;
    assert!(cache.state(&"deals").is_fetching());
    assert!(cache.invalidate(&"deals"));

    let committed = in_flight.await.unwrap();
    assert_eq!(committed.data.as_deref(), Some(&1));
    assert!(committed.is_invalidated);

    let next = cache
        .fetch("deals", counted(&calls, Ok(2), Duration::ZERO))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(next.data.as_deref(), Some(&2));
    assert!(!next.is_invalidated);
}
