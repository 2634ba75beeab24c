use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taskhub_client::{QueryCache, QueryKey};
use tokio::sync::Notify;

fn user_key() -> QueryKey {
    QueryKey::new(["user"])
}

fn instant_fetcher(
    calls: Arc<AtomicUsize>,
    value: &str,
) -> impl FnOnce() -> BoxFuture<'static, Result<String, String>> + Send + 'static {
    let value = value.to_owned();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(value) })
    }
}

fn gated_fetcher(
    calls: Arc<AtomicUsize>,
    gate: Arc<Notify>,
    value: &str,
) -> impl FnOnce() -> BoxFuture<'static, Result<String, String>> + Send + 'static {
    let value = value.to_owned();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            gate.notified().await;
            Ok(value)
        })
    }
}

fn failing_fetcher(
    calls: Arc<AtomicUsize>,
    message: &str,
) -> impl FnOnce() -> BoxFuture<'static, Result<String, String>> + Send + 'static {
    let message = message.to_owned();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Err(message) })
    }
}

#[tokio::test]
async fn concurrent_fetches_share_one_request() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let first = tokio::spawn({
        let cache = cache.clone();
        let fetcher = gated_fetcher(calls.clone(), gate.clone(), "alice");
        async move { cache.fetch(user_key(), fetcher).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = tokio::spawn({
        let cache = cache.clone();
        let fetcher = instant_fetcher(calls.clone(), "bob");
        async move { cache.fetch(user_key(), fetcher).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.notify_one();

    let first = first.await.expect("join first").expect("first value");
    let second = second.await.expect("join second").expect("second value");
    assert_eq!(first, "alice");
    assert_eq!(second, "alice");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fresh_value_is_served_without_refetching() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let value = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "alice"))
        .await
        .expect("first fetch");
    assert_eq!(value, "alice");

    let value = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "newer"))
        .await
        .expect("second fetch");
    assert_eq!(value, "alice");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_mutation_forces_a_refetch() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let value = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "v1"))
        .await
        .expect("initial fetch");
    assert_eq!(value, "v1");

    let out = cache
        .mutate(user_key(), async { Ok::<_, String>("updated".to_owned()) })
        .await
        .expect("mutation");
    assert_eq!(out, "updated");

    let value = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "v2"))
        .await
        .expect("post-mutation fetch");
    assert_eq!(value, "v2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "v1"))
        .await
        .expect("initial fetch");

    let result: Result<(), String> = cache
        .mutate(user_key(), async { Err("mutation failed".to_owned()) })
        .await;
    assert_eq!(result, Err("mutation failed".to_owned()));

    let value = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "v2"))
        .await
        .expect("fetch after failed mutation");
    assert_eq!(value, "v1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fetch_failure_surfaces_error_until_the_next_fetch_retries() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let result = cache
        .fetch(user_key(), failing_fetcher(calls.clone(), "boom"))
        .await;
    assert_eq!(result, Err("boom".to_owned()));

    let snapshot = cache.peek(user_key()).await;
    assert_eq!(snapshot.value, None);
    assert_eq!(snapshot.error.as_deref(), Some("boom"));
    assert!(!snapshot.is_loading);

    let value = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "recovered"))
        .await
        .expect("retry");
    assert_eq!(value, "recovered");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let snapshot = cache.peek(user_key()).await;
    assert_eq!(snapshot.value.as_deref(), Some("recovered"));
    assert_eq!(snapshot.error, None);
}

#[tokio::test]
async fn failed_refetch_keeps_previously_known_value_visible() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "v1"))
        .await
        .expect("initial fetch");
    cache.invalidate(user_key()).await;

    let result = cache
        .fetch(user_key(), failing_fetcher(calls.clone(), "offline"))
        .await;
    assert_eq!(result, Err("offline".to_owned()));

    let snapshot = cache.peek(user_key()).await;
    assert_eq!(snapshot.value.as_deref(), Some("v1"));
    assert_eq!(snapshot.error.as_deref(), Some("offline"));
}

#[tokio::test]
async fn invalidation_supersedes_an_in_flight_fetch() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let stale = tokio::spawn({
        let cache = cache.clone();
        let fetcher = gated_fetcher(calls.clone(), gate.clone(), "pre-mutation");
        async move { cache.fetch(user_key(), fetcher).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    cache.invalidate(user_key()).await;

    let fresh = cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "fresh"))
        .await
        .expect("post-invalidation fetch");
    assert_eq!(fresh, "fresh");

    // The superseded request resolves its caller with the fresh value and
    // never overwrites the visible entry.
    gate.notify_one();
    let stale = stale.await.expect("join stale").expect("stale value");
    assert_eq!(stale, "fresh");

    tokio::time::sleep(Duration::from_millis(20)).await;
    let snapshot = cache.peek(user_key()).await;
    assert_eq!(snapshot.value.as_deref(), Some("fresh"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dropped_caller_does_not_block_settlement() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let abandoned = tokio::spawn({
        let cache = cache.clone();
        let fetcher = gated_fetcher(calls.clone(), gate.clone(), "v1");
        async move { cache.fetch(user_key(), fetcher).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    abandoned.abort();

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let snapshot = cache.peek(user_key()).await;
    assert_eq!(snapshot.value.as_deref(), Some("v1"));
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn invalidation_only_touches_matching_prefixes() {
    let cache = QueryCache::<String>::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let other_key = QueryKey::new(["workspaces", "w1"]);

    cache
        .fetch(user_key(), instant_fetcher(calls.clone(), "user"))
        .await
        .expect("user fetch");
    cache
        .fetch(other_key.clone(), instant_fetcher(calls.clone(), "ws"))
        .await
        .expect("workspace fetch");

    cache.invalidate(user_key()).await;

    let value = cache
        .fetch(other_key, instant_fetcher(calls.clone(), "ws2"))
        .await
        .expect("unaffected fetch");
    assert_eq!(value, "ws");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
