// src/query/cache.rs
// =============================================================================
// A small request cache in front of the GitHub client.
//
// What it does:
// - Remembers successful results for a while (the "stale time")
// - Makes sure only ONE request per key is in flight; everyone else who asks
//   for the same key waits on that same request
// - Remembers failures until someone explicitly retries (refetch)
// - Can warm an entry in the background (prefetch) without making the
//   caller wait
//
// How in-flight sharing works:
// - A request is wrapped in futures::future::Shared
// - Shared futures can be cloned; every clone resolves to the same output
// - The first poll of any clone drives the real HTTP call
//
// Rust concepts:
// - Arc<Mutex<...>>: Shared, lockable state that background tasks can reach
// - Generics with trait bounds: the cache works for any result type T
// - Closures returning futures: the cache decides IF the request runs
// =============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::debug;

use super::key::QueryKey;
use crate::github::GithubError;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, GithubError>>>;
type Entries<T> = Arc<Mutex<HashMap<QueryKey, Slot<T>>>>;

enum Slot<T> {
    InFlight(SharedFetch<T>),
    Ready { value: Arc<T>, fetched_at: Instant },
    Failed(GithubError),
}

// What a caller gets back when it asks for a key
enum Entry<T> {
    Cached(Result<Arc<T>, GithubError>),
    Started(SharedFetch<T>),
    Joined(SharedFetch<T>),
}

/// Non-blocking view of a cache entry, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus<T> {
    /// Nothing requested yet (or the request is disabled)
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed(GithubError),
}

impl<T> From<Result<Arc<T>, GithubError>> for QueryStatus<T> {
    fn from(result: Result<Arc<T>, GithubError>) -> Self {
        match result {
            Ok(value) => QueryStatus::Ready(value),
            Err(error) => QueryStatus::Failed(error),
        }
    }
}

pub struct QueryCache<T> {
    entries: Entries<T>,
    stale_time: Duration,
}

// Written by hand: #[derive(Clone)] would require T: Clone, which we don't need
impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            stale_time: self.stale_time,
        }
    }
}

impl<T> QueryCache<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            stale_time,
        }
    }

    // Returns the cached value, waits on the in-flight request, or starts a
    // new request with `fetcher`
    //
    // A stored failure is returned as-is; use refetch() to try again
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, GithubError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GithubError>> + Send + 'static,
    {
        match self.entry(&key, fetcher, false) {
            Entry::Cached(result) => result,
            Entry::Started(pending) | Entry::Joined(pending) => pending.await,
        }
    }

    // Same as fetch(), but only when `enabled` holds
    //
    // Used for things like "don't search until the query has 2 characters"
    pub async fn fetch_if<F, Fut>(&self, enabled: bool, key: QueryKey, fetcher: F) -> QueryStatus<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GithubError>> + Send + 'static,
    {
        if !enabled {
            debug!(%key, "query disabled, not fetching");
            return QueryStatus::Idle;
        }
        self.fetch(key, fetcher).await.into()
    }

    // Starts the request in the background and returns immediately
    //
    // Does nothing if the key is already fresh, failed, or in flight
    pub fn prefetch<F, Fut>(&self, key: QueryKey, fetcher: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GithubError>> + Send + 'static,
    {
        if let Entry::Started(pending) = self.entry(&key, fetcher, false) {
            debug!(%key, "prefetching");
            tokio::spawn(async move {
                // The result is stored in the cache by the shared future itself
                let _ = pending.await;
            });
        }
    }

    // The retry action: forget whatever is stored and ask again
    //
    // If a request for this key is already running, we wait for that one
    // instead of sending a second
    pub async fn refetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, GithubError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GithubError>> + Send + 'static,
    {
        match self.entry(&key, fetcher, true) {
            Entry::Cached(result) => result,
            Entry::Started(pending) | Entry::Joined(pending) => pending.await,
        }
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus<T> {
        match lock(&self.entries).get(key) {
            None => QueryStatus::Idle,
            Some(Slot::InFlight(_)) => QueryStatus::Loading,
            Some(Slot::Ready { value, .. }) => QueryStatus::Ready(Arc::clone(value)),
            Some(Slot::Failed(error)) => QueryStatus::Failed(error.clone()),
        }
    }

    // Decides, under one lock, whether to answer from the cache, join a
    // running request, or start a new one
    fn entry<F, Fut>(&self, key: &QueryKey, fetcher: F, force: bool) -> Entry<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GithubError>> + Send + 'static,
    {
        let mut entries = lock(&self.entries);

        match entries.get(key) {
            Some(Slot::InFlight(pending)) => {
                debug!(%key, "joining in-flight request");
                return Entry::Joined(pending.clone());
            }
            Some(Slot::Ready { value, fetched_at })
                if !force && fetched_at.elapsed() < self.stale_time =>
            {
                debug!(%key, "cache hit");
                return Entry::Cached(Ok(Arc::clone(value)));
            }
            Some(Slot::Failed(error)) if !force => {
                return Entry::Cached(Err(error.clone()));
            }
            _ => {}
        }

        debug!(%key, force, "cache miss, starting request");
        prune_expired(&mut entries, self.stale_time);
        let pending = self.start(key.clone(), fetcher());
        entries.insert(key.clone(), Slot::InFlight(pending.clone()));
        Entry::Started(pending)
    }

    // Wraps the request so that, when it finishes, its result is written
    // back into the cache
    fn start<Fut>(&self, key: QueryKey, request: Fut) -> SharedFetch<T>
    where
        Fut: Future<Output = Result<T, GithubError>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);

        async move {
            let result = request.await.map(Arc::new);
            let slot = match &result {
                Ok(value) => Slot::Ready {
                    value: Arc::clone(value),
                    fetched_at: Instant::now(),
                },
                Err(error) => Slot::Failed(error.clone()),
            };
            lock(&entries).insert(key, slot);
            result
        }
        .boxed()
        .shared()
    }
}

// Drops results that are past their stale time, so queries typed once and
// never again don't pile up for the whole session
//
// In-flight requests and failures stay: waiters and retry rely on them
fn prune_expired<T>(entries: &mut HashMap<QueryKey, Slot<T>>, stale_time: Duration) {
    let before = entries.len();
    entries.retain(|_, slot| match slot {
        Slot::Ready { fetched_at, .. } => fetched_at.elapsed() < stale_time,
        Slot::InFlight(_) | Slot::Failed(_) => true,
    });
    if entries.len() < before {
        debug!(evicted = before - entries.len(), "pruned expired cache entries");
    }
}

// A panic while holding the lock can't leave the map half-updated (every
// write is a single insert), so a poisoned lock is still safe to use
fn lock<T>(entries: &Mutex<HashMap<QueryKey, Slot<T>>>) -> MutexGuard<'_, HashMap<QueryKey, Slot<T>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - We never hold the lock across an .await
//    - Every critical section is a quick HashMap lookup or insert
//    - The std Mutex is simpler and faster for that
//
// 2. What does .boxed().shared() do?
//    - boxed() turns our async block into a BoxFuture (one concrete type)
//    - shared() makes it cloneable; all clones see the same result
//    - The output must be Clone, which is why we wrap T in Arc
//
// 3. Why does fetch() take a closure instead of a future?
//    - Creating the future might be expensive or have side effects
//    - On a cache hit we never call the closure at all
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(name: &str) -> QueryKey {
        QueryKey::UserRepositories { username: name.to_string() }
    }

    // A fetcher that counts calls and answers after a short (virtual) delay
    fn counting(
        calls: &Arc<AtomicUsize>,
        result: Result<u32, GithubError>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, GithubError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_share_one_call() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.fetch(key("octocat"), counting(&calls, Ok(7))),
            cache.fetch(key("octocat"), counting(&calls, Ok(8))),
        );

        assert_eq!(*a.unwrap(), 7);
        assert_eq!(*b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_reused() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(key("octocat"), counting(&calls, Ok(1))).await.unwrap();
        let again = cache.fetch(key("octocat"), counting(&calls, Ok(2))).await.unwrap();

        assert_eq!(*again, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_refetched() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(key("octocat"), counting(&calls, Ok(1))).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let again = cache.fetch(key("octocat"), counting(&calls, Ok(2))).await.unwrap();

        assert_eq!(*again, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned_on_insert() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(key("old"), counting(&calls, Ok(1))).await.unwrap();
        cache.fetch(key("ghost"), counting(&calls, Err(GithubError::NotFound))).await.ok();
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.fetch(key("recent"), counting(&calls, Ok(2))).await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;

        cache.fetch(key("new"), counting(&calls, Ok(3))).await.unwrap();

        assert_eq!(cache.status(&key("old")), QueryStatus::Idle);
        assert_eq!(cache.status(&key("recent")), QueryStatus::Ready(Arc::new(2)));
        assert_eq!(cache.status(&key("ghost")), QueryStatus::Failed(GithubError::NotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_query_never_calls_fetcher() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let status = cache.fetch_if(false, key("o"), counting(&calls, Ok(1))).await;

        assert_eq!(status, QueryStatus::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.status(&key("o")), QueryStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sticks_until_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.fetch(key("ghost"), counting(&calls, Err(GithubError::NotFound))).await;
        assert_eq!(first, Err(GithubError::NotFound));

        // Plain fetch does not retry on its own
        let second = cache.fetch(key("ghost"), counting(&calls, Ok(5))).await;
        assert_eq!(second, Err(GithubError::NotFound));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let retried = cache.refetch(key("ghost"), counting(&calls, Ok(5))).await;
        assert_eq!(retried.map(|v| *v), Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_is_coalesced_and_stored() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        cache.prefetch(key("octocat"), counting(&calls, Ok(3)));
        cache.prefetch(key("octocat"), counting(&calls, Ok(4)));
        assert_eq!(cache.status(&key("octocat")), QueryStatus::Loading);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.status(&key("octocat")), QueryStatus::Ready(Arc::new(3)));
    }
}
