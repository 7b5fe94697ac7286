//! The query cache.
//!
//! Entries hold the last successful payload as JSON together with two clocks:
//! a monotonic `fetched_at` (tokio `Instant`, drives staleness and is
//! controllable in tests) and a wall-clock `updated_at` (travels with
//! dehydrated snapshots and decides hydration merges).

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::QueryError;
use crate::key::QueryKey;
use crate::mutation::MutationEffect;

/// Stale time applied when none is configured.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long after a successful fetch an entry is served without a call.
    pub stale_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub const fn with_stale_time(stale_time: Duration) -> Self {
        Self { stale_time }
    }
}

/// Result of peeking at the cache without fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Miss,
    Fresh(Value),
    /// Past its stale time, or invalidated.
    Stale(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Fresh,
    Stale,
    Invalidated,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) key: QueryKey,
    pub(crate) data: Value,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) fetched_at: Instant,
    /// Age the data already had when it entered this cache (hydration).
    pub(crate) prior_age: Duration,
    pub(crate) invalidated: bool,
}

impl Entry {
    pub(crate) fn new(key: QueryKey, data: Value) -> Self {
        Self {
            key,
            data,
            updated_at: Utc::now(),
            fetched_at: Instant::now(),
            prior_age: Duration::ZERO,
            invalidated: false,
        }
    }

    fn freshness(&self, stale_time: Duration) -> Freshness {
        if self.invalidated {
            Freshness::Invalidated
        } else if self.fetched_at.elapsed() + self.prior_age < stale_time {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }
}

/// Outcome of [`QueryClient::fetch_query_swr`].
#[derive(Debug)]
pub struct Revalidating<T> {
    pub data: T,
    /// Background refetch started because `data` was stale.
    pub refresh: Option<JoinHandle<()>>,
}

/// Key/value cache of query results.
///
/// Cheap to clone; clones share the same entries. Construct one per prefetch
/// request and one per CLI session.
#[derive(Clone, Default)]
pub struct QueryClient {
    pub(crate) inner: Arc<Inner>,
}

#[derive(Default)]
pub(crate) struct Inner {
    pub(crate) entries: RwLock<BTreeMap<String, Entry>>,
    /// Fetches started but not yet written, by ticket number.
    in_flight: Mutex<BTreeMap<u64, InFlight>>,
    next_ticket: AtomicU64,
    options: QueryOptions,
}

/// What happened to a key while its fetch was outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Overtaken {
    Invalidated,
    Removed,
}

struct InFlight {
    key: QueryKey,
    overtaken: Option<Overtaken>,
}

impl Inner {
    fn in_flight(&self) -> MutexGuard<'_, BTreeMap<u64, InFlight>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn overtake(&self, prefix: Option<&QueryKey>, how: Overtaken) {
        for fetch in self
            .in_flight()
            .values_mut()
            .filter(|f| prefix.is_none_or(|p| f.key.starts_with(p)))
        {
            fetch.overtaken = fetch.overtaken.max(Some(how));
        }
    }
}

/// Registration of one outstanding fetch. Dropping it (error, cancellation)
/// forgets the fetch without writing anything.
struct FetchTicket {
    inner: Arc<Inner>,
    id: u64,
}

impl FetchTicket {
    fn finish(self) -> Option<Overtaken> {
        let fetch = self.inner.in_flight().remove(&self.id);
        fetch.and_then(|f| f.overtaken)
    }
}

impl Drop for FetchTicket {
    fn drop(&mut self) {
        self.inner.in_flight().remove(&self.id);
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    #[must_use]
    pub fn new(options: QueryOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                ..Inner::default()
            }),
        }
    }

    #[must_use]
    pub fn options(&self) -> QueryOptions {
        self.inner.options
    }

    async fn peek(&self, key: &QueryKey, stale_time: Duration) -> Option<(Value, Freshness)> {
        let entries = self.inner.entries.read().await;
        entries
            .get(&key.hash_key())
            .map(|e| (e.data.clone(), e.freshness(stale_time)))
    }

    pub async fn lookup(&self, key: &QueryKey) -> CacheLookup {
        match self.peek(key, self.options().stale_time).await {
            None => CacheLookup::Miss,
            Some((data, Freshness::Fresh)) => CacheLookup::Fresh(data),
            Some((data, _)) => CacheLookup::Stale(data),
        }
    }

    /// Typed view of whatever is cached under `key`, fresh or not.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Decode`] if the cached JSON is not a `T`.
    pub async fn get_query_data<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
    ) -> Result<Option<T>, QueryError> {
        let entries = self.inner.entries.read().await;
        entries
            .get(&key.hash_key())
            .map(|e| decode(key, e.data.clone()))
            .transpose()
    }

    /// Overwrite the entry for `key`. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Encode`] if `data` cannot be represented as JSON.
    pub async fn set_query_data<T: Serialize + ?Sized>(
        &self,
        key: &QueryKey,
        data: &T,
    ) -> Result<(), QueryError> {
        let value = encode(key, data)?;
        self.write_entry(key, value).await;
        Ok(())
    }

    fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let id = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.inner.in_flight().insert(
            id,
            InFlight {
                key: key.clone(),
                overtaken: None,
            },
        );
        FetchTicket {
            inner: Arc::clone(&self.inner),
            id,
        }
    }

    /// Write a fetched result unless the key was invalidated or removed while
    /// the fetch was outstanding. An invalidated key keeps the data but stays
    /// invalid; a removed key is not written at all.
    async fn settle(&self, ticket: FetchTicket, key: &QueryKey, data: Value) {
        let mut entries = self.inner.entries.write().await;
        match ticket.finish() {
            None => {
                entries.insert(key.hash_key(), Entry::new(key.clone(), data));
            }
            Some(Overtaken::Invalidated) => {
                tracing::debug!(%key, "invalidated during fetch; result kept as invalid");
                let mut entry = Entry::new(key.clone(), data);
                entry.invalidated = true;
                entries.insert(key.hash_key(), entry);
            }
            Some(Overtaken::Removed) => {
                tracing::debug!(%key, "removed during fetch; result dropped");
            }
        }
    }

    pub(crate) async fn write_entry(&self, key: &QueryKey, data: Value) {
        let entry = Entry::new(key.clone(), data);
        self.inner
            .entries
            .write()
            .await
            .insert(key.hash_key(), entry);
    }

    /// Serve `key` from cache while fresh, otherwise call `fetcher` and cache
    /// its result. Failures are never cached.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's error, or a [`QueryError`] converted into `E`.
    pub async fn fetch_query<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<QueryError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch_query_with(key, self.options(), fetcher).await
    }

    /// [`Self::fetch_query`] with per-query options.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_query`].
    pub async fn fetch_query_with<T, E, F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<QueryError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some((data, Freshness::Fresh)) = self.peek(key, options.stale_time).await {
            tracing::debug!(%key, "query cache hit");
            return Ok(decode(key, data)?);
        }

        tracing::debug!(%key, "query cache miss; fetching");
        let ticket = self.begin_fetch(key);
        let data = fetcher().await?;
        self.settle(ticket, key, encode(key, &data)?).await;
        Ok(data)
    }

    /// [`Self::fetch_query`] that gives up when `cancel` fires.
    ///
    /// A cancelled fetch drops the in-flight future and never writes the
    /// cache, so a response arriving after teardown cannot land.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Cancelled`] (converted into `E`) on cancellation.
    pub async fn fetch_query_cancellable<T, E, F, Fut>(
        &self,
        key: &QueryKey,
        cancel: &CancellationToken,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<QueryError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some((data, Freshness::Fresh)) = self.peek(key, self.options().stale_time).await {
            return Ok(decode(key, data)?);
        }
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled(key.clone()).into());
        }

        let ticket = self.begin_fetch(key);
        let data = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(%key, "query cancelled before response");
                return Err(QueryError::Cancelled(key.clone()).into());
            }
            result = fetcher() => result?,
        };

        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled(key.clone()).into());
        }
        self.settle(ticket, key, encode(key, &data)?).await;
        Ok(data)
    }

    /// Stale-while-revalidate read.
    ///
    /// Fresh data is returned as is. Stale data is returned immediately while
    /// `fetcher` runs on a background task that overwrites the entry on
    /// success. Missing or invalidated entries are fetched inline.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_query`] for the inline path. Background failures
    /// are logged and keep the stale entry.
    pub async fn fetch_query_swr<T, E, F, Fut>(
        &self,
        key: &QueryKey,
        fetcher: F,
    ) -> Result<Revalidating<T>, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: From<QueryError> + fmt::Display + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        match self.peek(key, self.options().stale_time).await {
            Some((data, Freshness::Fresh)) => Ok(Revalidating {
                data: decode(key, data)?,
                refresh: None,
            }),
            Some((data, Freshness::Stale)) => {
                let stale = decode(key, data)?;
                let ticket = self.begin_fetch(key);
                let pending = fetcher();
                let client = self.clone();
                let key = key.clone();
                let refresh = tokio::spawn(async move {
                    match pending.await {
                        Ok(fresh) => match encode(&key, &fresh) {
                            Ok(value) => client.settle(ticket, &key, value).await,
                            Err(error) => tracing::warn!(%error, "background refetch not cached"),
                        },
                        Err(error) => {
                            tracing::warn!(%key, %error, "background refetch failed; keeping stale data");
                        }
                    }
                });
                Ok(Revalidating {
                    data: stale,
                    refresh: Some(refresh),
                })
            }
            Some((_, Freshness::Invalidated)) | None => {
                let ticket = self.begin_fetch(key);
                let data = fetcher().await?;
                self.settle(ticket, key, encode(key, &data)?).await;
                Ok(Revalidating {
                    data,
                    refresh: None,
                })
            }
        }
    }

    /// Mark every entry under `prefix` invalid. The next read of each issues
    /// a network call regardless of its stale time, including entries written
    /// by fetches already in flight. Returns how many cached entries matched.
    pub async fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.write().await;
        self.inner.overtake(Some(prefix), Overtaken::Invalidated);
        let mut count = 0;
        for entry in entries.values_mut().filter(|e| e.key.starts_with(prefix)) {
            entry.invalidated = true;
            count += 1;
        }
        tracing::debug!(%prefix, count, "invalidated queries");
        count
    }

    /// Drop every entry under `prefix`. Returns how many were removed.
    pub async fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.write().await;
        self.inner.overtake(Some(prefix), Overtaken::Removed);
        let before = entries.len();
        entries.retain(|_, e| !e.key.starts_with(prefix));
        before - entries.len()
    }

    /// Run a write call and, on success, apply the cache effects it implies.
    ///
    /// # Errors
    ///
    /// Propagates the call's error; no effect is applied in that case.
    pub async fn mutate<T, E, F, Fut, G>(&self, call: F, effects: G) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        G: FnOnce(&T) -> Vec<MutationEffect>,
    {
        let result = call().await?;
        self.apply_effects(effects(&result)).await;
        Ok(result)
    }

    pub async fn apply_effects(&self, effects: Vec<MutationEffect>) {
        for effect in effects {
            match effect {
                MutationEffect::SetData { key, value } => self.write_entry(&key, value).await,
                MutationEffect::Invalidate { prefix } => {
                    self.invalidate_queries(&prefix).await;
                }
                MutationEffect::Remove { prefix } => {
                    self.remove_queries(&prefix).await;
                }
            }
        }
    }

    pub async fn clear(&self) {
        let mut entries = self.inner.entries.write().await;
        self.inner.overtake(None, Overtaken::Removed);
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<QueryKey> {
        let entries = self.inner.entries.read().await;
        entries.values().map(|e| e.key.clone()).collect()
    }
}

pub(crate) fn encode<T: Serialize + ?Sized>(key: &QueryKey, data: &T) -> Result<Value, QueryError> {
    serde_json::to_value(data).map_err(|e| QueryError::Encode {
        key: key.clone(),
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(key: &QueryKey, data: Value) -> Result<T, QueryError> {
    serde_json::from_value(data).map_err(|e| QueryError::Decode {
        key: key.clone(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("backend down")]
        Backend,
        #[error(transparent)]
        Query(#[from] QueryError),
    }

    fn client(stale_secs: u64) -> QueryClient {
        QueryClient::new(QueryOptions::with_stale_time(Duration::from_secs(stale_secs)))
    }

    async fn counted_fetch(
        client: &QueryClient,
        key: &QueryKey,
        calls: &AtomicUsize,
        value: i64,
    ) -> i64 {
        client
            .fetch_query(key, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(value)
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_strictly_before_stale_time() {
        let client = client(60);
        let key = QueryKey::root("goals");
        let calls = AtomicUsize::new(0);

        assert_eq!(counted_fetch(&client, &key, &calls, 1).await, 1);
        tokio::time::advance(Duration::from_millis(59_999)).await;
        assert_eq!(counted_fetch(&client, &key, &calls, 2).await, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(matches!(client.lookup(&key).await, CacheLookup::Stale(_)));
        assert_eq!(counted_fetch(&client, &key, &calls, 2).await, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn per_query_stale_time_overrides_default() {
        let client = client(60);
        let key = QueryKey::root("user");
        client.set_query_data(&key, &json!({ "id": "u-1" })).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;

        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let value: Value = client
            .fetch_query_with(&key, QueryOptions::with_stale_time(Duration::from_secs(5)), || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(json!({ "id": "u-2" }))
            })
            .await
            .unwrap();
        assert_eq!(value, json!({ "id": "u-2" }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_forces_refetch_even_when_fresh() {
        let client = client(3600);
        let list = QueryKey::root("exams").with(&json!({ "goal_id": "g-1" })).unwrap();
        let other = QueryKey::root("goals");
        let calls = AtomicUsize::new(0);

        counted_fetch(&client, &list, &calls, 1).await;
        counted_fetch(&client, &other, &calls, 1).await;
        assert_eq!(client.invalidate_queries(&QueryKey::root("exams")).await, 1);

        assert_eq!(counted_fetch(&client, &list, &calls, 2).await, 2);
        assert_eq!(counted_fetch(&client, &other, &calls, 9).await, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // The refetch clears the invalid mark.
        assert!(matches!(client.lookup(&list).await, CacheLookup::Fresh(_)));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let client = client(60);
        let key = QueryKey::root("goals");
        let err = client
            .fetch_query::<i64, _, _, _>(&key, || async { Err(TestError::Backend) })
            .await
            .unwrap_err();
        assert!(matches!(err, TestError::Backend));
        assert_eq!(client.lookup(&key).await, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn type_mismatch_is_decode_error() {
        let client = client(60);
        let key = QueryKey::root("goal").id("g-1");
        client.set_query_data(&key, &json!({ "id": "g-1" })).await.unwrap();
        let err = client.get_query_data::<Vec<String>>(&key).await.unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
    }

    #[tokio::test]
    async fn cancelled_fetch_never_writes() {
        let client = client(60);
        let key = QueryKey::root("exam").id("e-1");
        let cancel = CancellationToken::new();

        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let fetch = client.fetch_query_cancellable(&key, &cancel, || async move {
            let _ = wait.await;
            Ok::<_, TestError>(json!({ "id": "e-1" }))
        });
        cancel.cancel();
        let err = fetch.await.unwrap_err();
        let _ = release.send(());

        assert!(matches!(err, TestError::Query(QueryError::Cancelled(_))));
        assert_eq!(client.lookup(&key).await, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn uncancelled_fetch_writes() {
        let client = client(60);
        let key = QueryKey::root("exam").id("e-2");
        let cancel = CancellationToken::new();
        let value: Value = client
            .fetch_query_cancellable(&key, &cancel, || async { Ok::<_, TestError>(json!(7)) })
            .await
            .unwrap();
        assert_eq!(value, json!(7));
        assert_eq!(client.lookup(&key).await, CacheLookup::Fresh(json!(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn swr_serves_stale_then_refreshes_in_background() {
        let client = client(10);
        let key = QueryKey::root("questions");
        client.set_query_data(&key, &json!(["old"])).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        let result = client
            .fetch_query_swr(&key, || async { Ok::<_, TestError>(json!(["new"])) })
            .await
            .unwrap();
        assert_eq!(result.data, json!(["old"]));
        result.refresh.expect("refresh spawned").await.unwrap();

        assert_eq!(client.lookup(&key).await, CacheLookup::Fresh(json!(["new"])));
    }

    #[tokio::test]
    async fn swr_fetches_inline_on_miss() {
        let client = client(10);
        let key = QueryKey::root("questions");
        let result = client
            .fetch_query_swr(&key, || async { Ok::<_, TestError>(json!(1)) })
            .await
            .unwrap();
        assert_eq!(result.data, json!(1));
        assert!(result.refresh.is_none());
    }

    #[tokio::test]
    async fn mutate_applies_effects_only_on_success() {
        let client = client(60);
        let list = QueryKey::root("goals");
        let detail = QueryKey::root("goal").id("g-1");
        client.set_query_data(&list, &json!([])).await.unwrap();

        let created = client
            .mutate(
                || async { Ok::<_, TestError>(json!({ "id": "g-1" })) },
                |goal| {
                    vec![
                        MutationEffect::SetData {
                            key: detail.clone(),
                            value: goal.clone(),
                        },
                        MutationEffect::invalidate(list.clone()),
                    ]
                },
            )
            .await
            .unwrap();
        assert_eq!(created, json!({ "id": "g-1" }));
        assert_eq!(client.lookup(&detail).await, CacheLookup::Fresh(json!({ "id": "g-1" })));
        assert_eq!(client.lookup(&list).await, CacheLookup::Stale(json!([])));

        client.set_query_data(&list, &json!([1])).await.unwrap();
        let _ = client
            .mutate(
                || async { Err::<Value, _>(TestError::Backend) },
                |_| vec![MutationEffect::invalidate(list.clone())],
            )
            .await;
        assert_eq!(client.lookup(&list).await, CacheLookup::Fresh(json!([1])));
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let client = client(60);
        client.set_query_data(&QueryKey::root("goal").id("a"), &1).await.unwrap();
        client.set_query_data(&QueryKey::root("goal").id("b"), &2).await.unwrap();
        client.set_query_data(&QueryKey::root("goals"), &3).await.unwrap();

        assert_eq!(client.remove_queries(&QueryKey::root("goal")).await, 2);
        assert_eq!(client.keys().await, vec![QueryKey::root("goals")]);
        client.clear().await;
        assert!(client.is_empty().await);
    }

    fn held_fetch(
        client: &QueryClient,
        key: &QueryKey,
        value: Value,
    ) -> (
        tokio::sync::oneshot::Receiver<()>,
        tokio::sync::oneshot::Sender<()>,
        JoinHandle<Result<Value, TestError>>,
    ) {
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let client = client.clone();
        let key = key.clone();
        let handle = tokio::spawn(async move {
            client
                .fetch_query(&key, || async move {
                    let _ = started_tx.send(());
                    let _ = release_rx.await;
                    Ok::<_, TestError>(value)
                })
                .await
        });
        (started_rx, release_tx, handle)
    }

    #[tokio::test]
    async fn invalidation_during_fetch_forces_next_read() {
        let client = client(3600);
        let key = QueryKey::root("exams").with(&json!({ "goal_id": "g-1" })).unwrap();

        let (started, release, pending) = held_fetch(&client, &key, json!(["e-1 (pre-delete)"]));
        started.await.unwrap();
        client.invalidate_queries(&QueryKey::root("exams")).await;
        release.send(()).unwrap();
        assert_eq!(pending.await.unwrap().unwrap(), json!(["e-1 (pre-delete)"]));

        assert_eq!(
            client.lookup(&key).await,
            CacheLookup::Stale(json!(["e-1 (pre-delete)"]))
        );
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let next: Value = client
            .fetch_query(&key, || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(json!([]))
            })
            .await
            .unwrap();
        assert_eq!(next, json!([]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(client.lookup(&key).await, CacheLookup::Fresh(_)));
    }

    #[tokio::test]
    async fn removal_during_fetch_drops_the_result() {
        let client = client(3600);
        let key = QueryKey::root("exam").id("e-1");

        let (started, release, pending) = held_fetch(&client, &key, json!({ "id": "e-1" }));
        started.await.unwrap();
        client.remove_queries(&QueryKey::root("exam")).await;
        release.send(()).unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(client.lookup(&key).await, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn unrelated_invalidation_leaves_fetch_fresh() {
        let client = client(3600);
        let key = QueryKey::root("goals");

        let (started, release, pending) = held_fetch(&client, &key, json!([1]));
        started.await.unwrap();
        client.invalidate_queries(&QueryKey::root("exams")).await;
        release.send(()).unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(client.lookup(&key).await, CacheLookup::Fresh(json!([1])));
    }

    #[tokio::test]
    async fn reordered_key_fields_hit_the_same_entry() {
        let client = client(60);
        let a = QueryKey::root("goals")
            .with(&json!({ "name": "math", "status": "doing" }))
            .unwrap();
        let b = QueryKey::from_parts(vec![
            json!("goals"),
            serde_json::from_str(r#"{"status":"doing","name":"math"}"#).unwrap(),
        ]);
        client.set_query_data(&a, &json!([1])).await.unwrap();

        assert_eq!(
            client.get_query_data::<Value>(&b).await.unwrap(),
            Some(json!([1]))
        );
        assert_eq!(client.len().await, 1);
    }
}
