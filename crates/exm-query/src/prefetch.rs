//! Concurrent prefetch of a fixed list of queries into a request-scoped cache.

use std::fmt;
use std::future::Future;

use futures::FutureExt as _;
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use serde_json::Value;

use crate::client::QueryClient;
use crate::key::QueryKey;

/// Error of a prefetch fetcher. The message goes into the report; a
/// rejected session is flagged so callers can stop treating the page as
/// merely incomplete.
pub trait PrefetchError: fmt::Display {
    fn is_unauthorized(&self) -> bool {
        false
    }
}

impl PrefetchError for String {}

impl PrefetchError for &str {}

struct FetchFailed {
    error: String,
    unauthorized: bool,
}

/// One `(key, fetcher)` pair of a prefetch plan.
pub struct PrefetchQuery<'a> {
    key: QueryKey,
    fetch: BoxFuture<'a, Result<Value, FetchFailed>>,
}

impl<'a> PrefetchQuery<'a> {
    pub fn new<T, E, Fut>(key: QueryKey, fetch: Fut) -> Self
    where
        T: Serialize + Send,
        E: PrefetchError + Send,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        let fetch = async move {
            let data = fetch.await.map_err(|e| FetchFailed {
                error: e.to_string(),
                unauthorized: e.is_unauthorized(),
            })?;
            serde_json::to_value(&data).map_err(|e| FetchFailed {
                error: e.to_string(),
                unauthorized: false,
            })
        }
        .boxed();
        Self { key, fetch }
    }

    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl fmt::Debug for PrefetchQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefetchQuery")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefetchFailure {
    pub key: QueryKey,
    pub error: String,
    /// The backend rejected the session (HTTP 401).
    pub unauthorized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchReport {
    pub fetched: Vec<QueryKey>,
    pub failed: Vec<PrefetchFailure>,
}

impl PrefetchReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.failed.iter().any(|f| f.unauthorized)
    }
}

/// Run every query concurrently, wait for all of them, and cache the
/// successes in `client`.
///
/// A failing query does not abort the rest: it is logged, reported, and left
/// out of the cache so the consumer fetches it on first read.
pub async fn prefetch(client: &QueryClient, queries: Vec<PrefetchQuery<'_>>) -> PrefetchReport {
    let (keys, fetches): (Vec<_>, Vec<_>) = queries.into_iter().map(|q| (q.key, q.fetch)).unzip();
    let results = join_all(fetches).await;

    let mut report = PrefetchReport::default();
    for (key, result) in keys.into_iter().zip(results) {
        match result {
            Ok(data) => {
                client.write_entry(&key, data).await;
                report.fetched.push(key);
            }
            Err(FetchFailed {
                error,
                unauthorized,
            }) => {
                tracing::warn!(%key, %error, "prefetch failed; consumer will fetch on first read");
                report.failed.push(PrefetchFailure {
                    key,
                    error,
                    unauthorized,
                });
            }
        }
    }
    report
}
