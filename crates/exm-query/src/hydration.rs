//! Dehydrate a cache into a serializable snapshot and hydrate another from it.
//!
//! The snapshot holds plain JSON and timestamps only, so it can be written to
//! disk or embedded in a response and loaded by a different process.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::client::{Entry, QueryClient};
use crate::key::QueryKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DehydratedState {
    #[serde(default)]
    pub queries: Vec<DehydratedQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DehydratedQuery {
    pub key: QueryKey,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

impl DehydratedState {
    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Snapshot every valid entry of `client`. Invalidated entries are skipped:
/// the receiving side would have to refetch them anyway.
pub async fn dehydrate(client: &QueryClient) -> DehydratedState {
    let entries = client.inner.entries.read().await;
    let queries = entries
        .values()
        .filter(|e| !e.invalidated)
        .map(|e| DehydratedQuery {
            key: e.key.clone(),
            data: e.data.clone(),
            updated_at: e.updated_at,
        })
        .collect();
    DehydratedState { queries }
}

/// Merge `state` into `client`.
///
/// A snapshot entry is written only when its key is absent or the resident
/// entry is older; entries with other keys are left alone. Hydrated entries
/// keep their age, so a snapshot taken long ago is already stale on arrival.
/// Returns the number of entries written.
pub async fn hydrate(client: &QueryClient, state: DehydratedState) -> usize {
    let now = Utc::now();
    let mut entries = client.inner.entries.write().await;
    let mut written = 0;

    for query in state.queries {
        let slot = query.key.hash_key();
        if let Some(resident) = entries.get(&slot)
            && resident.updated_at >= query.updated_at
        {
            tracing::debug!(key = %query.key, "resident entry is newer; skipping");
            continue;
        }

        let prior_age = (now - query.updated_at).to_std().unwrap_or(Duration::ZERO);
        entries.insert(
            slot,
            Entry {
                key: query.key,
                data: query.data,
                updated_at: query.updated_at,
                fetched_at: Instant::now(),
                prior_age,
                invalidated: false,
            },
        );
        written += 1;
    }

    tracing::debug!(written, "hydrated query cache");
    written
}
