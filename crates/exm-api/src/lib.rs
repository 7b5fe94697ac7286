//! # exm-api
//!
//! Domain API modules for the Examind backend.
//!
//! Every module offers three layers:
//! - `*_request` builders returning a pure [`exm_http::RequestSpec`]
//! - free functions executing one call through an [`ApiClient`]
//! - cached methods on [`Api`] that go through the session [`QueryClient`]
//!   and declare the cache effects of each write
//!
//! [`pages`] holds the prefetch plans that mirror the web app's page routes.

pub mod ai;
pub mod exam;
pub mod goal;
pub mod keys;
pub mod pages;
pub mod question;
pub mod storage;
pub mod user;

mod error;

pub use error::ApiError;

use std::sync::Arc;

use exm_auth::CredentialStore;
use exm_config::{ExamindConfig, StorageConfig};
use exm_http::ApiClient;
use exm_query::{MutationEffect, QueryClient, QueryKey, QueryOptions};
use serde::Serialize;

/// Session-scoped entry point: one HTTP client plus one query cache.
#[derive(Clone)]
pub struct Api {
    client: ApiClient,
    cache: QueryClient,
    storage: StorageConfig,
}

impl Api {
    #[must_use]
    pub fn new(client: ApiClient, cache: QueryClient, storage: StorageConfig) -> Self {
        Self {
            client,
            cache,
            storage,
        }
    }

    /// Build the HTTP client and a fresh session cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &ExamindConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config.api, credentials)?;
        let cache = QueryClient::new(query_options(config));
        Ok(Self::new(client, cache, config.storage.clone()))
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub const fn cache(&self) -> &QueryClient {
        &self.cache
    }

    #[must_use]
    pub const fn storage_config(&self) -> &StorageConfig {
        &self.storage
    }
}

/// Overwrite `key` with `data`, or invalidate it if `data` does not encode.
fn set_or_invalidate<T: Serialize>(key: QueryKey, data: &T) -> MutationEffect {
    match MutationEffect::set(key.clone(), data) {
        Ok(effect) => effect,
        Err(error) => {
            tracing::warn!(%error, "mutation result not cached");
            MutationEffect::invalidate(key)
        }
    }
}

/// Cache options derived from the `[query]` config section.
#[must_use]
pub fn query_options(config: &ExamindConfig) -> QueryOptions {
    QueryOptions::with_stale_time(config.query.stale_time())
}
