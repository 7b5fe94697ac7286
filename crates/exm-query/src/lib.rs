//! # exm-query
//!
//! Query cache for the Examind client layer.
//!
//! - [`QueryClient`]: results keyed by [`QueryKey`], served while fresh,
//!   refetched once stale or invalidated
//! - [`MutationEffect`]: what a write does to the cache
//! - [`prefetch()`]: fill a request-scoped cache concurrently
//! - [`dehydrate()`] / [`hydrate()`]: move cache contents across processes
//!
//! There is no global instance. Callers construct a client per prefetch
//! request and per session and pass it explicitly.

pub mod client;
pub mod error;
pub mod hydration;
pub mod key;
pub mod mutation;
pub mod prefetch;

pub use client::{CacheLookup, DEFAULT_STALE_TIME, QueryClient, QueryOptions, Revalidating};
pub use error::QueryError;
pub use hydration::{DehydratedQuery, DehydratedState, dehydrate, hydrate};
pub use key::QueryKey;
pub use mutation::MutationEffect;
pub use prefetch::{PrefetchError, PrefetchFailure, PrefetchQuery, PrefetchReport, prefetch};
