//! Cache effects declared by write calls.

use serde::Serialize;
use serde_json::Value;

use crate::client::encode;
use crate::error::QueryError;
use crate::key::QueryKey;

/// What a successful mutation does to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEffect {
    /// Overwrite one entry with the mutation's result.
    SetData { key: QueryKey, value: Value },
    /// Force a refetch of every entry under `prefix` on next read.
    Invalidate { prefix: QueryKey },
    /// Drop every entry under `prefix`.
    Remove { prefix: QueryKey },
}

impl MutationEffect {
    /// # Errors
    ///
    /// Returns [`QueryError::Encode`] if `data` cannot be represented as JSON.
    pub fn set<T: Serialize + ?Sized>(key: QueryKey, data: &T) -> Result<Self, QueryError> {
        let value = encode(&key, data)?;
        Ok(Self::SetData { key, value })
    }

    #[must_use]
    pub const fn invalidate(prefix: QueryKey) -> Self {
        Self::Invalidate { prefix }
    }

    #[must_use]
    pub const fn remove(prefix: QueryKey) -> Self {
        Self::Remove { prefix }
    }
}
