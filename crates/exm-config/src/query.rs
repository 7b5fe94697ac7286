//! Query cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_stale_time_secs() -> u64 {
    60
}

const fn default_page_size() -> u32 {
    12
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// How long a fetched result is served without a new network call.
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// Default page size for list commands.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time_secs(),
            page_size: default_page_size(),
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}
