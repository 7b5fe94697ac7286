use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use exm_api::Api;
use exm_auth::KeyringStore;
use exm_config::ExamindConfig;
use exm_query::DehydratedState;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: ExamindConfig,
    pub credentials: Arc<KeyringStore>,
    pub api: Api,
}

impl AppContext {
    /// Build the credential store, the API client, and the session cache.
    /// A `--hydrate` snapshot is merged into the cache before any command runs.
    pub async fn init(config: ExamindConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let credentials = Arc::new(KeyringStore::from_config(&config.session));
        let api = Api::from_config(&config, credentials.clone())
            .context("failed to initialize API client")?;

        let ctx = Self {
            config,
            credentials,
            api,
        };

        if let Some(path) = flags.hydrate.as_deref() {
            let state = read_snapshot(path)?;
            let written = ctx.api.hydrate(state).await;
            tracing::debug!(path = %path.display(), written, "hydrated session cache");
        }

        Ok(ctx)
    }
}

/// Read a snapshot written by `exm page --out`.
pub fn read_snapshot(path: &Path) -> anyhow::Result<DehydratedState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}
