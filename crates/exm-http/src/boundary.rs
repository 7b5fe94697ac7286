//! The single place where a 401 is turned into a signed-out session.

use std::sync::Arc;

use exm_auth::CredentialStore;

/// Clears stored credentials when the backend rejects the bearer token.
///
/// Every request path of [`crate::ApiClient`] funnels 401 responses through
/// [`AuthBoundary::on_unauthorized`], so the clear happens exactly once per
/// rejected response and never at individual call sites.
#[derive(Clone)]
pub struct AuthBoundary {
    credentials: Arc<dyn CredentialStore>,
}

impl AuthBoundary {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    pub fn on_unauthorized(&self, path: &str) {
        tracing::warn!(path, "backend rejected credentials; clearing session");
        if let Err(error) = self.credentials.clear() {
            tracing::warn!(%error, "failed to clear stored credentials");
        }
        if self.token_survives_clear() {
            tracing::warn!(
                "a rejected token is still configured (EXAMIND_SESSION__TOKEN or session.token); \
                 unset it, or every call keeps failing with 401"
            );
        }
    }

    /// A token that clearing cannot remove, such as one set through the
    /// environment, is still being sent.
    fn token_survives_clear(&self) -> bool {
        self.credentials.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use exm_auth::{KeyringStore, MemoryStore, SessionCredentials};
    use exm_config::SessionConfig;

    use super::*;

    #[test]
    fn stored_session_is_gone_after_401() {
        let store = Arc::new(MemoryStore::with_credentials(SessionCredentials::new(
            "tok",
            Some("u-1".into()),
        )));
        let boundary = AuthBoundary::new(store.clone());
        boundary.on_unauthorized("/goal/list");
        assert_eq!(store.token(), None);
        assert!(!boundary.token_survives_clear());
    }

    #[test]
    fn env_token_survives_401() {
        let config = SessionConfig {
            token: "from-env".into(),
            ..SessionConfig::default()
        };
        let dir = std::env::temp_dir().join("exm-boundary-no-files");
        let store = Arc::new(KeyringStore::file_only(&config, dir));
        let boundary = AuthBoundary::new(store.clone());
        boundary.on_unauthorized("/goal/list");
        assert_eq!(store.token().as_deref(), Some("from-env"));
        assert!(boundary.token_survives_clear());
    }
}
