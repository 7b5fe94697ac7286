use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use exm_config::SessionConfig;

use crate::error::CredentialError;

const CREDENTIALS_DIR: &str = ".examind";

/// The bearer token and the id of the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub token: String,
    pub user_id: Option<String>,
}

impl SessionCredentials {
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

/// Where the HTTP client reads the bearer token from, and what the auth
/// boundary clears on a 401.
pub trait CredentialStore: Send + Sync {
    /// Current bearer token, if signed in.
    fn token(&self) -> Option<String>;

    /// Id of the signed-in user, if known.
    fn user_id(&self) -> Option<String>;

    /// Persist credentials after a successful login or registration.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the credentials cannot be written.
    fn store(&self, credentials: &SessionCredentials) -> Result<(), CredentialError>;

    /// Forget all stored credentials. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if persisted credentials cannot be removed.
    fn clear(&self) -> Result<(), CredentialError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-local credentials. Used for request-scoped prefetching (the token
/// arrives with the request) and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<SessionCredentials>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_credentials(credentials: SessionCredentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionCredentials>> {
        // A poisoned lock still holds a valid Option; keep serving it.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryStore {
    fn token(&self) -> Option<String> {
        self.lock().as_ref().map(|c| c.token.clone())
    }

    fn user_id(&self) -> Option<String> {
        self.lock().as_ref().and_then(|c| c.user_id.clone())
    }

    fn store(&self, credentials: &SessionCredentials) -> Result<(), CredentialError> {
        *self.lock() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.lock() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// KeyringStore
// ---------------------------------------------------------------------------

/// OS keychain storage with a file fallback.
///
/// Lookup priority for the token: keyring → `session.token` config value
/// (`EXAMIND_SESSION__TOKEN`) → file (`~/.examind/<token_name>`).
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    token_name: String,
    user_id_name: String,
    env_token: Option<String>,
    dir: Option<PathBuf>,
    use_keyring: bool,
}

impl KeyringStore {
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            service: config.keyring_service.clone(),
            token_name: config.token_name.clone(),
            user_id_name: config.user_id_name.clone(),
            env_token: Some(config.token.clone()).filter(|t| !t.is_empty()),
            dir: dirs::home_dir().map(|h| h.join(CREDENTIALS_DIR)),
            use_keyring: true,
        }
    }

    /// File-only store rooted at `dir`. Skips the keychain entirely.
    #[must_use]
    pub fn file_only(config: &SessionConfig, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            use_keyring: false,
            ..Self::from_config(config)
        }
    }

    /// Which tier the current token comes from (for status display).
    #[must_use]
    pub fn token_source(&self) -> Option<&'static str> {
        if self.keyring_get(&self.token_name).is_some() {
            return Some("keyring");
        }
        if self.env_token.is_some() {
            return Some("env");
        }
        if self.file_get(&self.token_name).is_some() {
            return Some("file");
        }
        None
    }

    fn keyring_get(&self, name: &str) -> Option<String> {
        if !self.use_keyring {
            return None;
        }
        let entry = keyring::Entry::new(&self.service, name).ok()?;
        entry.get_password().ok().filter(|v| !v.is_empty())
    }

    fn keyring_set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(&self.service, name)
            .map_err(|e| CredentialError::Keyring(e.to_string()))?;
        entry
            .set_password(value)
            .map_err(|e| CredentialError::Keyring(e.to_string()))
    }

    fn dir(&self) -> Result<&Path, CredentialError> {
        self.dir.as_deref().ok_or_else(|| {
            CredentialError::Store("home directory not found; cannot store credentials".into())
        })
    }

    fn file_get(&self, name: &str) -> Option<String> {
        let path = self.dir.as_ref()?.join(name);
        fs::read_to_string(path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn file_set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        let dir = self.dir()?;
        fs::create_dir_all(dir)
            .map_err(|e| CredentialError::Store(format!("mkdir {}: {e}", dir.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", dir.display());
            }
        }

        let path = dir.join(name);
        fs::write(&path, value)
            .map_err(|e| CredentialError::Store(format!("write {}: {e}", path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .map_err(|e| CredentialError::Store(format!("chmod {}: {e}", path.display())))?;
        }
        Ok(())
    }

    fn file_remove(&self, name: &str) -> Result<(), CredentialError> {
        let Some(dir) = self.dir.as_ref() else {
            return Ok(());
        };
        let path = dir.join(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                CredentialError::Store(format!("failed to delete {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    fn put(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        if self.use_keyring {
            match self.keyring_set(name, value) {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::warn!(%error, name, "keyring store failed; falling back to file");
                }
            }
        }
        self.file_set(name, value)
    }

    fn get(&self, name: &str) -> Option<String> {
        self.keyring_get(name).or_else(|| self.file_get(name))
    }

    fn remove(&self, name: &str) -> Result<(), CredentialError> {
        if self.use_keyring
            && let Ok(entry) = keyring::Entry::new(&self.service, name)
        {
            // May not exist.
            let _ = entry.delete_credential();
        }
        self.file_remove(name)
    }
}

impl CredentialStore for KeyringStore {
    fn token(&self) -> Option<String> {
        self.keyring_get(&self.token_name)
            .or_else(|| self.env_token.clone())
            .or_else(|| self.file_get(&self.token_name))
    }

    fn user_id(&self) -> Option<String> {
        self.get(&self.user_id_name)
    }

    fn store(&self, credentials: &SessionCredentials) -> Result<(), CredentialError> {
        self.put(&self.token_name, &credentials.token)?;
        match &credentials.user_id {
            Some(user_id) => self.put(&self.user_id_name, user_id),
            None => self.remove(&self.user_id_name),
        }
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.remove(&self.token_name)?;
        self.remove(&self.user_id_name)
    }
}
