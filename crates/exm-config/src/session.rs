//! Session credential naming.
//!
//! The web client persisted the auth token and user id as cookies; the CLI
//! keeps the same names for the keyring entries and credential files so the
//! two can be configured side by side.

use serde::{Deserialize, Serialize};

fn default_token_name() -> String {
    String::from("token")
}

fn default_user_id_name() -> String {
    String::from("user_id")
}

fn default_keyring_service() -> String {
    String::from("examind-cli")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Name under which the bearer token is stored.
    #[serde(default = "default_token_name")]
    pub token_name: String,

    /// Name under which the signed-in user's id is stored.
    #[serde(default = "default_user_id_name")]
    pub user_id_name: String,

    /// OS keyring service name.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Token supplied directly (CI, scripts). Takes part in lookup after the keyring.
    #[serde(default)]
    pub token: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_name: default_token_name(),
            user_id_name: default_user_id_name(),
            keyring_service: default_keyring_service(),
            token: String::new(),
        }
    }
}
