use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("not signed in; run `exm auth login`")]
    NotAuthenticated,

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("credential store error: {0}")]
    Store(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}
