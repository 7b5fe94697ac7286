//! API error types.

use std::path::PathBuf;

use exm_auth::CredentialError;
use exm_http::HttpError;
use exm_query::{PrefetchError, QueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("object storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http(HttpError::Unauthorized))
    }

    /// Text suitable for an end-user notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) => e.user_message(),
            Self::NotConfigured(_) | Self::InvalidInput(_) | Self::Io { .. } => self.to_string(),
            Self::Query(_) | Self::Credentials(_) | Self::Storage(_) => {
                "Something went wrong, please try again.".into()
            }
        }
    }
}

impl PrefetchError for ApiError {
    fn is_unauthorized(&self) -> bool {
        Self::is_unauthorized(self)
    }
}
