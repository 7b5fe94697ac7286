//! HTTP client error types.

use thiserror::Error;

/// Fallback text when a logical failure carries no message.
pub const GENERIC_FAILURE: &str = "request failed";

/// Errors surfaced by [`crate::ApiClient`].
///
/// Three kinds matter to callers: transport failures (network, timeout),
/// logical failures (non-zero envelope code on an otherwise successful
/// response), and authorization failures (HTTP 401).
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network unreachable, timeout, or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The envelope carried a non-zero code.
    #[error("{message} (code {code})")]
    Logical {
        /// Code from the response envelope.
        code: i64,
        /// Embedded message, or [`GENERIC_FAILURE`].
        message: String,
    },

    /// HTTP 401. Stored credentials have already been cleared.
    #[error("not signed in or session expired")]
    Unauthorized,

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Embedded envelope message or raw body.
        message: String,
    },

    /// Response body was not a valid envelope or payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// The underlying client could not be built.
    #[error("client setup failed: {0}")]
    Build(String),
}

impl HttpError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Text suitable for an end-user notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(e) if e.is_timeout() => "The request timed out.".into(),
            Self::Transport(_) => "Network error, please try again.".into(),
            Self::Logical { message, .. } => message.clone(),
            Self::Unauthorized => "Your session has expired. Run `exm auth login`.".into(),
            Self::Status { .. } | Self::Decode(_) | Self::Encode(_) | Self::Build(_) => {
                "Something went wrong, please try again.".into()
            }
        }
    }
}
