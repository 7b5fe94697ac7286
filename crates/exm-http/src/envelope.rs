//! Backend response envelope.
//!
//! Every endpoint answers `{"code": 0, "msg": "...", "data": ...}`. A non-zero
//! code is a logical failure regardless of the HTTP status. `status` and
//! `message` are accepted as aliases for `code` and `msg`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GENERIC_FAILURE, HttpError};

/// Envelope code that means success.
pub const SUCCESS_CODE: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(alias = "status")]
    pub code: i64,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Parse a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body is not an envelope.
    pub fn parse(body: &str) -> Result<Self, HttpError> {
        serde_json::from_str(body).map_err(|e| HttpError::Decode(format!("invalid envelope: {e}")))
    }

    /// Message to show for a failed envelope.
    #[must_use]
    pub fn failure_message(&self) -> String {
        self.msg
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE)
            .to_string()
    }

    /// Unwrap the payload, rejecting non-zero codes.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Logical`] for a non-zero code and
    /// [`HttpError::Decode`] if `data` does not match `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        if self.code != SUCCESS_CODE {
            return Err(HttpError::Logical {
                code: self.code,
                message: self.failure_message(),
            });
        }
        serde_json::from_value(self.data)
            .map_err(|e| HttpError::Decode(format!("unexpected payload: {e}")))
    }
}
