//! Best-effort inspection of bearer tokens.
//!
//! The backend may issue JWTs or opaque tokens. For JWTs the `exp` claim is
//! decoded without verifying the signature, which is enough to tell the user
//! that a stored session has lapsed before the next request 401s.

use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::CredentialError;

/// Decode the JWT `exp` claim.
///
/// # Errors
///
/// Returns [`CredentialError::InvalidToken`] if the token is not a JWT or the
/// `exp` claim is missing or cannot be parsed.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, CredentialError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(CredentialError::InvalidToken("not a JWT".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| CredentialError::InvalidToken(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| CredentialError::InvalidToken(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| CredentialError::InvalidToken("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| CredentialError::InvalidToken("invalid exp timestamp".into()))
}

/// `Some(true)` if the token is a JWT that expires within `buffer_secs`,
/// `None` if the token is opaque.
#[must_use]
pub fn is_near_expiry(token: &str, buffer_secs: i64) -> Option<bool> {
    let expires_at = decode_expiry(token).ok()?;
    Some(expires_at.timestamp() - Utc::now().timestamp() <= buffer_secs)
}
