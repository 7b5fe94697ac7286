//! `/user/*` endpoints and session lifecycle.

use exm_auth::SessionCredentials;
use exm_core::entities::User;
use exm_http::{ApiClient, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Api, ApiError, keys};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub code: String,
}

/// Response of `/user/login` and `/user/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl LoginResponse {
    #[must_use]
    pub fn credentials(&self) -> SessionCredentials {
        SessionCredentials::new(self.token.clone(), Some(self.user.id.clone()))
    }
}

#[must_use]
pub fn send_verification_code_request(phone: &str) -> RequestSpec {
    RequestSpec::post("/user/send-verification-code").with_body(json!({ "phone": phone }))
}

/// # Errors
///
/// Returns [`ApiError::Http`] if the request cannot be serialized.
pub fn login_request(request: &LoginRequest) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/user/login").json(request)?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] if the request cannot be serialized.
pub fn register_request(request: &RegisterRequest) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/user/register").json(request)?)
}

#[must_use]
pub fn logout_request() -> RequestSpec {
    RequestSpec::post("/user/logout")
}

#[must_use]
pub fn info_request() -> RequestSpec {
    RequestSpec::get("/user/info")
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn send_verification_code(client: &ApiClient, phone: &str) -> Result<(), ApiError> {
    Ok(client
        .execute_unit(&send_verification_code_request(phone))
        .await?)
}

/// Sign in and persist the returned credentials.
///
/// # Errors
///
/// Returns [`ApiError::Http`] if the call fails and
/// [`ApiError::Credentials`] if the token cannot be stored.
pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    let response: LoginResponse = client.execute(&login_request(request)?).await?;
    client.credentials().store(&response.credentials())?;
    tracing::info!(user_id = %response.user.id, "signed in");
    Ok(response)
}

/// Create an account and persist the returned credentials.
///
/// # Errors
///
/// Same as [`login`].
pub async fn register(
    client: &ApiClient,
    request: &RegisterRequest,
) -> Result<LoginResponse, ApiError> {
    let response: LoginResponse = client.execute(&register_request(request)?).await?;
    client.credentials().store(&response.credentials())?;
    tracing::info!(user_id = %response.user.id, "registered");
    Ok(response)
}

/// Sign out. Local credentials are cleared even when the backend call fails,
/// so a dead session can always be dropped.
///
/// # Errors
///
/// Returns the backend failure after clearing, or [`ApiError::Credentials`].
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    let remote = client.execute_unit(&logout_request()).await;
    client.credentials().clear()?;
    match remote {
        Ok(()) | Err(exm_http::HttpError::Unauthorized) => Ok(()),
        Err(error) => {
            tracing::warn!(%error, "backend logout failed; local session cleared anyway");
            Err(error.into())
        }
    }
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn info(client: &ApiClient) -> Result<User, ApiError> {
    Ok(client.execute(&info_request()).await?)
}

impl Api {
    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn user_info(&self) -> Result<User, ApiError> {
        self.cache()
            .fetch_query(&keys::user_info(), || info(self.client()))
            .await
    }

    /// Sign in and start from an empty cache.
    ///
    /// # Errors
    ///
    /// Same as [`login`].
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = login(self.client(), request).await?;
        self.cache().clear().await;
        self.cache()
            .set_query_data(&keys::user_info(), &response.user)
            .await?;
        Ok(response)
    }

    /// # Errors
    ///
    /// Same as [`register`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        let response = register(self.client(), request).await?;
        self.cache().clear().await;
        self.cache()
            .set_query_data(&keys::user_info(), &response.user)
            .await?;
        Ok(response)
    }

    /// # Errors
    ///
    /// Same as [`logout`]. The cache is cleared in every case.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = logout(self.client()).await;
        self.cache().clear().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn login_body_has_phone_and_code() {
        let req = login_request(&LoginRequest {
            phone: "13800000000".into(),
            code: "123456".into(),
        })
        .unwrap();
        assert_eq!(req.path, "/user/login");
        assert_eq!(
            req.body,
            Some(json!({ "phone": "13800000000", "code": "123456" }))
        );
    }

    #[test]
    fn credentials_carry_user_id() {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": "jwt",
            "user": { "id": "u-1", "name": "Lin", "phone": "138" }
        }))
        .unwrap();
        assert_eq!(
            response.credentials(),
            SessionCredentials::new("jwt", Some("u-1".into()))
        );
    }
}
