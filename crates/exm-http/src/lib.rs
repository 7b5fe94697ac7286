//! # exm-http
//!
//! REST client wrapper for the Examind backend.
//!
//! One client abstraction serves every domain module:
//! - base URL and per-call timeouts from [`exm_config::ApiConfig`]
//! - `Authorization: Bearer` injection from an [`exm_auth::CredentialStore`]
//! - envelope normalization (`code != 0` rejects even on HTTP 200)
//! - a central [`AuthBoundary`] that clears credentials on HTTP 401
//!
//! No retries or backoff: a failed call surfaces immediately.

mod boundary;
mod envelope;
mod error;
mod request;

pub use boundary::AuthBoundary;
pub use envelope::{Envelope, SUCCESS_CODE};
pub use error::{GENERIC_FAILURE, HttpError};
pub use request::{Method, RequestSpec, TimeoutClass};

use std::sync::Arc;
use std::time::Duration;

use exm_auth::CredentialStore;
use exm_config::ApiConfig;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::{DeserializeOwned, IgnoredAny};

/// HTTP client for the Examind backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    long_timeout: Duration,
    credentials: Arc<dyn CredentialStore>,
    boundary: AuthBoundary,
}

impl ApiClient {
    /// Build a client from API configuration and a credential source.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Build`] if the underlying `reqwest::Client` fails to build.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.normalized_base_url().to_string(),
            timeout: config.timeout(),
            long_timeout: config.long_timeout(),
            boundary: AuthBoundary::new(Arc::clone(&credentials)),
            credentials,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    const fn timeout_for(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Default => self.timeout,
            TimeoutClass::Long => self.long_timeout,
        }
    }

    /// Execute a request and unwrap the envelope's `data` as `T`.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Transport`] on network failure or timeout
    /// - [`HttpError::Unauthorized`] on HTTP 401 (credentials cleared first)
    /// - [`HttpError::Status`] on any other non-success status
    /// - [`HttpError::Logical`] when the envelope code is non-zero
    /// - [`HttpError::Decode`] when the body or payload cannot be parsed
    #[tracing::instrument(
        level = "debug",
        skip(self, req),
        fields(method = %req.method, path = %req.path)
    )]
    pub async fn execute<T: DeserializeOwned>(&self, req: &RequestSpec) -> Result<T, HttpError> {
        let url = req.url(&self.base_url);
        let mut request = match req.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        }
        .timeout(self.timeout_for(req.timeout))
        .header(ACCEPT, "application/json");

        if let Some(token) = self.credentials.token() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &req.body {
            request = request.json(body);
        }

        let started = std::time::Instant::now();
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), elapsed = ?started.elapsed(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            self.boundary.on_unauthorized(&req.path);
            return Err(HttpError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            let message = Envelope::parse(&body)
                .map(|env| env.failure_message())
                .unwrap_or(body);
            return Err(HttpError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let result = Envelope::parse(&body)?.into_data();
        if let Err(HttpError::Logical { code, message }) = &result {
            tracing::debug!(code, %message, "backend reported logical failure");
        }
        result
    }

    /// Execute a request whose payload is irrelevant to the caller.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`].
    pub async fn execute_unit(&self, req: &RequestSpec) -> Result<(), HttpError> {
        self.execute::<IgnoredAny>(req).await.map(|_| ())
    }
}
