//! Pure request descriptions.
//!
//! Domain modules describe calls as [`RequestSpec`] values; only
//! [`crate::ApiClient::execute`] touches the network. This keeps URL and body
//! construction testable without a server.

use std::fmt;

use exm_core::paging::QueryParams;
use serde::Serialize;
use serde_json::Value;

use crate::error::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configured timeout applies to a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutClass {
    #[default]
    Default,
    /// AI generation and parsing calls.
    Long,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: TimeoutClass,
}

impl RequestSpec {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: TimeoutClass::Default,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Append one query pair.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every pair rendered by `params`, in order.
    #[must_use]
    pub fn params(mut self, params: &impl QueryParams) -> Self {
        self.query.extend(
            params
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Encode`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, HttpError> {
        let value = serde_json::to_value(body).map_err(|e| HttpError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach an already-built JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub const fn long_running(mut self) -> Self {
        self.timeout = TimeoutClass::Long;
        self
    }

    /// Percent-encoded query string without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full URL against `base_url` (trailing slash tolerated).
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        if self.query.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{path}?{}", self.query_string())
        }
    }
}
