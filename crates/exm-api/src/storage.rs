//! Direct upload to S3-compatible object storage.
//!
//! The backend hands out short-lived keys (`/storage/credentials`); the
//! bucket coordinates come from the `[storage]` config section unless the
//! backend overrides them.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use exm_config::StorageConfig;
use exm_http::{ApiClient, RequestSpec};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use serde::{Deserialize, Serialize};

use crate::{Api, ApiError};

/// Temporary vendor credentials for one upload session.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageCredentials {
    #[serde(alias = "accessKeyId")]
    pub access_key_id: String,
    #[serde(alias = "accessKeySecret", alias = "secret_access_key")]
    pub access_key_secret: String,
    #[serde(default, alias = "securityToken", alias = "session_token")]
    pub security_token: Option<String>,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("security_token", &self.security_token.as_ref().map(|_| "<redacted>"))
            .field("expiration", &self.expiration)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageCredentials {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp <= now)
    }
}

/// Where an upload landed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub url: String,
    pub size: usize,
}

#[must_use]
pub fn credentials_request() -> RequestSpec {
    RequestSpec::get("/storage/credentials")
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn credentials(client: &ApiClient) -> Result<StorageCredentials, ApiError> {
    Ok(client.execute(&credentials_request()).await?)
}

/// Reduce a file name to characters that are safe in an object key.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<prefix>/<timestamp_ms>-<sanitized filename>`.
#[must_use]
pub fn object_key(prefix: &str, filename: &str, timestamp_ms: i64) -> String {
    let name = sanitize_filename(filename);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{timestamp_ms}-{name}")
    } else {
        format!("{prefix}/{timestamp_ms}-{name}")
    }
}

/// Bucket coordinates after applying backend overrides.
#[must_use]
pub fn resolve_config(config: &StorageConfig, credentials: &StorageCredentials) -> StorageConfig {
    let pick = |over: Option<&String>, base: &String| {
        over.filter(|v| !v.is_empty()).unwrap_or(base).clone()
    };
    StorageConfig {
        bucket: pick(credentials.bucket.as_ref(), &config.bucket),
        region: pick(credentials.region.as_ref(), &config.region),
        ..config.clone()
    }
}

/// Build an S3 client for the resolved coordinates.
///
/// # Errors
///
/// Returns [`ApiError::NotConfigured`] without bucket and region, or
/// [`ApiError::Storage`] if the client cannot be built.
pub fn build_store(
    config: &StorageConfig,
    credentials: &StorageCredentials,
) -> Result<impl ObjectStore, ApiError> {
    if !config.is_configured() {
        return Err(ApiError::NotConfigured("storage (bucket and region)"));
    }

    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_access_key_id(&credentials.access_key_id)
        .with_secret_access_key(&credentials.access_key_secret);
    if let Some(token) = &credentials.security_token {
        builder = builder.with_token(token);
    }
    if !config.endpoint.is_empty() {
        builder = builder
            .with_endpoint(&config.endpoint)
            .with_allow_http(true)
            .with_virtual_hosted_style_request(false);
    }
    Ok(builder.build()?)
}

/// Upload a local file under a fresh key.
///
/// # Errors
///
/// Returns [`ApiError`] if the file cannot be read, credentials cannot be
/// fetched, storage is not configured, or the upload fails.
#[tracing::instrument(skip(client, config, path), fields(path = %path.display()))]
pub async fn upload_file(
    client: &ApiClient,
    config: &StorageConfig,
    path: &Path,
) -> Result<UploadedObject, ApiError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::InvalidInput(format!("{} has no file name", path.display())))?;
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let credentials = credentials(client).await?;
    let now = Utc::now();
    if credentials.is_expired(now) {
        tracing::warn!("storage credentials already expired; upload will likely be rejected");
    }

    let resolved = resolve_config(config, &credentials);
    let store = build_store(&resolved, &credentials)?;
    let key = object_key(&resolved.key_prefix, filename, now.timestamp_millis());
    let size = bytes.len();

    store
        .put(&ObjectPath::from(key.as_str()), PutPayload::from(bytes))
        .await?;
    tracing::info!(%key, size, "uploaded");

    Ok(UploadedObject {
        url: resolved.object_url(&key),
        key,
        size,
    })
}

impl Api {
    /// # Errors
    ///
    /// Same as [`upload_file`].
    pub async fn upload(&self, path: &Path) -> Result<UploadedObject, ApiError> {
        upload_file(self.client(), self.storage_config(), path).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn creds() -> StorageCredentials {
        StorageCredentials {
            access_key_id: "AKIA".into(),
            access_key_secret: "secret".into(),
            security_token: Some("session".into()),
            expiration: None,
            bucket: None,
            region: None,
        }
    }

    #[rstest]
    #[case("notes page 1.png", "notes_page_1.png")]
    #[case("/tmp/scans/exam.pdf", "exam.pdf")]
    #[case("C:\\Users\\lin\\q.jpg", "q.jpg")]
    #[case("数学.png", "__.png")]
    #[case("..", "file")]
    fn sanitizes_names(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(raw), expected);
    }

    #[test]
    fn key_is_prefix_timestamp_name() {
        assert_eq!(
            object_key("uploads/", "page 1.png", 1_700_000_000_000),
            "uploads/1700000000000-page_1.png"
        );
        assert_eq!(object_key("", "a.png", 5), "5-a.png");
    }

    #[test]
    fn backend_coordinates_override_config() {
        let config = StorageConfig {
            bucket: "from-config".into(),
            region: "us-east-1".into(),
            ..StorageConfig::default()
        };
        let mut credentials = creds();
        credentials.bucket = Some("from-backend".into());
        credentials.region = Some(String::new());

        let resolved = resolve_config(&config, &credentials);
        assert_eq!(resolved.bucket, "from-backend");
        assert_eq!(resolved.region, "us-east-1");
        assert_eq!(resolved.key_prefix, "uploads");
    }

    #[test]
    fn unconfigured_storage_is_rejected() {
        let err = build_store(&StorageConfig::default(), &creds()).err().unwrap();
        assert!(matches!(err, ApiError::NotConfigured(_)));
    }

    #[test]
    fn credentials_accept_vendor_field_names() {
        let parsed: StorageCredentials = serde_json::from_str(
            r#"{"accessKeyId":"id","accessKeySecret":"s","securityToken":"t","expiration":"2020-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.security_token.as_deref(), Some("t"));
        assert!(parsed.is_expired(Utc::now()));
        assert!(!format!("{parsed:?}").contains("\"s\""));
    }
}
