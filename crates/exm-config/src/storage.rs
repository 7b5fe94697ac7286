//! Object storage configuration.
//!
//! Only the bucket coordinates live here. Access keys are short-lived and are
//! issued by the backend per upload (`/storage/credentials`).

use serde::{Deserialize, Serialize};

fn default_key_prefix() -> String {
    String::from("uploads")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,

    /// Bucket region (e.g. `us-east-1`).
    #[serde(default)]
    pub region: String,

    /// Custom S3-compatible endpoint URL. Empty means the vendor default for `region`.
    #[serde(default)]
    pub endpoint: String,

    /// Fixed namespace every object key starts with.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl StorageConfig {
    /// Check if the storage config has the minimum required fields.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !self.bucket.is_empty() && !self.region.is_empty()
    }

    /// Public URL of an uploaded object.
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        if self.endpoint.is_empty() {
            format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket, self.region
            )
        } else {
            format!("{}/{}/{key}", self.endpoint.trim_end_matches('/'), self.bucket)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = StorageConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.key_prefix, "uploads");
    }

    #[test]
    fn configured_when_bucket_and_region_set() {
        let config = StorageConfig {
            bucket: "quiz-media".into(),
            region: "eu-west-1".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert_eq!(
            config.object_url("uploads/1-a.png"),
            "https://quiz-media.s3.eu-west-1.amazonaws.com/uploads/1-a.png"
        );
    }

    #[test]
    fn custom_endpoint_url_is_path_style() {
        let config = StorageConfig {
            bucket: "quiz-media".into(),
            region: "auto".into(),
            endpoint: "http://localhost:9000/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.object_url("uploads/1-a.png"),
            "http://localhost:9000/quiz-media/uploads/1-a.png"
        );
    }
}
