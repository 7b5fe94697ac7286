//! Upload through backend-issued credentials to an S3-compatible endpoint.

mod support;

use exm_config::ExamindConfig;
use exm_api::Api;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{ok, signed_in_store};

#[tokio::test]
async fn uploads_under_prefixed_timestamped_key() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/storage/credentials")
        .with_body(ok(json!({
            "access_key_id": "AKIATEST",
            "access_key_secret": "shh",
            "security_token": "session-token"
        })))
        .expect(1)
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Regex(r"^/quiz-media/scans/\d+-page_1\.png$".into()))
        .match_header("x-amz-security-token", "session-token")
        .with_status(200)
        .with_header("ETag", "\"0123456789abcdef\"")
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("page 1.png");
    std::fs::write(&file, b"\x89PNG fake").unwrap();

    let mut config = ExamindConfig::default();
    config.api.base_url = format!("{}/api", server.url());
    config.storage.bucket = "quiz-media".into();
    config.storage.region = "us-east-1".into();
    config.storage.endpoint = server.url();
    config.storage.key_prefix = "scans".into();
    let api = Api::from_config(&config, signed_in_store()).unwrap();

    let uploaded = api.upload(&file).await.unwrap();
    assert!(uploaded.key.starts_with("scans/"));
    assert!(uploaded.key.ends_with("-page_1.png"));
    assert_eq!(uploaded.size, 9);
    assert_eq!(
        uploaded.url,
        format!("{}/quiz-media/{}", server.url(), uploaded.key)
    );
    put.assert_async().await;
}

#[tokio::test]
async fn missing_file_fails_before_any_call() {
    let server = mockito::Server::new_async().await;
    let mut config = ExamindConfig::default();
    config.api.base_url = server.url();
    let api = Api::from_config(&config, signed_in_store()).unwrap();

    let err = api
        .upload(std::path::Path::new("/definitely/not/here.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, exm_api::ApiError::Io { .. }));
}
