//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var and file manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use exm_config::ExamindConfig;

#[test]
fn loads_api_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[api]
base_url = "https://learn.example.com/api"
timeout_secs = 5
long_timeout_secs = 90
"#,
        )?;

        let config: ExamindConfig = Figment::from(Serialized::defaults(ExamindConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.api.base_url, "https://learn.example.com/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.long_timeout_secs, 90);
        assert_eq!(config.api.user_agent, "examind/0.1");
        Ok(())
    });
}

#[test]
fn loads_session_and_storage_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[session]
token_name = "exm_token"
user_id_name = "exm_uid"

[storage]
bucket = "quiz-media"
region = "ap-southeast-1"
key_prefix = "question-images"
"#,
        )?;

        let config: ExamindConfig = Figment::from(Serialized::defaults(ExamindConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.session.token_name, "exm_token");
        assert_eq!(config.session.user_id_name, "exm_uid");
        assert_eq!(config.session.keyring_service, "examind-cli");
        assert!(config.storage.is_configured());
        assert_eq!(config.storage.key_prefix, "question-images");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[query]
stale_time_secs = 30
page_size = 20
"#,
        )?;
        jail.set_env("EXAMIND_QUERY__STALE_TIME_SECS", "5");

        let config: ExamindConfig = Figment::from(Serialized::defaults(ExamindConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("EXAMIND_").split("__"))
            .extract()?;

        assert_eq!(config.query.stale_time_secs, 5);
        assert_eq!(config.query.page_size, 20);
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".examind")?;
        jail.create_file(
            ".examind/config.toml",
            r#"
[api]
base_url = "https://staging.example.com/api"
"#,
        )?;

        let config: ExamindConfig = ExamindConfig::figment().extract()?;
        assert_eq!(config.api.base_url, "https://staging.example.com/api");
        Ok(())
    });
}
