#![allow(dead_code)]

use std::sync::Arc;

use exm_auth::{CredentialStore, MemoryStore, SessionCredentials};
use exm_config::ExamindConfig;
use exm_api::Api;
use serde_json::{Value, json};

pub const STAMP: &str = "2025-03-01T08:00:00Z";

pub fn signed_in_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_credentials(SessionCredentials::new(
        "tok-1",
        Some("u-1".into()),
    )))
}

pub fn api_for(server: &mockito::Server, store: Arc<dyn CredentialStore>) -> Api {
    let mut config = ExamindConfig::default();
    config.api.base_url = server.url();
    Api::from_config(&config, store).unwrap()
}

pub fn ok(data: Value) -> String {
    json!({ "code": 0, "msg": "ok", "data": data }).to_string()
}

pub fn goal_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "subject": "math",
        "status": "doing",
        "created_at": STAMP,
        "updated_at": STAMP
    })
}

pub fn exam_json(id: &str, goal_id: &str, question_ids: &[&str]) -> Value {
    json!({
        "id": id,
        "goal_id": goal_id,
        "question_ids": question_ids,
        "status": "pending",
        "start_time": STAMP,
        "planned_duration": 45,
        "created_at": STAMP,
        "updated_at": STAMP
    })
}

pub fn question_json(id: &str) -> Value {
    json!({
        "id": id,
        "subject": "math",
        "type": "qa",
        "title": format!("Question {id}"),
        "created_at": STAMP,
        "updated_at": STAMP
    })
}
