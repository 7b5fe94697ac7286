//! Page plans prefetch into a request cache and hydrate a session cache.

mod support;

use exm_api::pages::{Page, PageRequest};
use exm_api::keys;
use exm_auth::CredentialStore;
use exm_core::paging::{ExamFilter, Pagination};
use exm_query::CacheLookup;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{api_for, exam_json, goal_json, ok, question_json, signed_in_store};

#[tokio::test]
async fn exam_page_follows_the_exam_to_its_questions() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/exam/get")
        .match_query(Matcher::UrlEncoded("id".into(), "e-1".into()))
        .with_body(ok(exam_json("e-1", "g-1", &["q-1", "q-2"])))
        .create_async()
        .await;
    server
        .mock("GET", "/goal/get")
        .match_query(Matcher::UrlEncoded("id".into(), "g-1".into()))
        .with_body(ok(goal_json("g-1", "Algebra")))
        .create_async()
        .await;
    server
        .mock("GET", "/exam/list")
        .match_query(Matcher::UrlEncoded("goal_id".into(), "g-1".into()))
        .with_body(ok(json!({ "exams": [exam_json("e-1", "g-1", &["q-1", "q-2"])], "count": 1 })))
        .create_async()
        .await;
    for id in ["q-1", "q-2"] {
        server
            .mock("GET", "/question/get")
            .match_query(Matcher::UrlEncoded("id".into(), id.into()))
            .with_body(ok(question_json(id)))
            .create_async()
            .await;
    }

    let server_side = api_for(&server, signed_in_store());
    let page = server_side
        .prefetch_page(&PageRequest::new(Page::Exam).with_id("e-1"))
        .await
        .unwrap();
    assert!(page.report.is_complete());
    assert_eq!(page.state.len(), 5);
    // The request cache is separate from the session cache it was run from.
    assert!(server_side.cache().is_empty().await);

    let client_side = api_for(&server, signed_in_store());
    assert_eq!(client_side.hydrate(page.state).await, 5);
    assert!(matches!(
        client_side.cache().lookup(&keys::question("q-2")).await,
        CacheLookup::Fresh(_)
    ));
    let siblings = keys::exams(&ExamFilter::by_goal("g-1"), &Pagination::default()).unwrap();
    assert!(matches!(client_side.cache().lookup(&siblings).await, CacheLookup::Fresh(_)));
}

#[tokio::test]
async fn goal_page_degrades_when_one_query_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/goal/get")
        .match_query(Matcher::Any)
        .with_body(ok(goal_json("g-1", "Algebra")))
        .create_async()
        .await;
    server
        .mock("GET", "/exam/list")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let api = api_for(&server, signed_in_store());
    let page = api
        .prefetch_page(&PageRequest::new(Page::Goal).with_id("g-1"))
        .await
        .unwrap();

    assert_eq!(page.report.fetched, vec![keys::goal("g-1")]);
    assert_eq!(page.report.failed.len(), 1);
    assert!(page.report.failed[0].error.contains("503"));
    assert_eq!(page.state.len(), 1);
}

#[tokio::test]
async fn missing_id_is_rejected_before_any_call() {
    let server = mockito::Server::new_async().await;
    let api = api_for(&server, signed_in_store());
    let err = api
        .prefetch_page(&PageRequest::new(Page::Goal))
        .await
        .unwrap_err();
    assert!(matches!(err, exm_api::ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn rejected_session_fails_the_whole_page() {
    let mut server = mockito::Server::new_async().await;
    for path in ["/goal/list", "/user/info"] {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;
    }

    let store = signed_in_store();
    let api = api_for(&server, store.clone());
    let err = api
        .prefetch_page(&PageRequest::new(Page::Goals))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(store.token(), None);
}
