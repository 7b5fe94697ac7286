//! Writes invalidate the cached reads they affect.

mod support;

use exm_core::entities::QuestionUpdate;
use exm_core::paging::{ExamFilter, Pagination};
use exm_query::CacheLookup;
use exm_api::keys;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{api_for, exam_json, goal_json, ok, question_json, signed_in_store};

#[tokio::test]
async fn deleted_exam_disappears_from_goal_listing() {
    let mut server = mockito::Server::new_async().await;
    let by_goal = Matcher::AllOf(vec![
        Matcher::UrlEncoded("page".into(), "1".into()),
        Matcher::UrlEncoded("goal_id".into(), "g-1".into()),
    ]);

    let first_list = server
        .mock("GET", "/exam/list")
        .match_query(by_goal.clone())
        .with_body(ok(json!({
            "exams": [exam_json("e-1", "g-1", &["q-1"]), exam_json("e-2", "g-1", &["q-2"])],
            "count": 2
        })))
        .expect(1)
        .create_async()
        .await;
    let goal = server
        .mock("GET", "/goal/get")
        .match_query(Matcher::UrlEncoded("id".into(), "g-1".into()))
        .with_body(ok(goal_json("g-1", "Algebra")))
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("POST", "/exam/delete")
        .match_body(Matcher::Json(json!({ "id": "e-1" })))
        .with_body(ok(json!(null)))
        .expect(1)
        .create_async()
        .await;

    let api = api_for(&server, signed_in_store());
    let filter = ExamFilter::by_goal("g-1");
    let page = Pagination::default();

    let before = api.exams(&filter, &page).await.unwrap();
    assert_eq!(before.exams.len(), 2);
    api.goal("g-1").await.unwrap();
    first_list.assert_async().await;
    first_list.remove_async().await;

    let second_list = server
        .mock("GET", "/exam/list")
        .match_query(by_goal)
        .with_body(ok(json!({ "exams": [exam_json("e-2", "g-1", &["q-2"])], "count": 1 })))
        .expect(1)
        .create_async()
        .await;

    api.delete_exam("e-1").await.unwrap();
    delete.assert_async().await;

    let after = api.exams(&filter, &page).await.unwrap();
    assert!(after.exams.iter().all(|e| e.id != "e-1"));
    assert_eq!(after.count, 1);
    second_list.assert_async().await;

    // The exam was never cached, so every goal detail is marked for refetch.
    assert!(matches!(
        api.cache().lookup(&keys::goal("g-1")).await,
        CacheLookup::Stale(_)
    ));
    goal.assert_async().await;
}

#[tokio::test]
async fn question_update_overwrites_detail_and_invalidates_lists() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/question/get")
        .match_query(Matcher::UrlEncoded("id".into(), "q-1".into()))
        .with_body(ok(question_json("q-1")))
        .expect(1)
        .create_async()
        .await;
    let mut updated = question_json("q-1");
    updated["answer"] = json!("42");
    server
        .mock("POST", "/question/update")
        .match_body(Matcher::Json(json!({ "id": "q-1", "answer": "42" })))
        .with_body(ok(updated))
        .expect(1)
        .create_async()
        .await;

    let api = api_for(&server, signed_in_store());
    assert_eq!(api.question("q-1").await.unwrap().answer, None);

    let mut change = QuestionUpdate::new("q-1");
    change.answer = Some("42".into());
    api.update_question(&change).await.unwrap();

    // No second GET: the mutation wrote the fresh entry.
    assert_eq!(api.question("q-1").await.unwrap().answer.as_deref(), Some("42"));
}
