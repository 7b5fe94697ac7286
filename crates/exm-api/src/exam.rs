//! `/exam/*` endpoints.

use exm_core::entities::{Exam, NewExam};
use exm_core::paging::{ExamFilter, ExamList, Pagination};
use exm_http::{ApiClient, RequestSpec};
use exm_query::{MutationEffect, QueryKey};
use serde_json::json;

use crate::{Api, ApiError, keys, set_or_invalidate};

#[must_use]
pub fn list_request(filter: &ExamFilter, page: &Pagination) -> RequestSpec {
    RequestSpec::get("/exam/list").params(page).params(filter)
}

#[must_use]
pub fn get_request(id: &str) -> RequestSpec {
    RequestSpec::get("/exam/get").param("id", id)
}

/// # Errors
///
/// Returns [`ApiError::Http`] if the exam cannot be serialized.
pub fn create_request(exam: &NewExam) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/exam/create").json(exam)?)
}

#[must_use]
pub fn delete_request(id: &str) -> RequestSpec {
    RequestSpec::post("/exam/delete").with_body(json!({ "id": id }))
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn list(
    client: &ApiClient,
    filter: &ExamFilter,
    page: &Pagination,
) -> Result<ExamList, ApiError> {
    Ok(client.execute(&list_request(filter, page)).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn get(client: &ApiClient, id: &str) -> Result<Exam, ApiError> {
    Ok(client.execute(&get_request(id)).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn create(client: &ApiClient, exam: &NewExam) -> Result<Exam, ApiError> {
    Ok(client.execute(&create_request(exam)?).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    Ok(client.execute_unit(&delete_request(id)).await?)
}

/// Effects of a write touching an exam that belongs to `goal_id`.
fn exam_written(goal_id: Option<&str>) -> Vec<MutationEffect> {
    let goal = goal_id.map_or_else(|| QueryKey::root(keys::GOAL), keys::goal);
    vec![
        MutationEffect::invalidate(QueryKey::root(keys::EXAMS)),
        MutationEffect::invalidate(goal),
    ]
}

impl Api {
    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn exams(&self, filter: &ExamFilter, page: &Pagination) -> Result<ExamList, ApiError> {
        let key = keys::exams(filter, page)?;
        self.cache()
            .fetch_query(&key, || list(self.client(), filter, page))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn exam(&self, id: &str) -> Result<Exam, ApiError> {
        self.cache()
            .fetch_query(&keys::exam(id), || get(self.client(), id))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails; the cache is untouched then.
    pub async fn create_exam(&self, exam: &NewExam) -> Result<Exam, ApiError> {
        let created = self
            .cache()
            .mutate(
                || create(self.client(), exam),
                |created| {
                    let mut effects = exam_written(Some(&created.goal_id));
                    effects.push(set_or_invalidate(keys::exam(&created.id), created));
                    effects
                },
            )
            .await?;
        tracing::info!(exam_id = %created.id, goal_id = %created.goal_id, "exam created");
        Ok(created)
    }

    /// Delete an exam. When the exam is cached its parent goal is
    /// invalidated precisely; otherwise every cached goal is.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails; the cache is untouched then.
    pub async fn delete_exam(&self, id: &str) -> Result<(), ApiError> {
        let goal_id = self
            .cache()
            .get_query_data::<Exam>(&keys::exam(id))
            .await
            .ok()
            .flatten()
            .map(|exam| exam.goal_id);

        self.cache()
            .mutate(
                || delete(self.client(), id),
                |_| {
                    let mut effects = vec![MutationEffect::remove(keys::exam(id))];
                    effects.extend(exam_written(goal_id.as_deref()));
                    effects
                },
            )
            .await?;
        tracing::info!(exam_id = id, "exam deleted");
        Ok(())
    }
}
