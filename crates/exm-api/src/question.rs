//! `/question/*` endpoints.

use exm_core::entities::{NewQuestion, Question, QuestionUpdate};
use exm_core::paging::{Pagination, QuestionFilter, QuestionList};
use exm_http::{ApiClient, RequestSpec};
use exm_query::{MutationEffect, QueryKey};
use futures::future::try_join_all;

use crate::{Api, ApiError, keys, set_or_invalidate};

#[must_use]
pub fn list_request(filter: &QuestionFilter, page: &Pagination) -> RequestSpec {
    RequestSpec::get("/question/list").params(page).params(filter)
}

#[must_use]
pub fn get_request(id: &str) -> RequestSpec {
    RequestSpec::get("/question/get").param("id", id)
}

/// # Errors
///
/// Returns [`ApiError::Http`] if the update cannot be serialized.
pub fn update_request(update: &QuestionUpdate) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/question/update").json(update)?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] if a question cannot be serialized.
pub fn batch_create_request(questions: &[NewQuestion]) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/question/batch-create").json(questions)?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn list(
    client: &ApiClient,
    filter: &QuestionFilter,
    page: &Pagination,
) -> Result<QuestionList, ApiError> {
    Ok(client.execute(&list_request(filter, page)).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn get(client: &ApiClient, id: &str) -> Result<Question, ApiError> {
    Ok(client.execute(&get_request(id)).await?)
}

/// # Errors
///
/// Returns [`ApiError::InvalidInput`] for an update that changes nothing,
/// otherwise [`ApiError::Http`] on failure.
pub async fn update(client: &ApiClient, update: &QuestionUpdate) -> Result<Question, ApiError> {
    if update.is_noop() {
        return Err(ApiError::InvalidInput(format!(
            "update for question {} changes nothing",
            update.id
        )));
    }
    Ok(client.execute(&update_request(update)?).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn batch_create(
    client: &ApiClient,
    questions: &[NewQuestion],
) -> Result<Vec<Question>, ApiError> {
    if questions.is_empty() {
        return Ok(Vec::new());
    }
    Ok(client.execute(&batch_create_request(questions)?).await?)
}

impl Api {
    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn questions(
        &self,
        filter: &QuestionFilter,
        page: &Pagination,
    ) -> Result<QuestionList, ApiError> {
        let key = keys::questions(filter, page)?;
        self.cache()
            .fetch_query(&key, || list(self.client(), filter, page))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn question(&self, id: &str) -> Result<Question, ApiError> {
        self.cache()
            .fetch_query(&keys::question(id), || get(self.client(), id))
            .await
    }

    /// Fetch several questions concurrently, in the order of `ids`.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub async fn questions_by_id(&self, ids: &[String]) -> Result<Vec<Question>, ApiError> {
        try_join_all(ids.iter().map(|id| self.question(id))).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails; the cache is untouched then.
    pub async fn update_question(&self, change: &QuestionUpdate) -> Result<Question, ApiError> {
        self.cache()
            .mutate(
                || update(self.client(), change),
                |updated| {
                    vec![
                        set_or_invalidate(keys::question(&updated.id), updated),
                        MutationEffect::invalidate(QueryKey::root(keys::QUESTIONS)),
                    ]
                },
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails; the cache is untouched then.
    pub async fn batch_create_questions(
        &self,
        questions: &[NewQuestion],
    ) -> Result<Vec<Question>, ApiError> {
        let created = self
            .cache()
            .mutate(
                || batch_create(self.client(), questions),
                |_| vec![MutationEffect::invalidate(QueryKey::root(keys::QUESTIONS))],
            )
            .await?;
        tracing::info!(count = created.len(), "questions created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use exm_core::enums::QuestionType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn list_request_filters_by_type() {
        let filter = QuestionFilter {
            subject: Some("math".into()),
            question_type: Some(QuestionType::Choice),
            title: None,
        };
        let req = list_request(&filter, &Pagination::default());
        assert_eq!(
            req.query_string(),
            "page=1&page_size=12&subject=math&type=choice"
        );
    }

    #[test]
    fn batch_body_is_a_plain_array() {
        let questions = vec![NewQuestion {
            subject: "math".into(),
            question_type: QuestionType::Judge,
            title: "2 + 2 = 4".into(),
            options: Some(vec!["true".into(), "false".into()]),
            images: None,
            answer: Some("true".into()),
            material: None,
        }];
        let req = batch_create_request(&questions).unwrap();
        assert_eq!(
            req.body,
            Some(json!([{
                "subject": "math",
                "type": "judge",
                "title": "2 + 2 = 4",
                "options": ["true", "false"],
                "answer": "true"
            }]))
        );
    }
}
