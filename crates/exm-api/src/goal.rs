//! `/goal/*` endpoints.

use exm_core::entities::{Goal, NewGoal};
use exm_core::paging::{GoalFilter, GoalList, Pagination};
use exm_http::{ApiClient, RequestSpec};
use exm_query::{MutationEffect, QueryKey};
use serde_json::json;

use crate::{Api, ApiError, keys, set_or_invalidate};

#[must_use]
pub fn list_request(filter: &GoalFilter, page: &Pagination) -> RequestSpec {
    RequestSpec::get("/goal/list").params(page).params(filter)
}

#[must_use]
pub fn get_request(id: &str) -> RequestSpec {
    RequestSpec::get("/goal/get").param("id", id)
}

/// # Errors
///
/// Returns [`ApiError::Http`] with [`exm_http::HttpError::Encode`] if the goal cannot be serialized.
pub fn create_request(goal: &NewGoal) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/goal/create").json(goal)?)
}

#[must_use]
pub fn delete_request(id: &str) -> RequestSpec {
    RequestSpec::post("/goal/delete").with_body(json!({ "id": id }))
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn list(
    client: &ApiClient,
    filter: &GoalFilter,
    page: &Pagination,
) -> Result<GoalList, ApiError> {
    Ok(client.execute(&list_request(filter, page)).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn get(client: &ApiClient, id: &str) -> Result<Goal, ApiError> {
    Ok(client.execute(&get_request(id)).await?)
}

/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn create(client: &ApiClient, goal: &NewGoal) -> Result<Goal, ApiError> {
    Ok(client.execute(&create_request(goal)?).await?)
}

/// Deleting a goal also removes its exams on the backend.
///
/// # Errors
///
/// Returns [`ApiError::Http`] on transport, status, or logical failure.
pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    Ok(client.execute_unit(&delete_request(id)).await?)
}

impl Api {
    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn goals(&self, filter: &GoalFilter, page: &Pagination) -> Result<GoalList, ApiError> {
        let key = keys::goals(filter, page)?;
        self.cache()
            .fetch_query(&key, || list(self.client(), filter, page))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the fetch fails or cached data cannot be decoded.
    pub async fn goal(&self, id: &str) -> Result<Goal, ApiError> {
        self.cache()
            .fetch_query(&keys::goal(id), || get(self.client(), id))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails; the cache is untouched then.
    pub async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, ApiError> {
        let created = self
            .cache()
            .mutate(
                || create(self.client(), goal),
                |created| {
                    vec![
                        set_or_invalidate(keys::goal(&created.id), created),
                        MutationEffect::invalidate(QueryKey::root(keys::GOALS)),
                    ]
                },
            )
            .await?;
        tracing::info!(goal_id = %created.id, "goal created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails; the cache is untouched then.
    pub async fn delete_goal(&self, id: &str) -> Result<(), ApiError> {
        self.cache()
            .mutate(
                || delete(self.client(), id),
                |_| {
                    vec![
                        MutationEffect::remove(keys::goal(id)),
                        MutationEffect::invalidate(QueryKey::root(keys::GOALS)),
                        MutationEffect::invalidate(QueryKey::root(keys::EXAMS)),
                    ]
                },
            )
            .await?;
        tracing::info!(goal_id = id, "goal deleted");
        Ok(())
    }
}
