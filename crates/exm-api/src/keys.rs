//! Query keys for every cached read.
//!
//! Lists are keyed `[root, filter, pagination]` and details `[root, id]`, so
//! invalidating a root such as `["exams"]` reaches every page of every filter.

use exm_core::paging::{ExamFilter, GoalFilter, Pagination, QuestionFilter};
use exm_query::{QueryError, QueryKey};

pub const GOALS: &str = "goals";
pub const GOAL: &str = "goal";
pub const EXAMS: &str = "exams";
pub const EXAM: &str = "exam";
pub const QUESTIONS: &str = "questions";
pub const QUESTION: &str = "question";
pub const USER: &str = "user";

/// # Errors
///
/// Returns [`QueryError::Key`] if the filter cannot be encoded.
pub fn goals(filter: &GoalFilter, page: &Pagination) -> Result<QueryKey, QueryError> {
    QueryKey::root(GOALS).with(filter)?.with(page)
}

#[must_use]
pub fn goal(id: &str) -> QueryKey {
    QueryKey::root(GOAL).id(id)
}

/// # Errors
///
/// Returns [`QueryError::Key`] if the filter cannot be encoded.
pub fn exams(filter: &ExamFilter, page: &Pagination) -> Result<QueryKey, QueryError> {
    QueryKey::root(EXAMS).with(filter)?.with(page)
}

#[must_use]
pub fn exam(id: &str) -> QueryKey {
    QueryKey::root(EXAM).id(id)
}

/// # Errors
///
/// Returns [`QueryError::Key`] if the filter cannot be encoded.
pub fn questions(filter: &QuestionFilter, page: &Pagination) -> Result<QueryKey, QueryError> {
    QueryKey::root(QUESTIONS).with(filter)?.with(page)
}

#[must_use]
pub fn question(id: &str) -> QueryKey {
    QueryKey::root(QUESTION).id(id)
}

#[must_use]
pub fn user_info() -> QueryKey {
    QueryKey::root(USER)
}
