//! Pagination, list filters, and list page shapes.
//!
//! Filters and pagination render themselves as ordered query-string pairs
//! through [`QueryParams`]. Unset filter fields are skipped so the backend
//! sees only what the caller asked for.

use serde::{Deserialize, Serialize};

use crate::entities::{Exam, Goal, Question};
use crate::enums::{ExamStatus, GoalStatus, QuestionType};

/// Default page size used by list screens.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Something that renders as ordered `key=value` query pairs.
pub trait QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build a page request; a zero page or page size is clamped to 1.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Number of pages needed to show `count` items.
    #[must_use]
    pub fn page_count(&self, count: u64) -> u64 {
        count.div_ceil(u64::from(self.page_size))
    }
}

impl QueryParams for Pagination {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
}

impl GoalFilter {
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl QueryParams for GoalFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "name", self.name.as_deref());
        push_opt(&mut pairs, "subject", self.subject.as_deref());
        push_opt(&mut pairs, "status", self.status.map(GoalStatus::as_str));
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExamFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExamStatus>,
}

impl ExamFilter {
    #[must_use]
    pub fn by_goal(goal_id: impl Into<String>) -> Self {
        Self {
            goal_id: Some(goal_id.into()),
            ..Self::default()
        }
    }
}

impl QueryParams for ExamFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "goal_id", self.goal_id.as_deref());
        push_opt(&mut pairs, "status", self.status.map(ExamStatus::as_str));
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl QueryParams for QuestionFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "subject", self.subject.as_deref());
        push_opt(&mut pairs, "type", self.question_type.map(QuestionType::as_str));
        push_opt(&mut pairs, "title", self.title.as_deref());
        pairs
    }
}

fn push_opt(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

// ---------------------------------------------------------------------------
// List pages
// ---------------------------------------------------------------------------

/// Response of `/goal/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalList {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub count: u64,
}

/// Response of `/exam/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExamList {
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub count: u64,
}

/// Response of `/question/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionList {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn pagination_defaults_to_first_page_of_twelve() {
        let page = Pagination::default();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 12);
    }

    #[rstest]
    #[case(0, 12, 0)]
    #[case(12, 12, 1)]
    #[case(13, 12, 2)]
    #[case(25, 5, 5)]
    fn page_count_rounds_up(#[case] count: u64, #[case] size: u32, #[case] expected: u64) {
        assert_eq!(Pagination::new(1, size).page_count(count), expected);
    }

    #[test]
    fn zero_page_is_clamped() {
        assert_eq!(Pagination::new(0, 0), Pagination { page: 1, page_size: 1 });
    }

    #[test]
    fn goal_filter_skips_unset_and_empty_fields() {
        let filter = GoalFilter {
            name: Some("math".into()),
            subject: Some(String::new()),
            status: Some(GoalStatus::Doing),
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("name", "math".to_string()), ("status", "doing".to_string())]
        );
        assert!(GoalFilter::default().query_pairs().is_empty());
    }

    #[test]
    fn question_filter_uses_type_key() {
        let filter = QuestionFilter {
            question_type: Some(QuestionType::Judge),
            ..QuestionFilter::default()
        };
        assert_eq!(filter.query_pairs(), vec![("type", "judge".to_string())]);
    }
}
