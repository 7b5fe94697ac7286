//! Prefetch plans for the page routes.
//!
//! Each plan runs on its own request-scoped [`QueryClient`] and ends in a
//! dehydrated snapshot that a session cache can hydrate from.

use std::fmt;
use std::str::FromStr;

use exm_core::entities::Exam;
use exm_core::paging::{ExamFilter, GoalFilter, Pagination, QuestionFilter};
use exm_http::{ApiClient, HttpError};
use exm_query::{
    DehydratedState, PrefetchQuery, PrefetchReport, QueryClient, QueryOptions, dehydrate,
    hydrate, prefetch,
};
use serde::Serialize;

use crate::{Api, ApiError, exam, goal, keys, question, user};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Goal list plus the signed-in user.
    Goals,
    /// One goal and its exams.
    Goal,
    /// One exam, its goal, sibling exams, and every question it uses.
    Exam,
    /// Question bank.
    Questions,
}

impl Page {
    pub const ALL: [Self; 4] = [Self::Goals, Self::Goal, Self::Exam, Self::Questions];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Goals => "goals",
            Self::Goal => "goal",
            Self::Exam => "exam",
            Self::Questions => "questions",
        }
    }

    #[must_use]
    pub const fn requires_id(self) -> bool {
        matches!(self, Self::Goal | Self::Exam)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown page '{s}' (expected goals, goal, exam, questions)"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Page,
    pub id: Option<String>,
    pub pagination: Pagination,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            id: None,
            pagination: Pagination::default(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn required_id(&self) -> Result<&str, ApiError> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::InvalidInput(format!("page '{}' needs an id", self.page)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefetchedPage {
    pub page: Page,
    pub state: DehydratedState,
    pub report: PrefetchReport,
}

/// Run the plan for `request` on a fresh cache and dehydrate it.
///
/// Individual query failures are reported, not raised; the snapshot simply
/// lacks those entries. A rejected session is the exception.
///
/// # Errors
///
/// Returns [`ApiError::InvalidInput`] when the page needs an id and none was
/// given, [`ApiError::Query`] if a key cannot be built, or
/// [`HttpError::Unauthorized`] if any query got a 401.
#[tracing::instrument(skip(client, options), fields(page = %request.page))]
pub async fn prefetch_page(
    client: &ApiClient,
    options: QueryOptions,
    request: &PageRequest,
) -> Result<PrefetchedPage, ApiError> {
    let cache = QueryClient::new(options);
    let page = &request.pagination;

    let report = match request.page {
        Page::Goals => {
            let filter = GoalFilter::default();
            prefetch(
                &cache,
                vec![
                    PrefetchQuery::new(keys::goals(&filter, page)?, goal::list(client, &filter, page)),
                    PrefetchQuery::new(keys::user_info(), user::info(client)),
                ],
            )
            .await
        }
        Page::Goal => {
            let id = request.required_id()?;
            let filter = ExamFilter::by_goal(id);
            prefetch(
                &cache,
                vec![
                    PrefetchQuery::new(keys::goal(id), goal::get(client, id)),
                    PrefetchQuery::new(keys::exams(&filter, page)?, exam::list(client, &filter, page)),
                ],
            )
            .await
        }
        Page::Exam => prefetch_exam_page(client, &cache, request.required_id()?, page).await?,
        Page::Questions => {
            let filter = QuestionFilter::default();
            prefetch(
                &cache,
                vec![PrefetchQuery::new(
                    keys::questions(&filter, page)?,
                    question::list(client, &filter, page),
                )],
            )
            .await
        }
    };

    if report.is_unauthorized() {
        return Err(HttpError::Unauthorized.into());
    }
    if !report.is_complete() {
        tracing::warn!(failed = report.failed.len(), "page prefetched partially");
    }
    Ok(PrefetchedPage {
        page: request.page,
        state: dehydrate(&cache).await,
        report,
    })
}

/// The exam decides what else is needed, so it is fetched first.
async fn prefetch_exam_page(
    client: &ApiClient,
    cache: &QueryClient,
    id: &str,
    page: &Pagination,
) -> Result<PrefetchReport, ApiError> {
    let exam_key = keys::exam(id);
    let mut report = prefetch(
        cache,
        vec![PrefetchQuery::new(exam_key.clone(), exam::get(client, id))],
    )
    .await;

    let Some(exam) = cache.get_query_data::<Exam>(&exam_key).await? else {
        return Ok(report);
    };

    let siblings = ExamFilter::by_goal(&exam.goal_id);
    let mut queries = vec![
        PrefetchQuery::new(keys::goal(&exam.goal_id), goal::get(client, &exam.goal_id)),
        PrefetchQuery::new(
            keys::exams(&siblings, page)?,
            exam::list(client, &siblings, page),
        ),
    ];
    queries.extend(
        exam.question_ids
            .iter()
            .map(|qid| PrefetchQuery::new(keys::question(qid), question::get(client, qid))),
    );

    let rest = prefetch(cache, queries).await;
    report.fetched.extend(rest.fetched);
    report.failed.extend(rest.failed);
    Ok(report)
}

impl Api {
    /// # Errors
    ///
    /// Same as [`prefetch_page`].
    pub async fn prefetch_page(&self, request: &PageRequest) -> Result<PrefetchedPage, ApiError> {
        prefetch_page(self.client(), self.cache().options(), request).await
    }

    /// Merge a snapshot into the session cache. Returns the entries written.
    pub async fn hydrate(&self, state: DehydratedState) -> usize {
        hydrate(self.cache(), state).await
    }
}
