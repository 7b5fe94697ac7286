use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Message;
use crate::enums::ExamStatus;

/// A scheduled or completed assessment built from a set of questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exam {
    pub id: String,
    pub goal_id: String,
    #[serde(default)]
    pub question_ids: Vec<String>,
    #[serde(default)]
    pub examinee_id: Option<String>,
    pub status: ExamStatus,
    pub start_time: DateTime<Utc>,
    /// Planned duration in minutes.
    pub planned_duration: u32,
    /// Actual duration in minutes, once the exam has been sat.
    #[serde(default)]
    pub actual_duration: Option<u32>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answer: Answer,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The examinee's submitted values and tutoring transcripts, keyed by question id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    #[serde(default)]
    pub answers: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub messages: BTreeMap<String, Vec<Message>>,
}

impl Answer {
    /// Submitted value for a question, if any.
    #[must_use]
    pub fn value_for(&self, question_id: &str) -> Option<&serde_json::Value> {
        self.answers.get(question_id)
    }

    /// Tutoring transcript for a question; empty when none was recorded.
    #[must_use]
    pub fn transcript_for(&self, question_id: &str) -> &[Message] {
        self.messages.get(question_id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.messages.is_empty()
    }
}

/// Payload for `/exam/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewExam {
    pub goal_id: String,
    pub question_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examinee_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub planned_duration: u32,
}
