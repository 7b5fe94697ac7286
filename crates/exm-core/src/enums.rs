//! Status and kind enums for Examind entities.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! which matches the wire names the backend sends.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// GoalStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a learning goal.
///
/// ```text
/// preparing → doing → passed
///                   → suspended → doing (resumed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Preparing,
    Doing,
    Passed,
    Suspended,
}

impl GoalStatus {
    /// All variants, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Preparing, Self::Doing, Self::Passed, Self::Suspended];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Doing => "doing",
            Self::Passed => "passed",
            Self::Suspended => "suspended",
        }
    }

    /// A passed goal accepts no new exams.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExamStatus
// ---------------------------------------------------------------------------

/// Status of an exam instance.
///
/// ```text
/// pending → preparing → completed
///                     → failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    Pending,
    Preparing,
    Completed,
    Failed,
}

impl ExamStatus {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Preparing, Self::Completed, Self::Failed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed and failed exams carry a final answer record.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuestionType
// ---------------------------------------------------------------------------

/// Kind of assessment item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Multiple choice.
    Choice,
    /// Free-response question and answer.
    Qa,
    /// True/false.
    Judge,
    /// Reading comprehension over a material block.
    Reading,
    /// Summarize a material block.
    Summary,
    /// Demonstration (media-backed answer).
    Show,
}

impl QuestionType {
    pub const ALL: [Self; 6] = [
        Self::Choice,
        Self::Qa,
        Self::Judge,
        Self::Reading,
        Self::Summary,
        Self::Show,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::Qa => "qa",
            Self::Judge => "judge",
            Self::Reading => "reading",
            Self::Summary => "summary",
            Self::Show => "show",
        }
    }

    /// Whether questions of this type are expected to carry an options list.
    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Choice | Self::Judge)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MessageRole / MessageType
// ---------------------------------------------------------------------------

/// Author of a tutoring transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload kind of a transcript message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Audio,
}

impl MessageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
