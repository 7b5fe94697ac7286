use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::GoalStatus;

/// A user-defined learning objective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub status: GoalStatus,
    /// Free-text prompt handed to the AI when generating questions for this goal.
    #[serde(default)]
    pub ai_prompt: String,
    #[serde(default)]
    pub creator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `/goal/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewGoal {
    pub name: String,
    pub subject: String,
    #[serde(default = "default_goal_status")]
    pub status: GoalStatus,
    #[serde(default)]
    pub ai_prompt: String,
}

const fn default_goal_status() -> GoalStatus {
    GoalStatus::Preparing
}
