use serde::{Deserialize, Serialize};

use crate::enums::{MessageRole, MessageType};

/// One turn of an AI-tutoring transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            message_type: MessageType::Text,
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            message_type: MessageType::Text,
        }
    }
}
