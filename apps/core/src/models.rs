use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Represents the completion model settings used by a guidance session.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct ModelConfig {
    /// The identifier for the model to be used (e.g., `qwen2.5:7b` or an OpenRouter id).
    #[validate(length(min = 1))]
    pub model_id: String,
    /// Controls the creativity of the model's responses. Value between 0.0 and 2.0.
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: "qwen2.5:7b".to_string(),
            temperature: 0.7,
        }
    }
}

/// One unit of the devotional corpus (a "Hidden Word").
///
/// The text is kept exactly as loaded, including any leading verse number; numbers are
/// only removed from what the completion backend sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Dense 0-based position in the corpus.
    pub id: usize,
    /// Trimmed passage text.
    pub text: String,
}

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Represents a single message within a guidance session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: Role,
    /// The text content of the message.
    pub content: String,
    /// When the message was recorded.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
