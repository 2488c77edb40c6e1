//! Chat message and citation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed assistant text appended when generation fails; keeps the
/// conversation flowing instead of surfacing the error to the transcript
pub const GENERATION_FAILURE_PLACEHOLDER: &str =
    "I couldn't generate a response. Please try rephrasing your question.";

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A reference from a generated answer back to a supporting source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// Id of the supporting document, when it could be attributed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Short human-readable source label
    pub label: String,
}

/// One turn in the conversation; the history is append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Source labels for assistant turns; always empty for user turns
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create an assistant message with citations
    pub fn assistant(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations,
            created_at: Utc::now(),
        }
    }

    /// Create the fixed placeholder reply used when generation fails
    pub fn generation_failure() -> Self {
        Self::assistant(GENERATION_FAILURE_PLACEHOLDER, Vec::new())
    }
}

/// Which evidence source a generation call is scoped to
///
/// The two modes are mutually exclusive per call; the upstream service
/// offers no combined mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GroundingRef {
    /// Ground on a retrieval store, by store id
    Store { store_id: String },
    /// Ground on general web search results
    WebSearch,
}

impl GroundingRef {
    pub fn store(store_id: impl Into<String>) -> Self {
        Self::Store {
            store_id: store_id.into(),
        }
    }
}
