//! Chat endpoints with grounded generation and citations

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::session::SendOutcome;
use crate::types::{ChatMessage, DocumentStatus, GroundingRef};

/// Request body for one chat turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Ground on web search instead of the active document store; the two
    /// modes are mutually exclusive
    #[serde(default)]
    pub web_search: bool,
}

/// Response for one chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The appended assistant message; absent when a later request
    /// completed first and this reply was discarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    pub superseded: bool,
    /// Active documents in the grounded store, so the UI can warn when
    /// the store has nothing searchable yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_documents: Option<usize>,
}

/// POST /api/chat - Send one message and wait for the grounded reply
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let (grounding, active_documents) = if request.web_search {
        (GroundingRef::WebSearch, None)
    } else {
        let store = state
            .registry()
            .active_store()
            .ok_or_else(|| Error::invalid_argument("No active store selected"))?;
        let active = state
            .tracker()
            .documents_for(&store.id)
            .iter()
            .filter(|d| d.status == DocumentStatus::Active)
            .count();
        (GroundingRef::store(store.id), Some(active))
    };

    let outcome = state.session().send_message(&request.message, grounding).await?;

    let (message, superseded) = match outcome {
        SendOutcome::Replied(message) => (Some(message), false),
        SendOutcome::Superseded => (None, true),
    };

    Ok(Json(ChatResponse {
        message,
        superseded,
        active_documents,
    }))
}

/// Response for history reads
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatMessage>,
    pub total: usize,
}

/// GET /api/chat - The ordered conversation history
pub async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let messages = state.session().history();
    Json(HistoryResponse {
        total: messages.len(),
        messages,
    })
}

/// DELETE /api/chat - Clear the conversation; documents are untouched
pub async fn clear_history(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.session().clear_history();
    Json(serde_json::json!({ "cleared": true }))
}
