//! API routes for the corpus server

pub mod chat;
pub mod documents;
pub mod stores;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Resolve an explicit store id or fall back to the active store
///
/// Store selection is session-scoped configuration passed into each call,
/// never ambient state inside the components.
pub(crate) fn resolve_store_id(state: &AppState, store_id: Option<String>) -> Result<String> {
    if let Some(id) = store_id {
        return Ok(id);
    }
    state
        .registry()
        .active_store()
        .map(|store| store.id)
        .ok_or_else(|| Error::invalid_argument("No store id given and no active store selected"))
}

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Store management
        .route("/stores", get(stores::list_stores))
        .route("/stores", post(stores::create_store))
        .route("/stores/activate", post(stores::activate_store))
        .route("/stores/stats", post(stores::store_stats))
        // Store ids are resource names with slashes, hence the wildcard
        .route("/stores/*id", delete(stores::delete_store))
        // Document inventory - with larger body limit for file uploads
        .route(
            "/documents",
            post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/documents", get(documents::list_documents))
        .route("/documents/refresh", post(documents::refresh))
        .route("/documents/*id", get(documents::get_document))
        .route("/documents/*id", delete(documents::delete_document))
        // Chat
        .route("/chat", post(chat::send_message))
        .route("/chat", get(chat::history))
        .route("/chat", delete(chat::clear_history))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "corpus-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document lifecycle and retrieval-augmented chat with source citations",
        "endpoints": {
            "GET /api/stores": "List stores (oldest first)",
            "POST /api/stores": "Create a store",
            "POST /api/stores/activate": "Switch the active store",
            "POST /api/stores/stats": "Aggregated store statistics",
            "DELETE /api/stores/*id": "Delete a store",
            "POST /api/documents": "Upload a document (multipart)",
            "GET /api/documents": "List documents (filter/sort/paginate)",
            "POST /api/documents/refresh": "Poll processing status",
            "GET /api/documents/*id": "Document details",
            "DELETE /api/documents/*id": "Delete a document (idempotent)",
            "POST /api/chat": "Send a message, get a grounded reply",
            "GET /api/chat": "Conversation history",
            "DELETE /api/chat": "Clear the conversation"
        }
    }))
}
