//! Document inventory endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inventory::{DocumentPage, ListQuery, RefreshSummary, SortBy, UploadRequest};
use crate::server::state::AppState;
use crate::types::{ChunkingConfig, Document, DocumentStatus, MetadataEntry};

/// Upload options carried in the multipart `options` field
#[derive(Debug, Default, Deserialize)]
pub struct UploadOptions {
    /// Target store; defaults to the active store
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub chunking: Option<ChunkingConfig>,
}

/// POST /api/documents - Upload one file into a store
///
/// Multipart body: an optional `options` JSON field followed by the file
/// field. The returned document is `Pending`; processing is asynchronous
/// on the service side and observed via refresh.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Document>> {
    let mut options = UploadOptions::default();
    let mut file: Option<(String, String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_argument(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "options" {
            let data = field
                .bytes()
                .await
                .map_err(|e| Error::invalid_argument(format!("Failed to read options: {}", e)))?;
            options = serde_json::from_slice(&data)?;
            continue;
        }

        let filename = field.file_name().unwrap_or("untitled").to_string();
        let mime_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_argument(format!("Failed to read file: {}", e)))?;
        file = Some((filename, mime_type, data));
    }

    let (filename, mime_type, data) =
        file.ok_or_else(|| Error::invalid_argument("Multipart body contained no file"))?;

    let store_id = super::resolve_store_id(&state, options.store_id)?;
    let display_name = options.display_name.or(Some(filename));

    let document = state
        .tracker()
        .upload(
            &store_id,
            data,
            &mime_type,
            UploadRequest {
                display_name,
                metadata: options.metadata,
                chunking: options.chunking,
            },
        )
        .await?;

    Ok(Json(document))
}

/// Query parameters for document listings
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    #[serde(default)]
    pub store_id: Option<String>,
    /// Filter by status: pending, active, failed
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    /// Case-insensitive search over display names
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub ascending: bool,
    #[serde(default)]
    pub page: usize,
}

/// GET /api/documents - Filtered, sorted page of the local snapshot
///
/// Pure local read; use the refresh endpoint to poll the service first.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsQuery>,
) -> Result<Json<DocumentPage>> {
    let store_id = super::resolve_store_id(&state, params.store_id)?;
    let page = state.tracker().list(
        &store_id,
        &ListQuery {
            status: params.status,
            search: params.search,
            sort_by: params.sort_by,
            ascending: params.ascending,
            page: params.page,
        },
    );
    Ok(Json(page))
}

/// GET /api/documents/*id - One tracked document with full metadata
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>> {
    state
        .tracker()
        .get(&document_id)
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Document {}", document_id)))
}

/// Request body for refresh
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Refresh a single document
    #[serde(default)]
    pub document_id: Option<String>,
    /// Refresh every document of this store; defaults to the active store
    #[serde(default)]
    pub store_id: Option<String>,
}

/// Response for refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RefreshSummary>,
}

/// POST /api/documents/refresh - Poll the service for processing state
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    if let Some(document_id) = request.document_id {
        let status = state.tracker().refresh_status(&document_id).await?;
        return Ok(Json(RefreshResponse {
            status: Some(status),
            summary: None,
        }));
    }

    let store_id = super::resolve_store_id(&state, request.store_id)?;
    let summary = state.tracker().refresh_all(&store_id).await;
    Ok(Json(RefreshResponse {
        status: None,
        summary: Some(summary),
    }))
}

/// Response for document deletion
#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub document_id: String,
    /// False when the id was already absent; the call still succeeds
    pub removed: bool,
}

/// DELETE /api/documents/*id - Delete a document (idempotent)
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DeleteDocumentResponse>> {
    let removed = state.tracker().delete(&document_id).await?;
    Ok(Json(DeleteDocumentResponse {
        document_id,
        removed,
    }))
}
