//! Store management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{Store, StoreStats};

/// Response for store listings
#[derive(Debug, Serialize)]
pub struct StoreListResponse {
    pub stores: Vec<Store>,
    pub total: usize,
    /// Id of the active store, if one is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_store_id: Option<String>,
}

/// GET /api/stores - List all stores, oldest first
pub async fn list_stores(State(state): State<AppState>) -> Result<Json<StoreListResponse>> {
    let stores = state.registry().list_stores().await?;
    Ok(Json(StoreListResponse {
        total: stores.len(),
        active_store_id: state.registry().active_store().map(|s| s.id),
        stores,
    }))
}

/// Request body for store creation
#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub display_name: String,
}

/// POST /api/stores - Create a new store
///
/// The new store becomes active when no store was selected yet.
pub async fn create_store(
    State(state): State<AppState>,
    Json(request): Json<CreateStoreRequest>,
) -> Result<Json<Store>> {
    let store = state.registry().create_store(&request.display_name).await?;
    if state.registry().active_store().is_none() {
        state.registry().set_active_store(&store.id)?;
    }
    Ok(Json(store))
}

/// POST /api/stores/activate - Switch the active store (local only)
#[derive(Debug, Deserialize)]
pub struct ActivateStoreRequest {
    pub store_id: String,
}

pub async fn activate_store(
    State(state): State<AppState>,
    Json(request): Json<ActivateStoreRequest>,
) -> Result<Json<Store>> {
    state.registry().set_active_store(&request.store_id)?;
    let store = state
        .registry()
        .get(&request.store_id)
        .ok_or_else(|| crate::error::Error::not_found(format!("Store {}", request.store_id)))?;
    Ok(Json(store))
}

/// DELETE /api/stores/*id - Delete a store and its documents
///
/// Store ids are full resource names containing slashes, hence the
/// wildcard capture.
pub async fn delete_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<DeleteStoreResponse>> {
    state
        .registry()
        .delete_store(&store_id, state.tracker())
        .await?;
    Ok(Json(DeleteStoreResponse { store_id }))
}

#[derive(Debug, Serialize)]
pub struct DeleteStoreResponse {
    pub store_id: String,
}

/// POST /api/stores/stats - Aggregated statistics for one store
#[derive(Debug, Deserialize)]
pub struct StoreStatsRequest {
    /// Store id; defaults to the active store
    #[serde(default)]
    pub store_id: Option<String>,
}

pub async fn store_stats(
    State(state): State<AppState>,
    Json(request): Json<StoreStatsRequest>,
) -> Result<Json<StoreStats>> {
    let store_id = super::resolve_store_id(&state, request.store_id)?;
    let stats = state.registry().store_stats(&store_id, state.tracker())?;
    Ok(Json(stats))
}
