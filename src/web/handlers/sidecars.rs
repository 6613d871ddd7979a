//! Sidecar (source) inspection and removal

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::SourceStatus;
use crate::web::{AppState, responses::no_content};

pub async fn list_sidecars(State(state): State<AppState>) -> Json<Vec<String>> {
    let mut ids = state.registry.list_source_ids().await;
    ids.sort();
    Json(ids)
}

pub async fn get_sidecar(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> AppResult<Json<SourceStatus>> {
    let last_seen = state
        .registry
        .last_seen(&source_id)
        .await
        .ok_or_else(|| AppError::not_found("Sidecar", &source_id))?;

    Ok(Json(SourceStatus {
        source_id,
        last_seen,
    }))
}

/// Forget a sidecar and its items. Unknown ids are not an error.
pub async fn delete_sidecar(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> impl IntoResponse {
    if state.registry.delete(&source_id).await {
        info!(source_id = %source_id, "Sidecar removed");
    }
    no_content()
}
