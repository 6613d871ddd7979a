//! Item registration and the aggregated dashboard view

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::{Item, RegisterRequest};
use crate::web::{AppState, responses::created};

/// Register the items reported by a sidecar.
///
/// Replaces everything previously reported under the same `uuid` and echoes
/// the normalized payload back with icons resolved.
pub async fn register_applications(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(mut request) = payload.map_err(|rejection| {
        debug!("Rejected registration payload: {}", rejection.body_text());
        AppError::bad_request("invalid JSON payload")
    })?;

    if request.source_id.is_empty() {
        return Err(AppError::validation("missing uuid in payload"));
    }

    // Caller-supplied icon paths are never stored
    state.resolver.resolve_items(&mut request.items);
    state
        .registry
        .upsert(request.source_id.clone(), request.items.clone())
        .await;

    Ok(created(request))
}

/// All registered and static items, sorted by name
pub async fn list_applications(State(state): State<AppState>) -> Json<Vec<Item>> {
    Json(state.aggregator.snapshot().await)
}
