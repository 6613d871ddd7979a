//! Icon file serving and catalog refresh

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde_json::json;
use std::io::ErrorKind;
use tracing::{error, info};

use crate::errors::{AppError, AppResult, IconError};
use crate::web::{AppState, responses::accepted};

const ICON_CACHE_CONTROL: &str = "public, max-age=86400";

/// Content type for an icon file, `image/<extension>` with `svg` mapped to
/// `svg+xml`
pub fn icon_content_type(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            if ext == "svg" {
                "image/svg+xml".to_string()
            } else {
                format!("image/{ext}")
            }
        }
        _ => "application/octet-stream".to_string(),
    }
}

/// A bare file name: no separators, no parent references
fn is_plain_file_name(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
}

pub async fn serve_icon(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !is_plain_file_name(&filename) {
        return Err(AppError::not_found("Icon", filename));
    }

    let path = state.catalog.paths().icons_dir().join(&filename);
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::not_found("Icon", filename));
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    Ok((
        [
            (header::CONTENT_TYPE, icon_content_type(&filename)),
            (header::CACHE_CONTROL, ICON_CACHE_CONTROL.to_string()),
        ],
        data,
    ))
}

/// Start a catalog refresh in the background
pub async fn refresh_icons(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let job = state.catalog.begin_refresh().map_err(|e| match e {
        IconError::RefreshInProgress => AppError::conflict("Icon catalog refresh"),
        other => AppError::internal(other.to_string()),
    })?;

    tokio::spawn(async move {
        match job.run().await {
            Ok(count) => info!("Icon catalog refresh finished with {} icons", count),
            Err(e) => error!("Icon catalog refresh failed, keeping previous index: {}", e),
        }
    });

    Ok(accepted(json!({ "status": "refresh started" })))
}
