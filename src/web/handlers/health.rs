//! Liveness endpoint

use axum::Json;

/// JSON string `"OK"`; axum answers HEAD on the same route with headers only
pub async fn status() -> Json<&'static str> {
    Json("OK")
}
