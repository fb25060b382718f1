use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use api::state::AppState;

/// Liveness plus the storage backend in use.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    tracing::debug!("health_check");
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.config.storage.kind(),
    }))
}
