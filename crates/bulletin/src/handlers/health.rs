//! Health check endpoints.
//!
//! - `/livez` - liveness probe, no checks
//! - `/healthz` - cache occupancy

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub content_cache_entries: usize,
    pub session_cache_entries: usize,
}

/// GET /livez
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - passive cache sizes, never touches the repository.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        content_cache_entries: state.content.cache().len(),
        session_cache_entries: state.auth.resolver.cache().len(),
    })
}
