use axum::Json;
use chrono::Utc;
use ozunlu_core::domain::quote::iso_millis;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Liveness only: answers `ok` without probing storage.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", timestamp: iso_millis::format(&Utc::now()) })
}
