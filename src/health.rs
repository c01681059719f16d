use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Configured relay ids, in the order they are tried.
    pub relays: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Without relays every extraction degrades.
    let status = if state.relays.is_empty() {
        warn!("Health check: no relay providers configured");
        "DEGRADED"
    } else {
        debug!("Health check passed");
        "OK"
    };

    Json(HealthResponse {
        status: status.to_string(),
        relays: state.relays.to_vec(),
    })
}
