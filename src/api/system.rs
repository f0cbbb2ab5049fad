use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::HealthResponse;

/// GET /healthz
/// Liveness plus a store round-trip; load balancers key off this.
pub async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    state
        .store()
        .ping()
        .await
        .map_err(|e| ApiError::InternalError(format!("Store unreachable: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}
