use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::{SessionFromTokenRequest, WidgetSessionRequest};
use crate::services::MintedSession;

/// POST /session-from-token
/// Exchange a partner-signed single-use token for a widget session.
pub async fn session_from_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionFromTokenRequest>,
) -> Result<Json<MintedSession>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::Unauthorized("Invalid token payload".to_string()));
    }

    let session = state
        .session_service()
        .session_from_partner_token(&payload.token)
        .await?;

    Ok(Json(session))
}

/// POST /widget-session
/// Issue a widget session from the vendor's pre-shared API key plus a
/// partner-side user identity.
pub async fn widget_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WidgetSessionRequest>,
) -> Result<Json<MintedSession>, ApiError> {
    if payload.vendor_id.is_empty() {
        return Err(ApiError::BadRequest("vendor_id is required".to_string()));
    }

    let session = state
        .session_service()
        .session_from_api_key(
            &payload.api_key,
            &payload.vendor_id,
            payload.user_id.as_deref(),
            payload.user_email.as_deref(),
        )
        .await?;

    Ok(Json(session))
}
