use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::{AvailableCouponsQuery, ClaimRequest, ClaimResponse};
use crate::auth::SessionClaims;
use crate::services::AvailableCoupons;

/// GET /available-coupons?vendor={id}
/// List the coupon pool as visible to the session's user.
pub async fn available_coupons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableCouponsQuery>,
    headers: HeaderMap,
) -> Result<Json<AvailableCoupons>, ApiError> {
    let session = require_session(&state, &headers)?;

    // The vendor in the query must be the vendor the session was minted
    // for; anything else is a cross-vendor probe, not a bad session.
    if session.vendor_id != query.vendor {
        return Err(ApiError::Forbidden("Vendor mismatch".to_string()));
    }

    let listing = state
        .coupon_service()
        .available_coupons(&session.vendor_id, &session.user_id)
        .await?;

    Ok(Json(listing))
}

/// POST /claim
/// Claim one coupon row for the session's user.
pub async fn claim_coupon(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let session = require_session(&state, &headers)?;

    if payload.coupon_id.is_empty() {
        return Err(ApiError::BadRequest("coupon_id is required".to_string()));
    }

    let claimed = state
        .coupon_service()
        .claim(&session.user_id, &session.vendor_id, &payload.coupon_id)
        .await?;

    Ok(Json(ClaimResponse {
        coupon_code: claimed.coupon_code,
    }))
}

/// Validate the Bearer session header, or fail with a uniform 401.
fn require_session(state: &AppState, headers: &HeaderMap) -> Result<SessionClaims, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    state
        .session_tokens()
        .validate_bearer(header)
        .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))
}
