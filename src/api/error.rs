use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::auth::PartnerTokenError;
use crate::services::{CouponError, SessionError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    Conflict(String),

    InternalError(String),
}

/// Flat error body; the widget branches on the `error` string for the
/// machine-readable conflict codes.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidApiKey => ApiError::Unauthorized(err.to_string()),
            SessionError::VendorNotFound => ApiError::NotFound(err.to_string()),
            SessionError::NotConfigured | SessionError::MissingIdentity => {
                ApiError::BadRequest(err.to_string())
            }
            SessionError::Token(PartnerTokenError::Replay) => {
                ApiError::Conflict("JTI_REPLAY".to_string())
            }
            SessionError::Token(token_err) => ApiError::Unauthorized(token_err.to_string()),
            SessionError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::VendorNotFound | CouponError::CouponNotFound => {
                ApiError::NotFound(err.to_string())
            }
            CouponError::CouponAlreadyClaimed | CouponError::UserAlreadyClaimed => {
                ApiError::Conflict(err.to_string())
            }
            CouponError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}
