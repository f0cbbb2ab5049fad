use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use super::replay::{ReplayDecision, ReplayGuard};

/// Claims a partner backend signs into a short-lived exchange token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerClaims {
    /// Vendor identifier, also used unverified to look up the signing secret.
    pub vendor: String,
    /// Partner-side user identity (opaque id or email).
    pub external_user_id: String,
    /// Single-use token identifier.
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum PartnerTokenError {
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token payload")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Token already used")]
    Replay,
}

/// Read the `vendor` claim without checking the signature, so the caller can
/// look up which secret to verify against. Nothing from this peek is trusted
/// beyond that lookup.
#[must_use]
pub fn peek_vendor(token: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct VendorOnly {
        vendor: String,
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<VendorOnly>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.vendor)
        .filter(|vendor| !vendor.is_empty())
}

/// Verify a partner token against the vendor's secret and burn its `jti`.
///
/// Performs no I/O beyond the replay guard call; the caller has already
/// resolved the vendor and supplies its secret.
pub async fn verify(
    token: &str,
    partner_secret: &str,
    replay_guard: &dyn ReplayGuard,
    replay_ttl_floor: Duration,
) -> Result<PartnerClaims, PartnerTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let claims = decode::<PartnerClaims>(
        token,
        &DecodingKey::from_secret(partner_secret.as_bytes()),
        &validation,
    )
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => PartnerTokenError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => PartnerTokenError::Expired,
        _ => PartnerTokenError::Malformed,
    })?
    .claims;

    if claims.vendor.is_empty() || claims.external_user_id.is_empty() || claims.jti.is_empty() {
        return Err(PartnerTokenError::Malformed);
    }

    let remaining = claims.exp - chrono::Utc::now().timestamp();
    let ttl = Duration::from_secs(remaining.max(0).unsigned_abs()).max(replay_ttl_floor);

    match replay_guard.claim(&claims.jti, ttl).await {
        Ok(ReplayDecision::Accepted) => Ok(claims),
        Ok(ReplayDecision::AlreadyClaimed) => {
            warn!(
                jti_prefix = claims.jti.chars().take(8).collect::<String>(),
                vendor = %claims.vendor,
                "Partner token replay detected"
            );
            Err(PartnerTokenError::Replay)
        }
        Err(err) => {
            // Replay store down: deny rather than accept an unverifiable jti.
            error!("Replay guard unavailable, rejecting token: {err:#}");
            Err(PartnerTokenError::Replay)
        }
    }
}

/// Sign a partner token the way a partner backend would. Test suites and
/// partner integration examples use this; the platform itself never signs
/// with a partner secret.
pub fn sign(claims: &PartnerClaims, partner_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(partner_secret.as_bytes()),
    )
}
