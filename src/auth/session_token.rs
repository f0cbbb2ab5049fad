use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims inside a widget session token. Signed with the platform-wide
/// session secret, never with a partner secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub vendor_id: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Mints and validates widget session tokens.
#[derive(Clone)]
pub struct SessionTokens {
    secret: String,
    ttl_minutes: i64,
}

impl SessionTokens {
    #[must_use]
    pub const fn new(secret: String, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    /// Sign a session binding `(user_id, vendor_id)`.
    pub fn mint(
        &self,
        user_id: &str,
        vendor_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = SessionClaims {
            user_id: user_id.to_string(),
            vendor_id: vendor_id.to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::minutes(self.ttl_minutes)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify a raw token. Any failure (bad signature, expiry, malformed
    /// input) comes back as `None` so HTTP handlers can answer a uniform
    /// 401 without branching on causes.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()
        .map(|data| data.claims)
    }

    /// Verify an `Authorization: Bearer <token>` header value.
    #[must_use]
    pub fn validate_bearer(&self, header: Option<&str>) -> Option<SessionClaims> {
        let token = header?.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        self.validate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> SessionTokens {
        SessionTokens::new("platform-session-secret".to_string(), 30)
    }

    #[test]
    fn mint_then_validate_round_trips_identity() {
        let sessions = tokens();
        let token = sessions.mint("u1", "v1").unwrap();

        let claims = sessions.validate(&token).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.vendor_id, "v1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = tokens().mint("u1", "v1").unwrap();
        let other = SessionTokens::new("different-secret".to_string(), 30);

        assert!(other.validate(&token).is_none());
    }

    #[test]
    fn bearer_parsing_tolerates_malformed_headers() {
        let sessions = tokens();
        let token = sessions.mint("u1", "v1").unwrap();

        assert!(sessions.validate_bearer(None).is_none());
        assert!(sessions.validate_bearer(Some("")).is_none());
        assert!(sessions.validate_bearer(Some("Bearer")).is_none());
        assert!(sessions.validate_bearer(Some("Bearer ")).is_none());
        assert!(sessions.validate_bearer(Some("Basic abc")).is_none());
        assert!(sessions.validate_bearer(Some(&token)).is_none());

        let header = format!("Bearer {token}");
        assert!(sessions.validate_bearer(Some(&header)).is_some());
    }

    #[test]
    fn expired_session_is_rejected() {
        let sessions = SessionTokens::new("platform-session-secret".to_string(), -5);
        let token = sessions.mint("u1", "v1").unwrap();

        assert!(sessions.validate(&token).is_none());
    }
}
