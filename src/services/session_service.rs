//! Domain service for issuing widget sessions.
//!
//! Two entry paths share one output contract: a pre-shared vendor API key,
//! or a partner-signed exchange token. Both end in the same mint step.

use serde::Serialize;
use thiserror::Error;

use crate::auth::PartnerTokenError;

/// Errors specific to session issuance. Callers branch on the variant, not
/// the message.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Vendor not found")]
    VendorNotFound,

    #[error("Vendor is not configured for this integration")]
    NotConfigured,

    #[error("Exactly one of user_id or user_email is required")]
    MissingIdentity,

    #[error(transparent)]
    Token(#[from] PartnerTokenError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A freshly minted widget session.
#[derive(Debug, Clone, Serialize)]
pub struct MintedSession {
    pub session_token: String,
    pub user_id: String,
    pub vendor_id: String,
}

/// Domain service trait for widget session issuance.
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Issues a session for a widget embedding that authenticates with the
    /// vendor's pre-shared API key.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidApiKey`] on key mismatch,
    /// [`SessionError::MissingIdentity`] unless exactly one identity field
    /// is supplied.
    async fn session_from_api_key(
        &self,
        api_key: &str,
        vendor_id: &str,
        external_user_id: Option<&str>,
        external_email: Option<&str>,
    ) -> Result<MintedSession, SessionError>;

    /// Exchanges a partner-signed single-use token for a session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Token`] carrying the verification failure, including
    /// replay detection.
    async fn session_from_partner_token(&self, token: &str) -> Result<MintedSession, SessionError>;
}
