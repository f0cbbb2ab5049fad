//! `SeaORM` implementation of the `SessionService` trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use tracing::info;

use crate::auth::{PartnerTokenError, ReplayGuard, SessionTokens, partner_token};
use crate::db::Store;
use crate::services::session_service::{MintedSession, SessionError, SessionService};

pub struct SeaOrmSessionService {
    store: Store,
    replay_guard: Arc<dyn ReplayGuard>,
    tokens: SessionTokens,
    replay_ttl_floor: Duration,
}

impl SeaOrmSessionService {
    #[must_use]
    pub fn new(
        store: Store,
        replay_guard: Arc<dyn ReplayGuard>,
        tokens: SessionTokens,
        replay_ttl_floor: Duration,
    ) -> Self {
        Self {
            store,
            replay_guard,
            tokens,
            replay_ttl_floor,
        }
    }

    async fn mint(&self, user_id: &str, vendor_id: &str) -> Result<MintedSession, SessionError> {
        let session_token = self
            .tokens
            .mint(user_id, vendor_id)
            .map_err(|e| SessionError::Internal(format!("Failed to sign session: {e}")))?;

        metrics::counter!("sessions_minted_total").increment(1);

        Ok(MintedSession {
            session_token,
            user_id: user_id.to_string(),
            vendor_id: vendor_id.to_string(),
        })
    }
}

#[async_trait]
impl SessionService for SeaOrmSessionService {
    async fn session_from_api_key(
        &self,
        api_key: &str,
        vendor_id: &str,
        external_user_id: Option<&str>,
        external_email: Option<&str>,
    ) -> Result<MintedSession, SessionError> {
        let vendor = self
            .store
            .get_vendor(vendor_id)
            .await?
            .ok_or(SessionError::VendorNotFound)?;

        let Some(configured_key) = vendor.api_key.as_deref() else {
            return Err(SessionError::NotConfigured);
        };

        let matches: bool = configured_key
            .as_bytes()
            .ct_eq(api_key.as_bytes())
            .into();
        if !matches {
            return Err(SessionError::InvalidApiKey);
        }

        let external_id = match (
            external_user_id.filter(|s| !s.is_empty()),
            external_email.filter(|s| !s.is_empty()),
        ) {
            (Some(id), None) => id,
            (None, Some(email)) => email,
            _ => return Err(SessionError::MissingIdentity),
        };

        let user = self.store.upsert_user(&vendor.id, external_id).await?;

        info!(vendor = %vendor.id, user = %user.id, "Widget session issued via API key");

        self.mint(&user.id, &vendor.id).await
    }

    async fn session_from_partner_token(&self, token: &str) -> Result<MintedSession, SessionError> {
        // The vendor claim is read unverified only to find which secret to
        // verify against; everything else waits for the verifier.
        let vendor_id = partner_token::peek_vendor(token).ok_or(PartnerTokenError::Malformed)?;

        let vendor = self
            .store
            .get_vendor(&vendor_id)
            .await?
            .ok_or(SessionError::VendorNotFound)?;

        let Some(partner_secret) = vendor.partner_secret.as_deref() else {
            return Err(SessionError::NotConfigured);
        };

        let claims = partner_token::verify(
            token,
            partner_secret,
            self.replay_guard.as_ref(),
            self.replay_ttl_floor,
        )
        .await?;

        let user = self
            .store
            .upsert_user(&vendor.id, &claims.external_user_id)
            .await?;

        info!(vendor = %vendor.id, user = %user.id, "Widget session issued via partner token");

        self.mint(&user.id, &vendor.id).await
    }
}
