//! Domain service for coupon visibility and claiming.

use serde::Serialize;
use thiserror::Error;

/// Errors and terminal conflicts from coupon operations.
///
/// The two claim conflicts render as stable machine-readable codes so the
/// widget can branch on them.
#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Vendor not found")]
    VendorNotFound,

    #[error("Coupon not found")]
    CouponNotFound,

    #[error("COUPON_ALREADY_CLAIMED")]
    CouponAlreadyClaimed,

    #[error("USER_ALREADY_CLAIMED")]
    UserAlreadyClaimed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for CouponError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// One coupon row as shown to a given user. `code` is populated only when
/// the row is that user's own active claim.
#[derive(Debug, Clone, Serialize)]
pub struct CouponView {
    pub id: String,
    pub vendor_id: String,
    pub code: Option<String>,
    pub is_claimed: bool,
    pub claimed_at: Option<String>,
    pub expiry_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailableCoupons {
    pub coupons: Vec<CouponView>,
    pub user_already_claimed: bool,
    pub has_active_claim: bool,
    pub active_claim_expiry: Option<String>,
    pub claim_month: String,
}

#[derive(Debug, Serialize)]
pub struct ClaimedCoupon {
    pub coupon_id: String,
    pub coupon_code: String,
}

/// Domain service trait for the coupon pool.
#[async_trait::async_trait]
pub trait CouponService: Send + Sync {
    /// Lists the coupon rows visible to this user, plus the monthly-claim
    /// flag that drives whether the widget offers a claim button.
    async fn available_coupons(
        &self,
        vendor_id: &str,
        user_id: &str,
    ) -> Result<AvailableCoupons, CouponError>;

    /// Attempts to claim a coupon row.
    ///
    /// # Errors
    ///
    /// [`CouponError::CouponAlreadyClaimed`] and
    /// [`CouponError::UserAlreadyClaimed`] are terminal outcomes, never
    /// retried here or below.
    async fn claim(
        &self,
        user_id: &str,
        vendor_id: &str,
        coupon_id: &str,
    ) -> Result<ClaimedCoupon, CouponError>;
}
