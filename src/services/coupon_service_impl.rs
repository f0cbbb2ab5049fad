//! `SeaORM` implementation of the `CouponService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::db::{ClaimAttempt, Store};
use crate::entities::coupons;
use crate::services::coupon_service::{
    AvailableCoupons, ClaimedCoupon, CouponError, CouponService, CouponView,
};

pub struct SeaOrmCouponService {
    store: Store,
    active_window_days: i64,
}

impl SeaOrmCouponService {
    #[must_use]
    pub const fn new(store: Store, active_window_days: i64) -> Self {
        Self {
            store,
            active_window_days,
        }
    }
}

/// Calendar-month bucket for claim-limit enforcement, server clock.
#[must_use]
pub fn claim_month(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Whether a claimed row still entitles its claimant to see the code:
/// not past `expiry_date`, or within the fallback window of `claimed_at`
/// for rows claimed before expiry stamping existed.
fn claim_is_active(coupon: &coupons::Model, now: DateTime<Utc>, window_days: i64) -> bool {
    if let Some(expiry) = coupon
        .expiry_date
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    {
        return now <= expiry;
    }

    coupon
        .claimed_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .is_some_and(|claimed| now <= claimed + Duration::days(window_days))
}

#[async_trait]
impl CouponService for SeaOrmCouponService {
    async fn available_coupons(
        &self,
        vendor_id: &str,
        user_id: &str,
    ) -> Result<AvailableCoupons, CouponError> {
        let vendor = self
            .store
            .get_vendor(vendor_id)
            .await?
            .ok_or(CouponError::VendorNotFound)?;

        let rows = self.store.list_coupons_for_vendor(&vendor.id).await?;

        let now = Utc::now();
        let mut coupons = Vec::new();
        let mut active_claim_expiry: Option<String> = None;

        for row in rows {
            if !row.is_claimed {
                coupons.push(CouponView {
                    id: row.id,
                    vendor_id: row.vendor_id,
                    code: None,
                    is_claimed: false,
                    claimed_at: None,
                    expiry_date: None,
                });
                continue;
            }

            let is_mine = row.claimed_by.as_deref() == Some(user_id);
            if is_mine && claim_is_active(&row, now, self.active_window_days) {
                if let Some(expiry) = row.expiry_date.clone() {
                    let later = active_claim_expiry
                        .as_deref()
                        .is_none_or(|current| expiry.as_str() > current);
                    if later {
                        active_claim_expiry = Some(expiry);
                    }
                }
                coupons.push(CouponView {
                    id: row.id,
                    vendor_id: row.vendor_id,
                    code: Some(row.code),
                    is_claimed: true,
                    claimed_at: row.claimed_at,
                    expiry_date: row.expiry_date,
                });
            }
            // Claimed by someone else, or an inactive past claim of this
            // user's: the row is gone from their view entirely.
        }

        let month = claim_month(now);
        let claims_this_month = self
            .store
            .monthly_claim_count(user_id, &vendor.id, &month)
            .await?;

        Ok(AvailableCoupons {
            has_active_claim: active_claim_expiry.is_some()
                || coupons.iter().any(|c| c.is_claimed),
            user_already_claimed: claims_this_month > 0,
            active_claim_expiry,
            claim_month: month,
            coupons,
        })
    }

    async fn claim(
        &self,
        user_id: &str,
        vendor_id: &str,
        coupon_id: &str,
    ) -> Result<ClaimedCoupon, CouponError> {
        let vendor = self
            .store
            .get_vendor(vendor_id)
            .await?
            .ok_or(CouponError::VendorNotFound)?;

        let attempt = self
            .store
            .claim_coupon(
                user_id,
                &vendor.id,
                coupon_id,
                vendor.monthly_claim_limit,
                self.active_window_days,
            )
            .await?;

        let outcome = match &attempt {
            ClaimAttempt::Claimed(_) => "claimed",
            ClaimAttempt::NotFound => "not_found",
            ClaimAttempt::CouponTaken => "coupon_taken",
            ClaimAttempt::UserLimit => "user_limit",
        };
        metrics::counter!("coupon_claims_total", "outcome" => outcome).increment(1);

        match attempt {
            ClaimAttempt::Claimed(coupon) => {
                info!(vendor = %vendor.id, user = %user_id, coupon = %coupon.id, "Coupon claimed");
                Ok(ClaimedCoupon {
                    coupon_id: coupon.id,
                    coupon_code: coupon.code,
                })
            }
            ClaimAttempt::NotFound => Err(CouponError::CouponNotFound),
            ClaimAttempt::CouponTaken => Err(CouponError::CouponAlreadyClaimed),
            ClaimAttempt::UserLimit => Err(CouponError::UserAlreadyClaimed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claimed_row(claimed_at: Option<&str>, expiry: Option<&str>) -> coupons::Model {
        coupons::Model {
            id: "c1".to_string(),
            vendor_id: "v1".to_string(),
            code: "SAVE20".to_string(),
            is_claimed: true,
            claimed_by: Some("u1".to_string()),
            claimed_at: claimed_at.map(ToString::to_string),
            expiry_date: expiry.map(ToString::to_string),
            deleted_at: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn claim_month_is_calendar_bucket() {
        let t = DateTime::parse_from_rfc3339("2026-08-04T23:59:59+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(claim_month(t), "2026-08");
    }

    #[test]
    fn future_expiry_is_active() {
        let now = Utc::now();
        let expiry = (now + Duration::days(10)).to_rfc3339();
        let row = claimed_row(None, Some(&expiry));
        assert!(claim_is_active(&row, now, 30));
    }

    #[test]
    fn past_expiry_is_inactive() {
        let now = Utc::now();
        let expiry = (now - Duration::days(1)).to_rfc3339();
        let row = claimed_row(None, Some(&expiry));
        assert!(!claim_is_active(&row, now, 30));
    }

    #[test]
    fn missing_expiry_falls_back_to_claimed_at_window() {
        let now = Utc::now();

        let recent = (now - Duration::days(5)).to_rfc3339();
        assert!(claim_is_active(&claimed_row(Some(&recent), None), now, 30));

        let old = (now - Duration::days(45)).to_rfc3339();
        assert!(!claim_is_active(&claimed_row(Some(&old), None), now, 30));
    }

    #[test]
    fn unparsable_timestamps_are_inactive() {
        let now = Utc::now();
        assert!(!claim_is_active(&claimed_row(None, None), now, 30));
        assert!(!claim_is_active(
            &claimed_row(Some("yesterday"), Some("soon")),
            now,
            30
        ));
    }
}
