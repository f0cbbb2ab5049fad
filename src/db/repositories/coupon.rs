use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr, TransactionTrait,
};

use crate::entities::{claim_history, coupons};

/// Outcome of one transactional claim attempt. Conflicts are terminal and
/// surfaced to the caller as-is; nothing here retries.
#[derive(Debug)]
pub enum ClaimAttempt {
    Claimed(coupons::Model),
    NotFound,
    CouponTaken,
    UserLimit,
}

pub struct CouponRepository {
    conn: DatabaseConnection,
}

impl CouponRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_for_vendor(
        &self,
        coupon_id: &str,
        vendor_id: &str,
    ) -> Result<Option<coupons::Model>> {
        coupons::Entity::find_by_id(coupon_id)
            .filter(coupons::Column::VendorId.eq(vendor_id))
            .filter(coupons::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query coupon")
    }

    pub async fn list_for_vendor(&self, vendor_id: &str) -> Result<Vec<coupons::Model>> {
        coupons::Entity::find()
            .filter(coupons::Column::VendorId.eq(vendor_id))
            .filter(coupons::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to list coupons for vendor")
    }

    pub async fn monthly_claim_count(
        &self,
        user_id: &str,
        vendor_id: &str,
        claim_month: &str,
    ) -> Result<u64> {
        claim_history::Entity::find()
            .filter(claim_history::Column::UserId.eq(user_id))
            .filter(claim_history::Column::VendorId.eq(vendor_id))
            .filter(claim_history::Column::ClaimMonth.eq(claim_month))
            .count(&self.conn)
            .await
            .context("Failed to count monthly claims")
    }

    /// Insert an unclaimed coupon row. Backs seeding and tests; the admin
    /// surface owns coupon management.
    pub async fn create(&self, id: &str, vendor_id: &str, code: &str) -> Result<coupons::Model> {
        let now = Utc::now().to_rfc3339();

        let coupon = coupons::ActiveModel {
            id: Set(id.to_string()),
            vendor_id: Set(vendor_id.to_string()),
            code: Set(code.to_string()),
            is_claimed: Set(false),
            claimed_by: Set(None),
            claimed_at: Set(None),
            expiry_date: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
        };

        coupon
            .insert(&self.conn)
            .await
            .context("Failed to insert coupon")
    }

    /// Atomically claim one coupon row for a user.
    ///
    /// The pre-checks on `is_claimed` and the monthly count are fast paths
    /// for friendlier errors under no contention. Safety comes from the
    /// store: the conditional update arbitrates per-coupon exclusivity and
    /// the two unique indexes on `claim_history` are the final word when
    /// concurrent transactions race past the pre-checks.
    pub async fn claim(
        &self,
        user_id: &str,
        vendor_id: &str,
        coupon_id: &str,
        monthly_limit: Option<i32>,
        active_window_days: i64,
    ) -> Result<ClaimAttempt> {
        let now = Utc::now();
        let claim_month = now.format("%Y-%m").to_string();
        let claimed_at = now.to_rfc3339();
        let expiry_date = (now + Duration::days(active_window_days)).to_rfc3339();

        let txn = self.conn.begin().await?;

        let Some(coupon) = coupons::Entity::find_by_id(coupon_id)
            .filter(coupons::Column::VendorId.eq(vendor_id))
            .filter(coupons::Column::DeletedAt.is_null())
            .one(&txn)
            .await
            .context("Failed to query coupon for claim")?
        else {
            return Ok(ClaimAttempt::NotFound);
        };

        if coupon.is_claimed {
            return Ok(ClaimAttempt::CouponTaken);
        }

        let prior_claims = claim_history::Entity::find()
            .filter(claim_history::Column::UserId.eq(user_id))
            .filter(claim_history::Column::VendorId.eq(vendor_id))
            .filter(claim_history::Column::ClaimMonth.eq(claim_month.as_str()))
            .count(&txn)
            .await
            .context("Failed to count prior claims")?;

        if let Some(limit) = monthly_limit
            && prior_claims >= u64::try_from(limit).unwrap_or(0)
        {
            return Ok(ClaimAttempt::UserLimit);
        }

        let updated = coupons::Entity::update_many()
            .col_expr(coupons::Column::IsClaimed, Expr::value(true))
            .col_expr(coupons::Column::ClaimedBy, Expr::value(user_id))
            .col_expr(coupons::Column::ClaimedAt, Expr::value(claimed_at.as_str()))
            .col_expr(
                coupons::Column::ExpiryDate,
                Expr::value(expiry_date.as_str()),
            )
            .filter(coupons::Column::Id.eq(coupon_id))
            .filter(coupons::Column::IsClaimed.eq(false))
            .exec(&txn)
            .await
            .context("Failed to mark coupon claimed")?;

        if updated.rows_affected == 0 {
            return Ok(ClaimAttempt::CouponTaken);
        }

        let record = claim_history::ActiveModel {
            user_id: Set(user_id.to_string()),
            vendor_id: Set(vendor_id.to_string()),
            coupon_id: Set(coupon_id.to_string()),
            claimed_at: Set(claimed_at.clone()),
            claim_month: Set(claim_month),
            claim_slot: Set(i32::try_from(prior_claims).unwrap_or(i32::MAX)),
            ..Default::default()
        };

        if let Err(err) = record.insert(&txn).await {
            // The transaction rolls back on drop; classify which constraint
            // the race lost against.
            return match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("coupon_id") => {
                    Ok(ClaimAttempt::CouponTaken)
                }
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(ClaimAttempt::UserLimit),
                _ => Err(err).context("Failed to record claim"),
            };
        }

        txn.commit().await?;

        Ok(ClaimAttempt::Claimed(coupons::Model {
            is_claimed: true,
            claimed_by: Some(user_id.to_string()),
            claimed_at: Some(claimed_at),
            expiry_date: Some(expiry_date),
            ..coupon
        }))
    }
}
