use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{coupons, users, vendors};

pub mod migrator;
pub mod repositories;

pub use repositories::coupon::ClaimAttempt;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory sqlite gets its own
        // database, so the pool must stay at one connection there.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn vendor_repo(&self) -> repositories::vendor::VendorRepository {
        repositories::vendor::VendorRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn coupon_repo(&self) -> repositories::coupon::CouponRepository {
        repositories::coupon::CouponRepository::new(self.conn.clone())
    }

    // ========== Vendors ==========

    pub async fn get_vendor(&self, id: &str) -> Result<Option<vendors::Model>> {
        self.vendor_repo().get(id).await
    }

    pub async fn create_vendor(
        &self,
        id: &str,
        name: &str,
        api_key: Option<&str>,
        partner_secret: Option<&str>,
        monthly_claim_limit: Option<i32>,
    ) -> Result<vendors::Model> {
        self.vendor_repo()
            .create(id, name, api_key, partner_secret, monthly_claim_limit)
            .await
    }

    // ========== Users ==========

    pub async fn upsert_user(&self, vendor_id: &str, external_id: &str) -> Result<users::Model> {
        self.user_repo().upsert(vendor_id, external_id).await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    // ========== Coupons ==========

    pub async fn get_coupon_for_vendor(
        &self,
        coupon_id: &str,
        vendor_id: &str,
    ) -> Result<Option<coupons::Model>> {
        self.coupon_repo().get_for_vendor(coupon_id, vendor_id).await
    }

    pub async fn list_coupons_for_vendor(&self, vendor_id: &str) -> Result<Vec<coupons::Model>> {
        self.coupon_repo().list_for_vendor(vendor_id).await
    }

    pub async fn monthly_claim_count(
        &self,
        user_id: &str,
        vendor_id: &str,
        claim_month: &str,
    ) -> Result<u64> {
        self.coupon_repo()
            .monthly_claim_count(user_id, vendor_id, claim_month)
            .await
    }

    pub async fn create_coupon(
        &self,
        id: &str,
        vendor_id: &str,
        code: &str,
    ) -> Result<coupons::Model> {
        self.coupon_repo().create(id, vendor_id, code).await
    }

    pub async fn claim_coupon(
        &self,
        user_id: &str,
        vendor_id: &str,
        coupon_id: &str,
        monthly_limit: Option<i32>,
        active_window_days: i64,
    ) -> Result<ClaimAttempt> {
        self.coupon_repo()
            .claim(
                user_id,
                vendor_id,
                coupon_id,
                monthly_limit,
                active_window_days,
            )
            .await
    }
}
