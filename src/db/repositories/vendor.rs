use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::vendors;

pub struct VendorRepository {
    conn: DatabaseConnection,
}

impl VendorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: &str) -> Result<Option<vendors::Model>> {
        vendors::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query vendor by id")
    }

    /// Insert a vendor row. Admin CRUD lives elsewhere; this backs seeding
    /// and tests.
    pub async fn create(
        &self,
        id: &str,
        name: &str,
        api_key: Option<&str>,
        partner_secret: Option<&str>,
        monthly_claim_limit: Option<i32>,
    ) -> Result<vendors::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let vendor = vendors::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            api_key: Set(api_key.map(ToString::to_string)),
            partner_secret: Set(partner_secret.map(ToString::to_string)),
            monthly_claim_limit: Set(monthly_claim_limit),
            created_at: Set(now),
        };

        vendor
            .insert(&self.conn)
            .await
            .context("Failed to insert vendor")
    }
}
