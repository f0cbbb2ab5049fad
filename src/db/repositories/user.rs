use anyhow::{Context, Result, anyhow};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::users;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")
    }

    /// Find-or-create the internal user for a partner-supplied identity.
    ///
    /// Insert-first rather than read-then-write: concurrent calls for the
    /// same `(vendor_id, external_id)` race on the unique index and the
    /// losers fall back to selecting the winner's row, so the mapping stays
    /// a pure function of its inputs.
    pub async fn upsert(&self, vendor_id: &str, external_id: &str) -> Result<users::Model> {
        if external_id.is_empty() {
            return Err(anyhow!("external_id must be non-empty"));
        }

        let now = chrono::Utc::now().to_rfc3339();

        let candidate = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            vendor_id: Set(vendor_id.to_string()),
            external_id: Set(external_id.to_string()),
            created_at: Set(now),
        };

        match candidate.insert(&self.conn).await {
            Ok(user) => Ok(user),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                self.get_by_external(vendor_id, external_id)
                    .await?
                    .ok_or_else(|| anyhow!("User vanished after unique-violation on upsert"))
            }
            Err(err) => Err(err).context("Failed to insert user"),
        }
    }

    async fn get_by_external(
        &self,
        vendor_id: &str,
        external_id: &str,
    ) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::VendorId.eq(vendor_id))
            .filter(users::Column::ExternalId.eq(external_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by external identity")
    }
}
