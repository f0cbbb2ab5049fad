use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Vendors)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Coupons)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ClaimHistory)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ReplayMarkers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        // Identity mapping must converge: one internal user per
        // (vendor, external identity).
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_vendor_external ON users(vendor_id, external_id)",
        )
        .await?;

        // Each physical coupon row is handed out at most once.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_claim_history_coupon ON claim_history(coupon_id)",
        )
        .await?;

        // Caps claims per user per vendor per calendar month: the slot is the
        // claim ordinal within the month, so two racing inserts for the same
        // slot cannot both land.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_claim_history_month_slot ON claim_history(user_id, vendor_id, claim_month, claim_slot)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_coupons_vendor ON coupons(vendor_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_claim_history_user_month ON claim_history(user_id, vendor_id, claim_month)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReplayMarkers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClaimHistory).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Coupons).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors).to_owned())
            .await?;

        Ok(())
    }
}
