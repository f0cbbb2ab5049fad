use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Pre-shared widget API key. Absent when the vendor only uses the
    /// partner-token integration.
    pub api_key: Option<String>,

    /// HMAC key shared with the partner backend for signing partner tokens.
    /// Absent when the vendor only uses the API-key integration.
    pub partner_secret: Option<String>,

    /// Claims allowed per user per calendar month. NULL disables the limit.
    pub monthly_claim_limit: Option<i32>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
