use sea_orm::entity::prelude::*;

/// One row per accepted partner-token `jti`. The primary key is the
/// atomicity mechanism: the first inserter wins, everyone else hits the
/// constraint and is treated as a replay.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "replay_markers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub jti: String,

    pub expires_at: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
