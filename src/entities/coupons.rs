use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub vendor_id: String,

    /// Redemption code. Deliberately NOT unique: a vendor seeds a pool of
    /// rows sharing one code and each row is a single-use ticket.
    pub code: String,

    pub is_claimed: bool,

    pub claimed_by: Option<String>,

    pub claimed_at: Option<String>,

    /// Set when the coupon is claimed; the claimant can see the code until
    /// this passes.
    pub expiry_date: Option<String>,

    /// Soft-delete marker. Deleted rows are invisible to every query here;
    /// trash management itself lives in the admin surface.
    pub deleted_at: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vendors,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
