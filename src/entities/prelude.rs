pub use super::claim_history::Entity as ClaimHistory;
pub use super::coupons::Entity as Coupons;
pub use super::replay_markers::Entity as ReplayMarkers;
pub use super::users::Entity as Users;
pub use super::vendors::Entity as Vendors;
