pub mod coupon_service;
pub use coupon_service::{AvailableCoupons, ClaimedCoupon, CouponError, CouponService, CouponView};

pub mod coupon_service_impl;
pub use coupon_service_impl::SeaOrmCouponService;

pub mod session_service;
pub use session_service::{MintedSession, SessionError, SessionService};

pub mod session_service_impl;
pub use session_service_impl::SeaOrmSessionService;
