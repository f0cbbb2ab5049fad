pub mod partner_token;
pub mod replay;
pub mod session_token;

pub use partner_token::{PartnerClaims, PartnerTokenError};
pub use replay::{DbReplayGuard, MemoryReplayGuard, ReplayDecision, ReplayGuard};
pub use session_token::{SessionClaims, SessionTokens};
