use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::RwLock;
use tracing::warn;

use crate::auth::{DbReplayGuard, ReplayGuard, SessionTokens};
use crate::config::Config;
use crate::constants;
use crate::db::Store;
use crate::services::{CouponService, SeaOrmCouponService, SeaOrmSessionService, SessionService};

/// Everything a request handler needs, wired once at startup. No
/// cross-request mutable state lives here; correctness under concurrency
/// comes from the store's constraints, not from anything in this struct.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub session_tokens: SessionTokens,

    pub replay_guard: Arc<dyn ReplayGuard>,

    pub session_service: Arc<dyn SessionService>,

    pub coupon_service: Arc<dyn CouponService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let secret = if config.session.secret.is_empty() {
            warn!(
                "No session secret configured; using an ephemeral one, \
                 sessions will not survive a restart"
            );
            rand::rng()
                .sample_iter(Alphanumeric)
                .take(48)
                .map(char::from)
                .collect()
        } else {
            config.session.secret.clone()
        };

        let session_tokens = SessionTokens::new(secret, config.session.ttl_minutes);

        let replay_guard: Arc<dyn ReplayGuard> = Arc::new(DbReplayGuard::new(store.conn.clone()));

        let session_service: Arc<dyn SessionService> = Arc::new(SeaOrmSessionService::new(
            store.clone(),
            Arc::clone(&replay_guard),
            session_tokens.clone(),
            Duration::from_secs(config.session.replay_ttl_floor_seconds),
        ));

        let coupon_service: Arc<dyn CouponService> = Arc::new(SeaOrmCouponService::new(
            store.clone(),
            constants::claims::ACTIVE_WINDOW_DAYS,
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            session_tokens,
            replay_guard,
            session_service,
            coupon_service,
        })
    }
}
