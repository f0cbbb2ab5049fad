use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use tokio::sync::Mutex;

use crate::entities::replay_markers;

/// What the guard decided for a given `jti`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayDecision {
    Accepted,
    AlreadyClaimed,
}

/// Atomic once-only marker over token identifiers.
///
/// Exactly one of N concurrent callers presenting the same `jti` within its
/// TTL window sees `Accepted`. An `Err` means the backing store could not
/// answer; callers must treat that as a denial, never as an acceptance.
#[async_trait]
pub trait ReplayGuard: Send + Sync {
    async fn claim(&self, jti: &str, ttl: Duration) -> Result<ReplayDecision>;
}

/// Replay guard backed by the relational store. Atomicity comes from the
/// primary key on `replay_markers.jti`: the first inserter wins.
pub struct DbReplayGuard {
    conn: DatabaseConnection,
}

impl DbReplayGuard {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ReplayGuard for DbReplayGuard {
    async fn claim(&self, jti: &str, ttl: Duration) -> Result<ReplayDecision> {
        let now = chrono::Utc::now();
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());

        // A marker whose window has passed no longer blocks its jti; purge
        // it so the insert below decides the race.
        replay_markers::Entity::delete_many()
            .filter(replay_markers::Column::Jti.eq(jti))
            .filter(replay_markers::Column::ExpiresAt.lt(now.to_rfc3339()))
            .exec(&self.conn)
            .await
            .context("Failed to purge expired replay marker")?;

        let marker = replay_markers::ActiveModel {
            jti: Set(jti.to_string()),
            expires_at: Set(expires_at.to_rfc3339()),
            created_at: Set(now.to_rfc3339()),
        };

        match marker.insert(&self.conn).await {
            Ok(_) => Ok(ReplayDecision::Accepted),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(ReplayDecision::AlreadyClaimed)
            }
            Err(err) => Err(err).context("Failed to record replay marker"),
        }
    }
}

/// In-process guard for unit tests and single-node development.
#[derive(Default)]
pub struct MemoryReplayGuard {
    seen: Mutex<HashMap<String, Instant>>,
}

impl MemoryReplayGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReplayGuard for MemoryReplayGuard {
    async fn claim(&self, jti: &str, ttl: Duration) -> Result<ReplayDecision> {
        let now = Instant::now();
        let mut seen = self.seen.lock().await;

        seen.retain(|_, deadline| *deadline > now);

        if seen.contains_key(jti) {
            return Ok(ReplayDecision::AlreadyClaimed);
        }

        seen.insert(jti.to_string(), now + ttl);
        Ok(ReplayDecision::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_claim_wins_second_is_replay() {
        let guard = MemoryReplayGuard::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(
            guard.claim("jti-1", ttl).await.unwrap(),
            ReplayDecision::Accepted
        );
        assert_eq!(
            guard.claim("jti-1", ttl).await.unwrap(),
            ReplayDecision::AlreadyClaimed
        );
        assert_eq!(
            guard.claim("jti-2", ttl).await.unwrap(),
            ReplayDecision::Accepted
        );
    }

    #[tokio::test]
    async fn expired_marker_frees_the_jti() {
        let guard = MemoryReplayGuard::new();

        assert_eq!(
            guard.claim("jti-1", Duration::from_millis(10)).await.unwrap(),
            ReplayDecision::Accepted
        );

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(
            guard.claim("jti-1", Duration::from_secs(60)).await.unwrap(),
            ReplayDecision::Accepted
        );
    }

    #[tokio::test]
    async fn concurrent_claims_accept_exactly_once() {
        use std::sync::Arc;

        let guard = Arc::new(MemoryReplayGuard::new());
        let ttl = Duration::from_secs(60);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = guard.clone();
            handles.push(tokio::spawn(
                async move { guard.claim("shared", ttl).await },
            ));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == ReplayDecision::Accepted {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
    }
}
