//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use geev_core::leaderboard::PageCache;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::config::LeaderboardConfig;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Read-only database pool for events and identities.
    pub db: PgPool,
    /// Leaderboard tuning (can be reloaded via SIGHUP).
    pub leaderboard: Arc<RwLock<LeaderboardConfig>>,
    /// Shared page cache; `None` when disabled by config.
    ///
    /// TTL changes require a restart; SIGHUP only refreshes the tuning
    /// values applied per request.
    pub cache: Option<Arc<PageCache>>,
}

impl AppState {
    /// Create a new AppState with the given database pool and configuration.
    pub fn new(db: PgPool, leaderboard: LeaderboardConfig) -> Self {
        let cache = match leaderboard.cache_ttl_secs {
            0 => None,
            secs => Some(Arc::new(PageCache::new(Duration::from_secs(secs)))),
        };
        Self {
            db,
            leaderboard: Arc::new(RwLock::new(leaderboard)),
            cache,
        }
    }

    /// Get a read lock on the leaderboard configuration.
    pub async fn leaderboard_config(&self) -> tokio::sync::RwLockReadGuard<'_, LeaderboardConfig> {
        self.leaderboard.read().await
    }

    /// Replace the leaderboard configuration (used during SIGHUP reload).
    pub async fn update_leaderboard_config(&self, new_config: LeaderboardConfig) {
        let mut config = self.leaderboard.write().await;
        *config = new_config;
    }
}
