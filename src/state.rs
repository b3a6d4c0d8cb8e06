use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::{AuthRateLimiter, AuthState, SessionManager};
use crate::config::ServerConfig;
use crate::storage::{
    JobStore, SkillStore, SqliteJobStore, SqliteSkillStore, SqliteUserStore, UserStore,
};

/// Main server state shared across all handlers
pub struct ServerState {
    pub config: ServerConfig,
    pub user_store: Arc<dyn UserStore>,
    pub skill_store: Arc<dyn SkillStore>,
    pub job_store: Arc<dyn JobStore>,
    pub auth_state: Arc<AuthState>,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        user_store: Arc<dyn UserStore>,
        skill_store: Arc<dyn SkillStore>,
        job_store: Arc<dyn JobStore>,
    ) -> Self {
        let session_manager = SessionManager::new(config.session_timeout_seconds);
        let rate_limiter =
            AuthRateLimiter::new(config.auth_max_failed_attempts, config.auth_window_seconds);

        Self {
            auth_state: Arc::new(AuthState::new(session_manager, rate_limiter)),
            config,
            user_store,
            skill_store,
            job_store,
            start_time: Instant::now(),
        }
    }

    /// State backed by the SQLite stores sharing `pool`
    pub fn with_sqlite(config: ServerConfig, pool: SqlitePool) -> Self {
        Self::new(
            config,
            Arc::new(SqliteUserStore::new(pool.clone())),
            Arc::new(SqliteSkillStore::new(pool.clone())),
            Arc::new(SqliteJobStore::new(pool)),
        )
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
