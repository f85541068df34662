use std::sync::Arc;

use staybook_core::clock::{Clock, SystemClock};

use crate::auth::service::SessionManager;
use crate::auth::store::PgCredentialStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: staybook_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session lifecycle over the Postgres credential store.
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Wire the Postgres-backed session manager on the system clock.
    pub fn new(pool: staybook_db::DbPool, config: ServerConfig) -> Self {
        Self::with_clock(pool, config, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit time source.
    pub fn with_clock(
        pool: staybook_db::DbPool,
        config: ServerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = SessionManager::new(
            Arc::new(PgCredentialStore::new(pool.clone())),
            clock,
            config.jwt.clone(),
            config.password.clone(),
        );

        Self {
            pool,
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }
}
