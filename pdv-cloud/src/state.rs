//! Application state for pdv-cloud

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::DbService;
use crate::error::BoxError;
use crate::util::hash_password;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT secret for session tokens
    pub jwt_secret: String,
    /// Reserved super-admin record; the secret is kept only as an argon2 hash
    pub super_admin_login: String,
    pub super_admin_password_hash: String,
    pub trial_duration_days: i64,
    /// Business clock (trial windows, due dates, paid_at)
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Open the database, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = DbService::connect(&config.database_url).await?;
        Self::from_parts(db.pool, config, Arc::new(SystemClock))
    }

    pub fn from_parts(
        pool: SqlitePool,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BoxError> {
        let super_admin_password_hash = hash_password(&config.super_admin_password)
            .map_err(|e| format!("Failed to hash super-admin secret: {e}"))?;
        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            super_admin_login: config.super_admin_login.clone(),
            super_admin_password_hash,
            trial_duration_days: config.trial_duration_days,
            clock,
        })
    }

    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }
}
