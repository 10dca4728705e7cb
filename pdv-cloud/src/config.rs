//! Cloud server configuration

use crate::error::BoxError;

/// Cloud server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL (e.g. `sqlite:pdv.db`, `sqlite::memory:`)
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for session tokens
    pub jwt_secret: String,
    /// Reserved super-admin login
    pub super_admin_login: String,
    /// Reserved super-admin secret
    pub super_admin_password: String,
    /// Length of the signup trial
    pub trial_duration_days: i64,
    /// In-process expiration sweep period; 0 disables it
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Secret from the environment. Development falls back to a fixed
    /// placeholder; every other environment must set a non-empty value.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let value = std::env::var(name).ok().filter(|v| !v.is_empty());
        match value {
            Some(v) => Ok(v),
            None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
            None => Err(format!("{name} must be set and non-empty ({environment})").into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:pdv.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            super_admin_login: std::env::var("SUPER_ADMIN_LOGIN")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "admin".into()),
            super_admin_password: Self::require_secret("SUPER_ADMIN_PASSWORD", &environment)?,
            trial_duration_days: std::env::var("TRIAL_DURATION_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .filter(|d| *d > 0)
                .unwrap_or(7),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            environment,
        })
    }
}

impl Default for Config {
    /// Development defaults with an in-memory database
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            super_admin_login: "admin".into(),
            super_admin_password: "dev-SUPER_ADMIN_PASSWORD-not-for-production".into(),
            trial_duration_days: 7,
            sweep_interval_secs: 0,
        }
    }
}
