//! Database Module
//!
//! SQLite connection pool, migrations and the per-table query modules.

pub mod audit;
pub mod snapshot;
pub mod stats;
pub mod subscriptions;
pub mod tenants;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

use crate::error::BoxError;

/// Database service owning the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database with WAL + foreign keys and apply migrations.
    ///
    /// `sqlite::memory:` gets a single long-lived connection, since every
    /// new connection would otherwise see its own empty database.
    pub async fn connect(url: &str) -> Result<Self, BoxError> {
        let in_memory = url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        tracing::info!(in_memory, "Database connection established (SQLite)");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    DbService::connect("sqlite::memory:")
        .await
        .expect("in-memory database")
        .pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_keeps_data_across_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("pdv.db").display());

        let db = DbService::connect(&url).await.unwrap();
        sqlx::query(
            "INSERT INTO tenants (id, login_key, shop_name, hashed_password, plan, status, trial_ends_at, created_at) \
             VALUES ('t1', '11999990000', 'Persistida', 'x', 'starter', 'trial', 0, 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        db.pool.close().await;

        // Migrations are idempotent on an existing file
        let db = DbService::connect(&url).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
