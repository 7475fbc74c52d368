use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Map a raw sqlx error, translating unique-index violations into the
/// conflict the storage boundary is contracted to produce.
pub fn map_sqlx_error(err: sqlx::Error, conflict_message: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            DatabaseError::Conflict(conflict_message.to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

/// Lazily initialized process-wide connection pool
pub struct DatabaseManager {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared pool, creating it on first use from DATABASE_URL
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        if url::Url::parse(&url).is_err() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let db_config = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connect_timeout_secs))
            .connect(&url)
            .await?;

        {
            let mut slot = manager.pool.write().await;
            *slot = Some(pool.clone());
        }

        info!("Created database pool");
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Create tables and the unique indexes that back the application-level
    /// uniqueness pre-checks. Idempotent; run once at startup.
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;

        let statements = [
            r#"CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                hashed_password VARCHAR(128) NOT NULL,
                admin BOOLEAN NOT NULL DEFAULT FALSE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS rooms (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )"#,
            r#"CREATE TABLE IF NOT EXISTS desks (
                id BIGSERIAL PRIMARY KEY,
                number INTEGER NOT NULL,
                room_id BIGINT NOT NULL REFERENCES rooms(id),
                UNIQUE (number, room_id)
            )"#,
            r#"CREATE TABLE IF NOT EXISTS bookings (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id),
                desk_id BIGINT NOT NULL REFERENCES desks(id),
                date DATE NOT NULL,
                approved_status BOOLEAN NOT NULL,
                UNIQUE (desk_id, date)
            )"#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Database schema is up to date");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close_all() {
        let manager = Self::instance();
        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
