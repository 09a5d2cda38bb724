//! Async database connection using sqlx
//!
//! All stores share this SQLite pool. Migrations are the SQL files in the
//! workspace `migrations/` directory, embedded with `sqlx::migrate!()`.

use std::{path::Path, str::FromStr};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;

/// Error type for async database operations
#[derive(Debug, thiserror::Error)]
pub enum AsyncDatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for async database connection
#[derive(Debug, Clone)]
pub struct AsyncDatabaseConfig {
    /// Database URL (e.g., "sqlite:krishi.db" or "sqlite::memory:")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep open
    pub min_connections: u32,
    /// Enable WAL mode so the listing never blocks call workers
    pub wal_mode: bool,
}

impl Default for AsyncDatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:krishi.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            wal_mode: true,
        }
    }
}

impl AsyncDatabaseConfig {
    /// Create an in-memory database configuration for testing
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            // every connection would otherwise get its own empty database
            max_connections: 1,
            min_connections: 1,
            wal_mode: false,
        }
    }

    /// Create a file-based database configuration
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            url: format!("sqlite:{}", path.as_ref().display()),
            ..Default::default()
        }
    }

    /// Build from the `database` config section
    ///
    /// Accepts `sqlite:` URLs and bare file paths. Other schemes are
    /// rejected.
    pub fn from_app_config(config: &DatabaseConfig) -> Result<Self, AsyncDatabaseError> {
        let url = normalize_url(&config.url)?;
        Ok(Self {
            url,
            max_connections: config.max_connections.max(1),
            ..Default::default()
        })
    }

    fn is_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

fn normalize_url(raw: &str) -> Result<String, AsyncDatabaseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AsyncDatabaseError::Config("database url is empty".to_string()));
    }
    if raw.starts_with("sqlite:") {
        return Ok(raw.to_string());
    }
    if let Some((scheme, _)) = raw.split_once("://") {
        return Err(AsyncDatabaseError::Config(format!(
            "unsupported database scheme '{scheme}', only sqlite is available"
        )));
    }
    Ok(format!("sqlite:{raw}"))
}

/// Async database connection pool
#[derive(Debug, Clone)]
pub struct AsyncDatabase {
    pool: SqlitePool,
}

impl AsyncDatabase {
    /// Create a new async database connection pool
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn new(config: &AsyncDatabaseConfig) -> Result<Self, AsyncDatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(options)
            .await?;

        if config.wal_mode && !config.is_memory() {
            sqlx::query("PRAGMA journal_mode=WAL")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous=NORMAL")
                .execute(&pool)
                .await?;
            debug!("WAL mode enabled");
        }

        sqlx::query("PRAGMA busy_timeout=5000")
            .execute(&pool)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Async database pool created"
        );

        Ok(Self { pool })
    }

    /// Create an in-memory database for testing
    pub async fn in_memory() -> Result<Self, AsyncDatabaseError> {
        Self::new(&AsyncDatabaseConfig::in_memory()).await
    }

    /// Get the underlying pool for raw queries
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending migrations
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), AsyncDatabaseError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Cheap liveness probe
    pub async fn ping(&self) -> Result<(), AsyncDatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close all connections in the pool
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_query_records() {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM query_records")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(result.0, 0);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_for_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = AsyncDatabaseConfig::file(dir.path().join("krishi.db"));
        let db = AsyncDatabase::new(&config).await.unwrap();
        db.migrate().await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(result.0.to_lowercase(), "wal");
        db.close().await;
    }

    #[test]
    fn url_normalization() {
        assert_eq!(normalize_url("sqlite://krishi.db").unwrap(), "sqlite://krishi.db");
        assert_eq!(normalize_url("data/krishi.db").unwrap(), "sqlite:data/krishi.db");
        assert!(matches!(
            normalize_url("postgres://db/krishi"),
            Err(AsyncDatabaseError::Config(_))
        ));
        assert!(normalize_url("  ").is_err());
    }

    #[test]
    fn from_app_config_keeps_pool_size() {
        let config = AsyncDatabaseConfig::from_app_config(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 3,
            run_migrations: true,
        })
        .unwrap();
        assert_eq!(config.max_connections, 3);
        assert!(config.is_memory());
    }
}
