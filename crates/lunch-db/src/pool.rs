//! # Connection Pool
//!
//! [`Database`] owns the SQLite pool and hands out repositories.
//!
//! ## SQLite Settings
//! - WAL journal: readers never block the writer
//! - `synchronous = NORMAL`
//! - foreign keys on
//! - file created if missing
//!
//! ## Environment
//! [`DbConfig::with_overrides`] reads `LUNCH_DB_PATH` (database file) and
//! `LUNCH_DB_MAX_CONNECTIONS` (pool size) for the local tools.
//!
//! In-memory databases live as long as their single pooled connection, so
//! [`DbConfig::in_memory`] pins one connection with no idle or lifetime limit.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::profile::ProfileRepository;
use crate::repository::reservation::ReservationRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./lunch.db").max_connections(4);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// `None` keeps idle connections forever.
    pub idle_timeout: Option<Duration>,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Applies `LUNCH_DB_*` overrides read through `lookup`. An unparsable
    /// or zero pool size is ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("LUNCH_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(max) = lookup("LUNCH_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) if max > 0 => self.max_connections = max,
                _ => warn!(value = %max, "Ignoring LUNCH_DB_MAX_CONNECTIONS"),
            }
        }

        self
    }

    /// An isolated in-memory database (tests, demos).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!("sqlite://{}", self.database_path.display()))
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle. Cheap to clone (the pool is reference counted).
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);

        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn reservations(&self) -> ReservationRepository {
        ReservationRepository::new(self.pool.clone())
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (embedded, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(embedded, applied);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/lunch.db").max_connections(10).min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_env_overrides() {
        let config = DbConfig::new("./lunch_dev.db").with_overrides(|key| match key {
            "LUNCH_DB_PATH" => Some("/var/lib/lunch/lunch.db".to_string()),
            "LUNCH_DB_MAX_CONNECTIONS" => Some("8".to_string()),
            _ => None,
        });

        assert_eq!(config.database_path, PathBuf::from("/var/lib/lunch/lunch.db"));
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn test_bad_pool_size_override_is_ignored() {
        let config = DbConfig::new("./lunch_dev.db")
            .with_overrides(|key| (key == "LUNCH_DB_MAX_CONNECTIONS").then(|| "0".to_string()));
        assert_eq!(config.max_connections, 5);

        let config = DbConfig::new("./lunch_dev.db").with_overrides(|_| None);
        assert_eq!(config.database_path, PathBuf::from("./lunch_dev.db"));
    }
}
