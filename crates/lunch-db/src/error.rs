//! # Database Errors
//!
//! Error types for the SQLite adapter, and their mapping onto the
//! persistence contract.
//!
//! ## Mapping
//! ```text
//! sqlx::Error                          DbError                 PersistenceError
//! ─────────────────────────────────    ─────────────────────   ────────────────
//! Database(kind = UniqueViolation)  →  UniqueViolation      →  DuplicateKey
//! Database(kind = ForeignKey/Check) →  ConstraintViolation  →  Rejected
//! Database(other)                   →  QueryFailed          →  Query
//! RowNotFound                       →  NotFound             →  NotFound
//! PoolTimedOut / PoolClosed / Io    →  ConnectionFailed     →  Transport
//! Migrate                           →  MigrationFailed      →  Transport
//! ```

use lunch_core::PersistenceError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a reservation for a date the owner already has a row for
    #[error("Unique constraint failed: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key or CHECK constraint violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                // "UNIQUE constraint failed: reservations.owner_id, reservations.date"
                let unique = db_err.kind() == ErrorKind::UniqueViolation
                    || msg.contains("UNIQUE constraint failed");

                if unique {
                    let constraint = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    return DbError::UniqueViolation { constraint };
                }

                match db_err.kind() {
                    ErrorKind::ForeignKeyViolation | ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::ConstraintViolation(msg)
                    }
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::ConnectionFailed("Connection pool exhausted".to_string()),

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<DbError> for PersistenceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { constraint } => PersistenceError::DuplicateKey { constraint },
            DbError::NotFound { entity, id } => PersistenceError::NotFound { entity, id },
            DbError::ConstraintViolation(msg) => PersistenceError::Rejected(msg),
            DbError::ConnectionFailed(msg) | DbError::MigrationFailed(msg) => {
                PersistenceError::Transport(msg)
            }
            DbError::QueryFailed(msg) | DbError::Internal(msg) => PersistenceError::Query(msg),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
