//! # Error Types
//!
//! Domain-specific error types shared by every crate of the workspace.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lunch-core errors (this file)                                         │
//! │  ├── ValidationError   - Local rule or field violations (no network)   │
//! │  ├── AuthError         - Identity provider rejections                  │
//! │  └── PersistenceError  - Data store failures (incl. duplicate key)     │
//! │                                                                         │
//! │  lunch-db errors (separate crate)                                      │
//! │  └── DbError           - SQLite failures, mapped to PersistenceError   │
//! │                                                                         │
//! │  lunch-engine errors                                                   │
//! │  └── EngineError       - What the UI sees (code + message)             │
//! │                                                                         │
//! │  Flow: ValidationError / AuthError / PersistenceError → EngineError    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, date, id)
//! 3. Duplicate keys are a variant of their own, never a parsed string

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Local validation errors.
///
/// Raised before any gateway call is made; they never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email, malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The date is closer than the 48-hour notice window.
    ///
    /// ## User Workflow
    /// ```text
    /// Click Thursday (now: Wednesday 10:00)
    ///      │
    ///      ▼
    /// anchor(Thursday) - now = 26h < 48h
    ///      │
    ///      ▼
    /// WithinLockout { date: Thursday }
    ///      │
    ///      ▼
    /// UI shows: "reservations need 48 hours notice"
    /// ```
    #[error("{date} is less than 48 hours away and can no longer be booked or changed")]
    WithinLockout { date: NaiveDate },

    /// The cafeteria is closed on weekends.
    #[error("{date} falls on a weekend; the cafeteria is closed")]
    Weekend { date: NaiveDate },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Auth Error
// =============================================================================

/// Identity provider rejections.
///
/// Surfaced directly to the user; never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password pair was rejected.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Sign-up for an email that already has an account.
    #[error("User already registered")]
    AlreadyRegistered,

    /// The account exists but the email was never confirmed.
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    /// An operation needed a session and none exists.
    #[error("No active session")]
    SessionMissing,

    /// Any other provider failure (transport, rate limit, ...).
    #[error("Identity provider error: {0}")]
    Provider(String),
}

// =============================================================================
// Persistence Error
// =============================================================================

/// Data store failures.
///
/// ## Duplicate keys
/// `DuplicateKey` is the only variant the reconciliation engine tolerates:
/// a batched insert that hits the `(owner_id, date)` unique constraint is
/// expected whenever a pending date already has a (cancelled) row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Unique constraint violation.
    #[error("Duplicate key on {constraint}")]
    DuplicateKey { constraint: String },

    /// The targeted row does not exist (or is not owned by the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The store refused the mutation (policy, check constraint, ...).
    #[error("Rejected by data store: {0}")]
    Rejected(String),

    /// The store could not be reached or timed out.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The query itself failed.
    #[error("Query failed: {0}")]
    Query(String),
}

impl PersistenceError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        PersistenceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DuplicateKey error.
    pub fn duplicate(constraint: impl Into<String>) -> Self {
        PersistenceError::DuplicateKey {
            constraint: constraint.into(),
        }
    }

    /// Returns true for unique constraint violations.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, PersistenceError::DuplicateKey { .. })
    }
}

/// Convenience alias for persistence gateway results.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Convenience alias for identity gateway results.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("email");
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_rule_error_messages_name_the_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let err = ValidationError::Weekend { date };
        assert!(err.to_string().contains("2025-06-14"));
    }

    #[test]
    fn test_duplicate_key_is_distinguishable() {
        assert!(PersistenceError::duplicate("reservations_owner_date").is_duplicate_key());
        assert!(!PersistenceError::Transport("timeout".into()).is_duplicate_key());
        assert!(!PersistenceError::not_found("Reservation", "r-1").is_duplicate_key());
    }
}
