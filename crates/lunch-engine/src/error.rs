//! # Engine Errors
//!
//! [`EngineError`] is what every engine operation returns; [`ErrorPayload`]
//! is what the UI receives.
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "2025-06-14 falls on a weekend; the cafeteria is closed"
//! }
//! ```

use lunch_core::{AuthError, PersistenceError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The operation needs a signed-in owner.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Config(format!("Failed to parse config: {}", err))
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::Config(format!("Failed to serialize config: {}", err))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Config(format!("Config file I/O failed: {}", err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// UI Payload
// =============================================================================

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    ValidationError,
    AuthError,
    Duplicate,
    NotFound,
    PersistenceError,
    NotAuthenticated,
    ConfigError,
}

/// Error as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ErrorPayload {
            code,
            message: message.into(),
        }
    }
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation(_) => ErrorCode::ValidationError,
            EngineError::Auth(_) => ErrorCode::AuthError,
            EngineError::Persistence(PersistenceError::DuplicateKey { .. }) => ErrorCode::Duplicate,
            EngineError::Persistence(PersistenceError::NotFound { .. }) => ErrorCode::NotFound,
            EngineError::Persistence(_) => ErrorCode::PersistenceError,
            EngineError::NotAuthenticated => ErrorCode::NotAuthenticated,
            EngineError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Converts to the UI payload. Store internals are logged, not shown.
    pub fn to_payload(&self) -> ErrorPayload {
        let message = match self {
            EngineError::Persistence(
                err @ (PersistenceError::Transport(_) | PersistenceError::Query(_)),
            ) => {
                tracing::error!(error = %err, "Persistence failure");
                "The reservation service is unavailable, please try again".to_string()
            }
            other => other.to_string(),
        };
        ErrorPayload::new(self.code(), message)
    }
}

impl From<EngineError> for ErrorPayload {
    fn from(err: EngineError) -> Self {
        err.to_payload()
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_codes() {
        let weekend = EngineError::from(ValidationError::Weekend {
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
        });
        assert_eq!(weekend.code(), ErrorCode::ValidationError);

        let dup = EngineError::from(PersistenceError::duplicate("reservations_owner_date"));
        assert_eq!(dup.code(), ErrorCode::Duplicate);

        let missing = EngineError::from(PersistenceError::not_found("Reservation", "r-1"));
        assert_eq!(missing.code(), ErrorCode::NotFound);

        assert_eq!(EngineError::NotAuthenticated.code(), ErrorCode::NotAuthenticated);
        assert_eq!(EngineError::from(AuthError::InvalidCredentials).code(), ErrorCode::AuthError);
    }

    #[test]
    fn test_payload_serialization() {
        let payload = EngineError::from(AuthError::InvalidCredentials).to_payload();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["code"], "AUTH_ERROR");
        assert_eq!(json["message"], "Invalid login credentials");
    }

    #[test]
    fn test_transport_message_is_generic() {
        let payload = EngineError::from(PersistenceError::Transport("connection reset by 10.0.0.4".into()))
            .to_payload();
        assert_eq!(payload.code, ErrorCode::PersistenceError);
        assert!(!payload.message.contains("10.0.0.4"));
    }
}
