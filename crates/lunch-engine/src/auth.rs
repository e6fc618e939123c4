//! # Authentication Flows
//!
//! Sign-in and sign-up as the UI performs them: field validation first, then
//! the identity gateway, then (for new accounts) the profile row.
//!
//! ## Sign-Up
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SignUpRequest                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_sign_up ──── invalid ───► ValidationError (no gateway call)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  identity.sign_up ──── rejected ──► AuthError                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gateway.upsert_profile ── failed ─► logged, sign-up still succeeds     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Session                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Session changes caused here reach the stores through the identity
//! gateway's notifications, not through return values.

use std::sync::Arc;

use lunch_core::validation::{validate_credentials, validate_sign_up};
use lunch_core::{AuthError, IdentityGateway, PersistenceGateway, ProfileAttributes, Session};
use serde::Deserialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::config::TestUserConfig;
use crate::error::EngineResult;

/// Sign-in form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub attributes: ProfileAttributes,
}

pub struct AuthService {
    identity: Arc<dyn IdentityGateway>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityGateway>, gateway: Arc<dyn PersistenceGateway>) -> Self {
        AuthService { identity, gateway }
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> EngineResult<Session> {
        let email = validate_credentials(&credentials.email, &credentials.password)?;
        let session = self.identity.sign_in(&email, &credentials.password).await?;
        info!(user_id = %session.user_id, "User signed in");
        Ok(session)
    }

    /// Creates the account, then writes its profile row.
    pub async fn sign_up(&self, request: &SignUpRequest) -> EngineResult<Session> {
        let (email, attributes) =
            validate_sign_up(&request.email, &request.password, &request.attributes)?;

        let session = self
            .identity
            .sign_up(&email, &request.password, &attributes)
            .await?;
        info!(user_id = %session.user_id, "Account created");

        self.store_profile(&session, attributes).await;
        Ok(session)
    }

    /// Signs in the configured development account, creating it first if the
    /// provider does not know it.
    pub async fn sign_in_test_user(&self, test_user: &TestUserConfig) -> EngineResult<Session> {
        match self
            .identity
            .sign_in(&test_user.email, &test_user.password)
            .await
        {
            Ok(session) => {
                debug!(user_id = %session.user_id, "Test user signed in");
                return Ok(session);
            }
            Err(AuthError::InvalidCredentials) => {
                info!(email = %test_user.email, "Test user missing, creating it");
            }
            Err(e) => return Err(e.into()),
        }

        let attributes = test_user.attributes();
        match self
            .identity
            .sign_up(&test_user.email, &test_user.password, &attributes)
            .await
        {
            Ok(_) | Err(AuthError::AlreadyRegistered) => {}
            Err(e) => return Err(e.into()),
        }

        let session = self
            .identity
            .sign_in(&test_user.email, &test_user.password)
            .await?;
        self.store_profile(&session, attributes).await;
        Ok(session)
    }

    pub async fn sign_out(&self) -> EngineResult<()> {
        self.identity.sign_out().await?;
        info!("User signed out");
        Ok(())
    }

    async fn store_profile(&self, session: &Session, attributes: ProfileAttributes) {
        let profile = attributes.into_profile(&session.user_id, &session.email);
        if let Err(e) = self.gateway.upsert_profile(&profile).await {
            warn!(user_id = %session.user_id, error = %e, "Profile upsert failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::memory::{GatewayCall, MemoryIdentity, MemoryPersistence, Operation};
    use lunch_core::{PersistenceError, ValidationError};

    fn service() -> (MemoryIdentity, Arc<MemoryPersistence>, AuthService) {
        let identity = MemoryIdentity::new();
        let gateway = Arc::new(MemoryPersistence::new());
        let auth = AuthService::new(Arc::new(identity.clone()), gateway.clone());
        (identity, gateway, auth)
    }

    fn request(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.into(),
            password: "secret1".into(),
            attributes: ProfileAttributes {
                full_name: "  Ana Torres ".into(),
                employee_id: "EMP042".into(),
                department: Some("Cocina".into()),
                role: None,
            },
        }
    }

    #[tokio::test]
    async fn test_sign_in_validates_before_gateway() {
        let (identity, _gateway, auth) = service();
        let credentials = Credentials {
            email: "not-an-email".into(),
            password: "secret1".into(),
        };

        let err = auth.sign_in(&credentials).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(identity.current_session().await, None);
    }

    #[tokio::test]
    async fn test_sign_up_writes_profile() {
        let (_identity, gateway, auth) = service();

        let session = auth.sign_up(&request(" ana@example.com ")).await.unwrap();

        assert_eq!(session.email, "ana@example.com");
        let profile = gateway.profile(&session.user_id).unwrap();
        assert_eq!(profile.full_name, "Ana Torres");
        assert_eq!(profile.role, "employee");
    }

    #[tokio::test]
    async fn test_profile_failure_does_not_fail_sign_up() {
        let (_identity, gateway, auth) = service();
        gateway.fail_next(
            Operation::UpsertProfile,
            PersistenceError::Rejected("row level security".into()),
        );

        let session = auth.sign_up(&request("ana@example.com")).await.unwrap();
        assert!(gateway.profile(&session.user_id).is_none());
    }

    #[tokio::test]
    async fn test_test_user_is_created_once() {
        let (_identity, gateway, auth) = service();
        let test_user = TestUserConfig {
            email: "test@example.com".into(),
            password: "test123456".into(),
            full_name: "Usuario de Prueba".into(),
            employee_id: "EMP001".into(),
            department: Some("Tecnología".into()),
            role: None,
        };

        let first = auth.sign_in_test_user(&test_user).await.unwrap();
        assert!(gateway.profile(&first.user_id).is_some());

        gateway.clear_calls();
        let second = auth.sign_in_test_user(&test_user).await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert!(!gateway
            .calls()
            .iter()
            .any(|call| matches!(call, GatewayCall::UpsertProfile { .. })));
    }
}
