//! # Gateway Contracts
//!
//! The two capabilities the engine needs from the outside world. Production
//! code talks to a hosted identity provider and a relational store; tests
//! and the local tools use the in-memory and SQLite implementations.
//!
//! ```text
//! ┌──────────────────┐        ┌───────────────────────────────┐
//! │  lunch-engine    │──────► │ dyn IdentityGateway           │
//! │                  │        │   sessions, sign-in/up/out    │
//! │                  │        └───────────────────────────────┘
//! │                  │        ┌───────────────────────────────┐
//! │                  │──────► │ dyn PersistenceGateway        │
//! └──────────────────┘        │   reservations, profiles      │
//!                             └───────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::{AuthResult, PersistenceResult};
use crate::types::{
    MenuType, NewReservation, Profile, ProfileAttributes, Reservation, ReservationFilter,
    ReservationPatch, ReservationStatus, Session,
};

/// Callback invoked with the new session (or `None` after sign-out).
pub type SessionCallback = Box<dyn Fn(Option<Session>) + Send + Sync>;

/// Handle of a session-change registration.
///
/// Dropping it unsubscribes.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Subscription { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

// =============================================================================
// Identity
// =============================================================================

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn current_session(&self) -> Option<Session>;

    /// Registers `callback` for every later session change.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Creates an account. `attributes` are stored with the account metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &ProfileAttributes,
    ) -> AuthResult<Session>;

    async fn sign_out(&self) -> AuthResult<()>;
}

// =============================================================================
// Persistence
// =============================================================================

/// Reservation and profile storage.
///
/// `reservations` is unique on `(owner_id, date)`; inserting a taken date
/// fails with [`PersistenceError::DuplicateKey`](crate::PersistenceError::DuplicateKey).
/// Update operations return the number of matched rows.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// All rows of `owner_id`, ordered by date ascending.
    async fn select_reservations(&self, owner_id: &str) -> PersistenceResult<Vec<Reservation>>;

    async fn insert_reservations(&self, rows: &[NewReservation]) -> PersistenceResult<()>;

    async fn update_reservations(
        &self,
        filter: &ReservationFilter,
        patch: ReservationPatch,
    ) -> PersistenceResult<u64>;

    async fn update_reservation_status(
        &self,
        filter: &ReservationFilter,
        status: ReservationStatus,
    ) -> PersistenceResult<u64> {
        self.update_reservations(filter, ReservationPatch::status(status))
            .await
    }

    async fn update_reservation_menu(
        &self,
        filter: &ReservationFilter,
        menu_type: MenuType,
    ) -> PersistenceResult<u64> {
        self.update_reservations(filter, ReservationPatch::menu(menu_type))
            .await
    }

    async fn upsert_profile(&self, profile: &Profile) -> PersistenceResult<()>;

    async fn select_profile(&self, owner_id: &str) -> PersistenceResult<Option<Profile>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscription_releases_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_releases_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        {
            let _sub = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
