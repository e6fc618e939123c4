//! # In-Memory Gateways
//!
//! [`MemoryPersistence`] and [`MemoryIdentity`] implement the gateway
//! contracts without any backend. They behave like the hosted services on
//! the points the engine depends on:
//!
//! - `(owner_id, date)` is unique; a batch with one taken date is rejected
//!   as a whole with `DuplicateKey`
//! - updates report matched rows
//! - session changes are pushed to every registered callback
//!
//! For tests they also record calls, inject one-shot failures, and can hold
//! a select until released, which reproduces out-of-order responses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use lunch_core::error::{AuthResult, PersistenceResult};
use lunch_core::{
    AuthError, IdentityGateway, MenuType, NewReservation, PersistenceError, PersistenceGateway,
    Profile, ProfileAttributes, Reservation, ReservationFilter, ReservationPatch,
    ReservationStatus, Session, SessionCallback, Subscription,
};
use tokio::sync::{oneshot, Notify};
use tracing::debug;
use uuid::Uuid;

const UNIQUE_CONSTRAINT: &str = "reservations_owner_date";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Persistence
// =============================================================================

/// Gateway operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SelectReservations,
    InsertReservations,
    UpdateReservations,
    UpsertProfile,
    SelectProfile,
}

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SelectReservations { owner_id: String },
    InsertReservations { rows: Vec<NewReservation> },
    UpdateReservations { filter: ReservationFilter, patch: ReservationPatch },
    UpsertProfile { owner_id: String },
    SelectProfile { owner_id: String },
}

/// A select parked until [`release`](HeldSelect::release) is called.
pub struct HeldSelect {
    started: Arc<Notify>,
    release: oneshot::Sender<()>,
}

impl HeldSelect {
    /// Resolves once the held select has been issued.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(self) {
        let _ = self.release.send(());
    }
}

struct ParkedSelect {
    started: Arc<Notify>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
struct PersistenceState {
    reservations: Vec<Reservation>,
    profiles: HashMap<String, Profile>,
    failures: HashMap<Operation, VecDeque<PersistenceError>>,
    calls: Vec<GatewayCall>,
    held_selects: VecDeque<ParkedSelect>,
}

impl PersistenceState {
    fn take_failure(&mut self, op: Operation) -> PersistenceResult<()> {
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn is_taken(&self, owner_id: &str, date: NaiveDate) -> bool {
        self.reservations
            .iter()
            .any(|r| r.owner_id == owner_id && r.date == date)
    }
}

/// In-memory reservation and profile store.
#[derive(Default)]
pub struct MemoryPersistence {
    state: Mutex<PersistenceState>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `op` fail with `err`. Queued per operation.
    pub fn fail_next(&self, op: Operation, err: PersistenceError) {
        lock(&self.state)
            .failures
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Parks the next `select_reservations` call. The rows it returns are
    /// read when the call is issued, not when it is released.
    pub fn hold_next_select(&self) -> HeldSelect {
        let started = Arc::new(Notify::new());
        let (release, parked) = oneshot::channel();
        lock(&self.state).held_selects.push_back(ParkedSelect {
            started: Arc::clone(&started),
            release: parked,
        });
        HeldSelect { started, release }
    }

    /// Writes a row directly, bypassing uniqueness checks and call recording.
    pub fn insert_row(
        &self,
        owner_id: &str,
        date: NaiveDate,
        menu_type: MenuType,
        status: ReservationStatus,
    ) -> Reservation {
        let row = Reservation {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            date,
            menu_type,
            status,
            created_at: Utc::now(),
        };
        lock(&self.state).reservations.push(row.clone());
        row
    }

    /// Rows of `owner_id`, ordered by date.
    pub fn reservations(&self, owner_id: &str) -> Vec<Reservation> {
        let mut rows: Vec<Reservation> = lock(&self.state)
            .reservations
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        rows
    }

    pub fn profile(&self, owner_id: &str) -> Option<Profile> {
        lock(&self.state).profiles.get(owner_id).cloned()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }
}

#[async_trait]
impl PersistenceGateway for MemoryPersistence {
    async fn select_reservations(&self, owner_id: &str) -> PersistenceResult<Vec<Reservation>> {
        let (rows, parked) = {
            let mut state = lock(&self.state);
            state.calls.push(GatewayCall::SelectReservations {
                owner_id: owner_id.to_string(),
            });
            state.take_failure(Operation::SelectReservations)?;

            let mut rows: Vec<Reservation> = state
                .reservations
                .iter()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.date);
            (rows, state.held_selects.pop_front())
        };

        if let Some(parked) = parked {
            parked.started.notify_one();
            let _ = parked.release.await;
        }

        Ok(rows)
    }

    async fn insert_reservations(&self, rows: &[NewReservation]) -> PersistenceResult<()> {
        let mut state = lock(&self.state);
        state.calls.push(GatewayCall::InsertReservations {
            rows: rows.to_vec(),
        });
        state.take_failure(Operation::InsertReservations)?;

        for (i, row) in rows.iter().enumerate() {
            let repeated = rows[..i]
                .iter()
                .any(|r| r.owner_id == row.owner_id && r.date == row.date);
            if repeated || state.is_taken(&row.owner_id, row.date) {
                debug!(owner_id = %row.owner_id, date = %row.date, "Duplicate key in batch");
                return Err(PersistenceError::duplicate(UNIQUE_CONSTRAINT));
            }
        }

        let created_at = Utc::now();
        state.reservations.extend(rows.iter().map(|row| Reservation {
            id: Uuid::new_v4().to_string(),
            owner_id: row.owner_id.clone(),
            date: row.date,
            menu_type: row.menu_type,
            status: row.status,
            created_at,
        }));
        Ok(())
    }

    async fn update_reservations(
        &self,
        filter: &ReservationFilter,
        patch: ReservationPatch,
    ) -> PersistenceResult<u64> {
        let mut state = lock(&self.state);
        state.calls.push(GatewayCall::UpdateReservations {
            filter: filter.clone(),
            patch,
        });
        state.take_failure(Operation::UpdateReservations)?;

        let mut affected = 0;
        for row in state.reservations.iter_mut().filter(|r| filter.matches(r)) {
            patch.apply(row);
            affected += 1;
        }
        Ok(affected)
    }

    async fn upsert_profile(&self, profile: &Profile) -> PersistenceResult<()> {
        let mut state = lock(&self.state);
        state.calls.push(GatewayCall::UpsertProfile {
            owner_id: profile.owner_id.clone(),
        });
        state.take_failure(Operation::UpsertProfile)?;
        state
            .profiles
            .insert(profile.owner_id.clone(), profile.clone());
        Ok(())
    }

    async fn select_profile(&self, owner_id: &str) -> PersistenceResult<Option<Profile>> {
        let mut state = lock(&self.state);
        state.calls.push(GatewayCall::SelectProfile {
            owner_id: owner_id.to_string(),
        });
        state.take_failure(Operation::SelectProfile)?;
        Ok(state.profiles.get(owner_id).cloned())
    }
}

// =============================================================================
// Identity
// =============================================================================

struct Account {
    user_id: String,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
struct IdentityState {
    accounts: HashMap<String, Account>,
    current: Option<Session>,
    subscribers: Vec<(u64, Arc<SessionCallback>)>,
    next_subscriber: u64,
    require_confirmation: bool,
    sign_up_attributes: HashMap<String, ProfileAttributes>,
}

/// In-memory identity provider.
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    state: Arc<Mutex<IdentityState>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// New sign-ups must confirm their email before signing in.
    pub fn require_email_confirmation(&self, required: bool) {
        lock(&self.state).require_confirmation = required;
    }

    /// Registers a confirmed account and returns its user id.
    pub fn add_account(&self, email: &str, password: &str) -> String {
        let user_id = Uuid::new_v4().to_string();
        lock(&self.state).accounts.insert(
            email.to_string(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        user_id
    }

    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = lock(&self.state).accounts.get_mut(email) {
            account.confirmed = true;
        }
    }

    /// Attributes submitted with the sign-up of `user_id`.
    pub fn sign_up_attributes(&self, user_id: &str) -> Option<ProfileAttributes> {
        lock(&self.state).sign_up_attributes.get(user_id).cloned()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Sets the current session and notifies subscribers, as a token
    /// refresh or a session restored from another tab would.
    pub fn emit(&self, session: Option<Session>) {
        lock(&self.state).current = session.clone();
        self.notify(session);
    }

    fn notify(&self, session: Option<Session>) {
        let callbacks: Vec<Arc<SessionCallback>> = lock(&self.state)
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            (**callback)(session.clone());
        }
    }

    fn open_session(&self, user_id: &str, email: &str) -> Session {
        Session {
            access_token: Some(Uuid::new_v4().to_string()),
            ..Session::new(user_id, email)
        }
    }
}

#[async_trait]
impl IdentityGateway for MemoryIdentity {
    async fn current_session(&self) -> Option<Session> {
        lock(&self.state).current.clone()
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_subscriber;
            state.next_subscriber += 1;
            state.subscribers.push((id, Arc::new(callback)));
            id
        };

        let state = Arc::clone(&self.state);
        Subscription::new(move || {
            lock(&state).subscribers.retain(|(sub, _)| *sub != id);
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let session = {
            let mut state = lock(&self.state);
            let account = match state.accounts.get(email) {
                Some(account) if account.password == password => account,
                _ => return Err(AuthError::InvalidCredentials),
            };
            if !account.confirmed {
                return Err(AuthError::EmailNotConfirmed);
            }
            let session = self.open_session(&account.user_id, email);
            state.current = Some(session.clone());
            session
        };

        debug!(user_id = %session.user_id, "Signed in");
        self.notify(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &ProfileAttributes,
    ) -> AuthResult<Session> {
        let (session, confirmed) = {
            let mut state = lock(&self.state);
            if state.accounts.contains_key(email) {
                return Err(AuthError::AlreadyRegistered);
            }

            let user_id = Uuid::new_v4().to_string();
            let confirmed = !state.require_confirmation;
            state.accounts.insert(
                email.to_string(),
                Account {
                    user_id: user_id.clone(),
                    password: password.to_string(),
                    confirmed,
                },
            );
            state
                .sign_up_attributes
                .insert(user_id.clone(), attributes.clone());

            let session = self.open_session(&user_id, email);
            if confirmed {
                state.current = Some(session.clone());
            }
            (session, confirmed)
        };

        if confirmed {
            self.notify(Some(session.clone()));
        }
        Ok(session)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let was_signed_in = lock(&self.state).current.take().is_some();
        if was_signed_in {
            self.notify(None);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_batch_with_taken_date_is_rejected_whole() {
        let gateway = MemoryPersistence::new();
        gateway.insert_row("u-1", date(10), MenuType::Normal, ReservationStatus::Cancelled);

        let err = gateway
            .insert_reservations(&[
                NewReservation::confirmed("u-1", date(11), MenuType::Normal),
                NewReservation::confirmed("u-1", date(10), MenuType::Normal),
            ])
            .await
            .unwrap_err();

        assert!(err.is_duplicate_key());
        assert_eq!(gateway.reservations("u-1").len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_one_shot() {
        let gateway = MemoryPersistence::new();
        gateway.fail_next(Operation::SelectProfile, PersistenceError::Transport("down".into()));

        assert!(gateway.select_profile("u-1").await.is_err());
        assert!(gateway.select_profile("u-1").await.is_ok());
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_identity_notifies_until_unsubscribed() {
        let identity = MemoryIdentity::new();
        identity.add_account("ana@example.com", "secret1");

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let subscription = identity.on_session_change(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        identity.sign_in("ana@example.com", "secret1").await.unwrap();
        identity.sign_out().await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        subscription.unsubscribe();
        assert_eq!(identity.subscriber_count(), 0);
        identity.sign_in("ana@example.com", "secret1").await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_identity_rejections() {
        let identity = MemoryIdentity::new();
        identity.add_account("ana@example.com", "secret1");

        assert_eq!(
            identity.sign_in("ana@example.com", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );

        let attributes = ProfileAttributes {
            full_name: "Ana".into(),
            employee_id: "EMP001".into(),
            department: None,
            role: None,
        };
        assert_eq!(
            identity
                .sign_up("ana@example.com", "secret1", &attributes)
                .await
                .unwrap_err(),
            AuthError::AlreadyRegistered
        );

        identity.require_email_confirmation(true);
        identity.sign_up("luis@example.com", "secret1", &attributes).await.unwrap();
        assert_eq!(
            identity.sign_in("luis@example.com", "secret1").await.unwrap_err(),
            AuthError::EmailNotConfirmed
        );
        identity.confirm_email("luis@example.com");
        assert!(identity.sign_in("luis@example.com", "secret1").await.is_ok());
    }
}
