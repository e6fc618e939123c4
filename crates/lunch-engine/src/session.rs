//! # Session Binder
//!
//! Keeps the stores in step with the identity provider.
//!
//! ## State Machine
//! ```text
//!                  ┌──────────┐
//!                  │ Loading  │  (until the first session read)
//!                  └────┬─────┘
//!            session    │    no session
//!         ┌─────────────┴──────────────┐
//!         ▼                            ▼
//!  ┌───────────────┐  sign-out  ┌─────────────┐
//!  │ Authenticated │ ─────────► │  Anonymous  │
//!  │   (session)   │ ◄───────── │             │
//!  └───────────────┘  sign-in   └─────────────┘
//!
//!  Authenticated: bind owner, fetch reservations, load profile
//!  Anonymous:     clear mirror and pending selections, drop profile
//! ```
//!
//! Identity callbacks are synchronous, so they only enqueue the event; a
//! single task applies events in arrival order. The fetch of each
//! Authenticated event runs on its own task, with its request token taken
//! while the event is handled, so a sign-out handled before the task runs
//! still outranks it.

use std::sync::Arc;

use lunch_core::{IdentityGateway, PersistenceGateway, Profile, Session, Subscription};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::pending::PendingStore;
use crate::store::ReservationStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session().map(|s| s.user_id.as_str())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

pub struct SessionBinder {
    identity: Arc<dyn IdentityGateway>,
    gateway: Arc<dyn PersistenceGateway>,
    store: Arc<ReservationStore>,
    pending: Arc<PendingStore>,
    state: watch::Sender<SessionState>,
    profile: watch::Sender<Option<Profile>>,
}

impl SessionBinder {
    pub fn new(
        identity: Arc<dyn IdentityGateway>,
        gateway: Arc<dyn PersistenceGateway>,
        store: Arc<ReservationStore>,
        pending: Arc<PendingStore>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        let (profile, _) = watch::channel(None);
        SessionBinder {
            identity,
            gateway,
            store,
            pending,
            state,
            profile,
        }
    }

    /// Subscribes to session changes, applies the current session, and
    /// starts the event loop.
    ///
    /// The returned binding unsubscribes when stopped or dropped.
    pub async fn start(self: &Arc<Self>) -> SessionBinding {
        let (tx, mut rx) = mpsc::unbounded_channel::<Option<Session>>();
        let subscription = self.identity.on_session_change(Box::new(move |session| {
            let _ = tx.send(session);
        }));

        let current = self.identity.current_session().await;
        let initial_load = self.handle_session_change(current);

        let binder = Arc::clone(self);
        let events = tokio::spawn(async move {
            while let Some(session) = rx.recv().await {
                binder.handle_session_change(session);
            }
            debug!("Session event loop finished");
        });

        SessionBinding {
            subscription: Some(subscription),
            events,
            initial_load,
        }
    }

    /// Applies one session event. For an authenticated session, returns the
    /// spawned load task.
    pub fn handle_session_change(self: &Arc<Self>, session: Option<Session>) -> Option<JoinHandle<()>> {
        match session {
            None => {
                self.store.clear();
                self.pending.clear();
                self.profile.send_replace(None);
                self.state.send_replace(SessionState::Anonymous);
                info!("Session ended");
                None
            }
            Some(session) => {
                let owner_id = session.user_id.clone();
                if self.store.bind_owner(&owner_id) {
                    // Selections and profile belonged to the previous owner
                    self.pending.clear();
                    self.profile.send_replace(None);
                }
                self.state.send_replace(SessionState::Authenticated(session));
                info!(owner_id = %owner_id, "Session active");

                let token = self.store.begin_fetch(&owner_id);
                let binder = Arc::clone(self);
                Some(tokio::spawn(async move { binder.load_owner(owner_id, token).await }))
            }
        }
    }

    async fn load_owner(&self, owner_id: String, token: u64) {
        let (reservations, profile) = tokio::join!(
            self.store.fetch_with_token(&owner_id, token),
            self.gateway.select_profile(&owner_id),
        );

        if let Err(e) = reservations {
            warn!(owner_id = %owner_id, error = %e, "Initial reservation fetch failed");
        }

        match profile {
            Ok(profile) => {
                let current = self.state.borrow().user_id() == Some(owner_id.as_str());
                if current {
                    self.profile.send_replace(profile);
                } else {
                    debug!(owner_id = %owner_id, "Discarding profile of a previous session");
                }
            }
            Err(e) => warn!(owner_id = %owner_id, error = %e, "Profile load failed"),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_owner(&self) -> Option<String> {
        self.state.borrow().user_id().map(str::to_string)
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn subscribe_profile(&self) -> watch::Receiver<Option<Profile>> {
        self.profile.subscribe()
    }
}

/// A running binder. Dropping it stops the event loop.
pub struct SessionBinding {
    subscription: Option<Subscription>,
    events: JoinHandle<()>,
    initial_load: Option<JoinHandle<()>>,
}

impl SessionBinding {
    /// Waits for the load triggered by the session found at start, if any.
    pub async fn initial_load(&mut self) {
        if let Some(load) = self.initial_load.take() {
            if let Err(e) = load.await {
                warn!(error = %e, "Initial session load task failed");
            }
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.events.abort();
    }
}

impl Drop for SessionBinding {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::{MemoryIdentity, MemoryPersistence};
    use chrono::{Local, NaiveDate};
    use lunch_core::{MenuType, ReservationStatus};

    struct Fixture {
        identity: MemoryIdentity,
        gateway: Arc<MemoryPersistence>,
        store: Arc<ReservationStore>,
        pending: Arc<PendingStore>,
        binder: Arc<SessionBinder>,
    }

    fn fixture() -> Fixture {
        let identity = MemoryIdentity::new();
        let gateway = Arc::new(MemoryPersistence::new());
        let store = Arc::new(ReservationStore::new(
            gateway.clone(),
            Arc::new(ManualClock::new(Local::now())),
        ));
        let pending = Arc::new(PendingStore::new());
        let binder = Arc::new(SessionBinder::new(
            Arc::new(identity.clone()),
            gateway.clone(),
            store.clone(),
            pending.clone(),
        ));
        Fixture {
            identity,
            gateway,
            store,
            pending,
            binder,
        }
    }

    #[tokio::test]
    async fn test_starts_anonymous_without_session() {
        let f = fixture();
        assert!(f.binder.state().is_loading());

        let _binding = f.binder.start().await;
        assert_eq!(f.binder.state(), SessionState::Anonymous);
        assert_eq!(f.identity.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_authenticated_session_loads_owner_data() {
        let f = fixture();
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        f.gateway
            .insert_row("u-1", date, MenuType::Normal, ReservationStatus::Confirmed);

        let load = f
            .binder
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap();
        load.await.unwrap();

        assert_eq!(f.binder.current_owner().as_deref(), Some("u-1"));
        assert_eq!(f.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_switching_owner_drops_previous_pending() {
        let f = fixture();
        f.binder
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap()
            .await
            .unwrap();
        f.pending
            .add(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(), MenuType::Normal);

        // Same owner again (token refresh): pending survives
        f.binder
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(f.pending.len(), 1);

        f.binder
            .handle_session_change(Some(Session::new("u-2", "luis@example.com")))
            .unwrap()
            .await
            .unwrap();
        assert!(f.pending.is_empty());
        assert_eq!(f.store.owner().as_deref(), Some("u-2"));
    }

    #[tokio::test]
    async fn test_sign_out_before_load_runs_keeps_mirror_empty() {
        let f = fixture();
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        f.gateway
            .insert_row("u-1", date, MenuType::Normal, ReservationStatus::Confirmed);

        let load = f
            .binder
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap();
        assert!(f.binder.handle_session_change(None).is_none());
        load.await.unwrap();

        assert_eq!(f.binder.state(), SessionState::Anonymous);
        assert_eq!(f.store.owner(), None);
        assert!(f.store.snapshot().is_empty());
        assert_eq!(f.binder.profile(), None);
    }

    #[tokio::test]
    async fn test_load_of_previous_owner_does_not_rebind() {
        let f = fixture();
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        f.gateway
            .insert_row("u-1", date, MenuType::Normal, ReservationStatus::Confirmed);

        let first = f
            .binder
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap();
        let second = f
            .binder
            .handle_session_change(Some(Session::new("u-2", "luis@example.com")))
            .unwrap();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(f.store.owner().as_deref(), Some("u-2"));
        assert!(f.store.snapshot().is_empty());
        assert!(f.store.view().loaded);
    }

    #[tokio::test]
    async fn test_stop_unsubscribes() {
        let f = fixture();
        let binding = f.binder.start().await;
        binding.stop();
        assert_eq!(f.identity.subscriber_count(), 0);
    }
}
