//! # Confirmed Reservation Store
//!
//! In-memory mirror of the bound owner's reservation rows. The gateway is
//! the source of truth: every mutation is followed by a full refetch, never
//! by local patching.
//!
//! ## Request Tokens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch #1 issued (token 1) ───────────────────────────────┐ resolves   │
//! │  fetch #2 issued (token 2) ──────┐ resolves               │ late       │
//! │                                  ▼                        ▼            │
//! │                          applied (2 > 0)          discarded (1 < 2)     │
//! │                                                                         │
//! │  clear() / bind_owner(other) also issue a token, so a fetch started    │
//! │  before sign-out can never repopulate the mirror afterwards.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A token is taken when the fetch is requested, not when its task first
//! runs: callers that spawn the fetch take it with [`ReservationStore::begin_fetch`]
//! and hand it to [`ReservationStore::fetch_with_token`]. Results are also
//! applied only while their owner is still the bound one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use lunch_core::{
    rules, MenuType, PersistenceError, PersistenceGateway, Reservation, ReservationFilter,
    ReservationStatus,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};

/// What subscribers of the store see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationsView {
    pub owner_id: Option<String>,
    /// Ordered by date ascending.
    pub reservations: Vec<Reservation>,
    /// Token of the state currently applied.
    pub version: u64,
    /// A fetch has been applied since the owner was bound.
    pub loaded: bool,
}

pub struct ReservationStore {
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
    next_token: AtomicU64,
    state: watch::Sender<ReservationsView>,
}

impl ReservationStore {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(ReservationsView::default());
        ReservationStore {
            gateway,
            clock,
            next_token: AtomicU64::new(0),
            state,
        }
    }

    fn issue_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn require_owner(&self) -> EngineResult<String> {
        self.owner().ok_or(EngineError::NotAuthenticated)
    }

    // =========================================================================
    // Owner Binding
    // =========================================================================

    /// Binds the mirror to `owner_id`. Rebinding to another owner empties
    /// the mirror and invalidates in-flight fetches. Returns true on change.
    pub fn bind_owner(&self, owner_id: &str) -> bool {
        if self.state.borrow().owner_id.as_deref() == Some(owner_id) {
            return false;
        }

        let token = self.issue_token();
        self.state.send_replace(ReservationsView {
            owner_id: Some(owner_id.to_string()),
            reservations: Vec::new(),
            version: token,
            loaded: false,
        });
        debug!(owner_id = %owner_id, token, "Reservation store bound");
        true
    }

    /// Empties the mirror and unbinds the owner. No gateway call.
    pub fn clear(&self) {
        let token = self.issue_token();
        self.state.send_replace(ReservationsView {
            owner_id: None,
            reservations: Vec::new(),
            version: token,
            loaded: false,
        });
        debug!(token, "Reservation store cleared");
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Loads every row of `owner_id` and replaces the mirror with them.
    ///
    /// The rows are returned even when a newer request has already been
    /// applied, or the store is no longer bound to `owner_id`; in that case
    /// the mirror is left alone. On failure the mirror keeps its last
    /// known-good value.
    pub async fn fetch_all(&self, owner_id: &str) -> EngineResult<Vec<Reservation>> {
        let token = self.begin_fetch(owner_id);
        self.fetch_with_token(owner_id, token).await
    }

    /// Reserves the request token of a fetch that will run later.
    pub fn begin_fetch(&self, owner_id: &str) -> u64 {
        let token = self.issue_token();
        debug!(owner_id = %owner_id, token, "Reservation fetch requested");
        token
    }

    /// Runs a fetch whose token was taken with [`Self::begin_fetch`].
    pub async fn fetch_with_token(&self, owner_id: &str, token: u64) -> EngineResult<Vec<Reservation>> {
        debug!(owner_id = %owner_id, token, "Fetching reservations");

        let mut rows = match self.gateway.select_reservations(owner_id).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(owner_id = %owner_id, token, error = %e, "Reservation fetch failed");
                return Err(e.into());
            }
        };
        rows.sort_by_key(|r| r.date);

        let applied = self.state.send_if_modified(|view| {
            if token <= view.version || view.owner_id.as_deref() != Some(owner_id) {
                return false;
            }
            view.reservations = rows.clone();
            view.version = token;
            view.loaded = true;
            true
        });

        if applied {
            debug!(owner_id = %owner_id, token, count = rows.len(), "Reservations applied");
        } else {
            debug!(owner_id = %owner_id, token, "Discarding stale reservation fetch");
        }

        Ok(rows)
    }

    /// Refetches for the bound owner.
    pub async fn refresh(&self) -> EngineResult<Vec<Reservation>> {
        let owner = self.require_owner()?;
        self.fetch_all(&owner).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Soft-deletes one reservation of the bound owner, then refetches.
    pub async fn cancel(&self, id: &str) -> EngineResult<()> {
        let owner = self.require_owner()?;
        let filter = ReservationFilter::owner(&owner).with_id(id);

        let affected = self
            .gateway
            .update_reservation_status(&filter, ReservationStatus::Cancelled)
            .await?;

        if affected == 0 {
            return Err(PersistenceError::not_found("Reservation", id).into());
        }

        info!(owner_id = %owner, reservation_id = %id, "Reservation cancelled");
        self.fetch_all(&owner).await?;
        Ok(())
    }

    /// Cancels every confirmed reservation with `start <= date <= end`,
    /// then refetches. Returns the number of rows cancelled.
    pub async fn cancel_in_range(&self, start: NaiveDate, end: NaiveDate) -> EngineResult<u64> {
        let owner = self.require_owner()?;
        let filter = ReservationFilter::owner(&owner)
            .with_status(ReservationStatus::Confirmed)
            .with_date_range(start, end);

        let affected = self
            .gateway
            .update_reservation_status(&filter, ReservationStatus::Cancelled)
            .await?;

        info!(owner_id = %owner, %start, %end, affected, "Reservations cancelled in range");
        self.fetch_all(&owner).await?;
        Ok(affected)
    }

    /// Changes the menu of a known, still modifiable reservation.
    ///
    /// Returns false without touching the gateway if the row is unknown or
    /// inside the lockout window.
    pub async fn update_menu(&self, id: &str, menu_type: MenuType) -> EngineResult<bool> {
        let Some(reservation) = self.get(id) else {
            debug!(reservation_id = %id, "Menu change for unknown reservation");
            return Ok(false);
        };

        if !rules::is_modifiable(reservation.date, &self.clock.now()) {
            debug!(reservation_id = %id, date = %reservation.date, "Menu change inside lockout");
            return Ok(false);
        }

        let owner = self.require_owner()?;
        let filter = ReservationFilter::owner(&owner).with_id(id);
        let affected = self
            .gateway
            .update_reservation_menu(&filter, menu_type)
            .await?;

        self.fetch_all(&owner).await?;
        Ok(affected > 0)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn owner(&self) -> Option<String> {
        self.state.borrow().owner_id.clone()
    }

    pub fn view(&self) -> ReservationsView {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> Vec<Reservation> {
        self.state.borrow().reservations.clone()
    }

    pub fn get(&self, id: &str) -> Option<Reservation> {
        self.state
            .borrow()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Option<Reservation> {
        self.state
            .borrow()
            .reservations
            .iter()
            .find(|r| r.date == date)
            .cloned()
    }

    /// Confirmed rows only.
    pub fn active(&self) -> Vec<Reservation> {
        self.state
            .borrow()
            .reservations
            .iter()
            .filter(|r| r.is_confirmed())
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReservationsView> {
        self.state.subscribe()
    }
}

impl std::fmt::Debug for ReservationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationStore")
            .field("view", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
