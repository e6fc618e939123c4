//! # Lunch Client
//!
//! The facade the UI talks to. Wires the stores, the reconciler, the session
//! binder and the auth flows around injected gateways and a clock, and
//! applies the date rules at action time.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          LunchClient                                    │
//! │                                                                         │
//! │   IdentityGateway ──► SessionBinder ──► ReservationStore ◄── Reconciler │
//! │          │                  │                  ▲                │       │
//! │          ▼                  ▼                  │                ▼       │
//! │     AuthService        PendingStore ───────────┴────── PersistenceGateway│
//! │                                                                         │
//! │   Clock: read on every rule check (no timers)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use lunch_core::calendar::{self, CalendarView, MenuFilter, Period};
use lunch_core::pending::PendingSummary;
use lunch_core::{rules, IdentityGateway, MenuType, PersistenceGateway, Reservation};
use tracing::{debug, info};

use crate::auth::AuthService;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::pending::PendingStore;
use crate::reconcile::{CommitReport, Reconciler};
use crate::session::{SessionBinder, SessionBinding};
use crate::store::ReservationStore;

pub struct LunchClient {
    clock: Arc<dyn Clock>,
    default_menu: MenuType,
    pending: Arc<PendingStore>,
    reservations: Arc<ReservationStore>,
    reconciler: Reconciler,
    session: Arc<SessionBinder>,
    auth: AuthService,
}

impl LunchClient {
    pub fn new(
        identity: Arc<dyn IdentityGateway>,
        persistence: Arc<dyn PersistenceGateway>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        let pending = Arc::new(PendingStore::new());
        let reservations = Arc::new(ReservationStore::new(
            Arc::clone(&persistence),
            Arc::clone(&clock),
        ));
        let reconciler = Reconciler::new(
            Arc::clone(&persistence),
            Arc::clone(&pending),
            Arc::clone(&reservations),
        );
        let session = Arc::new(SessionBinder::new(
            Arc::clone(&identity),
            Arc::clone(&persistence),
            Arc::clone(&reservations),
            Arc::clone(&pending),
        ));
        let auth = AuthService::new(identity, persistence);

        LunchClient {
            clock,
            default_menu: config.reservations.default_menu,
            pending,
            reservations,
            reconciler,
            session,
            auth,
        }
    }

    /// Starts following the identity provider. Keep the binding alive for
    /// as long as the client is in use.
    pub async fn start(&self) -> SessionBinding {
        self.session.start().await
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn pending(&self) -> &Arc<PendingStore> {
        &self.pending
    }

    pub fn reservations(&self) -> &Arc<ReservationStore> {
        &self.reservations
    }

    pub fn session(&self) -> &Arc<SessionBinder> {
        &self.session
    }

    fn require_owner(&self) -> EngineResult<String> {
        self.session
            .current_owner()
            .ok_or(EngineError::NotAuthenticated)
    }

    // =========================================================================
    // Calendar Selection
    // =========================================================================

    /// Calendar click. Refuses weekend and locked-out days, otherwise
    /// toggles the day with the default menu. Returns true if selected.
    pub fn toggle_date(&self, date: NaiveDate) -> EngineResult<bool> {
        rules::check_selectable(date, &self.clock.now())?;
        let selected = self.pending.toggle(date, self.default_menu);
        debug!(%date, selected, "Calendar day toggled");
        Ok(selected)
    }

    /// Selects `date` with an explicit menu, replacing any earlier choice.
    pub fn select_date(&self, date: NaiveDate, menu_type: MenuType) -> EngineResult<()> {
        rules::check_selectable(date, &self.clock.now())?;
        self.pending.add(date, menu_type);
        Ok(())
    }

    /// Changes the menu of an already selected day. Returns false if the
    /// day is not selected.
    pub fn set_pending_menu(&self, date: NaiveDate, menu_type: MenuType) -> bool {
        self.pending.update_menu(date, menu_type)
    }

    pub fn deselect(&self, date: NaiveDate) -> bool {
        self.pending.remove(date)
    }

    pub fn discard_pending(&self) {
        self.pending.clear();
    }

    pub fn pending_summary(&self) -> PendingSummary {
        self.pending.summary()
    }

    /// Persists every pending selection for the signed-in owner.
    pub async fn confirm(&self) -> EngineResult<CommitReport> {
        let owner = self.require_owner()?;
        self.reconciler.commit(&owner).await
    }

    // =========================================================================
    // Confirmed Reservations
    // =========================================================================

    /// Cancels one reservation, unless its day is already inside the
    /// lockout window.
    pub async fn cancel_reservation(&self, id: &str) -> EngineResult<()> {
        if let Some(reservation) = self.reservations.get(id) {
            rules::check_modifiable(reservation.date, &self.clock.now())?;
        }
        self.reservations.cancel(id).await
    }

    /// Cancels every confirmed reservation of the week or month containing
    /// `date`. Returns the number cancelled.
    pub async fn cancel_period(&self, view: CalendarView, date: NaiveDate) -> EngineResult<u64> {
        let period = calendar::period_of(view, date);
        let cancelled = self
            .reservations
            .cancel_in_range(period.start, period.end)
            .await?;
        info!(?view, start = %period.start, end = %period.end, cancelled, "Period cancelled");
        Ok(cancelled)
    }

    /// Switches the menu of a reservation. Returns false if it is unknown
    /// or locked.
    pub async fn change_menu(&self, id: &str, menu_type: MenuType) -> EngineResult<bool> {
        self.reservations.update_menu(id, menu_type).await
    }

    pub fn can_modify(&self, reservation: &Reservation) -> bool {
        reservation.is_confirmed() && rules::is_modifiable(reservation.date, &self.clock.now())
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn period(&self, view: CalendarView, date: NaiveDate) -> Period {
        calendar::period_of(view, date)
    }

    /// Confirmed reservations of the week or month containing `date`.
    pub fn reservations_in_period(
        &self,
        view: CalendarView,
        date: NaiveDate,
        filter: MenuFilter,
    ) -> Vec<Reservation> {
        calendar::reservations_in_period(
            &self.reservations.snapshot(),
            calendar::period_of(view, date),
            filter,
        )
    }

    pub fn active_count(&self) -> usize {
        self.reservations.active().len()
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        rules::is_selectable(date, &self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::{MemoryIdentity, MemoryPersistence};
    use chrono::{Duration, Local};
    use lunch_core::dates::anchor;
    use lunch_core::{ReservationStatus, Session, ValidationError};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    /// Client whose clock sits `hours` before midday of 2025-06-10 (a Tuesday).
    fn client(hours: i64) -> (MemoryIdentity, Arc<MemoryPersistence>, LunchClient) {
        let identity = MemoryIdentity::new();
        let gateway = Arc::new(MemoryPersistence::new());
        let clock = Arc::new(ManualClock::new(anchor(date(10), &Local) - Duration::hours(hours)));
        let client = LunchClient::new(
            Arc::new(identity.clone()),
            gateway.clone(),
            clock,
            &EngineConfig::default(),
        );
        (identity, gateway, client)
    }

    #[test]
    fn test_toggle_uses_default_menu() {
        let (_identity, _gateway, client) = client(72);

        assert!(client.toggle_date(date(10)).unwrap());
        assert_eq!(client.pending().get(date(10)), Some(MenuType::Normal));
        assert!(!client.toggle_date(date(10)).unwrap());
        assert!(client.pending().is_empty());
    }

    #[test]
    fn test_selection_rules() {
        let (_identity, _gateway, client) = client(72);

        assert_eq!(
            client.toggle_date(date(14)).unwrap_err(),
            EngineError::Validation(ValidationError::Weekend { date: date(14) })
        );
        assert!(matches!(
            client.select_date(date(8), MenuType::Normal),
            Err(EngineError::Validation(ValidationError::WithinLockout { .. }))
        ));
        assert!(client.pending().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_requires_owner() {
        let (_identity, _gateway, client) = client(72);
        client.select_date(date(10), MenuType::Normal).unwrap();

        assert_eq!(client.confirm().await.unwrap_err(), EngineError::NotAuthenticated);
        assert_eq!(client.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_inside_lockout_is_refused() {
        let (_identity, gateway, client) = client(24);
        let row = gateway.insert_row("u-1", date(10), MenuType::Normal, ReservationStatus::Confirmed);
        client
            .session()
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap()
            .await
            .unwrap();

        assert!(!client.can_modify(&row));
        assert!(matches!(
            client.cancel_reservation(&row.id).await,
            Err(EngineError::Validation(ValidationError::WithinLockout { .. }))
        ));
        assert!(gateway.reservations("u-1")[0].is_confirmed());
    }

    #[tokio::test]
    async fn test_period_listing_and_cancel() {
        let (_identity, gateway, client) = client(72);
        gateway.insert_row("u-1", date(11), MenuType::Hipocaloric, ReservationStatus::Confirmed);
        gateway.insert_row("u-1", date(12), MenuType::Normal, ReservationStatus::Confirmed);
        gateway.insert_row("u-1", date(17), MenuType::Normal, ReservationStatus::Confirmed);
        client
            .session()
            .handle_session_change(Some(Session::new("u-1", "ana@example.com")))
            .unwrap()
            .await
            .unwrap();

        let week = client.reservations_in_period(CalendarView::Week, date(10), MenuFilter::All);
        assert_eq!(week.len(), 2);
        let hipo = client.reservations_in_period(
            CalendarView::Month,
            date(10),
            MenuFilter::Only(MenuType::Hipocaloric),
        );
        assert_eq!(hipo.len(), 1);

        assert_eq!(client.cancel_period(CalendarView::Week, date(10)).await.unwrap(), 2);
        assert_eq!(client.active_count(), 1);
    }
}
