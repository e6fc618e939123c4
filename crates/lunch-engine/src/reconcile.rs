//! # Reconciliation Engine
//!
//! Turns the pending selections into persisted reservations.
//!
//! ## Per-Date Outcome
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │ Existing row for date    │ Result                                       │
//! ├──────────────────────────┼──────────────────────────────────────────────┤
//! │ none                     │ inserted, confirmed, pending menu            │
//! │ cancelled                │ reactivated: confirmed, pending menu         │
//! │ confirmed                │ unchanged, menu kept (counted as already     │
//! │                          │ confirmed)                                   │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! ## Steps
//! 1. Snapshot pending; nothing pending → nothing touched
//! 2. One reactivation update per menu group (cancelled rows only)
//! 3. One batched insert; a duplicate-key rejection falls back to per-row
//!    inserts that skip taken dates
//! 4. Refetch; only then drop the committed entries from pending, and only
//!    while the store is still bound to the committing owner
//!
//! Any failure other than a duplicate key aborts, leaving pending intact so
//! the user can retry.

use std::sync::Arc;

use lunch_core::{
    NewReservation, PendingSelection, PersistenceGateway, ReservationFilter, ReservationPatch,
    ReservationStatus,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::EngineResult;
use crate::pending::PendingStore;
use crate::store::ReservationStore;

/// Outcome of a confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommitReport {
    /// Days confirmed by this call: `reactivated + inserted`.
    pub committed: usize,
    /// Cancelled rows brought back.
    pub reactivated: usize,
    /// New rows created.
    pub inserted: usize,
    /// Days that were already confirmed and were left with their menu.
    pub already_confirmed: usize,
    /// Rows not inserted because the date already had one.
    pub duplicates_skipped: usize,
}

impl CommitReport {
    /// Pending selections the call processed.
    pub fn processed(&self) -> usize {
        self.committed + self.already_confirmed
    }

    pub fn is_empty(&self) -> bool {
        self.processed() == 0
    }
}

pub struct Reconciler {
    gateway: Arc<dyn PersistenceGateway>,
    pending: Arc<PendingStore>,
    store: Arc<ReservationStore>,
}

impl Reconciler {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        pending: Arc<PendingStore>,
        store: Arc<ReservationStore>,
    ) -> Self {
        Reconciler {
            gateway,
            pending,
            store,
        }
    }

    /// Persists every pending selection for `owner_id`.
    pub async fn commit(&self, owner_id: &str) -> EngineResult<CommitReport> {
        let snapshot = self.pending.snapshot();
        if snapshot.is_empty() {
            debug!(owner_id = %owner_id, "Nothing pending to commit");
            return Ok(CommitReport::default());
        }

        let committed = snapshot.selections();
        let mut report = CommitReport::default();
        info!(owner_id = %owner_id, count = committed.len(), "Committing pending selections");

        // Only cancelled rows are touched; a day that is already confirmed
        // keeps its menu (menu changes go through `ReservationStore::update_menu`).
        for (menu_type, dates) in snapshot.group_by_menu() {
            let filter = ReservationFilter::owner(owner_id)
                .with_status(ReservationStatus::Cancelled)
                .with_dates(dates);
            let affected = self
                .gateway
                .update_reservations(&filter, ReservationPatch::reactivate(menu_type))
                .await?;
            debug!(%menu_type, affected, "Reactivated cancelled reservations");
            report.reactivated += affected as usize;
        }

        let (inserted, skipped) = self.insert_new(owner_id, &committed).await?;
        report.inserted = inserted;
        report.duplicates_skipped = skipped;
        report.committed = report.reactivated + report.inserted;
        report.already_confirmed = committed.len().saturating_sub(report.committed);

        self.store.fetch_all(owner_id).await?;
        if self.store.owner().as_deref() == Some(owner_id) {
            self.pending.remove_committed(&committed);
        } else {
            debug!(owner_id = %owner_id, "Owner changed during commit, pending left to the new session");
        }

        info!(
            owner_id = %owner_id,
            committed = report.committed,
            reactivated = report.reactivated,
            inserted = report.inserted,
            already_confirmed = report.already_confirmed,
            duplicates_skipped = report.duplicates_skipped,
            "Pending selections committed"
        );
        Ok(report)
    }

    /// Returns `(inserted, duplicates_skipped)`.
    async fn insert_new(
        &self,
        owner_id: &str,
        selections: &[PendingSelection],
    ) -> EngineResult<(usize, usize)> {
        let rows: Vec<NewReservation> = selections
            .iter()
            .map(|s| NewReservation::confirmed(owner_id, s.date, s.menu_type))
            .collect();

        match self.gateway.insert_reservations(&rows).await {
            Ok(()) => return Ok((rows.len(), 0)),
            Err(e) if e.is_duplicate_key() => {
                debug!(owner_id = %owner_id, "Batch hit existing dates, inserting row by row");
            }
            Err(e) => {
                warn!(owner_id = %owner_id, error = %e, "Reservation insert failed");
                return Err(e.into());
            }
        }

        let mut inserted = 0;
        let mut skipped = 0;
        for row in &rows {
            match self.gateway.insert_reservations(std::slice::from_ref(row)).await {
                Ok(()) => inserted += 1,
                Err(e) if e.is_duplicate_key() => skipped += 1,
                Err(e) => {
                    warn!(owner_id = %owner_id, date = %row.date, error = %e, "Reservation insert failed");
                    return Err(e.into());
                }
            }
        }
        Ok((inserted, skipped))
    }
}
