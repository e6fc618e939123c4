//! # Pending Store
//!
//! Observable wrapper around [`PendingSelections`]. Every change is
//! published on a `watch` channel; `subscribe()` gives the UI a receiver
//! that always holds the latest set.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lunch_core::pending::PendingSummary;
use lunch_core::{MenuType, PendingSelection, PendingSelections};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug)]
pub struct PendingStore {
    state: watch::Sender<PendingSelections>,
}

impl Default for PendingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(PendingSelections::new());
        PendingStore { state }
    }

    /// Insert-or-overwrite.
    pub fn add(&self, date: NaiveDate, menu_type: MenuType) {
        self.state.send_if_modified(|pending| {
            let previous = pending.add(date, menu_type);
            previous != Some(menu_type)
        });
        debug!(%date, %menu_type, "Pending selection added");
    }

    pub fn remove(&self, date: NaiveDate) -> bool {
        self.state.send_if_modified(|pending| pending.remove(date))
    }

    pub fn update_menu(&self, date: NaiveDate, menu_type: MenuType) -> bool {
        self.state
            .send_if_modified(|pending| pending.update_menu(date, menu_type))
    }

    /// Returns true if `date` is selected afterwards.
    pub fn toggle(&self, date: NaiveDate, default_menu: MenuType) -> bool {
        let mut selected = false;
        self.state.send_modify(|pending| {
            selected = pending.toggle(date, default_menu);
        });
        selected
    }

    pub fn clear(&self) {
        let cleared = self.state.send_if_modified(|pending| {
            if pending.is_empty() {
                return false;
            }
            pending.clear();
            true
        });
        if cleared {
            debug!("Pending selections cleared");
        }
    }

    /// Removes the entries of a committed snapshot. See
    /// [`PendingSelections::remove_committed`].
    pub fn remove_committed(&self, committed: &[PendingSelection]) -> usize {
        let mut removed = 0;
        self.state.send_if_modified(|pending| {
            removed = pending.remove_committed(committed);
            removed > 0
        });
        removed
    }

    pub fn snapshot(&self) -> PendingSelections {
        self.state.borrow().clone()
    }

    pub fn selections(&self) -> Vec<PendingSelection> {
        self.state.borrow().selections()
    }

    pub fn get(&self, date: NaiveDate) -> Option<MenuType> {
        self.state.borrow().get(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.state.borrow().contains(date)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn summary(&self) -> PendingSummary {
        self.state.borrow().summary()
    }

    pub fn group_by_menu(&self) -> BTreeMap<MenuType, Vec<NaiveDate>> {
        self.state.borrow().group_by_menu()
    }

    pub fn subscribe(&self) -> watch::Receiver<PendingSelections> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_subscribers_see_changes() {
        let store = PendingStore::new();
        let mut rx = store.subscribe();

        store.add(date(10), MenuType::Normal);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        // Same menu again: nothing to publish
        store.add(date(10), MenuType::Normal);
        assert!(!rx.has_changed().unwrap());

        store.add(date(10), MenuType::Hipocaloric);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().get(date(10)), Some(MenuType::Hipocaloric));
    }

    #[test]
    fn test_noops_do_not_notify() {
        let store = PendingStore::new();
        let mut rx = store.subscribe();

        assert!(!store.remove(date(10)));
        assert!(!store.update_menu(date(10), MenuType::Normal));
        store.clear();
        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_toggle_and_summary() {
        let store = PendingStore::new();
        assert!(store.toggle(date(10), MenuType::Normal));
        assert!(store.toggle(date(11), MenuType::Hipocaloric));
        assert!(!store.toggle(date(10), MenuType::Normal));

        let summary = store.summary();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.hipocaloric, 1);
    }
}
