//! # Pending Selections
//!
//! Days picked in the calendar that are not confirmed yet. This is a plain
//! model; the engine wraps it in an observable store.
//!
//! ## Invariants
//! - At most one entry per date; adding a date again replaces its menu.
//! - Iteration is always in date order.
//! - No rule checks here. Callers validate before adding.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{MenuType, PendingSelection};

/// Counts shown on the summary page before confirming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PendingSummary {
    pub total: usize,
    pub normal: usize,
    pub hipocaloric: usize,
}

/// The ordered pending selection set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSelections {
    entries: BTreeMap<NaiveDate, MenuType>,
}

impl PendingSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `date`, or overwrites its menu if already present.
    ///
    /// Returns the previous menu, if any.
    pub fn add(&mut self, date: NaiveDate, menu_type: MenuType) -> Option<MenuType> {
        self.entries.insert(date, menu_type)
    }

    /// Removes `date`. No-op if absent.
    pub fn remove(&mut self, date: NaiveDate) -> bool {
        self.entries.remove(&date).is_some()
    }

    /// Changes the menu of an existing entry. No-op if absent.
    pub fn update_menu(&mut self, date: NaiveDate, menu_type: MenuType) -> bool {
        match self.entries.get_mut(&date) {
            Some(current) if *current != menu_type => {
                *current = menu_type;
                true
            }
            _ => false,
        }
    }

    /// Calendar click: deselects a selected day, otherwise selects it with
    /// `default_menu`. Returns true if the day is selected afterwards.
    pub fn toggle(&mut self, date: NaiveDate, default_menu: MenuType) -> bool {
        if self.entries.remove(&date).is_some() {
            false
        } else {
            self.entries.insert(date, default_menu);
            true
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, date: NaiveDate) -> Option<MenuType> {
        self.entries.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selections in date order.
    pub fn iter(&self) -> impl Iterator<Item = PendingSelection> + '_ {
        self.entries
            .iter()
            .map(|(date, menu_type)| PendingSelection {
                date: *date,
                menu_type: *menu_type,
            })
    }

    /// Owned snapshot, in date order.
    pub fn selections(&self) -> Vec<PendingSelection> {
        self.iter().collect()
    }

    pub fn summary(&self) -> PendingSummary {
        let normal = self
            .entries
            .values()
            .filter(|m| **m == MenuType::Normal)
            .count();
        PendingSummary {
            total: self.entries.len(),
            normal,
            hipocaloric: self.entries.len() - normal,
        }
    }

    /// Dates per menu type, each list in date order. Menus without dates are
    /// left out.
    pub fn group_by_menu(&self) -> BTreeMap<MenuType, Vec<NaiveDate>> {
        let mut groups: BTreeMap<MenuType, Vec<NaiveDate>> = BTreeMap::new();
        for (date, menu_type) in &self.entries {
            groups.entry(*menu_type).or_default().push(*date);
        }
        groups
    }

    /// Drops the entries of a committed snapshot.
    ///
    /// An entry is only removed if it still holds the committed menu; a day
    /// re-menued while the commit was in flight stays pending.
    pub fn remove_committed(&mut self, committed: &[PendingSelection]) -> usize {
        let mut removed = 0;
        for selection in committed {
            if self.entries.get(&selection.date) == Some(&selection.menu_type) {
                self.entries.remove(&selection.date);
                removed += 1;
            }
        }
        removed
    }
}

impl FromIterator<PendingSelection> for PendingSelections {
    fn from_iter<I: IntoIterator<Item = PendingSelection>>(iter: I) -> Self {
        PendingSelections {
            entries: iter
                .into_iter()
                .map(|s| (s.date, s.menu_type))
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
