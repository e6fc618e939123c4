//! # Domain Types
//!
//! Core domain types used throughout the reservation engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Reservation   │   │ PendingSelection│   │    Profile      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  date           │   │  owner_id       │       │
//! │  │  owner_id       │   │  menu_type      │   │  email          │       │
//! │  │  date           │   │                 │   │  full_name      │       │
//! │  │  menu_type      │   │  (never         │   │  employee_id    │       │
//! │  │  status         │   │   persisted)    │   │  department     │       │
//! │  │  created_at     │   │                 │   │  role           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐  ┌─────────────────┐       │
//! │  │    MenuType     │   │ReservationStatus │  │    Session      │       │
//! │  │  Normal         │   │  Confirmed       │  │  user_id        │       │
//! │  │  Hipocaloric    │   │  Cancelled       │  │  email          │       │
//! │  └─────────────────┘   └──────────────────┘  └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Row Per Day
//! The data store keeps at most one reservation row per `(owner_id, date)`.
//! Cancelling is a soft delete (status flip), so a cancelled day still owns
//! its row and must be reactivated instead of inserted again.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Menu Type
// =============================================================================

/// The lunch menu chosen for a day.
///
/// ## Wire Values
/// The hosted store holds `"Normal"` and `"Hipocalórico"`; both serde and the
/// SQLite adapter use exactly those strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum MenuType {
    /// Starter, main course, dessert and drink.
    Normal,
    /// Reduced-calorie variant of the daily menu.
    #[serde(rename = "Hipocalórico")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Hipocalórico"))]
    Hipocaloric,
}

impl MenuType {
    /// All menu types, in display order.
    pub const ALL: [MenuType; 2] = [MenuType::Normal, MenuType::Hipocaloric];

    /// The wire/display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuType::Normal => "Normal",
            MenuType::Hipocaloric => "Hipocalórico",
        }
    }

    /// The other menu type (the summary page toggles between the two).
    pub fn toggled(&self) -> MenuType {
        match self {
            MenuType::Normal => MenuType::Hipocaloric,
            MenuType::Hipocaloric => MenuType::Normal,
        }
    }
}

impl Default for MenuType {
    fn default() -> Self {
        MenuType::Normal
    }
}

impl std::fmt::Display for MenuType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MenuType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(MenuType::Normal),
            "hipocalórico" | "hipocalorico" | "hipocaloric" => Ok(MenuType::Hipocaloric),
            other => Err(ValidationError::invalid_format(
                "menu_type",
                format!("unknown menu type '{}', expected Normal or Hipocalórico", other),
            )),
        }
    }
}

// =============================================================================
// Reservation Status
// =============================================================================

/// Lifecycle state of a persisted reservation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// The lunch will be served.
    Confirmed,
    /// Soft-deleted; the row stays so the date can be reactivated.
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A persisted lunch reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Reservation {
    /// Identifier assigned by the persistence layer on insert.
    pub id: String,

    /// Owning user; every query and mutation is scoped by it.
    pub owner_id: String,

    /// Calendar day, serialized as `YYYY-MM-DD`.
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub menu_type: MenuType,

    pub status: ReservationStatus,

    /// Set at first insert; status and menu changes do not touch it.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Returns true if the reservation is still active.
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}

/// A row to insert. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub owner_id: String,
    pub date: NaiveDate,
    pub menu_type: MenuType,
    pub status: ReservationStatus,
}

impl NewReservation {
    /// A confirmed reservation for `date`.
    pub fn confirmed(owner_id: impl Into<String>, date: NaiveDate, menu_type: MenuType) -> Self {
        NewReservation {
            owner_id: owner_id.into(),
            date,
            menu_type,
            status: ReservationStatus::Confirmed,
        }
    }
}

// =============================================================================
// Pending Selection
// =============================================================================

/// A day chosen in the calendar but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PendingSelection {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub menu_type: MenuType,
}

// =============================================================================
// Reservation Filter / Patch
// =============================================================================

/// Row filter for batched updates. Always scoped to one owner.
///
/// Unset criteria match everything; set criteria are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationFilter {
    pub owner_id: String,
    pub id: Option<String>,
    pub status: Option<ReservationStatus>,
    pub dates: Option<Vec<NaiveDate>>,
    /// Inclusive `[start, end]` range.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ReservationFilter {
    /// Matches every row of `owner_id`.
    pub fn owner(owner_id: impl Into<String>) -> Self {
        ReservationFilter {
            owner_id: owner_id.into(),
            id: None,
            status: None,
            dates: None,
            date_range: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.dates = Some(dates);
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    /// Evaluates the filter against a row. Used by in-memory gateways.
    pub fn matches(&self, reservation: &Reservation) -> bool {
        if reservation.owner_id != self.owner_id {
            return false;
        }
        if let Some(id) = &self.id {
            if &reservation.id != id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if reservation.status != status {
                return false;
            }
        }
        if let Some(dates) = &self.dates {
            if !dates.contains(&reservation.date) {
                return false;
            }
        }
        if let Some((start, end)) = self.date_range {
            if reservation.date < start || reservation.date > end {
                return false;
            }
        }
        true
    }
}

/// Column changes applied by a batched update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationPatch {
    pub status: Option<ReservationStatus>,
    pub menu_type: Option<MenuType>,
}

impl ReservationPatch {
    pub fn status(status: ReservationStatus) -> Self {
        ReservationPatch {
            status: Some(status),
            menu_type: None,
        }
    }

    pub fn menu(menu_type: MenuType) -> Self {
        ReservationPatch {
            status: None,
            menu_type: Some(menu_type),
        }
    }

    /// Reactivation: confirmed again, with the newly chosen menu.
    pub fn reactivate(menu_type: MenuType) -> Self {
        ReservationPatch {
            status: Some(ReservationStatus::Confirmed),
            menu_type: Some(menu_type),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.menu_type.is_none()
    }

    /// Applies the patch to a row in place.
    pub fn apply(&self, reservation: &mut Reservation) {
        if let Some(status) = self.status {
            reservation.status = status;
        }
        if let Some(menu_type) = self.menu_type {
            reservation.menu_type = menu_type;
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Employee profile row (`profiles` relation, keyed by owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Profile {
    pub owner_id: String,
    pub email: String,
    pub full_name: String,
    pub employee_id: String,
    pub department: Option<String>,
    pub role: String,
}

/// Attributes collected at sign-up and stored with the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileAttributes {
    pub full_name: String,
    pub employee_id: String,
    pub department: Option<String>,
    pub role: Option<String>,
}

impl ProfileAttributes {
    /// Builds the profile row for a freshly created account.
    pub fn into_profile(self, owner_id: impl Into<String>, email: impl Into<String>) -> Profile {
        Profile {
            owner_id: owner_id.into(),
            email: email.into(),
            full_name: self.full_name,
            employee_id: self.employee_id,
            department: self.department,
            role: self.role.unwrap_or_else(|| crate::DEFAULT_ROLE.to_string()),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated identity-provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: Option<String>,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Session {
            user_id: user_id.into(),
            email: email.into(),
            access_token: None,
            expires_at: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(id: &str, day: u32, status: ReservationStatus) -> Reservation {
        Reservation {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            date: date(2025, 6, day),
            menu_type: MenuType::Normal,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_menu_type_wire_values() {
        assert_eq!(
            serde_json::to_string(&MenuType::Hipocaloric).unwrap(),
            "\"Hipocalórico\""
        );
        let parsed: MenuType = serde_json::from_str("\"Hipocalórico\"").unwrap();
        assert_eq!(parsed, MenuType::Hipocaloric);
        assert_eq!("Hipocaloric".parse::<MenuType>().unwrap(), MenuType::Hipocaloric);
        assert_eq!("normal".parse::<MenuType>().unwrap(), MenuType::Normal);
        assert!("vegan".parse::<MenuType>().is_err());
    }

    #[test]
    fn test_reservation_serializes_date_as_ymd() {
        let json = serde_json::to_value(reservation("r-1", 10, ReservationStatus::Confirmed)).unwrap();
        assert_eq!(json["date"], "2025-06-10");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["menuType"], "Normal");
    }

    #[test]
    fn test_filter_matches_all_criteria() {
        let row = reservation("r-1", 10, ReservationStatus::Cancelled);

        assert!(ReservationFilter::owner("owner-1").matches(&row));
        assert!(!ReservationFilter::owner("owner-2").matches(&row));
        assert!(ReservationFilter::owner("owner-1")
            .with_status(ReservationStatus::Cancelled)
            .with_dates(vec![date(2025, 6, 10)])
            .matches(&row));
        assert!(!ReservationFilter::owner("owner-1")
            .with_status(ReservationStatus::Confirmed)
            .matches(&row));
        assert!(ReservationFilter::owner("owner-1")
            .with_date_range(date(2025, 6, 10), date(2025, 6, 10))
            .matches(&row));
        assert!(!ReservationFilter::owner("owner-1")
            .with_date_range(date(2025, 6, 11), date(2025, 6, 20))
            .matches(&row));
    }

    #[test]
    fn test_patch_reactivate() {
        let mut row = reservation("r-1", 10, ReservationStatus::Cancelled);
        ReservationPatch::reactivate(MenuType::Hipocaloric).apply(&mut row);
        assert_eq!(row.status, ReservationStatus::Confirmed);
        assert_eq!(row.menu_type, MenuType::Hipocaloric);
    }

    #[test]
    fn test_profile_attributes_default_role() {
        let profile = ProfileAttributes {
            full_name: "Ana Rojas".into(),
            employee_id: "EMP001".into(),
            department: None,
            role: None,
        }
        .into_profile("u-1", "ana@example.com");
        assert_eq!(profile.role, crate::DEFAULT_ROLE);
        assert_eq!(profile.owner_id, "u-1");
    }
}
