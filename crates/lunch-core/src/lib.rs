//! # lunch-core: Pure Reservation Rules
//!
//! This crate is the **rulebook** of the lunch reservation engine. Everything
//! here is deterministic: the wall clock is always passed in as `now`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Lunch Reservations Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser front-end                            │   │
//! │  │    Calendar ──► Summary ──► My reservations ──► Detail          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lunch-engine                                 │   │
//! │  │    stores, reconciliation, session binder, auth flows           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lunch-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  rules  │ │  dates  │ │ pending  │ │gateway │  │   │
//! │  │   │ Reserv. │ │ 48h,    │ │ YMD,    │ │ Pending  │ │ traits │  │   │
//! │  │   │ Profile │ │ weekend │ │ midday  │ │Selections│ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK READS • PURE FUNCTIONS                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Reservation, MenuType, Profile, Session)
//! - [`rules`] - Date rule engine (48-hour lockout, weekend blackout)
//! - [`dates`] - `YYYY-MM-DD` wire format and midday anchoring
//! - [`calendar`] - Week/month periods and reservation list filtering
//! - [`pending`] - Pending selection workspace
//! - [`validation`] - Credential and profile field validation
//! - [`gateway`] - Identity and persistence capability contracts
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, NaiveDate, TimeZone, Utc};
//! use lunch_core::rules;
//!
//! let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(); // Tuesday
//! let now = Utc.with_ymd_and_hms(2025, 6, 8, 12, 0, 0).unwrap();
//!
//! // Exactly 48h before midday of the date: still selectable
//! assert!(rules::is_selectable(date, &now));
//! assert!(!rules::is_selectable(date, &(now + Duration::milliseconds(1))));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calendar;
pub mod dates;
pub mod error;
pub mod gateway;
pub mod pending;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{AuthError, PersistenceError, ValidationError};
pub use gateway::{IdentityGateway, PersistenceGateway, SessionCallback, Subscription};
pub use pending::PendingSelections;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum notice, in hours, between now and the reservation date.
///
/// ## Business Reason
/// The kitchen plans purchases two days ahead. Inside this window a date can
/// no longer be booked, re-menued, or cancelled from the calendar.
pub const LOCKOUT_HOURS: i64 = 48;

/// Hour of the day (local time) used to anchor a calendar date as an instant.
pub const ANCHOR_HOUR: u32 = 12;

/// Role given to profiles created without an explicit role.
pub const DEFAULT_ROLE: &str = "employee";
