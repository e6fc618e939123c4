//! # Repository Module
//!
//! SQL for each relation lives in its own repository, obtained from
//! [`Database`](crate::Database):
//!
//! ```text
//! db.reservations()  → ReservationRepository
//! │   ├── list_for_owner(owner_id)
//! │   ├── find_by_date(owner_id, date)
//! │   ├── insert_many(rows)          one transaction, all or nothing
//! │   ├── update(filter, patch)      rows affected
//! │   └── count(filter)
//! db.profiles()      → ProfileRepository
//!     ├── upsert(profile)
//!     └── get(owner_id)
//! ```
//!
//! Queries are built at runtime with `query_as` and `QueryBuilder`, so the
//! crate builds without a live database.

pub mod profile;
pub mod reservation;
