//! # lunch-db: SQLite Persistence Adapter
//!
//! Implements [`PersistenceGateway`](lunch_core::PersistenceGateway) on top
//! of a local SQLite database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  lunch-engine (stores, reconciliation)                                  │
//! │       │  Arc<dyn PersistenceGateway>                                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lunch-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐    ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories   │    │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ ReservationRepo  │    │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ ProfileRepo      │    │ 001_*.sql  │  │   │
//! │  │   └───────────────┘    └──────────────────┘    └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   gateway.rs: DbError → PersistenceError                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lunch.db (WAL)                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool management
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//! - [`repository`] - Reservation and profile queries
//! - [`gateway`] - The `PersistenceGateway` implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lunch_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./lunch.db")).await?;
//! let rows = db.reservations().list_for_owner("user-1").await?;
//! ```

pub mod error;
pub mod gateway;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::profile::ProfileRepository;
pub use repository::reservation::ReservationRepository;
