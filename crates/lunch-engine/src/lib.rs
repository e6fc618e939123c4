//! # lunch-engine: Client-Side Reservation Engine
//!
//! Holds the employee's pending lunch selections and a mirror of their
//! persisted reservations, and reconciles the two against the backend.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LunchClient (facade)                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌──────────────────┐  ┌──────────────────────┐    │
//! │  │  PendingStore  │  │ ReservationStore │  │    SessionBinder     │    │
//! │  │                │  │                  │  │                      │    │
//! │  │ date → menu    │  │ mirror of rows,  │  │ identity events →    │    │
//! │  │ not persisted  │  │ request tokens   │  │ bind / clear stores  │    │
//! │  └───────┬────────┘  └────────▲─────────┘  └──────────────────────┘    │
//! │          │                    │ refetch                                 │
//! │          ▼                    │                                         │
//! │  ┌─────────────────────────────────────┐   ┌──────────────────────┐    │
//! │  │            Reconciler               │   │     AuthService      │    │
//! │  │ reactivate cancelled → insert new   │   │ validate → provider  │    │
//! │  │ → refetch → drop committed pending  │   │ → profile row        │    │
//! │  └─────────────────┬───────────────────┘   └──────────┬───────────┘    │
//! │                    ▼                                  ▼                 │
//! │          PersistenceGateway                    IdentityGateway          │
//! │   (lunch-db SQLite, hosted backend, memory)  (hosted provider, memory)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`app`] - `LunchClient`, the facade used by the UI
//! - [`pending`] - observable pending selections
//! - [`store`] - observable mirror of confirmed reservations
//! - [`reconcile`] - pending → persisted rows
//! - [`session`] - session state machine
//! - [`auth`] - sign-in / sign-up flows
//! - [`memory`] - in-memory gateways
//! - [`config`], [`telemetry`], [`clock`], [`error`]
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use lunch_engine::{EngineConfig, LunchClient, MemoryIdentity, MemoryPersistence, SystemClock};
//!
//! # async fn run() -> lunch_engine::EngineResult<()> {
//! let config = EngineConfig::load_or_default(None);
//! lunch_engine::telemetry::init_tracing(&config.logging);
//!
//! let client = LunchClient::new(
//!     Arc::new(MemoryIdentity::new()),
//!     Arc::new(MemoryPersistence::new()),
//!     Arc::new(SystemClock),
//!     &config,
//! );
//! let _binding = client.start().await;
//!
//! client.toggle_date(NaiveDate::from_ymd_opt(2030, 6, 10).unwrap())?;
//! let report = client.confirm().await?;
//! println!("{} reservations committed", report.committed);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod memory;
pub mod pending;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod telemetry;

pub use app::LunchClient;
pub use auth::{AuthService, Credentials, SignUpRequest};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, TestUserConfig};
pub use error::{EngineError, EngineResult, ErrorCode, ErrorPayload};
pub use memory::{MemoryIdentity, MemoryPersistence};
pub use pending::PendingStore;
pub use reconcile::{CommitReport, Reconciler};
pub use session::{SessionBinder, SessionBinding, SessionState};
pub use store::{ReservationStore, ReservationsView};
