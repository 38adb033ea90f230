//! Data layer for the Spheric simulation (`Dragonfly` + `PostgreSQL`).
//!
//! `Dragonfly` serves as the write-optimized hot state for the current
//! tick: per-face change-sets, the world summary, and open trades.
//! `PostgreSQL` serves as the cold state: saved tiles and buildings,
//! players, research progress, trades, the board-contact objective, the
//! ledger, and world-event history.
//!
//! # Architecture (CQRS)
//!
//! ```text
//! Tick Execution
//!     |
//!     +-- End of tick -----------> Dragonfly (publish_changesets)
//!     |
//!     +-- Save interval elapses -> PostgreSQL
//!         |-- WorldRepository  (worlds, tile_resources, buildings, players,
//!         |                     research_progress, trades, board_contact)
//!         |-- EventStore       (world_events history)
//!         +-- LedgerStore      (ledger, append-only)
//! ```
//!
//! # Modules
//!
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) hot state operations
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`world_store`] -- Core world-persistence tables (spec.md 6.3)
//! - [`event_store`] -- World-event history insertion and querying
//! - [`ledger_store`] -- Batch ledger entry insertion and querying
//! - [`tick_persist`] -- End-of-tick persistence orchestration
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod event_store;
pub mod ledger_store;
pub mod postgres;
pub mod tick_persist;
pub mod world_store;

// Re-export primary types for convenience.
pub use dragonfly::{DragonflyPool, WorldSummary};
pub use error::DbError;
pub use event_store::{EventStore, WorldEventOccurrence, WorldEventRow};
pub use ledger_store::{LedgerRow, LedgerStore};
pub use postgres::{PostgresConfig, PostgresPool};
pub use tick_persist::PersistError;
pub use world_store::{
    building_kind_from_atom, direction_from_atom, resource_kind_from_atom, BoardContactRow,
    BuildingRow, BuildingUpdate, PlayerRow, TileResourceRow, TileUpdate, TradeRow,
    WorldRepository, WorldRow,
};
