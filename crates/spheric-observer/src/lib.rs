//! Observer API server for the Spheric simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoints** (`/ws/faces/:face`), one stream per face,
//!   for real-time change-set broadcasting via [`tokio::sync::broadcast`]
//! - **REST reads** for the operator status and the latest per-face
//!   change-set
//! - **Player command submission** (`/commands/*`), validated at this
//!   HTTP boundary before being queued onto the tick loop
//! - **Operator REST endpoints** for runtime control (pause, resume,
//!   speed, stop, world-event injection)
//! - **Minimal HTML dashboard** (`GET /`) showing current tick, shift
//!   phase, and active world event
//!
//! # Architecture
//!
//! The observer holds an in-process [`state::WorldSummary`] and 30
//! per-face broadcast channels, both updated once per tick by the
//! engine's callback bridge. REST reads are lock-free against this
//! in-process state so the observer never blocks the tick cycle. The
//! durable hot/cold state lives in `spheric_db`; this crate never
//! depends on it, so it can be swapped or scaled independently.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::{spawn_observer, StartupError};
pub use state::{AppState, WorldSummary};
