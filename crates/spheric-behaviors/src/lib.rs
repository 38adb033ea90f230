//! Per-building behavior state machines for the Spheric simulation.
//!
//! This crate contains the logic layer for buildings -- everything that
//! operates on behavior state without touching the world or the tick
//! scheduler. It sits between `spheric-types` (which defines the state
//! structs) and `spheric-core` (which owns the tick processor and
//! applies the pending-map writes these pure functions produce).
//!
//! # Modules
//!
//! - [`arms`] -- Loader/unloader arm range validation and transfer rate.
//! - [`conveyor`] -- Tier 1-3 conveyor FIFO-with-compaction behavior.
//! - [`error`] -- Error types for behavior operations ([`BehaviorError`]).
//! - [`extractor`] -- Fixed-rate extractor (miner) tick behavior.
//! - [`modifiers`] -- The rate/radius/output modifier stack.
//! - [`production`] -- Production-template Idle/Processing/Drain state machine.
//! - [`recipes`] -- Per-kind recipe tables and matching.
//! - [`routing`] -- Router push-resolution policies (splitter, merger, etc.).
//! - [`special`] -- Containment trap, turret, generator, shadow panel, drone bay.

pub mod arms;
pub mod conveyor;
pub mod error;
pub mod extractor;
pub mod modifiers;
pub mod production;
pub mod recipes;
pub mod routing;
pub mod special;

pub use error::BehaviorError;
pub use modifiers::{ClearanceTier, ModifierStack, RateClass, effective_rate, object_of_power_bonus, world_event_multiplier};
pub use recipes::{is_production_kind, recipes_for};
pub use routing::Side;
