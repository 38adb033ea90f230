//! Shift cycle, corruption spread, wild creatures, and hiss entities for
//! the Spheric simulation.
//!
//! This crate holds the pure per-tick logic for the world's living
//! systems, in the same style as `spheric-behaviors` holds per-building
//! logic: no world or tick-scheduler access, just state-in/state-out
//! functions the tick processor in `spheric-core` drives and merges.
//!
//! # Modules
//!
//! - [`shift_cycle`] -- sun angle, phase, and per-face illumination.
//! - [`corruption`] -- corruption spread and purification decay.
//! - [`creatures`] -- wild creature spawn and movement.
//! - [`hiss`] -- hiss entity spawn, pathing, and damage.

pub mod corruption;
pub mod creatures;
pub mod hiss;
pub mod shift_cycle;
