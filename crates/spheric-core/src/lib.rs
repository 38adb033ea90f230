//! World clock, tick pipeline, and orchestration for the Spheric
//! simulation.
//!
//! This crate owns the fixed-cadence tick loop that drives the
//! simulation forward: the shift-cycle clock, the eight-phase per-tick
//! pipeline (pre-phase, behavior, push resolution, consumption, power,
//! creatures/hiss, delivery drones, end-of-tick), and the operator
//! control surface (pause/resume/stop, the player command queue, and
//! tick-speed adjustment) that a collaborator outside this crate drives.
//!
//! # Modules
//!
//! - [`clock`] -- shift-cycle clock: tick counter, sun-angle, and
//!   dawn/zenith/dusk/nadir phase derivation.
//! - [`config`] -- configuration loading into strongly-typed structs.
//! - [`operator`] -- shared operator control state for pause, resume,
//!   tick-speed adjustment, the player command queue, and clean
//!   shutdown.
//! - [`runner`] -- top-level simulation loop with operator controls,
//!   boundary enforcement, and clean shutdown sequencing.
//! - [`tick`] -- the eight-phase per-tick pipeline.

pub mod clock;
pub mod config;
pub mod operator;
pub mod runner;
pub mod tick;
