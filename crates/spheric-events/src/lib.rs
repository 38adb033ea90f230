//! World-event rolling, effects, and meteor-shower debris for the
//! Spheric simulation (spec.md 4.G).
//!
//! Every 100 ticks, if the cooldown since the last event has elapsed,
//! one world event rolls and stays active for a fixed duration,
//! multiplying rates in whichever subsystem it targets. See
//! [`roll::tick`] for the roll/expiry state machine and [`effects::effects_for`]
//! for the per-kind multipliers.

pub mod debris;
pub mod effects;
pub mod roll;

pub use effects::{effects_for, EventEffects};
pub use roll::{tick, EVENT_CHECK_INTERVAL_TICKS, EVENT_COOLDOWN_TICKS, EVENT_DURATION_TICKS};
