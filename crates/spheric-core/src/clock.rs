//! Shift-cycle derivation from the tick counter (spec.md 3.2, 4.G).
//!
//! # Design Principles
//!
//! - All temporal derivations use checked arithmetic (no silent overflow).
//! - Shift-cycle state is computed from the tick counter -- never stored
//!   independently. The tick number is the sole source of truth.

use std::f32::consts::TAU;

use spheric_types::{ShiftCycleState, ShiftPhase};

/// Ticks for one full sun-angle cycle (2*pi*10/2400 radians every 10
/// ticks, which is 2*pi radians over 2400 ticks).
const FULL_CYCLE_TICKS: u64 = 2400;

/// Ticks per shift phase: four phases split a full cycle evenly.
const PHASE_TICKS: u64 = 600;

/// World clock: the tick counter is the sole source of truth for
/// shift-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldClock {
    tick: u64,
}

impl WorldClock {
    /// Create a new world clock starting at tick 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an explicit tick (state restoration).
    #[must_use]
    pub const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick, saturating at `u64::MAX`. Returns
    /// the new tick number.
    pub const fn advance(&mut self) -> u64 {
        self.tick = self.tick.saturating_add(1);
        self.tick
    }

    /// Return the current tick number.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Derive the current shift-cycle state from the tick counter.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn shift_cycle(&self) -> ShiftCycleState {
        let within_cycle = self.tick.checked_rem(FULL_CYCLE_TICKS).unwrap_or(0);
        let sun_angle = (within_cycle as f32 / FULL_CYCLE_TICKS as f32) * TAU;
        let phase_tick = within_cycle.checked_rem(PHASE_TICKS).unwrap_or(0);
        let phase_index = within_cycle.checked_div(PHASE_TICKS).unwrap_or(0);
        let phase = match phase_index {
            0 => ShiftPhase::Dawn,
            1 => ShiftPhase::Zenith,
            2 => ShiftPhase::Dusk,
            _ => ShiftPhase::Nadir,
        };
        ShiftCycleState {
            sun_angle,
            phase,
            phase_tick: u16::try_from(phase_tick).unwrap_or(0),
        }
    }

    /// Return `true` if a phase change occurs going from `self` to
    /// `self` advanced by one tick, so callers can emit a phase-change
    /// event without recomputing both states themselves.
    #[must_use]
    pub fn phase_changes_next_tick(&self) -> bool {
        let next = Self::from_tick(self.tick.saturating_add(1));
        self.shift_cycle().phase != next.shift_cycle().phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = WorldClock::new();
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn clock_advances() {
        let mut clock = WorldClock::new();
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn tick_zero_is_dawn_with_zero_sun_angle() {
        let clock = WorldClock::new();
        let shift = clock.shift_cycle();
        assert_eq!(shift.phase, ShiftPhase::Dawn);
        assert!((shift.sun_angle - 0.0).abs() < f32::EPSILON);
        assert_eq!(shift.phase_tick, 0);
    }

    #[test]
    fn phase_rotates_through_a_full_cycle() {
        assert_eq!(WorldClock::from_tick(0).shift_cycle().phase, ShiftPhase::Dawn);
        assert_eq!(WorldClock::from_tick(600).shift_cycle().phase, ShiftPhase::Zenith);
        assert_eq!(WorldClock::from_tick(1200).shift_cycle().phase, ShiftPhase::Dusk);
        assert_eq!(WorldClock::from_tick(1800).shift_cycle().phase, ShiftPhase::Nadir);
        // The cycle wraps at 2400 ticks.
        assert_eq!(WorldClock::from_tick(2400).shift_cycle().phase, ShiftPhase::Dawn);
    }

    #[test]
    fn phase_tick_resets_at_each_phase_boundary() {
        assert_eq!(WorldClock::from_tick(599).shift_cycle().phase_tick, 599);
        assert_eq!(WorldClock::from_tick(600).shift_cycle().phase_tick, 0);
    }

    #[test]
    fn sun_angle_completes_a_full_rotation_per_cycle() {
        let start = WorldClock::from_tick(0).shift_cycle().sun_angle;
        let end = WorldClock::from_tick(2399).shift_cycle().sun_angle;
        assert!(start < end);
        assert!(end < TAU);
    }

    #[test]
    fn phase_changes_next_tick_is_true_only_at_boundaries() {
        assert!(!WorldClock::from_tick(598).phase_changes_next_tick());
        assert!(WorldClock::from_tick(599).phase_changes_next_tick());
    }

    #[test]
    fn from_tick_restores_state() {
        let clock = WorldClock::from_tick(500);
        assert_eq!(clock.tick(), 500);
    }
}
