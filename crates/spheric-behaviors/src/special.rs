//! Special per-kind behaviors that don't fit the production/routing
//! templates (spec.md 4.D.6): containment traps, defense turrets, and
//! power producers. Purification beacons and dimensional stabilizers
//! are purely passive corruption fields with no tick behavior of their
//! own -- the Hiss system reads their radius directly.
//!
//! The autonomous delivery-drone flight routine (spec.md 4.E.5) is not
//! part of this module: a drone bay's upgrade state
//! (`delivery_drone_enabled`, `cargo_capacity`) is just a purchased
//! flag set directly by the command layer, while the drone's
//! `idle_at_bay -> flying_to_storage -> flying_to_site -> returning`
//! state machine runs as part of the tick processor's dedicated
//! delivery-drone phase, since it needs a world-wide view of storage
//! containers and construction sites that a single building's behavior
//! hook doesn't have.

use spheric_types::{ContainmentTrapState, CreatureId, GeneratorState, Item, TurretState};

/// Ticks required to complete a capture (spec.md 4.D.6).
const CAPTURE_PROGRESS_TARGET: u8 = 15;

/// Ticks a defense turret must wait between attacks.
const TURRET_COOLDOWN_TICKS: u16 = 10;

/// Ticks of fuel a bio generator gains per unit of biofuel burned.
const BIOFUEL_TICKS_PER_UNIT: u32 = 60;

/// Illumination at or below which a shadow panel runs at full output.
const SHADOW_PANEL_FULL_ILLUMINATION: f64 = 0.15;

/// Illumination at or above which a shadow panel produces nothing.
const SHADOW_PANEL_ZERO_ILLUMINATION: f64 = 0.5;

/// Advance a containment trap by one tick. `creatures_in_radius` is the
/// set of wild creature ids currently within radius 3, supplied by the
/// caller. Returns the creature id to move into the owner's roster once
/// capture completes.
#[must_use]
pub fn tick_containment_trap(state: &ContainmentTrapState, creatures_in_radius: &[CreatureId]) -> (ContainmentTrapState, Option<CreatureId>) {
    let mut next = state.clone();
    match state.target {
        Some(target) if creatures_in_radius.contains(&target) => {
            next.progress = next.progress.saturating_add(1);
            if next.progress >= CAPTURE_PROGRESS_TARGET {
                next.target = None;
                next.progress = 0;
                return (next, Some(target));
            }
        }
        _ => {
            next.target = creatures_in_radius.iter().min().copied();
            next.progress = u8::from(next.target.is_some());
        }
    }
    (next, None)
}

/// Advance a defense turret by one tick. `has_target` tells whether a
/// hiss entity sits within radius 3; a successful attack loads
/// `hiss_residue` into the output buffer.
#[must_use]
pub fn tick_turret(state: &TurretState, has_target: bool) -> TurretState {
    let mut next = state.clone();
    if next.cooldown > 0 {
        next.cooldown -= 1;
        return next;
    }
    if has_target && next.output_buffer.is_none() {
        next.cooldown = TURRET_COOLDOWN_TICKS;
        next.output_buffer = Some(Item::HissResidue);
    }
    next
}

/// Clear a turret's output buffer after a successful downstream push.
#[must_use]
pub const fn on_turret_push_succeeded(state: TurretState) -> TurretState {
    TurretState { output_buffer: None, ..state }
}

/// Advance a bio generator by one tick: producing while fuel remains,
/// burning one tick of fuel per tick it produces (spec.md 9 Open
/// Question 2: fuel is a tick countdown, not consumption-per-unit).
#[must_use]
pub const fn tick_bio_generator(state: GeneratorState) -> GeneratorState {
    if state.fuel_remaining_ticks > 0 {
        GeneratorState {
            fuel_remaining_ticks: state.fuel_remaining_ticks - 1,
            producing: true,
        }
    } else {
        GeneratorState { fuel_remaining_ticks: 0, producing: false }
    }
}

/// Load one unit of biofuel into a bio generator, adding
/// [`BIOFUEL_TICKS_PER_UNIT`] ticks of fuel.
#[must_use]
pub const fn feed_bio_generator(state: GeneratorState) -> GeneratorState {
    GeneratorState {
        fuel_remaining_ticks: state.fuel_remaining_ticks.saturating_add(BIOFUEL_TICKS_PER_UNIT),
        producing: state.producing,
    }
}

/// A shadow panel's power output as a fraction of its rated capacity,
/// from the tile's current illumination: full output at or below
/// illumination 0.15, ramping linearly to zero at or above 0.5
/// (spec.md 4.D.6). Suppression by a nearby powered lamp is applied by
/// the caller, not here.
#[must_use]
pub fn shadow_panel_output(illumination: f64) -> f64 {
    if illumination <= SHADOW_PANEL_FULL_ILLUMINATION {
        1.0
    } else if illumination >= SHADOW_PANEL_ZERO_ILLUMINATION {
        0.0
    } else {
        let span = SHADOW_PANEL_ZERO_ILLUMINATION - SHADOW_PANEL_FULL_ILLUMINATION;
        1.0 - (illumination - SHADOW_PANEL_FULL_ILLUMINATION) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_trap_locks_onto_the_smallest_creature_id() {
        let a = CreatureId::new();
        let b = CreatureId::new();
        let smallest = a.min(b);
        let state = ContainmentTrapState { target: None, progress: 0 };
        let (state, captured) = tick_containment_trap(&state, &[a, b]);
        assert_eq!(state.target, Some(smallest));
        assert!(captured.is_none());
    }

    #[test]
    fn containment_trap_captures_at_progress_target() {
        let creature = CreatureId::new();
        let mut state = ContainmentTrapState { target: Some(creature), progress: CAPTURE_PROGRESS_TARGET - 1 };
        let captured;
        (state, captured) = tick_containment_trap(&state, &[creature]);
        assert_eq!(captured, Some(creature));
        assert_eq!(state.target, None);
        assert_eq!(state.progress, 0);
    }

    #[test]
    fn containment_trap_resets_when_the_target_leaves_radius() {
        let creature = CreatureId::new();
        let state = ContainmentTrapState { target: Some(creature), progress: 5 };
        let (state, _) = tick_containment_trap(&state, &[]);
        assert!(state.target.is_none());
        assert_eq!(state.progress, 0);
    }

    #[test]
    fn turret_fires_and_then_cools_down() {
        let state = TurretState { cooldown: 0, output_buffer: None };
        let state = tick_turret(&state, true);
        assert_eq!(state.output_buffer, Some(Item::HissResidue));
        assert_eq!(state.cooldown, TURRET_COOLDOWN_TICKS);
        let state = tick_turret(&state, true);
        assert_eq!(state.cooldown, TURRET_COOLDOWN_TICKS - 1);
    }

    #[test]
    fn bio_generator_stops_producing_once_fuel_runs_out() {
        let state = GeneratorState { fuel_remaining_ticks: 1, producing: false };
        let state = tick_bio_generator(state);
        assert!(state.producing);
        let state = tick_bio_generator(state);
        assert!(!state.producing);
    }

    #[test]
    fn feeding_bio_generator_adds_fuel_without_touching_producing() {
        let state = GeneratorState { fuel_remaining_ticks: 0, producing: false };
        let state = feed_bio_generator(state);
        assert_eq!(state.fuel_remaining_ticks, BIOFUEL_TICKS_PER_UNIT);
        assert!(!state.producing);

        let state = feed_bio_generator(state);
        assert_eq!(state.fuel_remaining_ticks, BIOFUEL_TICKS_PER_UNIT * 2);
    }

    #[test]
    fn shadow_panel_output_ramps_between_thresholds() {
        assert!((shadow_panel_output(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((shadow_panel_output(1.0) - 0.0).abs() < f64::EPSILON);
        let mid = shadow_panel_output(0.325);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
