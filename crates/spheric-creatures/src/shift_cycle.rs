//! Day/night shift cycle (spec.md 4.G): a sun angle that advances at a
//! fixed rate, a phase derived from which quadrant it sits in, and the
//! per-face illumination that drives shadow panel output and biome rate
//! modifiers.
//!
//! The full formula asks for `clamp(dot(tile_normal, sun_direction) +
//! latitudinal tilt, 0, 1)`, which needs a per-tile 3D normal. The
//! embedding this simulation actually carries (`spheric_geometry::
//! face_latitude`) is a single scalar per face, not a normal vector, so
//! illumination here is approximated per-face rather than per-tile:
//! every tile on a face shares its face's illumination value.

use spheric_types::{ShiftCycleState, ShiftPhase};

/// Radians the sun angle advances per tick (`2*pi*10/2400` every 10
/// ticks, spread evenly).
const ANGLE_PER_TICK: f32 = std::f32::consts::TAU * 10.0 / 2400.0;

/// Weight applied to a face's latitude when folding it into illumination.
/// Chosen so a face at the extreme latitude (+-1.0) can swing
/// illumination by the same amount the sun angle itself contributes.
const LATITUDE_TILT_WEIGHT: f32 = 1.0;

/// A face is considered dark when its illumination falls below this.
pub const DARK_THRESHOLD: f32 = 0.15;

/// Which quadrant of the cycle a sun angle falls in (spec.md 4.G).
#[must_use]
pub fn phase_for_angle(sun_angle: f32) -> ShiftPhase {
    let normalized = sun_angle.rem_euclid(std::f32::consts::TAU);
    let half_pi = std::f32::consts::FRAC_PI_2;
    if normalized < half_pi {
        ShiftPhase::Dawn
    } else if normalized < half_pi * 2.0 {
        ShiftPhase::Zenith
    } else if normalized < half_pi * 3.0 {
        ShiftPhase::Dusk
    } else {
        ShiftPhase::Nadir
    }
}

/// Advance the shift cycle by one tick, returning the new state and
/// whether the phase changed (the caller emits a phase-change event
/// when this is `true`).
#[must_use]
pub fn tick(state: ShiftCycleState) -> (ShiftCycleState, bool) {
    let sun_angle = (state.sun_angle + ANGLE_PER_TICK).rem_euclid(std::f32::consts::TAU);
    let phase = phase_for_angle(sun_angle);
    let phase_changed = phase != state.phase;
    let phase_tick = if phase_changed { 0 } else { state.phase_tick.saturating_add(1) };
    (ShiftCycleState { sun_angle, phase, phase_tick }, phase_changed)
}

/// Illumination for a face at the given sun angle, in `[0, 1]`.
#[must_use]
pub fn illumination(face_latitude: f32, sun_angle: f32) -> f32 {
    (sun_angle.cos() + face_latitude * LATITUDE_TILT_WEIGHT).clamp(0.0, 1.0)
}

/// Whether a face counts as dark at the given illumination.
#[must_use]
pub const fn face_is_dark(illumination: f32) -> bool {
    illumination < DARK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_the_quadrant_of_the_sun_angle() {
        assert_eq!(phase_for_angle(0.0), ShiftPhase::Dawn);
        assert_eq!(phase_for_angle(std::f32::consts::FRAC_PI_2 + 0.01), ShiftPhase::Zenith);
        assert_eq!(phase_for_angle(std::f32::consts::PI + 0.01), ShiftPhase::Dusk);
        assert_eq!(phase_for_angle(std::f32::consts::PI * 1.5 + 0.01), ShiftPhase::Nadir);
    }

    #[test]
    fn a_full_cycle_takes_2400_ticks() {
        let mut state = ShiftCycleState::new();
        for _ in 0..2400 {
            let (next, _) = tick(state);
            state = next;
        }
        assert!((state.sun_angle - ShiftCycleState::new().sun_angle).abs() < 0.01);
    }

    #[test]
    fn phase_change_is_reported_exactly_at_the_quadrant_boundary() {
        let mut state = ShiftCycleState::new();
        let mut changes = 0;
        for _ in 0..2400 {
            let (next, changed) = tick(state);
            if changed {
                changes += 1;
            }
            state = next;
        }
        assert_eq!(changes, 4);
    }

    #[test]
    fn illumination_is_clamped_to_the_unit_interval() {
        assert!((0.0..=1.0).contains(&illumination(1.0, 0.0)));
        assert!((0.0..=1.0).contains(&illumination(-1.0, std::f32::consts::PI)));
    }

    #[test]
    fn a_face_is_dark_below_the_threshold() {
        assert!(face_is_dark(0.1));
        assert!(!face_is_dark(0.2));
    }
}
