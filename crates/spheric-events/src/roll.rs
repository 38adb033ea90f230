//! World-event rolling and lifecycle (spec.md 4.G).
//!
//! Every [`EVENT_CHECK_INTERVAL_TICKS`] ticks, if at least
//! [`EVENT_COOLDOWN_TICKS`] have elapsed since the last event started,
//! one of [`EventKind::ALL`] is rolled with equal weight and becomes
//! active for [`EVENT_DURATION_TICKS`].

use rand::Rng;
use spheric_types::{EventKind, WorldEventState};

/// How often (in ticks) the tick processor checks whether a new event
/// should start.
pub const EVENT_CHECK_INTERVAL_TICKS: u64 = 100;

/// Minimum ticks that must elapse between the start of one event and
/// the start of the next.
pub const EVENT_COOLDOWN_TICKS: u64 = 500;

/// How long a rolled event stays active.
pub const EVENT_DURATION_TICKS: u64 = 150;

fn random_kind(rng: &mut impl Rng) -> EventKind {
    match rng.random_range(0..4u8) {
        0 => EventKind::HissSurge,
        1 => EventKind::MeteorShower,
        2 => EventKind::ResonanceCascade,
        _ => EventKind::EntityMigration,
    }
}

/// Advance world-event state by one tick, rolling a new event if the
/// check interval and cooldown both allow it, and clearing the active
/// event once its duration elapses.
#[must_use]
pub fn tick(mut state: WorldEventState, current_tick: u64, rng: &mut impl Rng) -> WorldEventState {
    if let Some(active) = state.active {
        let elapsed = current_tick.saturating_sub(state.started_at_tick);
        if elapsed >= EVENT_DURATION_TICKS {
            state.active = None;
            let _ = active;
        }
        return state;
    }

    if current_tick.checked_rem(EVENT_CHECK_INTERVAL_TICKS).unwrap_or(1) != 0 {
        return state;
    }
    // `last_event_tick` is 0 before any event has ever rolled, which is
    // indistinguishable from "an event started at tick 0" -- consult
    // `history` to tell the two apart.
    let on_cooldown = !state.history.is_empty()
        && current_tick.saturating_sub(state.last_event_tick) < EVENT_COOLDOWN_TICKS;
    if on_cooldown {
        return state;
    }

    let kind = random_kind(rng);
    state.active = Some(kind);
    state.started_at_tick = current_tick;
    state.last_event_tick = current_tick;
    state.history.push((kind, current_tick));
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn no_event_rolls_before_the_check_interval() {
        let state = WorldEventState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let next = tick(state, 50, &mut rng);
        assert!(next.active.is_none());
    }

    #[test]
    fn an_event_can_roll_once_the_interval_and_cooldown_allow_it() {
        let state = WorldEventState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let next = tick(state, 100, &mut rng);
        assert!(next.active.is_some());
        assert_eq!(next.started_at_tick, 100);
        assert_eq!(next.history.len(), 1);
    }

    #[test]
    fn no_event_rolls_while_the_cooldown_has_not_elapsed() {
        let mut state = WorldEventState::new();
        state.last_event_tick = 100;
        state.history.push((EventKind::HissSurge, 100));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Only 100 ticks since the last event; cooldown is 500.
        let next = tick(state, 200, &mut rng);
        assert!(next.active.is_none());
    }

    #[test]
    fn an_active_event_clears_once_its_duration_elapses() {
        let mut state = WorldEventState::new();
        state.active = Some(EventKind::MeteorShower);
        state.started_at_tick = 100;
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let next = tick(state, 100 + EVENT_DURATION_TICKS, &mut rng);
        assert!(next.active.is_none());
    }

    #[test]
    fn an_active_event_stays_active_mid_duration() {
        let mut state = WorldEventState::new();
        state.active = Some(EventKind::HissSurge);
        state.started_at_tick = 100;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let next = tick(state, 100 + EVENT_DURATION_TICKS - 1, &mut rng);
        assert_eq!(next.active, Some(EventKind::HissSurge));
    }

    #[test]
    fn an_active_event_blocks_a_new_roll() {
        let mut state = WorldEventState::new();
        state.active = Some(EventKind::ResonanceCascade);
        state.started_at_tick = 100;
        state.last_event_tick = 100;
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        // Well past the cooldown and on a check boundary, but an event
        // is already running.
        let next = tick(state, 700, &mut rng);
        assert_eq!(next.active, Some(EventKind::ResonanceCascade));
    }
}
