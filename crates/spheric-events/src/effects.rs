//! Per-kind world-event effects outside the building rate-modifier stack
//! (spec.md 4.G).
//!
//! Building rate/radius/output effects (extraction yield, hiss spawn
//! rate) go through `spheric-behaviors::modifiers::world_event_multiplier`
//! as the world-event factor in the modifier stack (spec.md 4.E.4) --
//! this module does not duplicate those. It covers the two effects that
//! sit outside that stack: a creature-spawn boost (not a building rate)
//! and the resonance cascade's extra push-resolution hop count (a
//! structural effect, not a multiplier).

use spheric_types::EventKind;

/// Non-building-rate effects a world event applies while active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventEffects {
    /// Multiplier on wild creature spawn rate.
    pub creature_spawn_multiplier: f64,
    /// Extra downstream tiles the shifting-anchor altered effect skips
    /// (spec.md 4.E.2), on top of its normal 1-tile skip.
    pub resonance_extra_hops: u8,
}

impl EventEffects {
    /// Neutral baseline: no event active.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            creature_spawn_multiplier: 1.0,
            resonance_extra_hops: 0,
        }
    }
}

/// The non-rate-stack effects an active event applies, or the neutral
/// baseline if `kind` is `None`.
#[must_use]
pub fn effects_for(kind: Option<EventKind>) -> EventEffects {
    let Some(kind) = kind else {
        return EventEffects::neutral();
    };

    let mut effects = EventEffects::neutral();
    match kind {
        EventKind::ResonanceCascade => effects.resonance_extra_hops = 1,
        EventKind::EntityMigration => effects.creature_spawn_multiplier = 2.0,
        // HissSurge and MeteorShower only affect building rates, handled
        // by `spheric_behaviors::modifiers::world_event_multiplier`; a
        // meteor shower additionally spawns ground debris (`crate::debris`).
        EventKind::HissSurge | EventKind::MeteorShower => {}
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_event_is_neutral() {
        assert_eq!(effects_for(None), EventEffects::neutral());
    }

    #[test]
    fn entity_migration_boosts_creature_spawn_only() {
        let effects = effects_for(Some(EventKind::EntityMigration));
        assert!(effects.creature_spawn_multiplier > 1.0);
        assert_eq!(effects.resonance_extra_hops, 0);
    }

    #[test]
    fn resonance_cascade_grants_one_extra_hop() {
        let effects = effects_for(Some(EventKind::ResonanceCascade));
        assert_eq!(effects.resonance_extra_hops, 1);
        assert_eq!(effects.creature_spawn_multiplier, 1.0);
    }

    #[test]
    fn hiss_surge_and_meteor_shower_are_neutral_here() {
        assert_eq!(effects_for(Some(EventKind::HissSurge)), EventEffects::neutral());
        assert_eq!(effects_for(Some(EventKind::MeteorShower)), EventEffects::neutral());
    }
}
