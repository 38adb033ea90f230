//! Modifier-stack composition for a building's effective rate, acceptance
//! radius, or output quantity (spec.md 4.E.4).
//!
//! Six factors multiply onto the base value in a fixed, declared order:
//! base -> shift-cycle biome modifier -> creature boost -> altered effect
//! -> object-of-power bonus -> world-event multiplier. A factor the
//! caller has nothing to contribute defaults to `1.0` rather than being
//! skipped, per spec.md 4.E.4 ("no modifier is silently ignored").

use spheric_types::EventKind;

/// The six multiplicative factors in their declared stacking order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierStack {
    /// Rate change from the current shift-cycle phase and the
    /// building's biome (e.g. solar-adjacent producers slow at night).
    pub shift_cycle_biome: f64,
    /// Boost from an assigned creature working the building.
    pub creature_boost: f64,
    /// Per-tile altered effect multiplier (spec.md 4.D, glossary).
    pub altered_effect: f64,
    /// Owner-wide object-of-power bonus for the building's clearance tier.
    pub object_of_power: f64,
    /// Active world-event multiplier, if one currently affects this
    /// building's rate class.
    pub world_event: f64,
}

impl ModifierStack {
    /// All factors at their neutral default of `1.0`.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            shift_cycle_biome: 1.0,
            creature_boost: 1.0,
            altered_effect: 1.0,
            object_of_power: 1.0,
            world_event: 1.0,
        }
    }

    fn product(self) -> f64 {
        self.shift_cycle_biome * self.creature_boost * self.altered_effect * self.object_of_power * self.world_event
    }
}

impl Default for ModifierStack {
    fn default() -> Self {
        Self::identity()
    }
}

/// `max(1, round(base_rate * product-of-modifiers))` (spec.md 4.E.4).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn effective_rate(base_rate: u32, modifiers: ModifierStack) -> u32 {
    let scaled = f64::from(base_rate) * modifiers.product();
    let rounded = scaled.round();
    if rounded < 1.0 { 1 } else { rounded as u32 }
}

/// Clearance tiers that unlock a permanent owner-wide object-of-power
/// bonus (spec.md glossary: "a permanent owner-wide multiplier unlocked
/// by completing a clearance tier").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClearanceTier {
    /// No clearance completed yet.
    None,
    /// First tier: the iron-chain scenario (spec.md 8).
    Iron,
    /// Second tier.
    Copper,
    /// Third tier.
    Titanium,
    /// Fourth, highest tier.
    Uranium,
}

/// The object-of-power bonus table, preserved verbatim by tier (DESIGN.md
/// Open Question 1: no additional tiers invented beyond what's named).
pub const OBJECT_OF_POWER_TABLE: [(ClearanceTier, f64); 5] = [
    (ClearanceTier::None, 1.0),
    (ClearanceTier::Iron, 1.05),
    (ClearanceTier::Copper, 1.10),
    (ClearanceTier::Titanium, 1.20),
    (ClearanceTier::Uranium, 1.35),
];

/// Look up an owner's object-of-power bonus for their highest completed
/// clearance tier.
#[must_use]
pub fn object_of_power_bonus(tier: ClearanceTier) -> f64 {
    OBJECT_OF_POWER_TABLE
        .iter()
        .find(|(entry, _)| *entry == tier)
        .map_or(1.0, |(_, bonus)| *bonus)
}

/// The rate class an event's multiplier applies to; a building not in
/// the affected class sees `1.0` regardless of which event is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    /// Extractor/miner yield.
    Extraction,
    /// Hiss entity spawn and movement.
    Hiss,
    /// Everything else.
    Other,
}

/// The multiplier a world event contributes to a building's rate class.
/// Buildings outside the event's affected class default to `1.0`.
#[must_use]
pub const fn world_event_multiplier(event: Option<EventKind>, class: RateClass) -> f64 {
    match (event, class) {
        (Some(EventKind::MeteorShower), RateClass::Extraction) => 1.5,
        (Some(EventKind::HissSurge), RateClass::Hiss) => 1.75,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_stack_leaves_the_base_rate_unchanged() {
        assert_eq!(effective_rate(6, ModifierStack::identity()), 6);
    }

    #[test]
    fn modifiers_compose_multiplicatively_in_declared_order() {
        let stack = ModifierStack { creature_boost: 1.5, object_of_power: 2.0, ..ModifierStack::identity() };
        assert_eq!(effective_rate(4, stack), 12);
    }

    #[test]
    fn the_effective_rate_never_rounds_down_to_zero() {
        let stack = ModifierStack { altered_effect: 0.01, ..ModifierStack::identity() };
        assert_eq!(effective_rate(1, stack), 1);
    }

    #[test]
    fn object_of_power_bonus_increases_with_tier() {
        assert!(object_of_power_bonus(ClearanceTier::Uranium) > object_of_power_bonus(ClearanceTier::Iron));
        assert!((object_of_power_bonus(ClearanceTier::None) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn world_events_only_affect_their_own_rate_class() {
        assert!((world_event_multiplier(Some(EventKind::MeteorShower), RateClass::Hiss) - 1.0).abs() < f64::EPSILON);
        assert!(world_event_multiplier(Some(EventKind::MeteorShower), RateClass::Extraction) > 1.0);
    }
}
