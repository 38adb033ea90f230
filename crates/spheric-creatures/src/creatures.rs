//! Wild creature spawn and movement (spec.md 4.G).
//!
//! Spawn runs every 25 ticks, one attempt per face, capped at
//! [`CAP_PER_FACE`]. Movement runs every 5 ticks: each wild creature steps
//! to one of its four neighbours, chosen uniformly. Captured creatures do
//! not move and are out of scope for this module entirely.

use rand::Rng;
use spheric_geometry::neighbor;
use spheric_types::{CreatureId, CreatureKind, Direction, TileKey, WildCreature};

/// Per-face cap on wild creatures (spec.md 6 config defaults).
pub const CAP_PER_FACE: usize = 8;

/// Ticks a wild creature survives before despawning if never captured.
/// Not given a number in the source material (spec.md 3.2 names only
/// "a TTL" without stating it); chosen as ten full shift cycles so a
/// creature that spawns at dawn has a generous chance to be found and
/// captured before it expires.
pub const DESPAWN_TTL_TICKS: u64 = 24_000;

fn random_kind(rng: &mut impl Rng) -> CreatureKind {
    match rng.random_range(0..6u8) {
        0 => CreatureKind::Skitterling,
        1 => CreatureKind::Plodder,
        2 => CreatureKind::Wisp,
        3 => CreatureKind::Ranger,
        4 => CreatureKind::Bulwark,
        _ => CreatureKind::Prism,
    }
}

fn random_direction(rng: &mut impl Rng) -> Direction {
    match rng.random_range(0..4u8) {
        0 => Direction::West,
        1 => Direction::South,
        2 => Direction::East,
        _ => Direction::North,
    }
}

/// Attempt to spawn one creature on `face`, unless it is already at cap.
#[must_use]
pub fn spawn_roll(
    face: u8,
    existing_on_face: usize,
    spawn_tile: TileKey,
    spawned_at_tick: u64,
    rng: &mut impl Rng,
) -> Option<WildCreature> {
    if existing_on_face >= CAP_PER_FACE || spawn_tile.face != face {
        return None;
    }
    Some(WildCreature {
        id: CreatureId::new(),
        kind: random_kind(rng),
        position: spawn_tile,
        spawned_at_tick,
    })
}

/// Move a wild creature uniformly into one of its four neighbours.
#[must_use]
pub fn step(creature: WildCreature, rng: &mut impl Rng) -> WildCreature {
    let (position, _) = neighbor(creature.position, random_direction(rng));
    WildCreature { position, ..creature }
}

/// Whether a wild creature has outlived its despawn TTL.
#[must_use]
pub const fn has_expired(creature: &WildCreature, current_tick: u64) -> bool {
    current_tick.saturating_sub(creature.spawned_at_tick) >= DESPAWN_TTL_TICKS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn spawn_is_refused_once_the_face_is_at_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spawned = spawn_roll(0, CAP_PER_FACE, TileKey::new(0, 1, 1), 0, &mut rng);
        assert!(spawned.is_none());
    }

    #[test]
    fn spawn_succeeds_below_cap_and_lands_on_the_requested_tile() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let tile = TileKey::new(5, 3, 3);
        let spawned = spawn_roll(5, 0, tile, 100, &mut rng).expect("spawn below cap");
        assert_eq!(spawned.position, tile);
        assert_eq!(spawned.spawned_at_tick, 100);
    }

    #[test]
    fn spawn_is_refused_if_the_tile_is_on_the_wrong_face() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spawned = spawn_roll(5, 0, TileKey::new(6, 3, 3), 100, &mut rng);
        assert!(spawned.is_none());
    }

    #[test]
    fn step_always_moves_to_an_adjacent_tile() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let creature = WildCreature {
            id: CreatureId::new(),
            kind: CreatureKind::Skitterling,
            position: TileKey::new(0, 10, 10),
            spawned_at_tick: 0,
        };
        let moved = step(creature, &mut rng);
        let manhattan = moved.position.row.abs_diff(creature.position.row)
            + moved.position.col.abs_diff(creature.position.col);
        assert!(moved.position.face != creature.position.face || manhattan == 1);
    }

    #[test]
    fn a_creature_expires_once_its_ttl_elapses() {
        let creature = WildCreature {
            id: CreatureId::new(),
            kind: CreatureKind::Wisp,
            position: TileKey::new(0, 0, 0),
            spawned_at_tick: 0,
        };
        assert!(!has_expired(&creature, DESPAWN_TTL_TICKS - 1));
        assert!(has_expired(&creature, DESPAWN_TTL_TICKS));
    }
}
