//! Corruption spread and purification decay (spec.md 4.G).
//!
//! A corruption tile with intensity `i >= 2` has probability `i/20` of
//! incrementing a random neighbour's intensity, clamped to
//! [`CORRUPTION_MAX`]. Tiles absent from [`CorruptionField`] carry an
//! implicit intensity of zero and are never spread from or to directly
//! (a spread only ever increments an *existing* entry or inserts a new
//! one at intensity 1).

use rand::Rng;
use spheric_geometry::neighbor;
use spheric_types::{CorruptionField, Direction, TileKey};

/// Ceiling on a tile's corruption intensity.
pub const CORRUPTION_MAX: u8 = 10;

/// Intensity at or above which a tile can spread to a neighbour.
pub const SPREAD_THRESHOLD: u8 = 2;

/// Intensity at or above which a tile is eligible to spawn a hiss entity.
pub const HISS_SPAWN_THRESHOLD: u8 = 8;

fn random_direction(rng: &mut impl Rng) -> Direction {
    match rng.random_range(0..4u8) {
        0 => Direction::West,
        1 => Direction::South,
        2 => Direction::East,
        _ => Direction::North,
    }
}

/// Roll one spread attempt per eligible tile, mutating a copy of the
/// field and returning it. Iteration is over a stable snapshot (the
/// field passed in) so a tile spread to in this pass cannot itself
/// spread again in the same pass.
#[must_use]
pub fn spread(field: &CorruptionField, rng: &mut impl Rng) -> CorruptionField {
    let mut next = field.clone();
    for (&tile, &intensity) in field {
        if intensity < SPREAD_THRESHOLD {
            continue;
        }
        let roll: f64 = rng.random_range(0.0..1.0);
        let probability = f64::from(intensity) / 20.0;
        if roll >= probability {
            continue;
        }
        let (target, _) = neighbor(tile, random_direction(rng));
        next.entry(target)
            .and_modify(|i| *i = i.saturating_add(1).min(CORRUPTION_MAX))
            .or_insert(1);
    }
    next
}

/// Apply purification/stabilizer decay: every tile within any of the
/// given `(center, radius)` pairs, same face only, loses 1 intensity.
/// Tiles that decay to zero are removed from the field.
#[must_use]
pub fn purify(field: &CorruptionField, purifiers: &[(TileKey, u8)]) -> CorruptionField {
    field
        .iter()
        .filter_map(|(&tile, &intensity)| {
            let in_range = purifiers
                .iter()
                .any(|&(center, radius)| center.face == tile.face && manhattan(center, tile) <= u32::from(radius));
            let reduced = if in_range { intensity.saturating_sub(1) } else { intensity };
            (reduced > 0).then_some((tile, reduced))
        })
        .collect()
}

fn manhattan(a: TileKey, b: TileKey) -> u32 {
    u32::from(a.row.abs_diff(b.row)) + u32::from(a.col.abs_diff(b.col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand::SeedableRng;

    #[test]
    fn a_tile_below_the_spread_threshold_never_spreads() {
        let mut field = CorruptionField::new();
        field.insert(TileKey::new(0, 10, 10), 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let next = spread(&field, &mut rng);
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn a_fully_saturated_tile_eventually_spreads_to_a_neighbor() {
        let mut field = CorruptionField::new();
        let source = TileKey::new(0, 10, 10);
        field.insert(source, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut spread_count = 0;
        let mut current = field;
        for _ in 0..50 {
            current = spread(&current, &mut rng);
            if current.len() > 1 {
                spread_count += 1;
            }
        }
        assert!(spread_count > 0);
    }

    #[test]
    fn intensity_never_exceeds_the_maximum() {
        let mut field = CorruptionField::new();
        let source = TileKey::new(0, 10, 10);
        let (target, _) = neighbor(source, Direction::East);
        field.insert(source, 10);
        field.insert(target, CORRUPTION_MAX);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            field = spread(&field, &mut rng);
        }
        assert!(field.get(&target).copied().unwrap_or(0) <= CORRUPTION_MAX);
    }

    #[test]
    fn purification_decays_tiles_within_radius_and_leaves_others_alone() {
        let mut field = CorruptionField::new();
        let near = TileKey::new(0, 10, 10);
        let far = TileKey::new(0, 40, 40);
        field.insert(near, 3);
        field.insert(far, 3);
        let purifiers = [(TileKey::new(0, 10, 10), 2u8)];
        let next = purify(&field, &purifiers);
        assert_eq!(next.get(&near).copied(), Some(2));
        assert_eq!(next.get(&far).copied(), Some(3));
    }

    #[test]
    fn purification_removes_a_tile_once_it_reaches_zero() {
        let mut field = CorruptionField::new();
        let tile = TileKey::new(0, 5, 5);
        field.insert(tile, 1);
        let purifiers = [(tile, 0u8)];
        let next = purify(&field, &purifiers);
        assert!(!next.contains_key(&tile));
    }

    #[test]
    fn purification_never_crosses_a_face_boundary() {
        let mut field = CorruptionField::new();
        let tile = TileKey::new(1, 5, 5);
        field.insert(tile, 3);
        let purifiers = [(TileKey::new(0, 5, 5), 255u8)];
        let next = purify(&field, &purifiers);
        assert_eq!(next.get(&tile).copied(), Some(3));
    }
}
