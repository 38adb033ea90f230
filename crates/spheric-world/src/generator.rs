//! Seed-deterministic world generation: terrain, biome banding, and
//! resource-vein placement.
//!
//! Given a world seed, produces the complete 122,880-tile set in four
//! steps: bucket each face into a latitude-derived biome band with a
//! seeded jitter, draw each tile's terrain from a biome-weighted
//! distribution, scatter ore veins per face with biome-conditional
//! weights, and hand the finished tile set to the [`crate::store::WorldStore`].
//! The generator never touches behavior state -- buildings are placed
//! later, by players or the tick processor.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use spheric_geometry::face_latitude;
use spheric_types::{Biome, FACE_COUNT, GRID_SIZE, ResourceDeposit, ResourceKind, Tile, TileKey};

use crate::determinism::{streams, sub_rng};
use crate::store::WorldStore;

/// Number of ore veins seeded on each face.
const VEINS_PER_FACE: u32 = 3;

/// Per-vein total resource units, before being spread across its tiles.
const VEIN_UNITS_MIN: u16 = 100;
const VEIN_UNITS_MAX: u16 = 500;

/// Number of tiles a single vein is spread across.
const VEIN_TILES_MIN: u8 = 5;
const VEIN_TILES_MAX: u8 = 20;

/// Fraction (out of 100) of a tile's terrain that matches its face's
/// base biome; the remainder draws from a latitude-adjacent biome.
const FACE_BIOME_WEIGHT_PERCENT: u32 = 70;

/// Assigns the base biome for a face from its latitude, matching
/// spec.md's banding thresholds.
fn base_biome_for_latitude(latitude: f64) -> Biome {
    if latitude > 0.7 {
        Biome::Tundra
    } else if latitude > 0.3 {
        Biome::Forest
    } else if latitude > -0.3 {
        Biome::Grassland
    } else if latitude > -0.7 {
        Biome::Desert
    } else {
        Biome::Volcanic
    }
}

/// The biome adjacent to `biome` in latitude order, used as the minority
/// terrain draw and the jitter target. Saturates at the poles.
fn adjacent_biome(biome: Biome, toward_pole: bool) -> Biome {
    let index = Biome::ALL.iter().position(|b| *b == biome).unwrap_or(0);
    let next = if toward_pole {
        index.saturating_sub(1)
    } else {
        (index + 1).min(Biome::ALL.len() - 1)
    };
    Biome::ALL.get(next).copied().unwrap_or(biome)
}

/// Per-biome resource weights used to bias vein-kind selection (spec.md
/// 4.C: "tundra favours ice and iron; volcanic favours sulfur and
/// uranium"). Each entry is `(kind, weight)`; weights need not sum to a
/// fixed total, only to be compared relative to each other.
fn vein_weights(biome: Biome) -> [(ResourceKind, u32); 8] {
    match biome {
        Biome::Tundra => [
            (ResourceKind::Ice, 30),
            (ResourceKind::Iron, 25),
            (ResourceKind::Copper, 10),
            (ResourceKind::Quartz, 10),
            (ResourceKind::Titanium, 10),
            (ResourceKind::Oil, 5),
            (ResourceKind::Sulfur, 5),
            (ResourceKind::Uranium, 5),
        ],
        Biome::Forest => [
            (ResourceKind::Iron, 25),
            (ResourceKind::Copper, 20),
            (ResourceKind::Quartz, 15),
            (ResourceKind::Oil, 15),
            (ResourceKind::Titanium, 10),
            (ResourceKind::Ice, 5),
            (ResourceKind::Sulfur, 5),
            (ResourceKind::Uranium, 5),
        ],
        Biome::Grassland => [
            (ResourceKind::Iron, 25),
            (ResourceKind::Copper, 25),
            (ResourceKind::Oil, 15),
            (ResourceKind::Quartz, 15),
            (ResourceKind::Titanium, 10),
            (ResourceKind::Ice, 5),
            (ResourceKind::Sulfur, 3),
            (ResourceKind::Uranium, 2),
        ],
        Biome::Desert => [
            (ResourceKind::Copper, 25),
            (ResourceKind::Quartz, 25),
            (ResourceKind::Titanium, 15),
            (ResourceKind::Oil, 15),
            (ResourceKind::Iron, 10),
            (ResourceKind::Sulfur, 5),
            (ResourceKind::Uranium, 5),
            (ResourceKind::Ice, 0),
        ],
        Biome::Volcanic => [
            (ResourceKind::Sulfur, 30),
            (ResourceKind::Uranium, 25),
            (ResourceKind::Titanium, 20),
            (ResourceKind::Iron, 10),
            (ResourceKind::Copper, 10),
            (ResourceKind::Quartz, 5),
            (ResourceKind::Oil, 0),
            (ResourceKind::Ice, 0),
        ],
    }
}

fn weighted_choice(rng: &mut ChaCha8Rng, weights: &[(ResourceKind, u32); 8]) -> ResourceKind {
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return ResourceKind::Iron;
    }
    let mut roll = rng.random_range(0..total);
    for (kind, weight) in weights {
        if roll < *weight {
            return *kind;
        }
        roll -= weight;
    }
    weights.first().map(|(kind, _)| *kind).unwrap_or(ResourceKind::Iron)
}

/// Generates the complete tile set for `seed` and loads it into `store`.
/// The store is expected to be freshly created; tiles are inserted
/// without marking them dirty, since a freshly generated world has
/// nothing to persist-on-diff yet.
pub fn generate_world(seed: u64, store: &mut WorldStore) {
    for face in 0..FACE_COUNT {
        generate_face(seed, face, store);
    }
}

fn generate_face(seed: u64, face: u8, store: &mut WorldStore) {
    let latitude = face_latitude(face);
    let mut jitter_rng = sub_rng(seed, streams::WORLD_GENERATION, u64::from(face));
    let jitter: f64 = jitter_rng.random_range(-0.05_f64..0.05_f64);
    let face_biome = base_biome_for_latitude(latitude + jitter);
    let minority_biome = adjacent_biome(face_biome, latitude > 0.0);

    let mut terrain_rng = sub_rng(
        seed,
        streams::WORLD_GENERATION,
        u64::from(face) ^ 0x1111_0000,
    );
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let roll: u32 = terrain_rng.random_range(0..100);
            let terrain = if roll < FACE_BIOME_WEIGHT_PERCENT {
                face_biome
            } else {
                minority_biome
            };
            let key = TileKey::new(face, row, col);
            store.seed_tile(key, Tile { terrain, resource: None });
        }
    }

    let mut vein_rng = sub_rng(seed, streams::WORLD_GENERATION, u64::from(face) ^ 0x2222_0000);
    for _ in 0..VEINS_PER_FACE {
        seed_vein(store, face, face_biome, &mut vein_rng);
    }
}

fn seed_vein(store: &mut WorldStore, face: u8, biome: Biome, rng: &mut ChaCha8Rng) {
    let kind = weighted_choice(rng, &vein_weights(biome));
    let total_units = rng.random_range(VEIN_UNITS_MIN..=VEIN_UNITS_MAX);
    let tile_count = rng.random_range(VEIN_TILES_MIN..=VEIN_TILES_MAX);

    let centre = TileKey::new(
        face,
        rng.random_range(0..GRID_SIZE),
        rng.random_range(0..GRID_SIZE),
    );

    let tiles = scatter_from_centre(centre, tile_count, rng);
    let per_tile = total_units / u16::from(tile_count.max(1));
    let mut remainder = total_units % u16::from(tile_count.max(1));

    for tile in tiles {
        let mut amount = per_tile;
        if remainder > 0 {
            amount += 1;
            remainder -= 1;
        }
        if amount == 0 {
            continue;
        }
        if let Some(existing) = store.get_tile(tile)
            && existing.resource.is_some()
        {
            continue;
        }
        if let Some(existing) = store.get_tile_for_seeding(tile) {
            existing.resource = Some(ResourceDeposit { kind, amount });
        }
    }
}

/// A short random walk from `centre` of length `tile_count`, used to
/// scatter a vein's units across a cluster of tiles within the same
/// face. Never leaves the originating face (mirrors spec.md 4.C's
/// per-face vein placement).
fn scatter_from_centre(centre: TileKey, tile_count: u8, rng: &mut ChaCha8Rng) -> Vec<TileKey> {
    let mut tiles = Vec::with_capacity(tile_count as usize);
    let mut current = centre;
    tiles.push(current);
    for _ in 1..tile_count {
        let row_delta: i16 = rng.random_range(-2..=2);
        let col_delta: i16 = rng.random_range(-2..=2);
        let row = i16::from(current.row).saturating_add(row_delta).clamp(0, i16::from(GRID_SIZE - 1));
        let col = i16::from(current.col).saturating_add(col_delta).clamp(0, i16::from(GRID_SIZE - 1));
        let next = TileKey::new(
            current.face,
            u8::try_from(row).unwrap_or(current.row),
            u8::try_from(col).unwrap_or(current.col),
        );
        tiles.push(next);
        current = next;
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_fully_deterministic() {
        let mut store_a = WorldStore::new();
        let mut store_b = WorldStore::new();
        generate_world(42, &mut store_a);
        generate_world(42, &mut store_b);
        for face in 0..FACE_COUNT {
            for row in [0, 17, 63] {
                for col in [0, 17, 63] {
                    let key = TileKey::new(face, row, col);
                    assert_eq!(store_a.get_tile(key), store_b.get_tile(key));
                }
            }
        }
    }

    #[test]
    fn different_seeds_diverge_somewhere() {
        let mut store_a = WorldStore::new();
        let mut store_b = WorldStore::new();
        generate_world(1, &mut store_a);
        generate_world(2, &mut store_b);
        let mut any_diff = false;
        for face in 0..FACE_COUNT {
            for row in 0..GRID_SIZE {
                for col in 0..GRID_SIZE {
                    let key = TileKey::new(face, row, col);
                    if store_a.get_tile(key) != store_b.get_tile(key) {
                        any_diff = true;
                    }
                }
            }
        }
        assert!(any_diff, "two different seeds produced an identical world");
    }

    #[test]
    fn every_tile_on_every_face_is_generated() {
        let mut store = WorldStore::new();
        generate_world(7, &mut store);
        assert_eq!(store.tile_count(), usize::from(FACE_COUNT) * usize::from(GRID_SIZE) * usize::from(GRID_SIZE));
    }

    #[test]
    fn polar_faces_trend_toward_tundra_or_volcanic() {
        let mut store = WorldStore::new();
        generate_world(9, &mut store);
        let key = TileKey::new(0, 32, 32);
        let terrain = store.get_tile(key).expect("generated").terrain;
        assert!(matches!(terrain, Biome::Tundra | Biome::Forest));
    }

    #[test]
    fn generated_tiles_are_not_marked_dirty() {
        let mut store = WorldStore::new();
        generate_world(3, &mut store);
        assert_eq!(store.dirty_count(), 0);
    }

    #[test]
    fn veins_place_resources_with_nonzero_amounts() {
        let mut store = WorldStore::new();
        generate_world(11, &mut store);
        let mut any_resource = false;
        for face in 0..FACE_COUNT {
            for row in 0..GRID_SIZE {
                for col in 0..GRID_SIZE {
                    let key = TileKey::new(face, row, col);
                    if let Some(tile) = store.get_tile(key)
                        && let Some(deposit) = &tile.resource
                    {
                        any_resource = true;
                        assert!(deposit.amount > 0);
                    }
                }
            }
        }
        assert!(any_resource, "no resource veins were placed anywhere");
    }
}
