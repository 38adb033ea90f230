//! The world store: every tile's terrain, the building (if any) placed on
//! it, and any ground-item stack sitting on it, plus dirty tracking for
//! the persistence layer.
//!
//! Tiles, buildings, and ground items are kept in separate `BTreeMap`s
//! keyed by [`TileKey`] rather than one combined per-tile struct, mirroring
//! the teacher's location/route separation -- most tiles never carry a
//! building or a ground item, so a sparse map avoids allocating for the
//! overwhelming majority of the 122,880-tile grid. Iteration order is the
//! deterministic `(face, row, col)` lexicographic order of `TileKey`'s
//! derived `Ord`, which the tick processor and persistence layer rely on
//! for reproducible processing order.

use std::collections::{BTreeMap, BTreeSet};

use spheric_types::{Building, GroundItemStack, Item, Tile, TileKey};

use crate::error::WorldError;

/// Owns every tile's terrain, building, and ground-item state for the
/// whole 30-face grid, plus the set of tiles mutated since the last
/// persistence drain.
#[derive(Debug, Default)]
pub struct WorldStore {
    tiles: BTreeMap<TileKey, Tile>,
    buildings: BTreeMap<TileKey, Building>,
    ground_items: BTreeMap<TileKey, GroundItemStack>,
    dirty: BTreeSet<TileKey>,
}

impl WorldStore {
    /// An empty store with no tiles. Callers populate it via
    /// [`WorldStore::set_tile`] during generation or world load.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a tile's terrain, marking it dirty.
    pub fn set_tile(&mut self, key: TileKey, tile: Tile) {
        self.tiles.insert(key, tile);
        self.dirty.insert(key);
    }

    /// Insert a tile without marking it dirty, for world generation: a
    /// freshly generated world has nothing to persist-on-diff yet, so the
    /// generator's complete tile set bypasses the dirty tracker entirely.
    pub fn seed_tile(&mut self, key: TileKey, tile: Tile) {
        self.tiles.insert(key, tile);
    }

    /// Mutably look up a tile's terrain without marking it dirty, for
    /// world generation's vein placement (see [`WorldStore::seed_tile`]).
    pub fn get_tile_for_seeding(&mut self, key: TileKey) -> Option<&mut Tile> {
        self.tiles.get_mut(&key)
    }

    /// Look up a tile's terrain.
    #[must_use]
    pub fn get_tile(&self, key: TileKey) -> Option<&Tile> {
        self.tiles.get(&key)
    }

    /// Mutably look up a tile's terrain, marking it dirty (used to
    /// decrement a resource deposit's remaining amount).
    pub fn get_tile_mut(&mut self, key: TileKey) -> Option<&mut Tile> {
        if self.tiles.contains_key(&key) {
            self.dirty.insert(key);
        }
        self.tiles.get_mut(&key)
    }

    /// Total number of generated tiles, for world-completeness checks.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Look up the building at a tile, if any.
    #[must_use]
    pub fn get_building(&self, key: TileKey) -> Option<&Building> {
        self.buildings.get(&key)
    }

    /// Mutably look up the building at a tile, marking it dirty. Returns
    /// `None` without marking dirty if no building is present.
    pub fn get_building_mut(&mut self, key: TileKey) -> Option<&mut Building> {
        if self.buildings.contains_key(&key) {
            self.dirty.insert(key);
        }
        self.buildings.get_mut(&key)
    }

    /// Insert a building without marking it dirty, for loading a saved
    /// world: a row just read back from `PostgreSQL` has nothing new to
    /// persist-on-diff yet (spec.md 4.H load, mirrors [`WorldStore::seed_tile`]).
    pub fn seed_building(&mut self, key: TileKey, building: Building) {
        self.buildings.insert(key, building);
    }

    /// Place a building at a tile. Fails if a building is already present.
    pub fn place_building(&mut self, key: TileKey, building: Building) -> Result<(), WorldError> {
        if self.buildings.contains_key(&key) {
            return Err(WorldError::TileOccupied(key));
        }
        self.buildings.insert(key, building);
        self.dirty.insert(key);
        Ok(())
    }

    /// Remove the building at a tile, returning it.
    pub fn remove_building(&mut self, key: TileKey) -> Result<Building, WorldError> {
        let building = self.buildings.remove(&key).ok_or(WorldError::NoBuilding(key))?;
        self.dirty.insert(key);
        Ok(building)
    }

    /// Iterate over every placed building in deterministic tile order.
    pub fn buildings(&self) -> impl Iterator<Item = (&TileKey, &Building)> {
        self.buildings.iter()
    }

    /// Number of buildings currently placed.
    #[must_use]
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// Look up the ground-item stack at a tile, if any.
    #[must_use]
    pub fn get_ground_items(&self, key: TileKey) -> Option<&GroundItemStack> {
        self.ground_items.get(&key)
    }

    /// Add `count` of `item` to the tile's ground stack, marking it dirty.
    /// A ground tile holds a single item kind at a time; if a different
    /// kind already sits there, no items are accepted and `count` is
    /// returned unchanged so the caller can route it elsewhere.
    pub fn add_ground_items(&mut self, key: TileKey, item: &Item, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        match self.ground_items.get_mut(&key) {
            Some(stack) if stack.item == *item => {
                stack.count = stack.count.saturating_add(count);
                self.dirty.insert(key);
                0
            }
            Some(_) => count,
            None => {
                self.ground_items.insert(
                    key,
                    GroundItemStack {
                        item: item.clone(),
                        count,
                    },
                );
                self.dirty.insert(key);
                0
            }
        }
    }

    /// Remove up to `max_count` items from the tile's ground stack,
    /// returning the kind and amount actually removed. Drops the entry
    /// entirely once the stack empties.
    pub fn take_ground_items(&mut self, key: TileKey, max_count: u32) -> Option<(Item, u32)> {
        let stack = self.ground_items.get_mut(&key)?;
        let taken = stack.count.min(max_count);
        stack.count -= taken;
        let item = stack.item.clone();
        if stack.count == 0 {
            self.ground_items.remove(&key);
        }
        self.dirty.insert(key);
        Some((item, taken))
    }

    /// Drain the set of tiles mutated since the last drain, for the
    /// persistence layer's dirty-set batch write.
    pub fn drain_dirty(&mut self) -> BTreeSet<TileKey> {
        std::mem::take(&mut self.dirty)
    }

    /// Number of tiles currently pending persistence.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }
}
