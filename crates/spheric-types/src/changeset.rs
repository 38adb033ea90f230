//! Per-face change-set broadcast payloads, emitted from the core to
//! subscribers once per tick (spec.md 6.2).
//!
//! Change-sets are structurally stable and may be sent over any ordered
//! transport; subscribers reconcile drops via an initial full snapshot
//! (spec.md 9 design note on per-face bounded channels).

use serde::{Deserialize, Serialize};

use crate::enums::{BuildingKind, CreatureKind, EventKind, Item};
use crate::ids::{CreatureId, HissId, PlayerId, TerritoryId};
use crate::tile::{Direction, TileKey};

/// A building newly placed and now visible to subscribers of its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlacedDelta {
    /// Placed tile.
    pub key: TileKey,
    /// Building kind.
    pub kind: BuildingKind,
    /// Facing orientation.
    pub orientation: Direction,
    /// Owning player.
    pub owner: PlayerId,
}

/// A building removed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRemovedDelta {
    /// Tile the building occupied.
    pub key: TileKey,
}

/// One item observed moving between two adjacent tiles this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInFlight {
    /// Origin tile.
    pub from_key: TileKey,
    /// Destination tile.
    pub to_key: TileKey,
    /// Item kind in transit.
    pub item: Item,
}

/// A tile whose corruption intensity changed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptionDelta {
    /// Affected tile.
    pub key: TileKey,
    /// New intensity, `0..=10` (spec.md 6.4 `corruption_max`).
    pub intensity: u8,
}

/// A hiss entity's observable state changed (moved, spawned, or died).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HissDelta {
    /// Entity identifier.
    pub id: HissId,
    /// Current tile, present unless the entity was defeated this tick.
    pub position: Option<TileKey>,
    /// Remaining hit points, `0` meaning defeated and removed.
    pub hp: u16,
}

/// A creature's observable state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureDelta {
    /// Entity identifier.
    pub id: CreatureId,
    /// Creature kind.
    pub kind: CreatureKind,
    /// Current tile, present unless the creature was captured or despawned.
    pub position: Option<TileKey>,
}

/// A territory claim was created, resized, or revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryDelta {
    /// Territory identifier.
    pub id: TerritoryId,
    /// Owning player.
    pub owner: PlayerId,
    /// Beacon tile, present unless the territory was revoked.
    pub center: Option<TileKey>,
    /// Claim radius.
    pub radius: u8,
}

/// A world event started, continued, or ended this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEventDelta {
    /// Event kind.
    pub kind: EventKind,
    /// Whether the event is active after this tick.
    pub active: bool,
}

/// The full per-face broadcast emitted once per tick (spec.md 6.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// The tick this change-set was produced for.
    pub tick: u64,
    /// The face this change-set covers.
    pub face: u8,
    /// Buildings placed this tick.
    pub buildings_placed: Vec<BuildingPlacedDelta>,
    /// Buildings removed this tick.
    pub buildings_removed: Vec<BuildingRemovedDelta>,
    /// Items observed moving between tiles this tick.
    pub items_in_flight: Vec<ItemInFlight>,
    /// Corruption intensity changes this tick.
    pub corruption_delta: Vec<CorruptionDelta>,
    /// Hiss entity changes this tick.
    pub hiss_delta: Vec<HissDelta>,
    /// Creature changes this tick.
    pub creature_delta: Vec<CreatureDelta>,
    /// Territory changes this tick.
    pub territory_delta: Vec<TerritoryDelta>,
}

impl ChangeSet {
    /// An empty change-set for `face` at `tick`, used as the starting
    /// accumulator during tick processing.
    #[must_use]
    pub fn empty(tick: u64, face: u8) -> Self {
        Self {
            tick,
            face,
            buildings_placed: Vec::new(),
            buildings_removed: Vec::new(),
            items_in_flight: Vec::new(),
            corruption_delta: Vec::new(),
            hiss_delta: Vec::new(),
            creature_delta: Vec::new(),
            territory_delta: Vec::new(),
        }
    }

    /// Whether this change-set carries no observable deltas at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings_placed.is_empty()
            && self.buildings_removed.is_empty()
            && self.items_in_flight.is_empty()
            && self.corruption_delta.is_empty()
            && self.hiss_delta.is_empty()
            && self.creature_delta.is_empty()
            && self.territory_delta.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_change_set_has_no_deltas() {
        let cs = ChangeSet::empty(42, 3);
        assert!(cs.is_empty());
        assert_eq!(cs.tick, 42);
        assert_eq!(cs.face, 3);
    }

    #[test]
    fn change_set_with_a_delta_is_not_empty() {
        let mut cs = ChangeSet::empty(1, 0);
        cs.buildings_removed.push(BuildingRemovedDelta {
            key: TileKey::new(0, 0, 0),
        });
        assert!(!cs.is_empty());
    }
}
