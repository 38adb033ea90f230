//! Command API types: requests collaborators issue into the core
//! (spec.md 6.1) and the typed errors command handlers return.

use serde::{Deserialize, Serialize};

use crate::enums::{BuildingKind, Item, UpgradeKind};
use crate::ids::{PlayerId, TradeId};
use crate::tile::{Direction, TileKey};

/// A command issued by a collaborator (player client, operator console)
/// into the core (spec.md 6.1). Command handlers return a typed error
/// and never mutate state on failure (spec.md 7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Place a single building.
    Place {
        /// Target tile.
        key: TileKey,
        /// Building kind to place.
        kind: BuildingKind,
        /// Facing orientation.
        orientation: Direction,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Place many buildings in one call; each element resolves
    /// independently (spec.md 6.1).
    PlaceBatch {
        /// Placements to attempt, in order.
        placements: Vec<PlacementRequest>,
    },
    /// Remove the building at `key`, if owned by `owner`.
    Remove {
        /// Target tile.
        key: TileKey,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Link two underground-conduit tiles into a teleport pair.
    LinkConduit {
        /// First conduit tile.
        a: TileKey,
        /// Second conduit tile.
        b: TileKey,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Link a trade terminal to a trade record.
    LinkTrade {
        /// Trade-terminal tile.
        key: TileKey,
        /// Trade record to link.
        trade_id: TradeId,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Eject the contents of a building onto the ground.
    Eject {
        /// Target tile.
        key: TileKey,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Toggle whether a building participates in power resolution.
    TogglePower {
        /// Target tile.
        key: TileKey,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Purchase an upgrade for the building at `key` (a drone bay for
    /// cargo/autonomy upgrades, an arm for the stack upgrade).
    SelectUpgrade {
        /// Target building tile.
        key: TileKey,
        /// Upgrade to purchase.
        upgrade: UpgradeKind,
        /// Issuing player.
        owner: PlayerId,
    },
    /// Submit accumulated research progress toward the board-contact win
    /// condition.
    ActivateBoardContact {
        /// Issuing player.
        owner: PlayerId,
    },
}

/// One element of a [`Command::PlaceBatch`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Target tile.
    pub key: TileKey,
    /// Building kind to place.
    pub kind: BuildingKind,
    /// Facing orientation.
    pub orientation: Direction,
    /// Issuing player.
    pub owner: PlayerId,
}

/// The typed error kinds command handlers may return (spec.md 7).
///
/// Behaviours themselves never fail (they are total functions that make
/// no progress when preconditions are unmet); these errors are strictly
/// for the synchronous command-handling surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandError {
    /// The target tile already holds a building.
    TileOccupied,
    /// The tile key does not address a real tile.
    InvalidTile,
    /// The building kind cannot be placed here (e.g. a miner off-resource).
    InvalidPlacement,
    /// The building kind does not exist or is not placeable directly.
    InvalidKind,
    /// The issuing player's research clearance does not permit this.
    NoClearance,
    /// The tile falls within another owner's territory.
    TerritoryViolation,
    /// No building exists at the target tile.
    NoBuilding,
    /// The issuing player does not own the target building.
    NotOwner,
    /// The conduit tile is not an underground conduit.
    NotConduit,
    /// The conduit is already linked to a partner.
    AlreadyLinked,
    /// The upgrade has already been purchased.
    AlreadyPurchased,
    /// Not enough items were available to complete the command.
    InsufficientResources,
}

/// Result alias for command handlers.
pub type CommandResult<T = ()> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_serializes_with_tag() {
        let command = Command::Remove {
            key: TileKey::new(0, 1, 1),
            owner: PlayerId::new(),
        };
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["command"], "remove");
    }

    #[test]
    fn command_error_round_trips() {
        let json = serde_json::to_string(&CommandError::TileOccupied).expect("serialize");
        assert_eq!(json, "\"tile_occupied\"");
    }
}
