//! Error types for the `spheric-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use spheric_types::{BuildingKind, PlayerId, TileKey};

/// Errors that can occur during world-store operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A tile key fell outside the 30 x 64 x 64 grid.
    #[error("tile out of range: {0}")]
    TileOutOfRange(TileKey),

    /// The tile already has a building on it.
    #[error("tile {0} is already occupied")]
    TileOccupied(TileKey),

    /// No building exists at the given tile.
    #[error("no building at tile {0}")]
    NoBuilding(TileKey),

    /// The building at the tile is not owned by the given player.
    #[error("tile {tile} is not owned by {owner}")]
    NotOwner {
        /// The tile in question.
        tile: TileKey,
        /// The player who attempted the operation.
        owner: PlayerId,
    },

    /// The building kind is not valid for the requested operation.
    #[error("building kind {0:?} is not valid here")]
    InvalidKind(BuildingKind),

    /// The ground-item stack at a tile has no room for an additional item.
    #[error("ground item stack at {0} is full")]
    GroundStackFull(TileKey),

    /// Arithmetic overflow during a checked world-store operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
