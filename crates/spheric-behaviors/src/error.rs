//! Error types for the `spheric-behaviors` crate.

use spheric_types::{BuildingKind, Item, TileKey};

/// Errors that can occur while ticking or feeding a building's behavior
/// state. Behavior hooks never panic; every precondition failure is a
/// typed error the caller can route into a command rejection or a
/// silently-skipped tick.
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    /// The behavior state variant did not match the building kind it was
    /// attached to (should be unreachable given how `initial_state`
    /// constructs state, but kept as a typed guard rather than a panic).
    #[error("building {0} has a behavior state mismatched with its kind")]
    StateKindMismatch(TileKey),

    /// An arm's source/destination pair exceeded Manhattan distance 2.
    #[error("arm at {0} has a source/destination pair farther than 2 tiles apart")]
    ArmRangeExceeded(TileKey),

    /// No recipe matches the item about to be accepted into a slot.
    #[error("item {item:?} has no recipe accepting it at {tile}")]
    NoMatchingRecipe {
        /// The building being fed.
        tile: TileKey,
        /// The item that found no matching recipe.
        item: Item,
    },

    /// The building kind does not support the requested operation
    /// (e.g. feeding `try_accept_item` to a kind with only a single
    /// `input_buffer`).
    #[error("building kind {0:?} does not support this operation")]
    UnsupportedKind(BuildingKind),
}
