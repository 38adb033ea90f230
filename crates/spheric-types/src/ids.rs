//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Non-spatial entities get a strongly-typed, time-ordered UUID v7 id so
//! the compiler rejects mixing a creature id where a drone id is expected.
//! Spatial addresses (tiles, buildings) are *not* identified this way --
//! see [`crate::tile::TileKey`], which is a deterministic dense address,
//! not a randomly generated identifier.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a wild or captured creature.
    CreatureId
}

define_id! {
    /// Unique identifier for a hiss entity.
    HissId
}

define_id! {
    /// Unique identifier for a delivery drone.
    DroneId
}

define_id! {
    /// Unique identifier for a player/owner.
    PlayerId
}

define_id! {
    /// Unique identifier for a trade record.
    TradeId
}

define_id! {
    /// Unique identifier for a jurisdiction-beacon territory claim.
    TerritoryId
}

define_id! {
    /// Unique identifier for a world-event occurrence (history entries).
    WorldEventId
}

define_id! {
    /// Unique identifier for a ledger entry.
    LedgerEntryId
}
