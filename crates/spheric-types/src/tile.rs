//! Spatial addressing: tile keys and the four cardinal directions.
//!
//! A tile key addresses one of the 30 * 64 * 64 = 122,880 tiles on the
//! rhombic triacontahedron. Unlike the UUID-based entity ids in
//! [`crate::ids`], a tile key is a deterministic, densely packed address --
//! two callers that mean "the same tile" always produce the same key.

use serde::{Deserialize, Serialize};

/// Number of faces on the rhombic triacontahedron.
pub const FACE_COUNT: u8 = 30;

/// Tile-grid side length per face.
pub const GRID_SIZE: u8 = 64;

/// Addresses a single tile: one of 30 faces, each a 64x64 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    /// Face index, `0..30`.
    pub face: u8,
    /// Row within the face, `0..64`.
    pub row: u8,
    /// Column within the face, `0..64`.
    pub col: u8,
}

impl TileKey {
    /// Construct a tile key, panicking in debug builds on out-of-range
    /// components is deliberately avoided -- callers that build keys from
    /// untrusted input should use [`TileKey::checked_new`].
    #[must_use]
    pub const fn new(face: u8, row: u8, col: u8) -> Self {
        Self { face, row, col }
    }

    /// Construct a tile key, returning `None` if any component is out of
    /// the valid range for the 30-face, 64x64 grid.
    #[must_use]
    pub const fn checked_new(face: u8, row: u8, col: u8) -> Option<Self> {
        if face < FACE_COUNT && row < GRID_SIZE && col < GRID_SIZE {
            Some(Self { face, row, col })
        } else {
            None
        }
    }

    /// The 4x4 grid of 16x16-tile "cells" this tile belongs to, used for
    /// delivery-drone range checks (spec.md 4.B).
    #[must_use]
    pub const fn cell(self) -> (u8, u8) {
        (self.row / 16, self.col / 16)
    }
}

impl core::fmt::Display for TileKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.face, self.row, self.col)
    }
}

/// One of the four cardinal directions in a tile's local basis.
///
/// Orientation values on buildings and push-resolution outputs are stored
/// as this type rather than a raw `0..4` integer, matching the spec's
/// closed enumeration discipline (spec.md 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// West, `0`.
    West,
    /// South, `1`.
    South,
    /// East, `2`.
    East,
    /// North, `3`.
    North,
}

impl Direction {
    /// All four directions in their canonical `0..4` order.
    pub const ALL: [Self; 4] = [Self::West, Self::South, Self::East, Self::North];

    /// Index into the canonical `{W,S,E,N}` basis, `0..4`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::West => 0,
            Self::South => 1,
            Self::East => 2,
            Self::North => 3,
        }
    }

    /// Build a direction from a canonical `0..4` index, wrapping modulo 4.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::West,
            1 => Self::South,
            2 => Self::East,
            _ => Self::North,
        }
    }

    /// Rotate this direction by `steps` quarter-turns (used to remap
    /// directions across face seams, spec.md 4.B).
    #[must_use]
    pub const fn rotate(self, steps: u8) -> Self {
        Self::from_index(self.index().wrapping_add(steps) % 4)
    }

    /// The opposite direction (used by the geometry-closure invariant,
    /// spec.md 8 property 10).
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.rotate(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips_through_index() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_index(d.index()), d);
        }
    }

    #[test]
    fn opposite_is_involutive() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn rotate_by_four_is_identity() {
        for d in Direction::ALL {
            assert_eq!(d.rotate(4), d);
        }
    }

    #[test]
    fn tile_key_cell_groups_16x16_blocks() {
        let a = TileKey::new(0, 0, 0);
        let b = TileKey::new(0, 15, 15);
        let c = TileKey::new(0, 16, 0);
        assert_eq!(a.cell(), b.cell());
        assert_ne!(a.cell(), c.cell());
    }

    #[test]
    fn checked_new_rejects_out_of_range() {
        assert!(TileKey::checked_new(30, 0, 0).is_none());
        assert!(TileKey::checked_new(0, 64, 0).is_none());
        assert!(TileKey::checked_new(0, 0, 64).is_none());
        assert!(TileKey::checked_new(29, 63, 63).is_some());
    }
}
