//! Static spatial topology for the 30-face rhombic triacontahedron tile
//! grid: face adjacency, seam crossing, and tile-to-tile stepping.
//!
//! # Modules
//!
//! - [`topology`] -- the static, once-built face-adjacency table
//! - [`neighbor`] -- the public `neighbor(key, dir)` stepping function
//! - [`embedding`] -- per-face latitude, for world generation's biome bands

pub mod embedding;
pub mod neighbor;
pub mod topology;

pub use embedding::face_latitude;
pub use neighbor::neighbor;
pub use spheric_types::{Direction, TileKey, FACE_COUNT, GRID_SIZE};
