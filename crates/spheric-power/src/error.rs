//! Error types for the `spheric-power` crate.

use spheric_types::TileKey;

/// Errors that can occur while resolving power networks.
#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    /// A node was submitted twice for the same tile.
    #[error("duplicate power node at {0}")]
    DuplicateNode(TileKey),
}
