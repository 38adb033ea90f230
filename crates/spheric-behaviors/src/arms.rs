//! Loader/unloader arm behavior (spec.md 4.D.4): pulls one item per tick
//! (more with a stack upgrade) from a source tile into a destination
//! tile, both on the same face and within Manhattan distance 2.

use spheric_types::{ArmState, TileKey};

use crate::error::BehaviorError;

/// Manhattan distance between two tile keys on the same face. Returns
/// `None` if the keys are on different faces -- arms never reach across
/// a face seam (spec.md 4.D.4).
#[must_use]
pub fn manhattan_distance(a: TileKey, b: TileKey) -> Option<u16> {
    if a.face != b.face {
        return None;
    }
    let row_delta = u16::from(a.row.abs_diff(b.row));
    let col_delta = u16::from(a.col.abs_diff(b.col));
    Some(row_delta + col_delta)
}

/// Validate an arm's source/destination pair against the range limit,
/// returning a typed error instead of constructing an out-of-range arm.
pub fn validate_range(arm: ArmState, tile: TileKey) -> Result<ArmState, BehaviorError> {
    match manhattan_distance(arm.source, arm.destination) {
        Some(distance) if distance <= 2 => Ok(arm),
        _ => Err(BehaviorError::ArmRangeExceeded(tile)),
    }
}

/// Items transferred per tick: one, or two with the stack upgrade
/// (spec.md 4.D.4: "Transfers one item per tick (or more with
/// `stack_upgrade`)").
#[must_use]
pub const fn transfer_rate(arm: ArmState) -> u32 {
    if arm.stack_upgrade { 2 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_within_range_is_accepted() {
        let arm = ArmState {
            source: TileKey::new(0, 10, 10),
            destination: TileKey::new(0, 11, 11),
            stack_upgrade: false,
        };
        assert!(validate_range(arm, TileKey::new(0, 10, 10)).is_ok());
    }

    #[test]
    fn distance_beyond_two_is_rejected() {
        let arm = ArmState {
            source: TileKey::new(0, 10, 10),
            destination: TileKey::new(0, 13, 10),
            stack_upgrade: false,
        };
        assert!(matches!(
            validate_range(arm, TileKey::new(0, 10, 10)),
            Err(BehaviorError::ArmRangeExceeded(_))
        ));
    }

    #[test]
    fn cross_face_pairs_are_rejected() {
        let arm = ArmState {
            source: TileKey::new(0, 10, 10),
            destination: TileKey::new(1, 10, 11),
            stack_upgrade: false,
        };
        assert!(validate_range(arm, TileKey::new(0, 10, 10)).is_err());
    }

    #[test]
    fn stack_upgrade_doubles_transfer_rate() {
        let plain = ArmState { source: TileKey::new(0, 0, 0), destination: TileKey::new(0, 0, 1), stack_upgrade: false };
        let upgraded = ArmState { stack_upgrade: true, ..plain };
        assert_eq!(transfer_rate(plain), 1);
        assert_eq!(transfer_rate(upgraded), 2);
    }
}
