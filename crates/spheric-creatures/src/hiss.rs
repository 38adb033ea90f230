//! Hiss entity lifecycle (spec.md 4.G): spawn from high-intensity
//! corruption tiles, step toward the nearest owned building every 10
//! ticks, and signal arrival so the tick processor can resolve damage
//! against the target. Destruction is not this module's concern: a hiss
//! entity dies to defense-turret fire
//! ([`spheric_behaviors::special::tick_turret`]), which drops
//! `hiss_residue` at the turret's own tile.

use spheric_types::{HissEntity, HissId, TileKey};

/// Starting hit points for a newly spawned hiss entity. Not given a
/// number in the source material; chosen so a single turret volley
/// (spec.md 4.D.6, `output_buffer` capped at 1 per cooldown) does not
/// one-shot it, requiring sustained fire to clear.
pub const HISS_STARTING_HP: u16 = 30;

/// Spawn a fresh hiss entity at `tile`, with no target assigned yet.
#[must_use]
pub fn spawn(tile: TileKey) -> HissEntity {
    HissEntity { id: HissId::new(), position: tile, hp: HISS_STARTING_HP, target: None }
}

/// Advance one step toward `target` if it's on the same face, and report
/// whether the entity has arrived. A target on a different face, or no
/// target at all, leaves the entity in place.
#[must_use]
pub fn step_toward(mut entity: HissEntity, target: Option<TileKey>) -> (HissEntity, bool) {
    entity.target = target;
    let Some(target) = target else {
        return (entity, false);
    };
    if entity.position == target {
        return (entity, true);
    }
    if entity.position.face == target.face {
        entity.position = step_manhattan(entity.position, target);
    }
    let arrived = entity.position == target;
    (entity, arrived)
}

/// Manhattan stepping, row-first then column-first, matching the
/// delivery drone's pathing convention (spec.md 4.E.5).
const fn step_manhattan(position: TileKey, target: TileKey) -> TileKey {
    if position.row != target.row {
        let row = if target.row > position.row {
            position.row.saturating_add(1)
        } else {
            position.row.saturating_sub(1)
        };
        return TileKey::new(position.face, row, position.col);
    }
    if position.col != target.col {
        let col = if target.col > position.col {
            position.col.saturating_add(1)
        } else {
            position.col.saturating_sub(1)
        };
        return TileKey::new(position.face, position.row, col);
    }
    position
}

/// Reduce a hiss entity's hit points by `amount`, saturating at zero.
#[must_use]
pub const fn apply_damage(mut entity: HissEntity, amount: u16) -> HissEntity {
    entity.hp = entity.hp.saturating_sub(amount);
    entity
}

/// Whether a hiss entity has been defeated.
#[must_use]
pub const fn is_defeated(entity: &HissEntity) -> bool {
    entity.hp == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_spawned_hiss_entity_starts_at_full_health_with_no_target() {
        let entity = spawn(TileKey::new(0, 1, 1));
        assert_eq!(entity.hp, HISS_STARTING_HP);
        assert_eq!(entity.target, None);
    }

    #[test]
    fn stepping_toward_a_same_face_target_closes_the_distance() {
        let entity = spawn(TileKey::new(0, 0, 0));
        let target = TileKey::new(0, 2, 2);
        let (stepped, arrived) = step_toward(entity, Some(target));
        assert!(!arrived);
        assert_eq!(stepped.position, TileKey::new(0, 1, 0));
        assert_eq!(stepped.target, Some(target));
    }

    #[test]
    fn arrival_is_reported_once_the_target_tile_is_reached() {
        let entity = spawn(TileKey::new(0, 5, 5));
        let (_, arrived) = step_toward(entity, Some(TileKey::new(0, 5, 5)));
        assert!(arrived);
    }

    #[test]
    fn a_cross_face_target_leaves_the_entity_in_place() {
        let entity = spawn(TileKey::new(0, 5, 5));
        let (stepped, arrived) = step_toward(entity, Some(TileKey::new(1, 5, 5)));
        assert!(!arrived);
        assert_eq!(stepped.position, entity.position);
    }

    #[test]
    fn damage_saturates_at_zero_and_marks_defeat() {
        let entity = spawn(TileKey::new(0, 0, 0));
        let defeated = apply_damage(entity, HISS_STARTING_HP + 100);
        assert_eq!(defeated.hp, 0);
        assert!(is_defeated(&defeated));
    }
}
