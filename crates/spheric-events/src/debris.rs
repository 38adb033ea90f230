//! Meteor shower ground-debris spawning (spec.md 4.G).
//!
//! While a meteor shower is active, impacts scatter raw-ore debris
//! across a face. Each impact is an independent roll: a random tile and
//! a random ore-like item, in a small stack.

use rand::Rng;
use spheric_types::{GroundItemStack, Item, TileKey, GRID_SIZE};

/// Impacts rolled per tick while a meteor shower is active.
pub const IMPACTS_PER_TICK: u8 = 2;

/// Minimum and maximum items dropped per impact.
pub const IMPACT_STACK_MIN: u32 = 5;
/// See [`IMPACT_STACK_MIN`].
pub const IMPACT_STACK_MAX: u32 = 20;

const DEBRIS_ITEMS: [Item; 5] = [
    Item::IronOre,
    Item::CopperOre,
    Item::TitaniumOre,
    Item::Quartz,
    Item::Sulfur,
];

fn random_item(rng: &mut impl Rng) -> Item {
    let index = rng.random_range(0..DEBRIS_ITEMS.len());
    DEBRIS_ITEMS.get(index).cloned().unwrap_or(Item::IronOre)
}

/// Roll [`IMPACTS_PER_TICK`] meteor impacts on the given face, each
/// landing at a random tile with a random ore-like item stack.
#[must_use]
pub fn roll_impacts(face: u8, rng: &mut impl Rng) -> Vec<(TileKey, GroundItemStack)> {
    let mut impacts = Vec::with_capacity(IMPACTS_PER_TICK as usize);
    for _ in 0..IMPACTS_PER_TICK {
        let row = rng.random_range(0..GRID_SIZE);
        let col = rng.random_range(0..GRID_SIZE);
        let count = rng.random_range(IMPACT_STACK_MIN..=IMPACT_STACK_MAX);
        impacts.push((
            TileKey::new(face, row, col),
            GroundItemStack { item: random_item(rng), count },
        ));
    }
    impacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rolls_the_configured_number_of_impacts() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let impacts = roll_impacts(3, &mut rng);
        assert_eq!(impacts.len(), usize::from(IMPACTS_PER_TICK));
    }

    #[test]
    fn impacts_land_on_the_requested_face() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let impacts = roll_impacts(7, &mut rng);
        for (tile, _) in &impacts {
            assert_eq!(tile.face, 7);
        }
    }

    #[test]
    fn impact_stacks_are_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let impacts = roll_impacts(0, &mut rng);
        for (_, stack) in &impacts {
            assert!(stack.count >= IMPACT_STACK_MIN);
            assert!(stack.count <= IMPACT_STACK_MAX);
        }
    }
}
