//! Static recipe tables for the production-template buildings (spec.md
//! 4.D.1). Each building kind that runs the production template has a
//! fixed, ordered list of candidate recipes; when several match a slot
//! configuration, the first declared wins (spec.md 4.D.7).

use spheric_types::{BuildingKind, Item, Recipe};

fn recipe(inputs: &[(Item, u16)], output: &[(Item, u16)], rate: u32) -> Recipe {
    Recipe {
        inputs: inputs.to_vec(),
        output: output.to_vec(),
        rate,
    }
}

/// The candidate recipes for a production-template building kind, in
/// declared tie-break order. Returns an empty list for non-production
/// kinds.
#[must_use]
pub fn recipes_for(kind: BuildingKind) -> Vec<Recipe> {
    match kind {
        BuildingKind::Smelter => vec![
            recipe(&[(Item::IronOre, 2)], &[(Item::IronIngot, 1)], 4),
            recipe(&[(Item::CopperOre, 2)], &[(Item::CopperIngot, 1)], 4),
            recipe(&[(Item::TitaniumOre, 3)], &[(Item::TitaniumIngot, 1)], 8),
            recipe(&[(Item::UraniumOre, 2)], &[(Item::EnrichedUranium, 1)], 10),
        ],
        BuildingKind::Assembler => vec![
            recipe(
                &[(Item::IronIngot, 2), (Item::CopperIngot, 1)],
                &[(Item::BasicComponent, 1)],
                6,
            ),
            recipe(
                &[(Item::TitaniumIngot, 2), (Item::Quartz, 1)],
                &[(Item::AdvancedComponent, 1)],
                10,
            ),
            recipe(
                &[
                    (Item::AdvancedComponent, 2),
                    (Item::BasicComponent, 1),
                    (Item::EnrichedUranium, 1),
                ],
                &[(Item::PrecisionAssembly, 1)],
                16,
            ),
        ],
        BuildingKind::Refinery => vec![
            recipe(&[(Item::CrudeOil, 3)], &[(Item::Biofuel, 1)], 6),
            recipe(&[(Item::UraniumOre, 1)], &[(Item::EnrichedUranium, 1)], 12),
        ],
        _ => Vec::new(),
    }
}

/// Whether `kind` runs the shared production template at all.
#[must_use]
pub const fn is_production_kind(kind: BuildingKind) -> bool {
    matches!(kind, BuildingKind::Smelter | BuildingKind::Assembler | BuildingKind::Refinery)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smelter_recipes_are_declared() {
        let recipes = recipes_for(BuildingKind::Smelter);
        assert!(!recipes.is_empty());
        assert_eq!(recipes[0].inputs, vec![(Item::IronOre, 2)]);
    }

    #[test]
    fn non_production_kind_has_no_recipes() {
        assert!(recipes_for(BuildingKind::ConveyorT1).is_empty());
        assert!(!is_production_kind(BuildingKind::ConveyorT1));
    }

    #[test]
    fn assembler_precision_recipe_uses_three_slots() {
        let recipes = recipes_for(BuildingKind::Assembler);
        let precision = recipes
            .iter()
            .find(|r| r.output.first().map(|(item, _)| item) == Some(&Item::PrecisionAssembly))
            .expect("precision recipe declared");
        assert_eq!(precision.inputs.len(), 3);
    }
}
