//! The production template shared by every recipe-driven building
//! (smelters, assemblers, refineries): an Idle -> Processing -> Drain ->
//! Idle state machine over a fixed recipe list (spec.md 4.D.1).
//!
//! Every function here is pure: it takes the current [`ProductionState`]
//! and returns the next one, so the tick processor can apply behavior
//! writes to a pending map and merge them at end of phase (spec.md 4.E.1
//! phase 2) without any function reaching back into the world itself.

use spheric_types::{InputSlots, Item, ProductionPhase, ProductionState, Recipe};

/// The first declared recipe fully satisfied by `slots`, honoring the
/// tie-break rule that the first-declared match wins (spec.md 4.D.7).
/// A recipe matches only if every slot beyond its input count is empty --
/// a building can't be "accidentally" loaded for a longer recipe while
/// actually matching a shorter one.
fn fully_loaded_recipe<'a>(slots: &InputSlots, recipes: &'a [Recipe]) -> Option<&'a Recipe> {
    recipes.iter().find(|recipe| recipe_is_satisfied(slots, recipe))
}

fn recipe_is_satisfied(slots: &InputSlots, recipe: &Recipe) -> bool {
    for (index, slot) in slots.iter().enumerate() {
        match (slot, recipe.inputs.get(index)) {
            (Some((item, count)), Some((req_item, req_count))) => {
                if item != req_item || count < req_count {
                    return false;
                }
            }
            (None, Some(_)) => return false,
            (Some(_), None) => return false,
            (None, None) => {}
        }
    }
    true
}

/// Whether `item`, if placed into slot `index`, is consistent with the
/// other currently-filled slots under some declared recipe. Returns the
/// matching recipe so the caller knows the required quantity at that
/// slot.
fn recipe_accepting_at<'a>(
    slots: &InputSlots,
    recipes: &'a [Recipe],
    index: usize,
    item: &Item,
) -> Option<&'a Recipe> {
    recipes.iter().find(|recipe| {
        let Some((req_item, _)) = recipe.inputs.get(index) else {
            return false;
        };
        if req_item != item {
            return false;
        }
        slots.iter().enumerate().all(|(i, slot)| {
            if i == index {
                return true;
            }
            match (slot, recipe.inputs.get(i)) {
                (Some((slot_item, _)), Some((req_item, _))) => slot_item == req_item,
                (None, _) => true,
                (Some(_), None) => false,
            }
        })
    })
}

/// Try to load one unit of `item` into whichever slot a declared recipe
/// will accept it in, given the other currently-filled slots. Returns
/// `None` if no slot accepts it (spec.md 4.D.1 slot-acceptance rule).
#[must_use]
pub fn try_accept_item(state: &ProductionState, recipes: &[Recipe], item: &Item) -> Option<ProductionState> {
    if state.phase == ProductionPhase::Processing {
        return None;
    }
    for index in 0..state.input_slots.len() {
        let Some(recipe) = recipe_accepting_at(&state.input_slots, recipes, index, item) else {
            continue;
        };
        let Some(&(_, required)) = recipe.inputs.get(index) else {
            continue;
        };
        let mut next = state.clone();
        let slot = next.input_slots.get_mut(index)?;
        match slot {
            Some((_, count)) if *count < required => *count += 1,
            None => *slot = Some((item.clone(), 1)),
            _ => continue,
        }
        return Some(next);
    }
    None
}

/// Advance the state machine by one tick. `has_assigned_creature` is
/// irrelevant unless `state.requires_creature` is set; `effective_rate`
/// is the base rate after the modifier stack (spec.md 4.E.4) has been
/// applied by the caller.
#[must_use]
pub fn tick(state: &ProductionState, recipes: &[Recipe], has_assigned_creature: bool, effective_rate: u32) -> ProductionState {
    if state.requires_creature && !has_assigned_creature {
        return state.clone();
    }
    match state.phase {
        ProductionPhase::Idle => {
            if fully_loaded_recipe(&state.input_slots, recipes).is_some() {
                let mut next = state.clone();
                next.phase = ProductionPhase::Processing;
                next.progress = 0;
                next
            } else {
                state.clone()
            }
        }
        ProductionPhase::Processing => advance_processing(state, recipes, effective_rate),
        ProductionPhase::Drain => state.clone(),
    }
}

fn advance_processing(state: &ProductionState, recipes: &[Recipe], effective_rate: u32) -> ProductionState {
    let Some(recipe) = fully_loaded_recipe(&state.input_slots, recipes) else {
        let mut next = state.clone();
        next.phase = ProductionPhase::Idle;
        next.progress = 0;
        return next;
    };

    let mut next = state.clone();
    next.progress += 1;
    if next.progress < effective_rate.max(1) {
        return next;
    }

    next.input_slots = [None, None, None];
    next.progress = 0;
    match recipe.output.first() {
        Some((item, qty)) => {
            next.output_buffer = Some(item.clone());
            next.output_remaining = qty.saturating_sub(1);
        }
        None => {
            next.output_buffer = None;
            next.output_remaining = 0;
        }
    }
    next.phase = ProductionPhase::Drain;
    next
}

/// Apply a successful downstream push of `output_buffer`, loading the
/// next copy or clearing back to Idle (spec.md 4.D.1 Drain -> Idle
/// transition, 4.E.2).
#[must_use]
pub fn on_push_succeeded(state: &ProductionState) -> ProductionState {
    let mut next = state.clone();
    if next.output_remaining > 0 {
        next.output_remaining -= 1;
    } else {
        next.output_buffer = None;
        next.phase = ProductionPhase::Idle;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use spheric_types::Item;

    fn smelter_recipes() -> Vec<Recipe> {
        vec![Recipe {
            inputs: vec![(Item::IronOre, 2)],
            output: vec![(Item::IronIngot, 1)],
            rate: 4,
        }]
    }

    #[test]
    fn accepting_inputs_fills_the_matching_slot() {
        let state = ProductionState::new(false);
        let recipes = smelter_recipes();
        let state = try_accept_item(&state, &recipes, &Item::IronOre).expect("first unit accepted");
        let state = try_accept_item(&state, &recipes, &Item::IronOre).expect("second unit accepted");
        assert_eq!(state.input_slots[0], Some((Item::IronOre, 2)));
    }

    #[test]
    fn over_filling_a_satisfied_slot_is_rejected() {
        let state = ProductionState::new(false);
        let recipes = smelter_recipes();
        let state = try_accept_item(&state, &recipes, &Item::IronOre).unwrap();
        let state = try_accept_item(&state, &recipes, &Item::IronOre).unwrap();
        assert!(try_accept_item(&state, &recipes, &Item::IronOre).is_none());
    }

    #[test]
    fn unmatched_item_is_rejected() {
        let state = ProductionState::new(false);
        let recipes = smelter_recipes();
        assert!(try_accept_item(&state, &recipes, &Item::Quartz).is_none());
    }

    #[test]
    fn full_idle_transitions_to_processing_then_drain() {
        let recipes = smelter_recipes();
        let mut state = ProductionState::new(false);
        state = try_accept_item(&state, &recipes, &Item::IronOre).unwrap();
        state = try_accept_item(&state, &recipes, &Item::IronOre).unwrap();
        state = tick(&state, &recipes, false, 4);
        assert_eq!(state.phase, ProductionPhase::Processing);
        for _ in 0..3 {
            state = tick(&state, &recipes, false, 4);
        }
        assert_eq!(state.phase, ProductionPhase::Drain);
        assert_eq!(state.output_buffer, Some(Item::IronIngot));
        assert_eq!(state.output_remaining, 0);
        assert!(state.input_slots.iter().all(Option::is_none));
    }

    #[test]
    fn missing_required_creature_keeps_building_idle() {
        let recipes = smelter_recipes();
        let mut state = ProductionState::new(true);
        state = try_accept_item(&state, &recipes, &Item::IronOre).unwrap();
        state = try_accept_item(&state, &recipes, &Item::IronOre).unwrap();
        let next = tick(&state, &recipes, false, 4);
        assert_eq!(next, state, "building without its required creature must not tick");
    }

    #[test]
    fn drain_returns_to_idle_once_output_remaining_hits_zero() {
        let mut state = ProductionState::new(false);
        state.phase = ProductionPhase::Drain;
        state.output_buffer = Some(Item::IronIngot);
        state.output_remaining = 1;
        let state = on_push_succeeded(&state);
        assert_eq!(state.output_remaining, 0);
        assert_eq!(state.output_buffer, Some(Item::IronIngot));
        let state = on_push_succeeded(&state);
        assert_eq!(state.output_buffer, None);
        assert_eq!(state.phase, ProductionPhase::Idle);
    }
}
