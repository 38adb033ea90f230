//! Tier 1-3 conveyor FIFO behavior (spec.md 4.D.2).
//!
//! A conveyor is purely passive: nothing here runs during the behavior-tick
//! phase (spec.md 4.E.1 phase 2). Items move only through push resolution
//! (phase 3), which calls [`leading_item`] to find what's available to push
//! out and [`on_leading_pushed`]/[`try_accept_tail`] to apply the result.
//! Items always stay packed toward the leading (index 0, extractable) slot;
//! there is never a gap ahead of an occupied slot.

use spheric_types::{ConveyorState, Item};

fn compact(items: impl Iterator<Item = Item>, len: usize) -> ConveyorState {
    let mut slots = vec![None; len];
    for (slot, item) in slots.iter_mut().zip(items) {
        *slot = Some(item);
    }
    ConveyorState { slots }
}

/// The item in the leading (index 0) slot, available for the push-phase
/// to try placing on the downstream neighbour.
#[must_use]
pub fn leading_item(state: &ConveyorState) -> Option<&Item> {
    state.slots.first().and_then(Option::as_ref)
}

/// Apply a successful downstream push of the leading item: it leaves the
/// belt, and every following item shifts one slot forward.
#[must_use]
pub fn on_leading_pushed(state: &ConveyorState) -> ConveyorState {
    let len = state.slots.len();
    let remaining = state.slots.iter().skip(1).filter_map(|slot| slot.clone());
    compact(remaining, len)
}

/// Try to accept `item` at the conveyor's tail. Succeeds iff any slot is
/// free, in which case every already-held item shifts forward to close
/// the gap and the new item lands at the rear (spec.md 4.E.2 point 2).
#[must_use]
pub fn try_accept_tail(state: &ConveyorState, item: Item) -> Option<ConveyorState> {
    let len = state.slots.len();
    let occupied = state.slots.iter().filter(|slot| slot.is_some()).count();
    if occupied >= len {
        return None;
    }
    let existing = state.slots.iter().filter_map(|slot| slot.clone());
    Some(compact(existing.chain(std::iter::once(item)), len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepting_into_an_empty_conveyor_fills_the_leading_slot() {
        let state = ConveyorState::new(2);
        let state = try_accept_tail(&state, Item::IronOre).expect("room for one item");
        assert_eq!(leading_item(&state), Some(&Item::IronOre));
    }

    #[test]
    fn a_full_conveyor_rejects_further_items() {
        let mut state = ConveyorState::new(1);
        state = try_accept_tail(&state, Item::IronOre).unwrap();
        assert!(try_accept_tail(&state, Item::CopperOre).is_none());
    }

    #[test]
    fn pushing_the_leading_item_shifts_the_rest_forward() {
        let mut state = ConveyorState::new(3);
        state = try_accept_tail(&state, Item::IronOre).unwrap();
        state = try_accept_tail(&state, Item::CopperOre).unwrap();
        let state = on_leading_pushed(&state);
        assert_eq!(leading_item(&state), Some(&Item::CopperOre));
        assert_eq!(state.slots.last().cloned(), Some(None));
    }

    #[test]
    fn fifo_order_is_preserved_across_many_inserts() {
        let mut state = ConveyorState::new(3);
        state = try_accept_tail(&state, Item::IronOre).unwrap();
        state = try_accept_tail(&state, Item::CopperOre).unwrap();
        state = try_accept_tail(&state, Item::Quartz).unwrap();
        assert_eq!(state.slots, vec![Some(Item::IronOre), Some(Item::CopperOre), Some(Item::Quartz)]);
    }
}
