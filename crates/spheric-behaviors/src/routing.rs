//! Routing-building push-resolution policies (spec.md 4.D.3): splitter,
//! merger, priority merger, balancer, filtered splitter, overflow gate,
//! crossover, and underground conduit.
//!
//! Each `resolve_*` function is a pure decision over [`RouterState`] plus
//! caller-supplied acceptance closures -- the push-resolution phase
//! (spec.md 4.E.2) owns the actual neighbour lookups and slot writes, so
//! these functions never touch the world directly. A closure returning
//! `true` means the destination accepted the item this attempt.

use spheric_types::{Item, RouterState};

/// Which of a two-output (or two-input) router's sides is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left, or the first-declared input on a merger.
    Left,
    /// Right, or the second-declared input on a merger.
    Right,
}

impl Side {
    #[must_use]
    const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Feed an item into a single rear input slot (splitter, balancer,
/// filtered splitter, overflow gate, underground conduit).
#[must_use]
pub fn accept_rear(state: &RouterState, item: Item) -> Option<RouterState> {
    if state.input_slot.is_some() {
        return None;
    }
    let mut next = state.clone();
    next.input_slot = Some(item);
    Some(next)
}

/// Feed an item into one of two input slots (merger, priority merger,
/// crossover).
#[must_use]
pub fn accept_side(state: &RouterState, item: Item, side: Side) -> Option<RouterState> {
    let mut next = state.clone();
    match side {
        Side::Left if next.input_slot.is_none() => next.input_slot = Some(item),
        Side::Right if next.input_slot_b.is_none() => next.input_slot_b = Some(item),
        _ => return None,
    }
    Some(next)
}

/// Splitter: alternate L/R, advancing the alternation bit only on a
/// successful push (spec.md 4.E.2: the bit never advances if every
/// destination fails).
pub fn resolve_splitter(state: &RouterState, mut try_push: impl FnMut(Side, &Item) -> bool) -> (RouterState, bool) {
    let Some(item) = state.input_slot.clone() else {
        return (state.clone(), false);
    };
    let first = if state.alternate { Side::Right } else { Side::Left };
    for side in [first, first.opposite()] {
        if try_push(side, &item) {
            let mut next = state.clone();
            next.input_slot = None;
            next.alternate = !next.alternate;
            return (next, true);
        }
    }
    (state.clone(), false)
}

/// Balancer: route to the less-full side, ties broken by alternation.
pub fn resolve_balancer(
    state: &RouterState,
    fullness: impl Fn(Side) -> u32,
    mut try_push: impl FnMut(Side, &Item) -> bool,
) -> (RouterState, bool) {
    let Some(item) = state.input_slot.clone() else {
        return (state.clone(), false);
    };
    let (left_fullness, right_fullness) = (fullness(Side::Left), fullness(Side::Right));
    let tied = left_fullness == right_fullness;
    let preferred = if tied {
        if state.alternate { Side::Right } else { Side::Left }
    } else if left_fullness < right_fullness {
        Side::Left
    } else {
        Side::Right
    };
    for side in [preferred, preferred.opposite()] {
        if try_push(side, &item) {
            let mut next = state.clone();
            next.input_slot = None;
            if tied {
                next.alternate = !next.alternate;
            }
            return (next, true);
        }
    }
    (state.clone(), false)
}

/// Merger: drain the side inputs into the single front output, left
/// tie-broken first.
pub fn resolve_merger(state: &RouterState, mut try_push: impl FnMut(&Item) -> bool) -> (RouterState, bool) {
    if let Some(item) = state.input_slot.clone()
        && try_push(&item)
    {
        let mut next = state.clone();
        next.input_slot = None;
        return (next, true);
    }
    if let Some(item) = state.input_slot_b.clone()
        && try_push(&item)
    {
        let mut next = state.clone();
        next.input_slot_b = None;
        return (next, true);
    }
    (state.clone(), false)
}

/// Priority merger: left always wins unless `mirrored` swaps which side
/// is primary; the secondary side only drains when the primary is empty.
pub fn resolve_priority_merger(
    state: &RouterState,
    mirrored: bool,
    mut try_push: impl FnMut(&Item) -> bool,
) -> (RouterState, bool) {
    let order = if mirrored { [Side::Right, Side::Left] } else { [Side::Left, Side::Right] };
    for side in order {
        let item = match side {
            Side::Left => state.input_slot.clone(),
            Side::Right => state.input_slot_b.clone(),
        };
        let Some(item) = item else { continue };
        if try_push(&item) {
            let mut next = state.clone();
            match side {
                Side::Left => next.input_slot = None,
                Side::Right => next.input_slot_b = None,
            }
            return (next, true);
        }
        return (state.clone(), false);
    }
    (state.clone(), false)
}

/// Filtered splitter: items matching `filter_item` go left; others go
/// right, or right-then-forward in dual-filter mode.
pub fn resolve_filtered_splitter(
    state: &RouterState,
    filter_item: &Item,
    dual_filter: bool,
    mut try_left: impl FnMut(&Item) -> bool,
    mut try_right: impl FnMut(&Item) -> bool,
    mut try_forward: impl FnMut(&Item) -> bool,
) -> (RouterState, bool) {
    let Some(item) = state.input_slot.clone() else {
        return (state.clone(), false);
    };
    let accepted = if &item == filter_item {
        try_left(&item)
    } else if dual_filter {
        try_right(&item) || try_forward(&item)
    } else {
        try_right(&item)
    };
    if accepted {
        let mut next = state.clone();
        next.input_slot = None;
        return (next, true);
    }
    (state.clone(), false)
}

/// Overflow gate: forward first, left overflow only if forward is full.
pub fn resolve_overflow_gate(
    state: &RouterState,
    mut try_forward: impl FnMut(&Item) -> bool,
    mut try_left: impl FnMut(&Item) -> bool,
) -> (RouterState, bool) {
    let Some(item) = state.input_slot.clone() else {
        return (state.clone(), false);
    };
    if try_forward(&item) || try_left(&item) {
        let mut next = state.clone();
        next.input_slot = None;
        return (next, true);
    }
    (state.clone(), false)
}

/// Crossover: horizontal and vertical streams resolved independently,
/// never sharing a slot.
pub fn resolve_crossover(
    state: &RouterState,
    mut try_horizontal: impl FnMut(&Item) -> bool,
    mut try_vertical: impl FnMut(&Item) -> bool,
) -> RouterState {
    let mut next = state.clone();
    if let Some(item) = state.input_slot.clone()
        && try_horizontal(&item)
    {
        next.input_slot = None;
    }
    if let Some(item) = state.input_slot_b.clone()
        && try_vertical(&item)
    {
        next.input_slot_b = None;
    }
    next
}

/// Underground conduit: teleports to the linked partner's forward
/// neighbour on a successful push; never pushes while unlinked.
pub fn resolve_conduit(state: &RouterState, mut try_push: impl FnMut(&Item) -> bool) -> (RouterState, bool) {
    if state.linked_partner.is_none() {
        return (state.clone(), false);
    }
    let Some(item) = state.input_slot.clone() else {
        return (state.clone(), false);
    };
    if try_push(&item) {
        let mut next = state.clone();
        next.input_slot = None;
        return (next, true);
    }
    (state.clone(), false)
}
