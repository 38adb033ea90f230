//! Extractor (miner) behavior (spec.md 4.D.5): every `rate` ticks, pull
//! one unit from the underlying tile's resource deposit into its output
//! buffer. The resource-kind to item-kind mapping is fixed
//! ([`spheric_types::ResourceKind::mined_item`]); depleted-tile fallback
//! to nearby tiles within the creature-boosted radius is the caller's
//! responsibility, since it requires a neighbourhood lookup this crate
//! doesn't perform.

use spheric_types::{ExtractorState, Item};

/// Advance the extractor by one tick. `has_resource` tells the caller's
/// chosen deposit (underlying tile, or a boosted-radius fallback) still
/// has units available; `mined_item` is the item that deposit yields.
/// While `output_buffer` is occupied the extractor waits for push
/// resolution to drain it rather than accumulating further.
#[must_use]
pub fn tick(state: &ExtractorState, rate: u32, has_resource: bool, mined_item: Option<Item>) -> ExtractorState {
    if state.output_buffer.is_some() {
        return state.clone();
    }
    let mut next = state.clone();
    next.ticks_since_extraction += 1;
    if next.ticks_since_extraction >= rate.max(1) {
        next.ticks_since_extraction = 0;
        if has_resource {
            next.output_buffer = mined_item;
        }
    }
    next
}

/// Clear the output buffer after a successful downstream push.
#[must_use]
pub const fn on_push_succeeded(state: ExtractorState) -> ExtractorState {
    ExtractorState { output_buffer: None, ..state }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_happens_only_every_rate_ticks() {
        let mut state = ExtractorState { ticks_since_extraction: 0, output_buffer: None };
        for _ in 0..3 {
            state = tick(&state, 4, true, Some(Item::IronOre));
            assert!(state.output_buffer.is_none());
        }
        state = tick(&state, 4, true, Some(Item::IronOre));
        assert_eq!(state.output_buffer, Some(Item::IronOre));
    }

    #[test]
    fn a_depleted_deposit_yields_nothing_but_still_resets_the_counter() {
        let mut state = ExtractorState { ticks_since_extraction: 3, output_buffer: None };
        state = tick(&state, 4, false, None);
        assert_eq!(state.ticks_since_extraction, 0);
        assert!(state.output_buffer.is_none());
    }

    #[test]
    fn a_full_output_buffer_blocks_further_accumulation() {
        let state = ExtractorState { ticks_since_extraction: 10, output_buffer: Some(Item::IronOre) };
        let next = tick(&state, 4, true, Some(Item::CopperOre));
        assert_eq!(next, state, "extractor must wait for the push phase to drain its buffer");
    }

    #[test]
    fn push_success_clears_the_buffer() {
        let state = ExtractorState { ticks_since_extraction: 0, output_buffer: Some(Item::IronOre) };
        assert_eq!(on_push_succeeded(state).output_buffer, None);
    }
}
