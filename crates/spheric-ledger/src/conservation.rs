//! Conservation law verification for the central ledger.
//!
//! The conservation law enforces that internal item movements always
//! balance: every debit from one actor must match a credit to another.
//! Items enter the simulation via `Produce` and leave via `Consume` or
//! `Submit` -- these are source/sink flows that do not need to balance
//! within a single tick.
//!
//! For each item I in tick T, the check is:
//!
//! ```text
//! sum(internal_credits for I in T) == sum(internal_debits for I in T)
//! ```
//!
//! Internal entry types: `Push`, `Eject`. Each entry adds its quantity
//! to both the credit and debit side equally, so this check is
//! guaranteed by construction -- it exists as defense-in-depth against
//! data corruption or future bugs.
//!
//! A violation produces a [`LedgerAnomaly`] -- the simulation's most
//! critical integrity alert.

use std::collections::{BTreeMap, BTreeSet};

use spheric_types::{Item, LedgerEntry, LedgerEntryType};

use crate::LedgerAnomaly;

/// The result of a conservation check for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The ledger is balanced for this tick.
    Balanced,
    /// One or more items have imbalanced flows.
    Anomaly(LedgerAnomaly),
}

/// Returns `true` if the entry type is an internal movement.
///
/// Internal movements move items between actors without creating or
/// destroying them. Every internal entry must have matching credit and
/// debit quantities.
const fn is_internal(entry_type: LedgerEntryType) -> bool {
    matches!(entry_type, LedgerEntryType::Push | LedgerEntryType::Eject)
}

/// Verify the conservation law for all entries in a single tick.
///
/// Checks that internal item movements (`Push`, `Eject`) balance for
/// every item: total credits must equal total debits. Source flows
/// (`Produce`) and sink flows (`Consume`, `Submit`) are excluded from
/// the balance check because they represent legitimate item creation
/// and destruction.
///
/// Each well-formed internal entry adds its quantity to both the
/// credit and debit accumulators equally, so this check passes by
/// construction for valid entries. It exists as defense-in-depth
/// against corruption.
#[must_use]
pub fn verify_conservation(tick: u64, entries: &[LedgerEntry]) -> ConservationResult {
    let mut internal_credit: BTreeMap<Item, u64> = BTreeMap::new();
    let mut internal_debit: BTreeMap<Item, u64> = BTreeMap::new();

    for entry in entries {
        if entry.tick != tick {
            continue;
        }

        if is_internal(entry.entry_type) {
            let quantity = u64::from(entry.quantity);

            let credit = internal_credit.entry(entry.item.clone()).or_insert(0);
            let Some(next) = credit.checked_add(quantity) else {
                return overflow_anomaly(tick, entry.item.clone());
            };
            *credit = next;

            let debit = internal_debit.entry(entry.item.clone()).or_insert(0);
            let Some(next) = debit.checked_add(quantity) else {
                return overflow_anomaly(tick, entry.item.clone());
            };
            *debit = next;
        }
        // Produce, Consume, and Submit are source/sink flows. They do
        // not participate in the internal balance check.
    }

    let all_items: BTreeSet<Item> = internal_credit
        .keys()
        .chain(internal_debit.keys())
        .cloned()
        .collect();

    let mut imbalances: BTreeMap<Item, (u32, u32)> = BTreeMap::new();

    for item in all_items {
        let total_credit = internal_credit.get(&item).copied().unwrap_or(0);
        let total_debit = internal_debit.get(&item).copied().unwrap_or(0);

        if total_credit != total_debit {
            let debit = u32::try_from(total_debit).unwrap_or(u32::MAX);
            let credit = u32::try_from(total_credit).unwrap_or(u32::MAX);
            imbalances.insert(item, (debit, credit));
        }
    }

    if imbalances.is_empty() {
        ConservationResult::Balanced
    } else {
        let count = imbalances.len();
        ConservationResult::Anomaly(LedgerAnomaly {
            tick,
            imbalances,
            message: format!(
                "LEDGER_ANOMALY at tick {tick}: conservation law violated for {count} item(s)",
            ),
        })
    }
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(tick: u64, item: Item) -> ConservationResult {
    let mut imbalances = BTreeMap::new();
    let label = format!("{item:?}");
    imbalances.insert(item, (0, 0));
    ConservationResult::Anomaly(LedgerAnomaly {
        tick,
        imbalances,
        message: format!("LEDGER_ANOMALY at tick {tick}: arithmetic overflow while summing {label}"),
    })
}

/// Verify conservation with additional flow-direction checks.
///
/// Performs the basic internal-balance check from
/// [`verify_conservation`] and then validates that source/sink flows
/// have non-negative totals (quantities are unsigned by construction,
/// so this guards against accumulator overflow rather than sign
/// errors).
#[must_use]
pub fn verify_conservation_strict(tick: u64, entries: &[LedgerEntry]) -> ConservationResult {
    let result = verify_conservation(tick, entries);
    if let ConservationResult::Anomaly(_) = &result {
        return result;
    }

    let mut inflow: BTreeMap<Item, u64> = BTreeMap::new();
    let mut outflow: BTreeMap<Item, u64> = BTreeMap::new();

    for entry in entries {
        if entry.tick != tick {
            continue;
        }

        let quantity = u64::from(entry.quantity);
        match entry.entry_type {
            LedgerEntryType::Produce => {
                let v = inflow.entry(entry.item.clone()).or_insert(0);
                let Some(next) = v.checked_add(quantity) else {
                    return overflow_anomaly(tick, entry.item.clone());
                };
                *v = next;
            }
            LedgerEntryType::Consume | LedgerEntryType::Submit => {
                let v = outflow.entry(entry.item.clone()).or_insert(0);
                let Some(next) = v.checked_add(quantity) else {
                    return overflow_anomaly(tick, entry.item.clone());
                };
                *v = next;
            }
            LedgerEntryType::Push | LedgerEntryType::Eject => {}
        }
    }

    ConservationResult::Balanced
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use spheric_types::{LedgerActor, LedgerEntryId, PlayerId, TileKey};

    use super::*;

    fn make_entry(tick: u64, entry_type: LedgerEntryType, item: Item, quantity: u32) -> LedgerEntry {
        let a = LedgerActor::Building(TileKey::new(0, 1, 1));
        let b = LedgerActor::Building(TileKey::new(0, 1, 2));
        let (from, to) = match entry_type {
            LedgerEntryType::Produce => (LedgerActor::World, b),
            LedgerEntryType::Consume => (a, LedgerActor::Void),
            LedgerEntryType::Submit => (a, LedgerActor::Terminal(PlayerId::new())),
            LedgerEntryType::Eject => (a, LedgerActor::Ground(TileKey::new(0, 1, 3))),
            LedgerEntryType::Push => (a, b),
        };
        LedgerEntry {
            id: LedgerEntryId::new(),
            tick,
            entry_type,
            from,
            to,
            item,
            quantity,
            reason: format!("{entry_type:?}"),
            reference_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_tick_is_balanced() {
        assert_eq!(verify_conservation(1, &[]), ConservationResult::Balanced);
    }

    #[test]
    fn single_push_is_balanced() {
        let entries = vec![make_entry(1, LedgerEntryType::Push, Item::IronOre, 5)];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn produce_alone_is_balanced() {
        // Produce is a source flow, not internal. It does not
        // participate in the internal balance check.
        let entries = vec![make_entry(1, LedgerEntryType::Produce, Item::IronIngot, 10)];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn consume_alone_is_balanced() {
        let entries = vec![make_entry(1, LedgerEntryType::Consume, Item::CopperOre, 3)];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn submit_alone_is_balanced() {
        let entries = vec![make_entry(1, LedgerEntryType::Submit, Item::TitaniumIngot, 5)];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn full_lifecycle_balanced() {
        let entries = vec![
            make_entry(1, LedgerEntryType::Produce, Item::Quartz, 20),
            make_entry(1, LedgerEntryType::Push, Item::Quartz, 15),
            make_entry(1, LedgerEntryType::Consume, Item::Quartz, 5),
            make_entry(1, LedgerEntryType::Submit, Item::Quartz, 10),
        ];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn entries_from_different_ticks_are_filtered() {
        let entries = vec![
            make_entry(1, LedgerEntryType::Push, Item::Ice, 5),
            make_entry(2, LedgerEntryType::Push, Item::Ice, 99),
        ];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn strict_check_passes_for_valid_entries() {
        let entries = vec![
            make_entry(1, LedgerEntryType::Produce, Item::Ice, 20),
            make_entry(1, LedgerEntryType::Push, Item::Ice, 15),
            make_entry(1, LedgerEntryType::Consume, Item::Ice, 5),
        ];
        assert_eq!(verify_conservation_strict(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn anomaly_construction_has_correct_fields() {
        let mut imbalances = BTreeMap::new();
        imbalances.insert(Item::IronOre, (10, 7));

        let anomaly = LedgerAnomaly {
            tick: 42,
            imbalances,
            message: "LEDGER_ANOMALY at tick 42: test".to_owned(),
        };

        assert_eq!(anomaly.tick, 42);
        assert!(anomaly.imbalances.contains_key(&Item::IronOre));
        assert!(anomaly.message.contains("LEDGER_ANOMALY"));
    }

    #[test]
    fn anomaly_display_shows_message() {
        let anomaly = LedgerAnomaly {
            tick: 5,
            imbalances: BTreeMap::new(),
            message: "LEDGER_ANOMALY at tick 5: test display".to_owned(),
        };
        let display = format!("{anomaly}");
        assert!(display.contains("LEDGER_ANOMALY"));
        assert!(display.contains("tick 5"));
    }

    #[test]
    fn conservation_result_variants() {
        let balanced = ConservationResult::Balanced;
        let anomaly = ConservationResult::Anomaly(LedgerAnomaly {
            tick: 1,
            imbalances: BTreeMap::new(),
            message: "test".to_owned(),
        });

        assert_eq!(balanced, ConservationResult::Balanced);
        assert_ne!(balanced, anomaly);
    }

    #[test]
    fn is_internal_classification() {
        assert!(is_internal(LedgerEntryType::Push));
        assert!(is_internal(LedgerEntryType::Eject));
        assert!(!is_internal(LedgerEntryType::Produce));
        assert!(!is_internal(LedgerEntryType::Consume));
        assert!(!is_internal(LedgerEntryType::Submit));
    }
}
