//! Central ledger and double-entry bookkeeping for item conservation in
//! the Spheric simulation.
//!
//! Every item that exists inside a building, in transit on a conveyor,
//! or sitting on the ground is tracked through this ledger. Items are
//! never created from nothing except via [`LedgerEntryType::Produce`]
//! (a recipe's output, or an extractor pulling from a tile's deposit),
//! and never destroyed into nothing except via [`LedgerEntryType::Consume`]
//! or [`LedgerEntryType::Submit`]. The conservation law (item count
//! before == item count after, once produced/consumed/submitted flows
//! are accounted for) is checkable at the end of every tick.
//!
//! # Architecture
//!
//! - [`ledger`] -- the [`Ledger`] struct: append-only log with recording methods.
//! - [`transaction`] -- the [`TransactionBuilder`] for validated entry construction.
//! - [`conservation`] -- conservation law verification and anomaly detection.
//!
//! # Conservation Law
//!
//! For every tick T and every item I:
//!
//! ```text
//! sum(internal credits for I in T) == sum(internal debits for I in T)
//! ```
//!
//! A violation produces a [`LedgerAnomaly`] -- the simulation's most
//! critical integrity alert. The ledger never panics; it returns errors.
//!
//! # Double-Entry Bookkeeping
//!
//! Every entry records both sides:
//! - **Debit**: the source actor loses the item quantity.
//! - **Credit**: the destination actor gains the item quantity.
//!
//! Entry types and their expected actor pairs:
//!
//! | Type | From (debit) | To (credit) |
//! |------|-------------|-------------|
//! | Push | Building | Building |
//! | Produce | World | Building |
//! | Consume | Building | Void |
//! | Submit | Building | Terminal |
//! | Eject | Building | Ground |
//!
//! # Usage
//!
//! ```
//! use spheric_ledger::{Ledger, TransactionBuilder};
//! use spheric_ledger::conservation::ConservationResult;
//! use spheric_types::{Item, LedgerActor, LedgerEntryType, PlayerId, TileKey};
//!
//! let mut ledger = Ledger::new();
//! let source = TileKey::new(0, 1, 1);
//! let dest = TileKey::new(0, 1, 2);
//!
//! // A smelter at `source` produces iron ingots out of ore.
//! ledger.record_produce(1, Item::IronIngot, 4, source).ok();
//!
//! // A conveyor pushes 2 ingots from `source` to `dest`.
//! ledger.record_push(1, Item::IronIngot, 2, source, dest).ok();
//!
//! // Verify conservation law holds.
//! assert_eq!(ledger.verify_conservation(1), ConservationResult::Balanced);
//! ```

pub mod conservation;
pub mod ledger;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::Ledger;
pub use transaction::TransactionBuilder;

use std::collections::BTreeMap;

use spheric_types::{Item, LedgerEntryType};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Quantity must be strictly positive.
    #[error("ledger entry quantity must be non-zero")]
    ZeroQuantity,

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The from/to actor kinds do not match the expected kinds for the
    /// entry type.
    #[error(
        "invalid actor for {entry_type:?} {side}: expected {expected}, got {actual}"
    )]
    InvalidActor {
        /// The entry type being validated.
        entry_type: LedgerEntryType,
        /// Which side of the entry ("from" or "to").
        side: &'static str,
        /// The expected actor kind.
        expected: &'static str,
        /// The actual actor kind supplied.
        actual: &'static str,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation detected during tick verification.
///
/// When the conservation check finds that credits and debits do not
/// balance for one or more items in a tick, this struct captures the
/// details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// Per-item imbalance: (`debit_total`, `credit_total`) for each item
    /// that did not balance.
    pub imbalances: BTreeMap<Item, (u32, u32)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
