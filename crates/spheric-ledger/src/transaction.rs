//! Transaction builders and validation for the central ledger.
//!
//! Provides a [`TransactionBuilder`] that enforces the double-entry
//! invariant: every item movement must specify a source actor (debit)
//! and a destination actor (credit). Builders validate inputs before
//! producing a [`LedgerEntry`].

use chrono::Utc;

use spheric_types::{Item, LedgerActor, LedgerEntry, LedgerEntryId, LedgerEntryType};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Actor kind classification
// ---------------------------------------------------------------------------

/// The coarse kind of a [`LedgerActor`], ignoring its address, used to
/// validate that an entry's from/to actors match its entry type's
/// contract without caring which tile or player is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorKind {
    World,
    Building,
    Ground,
    Drone,
    Terminal,
    Void,
}

impl ActorKind {
    const fn label(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Building => "building",
            Self::Ground => "ground",
            Self::Drone => "drone",
            Self::Terminal => "terminal",
            Self::Void => "void",
        }
    }
}

const fn classify(actor: &LedgerActor) -> ActorKind {
    match actor {
        LedgerActor::World => ActorKind::World,
        LedgerActor::Building(_) => ActorKind::Building,
        LedgerActor::Ground(_) => ActorKind::Ground,
        LedgerActor::Drone(_) => ActorKind::Drone,
        LedgerActor::Terminal(_) => ActorKind::Terminal,
        LedgerActor::Void => ActorKind::Void,
    }
}

/// Return the expected (from, to) actor kinds for each [`LedgerEntryType`].
const fn expected_actor_kinds(entry_type: LedgerEntryType) -> (ActorKind, ActorKind) {
    match entry_type {
        LedgerEntryType::Push => (ActorKind::Building, ActorKind::Building),
        LedgerEntryType::Produce => (ActorKind::World, ActorKind::Building),
        LedgerEntryType::Consume => (ActorKind::Building, ActorKind::Void),
        LedgerEntryType::Submit => (ActorKind::Building, ActorKind::Terminal),
        LedgerEntryType::Eject => (ActorKind::Building, ActorKind::Ground),
    }
}

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// Enforces that every entry has a non-zero quantity and the correct
/// source/destination actor kinds for the given [`LedgerEntryType`].
///
/// # Examples
///
/// ```
/// use spheric_ledger::TransactionBuilder;
/// use spheric_types::{Item, LedgerActor, LedgerEntryType, TileKey};
///
/// let entry = TransactionBuilder::new(1, LedgerEntryType::Push, Item::IronIngot)
///     .from(LedgerActor::Building(TileKey::new(0, 1, 1)))
///     .to(LedgerActor::Building(TileKey::new(0, 1, 2)))
///     .quantity(5)
///     .reason("CONVEYOR".to_owned())
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    tick: u64,
    entry_type: LedgerEntryType,
    item: Item,
    from: Option<LedgerActor>,
    to: Option<LedgerActor>,
    quantity: Option<u32>,
    reason: Option<String>,
    reference_id: Option<LedgerEntryId>,
}

impl TransactionBuilder {
    /// Start building a ledger entry for the given tick, entry type, and
    /// item.
    #[must_use]
    pub const fn new(tick: u64, entry_type: LedgerEntryType, item: Item) -> Self {
        Self {
            tick,
            entry_type,
            item,
            from: None,
            to: None,
            quantity: None,
            reason: None,
            reference_id: None,
        }
    }

    /// Set the source actor (debit side).
    #[must_use]
    pub const fn from(mut self, actor: LedgerActor) -> Self {
        self.from = Some(actor);
        self
    }

    /// Set the destination actor (credit side).
    #[must_use]
    pub const fn to(mut self, actor: LedgerActor) -> Self {
        self.to = Some(actor);
        self
    }

    /// Set the quantity of item moved.
    #[must_use]
    pub const fn quantity(mut self, qty: u32) -> Self {
        self.quantity = Some(qty);
        self
    }

    /// Set the human-readable reason for the movement.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Set an optional reference linking to a related entry.
    #[must_use]
    pub const fn reference_id(mut self, id: LedgerEntryId) -> Self {
        self.reference_id = Some(id);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroQuantity`] if the quantity is zero.
    /// Returns [`LedgerError::MissingField`] if required fields are not set.
    /// Returns [`LedgerError::InvalidActor`] if the from/to actors do not
    /// match the expected kinds for the entry type.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let quantity = self.quantity.ok_or(LedgerError::MissingField("quantity"))?;
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;
        let from = self.from.ok_or(LedgerError::MissingField("from"))?;
        let to = self.to.ok_or(LedgerError::MissingField("to"))?;

        if quantity == 0 {
            return Err(LedgerError::ZeroQuantity);
        }

        validate_actors(self.entry_type, &from, &to)?;

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            tick: self.tick,
            entry_type: self.entry_type,
            from,
            to,
            item: self.item,
            quantity,
            reason,
            reference_id: self.reference_id,
            created_at: Utc::now(),
        })
    }
}

/// Validate that the from/to actors match the contract for the given
/// [`LedgerEntryType`].
fn validate_actors(
    entry_type: LedgerEntryType,
    from: &LedgerActor,
    to: &LedgerActor,
) -> Result<(), LedgerError> {
    let (expected_from, expected_to) = expected_actor_kinds(entry_type);
    let actual_from = classify(from);
    let actual_to = classify(to);

    if actual_from != expected_from {
        return Err(LedgerError::InvalidActor {
            entry_type,
            side: "from",
            expected: expected_from.label(),
            actual: actual_from.label(),
        });
    }

    if actual_to != expected_to {
        return Err(LedgerError::InvalidActor {
            entry_type,
            side: "to",
            expected: expected_to.label(),
            actual: actual_to.label(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use spheric_types::{PlayerId, TileKey};

    use super::*;

    #[test]
    fn builder_produces_valid_entry() {
        let from = TileKey::new(0, 1, 1);
        let to = TileKey::new(0, 1, 2);
        let result = TransactionBuilder::new(1, LedgerEntryType::Push, Item::IronIngot)
            .from(LedgerActor::Building(from))
            .to(LedgerActor::Building(to))
            .quantity(5)
            .reason("CONVEYOR".to_owned())
            .build();

        let entry = result.expect("valid entry");
        assert_eq!(entry.tick, 1);
        assert_eq!(entry.entry_type, LedgerEntryType::Push);
        assert_eq!(entry.item, Item::IronIngot);
        assert_eq!(entry.quantity, 5);
    }

    #[test]
    fn zero_quantity_rejected() {
        let tile = TileKey::new(0, 0, 0);
        let result = TransactionBuilder::new(1, LedgerEntryType::Produce, Item::Quartz)
            .from(LedgerActor::World)
            .to(LedgerActor::Building(tile))
            .quantity(0)
            .reason("PRODUCE".to_owned())
            .build();

        assert!(matches!(result, Err(LedgerError::ZeroQuantity)));
    }

    #[test]
    fn wrong_actor_kind_rejected() {
        // Produce expects World -> Building, not Building -> Building.
        let a = TileKey::new(0, 1, 1);
        let b = TileKey::new(0, 1, 2);
        let result = TransactionBuilder::new(1, LedgerEntryType::Produce, Item::Quartz)
            .from(LedgerActor::Building(a))
            .to(LedgerActor::Building(b))
            .quantity(1)
            .reason("PRODUCE".to_owned())
            .build();

        assert!(matches!(result, Err(LedgerError::InvalidActor { .. })));
    }

    #[test]
    fn missing_quantity_rejected() {
        let a = TileKey::new(0, 1, 1);
        let b = TileKey::new(0, 1, 2);
        let result = TransactionBuilder::new(1, LedgerEntryType::Push, Item::IronOre)
            .from(LedgerActor::Building(a))
            .to(LedgerActor::Building(b))
            .reason("CONVEYOR".to_owned())
            .build();

        assert!(matches!(result, Err(LedgerError::MissingField("quantity"))));
    }

    #[test]
    fn reference_id_is_optional() {
        let a = TileKey::new(0, 1, 1);
        let b = TileKey::new(0, 1, 2);
        let reference = LedgerEntryId::new();
        let result = TransactionBuilder::new(1, LedgerEntryType::Push, Item::CopperIngot)
            .from(LedgerActor::Building(a))
            .to(LedgerActor::Building(b))
            .quantity(2)
            .reason("CONVEYOR".to_owned())
            .reference_id(reference)
            .build();

        let entry = result.expect("valid entry");
        assert_eq!(entry.reference_id, Some(reference));
    }

    #[test]
    fn all_entry_types_have_valid_actor_mappings() {
        // Exhaustive coverage -- if a new entry type is added, this test
        // will fail to compile until its mapping is defined.
        let all_types = [
            LedgerEntryType::Push,
            LedgerEntryType::Produce,
            LedgerEntryType::Consume,
            LedgerEntryType::Submit,
            LedgerEntryType::Eject,
        ];

        for entry_type in all_types {
            let (from, to) = expected_actor_kinds(entry_type);
            assert_ne!(from.label(), "");
            assert_ne!(to.label(), "");
        }
    }

    #[test]
    fn submit_targets_a_terminal() {
        let building = TileKey::new(0, 2, 2);
        let owner = PlayerId::new();
        let result = TransactionBuilder::new(1, LedgerEntryType::Submit, Item::TitaniumIngot)
            .from(LedgerActor::Building(building))
            .to(LedgerActor::Terminal(owner))
            .quantity(3)
            .reason("SUBMIT".to_owned())
            .build();

        assert!(result.is_ok());
    }
}
