//! Core entity structs for the Spheric world engine (spec.md 3.2-3.4).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{
    Biome, BoostKind, BuildingKind, CreatureKind, EventKind, Item, LedgerActor, LedgerEntryType,
    ResourceKind, ShiftPhase,
};
use crate::ids::{CreatureId, HissId, LedgerEntryId, PlayerId, TerritoryId};
use crate::tile::{Direction, TileKey};

// ---------------------------------------------------------------------------
// Tiles and ground items
// ---------------------------------------------------------------------------

/// A resource vein remaining on a tile (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    /// The ore/material kind.
    pub kind: ResourceKind,
    /// Remaining amount, `0..=500`. Monotonically decreases (spec.md 3.4).
    pub amount: u16,
}

/// A single tile. Terrain is set once at world generation and never
/// changes afterwards; only `resource.amount` may decrease over time
/// (spec.md 3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Immutable terrain biome.
    pub terrain: Biome,
    /// Remaining resource vein, if any.
    pub resource: Option<ResourceDeposit>,
}

/// A stack of one item kind sitting on the ground at a tile key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundItemStack {
    /// The item kind.
    pub item: Item,
    /// Count of items in the stack.
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// Requirements and progress for a placed-but-not-yet-operational
/// building (spec.md 3.2, invariant 5: construction sites don't tick
/// behavior or accept recipe inputs, only items in `required`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionState {
    /// Items (and quantities) still needed to complete construction.
    pub required: BTreeMap<Item, u16>,
    /// Items delivered so far.
    pub delivered: BTreeMap<Item, u16>,
    /// Set once every required item has been delivered in full.
    pub complete: bool,
}

impl ConstructionState {
    /// Construct a fresh construction site from its bill of materials.
    #[must_use]
    pub fn new(required: BTreeMap<Item, u16>) -> Self {
        let complete = required.is_empty();
        Self {
            required,
            delivered: BTreeMap::new(),
            complete,
        }
    }

    /// Deliver up to `count` of `item`, returning how many were actually
    /// accepted (never more than still required).
    pub fn deliver(&mut self, item: &Item, count: u16) -> u16 {
        let Some(&needed_total) = self.required.get(item) else {
            return 0;
        };
        let have = self.delivered.entry(item.clone()).or_insert(0);
        let remaining = needed_total.saturating_sub(*have);
        let accepted = remaining.min(count);
        *have = have.saturating_add(accepted);
        self.recompute_complete();
        accepted
    }

    fn recompute_complete(&mut self) {
        self.complete = self
            .required
            .iter()
            .all(|(item, needed)| self.delivered.get(item).copied().unwrap_or(0) >= *needed);
    }
}

/// A building's live behavior state. Construction sites never tick these
/// (spec.md 3.2, invariant 5) until `ConstructionState::complete` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Production-template state machine (smelters, assemblers, ...).
    Production(ProductionState),
    /// Passive FIFO conveyor slots, leading slot first.
    Conveyor(ConveyorState),
    /// Splitter/merger/balancer/etc. routing state.
    Router(RouterState),
    /// Loader/unloader arm state.
    Arm(ArmState),
    /// Extractor (miner) state.
    Extractor(ExtractorState),
    /// Storage container state (extractable vs. pending split).
    Storage(StorageState),
    /// Containment trap capture progress.
    ContainmentTrap(ContainmentTrapState),
    /// Defense turret cooldown/output buffer.
    DefenseTurret(TurretState),
    /// Bio generator or shadow panel power-producer state.
    Generator(GeneratorState),
    /// Purification beacon / dimensional stabilizer (purely passive).
    PassiveField,
    /// Submission or trade terminal drain state.
    Terminal(TerminalState),
    /// Drone bay upgrade/autonomy state.
    DroneBay(DroneBayState),
    /// Jurisdiction beacon (purely passive beyond territory bookkeeping).
    JurisdictionBeacon,
    /// Lamp (purely passive illumination source).
    Lamp,
}

/// Idle -> Processing -> Drain -> Idle state machine shared by every
/// recipe-driven building (spec.md 4.D.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionPhase {
    /// Waiting for input slots to be filled.
    Idle,
    /// Consuming ticks toward `rate`.
    Processing,
    /// Pushing `output_remaining` copies of `output_buffer` downstream.
    Drain,
}

/// Up to 3 labeled input slots, each holding one item kind and a count.
pub type InputSlots = [Option<(Item, u16)>; 3];

/// Full state for one production-template building instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionState {
    /// Current phase.
    pub phase: ProductionPhase,
    /// Input slot contents, `None` for unused slots (1/2/3-slot kinds).
    pub input_slots: InputSlots,
    /// Ticks accumulated toward the active recipe's `rate`.
    pub progress: u32,
    /// Output item currently draining, if any.
    pub output_buffer: Option<Item>,
    /// Remaining copies of `output_buffer` still to push downstream.
    pub output_remaining: u16,
    /// Whether a creature must be assigned for this instance to tick
    /// (some recipe kinds require it, spec.md 4.D.1).
    pub requires_creature: bool,
}

impl ProductionState {
    /// A fresh idle instance with empty input slots.
    #[must_use]
    pub const fn new(requires_creature: bool) -> Self {
        Self {
            phase: ProductionPhase::Idle,
            input_slots: [None, None, None],
            progress: 0,
            output_buffer: None,
            output_remaining: 0,
            requires_creature,
        }
    }
}

/// FIFO buffer for a tier-k conveyor: `slots.len() == k`, `slots[0]` is
/// the only extractable (leading) slot (spec.md 3.3 invariant 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConveyorState {
    /// Slot contents, index 0 leading.
    pub slots: Vec<Option<Item>>,
}

impl ConveyorState {
    /// A fresh conveyor with `tier` empty slots.
    #[must_use]
    pub fn new(tier: u8) -> Self {
        Self {
            slots: vec![None; usize::from(tier.max(1))],
        }
    }
}

/// Alternation / tie-break state shared by splitter, merger, priority
/// merger, balancer, filtered splitter, overflow gate, and crossover
/// (spec.md 4.D.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterState {
    /// Single input slot awaiting routing, rear-fed routers only.
    pub input_slot: Option<Item>,
    /// Alternation bit: `false` = left/primary next, `true` = right next.
    /// Only advances on a successful push (spec.md 4.E.2).
    pub alternate: bool,
    /// Optional linked partner tile for underground conduits.
    pub linked_partner: Option<TileKey>,
    /// Second input slot for two-input routers (merger/balancer/crossover).
    pub input_slot_b: Option<Item>,
}

impl RouterState {
    /// A fresh router with empty slots and no link.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input_slot: None,
            alternate: false,
            linked_partner: None,
            input_slot_b: None,
        }
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Loader/unloader arm state: pulls/pushes one item between two tiles
/// within Manhattan distance 2 (spec.md 4.D.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmState {
    /// Source tile the arm pulls from.
    pub source: TileKey,
    /// Destination tile the arm pushes to.
    pub destination: TileKey,
    /// Whether the arm has a stack-upgrade increasing per-tick throughput.
    pub stack_upgrade: bool,
}

/// Extractor (miner) timing state (spec.md 4.D.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorState {
    /// Ticks since the last extraction.
    pub ticks_since_extraction: u32,
    /// Output slot holding the last extracted item awaiting push.
    pub output_buffer: Option<Item>,
}

/// Storage container with the fairness split between already-stored
/// (extractable) and pending-this-tick (arm-inserted) counts
/// (spec.md 4.D.4, testable property 7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageState {
    /// Extractable counts per item, available to arms/drones immediately.
    pub stored: BTreeMap<Item, u32>,
    /// Counts inserted by arms this tick, not yet extractable; moved into
    /// `stored` at end-of-tick consolidation.
    pub pending: BTreeMap<Item, u32>,
}

impl StorageState {
    /// An empty storage container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stored: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }

    /// Move all pending counts into stored (end-of-tick consolidation,
    /// spec.md 4.E.1 phase 8).
    pub fn consolidate(&mut self) {
        for (item, count) in &self.pending {
            *self.stored.entry(item.clone()).or_insert(0) += count;
        }
        self.pending.clear();
    }
}

impl Default for StorageState {
    fn default() -> Self {
        Self::new()
    }
}

/// Containment trap capture progress against wild creatures in radius
/// (spec.md 4.D.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentTrapState {
    /// Creature currently being captured, if any.
    pub target: Option<CreatureId>,
    /// Accumulated capture progress toward 15 (spec.md 4.D.6).
    pub progress: u8,
}

/// Defense turret cooldown and loot-drop buffer (spec.md 4.D.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurretState {
    /// Ticks remaining before the next attack may be fired.
    pub cooldown: u16,
    /// Hiss residue awaiting push to an adjacent conveyor/ground tile.
    pub output_buffer: Option<Item>,
}

/// Bio generator / shadow panel power-producer state (spec.md 4.D.6, 4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorState {
    /// Remaining fuel in ticks (bio generator only; unused by shadow
    /// panels, spec.md 9 Open Question 2: fuel is a tick countdown).
    pub fuel_remaining_ticks: u32,
    /// Whether the generator is currently producing power.
    pub producing: bool,
}

/// Submission/trade terminal drain state (spec.md 4.E.1 phase 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalState {
    /// Single input slot awaiting drain.
    pub input_slot: Option<Item>,
    /// Linked trade id for trade terminals, `None` for submission
    /// terminals.
    pub linked_trade: Option<crate::ids::TradeId>,
    /// Running total submitted, used by the iron-chain scenario
    /// (spec.md 8 end-to-end scenario 1).
    pub total_submitted: u64,
}

impl TerminalState {
    /// A fresh, empty terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input_slot: None,
            linked_trade: None,
            total_submitted: 0,
        }
    }
}

impl Default for TerminalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Drone bay state (spec.md 4.D.6, 4.E.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneBayState {
    /// Whether the autonomous delivery routine is enabled (the
    /// `DeliveryDroneEnabled` upgrade takes effect the tick it's
    /// purchased).
    pub delivery_drone_enabled: bool,
    /// Cargo capacity: 2, or 4 with the cargo-expansion upgrade.
    pub cargo_capacity: u8,
}

/// A placed building. At most one per tile key (spec.md 3.3 invariant 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Building kind.
    pub kind: BuildingKind,
    /// Facing orientation.
    pub orientation: Direction,
    /// Owning player.
    pub owner: PlayerId,
    /// Present while the building is still under construction; `None`
    /// once materials are delivered and the site transitions to ticking
    /// behavior state.
    pub construction: Option<ConstructionState>,
    /// Live behavior state machine.
    pub state: BehaviorState,
    /// Read-only snapshot of the most recent power-resolution pass
    /// (spec.md 3.3 invariant 7: never set by behaviors themselves).
    pub powered: bool,
    /// Creature assigned to this building, if any (spec.md 3.2).
    pub assigned_creature: Option<CreatureId>,
}

impl Building {
    /// True while under construction and therefore not yet ticking
    /// (spec.md 3.3 invariant 5, 8 property 8).
    #[must_use]
    pub fn is_under_construction(&self) -> bool {
        self.construction.as_ref().is_some_and(|c| !c.complete)
    }
}

// ---------------------------------------------------------------------------
// Creatures and hiss
// ---------------------------------------------------------------------------

/// A wild creature roaming one face (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildCreature {
    /// Unique identifier.
    pub id: CreatureId,
    /// Creature kind.
    pub kind: CreatureKind,
    /// Current tile.
    pub position: TileKey,
    /// Tick the creature spawned at (for TTL despawn).
    pub spawned_at_tick: u64,
}

/// A captured creature living in an owner's roster (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedCreature {
    /// Unique identifier (preserved across capture).
    pub id: CreatureId,
    /// Creature kind.
    pub kind: CreatureKind,
    /// Owning player.
    pub owner: PlayerId,
    /// Building this creature currently boosts, if any.
    pub assigned_to: Option<TileKey>,
    /// Tick the creature was captured at.
    pub captured_at_tick: u64,
}

impl CapturedCreature {
    /// The boost category this creature grants its assignment.
    #[must_use]
    pub const fn boost(&self) -> BoostKind {
        self.kind.boost()
    }
}

/// A hostile hiss entity (spec.md 3.2, 4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HissEntity {
    /// Unique identifier.
    pub id: HissId,
    /// Current tile.
    pub position: TileKey,
    /// Remaining hit points.
    pub hp: u16,
    /// Building currently being targeted, if any.
    pub target: Option<TileKey>,
}

// ---------------------------------------------------------------------------
// Corruption, territory, research
// ---------------------------------------------------------------------------

/// Corruption intensity map: tiles absent from the map have intensity 0
/// (spec.md 3.2).
pub type CorruptionField = BTreeMap<TileKey, u8>;

/// A convex territory claimed by a jurisdiction beacon (spec.md 3.2,
/// invariant 6: distinct owners' territories never overlap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Unique identifier.
    pub id: TerritoryId,
    /// Owning player.
    pub owner: PlayerId,
    /// Tile the jurisdiction beacon occupies (center).
    pub center: TileKey,
    /// Claim radius, fixed at 8 (spec.md 3.2).
    pub radius: u8,
}

/// Current world-event state (spec.md 3.2, 4.G).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEventState {
    /// Currently active event, if any.
    pub active: Option<EventKind>,
    /// Tick the active event started at.
    pub started_at_tick: u64,
    /// Tick of the most recently *started* event (active or expired),
    /// used for the cooldown check (spec.md 4.G).
    pub last_event_tick: u64,
    /// History of past events and the tick each started.
    pub history: Vec<(EventKind, u64)>,
}

impl WorldEventState {
    /// A fresh state with no event ever having occurred.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: None,
            started_at_tick: 0,
            last_event_tick: 0,
            history: Vec::new(),
        }
    }
}

impl Default for WorldEventState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift-cycle (day/night) state (spec.md 3.2, 4.G).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftCycleState {
    /// Current sun angle in radians, `0..2*pi`.
    pub sun_angle: f32,
    /// Phase derived from `sun_angle`'s quadrant.
    pub phase: ShiftPhase,
    /// Ticks elapsed within the current phase, `0..600`.
    pub phase_tick: u16,
}

impl ShiftCycleState {
    /// The initial shift-cycle state: dawn, angle zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sun_angle: 0.0,
            phase: ShiftPhase::Dawn,
            phase_tick: 0,
        }
    }
}

impl Default for ShiftCycleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-owner research progress (spec.md 3.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchProgress {
    /// Unlocked clearance tier, `0..=8`.
    pub clearance: u8,
    /// Cumulative items submitted toward the next clearance tier.
    pub submitted: BTreeMap<Item, u32>,
}

impl ResearchProgress {
    /// A fresh, unresearched owner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clearance: 0,
            submitted: BTreeMap::new(),
        }
    }
}

impl Default for ResearchProgress {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Recipes and trades
// ---------------------------------------------------------------------------

/// One recipe a production-template building may run (spec.md 4.D.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Required input items and quantities, indexed by slot.
    pub inputs: Vec<(Item, u16)>,
    /// Produced items and quantities (spec.md 4.D.7: output identity is a
    /// function of the filled-slot tuple).
    pub output: Vec<(Item, u16)>,
    /// Ticks to complete once all inputs are loaded.
    pub rate: u32,
}

/// An owner-wide trade record (spec.md 6.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier.
    pub id: crate::ids::TradeId,
    /// Offering player.
    pub offerer: PlayerId,
    /// Items offered.
    pub offered_items: BTreeMap<Item, u32>,
    /// Items requested in exchange.
    pub requested_items: BTreeMap<Item, u32>,
    /// Current trade status.
    pub status: TradeStatus,
}

/// Status of a trade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Awaiting a counterparty.
    Open,
    /// Both sides have been fulfilled.
    Completed,
    /// Withdrawn by the offerer.
    Cancelled,
}

/// A single recorded item movement (spec.md 8, invariant 3: item
/// conservation). Immutable once created; the ledger is an append-only
/// log, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// Simulation tick the movement was recorded on.
    pub tick: u64,
    /// What kind of movement this was.
    pub entry_type: LedgerEntryType,
    /// Where the item moved from.
    pub from: LedgerActor,
    /// Where the item moved to.
    pub to: LedgerActor,
    /// Which item moved.
    pub item: Item,
    /// How many units moved.
    pub quantity: u32,
    /// Human-readable reason (e.g. `"PRODUCE"`, `"SUBMIT"`).
    pub reason: String,
    /// Optional reference to a related entry, for linking two halves of
    /// the same logical movement (e.g. a drone's pickup and its drop).
    pub reference_id: Option<LedgerEntryId>,
    /// Wall-clock time the entry was recorded.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_state_completes_when_all_delivered() {
        let mut required = BTreeMap::new();
        required.insert(Item::IronIngot, 5);
        let mut cs = ConstructionState::new(required);
        assert!(!cs.complete);
        let accepted = cs.deliver(&Item::IronIngot, 3);
        assert_eq!(accepted, 3);
        assert!(!cs.complete);
        let accepted = cs.deliver(&Item::IronIngot, 10);
        assert_eq!(accepted, 2);
        assert!(cs.complete);
    }

    #[test]
    fn construction_state_rejects_unrequired_items() {
        let mut required = BTreeMap::new();
        required.insert(Item::IronIngot, 1);
        let mut cs = ConstructionState::new(required);
        let accepted = cs.deliver(&Item::CopperIngot, 5);
        assert_eq!(accepted, 0);
    }

    #[test]
    fn empty_requirements_is_immediately_complete() {
        let cs = ConstructionState::new(BTreeMap::new());
        assert!(cs.complete);
    }

    #[test]
    fn storage_consolidation_moves_pending_into_stored() {
        let mut storage = StorageState::new();
        storage.pending.insert(Item::IronIngot, 4);
        storage.consolidate();
        assert_eq!(storage.stored.get(&Item::IronIngot), Some(&4));
        assert!(storage.pending.is_empty());
    }

    #[test]
    fn conveyor_new_has_tier_slots() {
        let c = ConveyorState::new(3);
        assert_eq!(c.slots.len(), 3);
        assert!(c.slots.iter().all(Option::is_none));
    }

    #[test]
    fn building_under_construction_until_complete() {
        let mut required = BTreeMap::new();
        required.insert(Item::IronIngot, 1);
        let building = Building {
            kind: BuildingKind::Smelter,
            orientation: Direction::East,
            owner: PlayerId::new(),
            construction: Some(ConstructionState::new(required)),
            state: BehaviorState::Production(ProductionState::new(false)),
            powered: false,
            assigned_creature: None,
        };
        assert!(building.is_under_construction());
    }

    #[test]
    fn building_not_under_construction_when_none() {
        let building = Building {
            kind: BuildingKind::ConveyorT1,
            orientation: Direction::North,
            owner: PlayerId::new(),
            construction: None,
            state: BehaviorState::Conveyor(ConveyorState::new(1)),
            powered: false,
            assigned_creature: None,
        };
        assert!(!building.is_under_construction());
    }
}
