//! Closed enumerations for the Spheric world engine (spec.md 3.2).
//!
//! Every persisted atom-valued field serializes to a lowercase snake_case
//! string (spec.md 6.3); unknown strings encountered on load fall into a
//! reserved `Opaque` variant that re-emits the original string intact
//! rather than failing deserialization (spec.md 9 design note).

use serde::{Deserialize, Serialize};

use crate::ids::{DroneId, PlayerId};
use crate::tile::TileKey;

/// Terrain biome assigned to a tile at world generation and never changed
/// afterwards (spec.md 3.4: terrain is immutable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    /// Frozen highlands; favors ice and iron veins.
    Tundra,
    /// Temperate woodland.
    Forest,
    /// Open plains, the most common biome.
    Grassland,
    /// Arid lowlands.
    Desert,
    /// Molten badlands; favors sulfur and uranium veins.
    Volcanic,
}

impl Biome {
    /// All biome variants, in latitude order (tundra at the poles to
    /// volcanic at the opposite pole) as used by the world generator.
    pub const ALL: [Self; 5] = [
        Self::Tundra,
        Self::Forest,
        Self::Grassland,
        Self::Desert,
        Self::Volcanic,
    ];
}

/// A resource vein found on a tile (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Common structural ore.
    Iron,
    /// Conductive ore, used in electronics.
    Copper,
    /// Crystal used in precision components.
    Quartz,
    /// Rare, heat-resistant ore.
    Titanium,
    /// Liquid fuel resource.
    Oil,
    /// Reactive mineral, used in advanced chemistry.
    Sulfur,
    /// Radioactive ore, power-generation fuel.
    Uranium,
    /// Frozen water, the sole Tundra-exclusive resource.
    Ice,
}

impl ResourceKind {
    /// All resource kinds, in the fixed order used for weighted vein
    /// seeding (spec.md 4.C).
    pub const ALL: [Self; 8] = [
        Self::Iron,
        Self::Copper,
        Self::Quartz,
        Self::Titanium,
        Self::Oil,
        Self::Sulfur,
        Self::Uranium,
        Self::Ice,
    ];

    /// The item kind a miner extracts from this resource (spec.md 4.D.5:
    /// the resource-kind to item-kind mapping is fixed).
    #[must_use]
    pub const fn mined_item(self) -> Item {
        match self {
            Self::Iron => Item::IronOre,
            Self::Copper => Item::CopperOre,
            Self::Quartz => Item::Quartz,
            Self::Titanium => Item::TitaniumOre,
            Self::Oil => Item::CrudeOil,
            Self::Sulfur => Item::Sulfur,
            Self::Uranium => Item::UraniumOre,
            Self::Ice => Item::Ice,
        }
    }
}

/// An item kind that can occupy a ground tile, a conveyor slot, a building
/// slot, or a drone's cargo hold.
///
/// Round-trippable through persistence (spec.md 9): every variant maps
/// to and from a fixed lowercase snake_case string, with [`Item::Opaque`]
/// as the reserved catch-all for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Item {
    /// Mined from [`ResourceKind::Iron`].
    IronOre,
    /// Smelted from `IronOre`.
    IronIngot,
    /// Mined from [`ResourceKind::Copper`].
    CopperOre,
    /// Smelted from `CopperOre`.
    CopperIngot,
    /// Mined from [`ResourceKind::Quartz`].
    Quartz,
    /// Mined from [`ResourceKind::Titanium`].
    TitaniumOre,
    /// Smelted from `TitaniumOre`.
    TitaniumIngot,
    /// Mined from [`ResourceKind::Oil`].
    CrudeOil,
    /// Refined from `CrudeOil`.
    Biofuel,
    /// Mined from [`ResourceKind::Sulfur`].
    Sulfur,
    /// Mined from [`ResourceKind::Uranium`].
    UraniumOre,
    /// Refined from `UraniumOre`.
    EnrichedUranium,
    /// Mined from [`ResourceKind::Ice`].
    Ice,
    /// Assembled from iron and copper ingots.
    BasicComponent,
    /// Assembled from titanium ingots and quartz.
    AdvancedComponent,
    /// Top-tier assembled good, used for board-contact contributions.
    PrecisionAssembly,
    /// Dropped by a defeated hiss entity.
    HissResidue,
    /// An unrecognized item kind encountered on load (forward
    /// compatibility, spec.md 9) -- carries the original string so it can
    /// be re-emitted intact.
    Opaque(String),
}

impl Item {
    /// The fixed lowercase snake_case string this item persists as
    /// (spec.md 6.3), including inside `state_json` and as a map key --
    /// see the hand-written `Serialize`/`Deserialize` impls below.
    #[must_use]
    pub fn as_atom(&self) -> String {
        match self {
            Self::IronOre => "iron_ore".to_owned(),
            Self::IronIngot => "iron_ingot".to_owned(),
            Self::CopperOre => "copper_ore".to_owned(),
            Self::CopperIngot => "copper_ingot".to_owned(),
            Self::Quartz => "quartz".to_owned(),
            Self::TitaniumOre => "titanium_ore".to_owned(),
            Self::TitaniumIngot => "titanium_ingot".to_owned(),
            Self::CrudeOil => "crude_oil".to_owned(),
            Self::Biofuel => "biofuel".to_owned(),
            Self::Sulfur => "sulfur".to_owned(),
            Self::UraniumOre => "uranium_ore".to_owned(),
            Self::EnrichedUranium => "enriched_uranium".to_owned(),
            Self::Ice => "ice".to_owned(),
            Self::BasicComponent => "basic_component".to_owned(),
            Self::AdvancedComponent => "advanced_component".to_owned(),
            Self::PrecisionAssembly => "precision_assembly".to_owned(),
            Self::HissResidue => "hiss_residue".to_owned(),
            Self::Opaque(s) => s.clone(),
        }
    }

    /// Parse a persisted atom string back into an item, falling back to
    /// [`Item::Opaque`] for anything unrecognized (spec.md 9: forward
    /// compatibility -- unknown strings round-trip intact).
    #[must_use]
    pub fn from_atom(atom: &str) -> Self {
        match atom {
            "iron_ore" => Self::IronOre,
            "iron_ingot" => Self::IronIngot,
            "copper_ore" => Self::CopperOre,
            "copper_ingot" => Self::CopperIngot,
            "quartz" => Self::Quartz,
            "titanium_ore" => Self::TitaniumOre,
            "titanium_ingot" => Self::TitaniumIngot,
            "crude_oil" => Self::CrudeOil,
            "biofuel" => Self::Biofuel,
            "sulfur" => Self::Sulfur,
            "uranium_ore" => Self::UraniumOre,
            "enriched_uranium" => Self::EnrichedUranium,
            "ice" => Self::Ice,
            "basic_component" => Self::BasicComponent,
            "advanced_component" => Self::AdvancedComponent,
            "precision_assembly" => Self::PrecisionAssembly,
            "hiss_residue" => Self::HissResidue,
            other => Self::Opaque(other.to_owned()),
        }
    }
}

/// Serializes as the bare atom string (spec.md 6.3), not as an
/// externally tagged enum -- so an `Item` also works as a JSON object
/// key (a derived `Serialize` would reject `Opaque` there, since
/// `serde_json` only accepts string-producing key serializers).
impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_atom())
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let atom = String::deserialize(deserializer)?;
        Ok(Self::from_atom(&atom))
    }
}

/// The kind of building placed on a tile (spec.md 3.2, 4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Extracts ore from an underlying resource tile (spec.md 4.D.5).
    Extractor,
    /// Single-input, single-output smelting furnace (production template).
    Smelter,
    /// Multi-input assembler (production template).
    Assembler,
    /// Liquid/ore refinery (production template).
    Refinery,
    /// Tier-1 conveyor, 1-slot FIFO.
    ConveyorT1,
    /// Tier-2 conveyor, 2-slot FIFO.
    ConveyorT2,
    /// Tier-3 conveyor, 3-slot FIFO.
    ConveyorT3,
    /// Rear to left/right, alternating.
    Splitter,
    /// Left/right to front, left-first tie-break.
    Merger,
    /// Left/right to front, left always wins.
    PriorityMerger,
    /// Rear to less-full side.
    Balancer,
    /// Rear to matching/non-matching side by altered-item filter.
    FilteredSplitter,
    /// Rear to forward primary, left overflow.
    OverflowGate,
    /// Two independent through-routes sharing no slot.
    Crossover,
    /// Teleports items to a linked partner tile.
    UndergroundConduit,
    /// Pulls items between nearby tiles.
    LoaderArm,
    /// Pushes items between nearby tiles.
    UnloaderArm,
    /// Buffers items with extractable/pending split.
    StorageContainer,
    /// Scans for and captures wild creatures.
    ContainmentTrap,
    /// Corruption-immunity field, small radius.
    PurificationBeacon,
    /// Corruption-immunity field, large radius.
    DimensionalStabilizer,
    /// Attacks nearby hiss entities.
    DefenseTurret,
    /// Power producer burning biofuel.
    BioGenerator,
    /// Power producer driven by illumination.
    ShadowPanel,
    /// Illuminates nearby tiles, suppressing shadow-panel output.
    Lamp,
    /// Extends a power network's radius.
    Substation,
    /// Extends a power network's radius further; only links to other
    /// transfer stations.
    TransferStation,
    /// Drains input items, crediting owner research.
    SubmissionTerminal,
    /// Drains input items into a linked trade record.
    TradeTerminal,
    /// Houses an upgradeable, optionally autonomous delivery drone.
    DroneBay,
    /// Claims a territory of exclusive placement rights.
    JurisdictionBeacon,
}

/// The kind of wild or captured creature roaming a face (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureKind {
    /// Grants a speed boost when assigned.
    Skitterling,
    /// Grants an efficiency boost when assigned.
    Plodder,
    /// Grants an output boost when assigned.
    Wisp,
    /// Grants an area boost when assigned.
    Ranger,
    /// Grants a defense boost when assigned.
    Bulwark,
    /// Grants a boost to all categories when assigned.
    Prism,
}

/// The typed boost a captured creature grants its assigned building
/// (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostKind {
    /// Multiplies effective rate.
    Speed,
    /// Reduces input requirements.
    Efficiency,
    /// Multiplies output quantity.
    Output,
    /// Extends acceptance/search radius.
    Area,
    /// Multiplies defensive capability (turret damage, trap capture rate).
    Defense,
    /// Applies to every category above.
    All,
}

impl CreatureKind {
    /// The boost category this creature kind grants when assigned.
    #[must_use]
    pub const fn boost(self) -> BoostKind {
        match self {
            Self::Skitterling => BoostKind::Speed,
            Self::Plodder => BoostKind::Efficiency,
            Self::Wisp => BoostKind::Output,
            Self::Ranger => BoostKind::Area,
            Self::Bulwark => BoostKind::Defense,
            Self::Prism => BoostKind::All,
        }
    }
}

/// A world event kind (spec.md 3.2, 4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Hiss spawn rate and aggression increase.
    HissSurge,
    /// Random ground-item debris showers across a face.
    MeteorShower,
    /// Push resolution skips an extra downstream tile per producer class.
    ResonanceCascade,
    /// Wild creature spawn rate and migration increase.
    EntityMigration,
}

impl EventKind {
    /// All event kinds, in roll-weight declaration order.
    pub const ALL: [Self; 4] = [
        Self::HissSurge,
        Self::MeteorShower,
        Self::ResonanceCascade,
        Self::EntityMigration,
    ];
}

/// Shift-cycle phase, derived from `sun_angle` quadrant (spec.md 3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPhase {
    /// `sun_angle` in `[0, pi/2)`.
    Dawn,
    /// `sun_angle` in `[pi/2, pi)`.
    Zenith,
    /// `sun_angle` in `[pi, 3pi/2)`.
    Dusk,
    /// `sun_angle` in `[3pi/2, 2pi)`.
    Nadir,
}

/// The category of an item movement recorded in the ledger (spec.md 8,
/// invariant 3: item conservation). Every entry has a fixed, checkable
/// pair of expected source/destination [`crate::structs::LedgerActor`]
/// kinds -- see `spheric_ledger::transaction::expected_actor_kinds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// An item moves between two buildings: a conveyor step, an arm
    /// transfer, or a router push. Conserves: the same item leaves one
    /// building and arrives at another.
    Push,
    /// A building's recipe or extractor produces a new item out of raw
    /// material that wasn't itself an item (a recipe's abstract inputs,
    /// or a tile's resource deposit). Source flow.
    Produce,
    /// A building's recipe consumes an input item. Sink flow.
    Consume,
    /// A building feeds an item into a submission terminal, permanently
    /// removing it from circulation and crediting the owner's research
    /// progress. Sink flow.
    Submit,
    /// A building (or a delivery drone) deposits an item onto the
    /// ground, via the `Eject` command or a drone dropping cargo on
    /// fuel exhaustion. Conserves: the item still exists, just at a
    /// different address.
    Eject,
}

/// One side of a ledger entry: the actor an item moved from or to
/// (spec.md 8, invariant 3). `World` and `Void` are not addressable
/// locations; they stand in for items entering or leaving the
/// simulation entirely (a recipe's abstract output, a consumed input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum LedgerActor {
    /// The simulation itself, as the source of a produced item.
    World,
    /// A building at the given tile.
    Building(TileKey),
    /// A ground item stack at the given tile.
    Ground(TileKey),
    /// A delivery drone in flight.
    Drone(DroneId),
    /// A player's submission terminal.
    Terminal(PlayerId),
    /// The sink for a consumed item; nothing tracks it further.
    Void,
}

/// A purchasable owner-wide upgrade gated by research clearance
/// (spec.md 3.2, glossary "Object of Power").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Delivery drones hold 4 items instead of 2.
    DroneCargoExpansion,
    /// Arms transfer more than 1 item per tick.
    ArmStackUpgrade,
    /// Enables a drone bay's autonomous delivery routine.
    DeliveryDroneEnabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_atoms_round_trip() {
        for item in [
            Item::IronOre,
            Item::IronIngot,
            Item::CopperOre,
            Item::CopperIngot,
            Item::Quartz,
            Item::TitaniumOre,
            Item::TitaniumIngot,
            Item::CrudeOil,
            Item::Biofuel,
            Item::Sulfur,
            Item::UraniumOre,
            Item::EnrichedUranium,
            Item::Ice,
            Item::BasicComponent,
            Item::AdvancedComponent,
            Item::PrecisionAssembly,
            Item::HissResidue,
        ] {
            assert_eq!(Item::from_atom(&item.as_atom()), item);
        }
    }

    #[test]
    fn unrecognized_atom_becomes_opaque() {
        let item = Item::from_atom("future_alloy");
        assert_eq!(item, Item::Opaque(String::from("future_alloy")));
        assert_eq!(item.as_atom(), "future_alloy");
    }
}
