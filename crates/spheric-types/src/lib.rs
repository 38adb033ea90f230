//! Shared type definitions for the Spheric world engine.
//!
//! This crate is the single source of truth for every type shared across
//! the Spheric workspace: spatial addressing, closed enumerations, entity
//! structs, the command API surface, and the per-face change-set
//! broadcast payload.
//!
//! # Modules
//!
//! - [`tile`] -- tile keys and cardinal directions
//! - [`ids`] -- type-safe UUID wrappers for non-spatial entity identifiers
//! - [`enums`] -- closed tagged enumerations (biomes, items, building kinds, ...)
//! - [`structs`] -- core entity structs (tiles, buildings, creatures, ...)
//! - [`command`] -- the Command API collaborators issue into the core
//! - [`changeset`] -- the per-face change-set broadcast payload

pub mod changeset;
pub mod command;
pub mod enums;
pub mod ids;
pub mod structs;
pub mod tile;

pub use changeset::{
    BuildingPlacedDelta, BuildingRemovedDelta, ChangeSet, CorruptionDelta, CreatureDelta,
    HissDelta, ItemInFlight, TerritoryDelta, WorldEventDelta,
};
pub use command::{Command, CommandError, CommandResult, PlacementRequest};
pub use enums::{
    Biome, BoostKind, BuildingKind, CreatureKind, EventKind, Item, LedgerActor, LedgerEntryType,
    ResourceKind, ShiftPhase, UpgradeKind,
};
pub use ids::{
    CreatureId, DroneId, HissId, LedgerEntryId, PlayerId, TerritoryId, TradeId, WorldEventId,
};
pub use structs::{
    ArmState, BehaviorState, Building, CapturedCreature, ConstructionState,
    ContainmentTrapState, ConveyorState, CorruptionField, DroneBayState,
    ExtractorState, GeneratorState, GroundItemStack, HissEntity, InputSlots, LedgerEntry,
    ProductionPhase, ProductionState, Recipe, ResearchProgress, ResourceDeposit, RouterState,
    ShiftCycleState, StorageState, TerminalState, Territory, Tile, Trade, TradeStatus,
    TurretState, WildCreature, WorldEventState,
};
pub use tile::{Direction, TileKey, FACE_COUNT, GRID_SIZE};
