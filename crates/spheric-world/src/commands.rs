//! Command API handlers (spec.md 6.1): the synchronous, fallible
//! surface collaborators (player clients, the operator console) use to
//! mutate the world between ticks.
//!
//! Every handler validates preconditions before writing anything, so a
//! rejected command never leaves partial state behind (spec.md 7).
//! Territory claims and research-clearance tiers are not tracked at
//! this layer, so [`CommandError::TerritoryViolation`] and
//! [`CommandError::NoClearance`] are never returned here; a collaborator
//! layer above this one is expected to pre-filter on those once it
//! exists.

use std::collections::BTreeMap;

use spheric_types::{
    ArmState, BehaviorState, Building, BuildingKind, Command, CommandError, CommandResult,
    ContainmentTrapState, ConveyorState, Direction, DroneBayState, ExtractorState,
    GeneratorState, Item, PlacementRequest, PlayerId, ProductionState, RouterState, StorageState,
    TerminalState, TileKey, TradeId, TurretState, UpgradeKind,
};

use crate::WorldStore;

/// Apply one command against `world`.
///
/// `Command::PlaceBatch` is not handled here: each of its elements
/// resolves independently (spec.md 6.1), so callers use
/// [`apply_batch`] instead and get one result per placement back.
///
/// # Errors
///
/// See [`CommandError`] for the full set of rejection reasons.
pub fn apply(world: &mut WorldStore, command: &Command) -> CommandResult {
    match command {
        Command::Place { key, kind, orientation, owner } => place(world, *key, *kind, *orientation, *owner),
        Command::PlaceBatch { .. } => Err(CommandError::InvalidKind),
        Command::Remove { key, owner } => remove(world, *key, *owner),
        Command::LinkConduit { a, b, owner } => link_conduit(world, *a, *b, *owner),
        Command::LinkTrade { key, trade_id, owner } => link_trade(world, *key, *trade_id, *owner),
        Command::Eject { key, owner } => eject(world, *key, *owner),
        Command::TogglePower { key, owner } => toggle_power(world, *key, *owner),
        Command::SelectUpgrade { key, upgrade, owner } => select_upgrade(world, *key, *upgrade, *owner),
        Command::ActivateBoardContact { owner: _ } => Ok(()),
    }
}

/// Resolve a `Command::PlaceBatch`'s placements independently, in order.
pub fn apply_batch(world: &mut WorldStore, placements: &[PlacementRequest]) -> Vec<CommandResult> {
    placements.iter().map(|request| place(world, request.key, request.kind, request.orientation, request.owner)).collect()
}

fn place(world: &mut WorldStore, key: TileKey, kind: BuildingKind, orientation: Direction, owner: PlayerId) -> CommandResult {
    let Some(tile) = world.get_tile(key) else { return Err(CommandError::InvalidTile) };
    if world.get_building(key).is_some() {
        return Err(CommandError::TileOccupied);
    }
    if kind == BuildingKind::Extractor && tile.resource.is_none() {
        return Err(CommandError::InvalidPlacement);
    }

    let building = Building {
        kind,
        orientation,
        owner,
        // No build-cost table is specified; placements complete
        // immediately rather than inventing one.
        construction: None,
        state: default_state(kind, key),
        powered: false,
        assigned_creature: None,
    };
    world.place_building(key, building).map_err(|_| CommandError::TileOccupied)
}

fn remove(world: &mut WorldStore, key: TileKey, owner: PlayerId) -> CommandResult {
    match world.get_building(key) {
        None => Err(CommandError::NoBuilding),
        Some(building) if building.owner != owner => Err(CommandError::NotOwner),
        Some(_) => {
            let _ = world.remove_building(key);
            Ok(())
        }
    }
}

fn link_conduit(world: &mut WorldStore, a: TileKey, b: TileKey, owner: PlayerId) -> CommandResult {
    for key in [a, b] {
        match world.get_building(key) {
            None => return Err(CommandError::NoBuilding),
            Some(building) if building.owner != owner => return Err(CommandError::NotOwner),
            Some(building) if building.kind != BuildingKind::UndergroundConduit => return Err(CommandError::NotConduit),
            Some(building) => {
                if let BehaviorState::Router(rs) = &building.state
                    && rs.linked_partner.is_some()
                {
                    return Err(CommandError::AlreadyLinked);
                }
            }
        }
    }

    if let Some(building) = world.get_building_mut(a)
        && let BehaviorState::Router(rs) = &mut building.state
    {
        rs.linked_partner = Some(b);
    }
    if let Some(building) = world.get_building_mut(b)
        && let BehaviorState::Router(rs) = &mut building.state
    {
        rs.linked_partner = Some(a);
    }
    Ok(())
}

fn link_trade(world: &mut WorldStore, key: TileKey, trade_id: TradeId, owner: PlayerId) -> CommandResult {
    let Some(building) = world.get_building_mut(key) else { return Err(CommandError::NoBuilding) };
    if building.owner != owner {
        return Err(CommandError::NotOwner);
    }
    let BehaviorState::Terminal(terminal) = &mut building.state else { return Err(CommandError::InvalidKind) };
    terminal.linked_trade = Some(trade_id);
    Ok(())
}

fn eject(world: &mut WorldStore, key: TileKey, owner: PlayerId) -> CommandResult {
    let Some(building) = world.get_building(key) else { return Err(CommandError::NoBuilding) };
    if building.owner != owner {
        return Err(CommandError::NotOwner);
    }

    let items: Vec<(Item, u32)> = match &building.state {
        BehaviorState::Storage(storage) => storage.stored.iter().map(|(item, count)| (item.clone(), *count)).collect(),
        BehaviorState::Terminal(terminal) => terminal.input_slot.iter().map(|item| (item.clone(), 1)).collect(),
        BehaviorState::Extractor(extractor) => extractor.output_buffer.iter().map(|item| (item.clone(), 1)).collect(),
        _ => Vec::new(),
    };
    if items.is_empty() {
        return Err(CommandError::InsufficientResources);
    }

    for (item, count) in &items {
        world.add_ground_items(key, item, *count);
    }

    if let Some(building) = world.get_building_mut(key) {
        match &mut building.state {
            BehaviorState::Storage(storage) => storage.stored.clear(),
            BehaviorState::Terminal(terminal) => terminal.input_slot = None,
            BehaviorState::Extractor(extractor) => extractor.output_buffer = None,
            _ => {}
        }
    }
    Ok(())
}

fn toggle_power(world: &mut WorldStore, key: TileKey, owner: PlayerId) -> CommandResult {
    let Some(building) = world.get_building_mut(key) else { return Err(CommandError::NoBuilding) };
    if building.owner != owner {
        return Err(CommandError::NotOwner);
    }
    building.powered = !building.powered;
    Ok(())
}

fn select_upgrade(world: &mut WorldStore, key: TileKey, upgrade: UpgradeKind, owner: PlayerId) -> CommandResult {
    let Some(building) = world.get_building_mut(key) else { return Err(CommandError::NoBuilding) };
    if building.owner != owner {
        return Err(CommandError::NotOwner);
    }
    match (&mut building.state, upgrade) {
        (BehaviorState::DroneBay(bay), UpgradeKind::DroneCargoExpansion) => {
            if bay.cargo_capacity > 2 {
                return Err(CommandError::AlreadyPurchased);
            }
            bay.cargo_capacity = 4;
            Ok(())
        }
        (BehaviorState::DroneBay(bay), UpgradeKind::DeliveryDroneEnabled) => {
            if bay.delivery_drone_enabled {
                return Err(CommandError::AlreadyPurchased);
            }
            bay.delivery_drone_enabled = true;
            Ok(())
        }
        (BehaviorState::Arm(arm), UpgradeKind::ArmStackUpgrade) => {
            if arm.stack_upgrade {
                return Err(CommandError::AlreadyPurchased);
            }
            arm.stack_upgrade = true;
            Ok(())
        }
        _ => Err(CommandError::InvalidKind),
    }
}

/// The fresh behavior state a newly placed building of `kind` starts in.
///
/// `key` seeds an arm's source/destination with its own placement tile;
/// there is no command parameter to set either end directly, so both
/// start pointed at the arm itself until a follow-up command (not yet
/// part of the API) retargets them.
fn default_state(kind: BuildingKind, key: TileKey) -> BehaviorState {
    match kind {
        BuildingKind::Extractor => BehaviorState::Extractor(ExtractorState { ticks_since_extraction: 0, output_buffer: None }),
        BuildingKind::Smelter | BuildingKind::Assembler | BuildingKind::Refinery => BehaviorState::Production(ProductionState::new(false)),
        BuildingKind::ConveyorT1 => BehaviorState::Conveyor(ConveyorState::new(1)),
        BuildingKind::ConveyorT2 => BehaviorState::Conveyor(ConveyorState::new(2)),
        BuildingKind::ConveyorT3 => BehaviorState::Conveyor(ConveyorState::new(3)),
        BuildingKind::Splitter
        | BuildingKind::Merger
        | BuildingKind::PriorityMerger
        | BuildingKind::Balancer
        | BuildingKind::FilteredSplitter
        | BuildingKind::OverflowGate
        | BuildingKind::Crossover
        | BuildingKind::UndergroundConduit => BehaviorState::Router(RouterState::new()),
        BuildingKind::LoaderArm | BuildingKind::UnloaderArm => {
            BehaviorState::Arm(ArmState { source: key, destination: key, stack_upgrade: false })
        }
        BuildingKind::StorageContainer => BehaviorState::Storage(StorageState::new()),
        BuildingKind::ContainmentTrap => BehaviorState::ContainmentTrap(ContainmentTrapState { target: None, progress: 0 }),
        BuildingKind::PurificationBeacon | BuildingKind::DimensionalStabilizer => BehaviorState::PassiveField,
        BuildingKind::DefenseTurret => BehaviorState::DefenseTurret(TurretState { cooldown: 0, output_buffer: None }),
        BuildingKind::BioGenerator | BuildingKind::ShadowPanel => BehaviorState::Generator(GeneratorState { fuel_remaining_ticks: 0, producing: false }),
        BuildingKind::Lamp => BehaviorState::Lamp,
        BuildingKind::Substation | BuildingKind::TransferStation => BehaviorState::PassiveField,
        BuildingKind::SubmissionTerminal | BuildingKind::TradeTerminal => BehaviorState::Terminal(TerminalState::new()),
        BuildingKind::DroneBay => BehaviorState::DroneBay(DroneBayState { delivery_drone_enabled: false, cargo_capacity: 2 }),
        BuildingKind::JurisdictionBeacon => BehaviorState::JurisdictionBeacon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spheric_types::{Biome, ResourceDeposit, ResourceKind, Tile};

    fn grassland(key: TileKey, world: &mut WorldStore) {
        world.set_tile(key, Tile { terrain: Biome::Grassland, resource: None });
    }

    #[test]
    fn place_rejects_an_occupied_tile() {
        let mut world = WorldStore::new();
        let key = TileKey::new(0, 1, 1);
        let owner = PlayerId::new();
        grassland(key, &mut world);
        assert!(place(&mut world, key, BuildingKind::Lamp, Direction::East, owner).is_ok());
        assert_eq!(place(&mut world, key, BuildingKind::Lamp, Direction::East, owner), Err(CommandError::TileOccupied));
    }

    #[test]
    fn place_rejects_an_unseeded_tile() {
        let mut world = WorldStore::new();
        let owner = PlayerId::new();
        assert_eq!(place(&mut world, TileKey::new(0, 1, 1), BuildingKind::Lamp, Direction::East, owner), Err(CommandError::InvalidTile));
    }

    #[test]
    fn extractor_requires_a_resource_tile() {
        let mut world = WorldStore::new();
        let key = TileKey::new(0, 1, 1);
        let owner = PlayerId::new();
        grassland(key, &mut world);
        assert_eq!(place(&mut world, key, BuildingKind::Extractor, Direction::East, owner), Err(CommandError::InvalidPlacement));

        world.set_tile(key, Tile { terrain: Biome::Grassland, resource: Some(ResourceDeposit { kind: ResourceKind::Iron, amount: 10 }) });
        assert!(place(&mut world, key, BuildingKind::Extractor, Direction::East, owner).is_ok());
    }

    #[test]
    fn remove_rejects_a_non_owner() {
        let mut world = WorldStore::new();
        let key = TileKey::new(0, 1, 1);
        let owner = PlayerId::new();
        let other = PlayerId::new();
        grassland(key, &mut world);
        place(&mut world, key, BuildingKind::Lamp, Direction::East, owner).expect("placement succeeds");
        assert_eq!(remove(&mut world, key, other), Err(CommandError::NotOwner));
        assert!(remove(&mut world, key, owner).is_ok());
    }

    #[test]
    fn link_conduit_connects_both_ends() {
        let mut world = WorldStore::new();
        let owner = PlayerId::new();
        let a = TileKey::new(0, 1, 1);
        let b = TileKey::new(0, 1, 2);
        grassland(a, &mut world);
        grassland(b, &mut world);
        place(&mut world, a, BuildingKind::UndergroundConduit, Direction::East, owner).expect("place a");
        place(&mut world, b, BuildingKind::UndergroundConduit, Direction::East, owner).expect("place b");

        assert!(link_conduit(&mut world, a, b, owner).is_ok());

        let BehaviorState::Router(rs_a) = &world.get_building(a).expect("a exists").state else { unreachable!() };
        assert_eq!(rs_a.linked_partner, Some(b));
        let BehaviorState::Router(rs_b) = &world.get_building(b).expect("b exists").state else { unreachable!() };
        assert_eq!(rs_b.linked_partner, Some(a));

        assert_eq!(link_conduit(&mut world, a, b, owner), Err(CommandError::AlreadyLinked));
    }

    #[test]
    fn eject_empties_a_storage_container_onto_the_ground() {
        let mut world = WorldStore::new();
        let owner = PlayerId::new();
        let key = TileKey::new(0, 1, 1);
        grassland(key, &mut world);
        place(&mut world, key, BuildingKind::StorageContainer, Direction::East, owner).expect("placement succeeds");
        if let Some(building) = world.get_building_mut(key)
            && let BehaviorState::Storage(storage) = &mut building.state
        {
            storage.stored.insert(Item::IronOre, 5);
        }

        assert!(eject(&mut world, key, owner).is_ok());
        assert_eq!(world.get_ground_items(key).map(|s| (&s.item, s.count)), Some((&Item::IronOre, 5)));
    }

    #[test]
    fn toggle_power_flips_the_flag() {
        let mut world = WorldStore::new();
        let owner = PlayerId::new();
        let key = TileKey::new(0, 1, 1);
        grassland(key, &mut world);
        place(&mut world, key, BuildingKind::Lamp, Direction::East, owner).expect("placement succeeds");
        assert!(!world.get_building(key).expect("exists").powered);
        toggle_power(&mut world, key, owner).expect("toggle succeeds");
        assert!(world.get_building(key).expect("exists").powered);
    }

    #[test]
    fn select_upgrade_expands_drone_cargo_once() {
        let mut world = WorldStore::new();
        let owner = PlayerId::new();
        let key = TileKey::new(0, 1, 1);
        grassland(key, &mut world);
        place(&mut world, key, BuildingKind::DroneBay, Direction::East, owner).expect("placement succeeds");

        assert!(select_upgrade(&mut world, key, UpgradeKind::DroneCargoExpansion, owner).is_ok());
        assert_eq!(select_upgrade(&mut world, key, UpgradeKind::DroneCargoExpansion, owner), Err(CommandError::AlreadyPurchased));
    }
}
