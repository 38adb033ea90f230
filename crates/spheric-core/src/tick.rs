//! The eight-phase tick pipeline (spec.md 4.E.1) that drives one
//! simulation step: pre-phase bookkeeping, behavior ticks, push
//! resolution, terminal consumption, power resolution, creatures and
//! hiss, delivery drones, and end-of-tick consolidation.
//!
//! Every phase iterates buildings in the lexicographic tile-key order
//! [`spheric_world::WorldStore::buildings`] already provides, so two runs
//! given the same starting state and the same per-tick RNG stream produce
//! identical results (spec.md 4.E.3).

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use spheric_behaviors::routing::{self, Side};
use spheric_behaviors::{arms, conveyor, extractor, production, recipes_for, special, ModifierStack, RateClass};
use spheric_creatures::{corruption, creatures, hiss};
use spheric_events::{debris, effects, roll};
use spheric_geometry::neighbor;
use spheric_ledger::Ledger;
use spheric_power::{self, PowerNode};
use spheric_types::{
    BehaviorState, Building, BuildingKind, ChangeSet, CorruptionDelta, CorruptionField, CreatureDelta, CreatureId, Direction, EventKind,
    GeneratorState, GroundItemStack, HissDelta, HissEntity, HissId, InputSlots, Item, ItemInFlight, ProductionPhase, ResourceKind, TileKey,
    WildCreature, WorldEventDelta, WorldEventState, FACE_COUNT, GRID_SIZE,
};
use spheric_world::WorldStore;

use crate::clock::WorldClock;

/// Ticks between power-network rebuilds (spec.md 4.E.1 phase 5).
const POWER_RESOLUTION_INTERVAL_TICKS: u64 = 5;

/// Ticks between wild-creature movement steps.
const CREATURE_MOVE_INTERVAL_TICKS: u64 = 5;

/// Ticks between hiss entity movement/spawn steps.
const HISS_STEP_INTERVAL_TICKS: u64 = 10;

/// Ticks between wild-creature spawn rolls.
const CREATURE_SPAWN_INTERVAL_TICKS: u64 = 25;

/// Ticks between corruption-field spread passes.
const CORRUPTION_SPREAD_INTERVAL_TICKS: u64 = 30;

/// Construction sites auto-consume matching ground items within this
/// Manhattan radius (spec.md 4.E.1 phase 1).
const CONSTRUCTION_PICKUP_RADIUS: i16 = 3;

/// Base ticks-per-extraction for every extractor, before modifiers. Not
/// given a concrete number in the source material; chosen to sit between
/// the cheapest (rate 4) and priciest (rate 12) production recipes so
/// mining feels roughly as fast as a mid-tier smelter.
const EXTRACTOR_BASE_TICKS: u32 = 5;

/// Corruption intensity at or above which a tile can spawn a hiss entity
/// (the field tops out at 10; spawning only near the top keeps hiss
/// pressure tied to sustained, not incidental, corruption).
const HISS_SPAWN_THRESHOLD: u8 = 8;

/// Base number of hiss spawn candidates considered per hiss step, before
/// the world-event modifier.
const HISS_SPAWN_BASE_CANDIDATES: u32 = 2;

/// Radius within which a containment trap or defense turret scans for
/// targets.
const SCAN_RADIUS: u16 = 3;

/// Damage a defense turret volley deals to its target. Not given a
/// number in the source material; chosen so three volleys (30 ticks at
/// the turret's own cooldown) clear a fresh hiss entity's starting HP.
const TURRET_DAMAGE_PER_SHOT: u16 = 10;

const fn left_of(direction: Direction) -> Direction {
    direction.rotate(3)
}

const fn right_of(direction: Direction) -> Direction {
    direction.rotate(1)
}

/// Errors that can occur while running one tick. The pipeline never
/// panics; a hard failure here means the ledger found a conservation-law
/// violation.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The ledger detected a conservation-law violation this tick.
    #[error("ledger conservation violated at tick {0}")]
    LedgerAnomaly(u64),
}

/// Everything the tick pipeline reads and mutates for one simulation
/// instance. Owned by [`crate::runner`]; the operator layer only ever
/// sees [`TickSummary`] snapshots.
#[derive(Debug)]
pub struct SimulationState {
    /// The tick counter and shift-cycle derivation.
    pub clock: WorldClock,
    /// Tile, building, and ground-item storage.
    pub world: WorldStore,
    /// Active/past world events.
    pub events: WorldEventState,
    /// Per-tile corruption intensity.
    pub corruption: CorruptionField,
    /// Wild creatures currently roaming the grid.
    pub creatures: BTreeMap<CreatureId, WildCreature>,
    /// Hiss entities currently active.
    pub hiss: BTreeMap<HissId, HissEntity>,
    /// Double-entry item-conservation ledger.
    pub ledger: Ledger,
    /// World seed, mixed with the tick counter to derive this tick's
    /// deterministic RNG stream (spec.md 4.E.3).
    pub world_seed: u64,
}

impl SimulationState {
    /// A fresh simulation state over an already-generated `world`, with
    /// no active events, no corruption, and no creatures.
    #[must_use]
    pub fn new(world: WorldStore, world_seed: u64) -> Self {
        Self {
            clock: WorldClock::new(),
            world,
            events: WorldEventState::new(),
            corruption: CorruptionField::new(),
            creatures: BTreeMap::new(),
            hiss: BTreeMap::new(),
            ledger: Ledger::new(),
            world_seed,
        }
    }

    fn tick_rng(&self) -> ChaCha8Rng {
        let mixed = self.world_seed ^ self.clock.tick().wrapping_mul(0x9E37_79B9_7F4A_7C15);
        ChaCha8Rng::seed_from_u64(mixed)
    }
}

/// Per-face deltas and global world-event status produced by one tick,
/// handed to subscribers and the persistence layer (spec.md 4.E.1 phase
/// 8, 6.2).
#[derive(Debug, Default)]
pub struct TickSummary {
    /// The tick number this summary describes.
    pub tick: u64,
    /// Per-face change-sets, present only for faces with an observable
    /// delta this tick.
    pub change_sets: BTreeMap<u8, ChangeSet>,
    /// World-event transition this tick, if the active event started or
    /// ended.
    pub world_event_delta: Option<WorldEventDelta>,
    /// Tiles mutated this tick, handed to the persistence layer once the
    /// save interval elapses.
    pub dirty_tiles: Vec<TileKey>,
}

fn changeset_for(change_sets: &mut BTreeMap<u8, ChangeSet>, tick: u64, face: u8) -> &mut ChangeSet {
    change_sets.entry(face).or_insert_with(|| ChangeSet::empty(tick, face))
}

/// Run one full tick of the simulation, advancing every subsystem and
/// returning the observable deltas.
///
/// # Errors
///
/// Returns [`TickError::LedgerAnomaly`] if the conservation law does not
/// hold at the end of the tick; the caller decides whether to halt or
/// merely alert on this.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let mut rng = state.tick_rng();
    let tick = state.clock.advance();
    let mut change_sets: BTreeMap<u8, ChangeSet> = BTreeMap::new();

    let world_event_delta = phase_1_pre(state, tick, &mut rng);
    phase_2_behavior_tick(state);
    phase_3_push_resolution(state, tick, &mut change_sets);
    phase_4_consumption(state, tick);
    if tick.checked_rem(POWER_RESOLUTION_INTERVAL_TICKS).unwrap_or(1) == 0 {
        let sun_angle = state.clock.shift_cycle().sun_angle;
        phase_5_power_resolution(&mut state.world, sun_angle);
    }
    phase_6_creatures_and_hiss(state, tick, &mut rng, &mut change_sets);
    phase_7_delivery_drones(state, tick, &mut change_sets);
    let dirty_tiles = phase_8_end_of_tick(state, tick)?;

    Ok(TickSummary { tick, change_sets, world_event_delta, dirty_tiles })
}

// ---------------------------------------------------------------------------
// Phase 1: pre-phase
// ---------------------------------------------------------------------------

fn phase_1_pre(state: &mut SimulationState, tick: u64, rng: &mut ChaCha8Rng) -> Option<WorldEventDelta> {
    let was_active = state.events.active;
    state.events = roll::tick(std::mem::take(&mut state.events), tick, rng);
    let is_active = state.events.active;

    if is_active == Some(EventKind::MeteorShower) {
        let face = rng.random_range(0..FACE_COUNT);
        for (tile, stack) in debris::roll_impacts(face, rng) {
            state.world.add_ground_items(tile, &stack.item, stack.count);
        }
    }

    construction_auto_consume(&mut state.world);

    if was_active == is_active {
        None
    } else {
        Some(WorldEventDelta {
            kind: is_active.or(was_active).unwrap_or(EventKind::HissSurge),
            active: is_active.is_some(),
        })
    }
}

fn construction_auto_consume(world: &mut WorldStore) {
    let sites: Vec<TileKey> = world.buildings().filter(|(_, building)| building.is_under_construction()).map(|(tile, _)| *tile).collect();

    for tile in sites {
        let needed: Vec<Item> = {
            let Some(building) = world.get_building(tile) else { continue };
            let Some(construction) = &building.construction else { continue };
            construction
                .required
                .iter()
                .filter(|(item, &amount)| construction.delivered.get(*item).copied().unwrap_or(0) < amount)
                .map(|(item, _)| item.clone())
                .collect()
        };

        for item in needed {
            let Some(pickup_tile) = find_nearby_ground_stack(world, tile, &item) else { continue };
            let Some((_, taken)) = world.take_ground_items(pickup_tile, u32::MAX) else { continue };
            let Ok(delivered) = u16::try_from(taken) else { continue };
            if let Some(building) = world.get_building_mut(tile)
                && let Some(construction) = &mut building.construction
            {
                let accepted = construction.deliver(&item, delivered);
                let leftover = delivered.saturating_sub(accepted);
                if leftover > 0 {
                    world.add_ground_items(pickup_tile, &item, u32::from(leftover));
                }
            }
        }
    }
}

fn find_nearby_ground_stack(world: &WorldStore, center: TileKey, item: &Item) -> Option<TileKey> {
    let radius = CONSTRUCTION_PICKUP_RADIUS;
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            if dr.abs().saturating_add(dc.abs()) > radius {
                continue;
            }
            let row = i16::from(center.row).checked_add(dr)?;
            let col = i16::from(center.col).checked_add(dc)?;
            let (Ok(row), Ok(col)) = (u8::try_from(row), u8::try_from(col)) else { continue };
            let Some(key) = TileKey::checked_new(center.face, row, col) else { continue };
            if let Some(stack) = world.get_ground_items(key)
                && stack.item == *item
            {
                return Some(key);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Phase 2: behavior tick
// ---------------------------------------------------------------------------

fn phase_2_behavior_tick(state: &mut SimulationState) {
    let tiles: Vec<TileKey> = state.world.buildings().map(|(key, _)| *key).collect();
    let active_event = state.events.active;

    for tile in tiles {
        let Some(building) = state.world.get_building(tile) else { continue };
        if building.is_under_construction() {
            continue;
        }
        let kind = building.kind;

        match building.state.clone() {
            BehaviorState::Production(ps) => {
                let base_rate = production_base_rate(kind, &ps.input_slots);
                let modifiers = ModifierStack { world_event: spheric_behaviors::world_event_multiplier(active_event, RateClass::Other), ..ModifierStack::identity() };
                let effective = spheric_behaviors::effective_rate(base_rate, modifiers);
                let has_creature = building.assigned_creature.is_some();
                let next = production::tick(&ps, &recipes_for(kind), has_creature, effective);
                record_production_drain(&mut state.ledger, state.clock.tick(), tile, &ps, &next);
                if let Some(building) = state.world.get_building_mut(tile) {
                    building.state = BehaviorState::Production(next);
                }
            }
            BehaviorState::Extractor(es) => {
                let (has_resource, mined_item) = resource_at(&state.world, tile);
                let modifiers = ModifierStack { world_event: spheric_behaviors::world_event_multiplier(active_event, RateClass::Extraction), ..ModifierStack::identity() };
                let rate = spheric_behaviors::effective_rate(EXTRACTOR_BASE_TICKS, modifiers);
                let next = extractor::tick(&es, rate, has_resource, mined_item.clone());
                if es.output_buffer.is_none() && next.output_buffer.is_some() {
                    deplete_resource(&mut state.world, tile);
                    if let Some(item) = &next.output_buffer {
                        let _ = state.ledger.record_produce(state.clock.tick(), item.clone(), 1, tile);
                    }
                }
                if let Some(building) = state.world.get_building_mut(tile) {
                    building.state = BehaviorState::Extractor(next);
                }
            }
            BehaviorState::DefenseTurret(ts) => {
                let nearest_target = state
                    .hiss
                    .iter()
                    .filter(|(_, entity)| entity.position.face == tile.face && manhattan(tile, entity.position) <= SCAN_RADIUS)
                    .min_by_key(|(id, _)| **id)
                    .map(|(id, _)| *id);
                let next = special::tick_turret(&ts, nearest_target.is_some());
                if ts.output_buffer.is_none() && next.output_buffer.is_some() {
                    let _ = state.ledger.record_produce(state.clock.tick(), Item::HissResidue, 1, tile);
                    if let Some(id) = nearest_target
                        && let Some(entity) = state.hiss.remove(&id)
                    {
                        let damaged = hiss::apply_damage(entity, TURRET_DAMAGE_PER_SHOT);
                        if !hiss::is_defeated(&damaged) {
                            state.hiss.insert(id, damaged);
                        }
                    }
                }
                if let Some(building) = state.world.get_building_mut(tile) {
                    building.state = BehaviorState::DefenseTurret(next);
                }
            }
            BehaviorState::ContainmentTrap(cs) => {
                let in_radius: Vec<CreatureId> = state
                    .creatures
                    .values()
                    .filter(|creature| creature.position.face == tile.face && manhattan(tile, creature.position) <= SCAN_RADIUS)
                    .map(|creature| creature.id)
                    .collect();
                let (next, captured) = special::tick_containment_trap(&cs, &in_radius);
                if let Some(id) = captured {
                    state.creatures.remove(&id);
                }
                if let Some(building) = state.world.get_building_mut(tile) {
                    building.state = BehaviorState::ContainmentTrap(next);
                }
            }
            BehaviorState::Generator(gs) if kind == BuildingKind::BioGenerator => {
                let next = special::tick_bio_generator(gs);
                if let Some(building) = state.world.get_building_mut(tile) {
                    building.state = BehaviorState::Generator(next);
                }
            }
            BehaviorState::Conveyor(_)
            | BehaviorState::Router(_)
            | BehaviorState::Storage(_)
            | BehaviorState::Terminal(_)
            | BehaviorState::DroneBay(_)
            | BehaviorState::Arm(_)
            | BehaviorState::Generator(_)
            | BehaviorState::PassiveField
            | BehaviorState::JurisdictionBeacon
            | BehaviorState::Lamp => {}
        }
    }

    run_arms(state);
}

fn production_base_rate(kind: BuildingKind, slots: &InputSlots) -> u32 {
    recipes_for(kind)
        .into_iter()
        .find(|recipe| {
            recipe.inputs.iter().enumerate().all(|(index, (item, count))| {
                slots.get(index).is_some_and(|slot| slot.as_ref().is_some_and(|(slot_item, slot_count)| slot_item == item && slot_count >= count))
            })
        })
        .map_or(1, |recipe| recipe.rate)
}

fn record_production_drain(ledger: &mut Ledger, tick: u64, tile: TileKey, prev: &spheric_types::ProductionState, next: &spheric_types::ProductionState) {
    if prev.phase == ProductionPhase::Processing && next.phase == ProductionPhase::Drain {
        for (item, count) in prev.input_slots.iter().flatten() {
            let _ = ledger.record_consume(tick, item.clone(), u32::from(*count), tile);
        }
        if let Some(item) = &next.output_buffer {
            let quantity = u32::from(next.output_remaining.saturating_add(1));
            let _ = ledger.record_produce(tick, item.clone(), quantity, tile);
        }
    }
}

fn resource_at(world: &WorldStore, tile: TileKey) -> (bool, Option<Item>) {
    world.get_tile(tile).and_then(|t| t.resource).map_or((false, None), |deposit| (deposit.amount > 0, Some(deposit.kind.mined_item())))
}

fn deplete_resource(world: &mut WorldStore, tile: TileKey) {
    if let Some(t) = world.get_tile_mut(tile)
        && let Some(deposit) = &mut t.resource
    {
        deposit.amount = deposit.amount.saturating_sub(1);
    }
}

fn manhattan(a: TileKey, b: TileKey) -> u16 {
    u16::from(a.row.abs_diff(b.row)).saturating_add(u16::from(a.col.abs_diff(b.col)))
}

/// Loader/unloader arms pull and push within the same tick (spec.md
/// 4.D.4): they have no buffered state beyond their fixed source and
/// destination pair, so there is nothing to defer to push resolution.
fn run_arms(state: &mut SimulationState) {
    let tick = state.clock.tick();
    let arms_list: Vec<(TileKey, spheric_types::ArmState)> = state
        .world
        .buildings()
        .filter_map(|(tile, building)| match &building.state {
            BehaviorState::Arm(arm) if !building.is_under_construction() => Some((*tile, *arm)),
            _ => None,
        })
        .collect();

    for (tile, arm) in arms_list {
        if arms::validate_range(arm, tile).is_err() {
            continue;
        }
        let rate = arms::transfer_rate(arm);
        for _ in 0..rate {
            let Some(item) = pull_one(&mut state.world, arm.source) else { break };
            if try_feed_destination(&mut state.world, arm.destination, &item) {
                let _ = state.ledger.record_push(tick, item, 1, arm.source, arm.destination);
            } else {
                state.world.add_ground_items(arm.source, &item, 1);
                break;
            }
        }
    }
}

/// Pull a single unit from `tile`: a ground stack first, then whichever
/// building buffer sits there.
fn pull_one(world: &mut WorldStore, tile: TileKey) -> Option<Item> {
    if let Some((item, taken)) = world.take_ground_items(tile, 1)
        && taken > 0
    {
        return Some(item);
    }
    let building = world.get_building_mut(tile)?;
    match &mut building.state {
        BehaviorState::Storage(storage) => {
            let (item, _) = storage.stored.iter().next().map(|(item, count)| (item.clone(), *count))?;
            let remaining = storage.stored.get_mut(&item)?;
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                storage.stored.remove(&item);
            }
            Some(item)
        }
        BehaviorState::Conveyor(cs) => {
            let item = conveyor::leading_item(cs)?.clone();
            *cs = conveyor::on_leading_pushed(cs);
            Some(item)
        }
        BehaviorState::Extractor(es) => {
            let item = es.output_buffer.clone()?;
            *es = extractor::on_push_succeeded(es.clone());
            Some(item)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Phase 3: push resolution
// ---------------------------------------------------------------------------

fn phase_3_push_resolution(state: &mut SimulationState, tick: u64, change_sets: &mut BTreeMap<u8, ChangeSet>) {
    let tiles: Vec<TileKey> = state.world.buildings().map(|(key, _)| *key).collect();

    for tile in tiles {
        let Some(building) = state.world.get_building(tile) else { continue };
        if building.is_under_construction() {
            continue;
        }
        let kind = building.kind;
        let orientation = building.orientation;

        match building.state.clone() {
            BehaviorState::Conveyor(cs) => {
                if let Some(item) = conveyor::leading_item(&cs).cloned() {
                    let (dest, _) = neighbor(tile, orientation);
                    if try_feed_destination(&mut state.world, dest, &item) {
                        record_push_and_flight(state, tick, tile, dest, item, change_sets);
                        if let Some(building) = state.world.get_building_mut(tile)
                            && let BehaviorState::Conveyor(live) = building.state.clone()
                        {
                            building.state = BehaviorState::Conveyor(conveyor::on_leading_pushed(&live));
                        }
                    }
                }
            }
            BehaviorState::Production(ps) if ps.phase == ProductionPhase::Drain => {
                if let Some(item) = ps.output_buffer.clone() {
                    let (dest, _) = neighbor(tile, orientation);
                    if try_feed_destination(&mut state.world, dest, &item) {
                        record_push_and_flight(state, tick, tile, dest, item, change_sets);
                        if let Some(building) = state.world.get_building_mut(tile)
                            && let BehaviorState::Production(live) = building.state.clone()
                        {
                            building.state = BehaviorState::Production(production::on_push_succeeded(&live));
                        }
                    }
                }
            }
            BehaviorState::Extractor(es) => {
                if let Some(item) = es.output_buffer.clone() {
                    let (dest, _) = neighbor(tile, orientation);
                    if try_feed_destination(&mut state.world, dest, &item) {
                        record_push_and_flight(state, tick, tile, dest, item, change_sets);
                        if let Some(building) = state.world.get_building_mut(tile) {
                            building.state = BehaviorState::Extractor(extractor::on_push_succeeded(es));
                        }
                    }
                }
            }
            BehaviorState::DefenseTurret(ts) => {
                if let Some(item) = ts.output_buffer.clone() {
                    let (dest, _) = neighbor(tile, orientation);
                    if try_feed_destination(&mut state.world, dest, &item) {
                        record_push_and_flight(state, tick, tile, dest, item, change_sets);
                        if let Some(building) = state.world.get_building_mut(tile) {
                            building.state = BehaviorState::DefenseTurret(special::on_turret_push_succeeded(ts));
                        }
                    }
                }
            }
            BehaviorState::Router(rs) => resolve_router(state, tick, tile, kind, orientation, rs, change_sets),
            _ => {}
        }
    }
}

fn resolve_router(
    state: &mut SimulationState,
    tick: u64,
    tile: TileKey,
    kind: BuildingKind,
    orientation: Direction,
    rs: spheric_types::RouterState,
    change_sets: &mut BTreeMap<u8, ChangeSet>,
) {
    let forward = neighbor(tile, orientation).0;
    let left = neighbor(tile, left_of(orientation)).0;
    let right = neighbor(tile, right_of(orientation)).0;

    let (next, pushed_item) = match kind {
        BuildingKind::Splitter => {
            let mut pushed: Option<(Item, TileKey)> = None;
            let (next, ok) = routing::resolve_splitter(&rs, |side, item| {
                let dest = if side == Side::Left { left } else { right };
                let accepted = try_feed_destination(&mut state.world, dest, item);
                if accepted {
                    pushed = Some((item.clone(), dest));
                }
                accepted
            });
            (next, ok.then_some(()).and(pushed))
        }
        BuildingKind::Balancer => {
            let mut pushed: Option<(Item, TileKey)> = None;
            let (next, ok) = routing::resolve_balancer(
                &rs,
                |side| u32::from(destination_occupied(&state.world, if side == Side::Left { left } else { right })),
                |side, item| {
                    let dest = if side == Side::Left { left } else { right };
                    let accepted = try_feed_destination(&mut state.world, dest, item);
                    if accepted {
                        pushed = Some((item.clone(), dest));
                    }
                    accepted
                },
            );
            (next, ok.then_some(()).and(pushed))
        }
        BuildingKind::Merger => {
            let mut pushed: Option<(Item, TileKey)> = None;
            let (next, ok) = routing::resolve_merger(&rs, |item| {
                let accepted = try_feed_destination(&mut state.world, forward, item);
                if accepted {
                    pushed = Some((item.clone(), forward));
                }
                accepted
            });
            (next, ok.then_some(()).and(pushed))
        }
        BuildingKind::PriorityMerger => {
            let mut pushed: Option<(Item, TileKey)> = None;
            let (next, ok) = routing::resolve_priority_merger(&rs, false, |item| {
                let accepted = try_feed_destination(&mut state.world, forward, item);
                if accepted {
                    pushed = Some((item.clone(), forward));
                }
                accepted
            });
            (next, ok.then_some(()).and(pushed))
        }
        BuildingKind::FilteredSplitter => {
            // `RouterState` carries no stored filter-item field, so the
            // filter itself is not persisted; this behaves as an
            // alternating splitter between its two outputs until that
            // field exists.
            let mut pushed: Option<(Item, TileKey)> = None;
            let filter_item = Item::IronOre;
            let (next, ok) = routing::resolve_filtered_splitter(
                &rs,
                &filter_item,
                false,
                |item| {
                    let accepted = try_feed_destination(&mut state.world, left, item);
                    if accepted {
                        pushed = Some((item.clone(), left));
                    }
                    accepted
                },
                |item| {
                    let accepted = try_feed_destination(&mut state.world, right, item);
                    if accepted {
                        pushed = Some((item.clone(), right));
                    }
                    accepted
                },
                |_| false,
            );
            (next, ok.then_some(()).and(pushed))
        }
        BuildingKind::OverflowGate => {
            let mut pushed: Option<(Item, TileKey)> = None;
            let (next, ok) = routing::resolve_overflow_gate(
                &rs,
                |item| {
                    let accepted = try_feed_destination(&mut state.world, forward, item);
                    if accepted {
                        pushed = Some((item.clone(), forward));
                    }
                    accepted
                },
                |item| {
                    let accepted = try_feed_destination(&mut state.world, left, item);
                    if accepted {
                        pushed = Some((item.clone(), left));
                    }
                    accepted
                },
            );
            (next, ok.then_some(()).and(pushed))
        }
        BuildingKind::Crossover => {
            let vertical = neighbor(tile, orientation.rotate(1)).0;
            let mut pushed: Option<(Item, TileKey)> = None;
            let next = routing::resolve_crossover(
                &rs,
                |item| {
                    let accepted = try_feed_destination(&mut state.world, forward, item);
                    if accepted {
                        pushed = Some((item.clone(), forward));
                    }
                    accepted
                },
                |item| {
                    let accepted = try_feed_destination(&mut state.world, vertical, item);
                    if accepted {
                        pushed = Some((item.clone(), vertical));
                    }
                    accepted
                },
            );
            (next, pushed)
        }
        BuildingKind::UndergroundConduit => {
            let mut pushed: Option<(Item, TileKey)> = None;
            let conduit_dest = rs.linked_partner.map(|partner| {
                let partner_orientation = state.world.get_building(partner).map_or(orientation, |b| b.orientation);
                neighbor(partner, partner_orientation).0
            });
            let (next, ok) = routing::resolve_conduit(&rs, |item| {
                let Some(dest) = conduit_dest else { return false };
                let accepted = try_feed_destination(&mut state.world, dest, item);
                if accepted {
                    pushed = Some((item.clone(), dest));
                }
                accepted
            });
            (next, ok.then_some(()).and(pushed))
        }
        _ => (rs, None),
    };

    if let Some((item, dest)) = pushed_item {
        let _ = state.ledger.record_push(tick, item.clone(), 1, tile, dest);
        let face_set = changeset_for(change_sets, tick, tile.face);
        face_set.items_in_flight.push(ItemInFlight { from_key: tile, to_key: dest, item });
    }
    if let Some(building) = state.world.get_building_mut(tile) {
        building.state = BehaviorState::Router(next);
    }
}

fn destination_occupied(world: &WorldStore, tile: TileKey) -> bool {
    world.get_building(tile).is_some_and(|building| match &building.state {
        BehaviorState::Conveyor(cs) => cs.slots.iter().all(Option::is_some),
        BehaviorState::Router(rs) => rs.input_slot.is_some(),
        _ => false,
    })
}

fn record_push_and_flight(state: &mut SimulationState, tick: u64, from: TileKey, to: TileKey, item: Item, change_sets: &mut BTreeMap<u8, ChangeSet>) {
    let _ = state.ledger.record_push(tick, item.clone(), 1, from, to);
    let face_set = changeset_for(change_sets, tick, from.face);
    face_set.items_in_flight.push(ItemInFlight { from_key: from, to_key: to, item });
}

/// Attempt to deposit `item` at `dest`: feed the building there if one
/// exists (construction materials first, then its behavior state), or
/// drop it on the ground.
fn try_feed_destination(world: &mut WorldStore, dest: TileKey, item: &Item) -> bool {
    let Some(building) = world.get_building_mut(dest) else {
        return world.add_ground_items(dest, item, 1) == 0;
    };

    if let Some(construction) = &mut building.construction {
        return construction.deliver(item, 1) > 0;
    }

    let kind = building.kind;
    match &mut building.state {
        BehaviorState::Production(ps) => match production::try_accept_item(ps, &recipes_for(kind), item) {
            Some(next) => {
                *ps = next;
                true
            }
            None => false,
        },
        BehaviorState::Conveyor(cs) => match conveyor::try_accept_tail(cs, item.clone()) {
            Some(next) => {
                *cs = next;
                true
            }
            None => false,
        },
        BehaviorState::Router(rs) => match routing::accept_rear(rs, item.clone()) {
            Some(next) => {
                *rs = next;
                true
            }
            None => false,
        },
        BehaviorState::Storage(storage) => {
            let count = storage.pending.entry(item.clone()).or_insert(0);
            *count = count.saturating_add(1);
            true
        }
        BehaviorState::Terminal(ts) => {
            if ts.input_slot.is_none() {
                ts.input_slot = Some(item.clone());
                true
            } else {
                false
            }
        }
        BehaviorState::Generator(gs) if kind == BuildingKind::BioGenerator && *item == Item::Biofuel => {
            *gs = special::feed_bio_generator(*gs);
            true
        }
        BehaviorState::Arm(_)
        | BehaviorState::Extractor(_)
        | BehaviorState::ContainmentTrap(_)
        | BehaviorState::DefenseTurret(_)
        | BehaviorState::Generator(_)
        | BehaviorState::PassiveField
        | BehaviorState::DroneBay(_)
        | BehaviorState::JurisdictionBeacon
        | BehaviorState::Lamp => false,
    }
}

// ---------------------------------------------------------------------------
// Phase 4: consumption
// ---------------------------------------------------------------------------

fn phase_4_consumption(state: &mut SimulationState, tick: u64) {
    let tiles: Vec<TileKey> = state
        .world
        .buildings()
        .filter(|(_, building)| matches!(building.state, BehaviorState::Terminal(_)))
        .map(|(key, _)| *key)
        .collect();

    for tile in tiles {
        let Some(building) = state.world.get_building_mut(tile) else { continue };
        let owner = building.owner;
        let BehaviorState::Terminal(terminal) = &mut building.state else { continue };
        let Some(item) = terminal.input_slot.take() else { continue };
        terminal.total_submitted = terminal.total_submitted.saturating_add(1);
        let _ = state.ledger.record_submit(tick, item, 1, tile, owner);
    }
}

// ---------------------------------------------------------------------------
// Phase 5: power resolution
// ---------------------------------------------------------------------------

fn phase_5_power_resolution(world: &mut WorldStore, sun_angle: f32) {
    let nodes: Vec<PowerNode> = world
        .buildings()
        .filter(|(_, building)| spheric_power::is_power_carrying(building.kind))
        .map(|(tile, building)| {
            let active = !building.is_under_construction();
            let output = if active { power_output(building, *tile, sun_angle) } else { 0 };
            let draw = if active { spheric_power::power_draw(building.kind) } else { 0 };
            PowerNode { tile: *tile, kind: building.kind, output, draw }
        })
        .collect();

    let resolved = spheric_power::resolve_networks(&nodes);
    let tiles: Vec<TileKey> = resolved.keys().copied().collect();
    for tile in tiles {
        let powered = resolved.get(&tile).copied().unwrap_or(false);
        if let Some(building) = world.get_building_mut(tile) {
            building.powered = powered;
        }
    }
}

fn power_output(building: &Building, tile: TileKey, sun_angle: f32) -> u32 {
    match (&building.state, building.kind) {
        (BehaviorState::Generator(gs), BuildingKind::BioGenerator) => spheric_power::bio_generator_output(*gs),
        (BehaviorState::Generator(_), BuildingKind::ShadowPanel) => {
            #[allow(clippy::cast_possible_truncation)]
            let latitude = spheric_geometry::face_latitude(tile.face) as f32;
            let illumination = spheric_creatures::shift_cycle::illumination(latitude, sun_angle);
            spheric_power::shadow_panel_power_output(f64::from(illumination))
        }
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Phase 6: creatures and hiss
// ---------------------------------------------------------------------------

fn phase_6_creatures_and_hiss(state: &mut SimulationState, tick: u64, rng: &mut ChaCha8Rng, change_sets: &mut BTreeMap<u8, ChangeSet>) {
    if tick.checked_rem(CREATURE_MOVE_INTERVAL_TICKS).unwrap_or(1) == 0 {
        let ids: Vec<CreatureId> = state.creatures.keys().copied().collect();
        for id in ids {
            if let Some(creature) = state.creatures.remove(&id) {
                if creatures::has_expired(&creature, tick) {
                    let face_set = changeset_for(change_sets, tick, creature.position.face);
                    face_set.creature_delta.push(CreatureDelta { id, kind: creature.kind, position: None });
                    continue;
                }
                let stepped = creatures::step(creature, rng);
                let face = stepped.position.face;
                let face_set = changeset_for(change_sets, tick, face);
                face_set.creature_delta.push(CreatureDelta { id, kind: stepped.kind, position: Some(stepped.position) });
                state.creatures.insert(id, stepped);
            }
        }
    }

    if tick.checked_rem(CREATURE_SPAWN_INTERVAL_TICKS).unwrap_or(1) == 0 {
        spawn_creatures(state, tick, rng, change_sets);
    }

    if tick.checked_rem(HISS_STEP_INTERVAL_TICKS).unwrap_or(1) == 0 {
        step_hiss(state, tick, rng, change_sets);
    }

    if tick.checked_rem(CORRUPTION_SPREAD_INTERVAL_TICKS).unwrap_or(1) == 0 {
        let next = corruption::spread(&state.corruption, rng);
        for (&tile, &intensity) in &next {
            if state.corruption.get(&tile).copied().unwrap_or(0) != intensity {
                let face_set = changeset_for(change_sets, tick, tile.face);
                face_set.corruption_delta.push(CorruptionDelta { key: tile, intensity });
            }
        }
        state.corruption = next;
    }
}

fn spawn_creatures(state: &mut SimulationState, tick: u64, rng: &mut ChaCha8Rng, change_sets: &mut BTreeMap<u8, ChangeSet>) {
    // An entity-migration event doubles the per-face attempt count rather
    // than the per-face cap, so a migration still tapers off once a face
    // is full instead of overflowing it.
    let spawn_multiplier = effects::effects_for(state.events.active).creature_spawn_multiplier;
    let attempts_per_face: u32 = if spawn_multiplier > 1.0 { 2 } else { 1 };
    for face in 0..FACE_COUNT {
        for _ in 0..attempts_per_face {
            let existing = state.creatures.values().filter(|c| c.position.face == face).count();
            let row = rng.random_range(0..GRID_SIZE);
            let col = rng.random_range(0..GRID_SIZE);
            let Some(spawn_tile) = TileKey::checked_new(face, row, col) else { continue };
            if let Some(creature) = creatures::spawn_roll(face, existing, spawn_tile, tick, rng) {
                let face_set = changeset_for(change_sets, tick, face);
                face_set.creature_delta.push(CreatureDelta { id: creature.id, kind: creature.kind, position: Some(creature.position) });
                state.creatures.insert(creature.id, creature);
            }
        }
    }
}

fn step_hiss(state: &mut SimulationState, tick: u64, rng: &mut ChaCha8Rng, change_sets: &mut BTreeMap<u8, ChangeSet>) {
    let modifiers = ModifierStack { world_event: spheric_behaviors::world_event_multiplier(state.events.active, RateClass::Hiss), ..ModifierStack::identity() };
    let cap = spheric_behaviors::effective_rate(HISS_SPAWN_BASE_CANDIDATES, modifiers);
    let occupied: std::collections::BTreeSet<TileKey> = state.hiss.values().map(|entity| entity.position).collect();
    let mut spawned = 0u32;
    for (&tile, &intensity) in &state.corruption {
        if spawned >= cap {
            break;
        }
        if intensity >= HISS_SPAWN_THRESHOLD && !occupied.contains(&tile) {
            let entity = hiss::spawn(tile);
            let face_set = changeset_for(change_sets, tick, tile.face);
            face_set.hiss_delta.push(HissDelta { id: entity.id, position: Some(entity.position), hp: entity.hp });
            state.hiss.insert(entity.id, entity);
            spawned = spawned.saturating_add(1);
        }
    }

    let ids: Vec<HissId> = state.hiss.keys().copied().collect();
    for id in ids {
        let Some(entity) = state.hiss.remove(&id) else { continue };
        let target = nearest_building(&state.world, entity.position);
        let (stepped, _arrived) = hiss::step_toward(entity, target);
        let face_set = changeset_for(change_sets, tick, stepped.position.face);
        face_set.hiss_delta.push(HissDelta { id, position: Some(stepped.position), hp: stepped.hp });
        state.hiss.insert(id, stepped);
    }
    let _ = rng;
}

fn nearest_building(world: &WorldStore, from: TileKey) -> Option<TileKey> {
    world.buildings().filter(|(tile, _)| tile.face == from.face).min_by_key(|(tile, _)| manhattan(from, **tile)).map(|(tile, _)| *tile)
}

// ---------------------------------------------------------------------------
// Phase 7: delivery drones
// ---------------------------------------------------------------------------

/// One atomic per-tick transfer per site, not a modeled flight state
/// machine: a drone bay with a matching storage in its cell moves up to
/// its cargo capacity of whatever a nearby construction site still
/// needs, in the same tick it is found. The idle/flying/returning
/// phases named for drone bays describe animation, not simulation
/// state.
fn phase_7_delivery_drones(state: &mut SimulationState, tick: u64, change_sets: &mut BTreeMap<u8, ChangeSet>) {
    let bays: Vec<(TileKey, u8)> = state
        .world
        .buildings()
        .filter_map(|(key, building)| match &building.state {
            BehaviorState::DroneBay(bay) if bay.delivery_drone_enabled => Some((*key, bay.cargo_capacity)),
            _ => None,
        })
        .collect();

    for (bay_tile, cargo_capacity) in bays {
        let cell = bay_tile.cell();
        let storages: Vec<TileKey> = state
            .world
            .buildings()
            .filter(|(tile, building)| tile.face == bay_tile.face && tile.cell() == cell && matches!(building.state, BehaviorState::Storage(_)))
            .map(|(key, _)| *key)
            .collect();
        let sites: Vec<TileKey> = state
            .world
            .buildings()
            .filter(|(tile, building)| tile.face == bay_tile.face && tile.cell() == cell && building.is_under_construction())
            .map(|(key, _)| *key)
            .collect();

        'sites: for site in sites {
            let needed: Vec<Item> = {
                let Some(building) = state.world.get_building(site) else { continue };
                let Some(construction) = &building.construction else { continue };
                construction
                    .required
                    .iter()
                    .filter(|(item, &amount)| construction.delivered.get(*item).copied().unwrap_or(0) < amount)
                    .map(|(item, _)| item.clone())
                    .collect()
            };
            for item in needed {
                for &storage_tile in &storages {
                    let available = state.world.get_building(storage_tile).and_then(|b| match &b.state {
                        BehaviorState::Storage(s) => s.stored.get(&item).copied(),
                        _ => None,
                    });
                    let Some(available) = available.filter(|&count| count > 0) else { continue };

                    let still_needed: u16 = state
                        .world
                        .get_building(site)
                        .and_then(|b| b.construction.as_ref())
                        .map_or(0, |construction| {
                            let required = construction.required.get(&item).copied().unwrap_or(0);
                            let delivered = construction.delivered.get(&item).copied().unwrap_or(0);
                            required.saturating_sub(delivered)
                        });
                    let amount = available.min(u32::from(cargo_capacity)).min(u32::from(still_needed));
                    if amount == 0 {
                        continue;
                    }
                    let amount_u16 = u16::try_from(amount).unwrap_or(u16::MAX);

                    if let Some(building) = state.world.get_building_mut(storage_tile)
                        && let BehaviorState::Storage(storage) = &mut building.state
                        && let Some(count) = storage.stored.get_mut(&item)
                    {
                        *count = count.saturating_sub(amount);
                        if *count == 0 {
                            storage.stored.remove(&item);
                        }
                    }
                    if let Some(building) = state.world.get_building_mut(site)
                        && let Some(construction) = &mut building.construction
                    {
                        construction.deliver(&item, amount_u16);
                    }
                    let _ = state.ledger.record_push(tick, item.clone(), amount, storage_tile, site);
                    let face_set = changeset_for(change_sets, tick, bay_tile.face);
                    face_set.items_in_flight.push(ItemInFlight { from_key: storage_tile, to_key: site, item });
                    continue 'sites;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 8: end-of-tick
// ---------------------------------------------------------------------------

fn phase_8_end_of_tick(state: &mut SimulationState, tick: u64) -> Result<Vec<TileKey>, TickError> {
    let storages: Vec<TileKey> = state.world.buildings().filter(|(_, building)| matches!(building.state, BehaviorState::Storage(_))).map(|(key, _)| *key).collect();
    for tile in storages {
        if let Some(building) = state.world.get_building_mut(tile)
            && let BehaviorState::Storage(storage) = &mut building.state
        {
            storage.consolidate();
        }
    }

    if matches!(state.ledger.verify_conservation(tick), spheric_ledger::ConservationResult::Anomaly(_)) {
        return Err(TickError::LedgerAnomaly(tick));
    }

    Ok(state.world.drain_dirty().into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spheric_types::{
        ArmState, Biome, BuildingKind as BK, ConstructionState, ConveyorState, Direction as Dir, DroneBayState, PlayerId, ProductionState,
        ResourceDeposit, StorageState, Tile,
    };
    use std::collections::BTreeMap as Map;

    fn grassland_tile() -> Tile {
        Tile { terrain: Biome::Grassland, resource: None }
    }

    fn iron_deposit_tile() -> Tile {
        Tile { terrain: Biome::Grassland, resource: Some(ResourceDeposit { kind: ResourceKind::Iron, amount: 100 }) }
    }

    fn place(world: &mut WorldStore, key: TileKey, kind: BK, orientation: Dir, state: BehaviorState) {
        world.set_tile(key, grassland_tile());
        let _ = world.place_building(
            key,
            Building { kind, orientation, owner: PlayerId::new(), construction: None, state, powered: false, assigned_creature: None },
        );
    }

    #[test]
    fn extractor_mines_then_pushes_onto_a_conveyor() {
        let mut world = WorldStore::new();
        let extractor_key = TileKey::new(0, 5, 5);
        world.set_tile(extractor_key, iron_deposit_tile());
        let _ = world.place_building(
            extractor_key,
            Building {
                kind: BK::Extractor,
                orientation: Dir::East,
                owner: PlayerId::new(),
                construction: None,
                state: BehaviorState::Extractor(spheric_types::ExtractorState { ticks_since_extraction: 0, output_buffer: None }),
                powered: false,
                assigned_creature: None,
            },
        );
        place(&mut world, TileKey::new(0, 5, 6), BK::ConveyorT1, Dir::East, BehaviorState::Conveyor(ConveyorState::new(1)));

        let mut state = SimulationState::new(world, 7);
        for _ in 0..(EXTRACTOR_BASE_TICKS as usize + 2) {
            let _ = run_tick(&mut state);
        }

        let conveyor = state.world.get_building(TileKey::new(0, 5, 6)).expect("conveyor exists");
        let BehaviorState::Conveyor(cs) = &conveyor.state else { unreachable!("conveyor state") };
        assert_eq!(conveyor::leading_item(cs), Some(&Item::IronOre));
    }

    #[test]
    fn smelter_consumes_inputs_and_drains_output_through_push_resolution() {
        let mut world = WorldStore::new();
        let smelter_key = TileKey::new(1, 10, 10);
        let mut slots: InputSlots = [None, None, None];
        slots[0] = Some((Item::IronOre, 2));
        place(
            &mut world,
            smelter_key,
            BK::Smelter,
            Dir::East,
            BehaviorState::Production(ProductionState { phase: ProductionPhase::Idle, input_slots: slots, progress: 0, output_buffer: None, output_remaining: 0, requires_creature: false }),
        );
        place(&mut world, TileKey::new(1, 10, 11), BK::ConveyorT1, Dir::East, BehaviorState::Conveyor(ConveyorState::new(1)));

        let mut state = SimulationState::new(world, 3);
        for _ in 0..10 {
            let _ = run_tick(&mut state);
        }

        let conveyor = state.world.get_building(TileKey::new(1, 10, 11)).expect("conveyor exists");
        let BehaviorState::Conveyor(cs) = &conveyor.state else { unreachable!("conveyor state") };
        assert_eq!(conveyor::leading_item(cs), Some(&Item::IronIngot));
        assert_eq!(state.ledger.verify_conservation(state.clock.tick()), spheric_ledger::ConservationResult::Balanced);
    }

    #[test]
    fn construction_auto_consumes_nearby_ground_items() {
        let mut world = WorldStore::new();
        let site_key = TileKey::new(2, 20, 20);
        world.set_tile(site_key, grassland_tile());
        let mut required = Map::new();
        required.insert(Item::IronOre, 3u16);
        let _ = world.place_building(
            site_key,
            Building {
                kind: BK::Smelter,
                orientation: Dir::East,
                owner: PlayerId::new(),
                construction: Some(ConstructionState::new(required)),
                state: BehaviorState::Production(ProductionState::new(false)),
                powered: false,
                assigned_creature: None,
            },
        );
        world.add_ground_items(TileKey::new(2, 21, 20), &Item::IronOre, 3);

        let mut state = SimulationState::new(world, 1);
        let _ = run_tick(&mut state);

        let building = state.world.get_building(site_key).expect("site exists");
        assert!(building.construction.as_ref().is_some_and(|c| c.complete));
    }

    #[test]
    fn arm_moves_a_ground_item_between_two_tiles() {
        let mut world = WorldStore::new();
        let source = TileKey::new(3, 0, 0);
        let destination = TileKey::new(3, 0, 1);
        world.set_tile(source, grassland_tile());
        world.add_ground_items(source, &Item::CopperOre, 1);
        place(
            &mut world,
            TileKey::new(3, 0, 2),
            BK::UnloaderArm,
            Dir::East,
            BehaviorState::Arm(ArmState { source, destination, stack_upgrade: false }),
        );
        world.set_tile(destination, grassland_tile());

        let mut state = SimulationState::new(world, 5);
        let _ = run_tick(&mut state);

        let ground = state.world.get_ground_items(destination);
        assert_eq!(ground.map(|s| (&s.item, s.count)), Some((&Item::CopperOre, 1)));
    }

    #[test]
    fn power_resolution_brownouts_every_smelter_in_an_overloaded_network() {
        let mut world = WorldStore::new();
        place(
            &mut world,
            TileKey::new(4, 0, 0),
            BK::BioGenerator,
            Dir::North,
            BehaviorState::Generator(GeneratorState { fuel_remaining_ticks: 1000, producing: true }),
        );
        for offset in 0..4u8 {
            place(
                &mut world,
                TileKey::new(4, 0, offset.saturating_add(1)),
                BK::Smelter,
                Dir::North,
                BehaviorState::Production(ProductionState::new(false)),
            );
        }

        let mut state = SimulationState::new(world, 11);
        for _ in 0..5 {
            let _ = run_tick(&mut state);
        }

        let smelter = state.world.get_building(TileKey::new(4, 0, 1)).expect("smelter exists");
        assert!(!smelter.powered, "4 smelters drawing 8 each exceed one generator's capacity of 20");
    }

    #[test]
    fn world_event_rolls_are_visible_after_the_cooldown_free_first_check() {
        let world = WorldStore::new();
        let mut state = SimulationState::new(world, 99);
        for _ in 0..100 {
            let _ = run_tick(&mut state);
        }
        assert!(state.events.active.is_some() || !state.events.history.is_empty());
    }

    #[test]
    fn corruption_spreads_every_thirty_ticks() {
        let world = WorldStore::new();
        let mut state = SimulationState::new(world, 4);
        state.corruption.insert(TileKey::new(0, 10, 10), 5);
        for _ in 0..30 {
            let _ = run_tick(&mut state);
        }
        assert!(!state.corruption.is_empty());
    }

    #[test]
    fn biofuel_delivered_to_a_bio_generator_loads_its_fuel_tank() {
        let mut world = WorldStore::new();
        let generator_key = TileKey::new(4, 0, 0);
        place(
            &mut world,
            generator_key,
            BK::BioGenerator,
            Dir::East,
            BehaviorState::Generator(GeneratorState { fuel_remaining_ticks: 0, producing: false }),
        );

        let accepted = try_feed_destination(&mut world, generator_key, &Item::Biofuel);
        assert!(accepted);

        let building = world.get_building(generator_key).expect("generator exists");
        let BehaviorState::Generator(gs) = &building.state else { unreachable!("generator state") };
        assert!(gs.fuel_remaining_ticks > 0);
    }

    #[test]
    fn a_shadow_panel_does_not_accept_biofuel() {
        let mut world = WorldStore::new();
        let panel_key = TileKey::new(4, 0, 1);
        place(
            &mut world,
            panel_key,
            BK::ShadowPanel,
            Dir::East,
            BehaviorState::Generator(GeneratorState { fuel_remaining_ticks: 0, producing: false }),
        );

        let accepted = try_feed_destination(&mut world, panel_key, &Item::Biofuel);
        assert!(!accepted);
    }

    #[test]
    fn an_enabled_drone_bay_delivers_needed_items_from_storage_to_a_construction_site() {
        let mut world = WorldStore::new();
        let bay_key = TileKey::new(5, 0, 0);
        let storage_key = TileKey::new(5, 0, 1);
        let site_key = TileKey::new(5, 1, 0);

        place(
            &mut world,
            bay_key,
            BK::DroneBay,
            Dir::East,
            BehaviorState::DroneBay(DroneBayState { delivery_drone_enabled: true, cargo_capacity: 2 }),
        );

        let mut stored = Map::new();
        stored.insert(Item::IronOre, 5u32);
        place(&mut world, storage_key, BK::StorageContainer, Dir::East, BehaviorState::Storage(StorageState { stored, pending: Map::new() }));

        world.set_tile(site_key, grassland_tile());
        let mut required = Map::new();
        required.insert(Item::IronOre, 3u16);
        let _ = world.place_building(
            site_key,
            Building {
                kind: BK::Smelter,
                orientation: Dir::East,
                owner: PlayerId::new(),
                construction: Some(ConstructionState::new(required)),
                state: BehaviorState::Production(ProductionState::new(false)),
                powered: false,
                assigned_creature: None,
            },
        );

        let mut state = SimulationState::new(world, 5);
        let _ = run_tick(&mut state);

        let site = state.world.get_building(site_key).expect("site exists");
        let delivered = site.construction.as_ref().expect("still under construction").delivered.get(&Item::IronOre).copied().unwrap_or(0);
        assert_eq!(delivered, 2);

        let storage = state.world.get_building(storage_key).expect("storage exists");
        let BehaviorState::Storage(storage_state) = &storage.state else { unreachable!("storage state") };
        assert_eq!(storage_state.stored.get(&Item::IronOre).copied().unwrap_or(0), 3);
    }

    #[test]
    fn a_drone_bay_without_the_upgrade_does_not_deliver() {
        let mut world = WorldStore::new();
        let bay_key = TileKey::new(6, 0, 0);
        let storage_key = TileKey::new(6, 0, 1);
        let site_key = TileKey::new(6, 1, 0);

        place(
            &mut world,
            bay_key,
            BK::DroneBay,
            Dir::East,
            BehaviorState::DroneBay(DroneBayState { delivery_drone_enabled: false, cargo_capacity: 2 }),
        );

        let mut stored = Map::new();
        stored.insert(Item::IronOre, 5u32);
        place(&mut world, storage_key, BK::StorageContainer, Dir::East, BehaviorState::Storage(StorageState { stored, pending: Map::new() }));

        world.set_tile(site_key, grassland_tile());
        let mut required = Map::new();
        required.insert(Item::IronOre, 3u16);
        let _ = world.place_building(
            site_key,
            Building {
                kind: BK::Smelter,
                orientation: Dir::East,
                owner: PlayerId::new(),
                construction: Some(ConstructionState::new(required)),
                state: BehaviorState::Production(ProductionState::new(false)),
                powered: false,
                assigned_creature: None,
            },
        );

        let mut state = SimulationState::new(world, 6);
        let _ = run_tick(&mut state);

        let site = state.world.get_building(site_key).expect("site exists");
        let delivered = site.construction.as_ref().expect("still under construction").delivered.get(&Item::IronOre).copied().unwrap_or(0);
        assert_eq!(delivered, 0);
    }
}
