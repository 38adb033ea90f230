//! Flood-fill power network resolution (spec.md 4.F).
//!
//! Every 5 ticks the tick processor rebuilds power networks from scratch:
//! two power-carrying buildings on the same face are connected iff one
//! lies within the other's radius, transfer stations only connect to
//! other transfer stations, and each connected component's `powered`
//! flag is `load <= capacity` for the whole network (a brownout drops
//! every building in the network, not just the overloaded ones).

use std::collections::BTreeMap;

use spheric_behaviors::special::shadow_panel_output;
use spheric_types::{BuildingKind, GeneratorState, TileKey};

/// Rated output capacity of both producer kinds (spec.md 8 end-to-end
/// scenario 3: "bio generator (capacity 20)").
pub const PRODUCER_CAPACITY: u32 = 20;

/// A bio generator's power contribution: full rated capacity while fuel
/// remains, nothing once it runs dry.
#[must_use]
pub const fn bio_generator_output(state: GeneratorState) -> u32 {
    if state.producing { PRODUCER_CAPACITY } else { 0 }
}

/// A shadow panel's power contribution, scaled by its illumination ramp
/// (spec.md 4.D.6) against the same rated capacity as a bio generator.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn shadow_panel_power_output(illumination: f64) -> u32 {
    let scaled = f64::from(PRODUCER_CAPACITY) * shadow_panel_output(illumination);
    let rounded = scaled.round();
    if rounded < 0.0 { 0 } else { rounded as u32 }
}

/// Connection radius for every power-carrying building kind (spec.md 4.F
/// names substation=4 and transfer station=8 explicitly; every other
/// power-carrying kind uses a short baseline radius of 3, matching the
/// other short-range scans in spec.md 4.D.6).
#[must_use]
pub const fn power_radius(kind: BuildingKind) -> u8 {
    match kind {
        BuildingKind::Substation => 4,
        BuildingKind::TransferStation => 8,
        _ => 3,
    }
}

/// Fixed power draw for consumer building kinds (spec.md 8 end-to-end
/// scenario 3: "3 advanced_smelter (draw 8 each = 24)"). Kinds with no
/// entry draw nothing -- conveyors, routers, storage, and terminals are
/// purely mechanical and never join a power network.
#[must_use]
pub const fn power_draw(kind: BuildingKind) -> u32 {
    match kind {
        BuildingKind::Smelter | BuildingKind::Refinery => 8,
        BuildingKind::Assembler => 10,
        BuildingKind::ContainmentTrap | BuildingKind::DefenseTurret => 6,
        BuildingKind::DroneBay => 5,
        BuildingKind::LoaderArm | BuildingKind::UnloaderArm => 2,
        _ => 0,
    }
}

/// Whether `kind` ever participates in a power network, as a producer,
/// consumer, or conductor.
#[must_use]
pub const fn is_power_carrying(kind: BuildingKind) -> bool {
    matches!(kind, BuildingKind::BioGenerator | BuildingKind::ShadowPanel | BuildingKind::Substation | BuildingKind::TransferStation) || power_draw(kind) > 0
}

/// One power-carrying building, as seen by the resolver. The caller
/// (the tick processor) is responsible for excluding buildings under
/// construction or explicitly toggled off from `draw` and `output` --
/// an inactive node still joins the network (it can be bridged through)
/// but contributes neither capacity nor load (spec.md 4.F: "`draw`
/// excludes buildings under construction or explicitly toggled off").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerNode {
    /// The building's tile.
    pub tile: TileKey,
    /// The building's kind, used for the transfer-station-only edge rule.
    pub kind: BuildingKind,
    /// Power contributed to its network's capacity, `0` while inactive.
    pub output: u32,
    /// Power drawn from its network's capacity, `0` while inactive.
    pub draw: u32,
}

fn manhattan(a: TileKey, b: TileKey) -> u32 {
    u32::from(a.row.abs_diff(b.row)) + u32::from(a.col.abs_diff(b.col))
}

fn connected(a: &PowerNode, b: &PowerNode) -> bool {
    if a.tile.face != b.tile.face {
        return false;
    }
    let transfer_only = a.kind == BuildingKind::TransferStation || b.kind == BuildingKind::TransferStation;
    if transfer_only && !(a.kind == BuildingKind::TransferStation && b.kind == BuildingKind::TransferStation) {
        return false;
    }
    let distance = manhattan(a.tile, b.tile);
    distance <= u32::from(power_radius(a.kind)) || distance <= u32::from(power_radius(b.kind))
}

fn find(parent: &BTreeMap<TileKey, TileKey>, start: TileKey) -> TileKey {
    let mut current = start;
    while let Some(&next) = parent.get(&current) {
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn union(parent: &mut BTreeMap<TileKey, TileKey>, a: TileKey, b: TileKey) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a != root_b {
        parent.insert(root_a, root_b);
    }
}

/// Rebuild every power network from the given nodes and return, per
/// tile, whether that building is powered. A tile absent from `nodes`
/// is not power-carrying and has no entry in the result.
#[must_use]
pub fn resolve_networks(nodes: &[PowerNode]) -> BTreeMap<TileKey, bool> {
    let mut parent: BTreeMap<TileKey, TileKey> = nodes.iter().map(|node| (node.tile, node.tile)).collect();

    for a in nodes {
        for b in nodes {
            if a.tile != b.tile && connected(a, b) {
                union(&mut parent, a.tile, b.tile);
            }
        }
    }

    let mut capacity: BTreeMap<TileKey, u32> = BTreeMap::new();
    let mut load: BTreeMap<TileKey, u32> = BTreeMap::new();
    let mut members: BTreeMap<TileKey, Vec<TileKey>> = BTreeMap::new();

    for node in nodes {
        let root = find(&parent, node.tile);
        members.entry(root).or_default().push(node.tile);
        capacity.entry(root).and_modify(|total| *total = total.saturating_add(node.output)).or_insert(node.output);
        load.entry(root).and_modify(|total| *total = total.saturating_add(node.draw)).or_insert(node.draw);
    }

    let mut powered = BTreeMap::new();
    for (root, tiles) in &members {
        let network_capacity = capacity.get(root).copied().unwrap_or(0);
        let network_load = load.get(root).copied().unwrap_or(0);
        let is_powered = network_load <= network_capacity;
        for tile in tiles {
            powered.insert(*tile, is_powered);
        }
    }
    powered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tile: TileKey, kind: BuildingKind, output: u32, draw: u32) -> PowerNode {
        PowerNode { tile, kind, output, draw }
    }

    #[test]
    fn the_brownout_scenario_trips_the_whole_network() {
        let generator = node(TileKey::new(0, 0, 0), BuildingKind::BioGenerator, PRODUCER_CAPACITY, 0);
        let substation = node(TileKey::new(0, 1, 0), BuildingKind::Substation, 0, 0);
        let smelters = [
            node(TileKey::new(0, 2, 0), BuildingKind::Smelter, 0, 8),
            node(TileKey::new(0, 3, 0), BuildingKind::Smelter, 0, 8),
            node(TileKey::new(0, 4, 0), BuildingKind::Smelter, 0, 8),
        ];
        let nodes = [generator, substation, smelters[0], smelters[1], smelters[2]];
        let powered = resolve_networks(&nodes);
        assert!(!powered[&smelters[0].tile]);
        assert!(!powered[&smelters[1].tile]);
        assert!(!powered[&smelters[2].tile]);

        let nodes = [generator, substation, smelters[0], smelters[1]];
        let powered = resolve_networks(&nodes);
        assert!(powered[&smelters[0].tile]);
        assert!(powered[&smelters[1].tile]);
    }

    #[test]
    fn buildings_on_different_faces_never_connect() {
        let generator = node(TileKey::new(0, 0, 0), BuildingKind::BioGenerator, PRODUCER_CAPACITY, 0);
        let smelter = node(TileKey::new(1, 0, 0), BuildingKind::Smelter, 0, 8);
        let powered = resolve_networks(&[generator, smelter]);
        assert!(!powered[&smelter.tile]);
    }

    #[test]
    fn transfer_stations_only_bridge_to_other_transfer_stations() {
        let transfer_a = node(TileKey::new(0, 0, 0), BuildingKind::TransferStation, 0, 0);
        let substation = node(TileKey::new(0, 2, 0), BuildingKind::Substation, 0, 0);
        let powered = resolve_networks(&[transfer_a, substation]);
        assert_eq!(powered.len(), 2, "a substation within range still joins its own component");
        assert!(powered[&transfer_a.tile]);
    }

    #[test]
    fn an_inactive_node_bridges_a_network_without_contributing_load_or_capacity() {
        let generator = node(TileKey::new(0, 0, 0), BuildingKind::BioGenerator, PRODUCER_CAPACITY, 0);
        let substation_under_construction = node(TileKey::new(0, 1, 0), BuildingKind::Substation, 0, 0);
        let smelter = node(TileKey::new(0, 3, 0), BuildingKind::Smelter, 0, 8);
        let powered = resolve_networks(&[generator, substation_under_construction, smelter]);
        assert!(powered[&smelter.tile]);
    }

    #[test]
    fn shadow_panel_output_tracks_the_illumination_ramp() {
        assert_eq!(shadow_panel_power_output(0.0), PRODUCER_CAPACITY);
        assert_eq!(shadow_panel_power_output(1.0), 0);
    }
}
