//! Loads a saved world's tile resources and buildings on top of a
//! freshly generated grid (spec.md 4.H loads).
//!
//! The generator always runs first with the saved seed, so the shape of
//! the terrain and the base resource veins are reproducible without
//! touching the database. This module then overlays whatever the last
//! save actually recorded: a tile-resource row's remaining amount (it
//! only decreases from the generator's starting value), and every
//! placed building. A tile with no saved row keeps the generator's
//! value; a building row that fails to deserialize is skipped and
//! logged rather than aborting the load.

use spheric_db::{building_kind_from_atom, direction_from_atom, resource_kind_from_atom, WorldRepository};
use spheric_types::{Building, BehaviorState, PlayerId, ResourceDeposit, TileKey};
use spheric_world::WorldStore;

use crate::error::EngineError;

/// Overlay a saved world's tile resources and buildings onto `store`,
/// which must already hold the generator's output for the same seed.
///
/// # Errors
///
/// Returns [`EngineError`] if the database query itself fails. A row
/// that exists but doesn't parse (an unknown atom, a behavior-state
/// shape the current build no longer understands) is skipped and
/// logged rather than treated as fatal, per the load's fallback rule.
pub async fn overlay_saved_state(
    repo: &WorldRepository<'_>,
    world_id: uuid::Uuid,
    store: &mut WorldStore,
) -> Result<(), EngineError> {
    overlay_tile_resources(repo, world_id, store).await?;
    overlay_buildings(repo, world_id, store).await?;
    Ok(())
}

async fn overlay_tile_resources(
    repo: &WorldRepository<'_>,
    world_id: uuid::Uuid,
    store: &mut WorldStore,
) -> Result<(), EngineError> {
    let rows = repo.load_tile_resources(world_id).await?;

    for row in rows {
        let Ok(face) = u8::try_from(row.face) else {
            tracing::warn!(face = row.face, "saved tile resource has an out-of-range face, skipping");
            continue;
        };
        let (Ok(tile_row), Ok(tile_col)) = (u8::try_from(row.row), u8::try_from(row.col)) else {
            tracing::warn!(row = row.row, col = row.col, "saved tile resource has an out-of-range address, skipping");
            continue;
        };
        let key = TileKey::new(face, tile_row, tile_col);

        let Some(tile) = store.get_tile_for_seeding(key) else {
            tracing::warn!(%key, "saved tile resource has no matching generated tile, skipping");
            continue;
        };

        tile.resource = match (row.resource_type, row.amount) {
            (Some(kind_atom), Some(amount)) => match resource_kind_from_atom(&kind_atom) {
                Ok(kind) => match u16::try_from(amount) {
                    Ok(amount) => Some(ResourceDeposit { kind, amount }),
                    Err(_) => {
                        tracing::warn!(%key, amount, "saved resource amount out of range, dropping deposit");
                        None
                    }
                },
                Err(error) => {
                    tracing::warn!(%key, %error, "saved resource kind atom unrecognized, dropping deposit");
                    None
                }
            },
            _ => None,
        };
    }

    Ok(())
}

async fn overlay_buildings(
    repo: &WorldRepository<'_>,
    world_id: uuid::Uuid,
    store: &mut WorldStore,
) -> Result<(), EngineError> {
    let rows = repo.load_buildings(world_id).await?;

    for row in rows {
        let Ok(face) = u8::try_from(row.face) else {
            tracing::warn!(face = row.face, "saved building has an out-of-range face, skipping");
            continue;
        };
        let (Ok(building_row), Ok(building_col)) = (u8::try_from(row.row), u8::try_from(row.col)) else {
            tracing::warn!(row = row.row, col = row.col, "saved building has an out-of-range address, skipping");
            continue;
        };
        let key = TileKey::new(face, building_row, building_col);

        let kind = match building_kind_from_atom(&row.building_type) {
            Ok(kind) => kind,
            Err(error) => {
                tracing::warn!(%key, %error, "saved building kind unrecognized, skipping building");
                continue;
            }
        };
        let orientation = match direction_from_atom(&row.orientation) {
            Ok(orientation) => orientation,
            Err(error) => {
                tracing::warn!(%key, %error, "saved building orientation unrecognized, skipping building");
                continue;
            }
        };
        let state: BehaviorState = match serde_json::from_value(row.state_json) {
            Ok(state) => state,
            Err(error) => {
                tracing::warn!(%key, %error, "saved building behavior state failed to deserialize, skipping building");
                continue;
            }
        };

        store.seed_building(
            key,
            Building {
                kind,
                orientation,
                owner: PlayerId::from(row.owner_id),
                construction: None,
                state,
                powered: false,
                assigned_creature: None,
            },
        );
    }

    Ok(())
}
