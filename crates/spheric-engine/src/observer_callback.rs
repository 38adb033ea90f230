//! Bridges each completed tick to the observer's live state and to the
//! persistence layer.
//!
//! [`EngineCallback`] is the [`TickCallback`] the runner drives once per
//! tick. A [`TickSummary`] fans out three ways: per-face change-sets and
//! the world summary go to [`AppState`] without awaiting, since the
//! callback runs synchronously on the tick loop (spec.md 6.2); dirty
//! tiles accumulate until the configured save interval elapses, then go
//! to [`PersistenceHandle`] as one batch (spec.md 4.H, 5); ledger
//! entries accumulate until the configured batch size is reached; and a
//! world-event start/end transition is recorded as soon as it happens.

use std::collections::BTreeSet;
use std::sync::Arc;

use spheric_core::runner::TickCallback;
use spheric_core::tick::{SimulationState, TickSummary};
use spheric_db::dragonfly::WorldSummary as DragonflySummary;
use spheric_db::{tick_persist, BuildingUpdate, DragonflyPool, TileUpdate, WorldEventOccurrence};
use spheric_observer::AppState;
use spheric_types::{EventKind, LedgerEntry, TileKey, WorldEventId};
use uuid::Uuid;

use crate::persistence::{PersistenceHandle, SaveBatch};

/// A world event currently being tracked from its start delta through
/// to its end delta, so both occurrence rows share one id.
struct OpenOccurrence {
    id: WorldEventId,
    kind: EventKind,
    tick_started: u64,
}

/// Bridges tick summaries to the observer's [`AppState`] and to
/// [`PersistenceHandle`].
pub struct EngineCallback {
    app_state: Arc<AppState>,
    dragonfly: Arc<DragonflyPool>,
    persistence: Arc<PersistenceHandle>,
    world_id: Uuid,
    save_interval_ticks: u64,
    ledger_batch_size: usize,
    dirty_since_save: BTreeSet<TileKey>,
    last_saved_tick: u64,
    ledger_buffer: Vec<LedgerEntry>,
    open_occurrence: Option<OpenOccurrence>,
}

impl EngineCallback {
    /// Build a callback wired to the given observer state, hot-state
    /// cache, and persistence handle.
    #[must_use]
    pub const fn new(
        app_state: Arc<AppState>,
        dragonfly: Arc<DragonflyPool>,
        persistence: Arc<PersistenceHandle>,
        world_id: Uuid,
        save_interval_ticks: u64,
        ledger_batch_size: usize,
    ) -> Self {
        Self {
            app_state,
            dragonfly,
            persistence,
            world_id,
            save_interval_ticks,
            ledger_batch_size,
            dirty_since_save: BTreeSet::new(),
            last_saved_tick: 0,
            ledger_buffer: Vec::new(),
            open_occurrence: None,
        }
    }

    fn publish_to_observer(&self, summary: &TickSummary, state: &SimulationState) {
        for changeset in summary.change_sets.values() {
            self.app_state.try_publish_changeset(changeset.clone());
        }
        let shift_phase = state.clock.shift_cycle().phase;
        self.app_state.try_update_summary(summary.tick, state.events.active, shift_phase);
        self.publish_to_dragonfly(summary, shift_phase, state.events.active);
    }

    /// Mirror the tick's change-sets and summary to the hot-state cache
    /// (spec.md 4.E.1 step 8). Spawned rather than awaited, since
    /// `on_tick` runs synchronously on the tick loop.
    fn publish_to_dragonfly(
        &self,
        summary: &TickSummary,
        shift_phase: spheric_types::ShiftPhase,
        active_event: Option<EventKind>,
    ) {
        let dragonfly = Arc::clone(&self.dragonfly);
        let changesets: Vec<_> = summary.change_sets.values().cloned().collect();
        let dragonfly_summary = DragonflySummary { tick: summary.tick, active_event, shift_phase };

        tokio::spawn(async move {
            if let Err(error) =
                tick_persist::publish_changesets(&dragonfly, &changesets, &dragonfly_summary).await
            {
                tracing::error!(%error, "failed to publish tick to Dragonfly");
            }
        });
    }

    fn accumulate_ledger(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.ledger_buffer
            .extend(state.ledger.entries_for_tick(summary.tick).into_iter().cloned());
        if self.ledger_buffer.len() >= self.ledger_batch_size {
            let batch = std::mem::take(&mut self.ledger_buffer);
            self.persistence.submit_ledger_entries(batch);
        }
    }

    fn track_world_event(&mut self, summary: &TickSummary) {
        let Some(delta) = summary.world_event_delta else {
            return;
        };

        if delta.active {
            self.open_occurrence = Some(OpenOccurrence {
                id: WorldEventId::new(),
                kind: delta.kind,
                tick_started: summary.tick,
            });
        } else if let Some(open) = self.open_occurrence.take() {
            self.persistence.submit_world_event(WorldEventOccurrence {
                id: open.id,
                world_id: self.world_id,
                kind: open.kind,
                tick_started: open.tick_started,
                tick_ended: Some(summary.tick),
            });
        }
    }

    /// Fold `summary`'s dirty tiles into the pending save batch and, if
    /// the save interval has elapsed, hand the accumulated batch off to
    /// the persistence layer and reset the accumulator.
    fn accumulate_and_maybe_flush(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.dirty_since_save.extend(summary.dirty_tiles.iter().copied());

        if summary.tick.saturating_sub(self.last_saved_tick) < self.save_interval_ticks {
            return;
        }
        self.last_saved_tick = summary.tick;

        if self.dirty_since_save.is_empty() {
            return;
        }
        let dirty = std::mem::take(&mut self.dirty_since_save);

        let mut batch = SaveBatch::default();
        for key in dirty {
            let Some(tile) = state.world.get_tile(key) else {
                continue;
            };
            batch.tile_updates.push(TileUpdate {
                key,
                resource: tile.resource.as_ref().map(|deposit| (deposit.kind, deposit.amount)),
            });

            match state.world.get_building(key) {
                Some(building) => batch.building_updates.push(BuildingUpdate {
                    key,
                    kind: building.kind,
                    orientation: building.orientation,
                    state_json: serde_json::to_value(&building.state)
                        .unwrap_or(serde_json::Value::Null),
                    owner_id: building.owner.into_inner(),
                }),
                None => batch.removed_buildings.push(key),
            }
        }

        self.persistence.submit_world_state(batch);
    }
}

impl TickCallback for EngineCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.publish_to_observer(summary, state);
        self.accumulate_ledger(summary, state);
        self.track_world_event(summary);
        self.accumulate_and_maybe_flush(summary, state);
    }
}

#[cfg(test)]
mod tests {
    use spheric_types::{Biome, BuildingKind, Direction, PlayerId, Tile, TileKey, WorldEventDelta};
    use spheric_world::WorldStore;

    use super::*;

    fn make_state() -> SimulationState {
        let mut world = WorldStore::new();
        world.set_tile(TileKey::new(0, 0, 0), Tile { terrain: Biome::Grassland, resource: None });
        SimulationState::new(world, 7)
    }

    #[test]
    fn first_tick_publishes_its_own_change_set() {
        let app_state = Arc::new(AppState::new());
        let mut rx = app_state.subscribe_face(0).expect("face 0 exists");

        let summary = TickSummary {
            tick: 1,
            change_sets: std::iter::once((0, spheric_types::ChangeSet::empty(1, 0))).collect(),
            world_event_delta: None,
            dirty_tiles: Vec::new(),
        };

        for changeset in summary.change_sets.values() {
            app_state.try_publish_changeset(changeset.clone());
        }

        let received = rx.try_recv().expect("face 0 saw the change-set");
        assert_eq!(received.tick, 1);
    }

    #[test]
    fn world_event_start_then_end_round_trips_through_open_occurrence() {
        let mut open: Option<OpenOccurrence> = None;

        let start = WorldEventDelta { kind: EventKind::MeteorShower, active: true };
        open = Some(OpenOccurrence { id: WorldEventId::new(), kind: start.kind, tick_started: 3 });
        assert!(open.is_some());

        let end = WorldEventDelta { kind: EventKind::MeteorShower, active: false };
        assert!(!end.active);
        let closed = open.take();
        assert!(closed.is_some());
        assert_eq!(closed.expect("closed above").tick_started, 3);
    }

    #[test]
    fn dirty_tile_without_a_building_is_treated_as_removed() {
        let mut state = make_state();
        let building_key = TileKey::new(0, 1, 0);
        state.world.set_tile(building_key, Tile { terrain: Biome::Grassland, resource: None });
        state
            .world
            .place_building(
                building_key,
                spheric_types::Building {
                    kind: BuildingKind::ConveyorT1,
                    orientation: Direction::East,
                    owner: PlayerId::new(),
                    construction: None,
                    state: spheric_types::BehaviorState::Conveyor(spheric_types::ConveyorState::new(1)),
                    powered: false,
                    assigned_creature: None,
                },
            )
            .expect("placement succeeds");
        state.world.remove_building(building_key).expect("removal succeeds");

        assert!(state.world.get_building(building_key).is_none());
        assert!(state.world.get_tile(building_key).is_some());
    }
}
