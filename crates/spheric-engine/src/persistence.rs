//! Bridges the tick thread's dirty-drain hand-off to `PostgreSQL` and
//! `Dragonfly` (spec.md 4.H, 5).
//!
//! The tick thread never blocks on the database. Save-interval batches
//! are handed to a background Tokio task over a bounded channel; if
//! that task is still committing the previous batch when the next save
//! window elapses, the caller merges the new dirty set into the pending
//! batch rather than starting a parallel save (spec.md 5 scheduling
//! model).

use std::sync::Mutex;

use spheric_db::{
    BuildingUpdate, EventStore, LedgerStore, TileUpdate, WorldEventOccurrence, WorldRepository,
};
use spheric_types::{LedgerEntry, TileKey};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Bounded channel depth for each persistence stream. One in flight,
/// one pending merge target.
const CHANNEL_CAPACITY: usize = 1;

/// A save-interval batch of dirty tiles and buildings (spec.md 4.H
/// steps 1-3), accumulated on the tick thread between persistence
/// hand-offs.
#[derive(Debug, Default)]
pub struct SaveBatch {
    /// Dirty tile resource deposits.
    pub tile_updates: Vec<TileUpdate>,
    /// Dirty building records.
    pub building_updates: Vec<BuildingUpdate>,
    /// Buildings removed since the last save.
    pub removed_buildings: Vec<TileKey>,
}

impl SaveBatch {
    fn is_empty(&self) -> bool {
        self.tile_updates.is_empty()
            && self.building_updates.is_empty()
            && self.removed_buildings.is_empty()
    }

    fn merge(&mut self, mut other: Self) {
        self.tile_updates.append(&mut other.tile_updates);
        self.building_updates.append(&mut other.building_updates);
        self.removed_buildings.append(&mut other.removed_buildings);
    }
}

/// Background handle that accepts save-interval batches from the tick
/// thread and commits them to `PostgreSQL` without ever blocking the
/// caller.
pub struct PersistenceHandle {
    world_id: Uuid,
    world_state_tx: mpsc::Sender<SaveBatch>,
    world_state_pending: Mutex<Option<SaveBatch>>,
    world_event_tx: mpsc::Sender<WorldEventOccurrence>,
    ledger_tx: mpsc::Sender<Vec<LedgerEntry>>,
}

impl PersistenceHandle {
    /// Spawn the background persistence task and return a handle the
    /// tick callback can submit batches to, plus its join handle for
    /// clean shutdown.
    #[must_use]
    pub fn spawn(pool: PgPool, world_id: Uuid) -> (Self, JoinHandle<()>) {
        let (world_state_tx, mut world_state_rx) = mpsc::channel::<SaveBatch>(CHANNEL_CAPACITY);
        let (world_event_tx, mut world_event_rx) =
            mpsc::channel::<WorldEventOccurrence>(16);
        let (ledger_tx, mut ledger_rx) = mpsc::channel::<Vec<LedgerEntry>>(16);

        let task_pool = pool.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(batch) = world_state_rx.recv() => {
                        let repo = WorldRepository::new(&task_pool);
                        if let Err(e) = repo
                            .persist_dirty_state(
                                world_id,
                                &batch.tile_updates,
                                &batch.building_updates,
                                &batch.removed_buildings,
                            )
                            .await
                        {
                            tracing::error!(error = %e, "save-interval persist failed, dirty set will retry next interval");
                        }
                    }
                    Some(occurrence) = world_event_rx.recv() => {
                        if let Err(e) = EventStore::new(&task_pool)
                            .batch_insert(std::slice::from_ref(&occurrence))
                            .await
                        {
                            tracing::error!(error = %e, "world-event persist failed");
                        }
                    }
                    Some(entries) = ledger_rx.recv() => {
                        if let Err(e) = LedgerStore::new(&task_pool)
                            .batch_insert(&entries)
                            .await
                        {
                            tracing::error!(error = %e, "ledger flush failed");
                        }
                    }
                    else => break,
                }
            }
        });

        (
            Self {
                world_id,
                world_state_tx,
                world_state_pending: Mutex::new(None),
                world_event_tx,
                ledger_tx,
            },
            handle,
        )
    }

    /// The world this handle persists against.
    #[must_use]
    pub const fn world_id(&self) -> Uuid {
        self.world_id
    }

    /// Hand off a save-interval world-state batch. Merges into the
    /// pending accumulator instead of blocking if the background task
    /// is still committing a previous batch.
    pub fn submit_world_state(&self, batch: SaveBatch) {
        if batch.is_empty() {
            return;
        }

        let mut pending = self
            .world_state_pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let to_send = match pending.take() {
            Some(mut accumulated) => {
                accumulated.merge(batch);
                accumulated
            }
            None => batch,
        };

        match self.world_state_tx.try_send(to_send) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(rejected)) => {
                *pending = Some(rejected);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("persistence task is gone, dropping world-state batch");
            }
        }
    }

    /// Record a world-event start/end transition.
    pub fn submit_world_event(&self, occurrence: WorldEventOccurrence) {
        if let Err(e) = self.world_event_tx.try_send(occurrence) {
            tracing::warn!(error = %e, "world-event channel full, dropping occurrence");
        }
    }

    /// Flush a batch of ledger entries once the configured batch size
    /// is reached.
    pub fn submit_ledger_entries(&self, entries: Vec<LedgerEntry>) {
        if entries.is_empty() {
            return;
        }
        if let Err(e) = self.ledger_tx.try_send(entries) {
            tracing::warn!(error = %e, "ledger channel full, dropping entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use spheric_types::{BuildingKind, Direction, TileKey};

    use super::*;

    #[test]
    fn empty_batch_is_not_submitted() {
        // A batch with nothing in it should never reach is_empty() == false.
        let batch = SaveBatch::default();
        assert!(batch.is_empty());
    }

    #[test]
    fn merge_concatenates_every_field() {
        let mut a = SaveBatch {
            tile_updates: vec![TileUpdate { key: TileKey::new(0, 0, 0), resource: None }],
            building_updates: vec![],
            removed_buildings: vec![],
        };
        let b = SaveBatch {
            tile_updates: vec![],
            building_updates: vec![BuildingUpdate {
                key: TileKey::new(0, 0, 1),
                kind: BuildingKind::ConveyorT1,
                orientation: Direction::North,
                state_json: serde_json::json!({}),
                owner_id: Uuid::now_v7(),
            }],
            removed_buildings: vec![TileKey::new(1, 2, 3)],
        };
        a.merge(b);
        assert_eq!(a.tile_updates.len(), 1);
        assert_eq!(a.building_updates.len(), 1);
        assert_eq!(a.removed_buildings.len(), 1);
    }
}
