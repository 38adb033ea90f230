//! End-of-tick persistence orchestration for both `Dragonfly` (hot state)
//! and `PostgreSQL` (cold state).
//!
//! Called from the tick thread's end-of-tick phase (spec.md 4.E.1 step
//! 8) and from the save-interval handoff (spec.md 4.H, 5): the tick
//! thread calls `drain_dirty`, hands the resulting batch to this
//! module by move, and continues without blocking on the database.
//!
//! # Architecture
//!
//! ```text
//! End of tick
//!   |
//!   +-- publish_changesets()         --> Dragonfly (per-face change-sets, world summary)
//!   +-- persist_dirty_world_state()  --> PostgreSQL (tile_resources, buildings)
//!   +-- persist_world_events()       --> PostgreSQL (world_events history)
//!   +-- persist_ledger_entries()     --> PostgreSQL (ledger)
//! ```

use spheric_types::{ChangeSet, LedgerEntry};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dragonfly::{DragonflyPool, WorldSummary};
use crate::error::DbError;
use crate::event_store::{EventStore, WorldEventOccurrence};
use crate::ledger_store::LedgerStore;
use crate::world_store::{BuildingUpdate, TileUpdate, WorldRepository};

/// Errors that can occur during tick persistence.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// A `Dragonfly` operation failed.
    #[error("Dragonfly persist error: {0}")]
    Dragonfly(#[from] DbError),

    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL persist error: {0}")]
    Postgres(String),
}

// =========================================================================
// Dragonfly (hot state) persistence
// =========================================================================

/// Publish a tick's per-face change-sets and world summary to
/// `Dragonfly` (spec.md 4.E.1 step 8, 4.I: "emit per-face change-sets
/// to subscribers"). Subscribers that reconnect after a drop read these
/// keys for a full snapshot.
///
/// # Errors
///
/// Returns [`PersistError::Dragonfly`] if any write fails.
pub async fn publish_changesets(
    dragonfly: &DragonflyPool,
    changesets: &[ChangeSet],
    summary: &WorldSummary,
) -> Result<(), PersistError> {
    dragonfly.set_changesets(changesets).await?;
    dragonfly.set_world_summary(summary).await?;
    dragonfly.set_world_tick(summary.tick).await?;

    tracing::debug!(
        tick = summary.tick,
        faces = changesets.len(),
        "Published change-sets to Dragonfly"
    );

    Ok(())
}

// =========================================================================
// PostgreSQL (cold state) persistence
// =========================================================================

/// Commit a save-interval batch of dirty tiles and buildings in one
/// transaction (spec.md 4.H). On failure, the caller should re-merge
/// its dirty set so the next save interval retries the same keys.
///
/// # Errors
///
/// Returns [`PersistError::Postgres`] if the transaction fails.
pub async fn persist_dirty_world_state(
    pool: &PgPool,
    world_id: Uuid,
    tile_updates: &[TileUpdate],
    building_updates: &[BuildingUpdate],
    removed_buildings: &[spheric_types::TileKey],
) -> Result<(), PersistError> {
    let repo = WorldRepository::new(pool);
    repo.persist_dirty_state(world_id, tile_updates, building_updates, removed_buildings)
        .await
        .map_err(|e| PersistError::Postgres(format!("Dirty-state save failed: {e}")))
}

/// Record world-event occurrences to the `world_events` history table.
///
/// # Errors
///
/// Returns [`PersistError::Postgres`] if the batch insert fails.
pub async fn persist_world_events(
    pool: &PgPool,
    occurrences: &[WorldEventOccurrence],
) -> Result<(), PersistError> {
    if occurrences.is_empty() {
        return Ok(());
    }

    let store = EventStore::new(pool);
    store
        .batch_insert(occurrences)
        .await
        .map_err(|e| PersistError::Postgres(format!("World-event insert failed: {e}")))?;

    Ok(())
}

/// Flush a tick's ledger entries to the `ledger` table.
///
/// # Errors
///
/// Returns [`PersistError::Postgres`] if the batch insert fails.
pub async fn persist_ledger_entries(
    pool: &PgPool,
    entries: &[LedgerEntry],
) -> Result<(), PersistError> {
    if entries.is_empty() {
        return Ok(());
    }

    let store = LedgerStore::new(pool);
    store
        .batch_insert(entries)
        .await
        .map_err(|e| PersistError::Postgres(format!("Ledger insert failed: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_error_display() {
        let err = PersistError::Postgres(String::from("test error"));
        let msg = format!("{err}");
        assert!(msg.contains("test error"));
    }

    #[test]
    fn persist_error_from_db_error() {
        let db_err = DbError::KeyNotFound(String::from("world:tick"));
        let persist_err = PersistError::from(db_err);
        let msg = format!("{persist_err}");
        assert!(msg.contains("world:tick"));
    }
}
