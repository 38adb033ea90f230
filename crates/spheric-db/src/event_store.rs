//! World-event history store.
//!
//! Every world event that starts or ends (hiss surge, meteor shower,
//! resonance cascade, entity migration -- spec.md 4.G) produces a
//! durable history row, independent of the live [`WorldEventState`]
//! kept hot in `WorldStore`. This is the table the `WorldEventId` type
//! exists for.
//!
//! [`WorldEventState`]: spheric_types::WorldEventState

use spheric_types::{EventKind, WorldEventId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Default batch size for event inserts.
const DEFAULT_BATCH_SIZE: usize = 100;

/// One world-event occurrence to record.
#[derive(Debug, Clone)]
pub struct WorldEventOccurrence {
    /// Unique identifier for this occurrence.
    pub id: WorldEventId,
    /// Owning world.
    pub world_id: Uuid,
    /// Which event kind this was.
    pub kind: EventKind,
    /// Tick the event started at.
    pub tick_started: u64,
    /// Tick the event ended at, once known.
    pub tick_ended: Option<u64>,
}

/// Operations on the `world_events` table.
pub struct EventStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> EventStore<'a> {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for inserts.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Batch-insert world-event occurrences into the `world_events` table.
    ///
    /// Inserted in batches of configurable size, each wrapped in a
    /// transaction, so either all occurrences in a batch land or none do.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn batch_insert(&self, occurrences: &[WorldEventOccurrence]) -> Result<(), DbError> {
        if occurrences.is_empty() {
            return Ok(());
        }

        for chunk in occurrences.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;

            for occurrence in chunk {
                let kind_str = event_kind_to_db(occurrence.kind);
                let tick_started = i64::try_from(occurrence.tick_started).unwrap_or(i64::MAX);
                let tick_ended = occurrence
                    .tick_ended
                    .map(|t| i64::try_from(t).unwrap_or(i64::MAX));

                sqlx::query(
                    r"INSERT INTO world_events (id, world_id, kind, tick_started, tick_ended)
                      VALUES ($1, $2, $3, $4, $5)
                      ON CONFLICT (id) DO UPDATE SET tick_ended = EXCLUDED.tick_ended",
                )
                .bind(occurrence.id.into_inner())
                .bind(occurrence.world_id)
                .bind(kind_str)
                .bind(tick_started)
                .bind(tick_ended)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
        }

        tracing::debug!(count = occurrences.len(), "Recorded world events");
        Ok(())
    }

    /// Query the world-event history for a world, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_events_for_world(
        &self,
        world_id: Uuid,
    ) -> Result<Vec<WorldEventRow>, DbError> {
        let rows = sqlx::query_as::<_, WorldEventRow>(
            r"SELECT id, world_id, kind, tick_started, tick_ended
              FROM world_events
              WHERE world_id = $1
              ORDER BY tick_started DESC",
        )
        .bind(world_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `world_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorldEventRow {
    /// Occurrence identifier.
    pub id: Uuid,
    /// Owning world.
    pub world_id: Uuid,
    /// Event kind, as its atom string.
    pub kind: String,
    /// Tick the event started.
    pub tick_started: i64,
    /// Tick the event ended, if it has.
    pub tick_ended: Option<i64>,
}

/// Convert an [`EventKind`] to its persisted atom string.
const fn event_kind_to_db(kind: EventKind) -> &'static str {
    match kind {
        EventKind::HissSurge => "hiss_surge",
        EventKind::MeteorShower => "meteor_shower",
        EventKind::ResonanceCascade => "resonance_cascade",
        EventKind::EntityMigration => "entity_migration",
    }
}
