//! Ledger persistence for batch-inserting item-movement records.
//!
//! The central ledger tracks every item movement in the simulation
//! (spec.md 8, invariant 3: item conservation). Entries are flushed to
//! `PostgreSQL` at the end of each tick in batches.

use spheric_types::{LedgerActor, LedgerEntry, LedgerEntryType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Default batch size for ledger inserts.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Operations on the `ledger` table.
pub struct LedgerStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> LedgerStore<'a> {
    /// Create a new ledger store bound to a connection pool.
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

    /// Batch-insert ledger entries into the `ledger` table.
    ///
    /// Entries are inserted in batches for efficiency. Each batch is
    /// wrapped in a transaction for atomicity.
    ///
    /// # Arguments
    ///
    /// * `entries` - The ledger entries to persist, typically all entries from
    ///   a single tick.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    /// Returns [`DbError::Serialization`] if an actor fails to serialize.
    pub async fn batch_insert(&self, entries: &[LedgerEntry]) -> Result<(), DbError> {
        if entries.is_empty() {
            return Ok(());
        }

        for chunk in entries.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;

            for entry in chunk {
                let entry_type_str = ledger_entry_type_to_db(entry.entry_type);
                let from_json = serde_json::to_value(&entry.from)?;
                let to_json = serde_json::to_value(&entry.to)?;
                let item_atom = entry.item.as_atom();

                sqlx::query(
                    r"INSERT INTO ledger (id, tick, entry_type, from_actor, to_actor, item, quantity, reason, reference_id, created_at)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                )
                .bind(entry.id.into_inner())
                .bind(i64::try_from(entry.tick).unwrap_or(i64::MAX))
                .bind(entry_type_str)
                .bind(&from_json)
                .bind(&to_json)
                .bind(item_atom)
                .bind(i64::from(entry.quantity))
                .bind(&entry.reason)
                .bind(entry.reference_id.map(spheric_types::LedgerEntryId::into_inner))
                .bind(entry.created_at)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
        }

        tracing::debug!(count = entries.len(), "Inserted ledger entries");
        Ok(())
    }

    /// Query all ledger entries for a specific tick.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_entries_by_tick(&self, tick: u64) -> Result<Vec<LedgerRow>, DbError> {
        let tick_i64 = i64::try_from(tick).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, LedgerRow>(
            r"SELECT id, tick, entry_type, from_actor, to_actor, item, quantity, reason, reference_id, created_at
              FROM ledger
              WHERE tick = $1
              ORDER BY created_at",
        )
        .bind(tick_i64)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Query all ledger entries that reference a related entry (e.g. a
    /// drone's pickup and its drop).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_entries_by_reference(
        &self,
        reference_id: Uuid,
    ) -> Result<Vec<LedgerRow>, DbError> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            r"SELECT id, tick, entry_type, from_actor, to_actor, item, quantity, reason, reference_id, created_at
              FROM ledger
              WHERE reference_id = $1
              ORDER BY tick, created_at",
        )
        .bind(reference_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `ledger` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerRow {
    /// Ledger entry UUID.
    pub id: Uuid,
    /// Tick when the movement was recorded.
    pub tick: i64,
    /// Entry type as its atom string.
    pub entry_type: String,
    /// Source actor, as a `{kind, id}` JSON object.
    pub from_actor: serde_json::Value,
    /// Destination actor, as a `{kind, id}` JSON object.
    pub to_actor: serde_json::Value,
    /// Item atom string moved.
    pub item: String,
    /// Quantity transferred.
    pub quantity: i64,
    /// Reason for the movement.
    pub reason: String,
    /// Related entry ID, if any.
    pub reference_id: Option<Uuid>,
    /// Real-world timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl LedgerRow {
    /// Deserialize [`Self::from_actor`] back into a [`LedgerActor`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON doesn't
    /// match the `LedgerActor` shape.
    pub fn from_actor(&self) -> Result<LedgerActor, DbError> {
        Ok(serde_json::from_value(self.from_actor.clone())?)
    }

    /// Deserialize [`Self::to_actor`] back into a [`LedgerActor`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON doesn't
    /// match the `LedgerActor` shape.
    pub fn to_actor(&self) -> Result<LedgerActor, DbError> {
        Ok(serde_json::from_value(self.to_actor.clone())?)
    }
}

/// Convert a [`LedgerEntryType`] to its persisted atom string.
const fn ledger_entry_type_to_db(entry_type: LedgerEntryType) -> &'static str {
    match entry_type {
        LedgerEntryType::Push => "push",
        LedgerEntryType::Produce => "produce",
        LedgerEntryType::Consume => "consume",
        LedgerEntryType::Submit => "submit",
        LedgerEntryType::Eject => "eject",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_entry_type_atoms_are_distinct() {
        let kinds = [
            LedgerEntryType::Push,
            LedgerEntryType::Produce,
            LedgerEntryType::Consume,
            LedgerEntryType::Submit,
            LedgerEntryType::Eject,
        ];
        let atoms: Vec<&str> = kinds.iter().copied().map(ledger_entry_type_to_db).collect();
        let mut sorted = atoms.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(atoms.len(), sorted.len());
    }
}
