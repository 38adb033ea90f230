//! `Dragonfly` (Redis-compatible) hot state operations.
//!
//! `Dragonfly` holds the latest per-face change-set and a world summary
//! so the observer's REST snapshot endpoints and newly (re)connecting
//! subscribers can read current state without contending with the tick
//! thread or the `PostgreSQL` write path (spec.md 4.H, 4.I).
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `world:tick` | Integer | Current tick number |
//! | `world:clock` | JSON | Serialized clock state |
//! | `world:summary` | JSON | `{tick, active_event, shift_phase}` |
//! | `face:{n}:changeset` | JSON | Latest [`ChangeSet`] for face `n` |
//! | `trade:{id}` | JSON | Open trade record |

use fred::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spheric_types::{ChangeSet, EventKind, ShiftPhase, Trade, TradeId};

use crate::error::DbError;

/// World-level summary kept in `Dragonfly` for cheap observer reads
/// (mirrors `spheric_core::operator::SimulationStatus`'s tick/event/phase
/// fields without this crate depending on `spheric-core`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSummary {
    /// Current tick number.
    pub tick: u64,
    /// The active world event, if any (spec.md 4.G).
    pub active_event: Option<EventKind>,
    /// Current shift-cycle phase (spec.md 3.2).
    pub shift_phase: ShiftPhase,
}

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] and provides typed operations for
/// the key patterns above.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    // =========================================================================
    // Generic JSON get/set/delete
    // =========================================================================

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the value at `key` and deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyNotFound`] if the key does not exist.
    /// Returns [`DbError::Serialization`] if deserialization fails.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value.map_or_else(
            || Err(DbError::KeyNotFound(key.to_owned())),
            |s| Ok(serde_json::from_str(&s)?),
        )
    }

    /// Delete a key from `Dragonfly`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    // =========================================================================
    // World clock and tick -- world:tick, world:clock, world:summary
    // =========================================================================

    /// Set the current tick number (`world:tick`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_world_tick(&self, tick: u64) -> Result<(), DbError> {
        let _: () = self
            .client
            .set("world:tick", tick.to_string().as_str(), None, None, false)
            .await?;
        Ok(())
    }

    /// Get the current tick number (`world:tick`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyNotFound`] if not set.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_world_tick(&self) -> Result<u64, DbError> {
        let value: Option<String> = self.client.get("world:tick").await?;
        value.map_or_else(
            || Err(DbError::KeyNotFound("world:tick".to_owned())),
            |s| {
                s.parse::<u64>()
                    .map_err(|e| DbError::Config(format!("world:tick is not a valid u64: {e}")))
            },
        )
    }

    /// Set the serialized clock state (`world:clock`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or write fails.
    pub async fn set_world_clock<T: Serialize>(&self, clock: &T) -> Result<(), DbError> {
        self.set_json("world:clock", clock).await
    }

    /// Get the serialized clock state (`world:clock`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if not found, deserialization, or read fails.
    pub async fn get_world_clock<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        self.get_json("world:clock").await
    }

    /// Set the world summary (`world:summary`) -- the tick/event/phase
    /// triple the observer's `GET /status` endpoint mirrors (spec.md 6.5).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or write fails.
    pub async fn set_world_summary(&self, summary: &WorldSummary) -> Result<(), DbError> {
        self.set_json("world:summary", summary).await
    }

    /// Get the world summary (`world:summary`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if not found, deserialization, or read fails.
    pub async fn get_world_summary(&self) -> Result<WorldSummary, DbError> {
        self.get_json("world:summary").await
    }

    // =========================================================================
    // Per-face change-sets -- face:{n}:changeset
    // =========================================================================

    /// Store the latest change-set for a face (`face:{n}:changeset`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or write fails.
    pub async fn set_changeset(&self, face: u8, changeset: &ChangeSet) -> Result<(), DbError> {
        let key = format!("face:{face}:changeset");
        self.set_json(&key, changeset).await
    }

    /// Get the latest change-set for a face.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if not found, deserialization, or read fails.
    pub async fn get_changeset(&self, face: u8) -> Result<ChangeSet, DbError> {
        let key = format!("face:{face}:changeset");
        self.get_json(&key).await
    }

    /// Store every face's change-set produced by a tick in one pass, so
    /// a newly (re)connecting subscriber can fetch a full snapshot
    /// across all 30 faces without interleaving with the next tick's
    /// writes (spec.md 5: "subscribers ... always eventually see a full
    /// snapshot on reconnect").
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any individual write fails; earlier writes
    /// in the batch are not rolled back (`Dragonfly` state is a cache,
    /// not the system of record).
    pub async fn set_changesets<'a, I>(&self, changesets: I) -> Result<(), DbError>
    where
        I: IntoIterator<Item = &'a ChangeSet>,
    {
        for changeset in changesets {
            self.set_changeset(changeset.face, changeset).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Trade state -- trade:{id}
    // =========================================================================

    /// Store an open trade at `trade:{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or write fails.
    pub async fn set_trade(&self, trade: &Trade) -> Result<(), DbError> {
        let key = format!("trade:{}", trade.id);
        self.set_json(&key, trade).await
    }

    /// Get a trade by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if not found, deserialization, or read fails.
    pub async fn get_trade(&self, trade_id: TradeId) -> Result<Trade, DbError> {
        let key = format!("trade:{trade_id}");
        self.get_json(&key).await
    }

    /// Delete a trade (after completion or cancellation).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete_trade(&self, trade_id: TradeId) -> Result<(), DbError> {
        let key = format!("trade:{trade_id}");
        self.delete(&key).await
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}
