//! World persistence: the core tables behind spec.md 6.3 / 4.H.
//!
//! A world's cold state is a handful of narrow, independently-upserted
//! tables rather than a single serialized blob, so that a save only
//! has to touch the tiles and buildings the tick processor's dirty set
//! actually names (spec.md 4.H). Schema-versioned deserialization of a
//! building's `state_json` happens at the call site (`spheric-core` /
//! `spheric-world`), not in this crate, so `spheric-db` never has to
//! depend on the behavior-state types -- a row that fails to
//! deserialize there is skipped and logged per spec.md 4.H's fallback,
//! leaving the tile empty rather than failing the whole load.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use spheric_types::{Direction, Item, PlayerId, TradeId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Serialize a closed, unit-variant enum to its snake_case atom string.
///
/// # Errors
///
/// Returns [`DbError::Serialization`] if `value` doesn't serialize to a
/// JSON string (a programmer error for any type this is used with).
fn atom<T: Serialize>(value: &T) -> Result<String, DbError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(DbError::Serialization(serde::de::Error::custom(format!(
            "expected atom-valued enum to serialize to a string, got {other}"
        )))),
    }
}

/// Deserialize a snake_case atom string back into a closed enum.
///
/// # Errors
///
/// Returns [`DbError::Serialization`] if `atom` isn't a valid variant.
fn from_atom<T: DeserializeOwned>(atom: &str) -> Result<T, DbError> {
    Ok(serde_json::from_value(serde_json::Value::String(
        atom.to_owned(),
    ))?)
}

/// A row identifying a saved world (the `worlds` table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorldRow {
    /// World identifier.
    pub id: Uuid,
    /// World name, looked up by startup (spec.md 4.H).
    pub name: String,
    /// Generator seed.
    pub seed: i64,
    /// Tiles per face edge (64, spec.md 6.4).
    pub subdivisions: i32,
}

/// A saved tile resource deposit (the `tile_resources` table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TileResourceRow {
    /// Face index.
    pub face: i16,
    /// Row within the face.
    pub row: i16,
    /// Column within the face.
    pub col: i16,
    /// Resource kind atom, `None` when the tile has no deposit.
    pub resource_type: Option<String>,
    /// Remaining amount, `None` when the tile has no deposit.
    pub amount: Option<i32>,
}

/// A saved building (the `buildings` table). `state_json` is returned
/// raw; the caller deserializes it against the current behavior-state
/// schema and decides what to do on failure (spec.md 4.H fallback).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BuildingRow {
    /// Face index.
    pub face: i16,
    /// Row within the face.
    pub row: i16,
    /// Column within the face.
    pub col: i16,
    /// Building kind atom.
    pub building_type: String,
    /// Facing orientation atom.
    pub orientation: String,
    /// Schema-versioned serialized behavior state.
    pub state_json: serde_json::Value,
    /// Owning player.
    pub owner_id: Uuid,
}

/// A saved player record (the `players` table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Player identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Assigned color (a hex string or named color, owner-chosen).
    pub color: String,
}

/// A saved trade record (the `trades` table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TradeRow {
    /// Trade identifier.
    pub id: Uuid,
    /// Offering player.
    pub offerer_id: Uuid,
    /// Items offered, as an atom-keyed JSON object.
    pub offered_items: serde_json::Value,
    /// Items requested, as an atom-keyed JSON object.
    pub requested_items: serde_json::Value,
    /// Trade status atom.
    pub status: String,
}

impl TradeRow {
    /// Deserialize [`Self::offered_items`] into an `Item -> quantity` map.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON is malformed.
    pub fn offered_items(&self) -> Result<BTreeMap<Item, u32>, DbError> {
        Ok(serde_json::from_value(self.offered_items.clone())?)
    }

    /// Deserialize [`Self::requested_items`] into an `Item -> quantity` map.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON is malformed.
    pub fn requested_items(&self) -> Result<BTreeMap<Item, u32>, DbError> {
        Ok(serde_json::from_value(self.requested_items.clone())?)
    }
}

/// A saved `(item, submitted)` pair from the `research_progress` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ResearchProgressRow {
    item: String,
    submitted: i64,
}

/// One dirty tile's resource deposit, staged for a save (spec.md 4.H step 1).
#[derive(Debug, Clone)]
pub struct TileUpdate {
    /// The tile's address.
    pub key: spheric_types::TileKey,
    /// The deposit to persist, `None` for "no deposit".
    pub resource: Option<(spheric_types::ResourceKind, u16)>,
}

/// One dirty building, staged for a save (spec.md 4.H step 2).
#[derive(Debug, Clone)]
pub struct BuildingUpdate {
    /// The building's tile address.
    pub key: spheric_types::TileKey,
    /// Building kind.
    pub kind: spheric_types::BuildingKind,
    /// Facing orientation.
    pub orientation: Direction,
    /// Schema-versioned serialized behavior state.
    pub state_json: serde_json::Value,
    /// Owning player.
    pub owner_id: Uuid,
}

/// Repository for the core world-persistence tables (spec.md 6.3, 4.H).
pub struct WorldRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WorldRepository<'a> {
    /// Bind a repository to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Commit a save-interval batch in one transaction (spec.md 4.H): upsert
    /// every dirty tile's resource deposit and every dirty building, then
    /// delete every removed building. On failure, nothing in the batch is
    /// applied and the caller should re-merge its dirty set for a later
    /// retry (this function does not retry itself).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or any query in the
    /// transaction fails; the transaction is rolled back on drop.
    pub async fn persist_dirty_state(
        &self,
        world_id: Uuid,
        tile_updates: &[TileUpdate],
        building_updates: &[BuildingUpdate],
        removed_buildings: &[spheric_types::TileKey],
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for update in tile_updates {
            let (resource_type, amount) = match update.resource {
                Some((kind, amount)) => (Some(atom(&kind)?), Some(i32::from(amount))),
                None => (None, None),
            };

            sqlx::query(
                r"INSERT INTO tile_resources (world_id, face, row, col, resource_type, amount)
                  VALUES ($1, $2, $3, $4, $5, $6)
                  ON CONFLICT (world_id, face, row, col)
                  DO UPDATE SET resource_type = EXCLUDED.resource_type, amount = EXCLUDED.amount",
            )
            .bind(world_id)
            .bind(i16::from(update.key.face))
            .bind(i16::from(update.key.row))
            .bind(i16::from(update.key.col))
            .bind(resource_type)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }

        for update in building_updates {
            let kind_atom = atom(&update.kind)?;
            let orientation_atom = atom(&update.orientation)?;

            sqlx::query(
                r"INSERT INTO buildings (world_id, face, row, col, type, orientation, state_json, owner_id)
                  VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                  ON CONFLICT (world_id, face, row, col)
                  DO UPDATE SET type = EXCLUDED.type, orientation = EXCLUDED.orientation,
                                state_json = EXCLUDED.state_json, owner_id = EXCLUDED.owner_id",
            )
            .bind(world_id)
            .bind(i16::from(update.key.face))
            .bind(i16::from(update.key.row))
            .bind(i16::from(update.key.col))
            .bind(kind_atom)
            .bind(orientation_atom)
            .bind(&update.state_json)
            .bind(update.owner_id)
            .execute(&mut *tx)
            .await?;
        }

        for key in removed_buildings {
            sqlx::query(
                r"DELETE FROM buildings WHERE world_id = $1 AND face = $2 AND row = $3 AND col = $4",
            )
            .bind(world_id)
            .bind(i16::from(key.face))
            .bind(i16::from(key.row))
            .bind(i16::from(key.col))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            tiles = tile_updates.len(),
            buildings = building_updates.len(),
            removed = removed_buildings.len(),
            "Persisted dirty world state"
        );

        Ok(())
    }

    // =========================================================================
    // worlds
    // =========================================================================

    /// Create a world row, or return the existing one if `name` is
    /// already taken (startup looks up the world by name, spec.md 4.H).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn create_or_get_world(
        &self,
        name: &str,
        seed: u64,
        subdivisions: u8,
    ) -> Result<WorldRow, DbError> {
        let seed_i64 = i64::try_from(seed).unwrap_or(i64::MAX);
        let subdivisions_i32 = i32::from(subdivisions);

        let row = sqlx::query_as::<_, WorldRow>(
            r"INSERT INTO worlds (id, name, seed, subdivisions)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
              RETURNING id, name, seed, subdivisions",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(seed_i64)
        .bind(subdivisions_i32)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Look up a world by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_world_by_name(&self, name: &str) -> Result<Option<WorldRow>, DbError> {
        let row = sqlx::query_as::<_, WorldRow>(
            r"SELECT id, name, seed, subdivisions FROM worlds WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    // =========================================================================
    // tile_resources
    // =========================================================================

    /// Upsert a tile's resource deposit. Pass `None` to persist the
    /// absence of a deposit as `(null, null)` (spec.md 4.H step 1).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the query fails.
    pub async fn upsert_tile_resource(
        &self,
        world_id: Uuid,
        face: u8,
        row: u8,
        col: u8,
        deposit: Option<(spheric_types::ResourceKind, u16)>,
    ) -> Result<(), DbError> {
        let (resource_type, amount) = match deposit {
            Some((kind, amount)) => (Some(atom(&kind)?), Some(i32::from(amount))),
            None => (None, None),
        };

        sqlx::query(
            r"INSERT INTO tile_resources (world_id, face, row, col, resource_type, amount)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (world_id, face, row, col)
              DO UPDATE SET resource_type = EXCLUDED.resource_type, amount = EXCLUDED.amount",
        )
        .bind(world_id)
        .bind(i16::from(face))
        .bind(i16::from(row))
        .bind(i16::from(col))
        .bind(resource_type)
        .bind(amount)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Stream every saved tile-resource row for a world, to overlay on
    /// the generator's output at load time (spec.md 4.H).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_tile_resources(
        &self,
        world_id: Uuid,
    ) -> Result<Vec<TileResourceRow>, DbError> {
        let rows = sqlx::query_as::<_, TileResourceRow>(
            r"SELECT face, row, col, resource_type, amount
              FROM tile_resources
              WHERE world_id = $1",
        )
        .bind(world_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // buildings
    // =========================================================================

    /// Upsert a dirty building's persisted fields (spec.md 4.H step 2).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_building(
        &self,
        world_id: Uuid,
        face: u8,
        row: u8,
        col: u8,
        kind: spheric_types::BuildingKind,
        orientation: Direction,
        state_json: &serde_json::Value,
        owner_id: Uuid,
    ) -> Result<(), DbError> {
        let kind_atom = atom(&kind)?;
        let orientation_atom = atom(&orientation)?;

        sqlx::query(
            r"INSERT INTO buildings (world_id, face, row, col, type, orientation, state_json, owner_id)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
              ON CONFLICT (world_id, face, row, col)
              DO UPDATE SET type = EXCLUDED.type, orientation = EXCLUDED.orientation,
                            state_json = EXCLUDED.state_json, owner_id = EXCLUDED.owner_id",
        )
        .bind(world_id)
        .bind(i16::from(face))
        .bind(i16::from(row))
        .bind(i16::from(col))
        .bind(kind_atom)
        .bind(orientation_atom)
        .bind(state_json)
        .bind(owner_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a removed building (spec.md 4.H step 3).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn delete_building(
        &self,
        world_id: Uuid,
        face: u8,
        row: u8,
        col: u8,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"DELETE FROM buildings WHERE world_id = $1 AND face = $2 AND row = $3 AND col = $4",
        )
        .bind(world_id)
        .bind(i16::from(face))
        .bind(i16::from(row))
        .bind(i16::from(col))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Stream every saved building row for a world (spec.md 4.H load).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_buildings(&self, world_id: Uuid) -> Result<Vec<BuildingRow>, DbError> {
        let rows = sqlx::query_as::<_, BuildingRow>(
            r"SELECT face, row, col, type as building_type, orientation, state_json, owner_id
              FROM buildings
              WHERE world_id = $1",
        )
        .bind(world_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // players
    // =========================================================================

    /// Upsert a player record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn upsert_player(&self, id: PlayerId, name: &str, color: &str) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO players (id, name, color)
              VALUES ($1, $2, $3)
              ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, color = EXCLUDED.color",
        )
        .bind(id.into_inner())
        .bind(name)
        .bind(color)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List every player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_players(&self) -> Result<Vec<PlayerRow>, DbError> {
        let rows = sqlx::query_as::<_, PlayerRow>(r"SELECT id, name, color FROM players")
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    // =========================================================================
    // research_progress
    // =========================================================================

    /// Upsert one player's submitted-item count toward research
    /// (spec.md 3.2; one row per `(world, player, item)`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the query fails.
    pub async fn upsert_research_progress(
        &self,
        world_id: Uuid,
        player_id: PlayerId,
        item: &Item,
        submitted: u32,
    ) -> Result<(), DbError> {
        let item_atom = item.as_atom();

        sqlx::query(
            r"INSERT INTO research_progress (world_id, player_id, item, submitted)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (world_id, player_id, item)
              DO UPDATE SET submitted = EXCLUDED.submitted",
        )
        .bind(world_id)
        .bind(player_id.into_inner())
        .bind(item_atom)
        .bind(i64::from(submitted))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Load a player's full submitted-items map.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_research_progress(
        &self,
        world_id: Uuid,
        player_id: PlayerId,
    ) -> Result<BTreeMap<Item, u32>, DbError> {
        let rows = sqlx::query_as::<_, ResearchProgressRow>(
            r"SELECT item, submitted FROM research_progress WHERE world_id = $1 AND player_id = $2",
        )
        .bind(world_id)
        .bind(player_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (Item::from_atom(&row.item), u32::try_from(row.submitted).unwrap_or(u32::MAX)))
            .collect())
    }

    // =========================================================================
    // trades
    // =========================================================================

    /// Upsert a trade record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the query fails.
    pub async fn upsert_trade(&self, world_id: Uuid, trade: &spheric_types::Trade) -> Result<(), DbError> {
        let offered = serde_json::to_value(&trade.offered_items)?;
        let requested = serde_json::to_value(&trade.requested_items)?;
        let status = atom(&trade.status)?;

        sqlx::query(
            r"INSERT INTO trades (id, world_id, offerer_id, offered_items, requested_items, status)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (id)
              DO UPDATE SET offered_items = EXCLUDED.offered_items,
                            requested_items = EXCLUDED.requested_items,
                            status = EXCLUDED.status",
        )
        .bind(trade.id.into_inner())
        .bind(world_id)
        .bind(trade.offerer.into_inner())
        .bind(&offered)
        .bind(&requested)
        .bind(status)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List every open trade for a world.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_open_trades(&self, world_id: Uuid) -> Result<Vec<TradeRow>, DbError> {
        let rows = sqlx::query_as::<_, TradeRow>(
            r"SELECT id, offerer_id, offered_items, requested_items, status
              FROM trades
              WHERE world_id = $1 AND status = 'open'",
        )
        .bind(world_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // board_contact
    // =========================================================================

    /// Upsert the world's single board-contact objective row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the query fails.
    pub async fn upsert_board_contact(
        &self,
        world_id: Uuid,
        requirements: &BTreeMap<Item, u32>,
        submitted: &BTreeMap<Item, u32>,
        active: bool,
        completed: bool,
        contributors: &[PlayerId],
    ) -> Result<(), DbError> {
        let requirements_json = serde_json::to_value(requirements)?;
        let submitted_json = serde_json::to_value(submitted)?;
        let contributor_ids: Vec<Uuid> = contributors.iter().copied().map(PlayerId::into_inner).collect();
        let contributors_json = serde_json::to_value(&contributor_ids)?;

        sqlx::query(
            r"INSERT INTO board_contact (world_id, requirements_json, submitted_json, active, completed, contributors_json)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (world_id)
              DO UPDATE SET requirements_json = EXCLUDED.requirements_json,
                            submitted_json = EXCLUDED.submitted_json,
                            active = EXCLUDED.active,
                            completed = EXCLUDED.completed,
                            contributors_json = EXCLUDED.contributors_json",
        )
        .bind(world_id)
        .bind(&requirements_json)
        .bind(&submitted_json)
        .bind(active)
        .bind(completed)
        .bind(&contributors_json)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Load the world's board-contact objective row, if set.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_board_contact(
        &self,
        world_id: Uuid,
    ) -> Result<Option<BoardContactRow>, DbError> {
        let row = sqlx::query_as::<_, BoardContactRow>(
            r"SELECT requirements_json, submitted_json, active, completed, contributors_json
              FROM board_contact
              WHERE world_id = $1",
        )
        .bind(world_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }
}

/// A saved board-contact objective row (the `board_contact` table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoardContactRow {
    /// Required items and quantities, as an atom-keyed JSON object.
    pub requirements_json: serde_json::Value,
    /// Submitted-so-far items and quantities.
    pub submitted_json: serde_json::Value,
    /// Whether the objective is currently active.
    pub active: bool,
    /// Whether the objective has been completed.
    pub completed: bool,
    /// Contributing player ids.
    pub contributors_json: serde_json::Value,
}

impl BoardContactRow {
    /// Deserialize [`Self::requirements_json`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON is malformed.
    pub fn requirements(&self) -> Result<BTreeMap<Item, u32>, DbError> {
        Ok(serde_json::from_value(self.requirements_json.clone())?)
    }

    /// Deserialize [`Self::submitted_json`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON is malformed.
    pub fn submitted(&self) -> Result<BTreeMap<Item, u32>, DbError> {
        Ok(serde_json::from_value(self.submitted_json.clone())?)
    }

    /// Deserialize [`Self::contributors_json`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored JSON is malformed.
    pub fn contributors(&self) -> Result<Vec<PlayerId>, DbError> {
        let ids: Vec<Uuid> = serde_json::from_value(self.contributors_json.clone())?;
        Ok(ids.into_iter().map(PlayerId::from).collect())
    }
}

/// Restore a building's kind atom to a [`spheric_types::BuildingKind`].
///
/// # Errors
///
/// Returns [`DbError::Serialization`] if the atom isn't a valid kind.
pub fn building_kind_from_atom(atom_str: &str) -> Result<spheric_types::BuildingKind, DbError> {
    from_atom(atom_str)
}

/// Restore an orientation atom to a [`Direction`].
///
/// # Errors
///
/// Returns [`DbError::Serialization`] if the atom isn't a valid direction.
pub fn direction_from_atom(atom_str: &str) -> Result<Direction, DbError> {
    from_atom(atom_str)
}

/// Restore a resource-kind atom to a [`spheric_types::ResourceKind`].
///
/// # Errors
///
/// Returns [`DbError::Serialization`] if the atom isn't a valid kind.
pub fn resource_kind_from_atom(atom_str: &str) -> Result<spheric_types::ResourceKind, DbError> {
    from_atom(atom_str)
}

#[cfg(test)]
mod tests {
    use spheric_types::{BuildingKind, ResourceKind};

    use super::*;

    #[test]
    fn building_kind_atom_round_trips() {
        let kind_atom = atom(&BuildingKind::Lamp).expect("serializes");
        assert_eq!(kind_atom, "lamp");
        assert_eq!(building_kind_from_atom(&kind_atom).expect("parses"), BuildingKind::Lamp);
    }

    #[test]
    fn resource_kind_atom_round_trips() {
        let kind_atom = atom(&ResourceKind::Uranium).expect("serializes");
        assert_eq!(kind_atom, "uranium");
        assert_eq!(resource_kind_from_atom(&kind_atom).expect("parses"), ResourceKind::Uranium);
    }

    #[test]
    fn direction_atom_round_trips() {
        let dir_atom = atom(&Direction::North).expect("serializes");
        assert_eq!(dir_atom, "north");
        assert_eq!(direction_from_atom(&dir_atom).expect("parses"), Direction::North);
    }
}
