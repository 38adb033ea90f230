//! REST API endpoint handlers for the Observer server.
//!
//! Two kinds of endpoint live here: read-only queries against the
//! in-process [`AppState`] (the dashboard, per-face change-set lookup),
//! and player command submission. Command bodies are validated at this
//! HTTP boundary with [`validator`] before ever reaching the tick
//! loop's command queue -- the tick processor itself never validates,
//! it only applies (spec.md 6.1).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/faces/:face/changeset` | Latest change-set for a face |
//! | `POST` | `/commands/place` | Place a building |
//! | `POST` | `/commands/place-batch` | Place many buildings |
//! | `POST` | `/commands/remove` | Remove a building |
//! | `POST` | `/commands/link-conduit` | Link two underground conduits |
//! | `POST` | `/commands/link-trade` | Link a trade terminal |
//! | `POST` | `/commands/eject` | Eject a building's contents |
//! | `POST` | `/commands/toggle-power` | Toggle a building's power participation |
//! | `POST` | `/commands/select-upgrade` | Purchase an upgrade |
//! | `POST` | `/commands/activate-board-contact` | Submit board-contact research |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use spheric_types::{
    BuildingKind, Command, CommandError, CommandResult, Direction, PlacementRequest, PlayerId,
    TileKey, TradeId, UpgradeKind,
};
use validator::{Validate, ValidationError};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summary = state.summary().await;
    let tick = summary.tick;
    let event = summary
        .active_event
        .map_or_else(|| "none".to_owned(), |e| format!("{e:?}"));
    let phase = summary
        .shift_phase
        .map_or_else(|| "unknown".to_owned(), |p| format!("{p:?}"));

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Spheric Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Spheric Observer</h1>
    <p class="subtitle">Rhombic-triacontahedron factory simulation -- 30 faces, 64x64 tiles each</p>

    <div>
        <div class="metric">
            <div class="label">Tick</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Shift Phase</div>
            <div class="value">{phase}</div>
        </div>
        <div class="metric">
            <div class="label">World Event</div>
            <div class="value">{event}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><code>GET /status</code> -- simulation status</li>
        <li><code>GET /faces/:face/changeset</code> -- latest change-set for a face</li>
        <li><code>POST /commands/place</code>, <code>/commands/remove</code>, ... -- player commands</li>
        <li><code>ws://host:port/ws/faces/:face</code> -- live change-set stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /faces/:face/changeset
// ---------------------------------------------------------------------------

/// Return the most recently published change-set for `face`, if one
/// has been published since this process started.
///
/// # Errors
///
/// Returns [`ObserverError::InvalidQuery`] if `face` is out of range,
/// or [`ObserverError::NotFound`] if no change-set has been published
/// yet.
pub async fn get_changeset(
    State(state): State<Arc<AppState>>,
    Path(face): Path<u8>,
) -> Result<impl IntoResponse, ObserverError> {
    if state.subscribe_face(face).is_none() {
        return Err(ObserverError::InvalidQuery(format!(
            "face {face} is out of range"
        )));
    }

    state
        .latest_changeset(face)
        .await
        .map(Json)
        .ok_or_else(|| ObserverError::NotFound(format!("no change-set published for face {face}")))
}

// ---------------------------------------------------------------------------
// Command submission
// ---------------------------------------------------------------------------

fn validate_tile_key(key: &TileKey) -> Result<(), ValidationError> {
    if TileKey::checked_new(key.face, key.row, key.col).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("tile_out_of_range"))
    }
}

fn validate_placements(placements: &[PlacementRequest]) -> Result<(), ValidationError> {
    if placements.iter().all(|p| validate_tile_key(&p.key).is_ok()) {
        Ok(())
    } else {
        Err(ValidationError::new("tile_out_of_range"))
    }
}

/// Request body for `POST /commands/place`.
#[derive(Debug, Deserialize, Validate)]
pub struct PlaceRequest {
    /// Target tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub key: TileKey,
    /// Building kind to place.
    pub kind: BuildingKind,
    /// Facing orientation.
    pub orientation: Direction,
    /// Issuing player.
    pub owner: PlayerId,
}

/// Request body for `POST /commands/place-batch`.
#[derive(Debug, Deserialize, Validate)]
pub struct PlaceBatchRequest {
    /// Placements to attempt, in order.
    #[validate(custom(function = "validate_placements"))]
    pub placements: Vec<PlacementRequest>,
}

/// Request body for `POST /commands/remove`.
#[derive(Debug, Deserialize, Validate)]
pub struct RemoveRequest {
    /// Target tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub key: TileKey,
    /// Issuing player.
    pub owner: PlayerId,
}

/// Request body for `POST /commands/link-conduit`.
#[derive(Debug, Deserialize, Validate)]
pub struct LinkConduitRequest {
    /// First conduit tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub a: TileKey,
    /// Second conduit tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub b: TileKey,
    /// Issuing player.
    pub owner: PlayerId,
}

/// Request body for `POST /commands/link-trade`.
#[derive(Debug, Deserialize, Validate)]
pub struct LinkTradeRequest {
    /// Trade-terminal tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub key: TileKey,
    /// Trade record to link.
    pub trade_id: TradeId,
    /// Issuing player.
    pub owner: PlayerId,
}

/// Request body for `POST /commands/eject` and `POST /commands/toggle-power`.
#[derive(Debug, Deserialize, Validate)]
pub struct TileOwnerRequest {
    /// Target tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub key: TileKey,
    /// Issuing player.
    pub owner: PlayerId,
}

/// Request body for `POST /commands/select-upgrade`.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectUpgradeRequest {
    /// Target building tile.
    #[validate(custom(function = "validate_tile_key"))]
    pub key: TileKey,
    /// Upgrade to purchase.
    pub upgrade: UpgradeKind,
    /// Issuing player.
    pub owner: PlayerId,
}

/// Request body for `POST /commands/activate-board-contact`.
#[derive(Debug, Deserialize, Validate)]
pub struct ActivateBoardContactRequest {
    /// Issuing player.
    pub owner: PlayerId,
}

/// Wrapper so a [`CommandResult`] can be returned directly from a
/// handler and converted to the right HTTP status.
struct CommandOutcome(CommandResult);

impl IntoResponse for CommandOutcome {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
            Err(err) => {
                let status = match err {
                    CommandError::InvalidTile
                    | CommandError::InvalidPlacement
                    | CommandError::InvalidKind
                    | CommandError::NotConduit => StatusCode::BAD_REQUEST,
                    CommandError::NoClearance
                    | CommandError::TerritoryViolation
                    | CommandError::NotOwner => StatusCode::FORBIDDEN,
                    CommandError::NoBuilding => StatusCode::NOT_FOUND,
                    CommandError::TileOccupied
                    | CommandError::AlreadyLinked
                    | CommandError::AlreadyPurchased
                    | CommandError::InsufficientResources => StatusCode::CONFLICT,
                };
                (status, Json(serde_json::json!({ "ok": false, "error": err }))).into_response()
            }
        }
    }
}

fn validation_error(errors: validator::ValidationErrors) -> ObserverError {
    ObserverError::InvalidQuery(errors.to_string())
}

async fn submit(state: &AppState, command: Command) -> Result<CommandOutcome, ObserverError> {
    let operator = state
        .operator_state
        .as_ref()
        .ok_or_else(|| ObserverError::Internal("operator state not available".to_owned()))?;

    let rx = operator.enqueue_command(command).await;
    let result = rx
        .await
        .map_err(|_| ObserverError::Internal("command dropped before reply".to_owned()))?;

    Ok(CommandOutcome(result))
}

/// `POST /commands/place`.
///
/// # Errors
///
/// Returns [`ObserverError::InvalidQuery`] if the body fails validation
/// or [`ObserverError::Internal`] if no operator is attached.
pub async fn place(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlaceRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::Place {
            key: body.key,
            kind: body.kind,
            orientation: body.orientation,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/place-batch`.
///
/// # Errors
///
/// See [`place`].
pub async fn place_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlaceBatchRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::PlaceBatch {
            placements: body.placements,
        },
    )
    .await
}

/// `POST /commands/remove`.
///
/// # Errors
///
/// See [`place`].
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RemoveRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::Remove {
            key: body.key,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/link-conduit`.
///
/// # Errors
///
/// See [`place`].
pub async fn link_conduit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LinkConduitRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::LinkConduit {
            a: body.a,
            b: body.b,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/link-trade`.
///
/// # Errors
///
/// See [`place`].
pub async fn link_trade(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LinkTradeRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::LinkTrade {
            key: body.key,
            trade_id: body.trade_id,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/eject`.
///
/// # Errors
///
/// See [`place`].
pub async fn eject(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TileOwnerRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::Eject {
            key: body.key,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/toggle-power`.
///
/// # Errors
///
/// See [`place`].
pub async fn toggle_power(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TileOwnerRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::TogglePower {
            key: body.key,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/select-upgrade`.
///
/// # Errors
///
/// See [`place`].
pub async fn select_upgrade(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectUpgradeRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(
        &state,
        Command::SelectUpgrade {
            key: body.key,
            upgrade: body.upgrade,
            owner: body.owner,
        },
    )
    .await
}

/// `POST /commands/activate-board-contact`.
///
/// # Errors
///
/// See [`place`].
pub async fn activate_board_contact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActivateBoardContactRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate().map_err(validation_error)?;
    submit(&state, Command::ActivateBoardContact { owner: body.owner }).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_tile_key_rejects_out_of_range_face() {
        let key = TileKey::new(30, 0, 0);
        assert!(validate_tile_key(&key).is_err());
    }

    #[test]
    fn validate_tile_key_accepts_in_range() {
        let key = TileKey::new(0, 63, 63);
        assert!(validate_tile_key(&key).is_ok());
    }

    #[test]
    fn command_outcome_maps_errors_to_status() {
        let response = CommandOutcome(Err(CommandError::NoBuilding)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = CommandOutcome(Err(CommandError::NotOwner)).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = CommandOutcome(Ok(())).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
