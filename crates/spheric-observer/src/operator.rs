//! Operator REST API handlers for runtime simulation control.
//!
//! These endpoints are separate from the read-only observer API and
//! from the player command-submission surface in [`crate::handlers`].
//! They provide one-way command authority from the operator console to
//! the tick loop.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/operator/pause` | Pause the tick loop |
//! | `POST` | `/operator/resume` | Resume the tick loop |
//! | `POST` | `/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/status` | Current simulation status |
//! | `POST` | `/operator/inject-event` | Force a world event active next tick |
//! | `POST` | `/operator/stop` | Trigger clean shutdown |

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use spheric_core::operator::SimulationStatus;
use spheric_types::EventKind;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Request body for `POST /operator/inject-event`.
#[derive(Debug, serde::Deserialize)]
pub struct InjectEventRequest {
    /// The world event to force active at the start of the next tick.
    pub kind: EventKind,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

fn require_operator(state: &AppState) -> Result<&Arc<spheric_core::operator::OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or_else(|| ObserverError::Internal("operator state not available".to_owned()))
}

// ---------------------------------------------------------------------------
// POST /operator/pause
// ---------------------------------------------------------------------------

/// Pause the simulation tick loop.
///
/// The tick loop will sleep until resumed. All state is preserved in
/// memory (and Dragonfly, for restart recovery). Returns an error if no
/// operator state is attached.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = require_operator(&state)?;
    operator.pause();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation paused".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /operator/resume
// ---------------------------------------------------------------------------

/// Resume the simulation tick loop after a pause.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = require_operator(&state)?;
    operator.resume();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation resumed".to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// POST /operator/speed
// ---------------------------------------------------------------------------

/// Change the tick interval at runtime.
///
/// The new interval takes effect before the next tick's sleep. Minimum
/// 100ms to prevent runaway ticks.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = require_operator(&state)?;

    operator.set_tick_interval_ms(body.tick_interval_ms).map_or_else(
        || {
            Err(ObserverError::InvalidQuery(
                "tick_interval_ms must be at least 100".to_owned(),
            ))
        },
        |prev| {
            Ok(Json(serde_json::json!({
                "ok": true,
                "message": format!("Tick interval changed from {}ms to {}ms", prev, body.tick_interval_ms),
                "previous_interval_ms": prev,
                "new_interval_ms": body.tick_interval_ms,
            })))
        },
    )
}

// ---------------------------------------------------------------------------
// GET /status
// ---------------------------------------------------------------------------

/// Return the current simulation status: tick, pause state, speed,
/// active world event, and shift-cycle phase.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = require_operator(&state)?;
    let summary = state.summary().await;
    let end_reason = operator.end_reason().await;

    let status = SimulationStatus {
        tick: summary.tick,
        paused: operator.is_paused(),
        stop_requested: operator.is_stop_requested(),
        tick_interval_ms: operator.tick_interval_ms(),
        elapsed_seconds: operator.elapsed_seconds(),
        max_ticks: operator.max_ticks(),
        max_real_time_seconds: operator.max_real_time_seconds(),
        active_world_event: summary.active_event,
        shift_phase: summary.shift_phase.unwrap_or(spheric_types::ShiftPhase::Dawn),
        end_reason,
        started_at: operator.started_at().to_rfc3339(),
    };

    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// POST /operator/inject-event
// ---------------------------------------------------------------------------

/// Queue a world event to be forced active at the start of the next
/// tick, overriding the roll-based scheduler for that activation.
pub async fn inject_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InjectEventRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = require_operator(&state)?;
    operator.queue_world_event(body.kind).await;

    Ok(Json(OperatorResponse {
        ok: true,
        message: format!("Event {:?} queued for next tick", body.kind),
    }))
}

// ---------------------------------------------------------------------------
// POST /operator/stop
// ---------------------------------------------------------------------------

/// Trigger a clean simulation shutdown.
///
/// The tick loop will finish its current tick and stop. The HTTP
/// server continues running so the observer can still query the last
/// published state.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = require_operator(&state)?;
    operator.request_stop();

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested -- simulation will end after current tick".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::router::build_router;

    fn router_with_operator() -> axum::Router {
        let bounds = spheric_core::config::SimulationBoundsConfig {
            max_ticks: 0,
            max_real_time_seconds: 0,
            end_condition: String::from("manual"),
        };
        let operator = Arc::new(spheric_core::operator::OperatorState::new(1000, &bounds));
        build_router(Arc::new(AppState::with_operator(operator)))
    }

    #[tokio::test]
    async fn pause_without_operator_state_returns_internal_error() {
        let router = build_router(Arc::new(AppState::new()));
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/operator/pause")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn pause_then_status_reports_paused() {
        let router = router_with_operator();
        let pause_response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/operator/pause")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(pause_response.status(), axum::http::StatusCode::OK);

        let status_response = router
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(status_response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn speed_below_minimum_is_rejected() {
        let router = router_with_operator();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/operator/speed")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"tick_interval_ms":10}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
