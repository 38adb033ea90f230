//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /status` -- operator status
/// - `GET /faces/:face/changeset` -- latest change-set for a face
/// - `GET /ws/faces/:face` -- `WebSocket` change-set stream for a face
/// - `POST /operator/pause|resume|stop|speed|inject-event` -- operator control
/// - `POST /commands/*` -- player command submission
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        .route("/status", get(operator::status))
        // Per-face reads
        .route("/faces/{face}/changeset", get(handlers::get_changeset))
        .route("/ws/faces/{face}", get(ws::ws_face))
        // Operator control
        .route("/operator/pause", post(operator::pause))
        .route("/operator/resume", post(operator::resume))
        .route("/operator/stop", post(operator::stop))
        .route("/operator/speed", post(operator::set_speed))
        .route("/operator/inject-event", post(operator::inject_event))
        // Player commands
        .route("/commands/place", post(handlers::place))
        .route("/commands/place-batch", post(handlers::place_batch))
        .route("/commands/remove", post(handlers::remove))
        .route("/commands/link-conduit", post(handlers::link_conduit))
        .route("/commands/link-trade", post(handlers::link_trade))
        .route("/commands/eject", post(handlers::eject))
        .route("/commands/toggle-power", post(handlers::toggle_power))
        .route("/commands/select-upgrade", post(handlers::select_upgrade))
        .route(
            "/commands/activate-board-contact",
            post(handlers::activate_board_contact),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
