//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume**: operator can halt and continue the tick loop
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Player commands**: queued commands are applied before the next tick
//! - **Clean shutdown**: final snapshot, event log, graceful stop
//! - **Operator stop**: immediate clean stop via REST API
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it. Queued player commands are applied against
//! the world store before `run_tick` so their effects are visible to the
//! same tick's behavior pass (spec.md 6.1).
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use spheric_world::commands;
use tracing::{info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to update the observer snapshot,
/// broadcast tick summaries, etc. The callback receives the tick
/// summary and the current simulation state.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Apply every command queued on `operator` against `state`'s world,
/// replying to each issuer on its channel (spec.md 6.1 phase 0).
async fn apply_pending_commands(state: &mut SimulationState, operator: &Arc<OperatorState>) {
    for pending in operator.drain_commands().await {
        let result = match pending.command {
            spheric_types::Command::PlaceBatch { placements } => {
                let results = commands::apply_batch(&mut state.world, &placements);
                results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
            }
            other => commands::apply(&mut state.world, &other),
        };
        if let Some(reply) = pending.reply {
            let _ = reply.send(result);
        }
    }
}

/// Force-activate an operator-queued world event for the upcoming tick,
/// overriding the roll-based scheduler (spec.md 6.5 event injection).
/// The scheduler leaves an already-active event untouched, so setting
/// it here before `run_tick` is enough to make it stick.
async fn apply_pending_world_event(state: &mut SimulationState, operator: &Arc<OperatorState>) {
    let Some(kind) = operator.take_pending_world_event().await else {
        return;
    };
    let next_tick = state.clock.tick().saturating_add(1);
    state.events.active = Some(kind);
    state.events.started_at_tick = next_tick;
    state.events.last_event_tick = next_tick;
    state.events.history.push((kind, next_tick));
}

/// Run the simulation loop until a termination condition is met.
///
/// This is the main entry point for a bounded simulation run. It
/// integrates the tick cycle with operator controls (pause, resume,
/// speed, stop, player commands) and simulation boundaries (max ticks,
/// max time).
///
/// # Arguments
///
/// * `state` - Mutable simulation state (world, clock, events, creatures)
/// * `operator` - Shared operator control state
/// * `callback` - Called after each tick for observer updates
///
/// # Returns
///
/// Returns a [`SimulationResult`] describing why the simulation ended
/// and the final tick summary.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably (a
/// ledger conservation-law violation).
pub async fn run_simulation(
    state: &mut SimulationState,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Simulation paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = SimulationEndReason::OperatorStop;
            operator.set_end_reason(reason.clone()).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            let reason = SimulationEndReason::MaxRealTimeReached;
            operator.set_end_reason(reason.clone()).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Apply queued player commands and event overrides, then execute the tick ---
        apply_pending_commands(state, operator).await;
        apply_pending_world_event(state, operator).await;
        let summary = tick::run_tick(state)?;

        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, state);

        // --- Check tick limit (after tick) ---
        // run_tick advances the clock internally, so summary.tick is the
        // tick number that just ran. If max_ticks is 5, we stop after
        // tick 5 has completed (total_ticks == 5).
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            let reason = SimulationEndReason::MaxTicksReached;
            operator.set_end_reason(reason.clone()).await;
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the simulation end sequence.
///
/// This should be called after [`run_simulation`] returns to perform
/// the final snapshot and logging. The HTTP server should remain
/// running after this returns.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(tick = summary.tick, faces_changed = summary.change_sets.len(), "Final tick summary");
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use spheric_types::{Biome, BuildingKind, Command, Direction, PlayerId, Tile, TileKey};
    use spheric_world::WorldStore;

    use super::*;
    use crate::config::SimulationBoundsConfig;

    fn make_simulation_state() -> SimulationState {
        let mut world = WorldStore::new();
        for row in 0..4 {
            for col in 0..4 {
                world.set_tile(TileKey::new(0, row, col), Tile { terrain: Biome::Grassland, resource: None });
            }
        }
        SimulationState::new(world, 42)
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut state = make_simulation_state();
        let bounds = SimulationBoundsConfig {
            max_ticks: 5,
            max_real_time_seconds: 0,
            end_condition: String::from("time_limit"),
        };
        let operator = Arc::new(OperatorState::new(0, &bounds));
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
    }

    #[tokio::test]
    async fn operator_stop() {
        let mut state = make_simulation_state();
        let bounds = SimulationBoundsConfig {
            max_ticks: 0,
            max_real_time_seconds: 0,
            end_condition: String::from("manual"),
        };
        let operator = Arc::new(OperatorState::new(0, &bounds));
        operator.request_stop();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
                self.count = self.count.saturating_add(1);
            }
        }

        let mut state = make_simulation_state();
        let bounds = SimulationBoundsConfig {
            max_ticks: 3,
            max_real_time_seconds: 0,
            end_condition: String::from("time_limit"),
        };
        let operator = Arc::new(OperatorState::new(0, &bounds));
        let mut cb = CountCallback { count: 0 };

        let _ = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(cb.count, 3);
    }

    #[tokio::test]
    async fn variable_speed_changes_interval() {
        let bounds = SimulationBoundsConfig {
            max_ticks: 0,
            max_real_time_seconds: 0,
            end_condition: String::from("manual"),
        };
        let operator = Arc::new(OperatorState::new(1000, &bounds));

        assert_eq!(operator.tick_interval_ms(), 1000);
        let _ = operator.set_tick_interval_ms(500);
        assert_eq!(operator.tick_interval_ms(), 500);
    }

    #[tokio::test]
    async fn a_queued_command_is_visible_to_the_next_tick() {
        let mut state = make_simulation_state();
        let bounds = SimulationBoundsConfig {
            max_ticks: 1,
            max_real_time_seconds: 0,
            end_condition: String::from("time_limit"),
        };
        let operator = Arc::new(OperatorState::new(0, &bounds));
        let key = TileKey::new(0, 0, 0);
        let rx = operator
            .enqueue_command(Command::Place {
                key,
                kind: BuildingKind::Lamp,
                orientation: Direction::East,
                owner: PlayerId::new(),
            })
            .await;
        let mut cb = NoOpCallback;

        let _ = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert!(rx.await.expect("reply sent").is_ok());
        assert!(state.world.get_building(key).is_some());
    }

    #[tokio::test]
    async fn a_queued_world_event_override_is_active_by_the_next_tick() {
        let mut state = make_simulation_state();
        let bounds = SimulationBoundsConfig {
            max_ticks: 1,
            max_real_time_seconds: 0,
            end_condition: String::from("time_limit"),
        };
        let operator = Arc::new(OperatorState::new(0, &bounds));
        operator
            .queue_world_event(spheric_types::EventKind::MeteorShower)
            .await;
        let mut cb = NoOpCallback;

        let _ = run_simulation(&mut state, &operator, &mut cb).await.unwrap();

        assert_eq!(state.events.active, Some(spheric_types::EventKind::MeteorShower));
    }
}
