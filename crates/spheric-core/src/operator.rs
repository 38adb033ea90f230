//! Operator control state for runtime simulation management.
//!
//! This module provides shared atomic state used by the tick loop and the
//! operator REST API. The operator can pause/resume, change tick speed,
//! enqueue player commands, and trigger a clean shutdown -- all without
//! stopping the process.
//!
//! # Architecture
//!
//! All mutable control fields use [`std::sync::atomic`] types wrapped in
//! [`Arc`] so they can be shared between the tick loop task and the Axum
//! handler tasks without locks on the hot path.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spheric_types::{Command, CommandResult, EventKind, ShiftPhase};
use tokio::sync::{oneshot, Mutex, Notify};

use crate::config::SimulationBoundsConfig;

/// Reason why the simulation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator issued a stop command.
    OperatorStop,
}

/// A player command queued for application at the start of the next
/// tick (spec.md 6.1), paired with a reply channel the issuing
/// collaborator awaits for the typed result.
pub struct PendingCommand {
    /// The command to apply.
    pub command: Command,
    /// Channel the result is sent back on. `None` if the issuer dropped
    /// its receiver (fire-and-forget callers may ignore the result).
    pub reply: Option<oneshot::Sender<CommandResult>>,
}

/// Shared operator control state.
///
/// This struct is wrapped in [`Arc`] and shared between the tick loop
/// and operator API handlers. Atomic fields are used for lock-free
/// reads on the tick loop hot path.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Notification used to wake the tick loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Queue of player commands awaiting application at the start of
    /// the next tick (spec.md 6.1, "the tick processor applies all
    /// queued commands at the start of the next tick").
    pending_commands: Mutex<Vec<PendingCommand>>,

    /// A world event queued for forced activation at the start of the
    /// next tick, overriding the roll-based scheduler for that tick
    /// (spec.md 6.5 operator event injection).
    pending_world_event: Mutex<Option<EventKind>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a new operator state from configuration.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            pending_commands: Mutex::new(Vec::new()),
            pending_world_event: Mutex::new(None),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The tick loop will sleep until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the tick loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the simulation is no longer paused.
    ///
    /// Returns immediately if not paused. Otherwise blocks until
    /// [`resume`](Self::resume) is called.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        self.end_reason.lock().await.clone()
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. Must be at least 100ms.
    ///
    /// Returns the previous interval on success, or `None` if the
    /// value was rejected (below 100ms).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < 100 {
            return None;
        }
        let prev = self.tick_interval_ms.swap(ms, Ordering::AcqRel);
        Some(prev)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Check whether the wall-clock time limit has been reached.
    ///
    /// Returns `true` if `max_real_time_seconds > 0` and the elapsed
    /// seconds since start exceed the limit.
    pub fn time_limit_reached(&self) -> bool {
        if self.max_real_time_seconds == 0 {
            return false;
        }
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        let elapsed_u64 = u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX);
        elapsed_u64 >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since simulation start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    // -----------------------------------------------------------------------
    // Player commands
    // -----------------------------------------------------------------------

    /// Queue `command` for application at the start of the next tick,
    /// returning a receiver the caller can await for the typed result.
    pub async fn enqueue_command(&self, command: Command) -> oneshot::Receiver<CommandResult> {
        let (tx, rx) = oneshot::channel();
        let mut queue = self.pending_commands.lock().await;
        queue.push(PendingCommand { command, reply: Some(tx) });
        rx
    }

    /// Drain every command queued since the last drain, in enqueue
    /// order, for the tick processor's phase-1 pass.
    pub async fn drain_commands(&self) -> Vec<PendingCommand> {
        let mut queue = self.pending_commands.lock().await;
        std::mem::take(&mut *queue)
    }

    // -----------------------------------------------------------------------
    // World-event override
    // -----------------------------------------------------------------------

    /// Queue `kind` to be forced active at the start of the next tick,
    /// replacing whatever the roll-based scheduler would have chosen.
    pub async fn queue_world_event(&self, kind: EventKind) {
        let mut slot = self.pending_world_event.lock().await;
        *slot = Some(kind);
    }

    /// Take the queued world-event override, if any, clearing it.
    pub async fn take_pending_world_event(&self) -> Option<EventKind> {
        let mut slot = self.pending_world_event.lock().await;
        slot.take()
    }
}

/// JSON-serializable status of the simulation for the operator API
/// (spec.md 6.5: tick, paused, tick interval, active world event, and
/// shift-cycle phase -- no agent-population fields, which don't exist
/// in this simulation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Current tick number.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// The currently active world event, if any.
    pub active_world_event: Option<EventKind>,
    /// Current shift-cycle phase.
    pub shift_phase: ShiftPhase,
    /// The reason the simulation ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
    /// ISO 8601 timestamp of when the simulation started.
    pub started_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use spheric_types::{BuildingKind, Direction, PlayerId, TileKey};

    fn default_bounds() -> SimulationBoundsConfig {
        SimulationBoundsConfig {
            max_ticks: 0,
            max_real_time_seconds: 0,
            end_condition: String::from("manual"),
        }
    }

    #[test]
    fn initial_state_is_not_paused() {
        let state = OperatorState::new(1000, &default_bounds());
        assert!(!state.is_paused());
        assert!(!state.is_stop_requested());
    }

    #[test]
    fn pause_and_resume() {
        let state = OperatorState::new(1000, &default_bounds());
        state.pause();
        assert!(state.is_paused());
        state.resume();
        assert!(!state.is_paused());
    }

    #[test]
    fn stop_request() {
        let state = OperatorState::new(1000, &default_bounds());
        assert!(!state.is_stop_requested());
        state.request_stop();
        assert!(state.is_stop_requested());
    }

    #[test]
    fn set_tick_interval() {
        let state = OperatorState::new(1000, &default_bounds());
        assert_eq!(state.tick_interval_ms(), 1000);
        let prev = state.set_tick_interval_ms(2000);
        assert_eq!(prev, Some(1000));
        assert_eq!(state.tick_interval_ms(), 2000);
    }

    #[test]
    fn reject_sub_100ms_interval() {
        let state = OperatorState::new(1000, &default_bounds());
        let result = state.set_tick_interval_ms(50);
        assert!(result.is_none());
        assert_eq!(state.tick_interval_ms(), 1000);
    }

    #[test]
    fn tick_limit_zero_means_unlimited() {
        let state = OperatorState::new(1000, &default_bounds());
        assert!(!state.tick_limit_reached(999_999));
    }

    #[test]
    fn tick_limit_reached() {
        let bounds = SimulationBoundsConfig {
            max_ticks: 100,
            max_real_time_seconds: 0,
            end_condition: String::from("time_limit"),
        };
        let state = OperatorState::new(1000, &bounds);
        assert!(!state.tick_limit_reached(99));
        assert!(state.tick_limit_reached(100));
        assert!(state.tick_limit_reached(101));
    }

    #[test]
    fn time_limit_zero_means_unlimited() {
        let state = OperatorState::new(1000, &default_bounds());
        assert!(!state.time_limit_reached());
    }

    #[tokio::test]
    async fn enqueue_and_drain_commands() {
        let state = OperatorState::new(1000, &default_bounds());
        let rx = state
            .enqueue_command(Command::Place {
                key: TileKey::new(0, 1, 1),
                kind: BuildingKind::Lamp,
                orientation: Direction::East,
                owner: PlayerId::new(),
            })
            .await;
        let mut drained = state.drain_commands().await;
        assert_eq!(drained.len(), 1);
        // After drain, queue is empty.
        assert!(state.drain_commands().await.is_empty());

        let pending = drained.remove(0);
        if let Some(reply) = pending.reply {
            let _ = reply.send(Ok(()));
        }
        assert_eq!(rx.await.expect("reply sent"), Ok(()));
    }

    #[tokio::test]
    async fn world_event_override_is_taken_once() {
        let state = OperatorState::new(1000, &default_bounds());
        assert!(state.take_pending_world_event().await.is_none());

        state.queue_world_event(EventKind::ResonanceCascade).await;
        assert_eq!(
            state.take_pending_world_event().await,
            Some(EventKind::ResonanceCascade)
        );
        assert!(state.take_pending_world_event().await.is_none());
    }
}
