//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds one broadcast channel per face (spec.md 6.2: "30
//! per-face bounded channels") plus an in-process [`WorldSummary`]
//! projection that REST reads are served from. The durable hot state
//! lives in Dragonfly (`spheric_db::dragonfly`); this crate never reads
//! it directly so a process restart resubscribes cleanly without this
//! crate depending on the data layer.

use std::sync::Arc;

use spheric_core::operator::OperatorState;
use spheric_types::{ChangeSet, EventKind, ShiftPhase, FACE_COUNT};
use tokio::sync::{broadcast, RwLock};

/// Capacity of each face's broadcast channel.
///
/// If a subscriber falls behind by more than this many change-sets it
/// receives a [`broadcast::error::RecvError::Lagged`] and skips ahead
/// to the newest one (spec.md 9 design note on bounded channels).
const BROADCAST_CAPACITY: usize = 64;

/// One face's broadcast channel plus the most recently published
/// change-set, so a client that connects mid-tick can fetch a starting
/// point before subscribing.
struct FaceChannel {
    tx: broadcast::Sender<ChangeSet>,
    latest: RwLock<Option<ChangeSet>>,
}

impl FaceChannel {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            latest: RwLock::new(None),
        }
    }
}

/// In-process projection of the world's tick-level status, updated
/// once per tick by the engine's observer-callback bridge.
#[derive(Debug, Clone, Default)]
pub struct WorldSummary {
    /// The most recently completed tick.
    pub tick: u64,
    /// The world event currently active, if any.
    pub active_event: Option<EventKind>,
    /// The current shift-cycle phase.
    pub shift_phase: Option<ShiftPhase>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Each
/// face has its own broadcast channel so a client subscribing to one
/// face never pays for change-sets on the other 29.
pub struct AppState {
    faces: Vec<FaceChannel>,
    summary: RwLock<WorldSummary>,
    /// Shared operator control state (present when the simulation is running).
    pub operator_state: Option<Arc<OperatorState>>,
}

impl AppState {
    /// Create a new application state with no operator attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            faces: (0..FACE_COUNT).map(|_| FaceChannel::new()).collect(),
            summary: RwLock::new(WorldSummary::default()),
            operator_state: None,
        }
    }

    /// Create a new application state with operator control state attached.
    #[must_use]
    pub fn with_operator(operator: Arc<OperatorState>) -> Self {
        Self {
            faces: (0..FACE_COUNT).map(|_| FaceChannel::new()).collect(),
            summary: RwLock::new(WorldSummary::default()),
            operator_state: Some(operator),
        }
    }

    /// Subscribe to a single face's change-set stream.
    ///
    /// Returns `None` if `face` is not a valid face index (`0..30`).
    #[must_use]
    pub fn subscribe_face(&self, face: u8) -> Option<broadcast::Receiver<ChangeSet>> {
        self.faces
            .get(usize::from(face))
            .map(|channel| channel.tx.subscribe())
    }

    /// Publish a tick's change-set to its face's subscribers.
    ///
    /// Does nothing if `changeset.face` is out of range; that indicates
    /// a bug in the caller rather than a client-facing condition.
    pub async fn publish_changeset(&self, changeset: ChangeSet) {
        let Some(channel) = self.faces.get(usize::from(changeset.face)) else {
            tracing::error!(face = changeset.face, "change-set for out-of-range face");
            return;
        };

        *channel.latest.write().await = Some(changeset.clone());
        // send returns Err only when there are zero receivers, which is
        // normal when no client is subscribed to this face.
        let _ = channel.tx.send(changeset);
    }

    /// The most recently published change-set for `face`, if any has
    /// been published since startup.
    pub async fn latest_changeset(&self, face: u8) -> Option<ChangeSet> {
        let channel = self.faces.get(usize::from(face))?;
        channel.latest.read().await.clone()
    }

    /// Update the in-process world summary after a tick completes.
    pub async fn update_summary(
        &self,
        tick: u64,
        active_event: Option<EventKind>,
        shift_phase: ShiftPhase,
    ) {
        let mut summary = self.summary.write().await;
        summary.tick = tick;
        summary.active_event = active_event;
        summary.shift_phase = Some(shift_phase);
    }

    /// A copy of the current world summary.
    pub async fn summary(&self) -> WorldSummary {
        self.summary.read().await.clone()
    }

    /// Publish a change-set without awaiting, for callers on the tick
    /// thread that cannot yield. If a REST handler currently holds the
    /// latest-changeset lock, the broadcast still goes out but the
    /// cached copy only catches up on the next publish.
    pub fn try_publish_changeset(&self, changeset: ChangeSet) {
        let Some(channel) = self.faces.get(usize::from(changeset.face)) else {
            tracing::error!(face = changeset.face, "change-set for out-of-range face");
            return;
        };

        if let Ok(mut latest) = channel.latest.try_write() {
            *latest = Some(changeset.clone());
        }
        let _ = channel.tx.send(changeset);
    }

    /// Update the in-process world summary without awaiting. Skips the
    /// update (rather than blocking) if a reader currently holds the
    /// lock; the next tick's update catches up.
    pub fn try_update_summary(&self, tick: u64, active_event: Option<EventKind>, shift_phase: ShiftPhase) {
        if let Ok(mut summary) = self.summary.try_write() {
            summary.tick = tick;
            summary.active_event = active_event;
            summary.shift_phase = Some(shift_phase);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_only_its_own_face() {
        let state = AppState::new();
        let mut face_0 = state.subscribe_face(0).expect("face 0 exists");
        let mut face_1 = state.subscribe_face(1).expect("face 1 exists");

        state.publish_changeset(ChangeSet::empty(1, 0)).await;

        let received = face_0.try_recv().expect("face 0 sees its change-set");
        assert_eq!(received.face, 0);
        assert!(face_1.try_recv().is_err());
    }

    #[tokio::test]
    async fn latest_changeset_survives_no_subscribers() {
        let state = AppState::new();
        state.publish_changeset(ChangeSet::empty(5, 3)).await;

        let latest = state.latest_changeset(3).await.expect("published");
        assert_eq!(latest.tick, 5);
    }

    #[test]
    fn subscribe_face_rejects_out_of_range() {
        let state = AppState::new();
        assert!(state.subscribe_face(30).is_none());
        assert!(state.subscribe_face(29).is_some());
    }

    #[tokio::test]
    async fn summary_reflects_last_update() {
        let state = AppState::new();
        state
            .update_summary(7, Some(EventKind::HissSurge), ShiftPhase::Dusk)
            .await;

        let summary = state.summary().await;
        assert_eq!(summary.tick, 7);
        assert_eq!(summary.active_event, Some(EventKind::HissSurge));
        assert_eq!(summary.shift_phase, Some(ShiftPhase::Dusk));
    }

    #[tokio::test]
    async fn try_publish_changeset_reaches_subscribers_and_cache() {
        let state = AppState::new();
        let mut face_2 = state.subscribe_face(2).expect("face 2 exists");

        state.try_publish_changeset(ChangeSet::empty(9, 2));

        let received = face_2.try_recv().expect("face 2 sees its change-set");
        assert_eq!(received.tick, 9);
        let latest = state.latest_changeset(2).await.expect("cached");
        assert_eq!(latest.tick, 9);
    }

    #[test]
    fn try_update_summary_is_visible_without_awaiting() {
        let state = AppState::new();
        state.try_update_summary(3, Some(EventKind::MeteorShower), ShiftPhase::Zenith);

        let summary = state.summary.try_read().expect("uncontended");
        assert_eq!(summary.tick, 3);
        assert_eq!(summary.active_event, Some(EventKind::MeteorShower));
        assert_eq!(summary.shift_phase, Some(ShiftPhase::Zenith));
    }
}
