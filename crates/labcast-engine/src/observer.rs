//! Caller-facing session callbacks.

use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::RwLock;
use tracing::warn;

use labcast_ipc::{BroadcastState, ConnectPhase, FacingMode, Notification, SessionEvent, TrackKind};

/// Receives everything a broadcast session reports.
///
/// `on_live` fires once per successful go-live, `on_stop` once per stop
/// (including teardown); neither fires during a failed attempt's rollback.
/// All methods default to no-ops.
pub trait SessionObserver: Send + Sync {
    fn on_state_changed(&self, _previous: BroadcastState, _current: BroadcastState) {}

    fn on_connect_phase(&self, _phase: ConnectPhase) {}

    fn on_live(&self) {}

    fn on_stop(&self) {}

    fn on_track_toggled(&self, _kind: TrackKind, _enabled: bool) {}

    fn on_facing_mode_changed(&self, _facing: FacingMode) {}

    fn on_notification(&self, _notification: &Notification) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Forwards session callbacks to the UI event channel.
pub struct ChannelObserver {
    event_tx: Sender<SessionEvent>,
    state: Arc<RwLock<BroadcastState>>,
}

impl ChannelObserver {
    /// Create an observer that also mirrors the state into `state`.
    pub fn new(event_tx: Sender<SessionEvent>, state: Arc<RwLock<BroadcastState>>) -> Self {
        Self { event_tx, state }
    }

    fn send(&self, event: SessionEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

impl SessionObserver for ChannelObserver {
    fn on_state_changed(&self, previous: BroadcastState, current: BroadcastState) {
        *self.state.write() = current;
        self.send(SessionEvent::StateChanged { previous, current });
    }

    fn on_connect_phase(&self, phase: ConnectPhase) {
        self.send(SessionEvent::ConnectProgress { phase });
    }

    fn on_live(&self) {
        self.send(SessionEvent::Live);
    }

    fn on_stop(&self) {
        self.send(SessionEvent::Stopped);
    }

    fn on_track_toggled(&self, kind: TrackKind, enabled: bool) {
        self.send(SessionEvent::TrackToggled { kind, enabled });
    }

    fn on_facing_mode_changed(&self, facing: FacingMode) {
        self.send(SessionEvent::FacingModeChanged(facing));
    }

    fn on_notification(&self, notification: &Notification) {
        self.send(SessionEvent::Notification(notification.clone()));
    }
}
