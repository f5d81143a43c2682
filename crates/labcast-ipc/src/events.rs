//! Events sent from the engine to the UI.

use serde::{Deserialize, Serialize};

use crate::state::{BroadcastState, ConnectPhase};
use crate::types::{FacingMode, Notification, TrackKind};

/// Events that the engine can send to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Engine is ready to accept commands.
    Ready,

    /// Session state has changed.
    StateChanged {
        /// Previous state.
        previous: BroadcastState,

        /// Current state.
        current: BroadcastState,
    },

    /// A step of the publish handshake has started.
    ConnectProgress {
        /// Phase being entered.
        phase: ConnectPhase,
    },

    /// The ingest origin accepted the broadcast.
    Live,

    /// The broadcast was stopped and all resources released.
    Stopped,

    /// A local track was muted or unmuted.
    TrackToggled {
        /// Kind of the toggled track.
        kind: TrackKind,

        /// Whether the track is now enabled.
        enabled: bool,
    },

    /// The requested camera facing mode changed.
    FacingModeChanged(FacingMode),

    /// User-visible notification (success or failure).
    Notification(Notification),

    /// Engine has shut down.
    Shutdown,
}
