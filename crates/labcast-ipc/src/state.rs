//! Broadcast session state machine types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The current state of a broadcast session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastState {
    /// No media acquired, nothing published.
    #[default]
    Idle,

    /// Camera and microphone are bound to the preview surface.
    Previewing,

    /// The publish handshake is in flight.
    Connecting,

    /// Media is flowing to the ingest origin.
    Live,
}

impl BroadcastState {
    /// Returns true if the session is idle.
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if the session is previewing local media.
    pub fn is_previewing(self) -> bool {
        matches!(self, Self::Previewing)
    }

    /// Returns true if the publish handshake is in flight.
    pub fn is_connecting(self) -> bool {
        matches!(self, Self::Connecting)
    }

    /// Returns true if the session is live.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Previewing => "previewing",
            Self::Connecting => "connecting",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for BroadcastState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Steps of the publish handshake, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectPhase {
    /// Constructing the peer connection.
    CreatePeer,

    /// Binding local tracks to outbound senders.
    AttachTracks,

    /// Creating and applying the local offer.
    CreateOffer,

    /// Posting the offer to the ingest origin.
    Publish,

    /// Applying the remote answer.
    ApplyAnswer,
}

impl ConnectPhase {
    /// The first phase of every attempt.
    pub const FIRST: Self = Self::CreatePeer;

    /// Returns the next phase, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::CreatePeer => Some(Self::AttachTracks),
            Self::AttachTracks => Some(Self::CreateOffer),
            Self::CreateOffer => Some(Self::Publish),
            Self::Publish => Some(Self::ApplyAnswer),
            Self::ApplyAnswer => None,
        }
    }

    /// Returns the display name for this phase.
    pub fn name(self) -> &'static str {
        match self {
            Self::CreatePeer => "Creating connection",
            Self::AttachTracks => "Attaching tracks",
            Self::CreateOffer => "Creating offer",
            Self::Publish => "Contacting ingest server",
            Self::ApplyAnswer => "Applying answer",
        }
    }
}
