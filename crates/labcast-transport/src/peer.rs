//! Outbound peer connection seam.
//!
//! The real-time media stack (ICE, DTLS, RTP) is platform-provided; the
//! session only needs the handful of operations below.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use labcast_capture::TrackHandle;
use labcast_ipc::TrackKind;

use crate::connection::{PeerConnectionState, RtcConfiguration};
use crate::TransportResult;

/// Role of a session description in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    /// Local proposal.
    Offer,

    /// Remote acceptance.
    Answer,
}

/// A typed SDP blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// Offer or answer.
    pub sdp_type: SdpType,

    /// Raw SDP text.
    pub sdp: String,
}

impl SessionDescription {
    /// Wrap an offer.
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    /// Wrap an answer.
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Binds one local track to the outbound connection.
#[async_trait]
pub trait RtpSender: Send + Sync + fmt::Debug {
    /// Track currently being sent, if any.
    fn track(&self) -> Option<TrackHandle>;

    /// Swap the outgoing track in place without renegotiating.
    ///
    /// On error the previous track stays attached.
    async fn replace_track(&self, track: Option<TrackHandle>) -> TransportResult<()>;

    /// Kind of the attached track.
    fn kind(&self) -> Option<TrackKind> {
        self.track().map(|track| track.kind())
    }
}

/// A publish-only real-time connection to the ingest origin.
#[async_trait]
pub trait PeerConnection: Send + Sync + fmt::Debug {
    /// Add `track` as a new outbound sender, grouped under `stream_id`.
    fn add_track(&self, track: TrackHandle, stream_id: &str) -> TransportResult<Arc<dyn RtpSender>>;

    /// Create a local offer covering every added track.
    async fn create_offer(&self) -> TransportResult<SessionDescription>;

    /// Apply the local description.
    async fn set_local_description(&self, description: SessionDescription) -> TransportResult<()>;

    /// Apply the remote description.
    async fn set_remote_description(&self, description: SessionDescription)
        -> TransportResult<()>;

    /// Current senders, in the order tracks were added.
    fn senders(&self) -> Vec<Arc<dyn RtpSender>>;

    /// Close the connection. Safe to call more than once.
    fn close(&self);

    /// Current connection state.
    fn connection_state(&self) -> PeerConnectionState;

    /// First sender currently carrying a track of `kind`.
    fn sender_for(&self, kind: TrackKind) -> Option<Arc<dyn RtpSender>> {
        self.senders()
            .into_iter()
            .find(|sender| sender.kind() == Some(kind))
    }
}

/// Constructs peer connections.
pub trait PeerConnectionFactory: Send + Sync {
    /// Build a new, un-negotiated connection.
    fn create(&self, config: &RtcConfiguration) -> TransportResult<Arc<dyn PeerConnection>>;
}
