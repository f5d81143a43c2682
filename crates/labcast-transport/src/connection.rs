//! Peer connection configuration and state.

use serde::{Deserialize, Serialize};

/// Public STUN relay used when nothing else is configured.
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

/// Connection state of an outbound peer connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerConnectionState {
    /// Constructed, nothing negotiated.
    #[default]
    New,

    /// ICE/DTLS in progress.
    Connecting,

    /// Media is flowing.
    Connected,

    /// Transport lost, may recover.
    Disconnected,

    /// Transport failed permanently.
    Failed,

    /// Closed locally.
    Closed,
}

impl PeerConnectionState {
    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A STUN/TURN server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs, e.g. `stun:host:port`.
    pub urls: Vec<String>,
}

impl IceServer {
    /// Server reachable at a single URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
        }
    }
}

/// Configuration for constructing a peer connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcConfiguration {
    /// NAT traversal servers. No TURN relay is configured by default.
    pub ice_servers: Vec<IceServer>,
}

impl RtcConfiguration {
    /// Configuration with one server per URL.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ice_servers: urls.into_iter().map(IceServer::new).collect(),
        }
    }
}

impl Default for RtcConfiguration {
    fn default() -> Self {
        Self::from_urls([DEFAULT_STUN_SERVER])
    }
}
