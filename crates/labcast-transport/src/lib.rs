//! Peer connection seam and WHIP publish client.
//!
//! This crate provides the transport half of a browser-style broadcast:
//! the outbound peer connection abstraction and the HTTP offer/answer
//! exchange with a live-ingest origin.

mod connection;
mod error;
mod peer;
mod whip;

pub use connection::{IceServer, PeerConnectionState, RtcConfiguration, DEFAULT_STUN_SERVER};
pub use error::{PublishError, TransportError};
pub use peer::{PeerConnection, PeerConnectionFactory, RtpSender, SdpType, SessionDescription};
pub use whip::{
    validate_answer, IngestConfig, IngestPublisher, PublishAnswer, WhipClient,
    DEFAULT_INGEST_BASE_URL, DEFAULT_WHIP_PATH, SDP_CONTENT_TYPE,
};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
