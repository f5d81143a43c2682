//! Error types for the transport module.

use thiserror::Error;

/// Errors raised by the peer connection or endpoint setup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The peer connection could not be constructed.
    #[error("Peer connection failed: {0}")]
    PeerConnection(String),

    /// Offer/answer creation or application failed.
    #[error("Negotiation failed: {0}")]
    Negotiation(String),

    /// A sender refused the replacement track.
    #[error("Track replacement failed: {0}")]
    TrackReplace(String),

    /// The operation was attempted on a closed connection.
    #[error("Peer connection closed")]
    Closed,

    /// The ingest endpoint URL is unusable.
    #[error("Invalid ingest endpoint: {0}")]
    InvalidEndpoint(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Errors from the offer/answer exchange with the ingest origin.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Local negotiation failed before or after the HTTP exchange.
    #[error(transparent)]
    Negotiation(#[from] TransportError),

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The ingest origin answered with a non-2xx status.
    #[error("WHIP error ({status}): {detail}")]
    Rejected {
        /// HTTP status code.
        status: u16,

        /// Response body text.
        detail: String,
    },

    /// The 2xx body was not a session description.
    #[error("Malformed answer from ingest server: {0}")]
    MalformedAnswer(String),
}

impl PublishError {
    /// HTTP status, if the ingest origin responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
