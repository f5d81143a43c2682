//! Ownership of the session's device and transport handles.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use labcast_capture::LocalMediaStream;
use labcast_transport::PeerConnection;

/// Handles owned by one broadcast session.
///
/// Holds at most one local stream and one peer connection. Installing a
/// replacement releases the previous instance first, and teardown always
/// closes the connection before stopping tracks so the transport never
/// references a stopped track.
#[derive(Default)]
pub struct SessionResources {
    /// Camera + microphone stream bound to the preview.
    stream: Option<LocalMediaStream>,

    /// Outbound connection, present while connecting or live.
    peer: Option<Arc<dyn PeerConnection>>,
}

impl SessionResources {
    /// Create empty resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current local stream.
    pub fn stream(&self) -> Option<&LocalMediaStream> {
        self.stream.as_ref()
    }

    /// The current peer connection.
    pub fn peer(&self) -> Option<&Arc<dyn PeerConnection>> {
        self.peer.as_ref()
    }

    /// Store a freshly acquired stream.
    pub fn install_stream(&mut self, stream: LocalMediaStream) {
        if let Some(previous) = self.stream.replace(stream) {
            warn!(stream = %previous.id(), "Replacing a stream that was not released");
            previous.stop_all();
        }
    }

    /// Store a freshly constructed connection.
    pub fn install_peer(&mut self, peer: Arc<dyn PeerConnection>) {
        if let Some(previous) = self.peer.replace(peer) {
            warn!("Replacing a peer connection that was not closed");
            previous.close();
        }
    }

    /// Stop every track of the current stream. Returns false if none was held.
    pub fn release_stream(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                stream.stop_all();
                debug!(stream = %stream.id(), "Stream released");
                true
            }
            None => false,
        }
    }

    /// Close the current connection. Returns false if none was held.
    pub fn release_peer(&mut self) -> bool {
        match self.peer.take() {
            Some(peer) => {
                peer.close();
                debug!("Peer connection closed");
                true
            }
            None => false,
        }
    }

    /// Release everything: connection first, then tracks.
    #[instrument(name = "release_resources", skip(self))]
    pub fn release_all(&mut self) {
        let closed_peer = self.release_peer();
        let stopped_stream = self.release_stream();
        if closed_peer || stopped_stream {
            info!(closed_peer, stopped_stream, "Session resources released");
        }
    }

    /// Returns true if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.stream.is_none() && self.peer.is_none()
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        self.release_all();
    }
}
