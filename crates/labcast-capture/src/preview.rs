//! Preview surface binding.

use crate::stream::LocalMediaStream;

/// Where the local camera preview is rendered.
///
/// The session binds at most one stream at a time and detaches on teardown.
/// `detach` must tolerate being called with nothing attached.
pub trait PreviewSurface: Send + Sync {
    /// Render `stream` on the surface, replacing whatever was shown.
    fn attach(&self, stream: &LocalMediaStream);

    /// Clear the surface.
    fn detach(&self);
}

/// Surface that renders nothing, for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPreview;

impl PreviewSurface for NullPreview {
    fn attach(&self, _stream: &LocalMediaStream) {}

    fn detach(&self) {}
}
