//! Camera and microphone capture for the labcast broadcast client.
//!
//! The platform capture API is reached through [`MediaCaptureProvider`];
//! this crate defines the request, the resulting stream and its tracks.

mod constraints;
mod error;
mod preview;
mod stream;

pub use constraints::{
    CaptureConfig, MediaConstraints, VideoConstraints, DEFAULT_IDEAL_HEIGHT, DEFAULT_IDEAL_WIDTH,
};
pub use error::CaptureError;
pub use preview::{NullPreview, PreviewSurface};
pub use stream::{LocalMediaStream, LocalTrack, MediaTrack, TrackHandle, TrackState};

use async_trait::async_trait;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Platform camera + microphone API.
#[async_trait]
pub trait MediaCaptureProvider: Send + Sync {
    /// Acquire a stream matching `constraints`.
    ///
    /// Fails with [`CaptureError::PermissionDenied`] when access is refused,
    /// [`CaptureError::DeviceNotFound`] when no device matches, and
    /// [`CaptureError::Device`] for anything else.
    async fn get_user_media(&self, constraints: &MediaConstraints)
        -> CaptureResult<LocalMediaStream>;
}
