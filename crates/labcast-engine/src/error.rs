//! Session error types and their user-facing notifications.

use thiserror::Error;

use labcast_capture::CaptureError;
use labcast_ipc::{BroadcastState, Notification};
use labcast_transport::{PublishError, TransportError};

/// Errors returned by broadcast session operations.
///
/// Every variant is recoverable; none leaves the session holding a
/// half-built connection.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Camera/microphone could not be acquired.
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The publish handshake failed; the session is back to previewing.
    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),

    /// The outbound video track could not be swapped after a camera switch.
    #[error("Camera switch failed: {0}")]
    TrackReplace(#[source] TransportError),

    /// The operation does not apply in the current state.
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was refused.
        operation: &'static str,

        /// State at the time of the call.
        state: BroadcastState,
    },

    /// Going live requires a local stream.
    #[error("No local media stream")]
    NoMediaStream,
}

impl SessionError {
    /// Returns true if the caller invoked an operation out of order.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Titled, described message distinguishing the failure category.
    pub fn notification(&self) -> Notification {
        match self {
            Self::Capture(CaptureError::PermissionDenied) => Notification::destructive(
                "Camera access denied",
                "Please allow camera and microphone access in your device settings.",
            ),
            Self::Capture(CaptureError::DeviceNotFound) => Notification::destructive(
                "No camera found",
                "Please connect a camera or check your device settings.",
            ),
            Self::Capture(CaptureError::Device(message)) => {
                Notification::destructive("Failed to access camera", message.clone())
            }
            Self::Publish(err) => Notification::destructive("Failed to go live", err.to_string()),
            Self::TrackReplace(err) => {
                Notification::destructive("Failed to switch camera", err.to_string())
            }
            Self::InvalidState { .. } => {
                Notification::destructive("Action unavailable", self.to_string())
            }
            Self::NoMediaStream => Notification::destructive(
                "Camera not ready",
                "Enable your camera before going live.",
            ),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
