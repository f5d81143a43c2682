//! Error types for the capture module.

use thiserror::Error;

/// Errors a media capture provider can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The user or platform refused camera/microphone access.
    #[error("Permission denied for camera or microphone")]
    PermissionDenied,

    /// No device matched the requested constraints.
    #[error("No capture device found")]
    DeviceNotFound,

    /// Any other device failure; the provider's message is passed through.
    #[error("{0}")]
    Device(String),
}
