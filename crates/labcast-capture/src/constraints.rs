//! Capture constraints passed to the provider.

use serde::{Deserialize, Serialize};

use labcast_ipc::FacingMode;

/// Default ideal capture width.
pub const DEFAULT_IDEAL_WIDTH: u32 = 1280;

/// Default ideal capture height.
pub const DEFAULT_IDEAL_HEIGHT: u32 = 720;

/// Capture settings from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Ideal video width; providers may pick the closest supported size.
    pub ideal_width: u32,

    /// Ideal video height.
    pub ideal_height: u32,

    /// Whether to capture the microphone.
    pub audio: bool,

    /// Camera requested on the first preview.
    pub initial_facing_mode: FacingMode,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ideal_width: DEFAULT_IDEAL_WIDTH,
            ideal_height: DEFAULT_IDEAL_HEIGHT,
            audio: true,
            initial_facing_mode: FacingMode::User,
        }
    }
}

impl CaptureConfig {
    /// Build the constraints for one capture request.
    pub fn constraints(&self, facing_mode: FacingMode) -> MediaConstraints {
        MediaConstraints {
            video: VideoConstraints {
                facing_mode,
                ideal_width: self.ideal_width,
                ideal_height: self.ideal_height,
            },
            audio: self.audio,
        }
    }
}

/// Video part of a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    /// Requested camera.
    pub facing_mode: FacingMode,

    /// Ideal width in pixels.
    pub ideal_width: u32,

    /// Ideal height in pixels.
    pub ideal_height: u32,
}

/// A camera + microphone capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    /// Video constraints.
    pub video: VideoConstraints,

    /// Whether to include a microphone track.
    pub audio: bool,
}

impl MediaConstraints {
    /// Default request for the given camera.
    pub fn for_facing(facing_mode: FacingMode) -> Self {
        CaptureConfig::default().constraints(facing_mode)
    }
}
