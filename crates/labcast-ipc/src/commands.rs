//! Commands sent from the UI to the engine.

use serde::{Deserialize, Serialize};

use crate::types::FacingMode;

/// Commands that the UI can send to the engine.
///
/// These map one-to-one onto the transport controls a broadcast view renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Acquire camera and microphone and bind them to the preview surface.
    StartPreview {
        /// Facing mode to request; the session's current one when absent.
        facing: Option<FacingMode>,
    },

    /// Flip between the front and rear camera.
    SwitchCamera,

    /// Negotiate the peer connection and publish to the ingest origin.
    GoLive,

    /// End the broadcast and release every device and connection.
    StopBroadcast,

    /// Mute or unmute the local video track.
    ToggleVideo,

    /// Mute or unmute the local audio track.
    ToggleAudio,

    /// Request the current session state.
    GetState,

    /// Tear the session down and stop the engine.
    Shutdown,
}
