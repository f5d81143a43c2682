//! Local media tracks and streams.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use labcast_ipc::TrackKind;

/// Whether a track still holds its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    /// Producing media (possibly muted).
    Live,

    /// Stopped; the device has been released.
    Ended,
}

/// A single captured media track.
///
/// `set_enabled(false)` mutes the track in place: it keeps flowing to any
/// sender it is bound to and the device stays acquired. `stop` releases the
/// device and must be safe to call more than once.
pub trait MediaTrack: Send + Sync + fmt::Debug {
    /// Provider-assigned identifier, unique per track.
    fn id(&self) -> &str;

    /// Video or audio.
    fn kind(&self) -> TrackKind;

    /// Whether the track is currently unmuted.
    fn is_enabled(&self) -> bool;

    /// Mute or unmute without releasing the device.
    fn set_enabled(&self, enabled: bool);

    /// Release the underlying device.
    fn stop(&self);

    /// Whether the track is live or ended.
    fn ready_state(&self) -> TrackState;

    /// Returns true if the track has not been stopped.
    fn is_live(&self) -> bool {
        self.ready_state() == TrackState::Live
    }
}

/// Shared handle to a track; a stream and a sender may both reference it.
pub type TrackHandle = Arc<dyn MediaTrack>;

type StopHook = Box<dyn FnOnce() + Send>;

/// General-purpose track backed by atomics.
///
/// Providers attach a stop hook that releases the device handle; the hook
/// runs exactly once, on the first `stop`.
pub struct LocalTrack {
    id: String,
    kind: TrackKind,
    label: String,
    enabled: AtomicBool,
    ended: AtomicBool,
    on_stop: Mutex<Option<StopHook>>,
}

impl LocalTrack {
    /// Create a live, enabled track.
    pub fn new(id: impl Into<String>, kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            enabled: AtomicBool::new(true),
            ended: AtomicBool::new(false),
            on_stop: Mutex::new(None),
        }
    }

    /// Run `hook` when the track is first stopped.
    pub fn with_stop_hook(self, hook: impl FnOnce() + Send + 'static) -> Self {
        *self.on_stop.lock() = Some(Box::new(hook));
        self
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> TrackHandle {
        Arc::new(self)
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("enabled", &self.is_enabled())
            .field("state", &self.ready_state())
            .finish()
    }
}

impl MediaTrack for LocalTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn stop(&self) {
        if self.ended.swap(true, Ordering::SeqCst) {
            trace!(track = %self.id, "Track already stopped");
            return;
        }
        if let Some(hook) = self.on_stop.lock().take() {
            hook();
        }
        debug!(track = %self.id, kind = %self.kind, "Track stopped");
    }

    fn ready_state(&self) -> TrackState {
        if self.ended.load(Ordering::SeqCst) {
            TrackState::Ended
        } else {
            TrackState::Live
        }
    }
}

/// Media acquired from a capture provider in one request.
#[derive(Debug, Clone)]
pub struct LocalMediaStream {
    id: String,
    tracks: Vec<TrackHandle>,
}

impl LocalMediaStream {
    /// Create a stream from its tracks, in provider order.
    pub fn new(id: impl Into<String>, tracks: Vec<TrackHandle>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    /// Stream identifier, used to group senders on the connection.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All tracks, in provider order.
    pub fn tracks(&self) -> &[TrackHandle] {
        &self.tracks
    }

    /// First track of the given kind.
    pub fn first_track(&self, kind: TrackKind) -> Option<&TrackHandle> {
        self.tracks.iter().find(|track| track.kind() == kind)
    }

    /// Video tracks, in provider order.
    pub fn video_tracks(&self) -> impl Iterator<Item = &TrackHandle> {
        self.tracks_of(TrackKind::Video)
    }

    /// Audio tracks, in provider order.
    pub fn audio_tracks(&self) -> impl Iterator<Item = &TrackHandle> {
        self.tracks_of(TrackKind::Audio)
    }

    fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &TrackHandle> {
        self.tracks.iter().filter(move |track| track.kind() == kind)
    }

    /// Returns true if any track still holds its device.
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|track| track.is_live())
    }

    /// Stop every track.
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
        debug!(stream = %self.id, tracks = self.tracks.len(), "Stream stopped");
    }
}
