//! Broadcast session state machine.
//!
//! ```text
//! idle ──start_preview──▶ previewing ──go_live──▶ connecting ──▶ live
//!   ▲                        │   ▲                    │            │
//!   └──────stop_broadcast────┘   └──────failure───────┘            │
//!   ▲                                                              │
//!   └───────────────────────stop_broadcast─────────────────────────┘
//! ```
//!
//! Acquisition order is capture, then connection, then publish. Teardown
//! closes the connection before stopping tracks.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use labcast_capture::{
    CaptureConfig, LocalMediaStream, MediaCaptureProvider, NullPreview, PreviewSurface,
};
use labcast_ipc::{BroadcastState, ConnectPhase, FacingMode, Notification, StreamKey, TrackKind};
use labcast_transport::{
    IngestPublisher, PeerConnection, PeerConnectionFactory, PublishError, RtcConfiguration,
};

use crate::config::BroadcastConfig;
use crate::error::{SessionError, SessionResult};
use crate::observer::SessionObserver;
use crate::state::SessionResources;

/// External collaborators a session talks to.
#[derive(Clone)]
pub struct SessionDeps {
    /// Camera + microphone API.
    pub capture: Arc<dyn MediaCaptureProvider>,

    /// Builds outbound peer connections.
    pub peers: Arc<dyn PeerConnectionFactory>,

    /// Performs the offer/answer exchange with the ingest origin.
    pub publisher: Arc<dyn IngestPublisher>,

    /// Where the camera preview is rendered.
    pub preview: Arc<dyn PreviewSurface>,
}

impl SessionDeps {
    /// Collaborators with a headless preview.
    pub fn new(
        capture: Arc<dyn MediaCaptureProvider>,
        peers: Arc<dyn PeerConnectionFactory>,
        publisher: Arc<dyn IngestPublisher>,
    ) -> Self {
        Self {
            capture,
            peers,
            publisher,
            preview: Arc::new(NullPreview),
        }
    }

    /// Render the preview on `preview`.
    pub fn with_preview(mut self, preview: Arc<dyn PreviewSurface>) -> Self {
        self.preview = preview;
        self
    }
}

/// One broadcast attempt: local media, one outbound connection, one publish.
pub struct BroadcastSession {
    stream_key: StreamKey,
    deps: SessionDeps,
    observer: Arc<dyn SessionObserver>,
    capture_config: CaptureConfig,
    rtc_config: RtcConfiguration,
    resources: SessionResources,
    state: BroadcastState,
    facing_mode: FacingMode,
    video_enabled: bool,
    audio_enabled: bool,
    disposed: bool,
}

impl BroadcastSession {
    /// Create an idle session publishing under `stream_key`.
    pub fn new(
        stream_key: StreamKey,
        deps: SessionDeps,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let capture_config = CaptureConfig::default();
        Self {
            stream_key,
            deps,
            observer,
            facing_mode: capture_config.initial_facing_mode,
            capture_config,
            rtc_config: RtcConfiguration::default(),
            resources: SessionResources::new(),
            state: BroadcastState::Idle,
            video_enabled: true,
            audio_enabled: true,
            disposed: false,
        }
    }

    /// Apply capture and ICE settings from configuration.
    pub fn with_config(mut self, config: &BroadcastConfig) -> Self {
        self.capture_config = config.capture.clone();
        self.facing_mode = config.capture.initial_facing_mode;
        self.rtc_config = config.rtc_configuration();
        self
    }

    /// Current state.
    pub fn state(&self) -> BroadcastState {
        self.state
    }

    /// Camera the next capture request will ask for.
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    /// Whether local video is unmuted.
    pub fn video_enabled(&self) -> bool {
        self.video_enabled
    }

    /// Whether local audio is unmuted.
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Publish credential (masked when printed).
    pub fn stream_key(&self) -> &StreamKey {
        &self.stream_key
    }

    /// The stream bound to the preview, if any.
    pub fn local_stream(&self) -> Option<&LocalMediaStream> {
        self.resources.stream()
    }

    /// The outbound connection, while connecting or live.
    pub fn peer_connection(&self) -> Option<&Arc<dyn PeerConnection>> {
        self.resources.peer()
    }

    /// Acquire camera + microphone and bind them to the preview.
    ///
    /// Any existing stream is stopped before the new request is made. On
    /// failure the session is left idle with no stream held.
    #[instrument(name = "start_preview", skip(self), fields(state = %self.state))]
    pub async fn start_preview(&mut self, facing: Option<FacingMode>) -> SessionResult<()> {
        self.recover_abandoned_attempt();
        if !(self.state.is_idle() || self.state.is_previewing()) {
            return Err(self.reject("start preview"));
        }

        let facing = facing.unwrap_or(self.facing_mode);
        if facing != self.facing_mode {
            self.facing_mode = facing;
            self.observer.on_facing_mode_changed(facing);
        }
        self.acquire_preview(facing).await
    }

    /// Flip the camera, re-acquiring the preview.
    ///
    /// While live, the outbound senders' tracks are replaced in place; the
    /// connection is not renegotiated. In idle only the preference flips.
    #[instrument(name = "switch_camera", skip(self), fields(state = %self.state))]
    pub async fn switch_camera(&mut self) -> SessionResult<()> {
        self.recover_abandoned_attempt();
        if self.state.is_connecting() {
            return Err(self.reject("switch camera"));
        }

        let facing = self.facing_mode.toggled();
        self.facing_mode = facing;
        self.observer.on_facing_mode_changed(facing);
        info!(%facing, "Switching camera");

        match self.state {
            BroadcastState::Idle | BroadcastState::Connecting => Ok(()),
            BroadcastState::Previewing => self.acquire_preview(facing).await,
            BroadcastState::Live => {
                self.acquire_preview(facing).await?;
                self.replace_outbound_tracks().await
            }
        }
    }

    /// Negotiate a connection and publish the current stream.
    ///
    /// On failure the nascent connection is closed and the session returns
    /// to previewing with its stream untouched, so the caller can retry
    /// without re-requesting device access.
    #[instrument(name = "go_live", skip(self), fields(stream_key = %self.stream_key))]
    pub async fn go_live(&mut self) -> SessionResult<()> {
        self.recover_abandoned_attempt();
        if !self.state.is_previewing() {
            return Err(self.reject("go live"));
        }
        let Some(stream) = self.resources.stream().cloned() else {
            return Err(self.fail(SessionError::NoMediaStream));
        };

        info!("Going live");
        self.transition_to(BroadcastState::Connecting);

        match self.negotiate(&stream).await {
            Ok(()) => {
                self.transition_to(BroadcastState::Live);
                self.observer.on_live();
                self.observer.on_notification(&Notification::info(
                    "You're live!",
                    "Your stream is now broadcasting.",
                ));
                info!("Broadcast is live");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Go live failed");
                self.resources.release_peer();
                self.transition_to(BroadcastState::Previewing);
                Err(self.fail(SessionError::Publish(e)))
            }
        }
    }

    /// Close the connection, stop every track and detach the preview.
    ///
    /// Never fails; calling it with nothing active is fine. `on_stop` fires
    /// on every call.
    #[instrument(name = "stop_broadcast", skip(self), fields(state = %self.state))]
    pub fn stop_broadcast(&mut self) {
        info!("Stopping broadcast");

        self.resources.release_all();
        self.deps.preview.detach();
        self.video_enabled = true;
        self.audio_enabled = true;

        self.transition_to(BroadcastState::Idle);
        self.observer.on_stop();
    }

    /// Mute or unmute the first video track. Returns the new flag, or `None`
    /// if there is no video track.
    pub fn toggle_video(&mut self) -> Option<bool> {
        self.toggle_track(TrackKind::Video)
    }

    /// Mute or unmute the first audio track. Returns the new flag, or `None`
    /// if there is no audio track.
    pub fn toggle_audio(&mut self) -> Option<bool> {
        self.toggle_track(TrackKind::Audio)
    }

    /// Tear the session down. Equivalent to dropping it.
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        debug!("Disposing broadcast session");
        self.stop_broadcast();
        self.disposed = true;
    }

    async fn acquire_preview(&mut self, facing: FacingMode) -> SessionResult<()> {
        self.resources.release_stream();

        let constraints = self.capture_config.constraints(facing);
        match self.deps.capture.get_user_media(&constraints).await {
            Ok(stream) => {
                info!(
                    stream = %stream.id(),
                    tracks = stream.tracks().len(),
                    %facing,
                    "Local media acquired"
                );
                self.apply_track_flags(&stream);
                self.deps.preview.attach(&stream);
                self.resources.install_stream(stream);
                if !self.state.is_live() {
                    self.transition_to(BroadcastState::Previewing);
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Camera access failed");
                // A live connection keeps running; anything else has nothing to show.
                if self.state.is_live() {
                    warn!("Capture failed while live, outbound senders keep stopped tracks");
                } else {
                    self.deps.preview.detach();
                    self.transition_to(BroadcastState::Idle);
                }
                Err(self.fail(SessionError::Capture(e)))
            }
        }
    }

    async fn negotiate(&mut self, stream: &LocalMediaStream) -> Result<(), PublishError> {
        self.enter_phase(ConnectPhase::CreatePeer);
        let peer = self.deps.peers.create(&self.rtc_config)?;
        self.resources.install_peer(Arc::clone(&peer));

        self.enter_phase(ConnectPhase::AttachTracks);
        for track in stream.tracks() {
            peer.add_track(Arc::clone(track), stream.id())?;
        }

        self.enter_phase(ConnectPhase::CreateOffer);
        let offer = peer.create_offer().await?;
        peer.set_local_description(offer.clone()).await?;

        self.enter_phase(ConnectPhase::Publish);
        let answer = self
            .deps
            .publisher
            .publish(&self.stream_key, &offer.sdp)
            .await?;

        self.enter_phase(ConnectPhase::ApplyAnswer);
        peer.set_remote_description(answer.description()).await?;

        Ok(())
    }

    /// Point the live senders at the new stream's tracks, video first.
    ///
    /// Only a video failure fails the switch; an audio failure is notified
    /// on its own and the broadcast carries on.
    async fn replace_outbound_tracks(&mut self) -> SessionResult<()> {
        let Some(peer) = self.resources.peer().cloned() else {
            return Ok(());
        };

        for kind in [TrackKind::Video, TrackKind::Audio] {
            let Some(track) = self
                .resources
                .stream()
                .and_then(|stream| stream.first_track(kind))
                .cloned()
            else {
                continue;
            };
            let Some(sender) = peer.sender_for(kind) else {
                debug!(%kind, "No sender for track kind, skipping replacement");
                continue;
            };

            if let Err(e) = sender.replace_track(Some(Arc::clone(&track))).await {
                warn!(%kind, error = %e, "Outbound track replacement failed");
                if kind == TrackKind::Video {
                    return Err(self.fail(SessionError::TrackReplace(e)));
                }
                // The camera did switch; only the microphone is stale.
                self.observer.on_notification(&Notification::destructive(
                    "Failed to switch microphone",
                    e.to_string(),
                ));
                continue;
            }
            info!(%kind, track = %track.id(), "Outbound track replaced");
        }

        Ok(())
    }

    fn toggle_track(&mut self, kind: TrackKind) -> Option<bool> {
        let track = self.resources.stream()?.first_track(kind)?;
        let enabled = !track.is_enabled();
        track.set_enabled(enabled);

        match kind {
            TrackKind::Video => self.video_enabled = enabled,
            TrackKind::Audio => self.audio_enabled = enabled,
        }
        debug!(%kind, enabled, "Track toggled");
        self.observer.on_track_toggled(kind, enabled);
        Some(enabled)
    }

    /// Carry the session's mute flags over to a newly acquired stream.
    fn apply_track_flags(&self, stream: &LocalMediaStream) {
        if let Some(video) = stream.first_track(TrackKind::Video) {
            video.set_enabled(self.video_enabled);
        }
        if let Some(audio) = stream.first_track(TrackKind::Audio) {
            audio.set_enabled(self.audio_enabled);
        }
    }

    /// A `go_live` future dropped mid-flight leaves the session connecting.
    fn recover_abandoned_attempt(&mut self) {
        if !self.state.is_connecting() {
            return;
        }
        warn!("Previous go-live attempt was abandoned, rolling back");
        self.resources.release_peer();
        let state = if self.resources.stream().is_some() {
            BroadcastState::Previewing
        } else {
            BroadcastState::Idle
        };
        self.transition_to(state);
    }

    fn enter_phase(&self, phase: ConnectPhase) {
        debug!(phase = phase.name(), "Connect phase");
        self.observer.on_connect_phase(phase);
    }

    fn transition_to(&mut self, next: BroadcastState) {
        let previous = std::mem::replace(&mut self.state, next);
        if previous == next {
            return;
        }

        debug!(previous = %previous, current = %next, "State transition");
        self.observer.on_state_changed(previous, next);
    }

    /// Report a failure to the observer and hand it back to the caller.
    fn fail(&self, err: SessionError) -> SessionError {
        self.observer.on_notification(&err.notification());
        err
    }

    /// Out-of-order calls are caller bugs: returned, logged, not notified.
    fn reject(&self, operation: &'static str) -> SessionError {
        debug!(operation, state = %self.state, "Operation not allowed in current state");
        SessionError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl Drop for BroadcastSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
