//! In-memory doubles for the capture, connection and publish seams.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use labcast_capture::{
    CaptureError, CaptureResult, LocalMediaStream, LocalTrack, MediaCaptureProvider,
    MediaConstraints, PreviewSurface, TrackHandle,
};
use labcast_ipc::{
    BroadcastState, ConnectPhase, FacingMode, Notification, StreamKey, TrackKind,
};
use labcast_transport::{
    IngestPublisher, PeerConnection, PeerConnectionFactory, PeerConnectionState, PublishAnswer,
    PublishError, RtcConfiguration, RtpSender, SessionDescription, TransportError,
    TransportResult,
};

use crate::observer::SessionObserver;
use crate::session::{BroadcastSession, SessionDeps};

pub const FAKE_OFFER: &str = "v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";
pub const FAKE_ANSWER: &str = "v=0\r\no=- 3 4 IN IP4 10.0.0.1\r\ns=-\r\nt=0 0\r\n";

pub fn test_key() -> StreamKey {
    StreamKey::new("sk-test-1234abcd").unwrap()
}

pub fn two_track_stream(id: &str) -> LocalMediaStream {
    LocalMediaStream::new(
        id,
        vec![
            LocalTrack::new(format!("{id}-video"), TrackKind::Video, "Front Camera").into_handle(),
            LocalTrack::new(format!("{id}-audio"), TrackKind::Audio, "Built-in Mic").into_handle(),
        ],
    )
}

// ---------------------------------------------------------------------------
// Capture

#[derive(Default)]
pub struct FakeCapture {
    next_error: Mutex<Option<CaptureError>>,
    requests: Mutex<Vec<MediaConstraints>>,
    issued: Mutex<Vec<LocalMediaStream>>,
    max_active_at_request: AtomicUsize,
}

impl FakeCapture {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, err: CaptureError) {
        *self.next_error.lock() = Some(err);
    }

    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.requests.lock().clone()
    }

    pub fn issued(&self) -> Vec<LocalMediaStream> {
        self.issued.lock().clone()
    }

    pub fn active_streams(&self) -> usize {
        self.issued.lock().iter().filter(|s| s.is_active()).count()
    }

    /// Most streams still holding a device when a new request arrived.
    pub fn max_active_at_request(&self) -> usize {
        self.max_active_at_request.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCaptureProvider for FakeCapture {
    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> CaptureResult<LocalMediaStream> {
        let active = self.active_streams();
        self.max_active_at_request.fetch_max(active, Ordering::SeqCst);
        self.requests.lock().push(*constraints);

        if let Some(err) = self.next_error.lock().take() {
            return Err(err);
        }

        let mut issued = self.issued.lock();
        let n = issued.len() + 1;
        let facing = constraints.video.facing_mode;

        let mut tracks = vec![LocalTrack::new(
            format!("video-{n}"),
            TrackKind::Video,
            format!("{facing} camera"),
        )
        .into_handle()];
        if constraints.audio {
            tracks.push(LocalTrack::new(format!("audio-{n}"), TrackKind::Audio, "mic").into_handle());
        }

        let stream = LocalMediaStream::new(format!("stream-{n}"), tracks);
        issued.push(stream.clone());
        Ok(stream)
    }
}

// ---------------------------------------------------------------------------
// Peer connection

#[derive(Debug)]
pub struct FakeSender {
    track: Mutex<Option<TrackHandle>>,
    fail_replace: AtomicBool,
    replacements: AtomicUsize,
}

impl FakeSender {
    fn new(track: TrackHandle, fail_replace: bool) -> Self {
        Self {
            track: Mutex::new(Some(track)),
            fail_replace: AtomicBool::new(fail_replace),
            replacements: AtomicUsize::new(0),
        }
    }

    pub fn replacements(&self) -> usize {
        self.replacements.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RtpSender for FakeSender {
    fn track(&self) -> Option<TrackHandle> {
        self.track.lock().clone()
    }

    async fn replace_track(&self, track: Option<TrackHandle>) -> TransportResult<()> {
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(TransportError::TrackReplace("encoder busy".to_string()));
        }
        *self.track.lock() = track;
        self.replacements.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakePeer {
    senders: Mutex<Vec<Arc<FakeSender>>>,
    watched: Mutex<Vec<TrackHandle>>,
    close_count: AtomicUsize,
    live_tracks_at_close: Mutex<Option<usize>>,
    local: Mutex<Option<SessionDescription>>,
    remote: Mutex<Option<SessionDescription>>,
    state: Mutex<PeerConnectionState>,
    fail_offer: AtomicBool,
    fail_replace: Mutex<Vec<TrackKind>>,
}

impl FakePeer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            senders: Mutex::new(Vec::new()),
            watched: Mutex::new(Vec::new()),
            close_count: AtomicUsize::new(0),
            live_tracks_at_close: Mutex::new(None),
            local: Mutex::new(None),
            remote: Mutex::new(None),
            state: Mutex::new(PeerConnectionState::New),
            fail_offer: AtomicBool::new(false),
            fail_replace: Mutex::new(Vec::new()),
        })
    }

    /// Record how many of `tracks` are still live when the peer is first closed.
    pub fn watch_tracks(&self, tracks: Vec<TrackHandle>) {
        self.watched.lock().extend(tracks);
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn live_tracks_at_close(&self) -> Option<usize> {
        *self.live_tracks_at_close.lock()
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.local.lock().clone()
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.remote.lock().clone()
    }

    pub fn fake_senders(&self) -> Vec<Arc<FakeSender>> {
        self.senders.lock().clone()
    }

    /// Id of the track on the first video sender.
    pub fn video_track_id(&self) -> Option<String> {
        self.sender_for(TrackKind::Video)
            .and_then(|sender| sender.track())
            .map(|track| track.id().to_string())
    }
}

#[async_trait]
impl PeerConnection for FakePeer {
    fn add_track(&self, track: TrackHandle, _stream_id: &str) -> TransportResult<Arc<dyn RtpSender>> {
        if self.connection_state().is_closed() {
            return Err(TransportError::Closed);
        }
        self.watched.lock().push(Arc::clone(&track));
        let fail_replace = self.fail_replace.lock().contains(&track.kind());
        let sender = Arc::new(FakeSender::new(track, fail_replace));
        self.senders.lock().push(Arc::clone(&sender));
        Ok(sender as Arc<dyn RtpSender>)
    }

    async fn create_offer(&self) -> TransportResult<SessionDescription> {
        if self.fail_offer.load(Ordering::SeqCst) {
            return Err(TransportError::Negotiation("no codecs in common".to_string()));
        }
        Ok(SessionDescription::offer(FAKE_OFFER))
    }

    async fn set_local_description(&self, description: SessionDescription) -> TransportResult<()> {
        *self.local.lock() = Some(description);
        *self.state.lock() = PeerConnectionState::Connecting;
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> TransportResult<()> {
        *self.remote.lock() = Some(description);
        *self.state.lock() = PeerConnectionState::Connected;
        Ok(())
    }

    fn senders(&self) -> Vec<Arc<dyn RtpSender>> {
        self.senders
            .lock()
            .iter()
            .map(|sender| Arc::clone(sender) as Arc<dyn RtpSender>)
            .collect()
    }

    fn close(&self) {
        let mut live_at_close = self.live_tracks_at_close.lock();
        if live_at_close.is_none() {
            let live = self.watched.lock().iter().filter(|t| t.is_live()).count();
            *live_at_close = Some(live);
        }
        self.close_count.fetch_add(1, Ordering::SeqCst);
        *self.state.lock() = PeerConnectionState::Closed;
    }

    fn connection_state(&self) -> PeerConnectionState {
        *self.state.lock()
    }
}

#[derive(Default)]
pub struct FakePeerFactory {
    created: Mutex<Vec<Arc<FakePeer>>>,
    fail_create: AtomicBool,
    fail_offer: AtomicBool,
    fail_replace: Mutex<Vec<TrackKind>>,
}

impl FakePeerFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_offer(&self, fail: bool) {
        self.fail_offer.store(fail, Ordering::SeqCst);
    }

    /// Senders for these kinds refuse `replace_track`.
    pub fn fail_replace(&self, kinds: &[TrackKind]) {
        *self.fail_replace.lock() = kinds.to_vec();
    }

    pub fn created(&self) -> Vec<Arc<FakePeer>> {
        self.created.lock().clone()
    }

    pub fn last(&self) -> Option<Arc<FakePeer>> {
        self.created.lock().last().cloned()
    }
}

impl PeerConnectionFactory for FakePeerFactory {
    fn create(&self, _config: &RtcConfiguration) -> TransportResult<Arc<dyn PeerConnection>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(TransportError::PeerConnection("ICE agent unavailable".to_string()));
        }
        let peer = FakePeer::new();
        peer.fail_offer
            .store(self.fail_offer.load(Ordering::SeqCst), Ordering::SeqCst);
        *peer.fail_replace.lock() = self.fail_replace.lock().clone();
        self.created.lock().push(Arc::clone(&peer));
        Ok(peer as Arc<dyn PeerConnection>)
    }
}

// ---------------------------------------------------------------------------
// Publish

#[derive(Debug, Clone)]
pub enum PublishBehavior {
    Answer,
    Reject { status: u16, detail: String },
    Hang,
}

pub struct FakePublisher {
    behavior: Mutex<PublishBehavior>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakePublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(PublishBehavior::Answer),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behavior(&self, behavior: PublishBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn reject_overloaded(&self) {
        self.set_behavior(PublishBehavior::Reject {
            status: 500,
            detail: "ingest overloaded".to_string(),
        });
    }

    /// `(stream key, offer sdp)` per call.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl IngestPublisher for FakePublisher {
    async fn publish(
        &self,
        stream_key: &StreamKey,
        offer_sdp: &str,
    ) -> Result<PublishAnswer, PublishError> {
        self.calls
            .lock()
            .push((stream_key.expose().to_string(), offer_sdp.to_string()));

        let behavior = self.behavior.lock().clone();
        match behavior {
            PublishBehavior::Answer => Ok(PublishAnswer {
                status: 201,
                sdp: FAKE_ANSWER.to_string(),
                resource_url: None,
            }),
            PublishBehavior::Reject { status, detail } => {
                Err(PublishError::Rejected { status, detail })
            }
            PublishBehavior::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Observer and preview

#[derive(Default)]
pub struct RecordingObserver {
    log: Mutex<Vec<String>>,
    states: Mutex<Vec<BroadcastState>>,
    phases: Mutex<Vec<ConnectPhase>>,
    notifications: Mutex<Vec<Notification>>,
    toggles: Mutex<Vec<(TrackKind, bool)>>,
    facing_modes: Mutex<Vec<FacingMode>>,
    live_count: AtomicUsize,
    stop_count: AtomicUsize,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every callback in order, e.g. `state:live`, `live`, `notify:You're live!`.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Every state entered, in order.
    pub fn states(&self) -> Vec<BroadcastState> {
        self.states.lock().clone()
    }

    pub fn phases(&self) -> Vec<ConnectPhase> {
        self.phases.lock().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications.lock().last().cloned()
    }

    pub fn toggles(&self) -> Vec<(TrackKind, bool)> {
        self.toggles.lock().clone()
    }

    pub fn facing_modes(&self) -> Vec<FacingMode> {
        self.facing_modes.lock().clone()
    }

    pub fn live_count(&self) -> usize {
        self.live_count.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }
}

impl SessionObserver for RecordingObserver {
    fn on_state_changed(&self, _previous: BroadcastState, current: BroadcastState) {
        self.states.lock().push(current);
        self.log.lock().push(format!("state:{current}"));
    }

    fn on_connect_phase(&self, phase: ConnectPhase) {
        self.phases.lock().push(phase);
    }

    fn on_live(&self) {
        self.live_count.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push("live".to_string());
    }

    fn on_stop(&self) {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push("stop".to_string());
    }

    fn on_track_toggled(&self, kind: TrackKind, enabled: bool) {
        self.toggles.lock().push((kind, enabled));
    }

    fn on_facing_mode_changed(&self, facing: FacingMode) {
        self.facing_modes.lock().push(facing);
    }

    fn on_notification(&self, notification: &Notification) {
        self.log.lock().push(format!("notify:{}", notification.title));
        self.notifications.lock().push(notification.clone());
    }
}

#[derive(Default)]
pub struct RecordingPreview {
    attached: Mutex<Option<String>>,
    attach_count: AtomicUsize,
    detach_count: AtomicUsize,
}

impl RecordingPreview {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Id of the stream currently shown.
    pub fn attached(&self) -> Option<String> {
        self.attached.lock().clone()
    }

    pub fn attach_count(&self) -> usize {
        self.attach_count.load(Ordering::SeqCst)
    }

    pub fn detach_count(&self) -> usize {
        self.detach_count.load(Ordering::SeqCst)
    }
}

impl PreviewSurface for RecordingPreview {
    fn attach(&self, stream: &LocalMediaStream) {
        *self.attached.lock() = Some(stream.id().to_string());
        self.attach_count.fetch_add(1, Ordering::SeqCst);
    }

    fn detach(&self) {
        *self.attached.lock() = None;
        self.detach_count.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Harness

/// One of each double, wired into a session on demand.
pub struct Fakes {
    pub capture: Arc<FakeCapture>,
    pub peers: Arc<FakePeerFactory>,
    pub publisher: Arc<FakePublisher>,
    pub preview: Arc<RecordingPreview>,
    pub observer: Arc<RecordingObserver>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            capture: FakeCapture::new(),
            peers: FakePeerFactory::new(),
            publisher: FakePublisher::new(),
            preview: RecordingPreview::new(),
            observer: RecordingObserver::new(),
        }
    }

    pub fn deps(&self) -> SessionDeps {
        SessionDeps::new(
            self.capture.clone(),
            self.peers.clone(),
            self.publisher.clone(),
        )
        .with_preview(self.preview.clone())
    }

    pub fn session(&self) -> BroadcastSession {
        BroadcastSession::new(test_key(), self.deps(), self.observer.clone())
    }
}
