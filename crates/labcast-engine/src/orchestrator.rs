//! Command loop driving one broadcast session.

use std::io;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, instrument, warn};

use labcast_ipc::{BroadcastState, SessionCommand, SessionEvent, StreamKey};

use crate::config::BroadcastConfig;
use crate::error::SessionResult;
use crate::observer::ChannelObserver;
use crate::session::{BroadcastSession, SessionDeps};

/// The broadcast engine.
///
/// Owns the session and a single-threaded runtime; commands are handled one
/// at a time, so a second `GoLive` can never race the first.
pub struct Engine {
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    state: Arc<RwLock<BroadcastState>>,
    session: Option<BroadcastSession>,
    runtime: Runtime,
}

impl Engine {
    /// Create a new engine.
    pub fn new(
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
        stream_key: StreamKey,
        deps: SessionDeps,
        config: &BroadcastConfig,
    ) -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let state = Arc::new(RwLock::new(BroadcastState::Idle));
        let observer = Arc::new(ChannelObserver::new(event_tx.clone(), Arc::clone(&state)));
        let session = BroadcastSession::new(stream_key, deps, observer).with_config(config);

        Ok(Self {
            command_rx,
            event_tx,
            state,
            session: Some(session),
            runtime,
        })
    }

    /// Shared view of the session state, updated on every transition.
    pub fn state_handle(&self) -> Arc<RwLock<BroadcastState>> {
        Arc::clone(&self.state)
    }

    /// Run the engine (blocking) until `Shutdown` or the command channel closes.
    #[instrument(name = "engine_run", skip(self))]
    pub fn run(&mut self) {
        info!("Engine starting");
        self.send_event(SessionEvent::Ready);

        loop {
            match self.command_rx.recv() {
                Ok(command) => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Err(_) => {
                    info!("Command channel disconnected, shutting down");
                    self.dispose_session();
                    break;
                }
            }
        }

        info!("Engine stopped");
    }

    /// Handle a command. Returns false if the engine should stop.
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        debug!(?command, "Handling command");

        let Some(session) = self.session.as_mut() else {
            warn!("Session already disposed, ignoring command");
            return false;
        };

        match command {
            SessionCommand::StartPreview { facing } => {
                log_outcome("start_preview", self.runtime.block_on(session.start_preview(facing)));
            }
            SessionCommand::SwitchCamera => {
                log_outcome("switch_camera", self.runtime.block_on(session.switch_camera()));
            }
            SessionCommand::GoLive => {
                log_outcome("go_live", self.runtime.block_on(session.go_live()));
            }
            SessionCommand::StopBroadcast => session.stop_broadcast(),
            SessionCommand::ToggleVideo => {
                if session.toggle_video().is_none() {
                    debug!("No video track to toggle");
                }
            }
            SessionCommand::ToggleAudio => {
                if session.toggle_audio().is_none() {
                    debug!("No audio track to toggle");
                }
            }
            SessionCommand::GetState => {
                let state = session.state();
                self.send_event(SessionEvent::StateChanged {
                    previous: state,
                    current: state,
                });
            }
            SessionCommand::Shutdown => {
                self.dispose_session();
                self.send_event(SessionEvent::Shutdown);
                return false;
            }
        }

        true
    }

    fn dispose_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.dispose();
        }
    }

    fn send_event(&self, event: SessionEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Failures were already reported to the observer; only log them here.
fn log_outcome(operation: &'static str, result: SessionResult<()>) {
    match result {
        Ok(()) => debug!(operation, "Command completed"),
        Err(e) if e.is_invalid_state() => debug!(operation, error = %e, "Command ignored"),
        Err(e) => warn!(operation, error = %e, "Command failed"),
    }
}
