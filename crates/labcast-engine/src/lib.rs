//! Core of the labcast broadcast client.
//!
//! This crate ties capture and transport together: the broadcast session
//! state machine, its resource ownership, and a command engine that drives
//! one session from the UI channels.

mod config;
mod error;
mod observer;
mod orchestrator;
mod session;
mod state;

#[cfg(test)]
mod testing;

pub use config::{BroadcastConfig, ENV_PREFIX};
pub use error::{SessionError, SessionResult};
pub use observer::{ChannelObserver, NoopObserver, SessionObserver};
pub use orchestrator::Engine;
pub use session::{BroadcastSession, SessionDeps};
pub use state::SessionResources;

use crossbeam_channel::{Receiver, Sender};

use labcast_ipc::{SessionCommand, SessionEvent, StreamKey};

/// Create an engine instance with IPC channels.
pub fn create_engine(
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    stream_key: StreamKey,
    deps: SessionDeps,
    config: &BroadcastConfig,
) -> std::io::Result<Engine> {
    Engine::new(command_rx, event_tx, stream_key, deps, config)
}
