//! # Engine Coordinator
//!
//! Hands out the one client that owns an engine, plus cheap senders for
//! everything that only needs to push commands at it.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::info;

use crate::client::SimulationClient;
use crate::engine::SimulationEngine;
use crate::error::{ClientError, ClientResult};

/// Sessions started in this process, for log correlation only.
static SESSIONS: AtomicU64 = AtomicU64::new(0);

/// A fire-and-forget request for the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Click at a simulation-space point.
    Click {
        /// X in simulation space.
        x: f64,
        /// Y in simulation space.
        y: f64,
    },
    /// Submit a line of text.
    Send(String),
}

/// Cloneable handle that queues commands for the owning client.
///
/// Never blocks. Queued commands reach the engine at the top of the next
/// frame, strictly between ticks.
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Queues a click.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the owning client was dropped.
    pub fn click(&self, x: f64, y: f64) -> ClientResult<()> {
        self.submit(Command::Click { x, y })
    }

    /// Queues a text submission.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the owning client was dropped.
    pub fn send(&self, text: impl Into<String>) -> ClientResult<()> {
        self.submit(Command::Send(text.into()))
    }

    /// Queues an arbitrary command.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the owning client was dropped.
    pub fn submit(&self, command: Command) -> ClientResult<()> {
        match self.tx.try_send(command) {
            Ok(()) => Ok(()),
            // Unbounded: Full cannot happen, treat it like a closed queue anyway.
            Err(TrySendError::Disconnected(_) | TrySendError::Full(_)) => Err(ClientError::Closed),
        }
    }

    /// Commands waiting for the next flush.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.tx.len()
    }
}

/// Receiving half, owned by the client.
pub(crate) type CommandReceiver = Receiver<Command>;

/// Sole entry point for turning an engine into a client.
pub struct EngineCoordinator;

impl EngineCoordinator {
    /// Takes ownership of `engine` and returns its client and a command sender.
    ///
    /// The engine is moved in, so a second consumer cannot reconstruct it.
    #[must_use]
    pub fn start<E: SimulationEngine>(engine: E) -> (SimulationClient<E>, CommandSender) {
        let session = SESSIONS.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = crossbeam_channel::unbounded();

        info!(session, "Engine session started");

        (SimulationClient::new(engine, rx, session), CommandSender { tx })
    }
}
