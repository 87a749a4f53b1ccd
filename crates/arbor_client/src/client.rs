//! # Simulation Client
//!
//! Typed pass-through over a [`SimulationEngine`]. Decodes snapshots, keeps
//! call counters, and flushes queued commands on request.

use arbor_shared::Snapshot;
use tracing::{debug, trace};

use crate::coordinator::{Command, CommandReceiver};
use crate::engine::SimulationEngine;
use crate::error::ClientResult;

/// Call counters for one client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Ticks issued.
    pub ticks_started: u64,
    /// Ticks that resolved successfully.
    pub ticks_completed: u64,
    /// Ticks the engine rejected.
    pub ticks_failed: u64,
    /// Calls to `get_pending`.
    pub drains: u64,
    /// Messages returned by all drains.
    pub messages_drained: u64,
    /// Snapshots read (full or tracked).
    pub snapshots: u64,
    /// Clicks forwarded to the engine.
    pub clicks: u64,
    /// Texts forwarded to the engine.
    pub sends: u64,
}

/// The single owner of an engine handle.
///
/// Built only by [`EngineCoordinator::start`](crate::EngineCoordinator::start).
pub struct SimulationClient<E> {
    engine: E,
    commands: CommandReceiver,
    session: u64,
    stats: ClientStats,
}

impl<E: SimulationEngine> SimulationClient<E> {
    pub(crate) fn new(engine: E, commands: CommandReceiver, session: u64) -> Self {
        Self {
            engine,
            commands,
            session,
            stats: ClientStats::default(),
        }
    }

    /// Advances the engine by `delta` seconds.
    ///
    /// The client stays mutably borrowed until the completion resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Engine`](crate::ClientError::Engine) if the
    /// engine rejects the tick.
    pub async fn tick(&mut self, delta: f64) -> ClientResult<()> {
        self.stats.ticks_started += 1;
        match self.engine.tick(delta).await {
            Ok(()) => {
                self.stats.ticks_completed += 1;
                Ok(())
            }
            Err(err) => {
                self.stats.ticks_failed += 1;
                Err(err.into())
            }
        }
    }

    /// Reads and decodes the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Snapshot`](crate::ClientError::Snapshot) if the
    /// engine reports something other than a sequence of records.
    pub fn state(&mut self) -> ClientResult<Snapshot> {
        self.stats.snapshots += 1;
        let snapshot = Snapshot::from_json(&self.engine.state())?;

        if snapshot.unrecognized() > 0 {
            trace!(count = snapshot.unrecognized(), "Skipped unrecognized variants");
        }
        for err in snapshot.malformed() {
            debug!(session = self.session, %err, "Skipped malformed record");
        }

        Ok(snapshot)
    }

    /// The degenerate snapshot built from [`x`](Self::x) and [`y`](Self::y).
    pub fn tracked_snapshot(&mut self) -> Snapshot {
        self.stats.snapshots += 1;
        Snapshot::tracked(self.engine.x(), self.engine.y())
    }

    /// Drains messages emitted since the previous drain.
    pub fn get_pending(&mut self) -> Vec<String> {
        let batch = self.engine.get_pending();
        self.stats.drains += 1;
        self.stats.messages_drained += batch.len() as u64;
        batch
    }

    /// Forwards a click straight to the engine.
    pub fn click(&mut self, x: f64, y: f64) {
        self.stats.clicks += 1;
        self.engine.click(x, y);
    }

    /// Forwards text straight to the engine.
    pub fn send(&mut self, text: &str) {
        self.stats.sends += 1;
        self.engine.send(text);
    }

    /// X of the tracked entity.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.engine.x()
    }

    /// Y of the tracked entity.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.engine.y()
    }

    /// Delivers every command queued before this call. Returns how many.
    pub fn flush_commands(&mut self) -> usize {
        let queued = self.commands.len();
        let mut flushed = 0;
        while flushed < queued {
            let Ok(command) = self.commands.try_recv() else {
                break;
            };
            trace!(?command, "Forwarding command");
            match command {
                Command::Click { x, y } => self.click(x, y),
                Command::Send(text) => self.send(&text),
            }
            flushed += 1;
        }
        flushed
    }

    /// Session number assigned at start.
    #[inline]
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Call counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// Read access to the engine.
    #[inline]
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }
}
