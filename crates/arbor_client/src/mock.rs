//! # Mock Engine
//!
//! Scripted [`SimulationEngine`] for tests. Every call is recorded in a
//! [`MockProbe`] that stays readable after the engine has been moved into a
//! client.
//!
//! ```text
//! tick #n  ──►  (optional delay)  ──►  fail if scripted
//!                                 ──►  advance to next queued snapshot
//!                                 ──►  append next message batch to pending
//! ```

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::engine::SimulationEngine;
use crate::error::EngineError;

/// Everything the mock has been asked to do.
#[derive(Clone, Debug, Default, PartialEq)]
struct ProbeLog {
    ticks_started: u64,
    ticks_completed: u64,
    drains: u64,
    states: u64,
    clicks: Vec<(f64, f64)>,
    sends: Vec<String>,
    deltas: Vec<f64>,
}

/// Shared view of a [`MockEngine`]'s call log.
#[derive(Clone, Debug, Default)]
pub struct MockProbe {
    log: Arc<Mutex<ProbeLog>>,
}

impl MockProbe {
    /// Ticks issued.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.log.lock().ticks_started
    }

    /// Ticks that completed without a scripted failure.
    #[must_use]
    pub fn completed_ticks(&self) -> u64 {
        self.log.lock().ticks_completed
    }

    /// Deltas passed to each tick, in order.
    #[must_use]
    pub fn deltas(&self) -> Vec<f64> {
        self.log.lock().deltas.clone()
    }

    /// Calls to `get_pending`.
    #[must_use]
    pub fn drains(&self) -> u64 {
        self.log.lock().drains
    }

    /// Calls to `state`.
    #[must_use]
    pub fn states(&self) -> u64 {
        self.log.lock().states
    }

    /// Clicks received, in order.
    #[must_use]
    pub fn clicks(&self) -> Vec<(f64, f64)> {
        self.log.lock().clicks.clone()
    }

    /// Texts received, in order.
    #[must_use]
    pub fn sends(&self) -> Vec<String> {
        self.log.lock().sends.clone()
    }
}

/// Scripted engine stub.
#[derive(Debug, Default)]
pub struct MockEngine {
    current: Value,
    snapshots: VecDeque<Value>,
    batches: VecDeque<Vec<String>>,
    pending: Vec<String>,
    failing_ticks: BTreeSet<u64>,
    tick_delay: Option<Duration>,
    position: (f64, f64),
    probe: MockProbe,
}

impl MockEngine {
    /// Creates a mock reporting an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Value::Array(Vec::new()),
            ..Self::default()
        }
    }

    /// State reported before the first tick.
    #[must_use]
    pub fn with_initial_state(mut self, value: Value) -> Self {
        self.current = value;
        self
    }

    /// Queues a snapshot that becomes current on the next tick.
    ///
    /// Once the queue runs dry the last snapshot keeps being reported.
    #[must_use]
    pub fn with_snapshot(mut self, value: Value) -> Self {
        self.snapshots.push_back(value);
        self
    }

    /// Queues a message batch emitted by the next tick.
    #[must_use]
    pub fn with_batch<I, S>(mut self, batch: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batches.push_back(batch.into_iter().map(Into::into).collect());
        self
    }

    /// Makes the `n`th tick (1-based) fail with `TickRejected`.
    #[must_use]
    pub fn fail_tick(mut self, n: u64) -> Self {
        self.failing_ticks.insert(n);
        self
    }

    /// Sleeps this long inside every tick.
    #[must_use]
    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = Some(delay);
        self
    }

    /// Position reported by `x()` / `y()`.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = (x, y);
        self
    }

    /// Handle onto the call log.
    #[must_use]
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl SimulationEngine for MockEngine {
    async fn tick(&mut self, delta: f64) -> Result<(), EngineError> {
        let number = {
            let mut log = self.probe.log.lock();
            log.ticks_started += 1;
            log.deltas.push(delta);
            log.ticks_started
        };

        if let Some(delay) = self.tick_delay {
            tokio::time::sleep(delay).await;
        }

        let mut log = self.probe.log.lock();

        if self.failing_ticks.contains(&number) {
            return Err(EngineError::TickRejected(format!("scripted failure on tick {number}")));
        }

        if let Some(next) = self.snapshots.pop_front() {
            self.current = next;
        }
        if let Some(batch) = self.batches.pop_front() {
            self.pending.extend(batch);
        }
        log.ticks_completed += 1;
        Ok(())
    }

    fn state(&self) -> Value {
        self.probe.log.lock().states += 1;
        self.current.clone()
    }

    fn get_pending(&mut self) -> Vec<String> {
        self.probe.log.lock().drains += 1;
        std::mem::take(&mut self.pending)
    }

    fn click(&mut self, x: f64, y: f64) {
        self.probe.log.lock().clicks.push((x, y));
    }

    fn send(&mut self, text: &str) {
        self.probe.log.lock().sends.push(text.to_owned());
    }

    fn x(&self) -> f64 {
        self.position.0
    }

    fn y(&self) -> f64 {
        self.position.1
    }
}
