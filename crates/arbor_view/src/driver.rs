//! # Loop Driver
//!
//! The one authoritative scheduler for frames: a fixed-interval timer that
//! awaits each frame to completion before waiting on the next interval.
//!
//! ```text
//!  interval ─┬─ tick ──► frame().await ──┬─ tick ──► frame().await ── ...
//!            │                            │
//!  dispose() ┴──────────── wakes ─────────┴──► LoopReport { Disposed }
//! ```
//!
//! A tick is never cancelled. Disposal only stops new frames from being
//! scheduled; a frame already inside `tick` finishes its tick and stops
//! before draining.

use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arbor_client::SimulationEngine;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::render_loop::{FrameOutcome, RenderLoop, RenderLoopStats};

#[derive(Debug, Default)]
struct DisposeState {
    disposed: AtomicBool,
    wake: Notify,
}

/// Cloneable teardown signal for a render loop.
#[derive(Debug, Clone, Default)]
pub struct DisposeHandle {
    state: Arc<DisposeState>,
}

impl DisposeHandle {
    /// Creates a live handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the surface disposed. Returns true on the first call only.
    pub fn dispose(&self) -> bool {
        let first = !self.state.disposed.swap(true, Ordering::AcqRel);
        if first {
            info!("Surface disposed");
            self.state.wake.notify_waiters();
        }
        first
    }

    /// True once [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.disposed.load(Ordering::Acquire)
    }

    /// Resolves once disposed. Any number of clones may wait at once.
    pub async fn disposed(&self) {
        loop {
            // Register before reading the flag so a concurrent `dispose` cannot slip between them.
            let mut notified = pin!(self.state.wake.notified());
            notified.as_mut().enable();
            if self.is_disposed() {
                return;
            }
            notified.await;
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The surface was disposed.
    Disposed,
    /// The configured frame limit was reached.
    FrameLimit,
}

/// Summary of one [`LoopDriver::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    /// Frames scheduled during this run.
    pub frames: u64,
    /// Why the run ended.
    pub reason: StopReason,
    /// Render loop statistics at the end of the run.
    pub stats: RenderLoopStats,
}

/// Fixed-interval frame scheduler.
pub struct LoopDriver<E> {
    render_loop: RenderLoop<E>,
    interval: Duration,
    frame_limit: Option<u64>,
}

impl<E: SimulationEngine> LoopDriver<E> {
    /// Creates a driver that schedules a frame every `interval`.
    #[must_use]
    pub fn new(render_loop: RenderLoop<E>, interval: Duration) -> Self {
        Self {
            render_loop,
            interval,
            frame_limit: None,
        }
    }

    /// Stops a run after `frames` frames.
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Changes the frame limit for the next run. `None` runs until disposed.
    pub fn set_frame_limit(&mut self, frames: Option<u64>) {
        self.frame_limit = frames;
    }

    /// Runs frames until disposed or the frame limit is reached.
    ///
    /// Missed intervals are delayed, never bunched up, so frames stay
    /// strictly sequential.
    pub async fn run(&mut self) -> LoopReport {
        let dispose = self.render_loop.dispose_handle();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.interval, limit = ?self.frame_limit, "Loop driver started");

        let mut frames = 0;
        let reason = loop {
            if self.frame_limit.is_some_and(|limit| frames >= limit) {
                break StopReason::FrameLimit;
            }

            tokio::select! {
                biased;
                () = dispose.disposed() => break StopReason::Disposed,
                _ = ticker.tick() => {}
            }

            frames += 1;
            match self.render_loop.frame().await {
                FrameOutcome::Disposed => break StopReason::Disposed,
                FrameOutcome::Completed(result) if result.over_budget => {
                    debug!(frame = result.frame_number, us = result.frame_time_us, "Frame over budget");
                }
                FrameOutcome::Completed(_) | FrameOutcome::TickFailed { .. } => {}
            }
        };

        let stats = *self.render_loop.stats();
        info!(
            frames,
            ?reason,
            completed = stats.completed_frames,
            failed_ticks = stats.failed_ticks,
            live = self.render_loop.registry().len(),
            "Loop driver stopped"
        );

        LoopReport { frames, reason, stats }
    }

    /// Handle that stops the driver.
    #[must_use]
    pub fn dispose_handle(&self) -> DisposeHandle {
        self.render_loop.dispose_handle()
    }

    /// The driven loop.
    #[must_use]
    pub const fn render_loop(&self) -> &RenderLoop<E> {
        &self.render_loop
    }

    /// Mutable access to the driven loop between runs.
    pub fn render_loop_mut(&mut self) -> &mut RenderLoop<E> {
        &mut self.render_loop
    }

    /// Gives back the loop.
    #[must_use]
    pub fn into_inner(self) -> RenderLoop<E> {
        self.render_loop
    }
}
