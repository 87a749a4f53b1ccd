//! Render Loop - the per-frame synchronization procedure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          FRAME SEQUENCE                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ 0. disposed?             ── yes ──► Disposed (engine untouched)  │
//! │ 1. flush queued commands ──► click / send                        │
//! │ 2. tick(delta).await     ── err ──► TickFailed (loop goes on)    │
//! │ 3. disposed?             ── yes ──► Disposed (no drain)          │
//! │ 4. get_pending ──► MessageFeed::append                           │
//! │ 5. state / tracked ──► EntityViewRegistry::reconcile             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only one frame runs at a time: `frame` borrows the loop mutably until the
//! whole sequence, tick included, has finished.

use std::time::{Duration, Instant};

use arbor_client::{ClientError, SimulationClient, SimulationEngine};
use arbor_shared::DEFAULT_TICK_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::driver::DisposeHandle;
use crate::feed::MessageFeed;
use crate::registry::{EntityViewRegistry, ReconcileStats, RegistryConfig};

/// Where each frame's snapshot comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// `state()`: every entity the engine reports.
    #[default]
    Full,
    /// `x()` / `y()`: the single tracked entity.
    Tracked,
}

/// Configuration for the render loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLoopConfig {
    /// Delta passed to the very first tick
    pub nominal_delta: Duration,
    /// Frame time above which a frame counts as over budget (microseconds)
    pub frame_budget_us: u32,
    /// Snapshot source
    pub source: SnapshotSource,
    /// Registry settings
    pub registry: RegistryConfig,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            nominal_delta: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            frame_budget_us: 16_666,
            source: SnapshotSource::Full,
            registry: RegistryConfig::default(),
        }
    }
}

/// Result of a completed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameResult {
    /// Frame number (1-based)
    pub frame_number: u64,
    /// Delta handed to the engine, in seconds
    pub delta: f64,
    /// Commands delivered before the tick
    pub commands_flushed: usize,
    /// Messages appended to the feed
    pub messages_drained: usize,
    /// Reconciliation outcome
    pub reconcile: ReconcileStats,
    /// Total frame time (microseconds)
    pub frame_time_us: u32,
    /// Over budget warning
    pub over_budget: bool,
}

/// How a call to [`RenderLoop::frame`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The full sequence ran.
    Completed(FrameResult),
    /// The engine rejected the tick. Nothing was drained or reconciled.
    TickFailed {
        /// Frame number of the failed frame.
        frame_number: u64,
        /// What the engine reported.
        error: ClientError,
    },
    /// The surface was disposed; the frame stopped before touching it.
    Disposed,
}

/// Statistics for the render loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderLoopStats {
    /// Frames that started a tick
    pub total_frames: u64,
    /// Frames that ran the full sequence
    pub completed_frames: u64,
    /// Ticks the engine rejected
    pub failed_ticks: u64,
    /// Frames whose snapshot could not be decoded
    pub skipped_snapshots: u64,
    /// Worst frame time (microseconds)
    pub worst_frame_time_us: u32,
    /// Frames over budget
    pub frames_over_budget: u64,
}

/// Drives tick → drain → state → reconcile for one engine.
pub struct RenderLoop<E> {
    config: RenderLoopConfig,
    client: SimulationClient<E>,
    registry: EntityViewRegistry,
    feed: MessageFeed,
    dispose: DisposeHandle,
    frame_count: u64,
    last_frame_start: Option<Instant>,
    stats: RenderLoopStats,
}

impl<E: SimulationEngine> RenderLoop<E> {
    /// Creates a render loop that owns `client`.
    #[must_use]
    pub fn new(client: SimulationClient<E>, config: RenderLoopConfig) -> Self {
        Self {
            registry: EntityViewRegistry::new(config.registry),
            feed: MessageFeed::new(),
            dispose: DisposeHandle::new(),
            frame_count: 0,
            last_frame_start: None,
            stats: RenderLoopStats::default(),
            client,
            config,
        }
    }

    /// Runs one frame.
    pub async fn frame(&mut self) -> FrameOutcome {
        if self.dispose.is_disposed() {
            return FrameOutcome::Disposed;
        }

        let frame_start = Instant::now();
        let delta = match self.last_frame_start {
            Some(previous) => frame_start.duration_since(previous).as_secs_f64(),
            None => self.config.nominal_delta.as_secs_f64(),
        };
        self.last_frame_start = Some(frame_start);
        self.frame_count += 1;
        self.stats.total_frames += 1;
        let frame_number = self.frame_count;

        // === PHASE 1: Commands ===
        let commands_flushed = self.client.flush_commands();

        // === PHASE 2: Tick ===
        if let Err(error) = self.client.tick(delta).await {
            warn!(frame = frame_number, %error, "Tick failed, skipping frame");
            self.stats.failed_ticks += 1;
            return FrameOutcome::TickFailed { frame_number, error };
        }

        // Disposed while the tick was in flight: stop before touching the surface.
        if self.dispose.is_disposed() {
            debug!(frame = frame_number, "Disposed during tick");
            return FrameOutcome::Disposed;
        }

        // === PHASE 3: Messages ===
        let messages_drained = self.feed.append(self.client.get_pending());

        // === PHASE 4: Reconcile ===
        let snapshot = match self.config.source {
            SnapshotSource::Full => self.client.state(),
            SnapshotSource::Tracked => Ok(self.client.tracked_snapshot()),
        };
        let reconcile = match snapshot {
            Ok(snapshot) => self.registry.reconcile(&snapshot),
            Err(error) => {
                warn!(frame = frame_number, %error, "Snapshot unreadable, keeping previous view");
                self.stats.skipped_snapshots += 1;
                ReconcileStats {
                    live: self.registry.len(),
                    ..ReconcileStats::default()
                }
            }
        };

        // === PHASE 5: Finalize ===
        let frame_time_us = u32::try_from(frame_start.elapsed().as_micros()).unwrap_or(u32::MAX);
        self.stats.completed_frames += 1;
        self.stats.worst_frame_time_us = self.stats.worst_frame_time_us.max(frame_time_us);
        let over_budget = frame_time_us > self.config.frame_budget_us;
        if over_budget {
            self.stats.frames_over_budget += 1;
        }

        debug!(
            frame = frame_number,
            created = reconcile.created,
            live = reconcile.live,
            messages = messages_drained,
            "Frame complete"
        );

        FrameOutcome::Completed(FrameResult {
            frame_number,
            delta,
            commands_flushed,
            messages_drained,
            reconcile,
            frame_time_us,
            over_budget,
        })
    }

    /// Handle that stops this loop.
    #[must_use]
    pub fn dispose_handle(&self) -> DisposeHandle {
        self.dispose.clone()
    }

    /// Entity views.
    #[must_use]
    pub const fn registry(&self) -> &EntityViewRegistry {
        &self.registry
    }

    /// Mutable entity views, for toggling interactivity between frames.
    pub fn registry_mut(&mut self) -> &mut EntityViewRegistry {
        &mut self.registry
    }

    /// Message log.
    #[must_use]
    pub const fn feed(&self) -> &MessageFeed {
        &self.feed
    }

    /// The owned client.
    #[must_use]
    pub const fn client(&self) -> &SimulationClient<E> {
        &self.client
    }

    /// Frames started.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Loop statistics.
    #[must_use]
    pub const fn stats(&self) -> &RenderLoopStats {
        &self.stats
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &RenderLoopConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_client::{EngineCoordinator, MockEngine};
    use arbor_shared::EntityId;
    use serde_json::json;

    fn tree(id: u32, x: f64, y: f64, size: f64) -> serde_json::Value {
        json!({"id": id, "object_info": {"Tree": {"position": [x, y], "size": size}}})
    }

    #[tokio::test]
    async fn test_frame_sequence() {
        let engine = MockEngine::new()
            .with_snapshot(json!([tree(1, 5.0, 5.0, 10.0)]))
            .with_batch(["hello"]);
        let probe = engine.probe();
        let (client, sender) = EngineCoordinator::start(engine);
        let mut render_loop = RenderLoop::new(client, RenderLoopConfig::default());

        sender.click(5.0, 5.0).unwrap();
        let FrameOutcome::Completed(result) = render_loop.frame().await else {
            panic!("frame did not complete");
        };

        assert_eq!(result.frame_number, 1);
        assert_eq!(result.commands_flushed, 1);
        assert_eq!(result.messages_drained, 1);
        assert_eq!(result.reconcile.created, 1);
        assert!((result.delta - 0.016).abs() < 1e-9);
        assert_eq!(probe.ticks(), 1);
        assert_eq!(probe.drains(), 1);
        assert_eq!(probe.states(), 1);
        assert_eq!(render_loop.feed().entries(), &["hello"]);
    }

    #[tokio::test]
    async fn test_tick_failure_skips_frame() {
        let engine = MockEngine::new()
            .with_snapshot(json!([tree(1, 5.0, 5.0, 10.0)]))
            .fail_tick(1);
        let probe = engine.probe();
        let (client, _) = EngineCoordinator::start(engine);
        let mut render_loop = RenderLoop::new(client, RenderLoopConfig::default());

        assert!(matches!(
            render_loop.frame().await,
            FrameOutcome::TickFailed { frame_number: 1, .. }
        ));
        assert_eq!(probe.drains(), 0);
        assert_eq!(probe.states(), 0);

        assert!(matches!(render_loop.frame().await, FrameOutcome::Completed(_)));
        assert_eq!(render_loop.registry().len(), 1);
        assert_eq!(render_loop.stats().failed_ticks, 1);
        assert_eq!(render_loop.stats().completed_frames, 1);
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_keeps_view() {
        let engine = MockEngine::new()
            .with_snapshot(json!([tree(1, 5.0, 5.0, 10.0)]))
            .with_snapshot(json!("garbage"));
        let (client, _) = EngineCoordinator::start(engine);
        let mut render_loop = RenderLoop::new(client, RenderLoopConfig::default());

        render_loop.frame().await;
        let FrameOutcome::Completed(result) = render_loop.frame().await else {
            panic!("frame did not complete");
        };

        assert_eq!(result.reconcile.live, 1);
        assert_eq!(render_loop.stats().skipped_snapshots, 1);
        assert!(render_loop.registry().get(EntityId(1)).is_some());
    }

    #[tokio::test]
    async fn test_tracked_source() {
        let engine = MockEngine::new().with_position(50.0, 50.0);
        let probe = engine.probe();
        let (client, _) = EngineCoordinator::start(engine);
        let config = RenderLoopConfig {
            source: SnapshotSource::Tracked,
            ..RenderLoopConfig::default()
        };
        let mut render_loop = RenderLoop::new(client, config);

        render_loop.frame().await;

        assert_eq!(probe.states(), 0);
        let handle = render_loop.registry().get(arbor_shared::TRACKED_ENTITY_ID).unwrap();
        assert_eq!(handle.position, (50.0, 50.0));
        assert!((handle.scale - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_disposed_loop_never_touches_engine() {
        let engine = MockEngine::new();
        let probe = engine.probe();
        let (client, _) = EngineCoordinator::start(engine);
        let mut render_loop = RenderLoop::new(client, RenderLoopConfig::default());

        render_loop.dispose_handle().dispose();

        assert_eq!(render_loop.frame().await, FrameOutcome::Disposed);
        assert_eq!(probe.ticks(), 0);
        assert_eq!(probe.drains(), 0);
        assert_eq!(render_loop.registry().pass(), 0);
    }
}
