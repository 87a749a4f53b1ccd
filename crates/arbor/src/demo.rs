//! # Demo Engine
//!
//! A small in-process engine that honors the polling contract, so the view
//! can run without anything external.
//!
//! - One bouncing tracked entity (id 0) moving at a constant velocity.
//! - A seeded forest of static trees.
//! - Clicks plant a tree at the click point on the next tick.
//! - Sent text is echoed into the pending queue on the next tick.
//! - The tracked position is reported every `report_every` ticks.

use arbor_client::{EngineError, SimulationEngine};
use arbor_shared::{CanvasSize, Entity, Snapshot, ARENA_CANVAS, TRACKED_ENTITY_ID};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Demo engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Bounds the tracked entity bounces inside.
    pub canvas: CanvasSize,
    /// Trees planted at startup.
    pub trees: u32,
    /// Seed for the startup layout and planted sizes.
    pub seed: u64,
    /// Starting position of the tracked entity.
    pub start: (f64, f64),
    /// Velocity of the tracked entity, units per second.
    pub velocity: (f64, f64),
    /// Ticks between position reports. Zero disables them.
    pub report_every: u64,
    /// Smallest tree size.
    pub min_size: f64,
    /// Largest tree size.
    pub max_size: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            canvas: ARENA_CANVAS,
            trees: 8,
            seed: 0x4152_424F_52,
            start: (50.0, 50.0),
            velocity: (50.0, 50.0),
            report_every: 60,
            min_size: 5.0,
            max_size: 15.0,
        }
    }
}

/// In-process engine used by `arbor_demo` and the integration tests.
pub struct DemoEngine {
    config: DemoConfig,
    rng: ChaCha8Rng,
    position: (f64, f64),
    velocity: (f64, f64),
    trees: Vec<Entity>,
    next_id: u32,
    clicks: Vec<(f64, f64)>,
    inbox: Vec<String>,
    pending: Vec<String>,
    ticks: u64,
}

impl DemoEngine {
    /// Creates an engine and lays out its startup forest.
    #[must_use]
    pub fn new(config: DemoConfig) -> Self {
        let mut engine = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            position: config.start,
            velocity: config.velocity,
            trees: Vec::with_capacity(config.trees as usize),
            next_id: TRACKED_ENTITY_ID.raw() + 1,
            clicks: Vec::new(),
            inbox: Vec::new(),
            pending: vec!["Hello!".to_owned()],
            ticks: 0,
            config,
        };

        for _ in 0..engine.config.trees {
            let x = engine.rng.gen_range(0.0..f64::from(engine.config.canvas.width));
            let y = engine.rng.gen_range(0.0..f64::from(engine.config.canvas.height));
            engine.plant(x, y);
        }
        engine
    }

    fn plant(&mut self, x: f64, y: f64) -> u32 {
        let size = if self.config.max_size > self.config.min_size {
            self.rng.gen_range(self.config.min_size..=self.config.max_size)
        } else {
            self.config.min_size
        };
        let id = self.next_id;
        self.next_id += 1;
        self.trees.push(Entity::tree(id, x, y, size));
        id
    }

    /// Moves the tracked entity, reflecting off the canvas edges.
    fn advance(&mut self, delta: f64) {
        let bounds = (
            f64::from(self.config.canvas.width),
            f64::from(self.config.canvas.height),
        );
        self.position.0 += self.velocity.0 * delta;
        self.position.1 += self.velocity.1 * delta;

        if self.position.0 <= 0.0 {
            self.position.0 = 0.1;
            self.velocity.0 = -self.velocity.0;
        } else if self.position.0 >= bounds.0 {
            self.position.0 = bounds.0;
            self.velocity.0 = -self.velocity.0;
        }
        if self.position.1 <= 0.0 {
            self.position.1 = 0.1;
            self.velocity.1 = -self.velocity.1;
        } else if self.position.1 >= bounds.1 {
            self.position.1 = bounds.1;
            self.velocity.1 = -self.velocity.1;
        }
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Trees currently standing, tracked entity excluded.
    #[must_use]
    pub fn trees(&self) -> &[Entity] {
        &self.trees
    }
}

impl Default for DemoEngine {
    fn default() -> Self {
        Self::new(DemoConfig::default())
    }
}

impl SimulationEngine for DemoEngine {
    async fn tick(&mut self, delta: f64) -> Result<(), EngineError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(EngineError::TickRejected(format!("bad delta {delta}")));
        }
        // Completion resolves on a later poll, like a remote engine would.
        tokio::task::yield_now().await;

        self.advance(delta);
        self.ticks += 1;

        for (x, y) in std::mem::take(&mut self.clicks) {
            if self.config.canvas.contains(x, y) {
                let id = self.plant(x, y);
                self.pending.push(format!("Planted tree {id} at ({x:.1}, {y:.1})"));
            } else {
                debug!(x, y, "Click outside canvas ignored");
                self.pending.push(format!("Ignored click at ({x:.1}, {y:.1})"));
            }
        }
        self.pending.append(&mut self.inbox);

        if self.config.report_every > 0 && self.ticks % self.config.report_every == 0 {
            self.pending
                .push(format!("({:.1}, {:.1})", self.position.0, self.position.1));
        }
        trace!(tick = self.ticks, x = self.position.0, y = self.position.1, "Demo tick");
        Ok(())
    }

    fn state(&self) -> Value {
        // Keyed by id like a serialized map; the record's own id stays authoritative.
        let tracked = Snapshot::tracked(self.position.0, self.position.1).into_entities();
        let records: Map<String, Value> = tracked
            .iter()
            .chain(&self.trees)
            .filter_map(|entity| {
                serde_json::to_value(entity)
                    .ok()
                    .map(|record| (entity.id.raw().to_string(), record))
            })
            .collect();
        Value::Object(records)
    }

    fn get_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    fn click(&mut self, x: f64, y: f64) {
        self.clicks.push((x, y));
    }

    fn send(&mut self, text: &str) {
        self.inbox.push(text.to_owned());
    }

    fn x(&self) -> f64 {
        self.position.0
    }

    fn y(&self) -> f64 {
        self.position.1
    }
}
