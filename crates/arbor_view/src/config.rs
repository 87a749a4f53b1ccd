//! # View Configuration
//!
//! Loaded once at startup from TOML. Every field is optional; missing fields
//! fall back to the arena preset.
//!
//! ```toml
//! canvas_width = 160
//! canvas_height = 144
//! snapshot = "tracked"
//! vanished = "retain"
//! hit_policy = "surface"
//!
//! [transform]
//! scale_x = 1.0
//! scale_y = 1.0
//! ```

use std::path::Path;
use std::time::Duration;

use arbor_shared::{CanvasSize, ARENA_CANVAS, BASE_FOOTPRINT, DEFAULT_TICK_INTERVAL_MS, HANDHELD_CANVAS};
use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};
use crate::input::{HitPolicy, InputTranslator, ViewTransform};
use crate::registry::{RegistryConfig, VanishedPolicy};
use crate::render_loop::{RenderLoopConfig, SnapshotSource};

/// Everything a host needs to build a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Surface width in pixels.
    pub canvas_width: u32,
    /// Surface height in pixels.
    pub canvas_height: u32,
    /// Interval between frames.
    pub tick_interval_ms: u64,
    /// Frame budget in microseconds.
    pub frame_budget_us: u32,
    /// Base texture side length.
    pub texture_size: f64,
    /// Snapshot source.
    pub snapshot: SnapshotSource,
    /// Vanished-identity policy.
    pub vanished: VanishedPolicy,
    /// Which activations reach the engine.
    pub hit_policy: HitPolicy,
    /// Surface → simulation mapping.
    pub transform: ViewTransform,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::arena()
    }
}

impl ViewConfig {
    /// 500×400 multi-entity surface fed by full snapshots.
    #[must_use]
    pub fn arena() -> Self {
        Self {
            canvas_width: ARENA_CANVAS.width,
            canvas_height: ARENA_CANVAS.height,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            frame_budget_us: 16_666,
            texture_size: BASE_FOOTPRINT,
            snapshot: SnapshotSource::Full,
            vanished: VanishedPolicy::Retain,
            hit_policy: HitPolicy::Handles,
            transform: ViewTransform::IDENTITY,
        }
    }

    /// 160×144 single-entity surface fed by the tracked accessors.
    #[must_use]
    pub fn handheld() -> Self {
        Self {
            canvas_width: HANDHELD_CANVAS.width,
            canvas_height: HANDHELD_CANVAS.height,
            snapshot: SnapshotSource::Tracked,
            hit_policy: HitPolicy::Surface,
            ..Self::arena()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] on bad TOML and
    /// [`ViewError::InvalidConfig`] if validation fails.
    pub fn from_toml_str(source: &str) -> ViewResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ViewResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects values no view can run with.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> ViewResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ViewError::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ViewError::InvalidConfig("tick_interval_ms must be positive".into()));
        }
        if !self.texture_size.is_finite() || self.texture_size <= 0.0 {
            return Err(ViewError::InvalidConfig(format!(
                "texture_size must be finite and positive, got {}",
                self.texture_size
            )));
        }
        let t = &self.transform;
        if ![t.scale_x, t.scale_y, t.offset_x, t.offset_y].iter().all(|v| v.is_finite()) {
            return Err(ViewError::InvalidConfig("transform must be finite".into()));
        }
        if t.scale_x.abs() < f64::EPSILON || t.scale_y.abs() < f64::EPSILON {
            return Err(ViewError::InvalidConfig("transform scales must be non-zero".into()));
        }
        Ok(())
    }

    /// Surface size.
    #[must_use]
    pub const fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }

    /// Frame interval.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Registry settings.
    #[must_use]
    pub const fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            texture_size: self.texture_size,
            vanished: self.vanished,
        }
    }

    /// Render loop settings.
    #[must_use]
    pub const fn render_loop_config(&self) -> RenderLoopConfig {
        RenderLoopConfig {
            nominal_delta: self.tick_interval(),
            frame_budget_us: self.frame_budget_us,
            source: self.snapshot,
            registry: self.registry_config(),
        }
    }

    /// Input translator for this surface.
    #[must_use]
    pub fn translator(&self) -> InputTranslator {
        InputTranslator::new(self.canvas(), self.hit_policy, self.transform)
    }
}
