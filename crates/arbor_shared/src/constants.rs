//! # Surface & Timing Constants
//!
//! Values both variants of the view were built around.
//!
//! **NOTE:** Runtime overrides live in `arbor_view::ViewConfig`; these are
//! the defaults it falls back to.

use crate::entity::EntityId;

/// A fixed-size drawable area, in view-space pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Creates a canvas size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if the point lies on the surface (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= f64::from(self.width) && y <= f64::from(self.height)
    }
}

// =============================================================================
// SURFACES
// =============================================================================

/// Multi-entity arena surface.
pub const ARENA_CANVAS: CanvasSize = CanvasSize::new(500, 400);

/// Single-entity handheld surface.
pub const HANDHELD_CANVAS: CanvasSize = CanvasSize::new(160, 144);

// =============================================================================
// VISUALS
// =============================================================================

/// Side length of the base sprite texture, in pixels.
///
/// A handle's scale is `BASE_FOOTPRINT / size`, so an entity of size 10
/// renders at scale 1.0.
pub const BASE_FOOTPRINT: f64 = 10.0;

/// Identity given to the single tracked entity exposed through `x()` / `y()`.
pub const TRACKED_ENTITY_ID: EntityId = EntityId(0);

// =============================================================================
// TIMING
// =============================================================================

/// Default interval between frames of the tick driver (~60 Hz).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
