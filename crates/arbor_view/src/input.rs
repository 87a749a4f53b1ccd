//! Pointer input translation.
//!
//! Turns surface-space pointer events into engine commands. Hit testing is
//! central: the registry answers which handle sits under the pointer instead
//! of every handle carrying its own listener.

use arbor_client::{ClientResult, Command, CommandSender};
use arbor_shared::CanvasSize;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::registry::EntityViewRegistry;

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Mouse button pressed.
    MouseDown,
    /// Mouse button released.
    MouseUp,
    /// Finger down.
    TouchStart,
    /// Finger up.
    TouchEnd,
    /// Pointer moved.
    Move,
}

impl PointerKind {
    /// Events that count as a click.
    #[must_use]
    pub const fn is_activation(self) -> bool {
        matches!(self, Self::MouseUp | Self::TouchStart)
    }
}

/// A pointer event in surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event kind.
    pub kind: PointerKind,
    /// X on the surface.
    pub x: f64,
    /// Y on the surface.
    pub y: f64,
}

impl PointerEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }

    /// Mouse release at a point.
    #[must_use]
    pub const fn mouse_up(x: f64, y: f64) -> Self {
        Self::new(PointerKind::MouseUp, x, y)
    }

    /// Touch start at a point.
    #[must_use]
    pub const fn touch_start(x: f64, y: f64) -> Self {
        Self::new(PointerKind::TouchStart, x, y)
    }
}

/// Which activations reach the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitPolicy {
    /// Only activations landing on a handle.
    #[default]
    Handles,
    /// Any activation on the surface.
    Surface,
}

/// Surface → simulation mapping: `sim = surface * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTransform {
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Horizontal offset, simulation units.
    pub offset_x: f64,
    /// Vertical offset, simulation units.
    pub offset_y: f64,
}

impl ViewTransform {
    /// Surface pixels are simulation units.
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Maps a surface point into simulation space.
    #[must_use]
    pub fn to_simulation(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale_x + self.offset_x, y * self.scale_y + self.offset_y)
    }

    /// Maps a simulation point back onto the surface.
    ///
    /// Scales must be non-zero; [`ViewConfig::validate`](crate::ViewConfig::validate)
    /// enforces that for loaded configs.
    #[must_use]
    pub fn to_surface(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.offset_x) / self.scale_x, (y - self.offset_y) / self.scale_y)
    }

    /// True if this is the identity mapping.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Input counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputStats {
    /// Events seen.
    pub events: u64,
    /// Events that were activations.
    pub activations: u64,
    /// Activations turned into commands.
    pub forwarded: u64,
    /// Activations that hit no handle.
    pub missed: u64,
    /// Activations dropped for non-finite coordinates.
    pub rejected: u64,
}

/// Pointer → command translator.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    surface: CanvasSize,
    policy: HitPolicy,
    transform: ViewTransform,
    stats: InputStats,
}

impl InputTranslator {
    /// Creates a translator for a surface.
    #[must_use]
    pub fn new(surface: CanvasSize, policy: HitPolicy, transform: ViewTransform) -> Self {
        Self {
            surface,
            policy,
            transform,
            stats: InputStats::default(),
        }
    }

    /// Translates one event. `None` means nothing reaches the engine.
    pub fn translate(&mut self, event: &PointerEvent, registry: &EntityViewRegistry) -> Option<Command> {
        self.stats.events += 1;
        if !event.kind.is_activation() {
            return None;
        }
        self.stats.activations += 1;

        if !event.x.is_finite() || !event.y.is_finite() {
            warn!(x = event.x, y = event.y, "Dropping pointer event with non-finite coordinates");
            self.stats.rejected += 1;
            return None;
        }

        // Out-of-surface clicks are the engine's business.
        if !self.surface.contains(event.x, event.y) {
            debug!(x = event.x, y = event.y, "Pointer outside surface");
        }

        if self.policy == HitPolicy::Handles {
            // Handles are drawn on the surface, so the raw pointer is what gets tested.
            match registry.hit_test_on_surface(&self.transform, event.x, event.y) {
                Some(id) => trace!(%id, "Pointer hit"),
                None => {
                    self.stats.missed += 1;
                    return None;
                }
            }
        }

        let (x, y) = self.transform.to_simulation(event.x, event.y);
        self.stats.forwarded += 1;
        Some(Command::Click { x, y })
    }

    /// Translates and queues the resulting command.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`](arbor_client::ClientError::Closed) if
    /// the owning client is gone.
    pub fn dispatch(
        &mut self,
        event: &PointerEvent,
        registry: &EntityViewRegistry,
        sender: &CommandSender,
    ) -> ClientResult<Option<Command>> {
        match self.translate(event, registry) {
            Some(command) => {
                sender.submit(command.clone())?;
                Ok(Some(command))
            }
            None => Ok(None),
        }
    }

    /// Counters.
    #[must_use]
    pub const fn stats(&self) -> &InputStats {
        &self.stats
    }

    /// Active hit policy.
    #[must_use]
    pub const fn policy(&self) -> HitPolicy {
        self.policy
    }

    /// Active transform.
    #[must_use]
    pub const fn transform(&self) -> &ViewTransform {
        &self.transform
    }
}
