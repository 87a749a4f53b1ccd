//! # Engine Capability
//!
//! The narrow polling API an engine exposes. The view never sees anything
//! else of it.
//!
//! ```text
//! Engine implements:          Client calls:
//! ┌────────────────────┐      ┌──────────────────────┐
//! │ SimulationEngine   │ ←─── │ SimulationClient<E>  │
//! └────────────────────┘      └──────────────────────┘
//! ```

use std::future::Future;

use serde_json::Value;

use crate::error::EngineError;

/// An opaque simulation reached through polling.
///
/// Implementations are driven from a single task. No method is called while
/// a `tick` completion is outstanding.
pub trait SimulationEngine {
    /// Advances the simulation by `delta` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the engine rejects the step.
    fn tick(&mut self, delta: f64) -> impl Future<Output = Result<(), EngineError>>;

    /// Entity records as of the last completed tick.
    ///
    /// Must be idempotent without an intervening tick.
    fn state(&self) -> Value;

    /// Drains messages emitted since the previous drain.
    fn get_pending(&mut self) -> Vec<String>;

    /// Fire-and-forget click in simulation space.
    fn click(&mut self, x: f64, y: f64);

    /// Fire-and-forget text submission.
    fn send(&mut self, text: &str);

    /// X coordinate of the single tracked entity.
    fn x(&self) -> f64;

    /// Y coordinate of the single tracked entity.
    fn y(&self) -> f64;
}
