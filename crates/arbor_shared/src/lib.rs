//! # ARBOR Shared
//!
//! Types spoken by both sides of the engine boundary.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - `tokio` or any scheduler
//! - anything that draws
//!
//! If you need frame or timer types, put them in `arbor_view`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod entity;
pub mod error;
pub mod snapshot;

pub use constants::{
    CanvasSize, ARENA_CANVAS, BASE_FOOTPRINT, DEFAULT_TICK_INTERVAL_MS, HANDHELD_CANVAS,
    TRACKED_ENTITY_ID,
};
pub use entity::{Entity, EntityId, ObjectInfo, TreeInfo};
pub use error::{RecordError, SnapshotError};
pub use snapshot::{DecodedRecord, Snapshot};
