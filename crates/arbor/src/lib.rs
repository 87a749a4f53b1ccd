//! # ARBOR
//!
//! Entity-view synchronization client for opaque, polled simulation engines.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                               ARBOR                                │
//! ├────────────────────────────────────────────────────────────────────┤
//! │                                                                    │
//! │  ┌────────────────┐     ┌──────────────────┐     ┌──────────────┐  │
//! │  │  arbor_shared  │────>│   arbor_client   │────>│  arbor_view  │  │
//! │  │                │     │                  │     │              │  │
//! │  │ • Entity       │     │ • Engine trait   │     │ • Registry   │  │
//! │  │ • Snapshot     │     │ • Single owner   │     │ • Input      │  │
//! │  │ • Constants    │     │ • Command queue  │     │ • Feed       │  │
//! │  └────────────────┘     └──────────────────┘     │ • RenderLoop │  │
//! │                                                  │ • Driver     │  │
//! │                                                  └──────────────┘  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `demo`: in-process engine for running the view without a backend
//! - `telemetry`: log subscriber setup for binaries

#![deny(unsafe_code)]

pub mod demo;
pub mod telemetry;

// Re-export the units
pub use arbor_client as client;
pub use arbor_shared as shared;
pub use arbor_view as view;

// Re-export commonly used types
pub use arbor_client::{
    ClientError, Command, CommandSender, EngineCoordinator, EngineError, SimulationClient,
    SimulationEngine,
};
pub use arbor_shared::{Entity, EntityId, ObjectInfo, Snapshot, TreeInfo};
pub use arbor_view::{
    DisposeHandle, EntityViewRegistry, FrameOutcome, InputTranslator, LoopDriver, LoopReport,
    MessageFeed, PointerEvent, RenderLoop, ViewConfig, ViewError, ViewResult,
};
pub use demo::{DemoConfig, DemoEngine};
