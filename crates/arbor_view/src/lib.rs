//! # ARBOR View
//!
//! The entity-view synchronization and interaction loop.
//!
//! ## Per-frame flow
//!
//! ```text
//! LoopDriver (fixed interval)
//!     └─► RenderLoop::frame
//!           ├─► SimulationClient::flush_commands   ◄── CommandSender ◄── InputTranslator ◄── PointerEvent
//!           ├─► SimulationClient::tick(delta).await
//!           ├─► SimulationClient::get_pending ──► MessageFeed::append
//!           └─► SimulationClient::state       ──► EntityViewRegistry::reconcile
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use arbor_client::EngineCoordinator;
//! use arbor_view::{LoopDriver, RenderLoop, ViewConfig};
//!
//! let config = ViewConfig::arena();
//! let (client, sender) = EngineCoordinator::start(engine);
//! let render_loop = RenderLoop::new(client, config.render_loop_config());
//! let mut driver = LoopDriver::new(render_loop, config.tick_interval());
//! let report = driver.run().await;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod driver;
pub mod error;
pub mod feed;
pub mod input;
pub mod registry;
pub mod render_loop;

pub use config::ViewConfig;
pub use driver::{DisposeHandle, LoopDriver, LoopReport, StopReason};
pub use error::{ViewError, ViewResult};
pub use feed::{FeedStats, MessageFeed};
pub use input::{HitPolicy, InputStats, InputTranslator, PointerEvent, PointerKind, ViewTransform};
pub use registry::{
    EntityViewRegistry, Rect, ReconcileStats, RegistryConfig, VanishedPolicy, VisualHandle,
};
pub use render_loop::{
    FrameOutcome, FrameResult, RenderLoop, RenderLoopConfig, RenderLoopStats, SnapshotSource,
};
