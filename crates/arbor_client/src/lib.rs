//! # ARBOR Client
//!
//! Everything that touches the engine goes through this crate.
//!
//! ## Ownership
//!
//! ```text
//!   EngineCoordinator::start(engine)
//!            │
//!            ├──► SimulationClient<E>   (exactly one, owned by the render loop)
//!            │        tick / state / get_pending / click / send / x / y
//!            │
//!            └──► CommandSender         (cloneable, handed to input code)
//!                     click / send  ──►  queue  ──►  flushed between ticks
//! ```
//!
//! The engine is moved into the client, so nothing else can reach it.
//! `tick` borrows the client mutably until its completion resolves, which
//! makes a second outstanding tick unrepresentable.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod mock;

pub use client::{ClientStats, SimulationClient};
pub use coordinator::{Command, CommandSender, EngineCoordinator};
pub use engine::SimulationEngine;
pub use error::{ClientError, ClientResult, EngineError};
pub use mock::{MockEngine, MockProbe};
