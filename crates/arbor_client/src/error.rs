//! # Client Error Types

use arbor_shared::SnapshotError;
use thiserror::Error;

/// Failures reported by an engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine refused to advance.
    #[error("tick rejected: {0}")]
    TickRejected(String),

    /// The engine cannot be reached or has shut down.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`SimulationClient`](crate::SimulationClient) and
/// [`CommandSender`](crate::CommandSender).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The engine failed an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine reported state that is not a snapshot.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The owning client is gone; queued commands can no longer be delivered.
    #[error("command queue closed")]
    Closed,
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
