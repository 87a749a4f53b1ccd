//! # Snapshot Error Types
//!
//! Errors raised while decoding what an engine reports.

use thiserror::Error;

/// A snapshot value that cannot be read as a sequence of records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The value was neither an array nor an object of records.
    #[error("snapshot is not a sequence of entity records (got {0})")]
    NotASequence(&'static str),
}

/// A single record that could not be decoded.
///
/// Never fatal: the record is skipped and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("entity record is not an object")]
    NotAnObject,

    /// The `id` field is missing or not an unsigned 32-bit integer.
    #[error("entity record has no valid id")]
    InvalidId,

    /// The `object_info` field is missing or not a single-key object.
    #[error("entity {id} has no valid object_info")]
    MissingObjectInfo {
        /// Raw identity of the record.
        id: u32,
    },

    /// A recognized variant is missing a field or carries a bad value.
    #[error("entity {id} has an invalid {variant} payload: {reason}")]
    InvalidPayload {
        /// Raw identity of the record.
        id: u32,
        /// Variant tag.
        variant: &'static str,
        /// What was wrong.
        reason: String,
    },
}
