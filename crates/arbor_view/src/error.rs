//! # View Error Types

use arbor_client::ClientError;
use thiserror::Error;

/// Errors raised while setting up or running a view.
#[derive(Error, Debug)]
pub enum ViewError {
    /// The configuration file is not valid TOML for [`ViewConfig`](crate::ViewConfig).
    #[error("failed to parse view config: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read view config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration parsed but makes no sense.
    #[error("invalid view config: {0}")]
    InvalidConfig(String),

    /// The engine boundary failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
