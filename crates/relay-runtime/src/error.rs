//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use relay_core::TransportError;

/// Errors that stop the relay from starting or running.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A connection could not be established at startup.
    #[error("Failed to connect: {0}")]
    Transport(#[from] TransportError),

    /// Shutdown signals could not be installed.
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
