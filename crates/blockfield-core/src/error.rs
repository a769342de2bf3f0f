//! Error types for the runtime.

use thiserror::Error;

/// Runtime-wide error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A world position could not be mapped to a chunk.
    #[error("Non-finite world position: x={x}, z={z}")]
    NonFinitePosition { x: f32, z: f32 },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
