//! Error types for the Galaxy3D visibility engine
//!
//! Only recoverable API misuse is reported through `Error`. Programming errors
//! (broken invariants inside the container or the traversal) are assertions.

use std::fmt;

/// Result type for Galaxy3D visibility operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D visibility errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Invalid configuration (bin grid, traversal limits, terrain size)
    InvalidConfig(String),

    /// Unknown or stale object key
    InvalidObject(String),

    /// Invalid zone index or zone count reported by a zone manager
    InvalidZone(String),

    /// Operation not allowed in the current state
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidObject(msg) => write!(f, "Invalid object: {}", msg),
            Error::InvalidZone(msg) => write!(f, "Invalid zone: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
