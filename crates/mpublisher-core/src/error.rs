//! Error types for the mDNS publisher
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for publisher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the mDNS publisher
#[derive(Error, Debug)]
pub enum Error {
    /// Could not reach the name-service daemon or fetch the local identity
    #[error("Connection error: {0}")]
    Connect(String),

    /// A daemon round trip failed after the connection was established
    #[error("Transport error: {0}")]
    Transport(String),

    /// The name is already claimed by another host
    #[error("'{name}' is already owned by '{owner}'")]
    OwnershipConflict {
        /// The contested name
        name: String,
        /// The host currently advertising it
        owner: String,
    },

    /// Invalid input (e.g. an unsupported record type)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Name is not tracked by this publisher
    #[error("Not published: {0}")]
    NotFound(String),

    /// A name could not be encoded into wire format
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Network interface inventory errors
    #[error("Interface error: {0}")]
    Interfaces(String),

    /// Record group used outside its lifecycle
    #[error("Record group error: {0}")]
    Group(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a connection error
    pub fn connect(msg: impl Into<String>) -> Self {
        Self::Connect(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an ownership conflict error
    pub fn conflict(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::OwnershipConflict {
            name: name.into(),
            owner: owner.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create an interface inventory error
    pub fn interfaces(msg: impl Into<String>) -> Self {
        Self::Interfaces(msg.into())
    }

    /// Create a record group lifecycle error
    pub fn group(msg: impl Into<String>) -> Self {
        Self::Group(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
