//! error types for grantkeeper-types

use thiserror::Error;

/// errors that can occur in grantkeeper-types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// role is not one of the known roles
    #[error("invalid role: {0:?}")]
    InvalidRole(String),

    /// text is not a valid grant identifier
    #[error("invalid grant identifier: {0:?}")]
    InvalidGrantId(String),

    /// record carries no expiry annotation
    #[error("grant has no expiry annotation")]
    MissingExpiry,

    /// expiry annotation is present but unparseable
    #[error("invalid expiry {value:?}: {reason}")]
    InvalidExpiry {
        /// the raw annotation text.
        value: String,
        /// why parsing failed.
        reason: String,
    },
}
