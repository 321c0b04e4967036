//! Shared error definitions for agent primitives.

use thiserror::Error;

/// Result alias used throughout the agent runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating agent primitive types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A namespace or capability name failed validation.
    #[error("invalid identifier `{id}`: {reason}")]
    InvalidIdentifier {
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A qualified `namespace.name` reference could not be parsed.
    #[error("invalid capability reference `{reference}`")]
    InvalidReference {
        /// The raw reference string.
        reference: String,
    },

    /// An input shape carried an unknown field type.
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),

    /// Capability definition failed validation.
    #[error("invalid capability: {reason}")]
    InvalidCapability {
        /// Human-readable reason for rejection.
        reason: String,
    },
}
