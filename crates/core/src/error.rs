//! Error taxonomy for weftdb.
//!
//! Configuration-time problems (unknown entry types, duplicate
//! relationship definitions) are fatal and surface as `Err` during
//! bootstrap. Runtime refusals such as cardinality conflicts are value
//! results on the operations themselves, never errors.

use thiserror::Error;

/// Result alias used across the workspace.
pub type WeftResult<T> = Result<T, WeftError>;

/// Error type for weftdb operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeftError {
    /// A relationship definition referenced an entry type that was never
    /// registered.
    #[error("unknown entry type '{name}'")]
    InvalidEntryType { name: String },

    /// A relationship with the same unordered type set and name is
    /// already defined.
    #[error("relationship already defined for {key}")]
    DuplicateRelationship { key: String },

    /// Malformed caller input.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Underlying SQLite failure.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl WeftError {
    /// Create an InvalidEntryType error.
    pub fn invalid_entry_type(name: impl Into<String>) -> Self {
        Self::InvalidEntryType { name: name.into() }
    }

    /// Create a DuplicateRelationship error.
    pub fn duplicate_relationship(key: impl std::fmt::Display) -> Self {
        Self::DuplicateRelationship {
            key: key.to_string(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a Storage error.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }
}
