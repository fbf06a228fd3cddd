//! Storage error taxonomy.
//!
//! Two tiers: [`StorageError::NotFound`] is the expected, client-correctable
//! condition (requested id does not exist). Every other variant wraps a
//! backend failure and propagates unchanged; no retries happen here.

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by every storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record with the requested id exists.
    #[error("thing not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Failed to reach or set up the backing store.
    #[error("connection error: {0}")]
    Connection(String),

    /// A read against the backing store failed.
    #[error("read error: {0}")]
    Read(String),

    /// A write against the backing store failed.
    #[error("write error: {0}")]
    Write(String),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Applying migration scripts failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Anything that does not fit the categories above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Not-found for the given id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Connection failure.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Read failure.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Write failure.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Serialization failure.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Migration failure.
    pub fn migration(msg: impl Into<String>) -> Self {
        Self::Migration(msg.into())
    }

    /// Internal failure.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True only for [`StorageError::NotFound`]. Callers branch on this
    /// instead of matching error messages.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
