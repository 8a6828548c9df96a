//! Content store error types.

use portal_primitives::ContentId;
use r2d2_sqlite::rusqlite;

use crate::versioned::{ContentType, StoreVersion};

/// An error from an operation on a content store.
#[derive(Debug, thiserror::Error)]
pub enum ContentStoreError {
    /// No row matches the content id.
    #[error("content not found: {content_id}")]
    NotFound {
        /// The id that was looked up.
        content_id: ContentId,
    },

    /// The SQL engine failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem failure while opening the store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted data could not be decoded.
    #[error("invalid data: {message}")]
    InvalidData {
        /// What was wrong with the data.
        message: String,
    },

    /// The recorded schema version of a namespace cannot be served by this store.
    #[error("schema mismatch for {content_type}: found {found}, expected {expected}")]
    SchemaMismatch {
        /// Namespace whose table is incompatible.
        content_type: ContentType,
        /// Version string recorded in `store_info`.
        found: String,
        /// Version the store implementation requires.
        expected: StoreVersion,
    },

    /// Construction-time configuration was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        message: String,
    },
}

impl ContentStoreError {
    /// Returns true for failures of the persistence layer itself.
    ///
    /// These are never retried by the store; callers decide.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Pool(_) | Self::Io(_) | Self::InvalidData { .. }
        )
    }

    /// Returns true if the content simply isn't stored.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for content store operations.
pub type ContentStoreResult<T> = Result<T, ContentStoreError>;
