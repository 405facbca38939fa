//! Error types for catalog operations.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while manipulating catalogs and their sources.
///
/// Deleting a key that is not present is deliberately *not* an error
/// (deletion is idempotent); lookups of absent keys are.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A world coordinate was built from a non-finite number.
    #[error("invalid coordinate: {value} is not a finite number")]
    InvalidCoordinate { value: String },

    /// A source with the same key already exists in the store.
    #[error("duplicate source key: {key}")]
    DuplicateKey { key: String },

    /// A catalog with the same cid already exists in the registry.
    #[error("duplicate catalog id: {cid}")]
    DuplicateId { cid: String },

    /// Lookup miss for a source key or catalog id.
    #[error("not found: {what}")]
    NotFound { what: String },
}

impl CatalogError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CatalogError::NotFound { what: what.into() }
    }
}
