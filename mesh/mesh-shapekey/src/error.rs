//! Error types for shape key storage.

use thiserror::Error;

/// Errors that can occur when manipulating a shape key store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShapeKeyError {
    /// A key with this name already exists in the store.
    #[error("shape key \"{0}\" already exists")]
    DuplicateKey(String),

    /// No key with this name exists in the store.
    #[error("no shape key named \"{0}\"")]
    UnknownKey(String),

    /// A key's position count does not match the store's vertex count.
    #[error("shape key \"{name}\" holds {got} positions, expected {expected}")]
    PositionCountMismatch {
        /// Name of the offending key.
        name: String,
        /// The store's vertex count.
        expected: usize,
        /// The number of positions supplied.
        got: usize,
    },

    /// A vertex index is out of range for a key.
    #[error("vertex index {index} out of range for shape key \"{name}\" ({len} positions)")]
    VertexOutOfRange {
        /// Name of the key being accessed.
        name: String,
        /// The offending vertex index.
        index: usize,
        /// The key's position count.
        len: usize,
    },
}

/// Result type for shape key storage operations.
pub type ShapeKeyResult<T> = Result<T, ShapeKeyError>;
