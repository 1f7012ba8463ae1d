//! Error types for shape key transfer.

use mesh_shapekey::ShapeKeyError;
use thiserror::Error;

/// Errors that can occur during a shape key transfer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    /// The source mesh has no vertices.
    #[error("source mesh has no vertices")]
    EmptySourceMesh,

    /// The destination mesh has no vertices.
    #[error("destination mesh has no vertices")]
    EmptyDestinationMesh,

    /// The source mesh has no shape keys at all, not even a basis.
    #[error("there are no shape keys in the source mesh")]
    NoSourceShapeKeys,

    /// The search radius increment must be positive.
    #[error("increment radius must be positive, got {0}")]
    InvalidIncrementRadius(f64),

    /// A mesh's world transform cannot be inverted.
    #[error("{mesh} mesh world transform is not invertible")]
    NonInvertibleTransform {
        /// Which mesh carries the singular transform.
        mesh: &'static str,
    },

    /// A shape key's position count disagrees with its mesh's vertex count.
    #[error("shape key \"{name}\" holds {got} positions, expected {expected}")]
    KeyLengthMismatch {
        /// Name of the offending key.
        name: String,
        /// The mesh's vertex count.
        expected: usize,
        /// The key's position count.
        got: usize,
    },

    /// No source vertices were found for a destination vertex, even after
    /// exhausting the radius retry budget.
    #[error(
        "failed to find surrounding vertices for destination vertex {vertex} \
         at shape key \"{key}\"; try increasing the increment radius"
    )]
    UnmatchedVertex {
        /// The destination vertex index that found no correspondence.
        vertex: usize,
        /// The shape key being transferred when the search gave up.
        key: String,
    },

    /// The transfer was cancelled between vertices.
    #[error("transfer cancelled at vertex {vertex}")]
    Cancelled {
        /// The first vertex left unwritten.
        vertex: usize,
    },

    /// A shape key store operation failed.
    #[error(transparent)]
    Store(#[from] ShapeKeyError),
}

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;
