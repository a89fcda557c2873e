//! Error types for subdivision operations.

use thiserror::Error;

/// Result type for subdivision operations.
pub type SubdivideResult<T> = Result<T, SubdivideError>;

/// Errors that can occur during mesh subdivision.
#[derive(Debug, Error)]
pub enum SubdivideError {
    /// Mesh has no vertices.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Mesh has no faces.
    #[error("mesh has no faces")]
    NoFaces,

    /// Iteration count must be at least 1.
    #[error("invalid iteration count: {0}")]
    InvalidIterations(u32),

    /// The subdivided mesh would exceed the configured face limit.
    #[error("subdivision would produce {projected} faces (limit {max})")]
    MeshTooLarge {
        /// Projected face count.
        projected: usize,
        /// Configured limit.
        max: usize,
    },
}
