//! Error types for remeshing.

use thiserror::Error;

/// Result type for remeshing operations.
pub type RemeshResult<T> = Result<T, RemeshError>;

/// Errors that can occur during remeshing.
#[derive(Debug, Error)]
pub enum RemeshError {
    /// Mesh has no vertices.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Mesh has no faces.
    #[error("mesh has no faces")]
    NoFaces,

    /// A sizing length must be positive and finite.
    #[error("invalid sizing length: {0}")]
    InvalidSizing(f64),

    /// Iteration count must be at least 1.
    #[error("invalid iteration count: {0}")]
    InvalidIterations(u32),

    /// Curvature analysis failed.
    #[error("curvature analysis failed: {0}")]
    Curvature(#[from] mesh_metrics::MetricsError),
}
