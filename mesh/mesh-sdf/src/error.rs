//! Error types for SDF generation.

use thiserror::Error;

/// Result type for SDF operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Errors that can occur while building a distance field.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SdfError {
    /// Mesh has no vertices or faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// All faces of the mesh were degenerate.
    #[error("mesh has no usable faces ({degenerate} degenerate faces skipped)")]
    NoUsableFaces {
        /// Number of degenerate faces that were skipped.
        degenerate: usize,
    },

    /// Cell size must be positive and finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    /// Truncation must be positive and finite.
    #[error("truncation value must be positive and finite, got {0}")]
    InvalidTruncation(f64),

    /// Volume expansion factor must be non-negative and finite.
    #[error("volume expansion factor must be non-negative and finite, got {0}")]
    InvalidExpansionFactor(f64),

    /// Propagated grid construction failure.
    #[error("grid construction failed: {0}")]
    Grid(#[from] sw_spatial::SpatialError),
}
