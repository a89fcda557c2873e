//! Error types for spatial operations.

use thiserror::Error;

/// Result type for spatial operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Errors that can occur during grid and query-structure construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// The grid cell size must be positive and finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    /// The bounding box is inverted or degenerate.
    #[error("invalid bounding box: extent {0} along its shortest axis")]
    InvalidBounds(f64),

    /// Grid dimensions disagree between two grids that must share a shape.
    #[error("grid dimension mismatch: {expected:?} vs {got:?}")]
    DimensionMismatch {
        /// Dimensions of the reference grid.
        expected: (usize, usize, usize),
        /// Dimensions of the offending grid.
        got: (usize, usize, usize),
    },

    /// A KD-tree was built over an empty face set.
    #[error("cannot build a KD-tree over an empty face set")]
    EmptyFaceSet,
}
