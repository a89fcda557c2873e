//! Error types for mesh analysis.

use thiserror::Error;

/// Result type for mesh analysis operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors that can occur during mesh analysis.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Mesh has no vertices or faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// The requested metric name is not in the registry.
    #[error("unknown metric: {0:?}")]
    UnknownMetric(String),

    /// Property storage rejected the computed vector.
    #[error("property length mismatch for {name:?}: {len} values for {expected} vertices")]
    PropertyMismatch {
        /// Property name.
        name: String,
        /// Length of the computed vector.
        len: usize,
        /// Expected vertex count.
        expected: usize,
    },
}
