//! Error types for surface evolution.

use thiserror::Error;

/// Result type for evolution operations.
pub type EvolveResult<T> = Result<T, EvolveError>;

/// Errors that can occur during a surface evolution run.
#[derive(Debug, Error)]
pub enum EvolveError {
    /// The input field grid is inconsistent.
    #[error("distance field grid is invalid")]
    InvalidField,

    /// A settings field is out of range.
    #[error("invalid setting {name}: {value}")]
    InvalidSetting {
        /// Name of the offending setting.
        name: &'static str,
        /// Its value.
        value: f64,
    },

    /// The supplied initial surface is unusable.
    #[error("initial surface is empty")]
    EmptyInitialSurface,

    /// The sparse Cholesky factorization failed mid-run.
    ///
    /// Snapshots exported before the failing step remain on disk.
    #[error("linear solve failed at time step {step}: {reason}")]
    SolverFailure {
        /// The failing step index.
        step: u32,
        /// Backend error description.
        reason: String,
    },

    /// Remeshing failed mid-run.
    #[error("remeshing failed at time step {step}: {source}")]
    RemeshFailure {
        /// The failing step index.
        step: u32,
        /// Underlying remeshing error.
        source: mesh_remesh::RemeshError,
    },

    /// Snapshot export failed.
    #[error("snapshot export failed at time step {step}: {source}")]
    ExportFailure {
        /// The failing step index.
        step: u32,
        /// Underlying I/O error.
        source: mesh_io::IoError,
    },
}
