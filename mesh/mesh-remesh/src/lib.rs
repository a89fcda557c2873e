//! Uniform and adaptive isotropic remeshing.
//!
//! Incremental remeshing in the style of Botsch & Kobbelt (2004) and
//! Dunyach et al. (2013): per-iteration edge splits, collapses, flips,
//! tangential relaxation, and optional back-projection onto the input
//! surface, driven by a per-vertex sizing field (uniform or
//! curvature-adaptive).
//!
//! The surface evolver runs this after every implicit time step with
//! `min = sqrt(tau)`, `max = 5 * min`, `approx_error = min`.
//!
//! # Example
//!
//! ```
//! use mesh_remesh::{remesh, RemeshParams};
//! use mesh_types::unit_cube;
//!
//! let params = RemeshParams::uniform(0.4).with_iterations(2).with_projection(false);
//! let output = remesh(&unit_cube(), &params).unwrap();
//! assert!(output.splits > 0);
//! ```
//!
//! # Invariants
//!
//! The triangulation stays manifold, boundary vertices are never moved or
//! collapsed, and feature-locked vertices (dihedral angle above
//! `feature_angle`) are preserved.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

mod error;
mod params;
mod remesh;
mod result;
mod sizing;

pub use error::{RemeshError, RemeshResult};
pub use params::{RemeshParams, SizingMode};
pub use remesh::remesh;
pub use result::{EdgeStatistics, RemeshOutput};
