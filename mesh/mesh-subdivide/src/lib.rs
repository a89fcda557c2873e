//! Ico-sphere construction and triangle mesh subdivision.
//!
//! The surface evolver seeds its evolving surface from [`ico_sphere`];
//! the vertex count contract [`ico_sphere_vertex_count`] feeds its
//! stabilization scaling. [`subdivide`] provides midpoint and Loop
//! subdivision with boundary rules, and [`subdivision_counts`] /
//! [`boundary_edge_count`] give the closed-form count progressions used
//! by the tests and by capacity planning.
//!
//! # Example
//!
//! ```
//! use mesh_subdivide::{ico_sphere, ico_sphere_vertex_count};
//! use mesh_types::MeshTopology;
//!
//! let sphere = ico_sphere(3, 0.5);
//! assert_eq!(sphere.vertex_count() as u64, ico_sphere_vertex_count(3));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

mod counts;
mod error;
mod ico;
mod params;
mod result;
mod subdivide;

pub use counts::{boundary_edge_count, subdivision_counts};
pub use error::{SubdivideError, SubdivideResult};
pub use ico::{
    ico_sphere, ico_sphere_edge_count, ico_sphere_face_count, ico_sphere_vertex_count,
};
pub use params::{SubdivideParams, SubdivisionMethod};
pub use result::SubdivisionOutcome;
pub use subdivide::subdivide;
