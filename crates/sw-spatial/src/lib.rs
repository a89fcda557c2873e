//! Spatial data structures for the shrinkwrap workspace.
//!
//! This crate provides the field grids and acceleration structures the
//! SDF builder and surface evolver are built on:
//!
//! - [`ScalarGrid`] / [`VectorGrid`] - dense lattices over a snapped
//!   world-space box with trilinear sampling and a frozen-cell mask
//! - [`gradient`], [`normalized_gradient`], [`negated_normalized_gradient`] -
//!   central-difference field operators
//! - [`triangle_intersects_box`] - separating-axis triangle/box overlap
//! - [`Ray`] / [`ray_intersects_aabb`] - watertight ray-triangle
//!   intersection (Woop et al. 2013) and the slab box test
//! - [`TriangleKdTree`] - static KD-tree over mesh faces with nearest and
//!   ray queries
//!
//! # Concurrency
//!
//! Grids and trees are owned by one logical component each. After
//! construction a [`TriangleKdTree`] is read-only ([`TriangleKdTree::nearest`]
//! takes `&self`) and safe to query from concurrent readers.
//!
//! # Example
//!
//! ```
//! use mesh_types::{unit_cube, Point3};
//! use sw_spatial::{KdSplitPolicy, TriangleKdTree};
//!
//! let tree = TriangleKdTree::build(&unit_cube(), KdSplitPolicy::Center).unwrap();
//! let (_, d2) = tree.nearest(&Point3::origin()).unwrap();
//! assert!((d2 - 0.25).abs() < 1e-12); // cell center to a cube face
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod error;
mod gradient;
mod grid;
mod kdtree;
mod overlap;
mod raycast;

pub use error::{SpatialError, SpatialResult};
pub use gradient::{gradient, negated_normalized_gradient, normalized_gradient};
pub use grid::{GridDimensions, ScalarGrid, VectorGrid, DEFAULT_SCALAR_INIT};
pub use kdtree::{KdSplitPolicy, TriangleKdTree};
pub use overlap::{triangle_intersects_aabb, triangle_intersects_box};
pub use raycast::{ray_intersects_aabb, Ray};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
