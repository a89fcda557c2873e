//! Core mesh types for the shrinkwrap workspace.
//!
//! This crate provides the foundational types shared by the surface
//! reconstruction pipeline:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices
//! - [`Triangle`] - A concrete triangle with closest-point queries
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`MeshAdjacency`] - Edge and vertex adjacency maps
//! - [`VertexProperties`] - Named per-vertex scalar/vector/flag maps
//!
//! # Units & Coordinates
//!
//! The library is unit-agnostic. All coordinates are `f64`, in a
//! right-handed coordinate system. Face winding is counter-clockwise when
//! viewed from outside; normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, MeshTopology, Point3, Vertex};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::new(Point3::new(0.0, 0.0, 0.0)));
//! mesh.vertices.push(Vertex::new(Point3::new(1.0, 0.0, 0.0)));
//! mesh.vertices.push(Vertex::new(Point3::new(0.5, 1.0, 0.0)));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod adjacency;
mod bounds;
mod mesh;
mod properties;
mod traits;
mod triangle;
mod vertex;

pub use adjacency::MeshAdjacency;
pub use bounds::Aabb;
pub use mesh::{unit_cube, IndexedMesh};
pub use properties::VertexProperties;
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
