//! Triangle mesh quality analysis.
//!
//! Three families of analysis used across the pipeline:
//!
//! - **Quality metrics** ([`compute_vertex_metric`]): per-triangle shape
//!   quality averaged onto vertices and stored as named vertex
//!   properties. The string registry ([`REGISTERED_METRICS`]) is the
//!   extension point.
//! - **Curvature** ([`vertex_curvatures`]): cotangent mean curvature,
//!   angle-defect Gaussian curvature, and the max-principal estimate that
//!   drives adaptive remeshing sizing.
//! - **Self-intersection** ([`count_self_intersecting_faces`]):
//!   KD-tree-accelerated triangle-triangle scan.
//!
//! # Example
//!
//! ```
//! use mesh_metrics::{compute_vertex_metric, is_metric_registered};
//! use mesh_types::unit_cube;
//!
//! assert!(is_metric_registered("minAngle"));
//! let per_vertex = compute_vertex_metric(&unit_cube(), "minAngle").unwrap();
//! assert_eq!(per_vertex.len(), 8);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

mod curvature;
mod error;
mod intersect;
mod metrics;

pub use curvature::{vertex_curvatures, VertexCurvatures};
pub use error::{MetricsError, MetricsResult};
pub use intersect::{
    count_self_intersecting_faces, self_intersecting_faces, triangles_intersect,
};
pub use metrics::{
    attach_vertex_metric, compute_vertex_metric, is_metric_registered, REGISTERED_METRICS,
};
