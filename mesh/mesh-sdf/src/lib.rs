//! Voxelized signed distance field generation.
//!
//! This crate builds a [`sw_spatial::ScalarGrid`] holding the signed
//! distance to the surface of an arbitrary triangle soup:
//!
//! 1. **Frame** - the mesh box is expanded and snapped to cell multiples
//! 2. **Seed** - narrow-band cells get exact point-triangle distances,
//!    via brute force, a KD-tree, or a face-set octree
//! 3. **Sweep** - fast sweeping propagates distances outward; the far
//!    field is pinned to the truncation value
//! 4. **Sign** - voxel flood fill from the grid boundary, or the
//!    angle-weighted pseudonormal test
//! 5. **Blur** - optional 3- or 5-cube box smoothing
//!
//! # Example
//!
//! ```
//! use mesh_sdf::{generate_sdf, DistanceFieldSettings};
//! use mesh_types::{unit_cube, Point3};
//!
//! let settings = DistanceFieldSettings::with_cell_size(0.1)
//!     .with_expansion_factor(0.5)
//!     .with_truncation_value(0.3);
//! let sdf = generate_sdf(&unit_cube(), &settings).unwrap();
//!
//! assert!(sdf.grid.sample(&Point3::origin()) < 0.0); // inside
//! assert!(sdf.grid.sample(&Point3::new(0.7, 0.0, 0.0)) > 0.0); // outside
//! ```
//!
//! # Limitations
//!
//! Voxel flood fill assumes a closed surface: non-watertight meshes can
//! leak sign through gaps wider than one cell. Sign near the surface is
//! accurate to one cell; use `PseudoNormal` where exact near-surface sign
//! matters and winding is consistent.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod blur;
mod error;
mod octree;
mod params;
mod sdf;
mod sign;

pub use error::{SdfError, SdfResult};
pub use params::{
    BlurPostprocessing, DistanceFieldSettings, FieldPreprocessing, SignComputation,
};
pub use sdf::{generate_sdf, DistanceFieldResult};
