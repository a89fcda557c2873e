//! Per-vertex target sizing fields.

use mesh_metrics::vertex_curvatures;
use mesh_types::IndexedMesh;

use crate::error::RemeshResult;
use crate::params::SizingMode;

/// Computes the per-vertex target edge length.
///
/// Uniform mode fills the target everywhere. Adaptive mode bounds the
/// chordal approximation error `e` against the largest absolute principal
/// curvature: `s = clamp(sqrt(6 * e / k_max - 3 * e^2), min, max)`; flat
/// regions saturate at `max`, tight creases at `min`.
///
/// # Errors
///
/// Propagates curvature analysis failures in adaptive mode.
pub(crate) fn vertex_sizing(mesh: &IndexedMesh, mode: &SizingMode) -> RemeshResult<Vec<f64>> {
    match *mode {
        SizingMode::Uniform { edge_length } => Ok(vec![edge_length; mesh.vertices.len()]),
        SizingMode::Adaptive {
            min_edge_length,
            max_edge_length,
            approx_error,
        } => {
            let curvatures = vertex_curvatures(mesh)?;
            Ok(curvatures
                .max_abs_principal
                .iter()
                .map(|&kappa| {
                    if kappa < 1e-12 {
                        return max_edge_length;
                    }
                    let s2 = 6.0 * approx_error / kappa - 3.0 * approx_error * approx_error;
                    s2.max(0.0)
                        .sqrt()
                        .clamp(min_edge_length, max_edge_length)
                })
                .collect())
        }
    }
}
