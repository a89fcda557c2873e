//! Cotangent (Voronoi) Laplacian stencils.

use mesh_types::{IndexedMesh, MeshAdjacency};
use tracing::warn;

/// Implicit Laplacian stencil at one vertex.
///
/// `weights` holds the positive off-diagonal magnitudes `lambda_vw`;
/// `weight_sum` is their total. The system assembly places
/// `1 + tau * eps * weight_sum` on the diagonal and
/// `-tau * eps * lambda_vw` off-diagonal.
#[derive(Debug, Clone, Default)]
pub(crate) struct LaplacianStencil {
    pub neighbors: Vec<(u32, f64)>,
    pub weight_sum: f64,
}

/// Builds cotangent Laplacian stencils for every vertex.
///
/// Weights are `(cot(alpha) + cot(beta)) / (2 * A_v)` with `A_v` the
/// barycentric co-volume. Negative cotangent sums (obtuse one-rings) are
/// clamped to zero so the assembled system stays diagonally dominant and
/// symmetric positive definite.
pub(crate) fn cotangent_stencils(
    mesh: &IndexedMesh,
    adjacency: &MeshAdjacency,
) -> Vec<LaplacianStencil> {
    let n = mesh.vertices.len();

    let mut covolume = vec![0.0f64; n];
    for (f, face) in mesh.faces.iter().enumerate() {
        let third = mesh.triangle(f).area() / 3.0;
        for &v in face {
            covolume[v as usize] += third;
        }
    }

    let mut clamped = 0usize;
    let mut stencils = Vec::with_capacity(n);
    for v in 0..n as u32 {
        let area = covolume[v as usize];
        if area < 1e-15 {
            stencils.push(LaplacianStencil::default());
            continue;
        }

        let mut neighbors = Vec::with_capacity(adjacency.valence(v));
        let mut weight_sum = 0.0;
        for &w in adjacency.neighbors(v) {
            let Some(fs) = adjacency.faces_for_edge(v, w) else {
                continue;
            };
            let mut cot_sum = 0.0;
            for &f in fs {
                if let Some(u) = mesh.faces[f as usize].iter().copied().find(|&c| c != v && c != w)
                {
                    cot_sum += cotangent_at(mesh, u, v, w);
                }
            }
            if cot_sum < 0.0 {
                cot_sum = 0.0;
                clamped += 1;
            }
            let weight = cot_sum / (2.0 * area);
            weight_sum += weight;
            neighbors.push((w, weight));
        }
        stencils.push(LaplacianStencil {
            neighbors,
            weight_sum,
        });
    }

    if clamped > 0 {
        warn!("clamped {clamped} negative cotangent weights to keep the system SPD");
    }
    stencils
}

/// Cotangent of the angle at `u` opposite the edge `(v, w)`.
fn cotangent_at(mesh: &IndexedMesh, u: u32, v: u32, w: u32) -> f64 {
    let pu = mesh.position(u);
    let a = mesh.position(v) - pu;
    let b = mesh.position(w) - pu;
    let cross = a.cross(&b).norm();
    if cross < 1e-15 {
        return 0.0;
    }
    a.dot(&b) / cross
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_subdivide::ico_sphere;
    use mesh_types::Vector3;

    #[test]
    fn stencil_weights_are_nonnegative() {
        let sphere = ico_sphere(2, 1.0);
        let adjacency = MeshAdjacency::build(&sphere.faces);
        for stencil in cotangent_stencils(&sphere, &adjacency) {
            for (_, weight) in &stencil.neighbors {
                assert!(*weight >= 0.0);
            }
            assert_relative_eq!(
                stencil.weight_sum,
                stencil.neighbors.iter().map(|(_, w)| w).sum::<f64>(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn sphere_laplacian_approximates_mean_curvature_normal() {
        // On a unit sphere, sum_w lambda_vw (x_w - x_v) ~ -2 H n = -2 x_v.
        let sphere = ico_sphere(3, 1.0);
        let adjacency = MeshAdjacency::build(&sphere.faces);
        let stencils = cotangent_stencils(&sphere, &adjacency);

        let mut total_error = 0.0;
        for (v, stencil) in stencils.iter().enumerate() {
            let pv = sphere.vertices[v].position;
            let mut lap = Vector3::zeros();
            for &(w, weight) in &stencil.neighbors {
                lap += (sphere.vertices[w as usize].position - pv) * weight;
            }
            total_error += (lap + pv.coords * 2.0).norm();
        }
        let mean_error = total_error / stencils.len() as f64;
        assert!(mean_error < 0.3, "mean Laplacian error {mean_error}");
    }
}
