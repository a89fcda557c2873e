//! Discrete per-vertex curvature estimates.

use mesh_types::{IndexedMesh, MeshAdjacency, MeshTopology, Vector3};

use crate::error::{MetricsError, MetricsResult};

/// Per-vertex curvature estimates.
#[derive(Debug, Clone)]
pub struct VertexCurvatures {
    /// Mean curvature magnitude `|kappa_H|`.
    pub mean: Vec<f64>,
    /// Gaussian curvature from the angle defect.
    pub gaussian: Vec<f64>,
    /// `max(|kappa_1|, |kappa_2|)`, the sizing input for adaptive
    /// remeshing.
    pub max_abs_principal: Vec<f64>,
}

/// Computes discrete curvatures at every vertex.
///
/// Mean curvature comes from the cotangent Laplacian
/// (`kappa_H = |K| / 2` with `K` the mean curvature normal over the
/// barycentric co-volume), Gaussian curvature from the angle defect, and
/// the principal curvatures from `kappa_H +- sqrt(kappa_H^2 - kappa_G)`.
///
/// Boundary vertices use the interior formulas over their partial ring;
/// they are consumers' responsibility to lock or ignore.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyMesh`] for a mesh without faces.
///
/// # Example
///
/// ```
/// use mesh_metrics::vertex_curvatures;
/// use mesh_types::unit_cube;
///
/// let curvatures = vertex_curvatures(&unit_cube()).unwrap();
/// assert_eq!(curvatures.mean.len(), 8);
/// ```
pub fn vertex_curvatures(mesh: &IndexedMesh) -> MetricsResult<VertexCurvatures> {
    if mesh.is_empty() {
        return Err(MetricsError::EmptyMesh);
    }
    let n = mesh.vertex_count();
    let adjacency = MeshAdjacency::build(&mesh.faces);

    // Barycentric co-volume area and angle sums.
    let mut covolume = vec![0.0f64; n];
    let mut angle_sum = vec![0.0f64; n];
    for (f, face) in mesh.faces.iter().enumerate() {
        let tri = mesh.triangle(f);
        let third = tri.area() / 3.0;
        let angles = tri.angles();
        for (corner, &v) in face.iter().enumerate() {
            covolume[v as usize] += third;
            angle_sum[v as usize] += angles[corner];
        }
    }

    // Mean curvature normal via cotangent weights.
    let mut mean = vec![0.0f64; n];
    let mut gaussian = vec![0.0f64; n];
    let mut max_abs_principal = vec![0.0f64; n];

    for v in 0..n as u32 {
        let area = covolume[v as usize];
        if area < 1e-15 {
            continue;
        }

        let mut curvature_normal = Vector3::zeros();
        for &w in adjacency.neighbors(v) {
            let Some(fs) = adjacency.faces_for_edge(v, w) else {
                continue;
            };
            let mut cot_sum = 0.0;
            for &f in fs {
                if let Some(u) = opposite_corner(&mesh.faces[f as usize], v, w) {
                    cot_sum += cotangent(mesh, u, v, w);
                }
            }
            curvature_normal += (mesh.position(v) - mesh.position(w)) * cot_sum;
        }
        curvature_normal /= 2.0 * area;

        let kappa_h = curvature_normal.norm() / 2.0;
        let defect = if adjacency.is_boundary_vertex(v) {
            std::f64::consts::PI - angle_sum[v as usize]
        } else {
            2.0 * std::f64::consts::PI - angle_sum[v as usize]
        };
        let kappa_g = defect / area;

        let disc = (kappa_h * kappa_h - kappa_g).max(0.0).sqrt();
        let kappa_1 = kappa_h + disc;
        let kappa_2 = kappa_h - disc;

        mean[v as usize] = kappa_h;
        gaussian[v as usize] = kappa_g;
        max_abs_principal[v as usize] = kappa_1.abs().max(kappa_2.abs());
    }

    Ok(VertexCurvatures {
        mean,
        gaussian,
        max_abs_principal,
    })
}

/// The corner of `face` that is neither `v` nor `w`.
fn opposite_corner(face: &[u32; 3], v: u32, w: u32) -> Option<u32> {
    face.iter().copied().find(|&c| c != v && c != w)
}

/// Cotangent of the angle at `u` subtending the edge `(v, w)`.
fn cotangent(mesh: &IndexedMesh, u: u32, v: u32, w: u32) -> f64 {
    let pu = mesh.position(u);
    let a = mesh.position(v) - pu;
    let b = mesh.position(w) - pu;
    let cross = a.cross(&b).norm();
    if cross < 1e-15 {
        return 0.0;
    }
    a.dot(&b) / cross
}
