//! Per-triangle quality metrics averaged onto vertices.
//!
//! Each registered metric computes one scalar per triangle; a vertex gets
//! the mean over its incident triangles, written as a named vertex scalar
//! property. The registry is the sole extension point: adding a metric
//! means adding a name and a per-triangle function here.

use mesh_types::{IndexedMesh, MeshTopology, Triangle, VertexProperties};

use crate::error::{MetricsError, MetricsResult};

/// Per-triangle metric function: `None` for degenerate triangles, which
/// are excluded from vertex averaging.
type TriMetricFn = fn(&Triangle) -> Option<f64>;

/// Names of all registered metrics.
///
/// - `minAngle`: range `[0, pi/3]`, preferred `[pi/6, pi/3]`
/// - `maxAngle`: range `[pi/3, pi]`, preferred `[pi/3, pi/2]`
/// - `jacobianConditionNumber`: range `[1, inf)`, preferred `[1, 1.3]`
/// - `equilateralJacobianCondition`: range `[1, inf)`, preferred `[1, 1.3]`
/// - `stiffnessMatrixConditioning`: range `[1, inf)`, 1 for equilateral
pub const REGISTERED_METRICS: [&str; 5] = [
    "minAngle",
    "maxAngle",
    "jacobianConditionNumber",
    "equilateralJacobianCondition",
    "stiffnessMatrixConditioning",
];

/// Looks a metric function up by name.
fn metric_function(name: &str) -> Option<TriMetricFn> {
    match name {
        "minAngle" => Some(triangle_min_angle),
        "maxAngle" => Some(triangle_max_angle),
        "jacobianConditionNumber" => Some(triangle_jacobian_condition),
        "equilateralJacobianCondition" => Some(triangle_equilateral_jacobian_condition),
        "stiffnessMatrixConditioning" => Some(triangle_stiffness_conditioning),
        _ => None,
    }
}

/// Whether a metric with this name is registered.
#[must_use]
pub fn is_metric_registered(name: &str) -> bool {
    metric_function(name).is_some()
}

/// Computes a registered metric, averaged per vertex.
///
/// Vertices without a non-degenerate incident triangle get `0.0`.
///
/// # Errors
///
/// Returns [`MetricsError::UnknownMetric`] for an unregistered name and
/// [`MetricsError::EmptyMesh`] for a mesh without faces.
///
/// # Example
///
/// ```
/// use mesh_metrics::compute_vertex_metric;
/// use mesh_types::unit_cube;
///
/// let values = compute_vertex_metric(&unit_cube(), "minAngle").unwrap();
/// assert_eq!(values.len(), 8);
/// assert!(values.iter().all(|v| *v > 0.0));
/// ```
pub fn compute_vertex_metric(mesh: &IndexedMesh, name: &str) -> MetricsResult<Vec<f64>> {
    let function =
        metric_function(name).ok_or_else(|| MetricsError::UnknownMetric(name.to_owned()))?;
    if mesh.is_empty() {
        return Err(MetricsError::EmptyMesh);
    }

    let mut sums = vec![0.0f64; mesh.vertex_count()];
    let mut counts = vec![0u32; mesh.vertex_count()];
    for (f, face) in mesh.faces.iter().enumerate() {
        if let Some(value) = function(&mesh.triangle(f)) {
            for &v in face {
                sums[v as usize] += value;
                counts[v as usize] += 1;
            }
        }
    }
    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            *sum /= f64::from(count);
        }
    }
    Ok(sums)
}

/// Computes a metric and stores it as the vertex property `v:<name>`.
///
/// # Errors
///
/// Propagates [`compute_vertex_metric`] errors and reports a
/// [`MetricsError::PropertyMismatch`] when `properties` is sized to a
/// different vertex count.
pub fn attach_vertex_metric(
    mesh: &IndexedMesh,
    properties: &mut VertexProperties,
    name: &str,
) -> MetricsResult<()> {
    let values = compute_vertex_metric(mesh, name)?;
    let key = format!("v:{name}");
    let len = values.len();
    properties
        .set_scalars(&key, values)
        .map_err(|rejected| MetricsError::PropertyMismatch {
            name: key,
            len: rejected.len().max(len),
            expected: properties.len(),
        })?;
    Ok(())
}

/// Smallest interior angle.
fn triangle_min_angle(tri: &Triangle) -> Option<f64> {
    non_degenerate(tri)?;
    tri.angles().into_iter().reduce(f64::min)
}

/// Largest interior angle.
fn triangle_max_angle(tri: &Triangle) -> Option<f64> {
    non_degenerate(tri)?;
    tri.angles().into_iter().reduce(f64::max)
}

/// Spectral condition number of the triangle Jacobian.
///
/// The Jacobian maps the unit right reference triangle onto this one; its
/// condition number is `sigma_max / sigma_min` of the 2x2 map in the
/// triangle plane.
fn triangle_jacobian_condition(tri: &Triangle) -> Option<f64> {
    non_degenerate(tri)?;
    let e1 = tri.b - tri.a;
    let e2 = tri.c - tri.a;
    condition_from_gram(e1.dot(&e1), e1.dot(&e2), e2.dot(&e2))
}

/// Spectral condition number of the equilateral-reference Jacobian.
///
/// Same as [`triangle_jacobian_condition`] with the reference taken as the
/// unit equilateral triangle, so a perfectly equilateral face scores 1.
fn triangle_equilateral_jacobian_condition(tri: &Triangle) -> Option<f64> {
    non_degenerate(tri)?;
    let e1 = tri.b - tri.a;
    let e2 = tri.c - tri.a;
    // J' = J * W^-1 with W = [[1, 1/2], [0, sqrt(3)/2]]; its Gram matrix
    // follows from G' = W^-T G W^-1.
    let g11 = e1.dot(&e1);
    let g12 = e1.dot(&e2);
    let g22 = e2.dot(&e2);
    let s = 3.0f64.sqrt();
    let a = g11;
    let b = (-g11 + 2.0 * g12) / s;
    let c = (g11 - 4.0 * g12 + 4.0 * g22) / 3.0;
    condition_from_gram(a, b, c)
}

/// Stiffness matrix conditioning of the linear FEM element
/// (Shewchuk 2002): `(l0^2 + l1^2 + l2^2) / (4 * sqrt(3) * area)`,
/// normalized so the equilateral triangle scores 1.
fn triangle_stiffness_conditioning(tri: &Triangle) -> Option<f64> {
    let area = tri.area();
    if area < 1e-15 {
        return None;
    }
    let [l0, l1, l2] = tri.edge_lengths();
    Some((l0 * l0 + l1 * l1 + l2 * l2) / (4.0 * 3.0f64.sqrt() * area))
}

/// Condition number from a 2x2 Gram matrix `[[a, b], [b, c]]`.
fn condition_from_gram(a: f64, b: f64, c: f64) -> Option<f64> {
    let trace = a + c;
    let det = a * c - b * b;
    if det <= 0.0 {
        return None;
    }
    let disc = (trace * trace - 4.0 * det).max(0.0).sqrt();
    let lambda_max = (trace + disc) * 0.5;
    let lambda_min = (trace - disc) * 0.5;
    if lambda_min <= 0.0 {
        return None;
    }
    Some((lambda_max / lambda_min).sqrt())
}

/// `Some(())` for triangles with usable area.
fn non_degenerate(tri: &Triangle) -> Option<()> {
    (tri.area() >= 1e-15).then_some(())
}
