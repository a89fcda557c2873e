//! Self-intersection detection.

use mesh_types::{IndexedMesh, MeshTopology, Point3, Triangle};
use sw_spatial::{KdSplitPolicy, TriangleKdTree};
use tracing::debug;

use crate::error::{MetricsError, MetricsResult};

/// Tolerance for the edge-triangle piercing tests.
const INTERSECT_EPS: f64 = 1e-12;

/// Counts faces that intersect at least one non-adjacent face.
///
/// Candidate pairs come from a KD-tree query over face bounding boxes;
/// pairs sharing a vertex are skipped (they touch by construction). Each
/// offending face is counted once.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyMesh`] for a mesh without faces.
///
/// # Example
///
/// ```
/// use mesh_metrics::count_self_intersecting_faces;
/// use mesh_types::unit_cube;
///
/// assert_eq!(count_self_intersecting_faces(&unit_cube()).unwrap(), 0);
/// ```
pub fn count_self_intersecting_faces(mesh: &IndexedMesh) -> MetricsResult<usize> {
    Ok(self_intersecting_faces(mesh)?.len())
}

/// Returns the indices of all faces intersecting a non-adjacent face.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyMesh`] for a mesh without faces.
pub fn self_intersecting_faces(mesh: &IndexedMesh) -> MetricsResult<Vec<usize>> {
    if mesh.is_empty() {
        return Err(MetricsError::EmptyMesh);
    }
    let tree = TriangleKdTree::build(mesh, KdSplitPolicy::Center)
        .map_err(|_| MetricsError::EmptyMesh)?;

    let mut flagged = vec![false; mesh.face_count()];
    for (f, face) in mesh.faces.iter().enumerate() {
        if flagged[f] {
            continue;
        }
        let tri = mesh.triangle(f);
        for candidate in tree.faces_in_aabb(&tri.aabb()) {
            let g = candidate as usize;
            if g == f || shares_vertex(face, &mesh.faces[g]) {
                continue;
            }
            if triangles_intersect(&tri, &mesh.triangle(g)) {
                flagged[f] = true;
                flagged[g] = true;
            }
        }
    }

    let faces: Vec<usize> = flagged
        .iter()
        .enumerate()
        .filter_map(|(f, &hit)| hit.then_some(f))
        .collect();
    debug!("self-intersection scan: {} offending faces", faces.len());
    Ok(faces)
}

fn shares_vertex(a: &[u32; 3], b: &[u32; 3]) -> bool {
    a.iter().any(|v| b.contains(v))
}

/// Whether two triangles intersect.
///
/// Tests each edge of one triangle for piercing the other, both ways; six
/// segment-triangle tests cover every non-coplanar intersection and the
/// piercing coplanar cases.
#[must_use]
pub fn triangles_intersect(a: &Triangle, b: &Triangle) -> bool {
    let edges_a = [(a.a, a.b), (a.b, a.c), (a.c, a.a)];
    for (p, q) in edges_a {
        if segment_pierces_triangle(&p, &q, b) {
            return true;
        }
    }
    let edges_b = [(b.a, b.b), (b.b, b.c), (b.c, b.a)];
    for (p, q) in edges_b {
        if segment_pierces_triangle(&p, &q, a) {
            return true;
        }
    }
    false
}

/// Möller-Trumbore segment-triangle test with the parameter clamped to
/// the segment range.
fn segment_pierces_triangle(p: &Point3<f64>, q: &Point3<f64>, tri: &Triangle) -> bool {
    let direction = q - p;
    if direction.norm_squared() < INTERSECT_EPS {
        return false;
    }
    let edge1 = tri.b - tri.a;
    let edge2 = tri.c - tri.a;
    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < INTERSECT_EPS {
        return false; // parallel to the plane
    }
    let inv = 1.0 / det;
    let s = p - tri.a;
    let u = inv * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let qvec = s.cross(&edge1);
    let v = inv * direction.dot(&qvec);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    let t = inv * edge2.dot(&qvec);
    (0.0..=1.0).contains(&t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, Vertex};

    #[test]
    fn crossing_triangles_intersect() {
        let a = Triangle::new(
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        let b = Triangle::new(
            Point3::new(0.0, 1.0, -1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, -1.0, 0.0),
        );
        assert!(triangles_intersect(&a, &b));
    }

    #[test]
    fn distant_triangles_do_not_intersect() {
        let a = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let b = Triangle::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 0.0, 5.0),
            Point3::new(0.0, 1.0, 5.0),
        );
        assert!(!triangles_intersect(&a, &b));
    }

    #[test]
    fn cube_is_clean() {
        assert_eq!(count_self_intersecting_faces(&unit_cube()).unwrap(), 0);
    }

    #[test]
    fn pinched_strip_reports_intersections() {
        // A Möbius-like strip folded through itself: a ring of triangles
        // plus one face punched through the middle of the ring wall.
        let mut mesh = unit_cube();
        let base = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex::from_coords(-1.0, 0.1, 0.1));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.1, 0.2));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.3, -1.0));
        mesh.faces.push([base, base + 1, base + 2]);

        let count = count_self_intersecting_faces(&mesh).unwrap();
        // The piercing face and at least one cube wall face are flagged.
        assert!(count >= 2, "only {count} faces flagged");
    }

    #[test]
    fn empty_mesh_rejected() {
        assert!(matches!(
            count_self_intersecting_faces(&IndexedMesh::new()),
            Err(MetricsError::EmptyMesh)
        ));
    }
}
