//! Midpoint and Loop subdivision.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, MeshAdjacency, MeshTopology, Point3, Vertex};
use nalgebra::Vector3;
use tracing::debug;

use crate::error::{SubdivideError, SubdivideResult};
use crate::ico::split_faces_at_midpoints;
use crate::params::{SubdivideParams, SubdivisionMethod};
use crate::result::SubdivisionOutcome;

/// Subdivides a mesh according to the parameters.
///
/// # Errors
///
/// Returns an error for an empty mesh, a zero iteration count, or when
/// the projected face count exceeds `params.max_faces`.
///
/// # Example
///
/// ```
/// use mesh_subdivide::{subdivide, SubdivideParams};
/// use mesh_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let result = subdivide(&mesh, &SubdivideParams::midpoint()).unwrap();
/// assert_eq!(result.final_faces, 4);
/// ```
pub fn subdivide(
    mesh: &IndexedMesh,
    params: &SubdivideParams,
) -> SubdivideResult<SubdivisionOutcome> {
    if mesh.vertices.is_empty() {
        return Err(SubdivideError::EmptyMesh);
    }
    if mesh.faces.is_empty() {
        return Err(SubdivideError::NoFaces);
    }
    if params.iterations == 0 {
        return Err(SubdivideError::InvalidIterations(0));
    }
    let projected = params.projected_faces(mesh.faces.len());
    if projected > params.max_faces {
        return Err(SubdivideError::MeshTooLarge {
            projected,
            max: params.max_faces,
        });
    }

    let original_vertices = mesh.vertex_count();
    let original_faces = mesh.face_count();

    let mut current = mesh.clone();
    for i in 0..params.iterations {
        current = match params.method {
            SubdivisionMethod::Midpoint => split_faces_at_midpoints(&current),
            SubdivisionMethod::Loop => loop_subdivide_once(&current),
        };
        debug!(
            "subdivision iteration {}: {} vertices, {} faces",
            i + 1,
            current.vertex_count(),
            current.face_count()
        );
    }

    Ok(SubdivisionOutcome {
        original_vertices,
        original_faces,
        final_vertices: current.vertex_count(),
        final_faces: current.face_count(),
        iterations: params.iterations,
        method: params.method,
        mesh: current,
    })
}

/// One iteration of Loop subdivision.
///
/// Even (old) vertices use the Loop valence mask in the interior and the
/// cubic B-spline mask `3/4 v + 1/8 (a + b)` on the boundary. Odd (edge)
/// vertices use `3/8 (a + b) + 1/8 (c + d)` on interior edges and the
/// midpoint on boundary edges.
fn loop_subdivide_once(mesh: &IndexedMesh) -> IndexedMesh {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    // Even vertex positions.
    let mut even = Vec::with_capacity(mesh.vertices.len());
    for (vi, v) in mesh.vertices.iter().enumerate() {
        let vi = vi as u32;
        let ring = adjacency.neighbors(vi);
        if ring.is_empty() {
            even.push(*v);
            continue;
        }

        let position = if adjacency.is_boundary_vertex(vi) {
            let boundary_ring: Vec<u32> = ring
                .iter()
                .copied()
                .filter(|&w| adjacency.is_boundary_edge(vi, w))
                .collect();
            if boundary_ring.len() == 2 {
                let a = mesh.position(boundary_ring[0]).coords;
                let b = mesh.position(boundary_ring[1]).coords;
                Point3::from(v.position.coords * 0.75 + (a + b) * 0.125)
            } else {
                // Non-manifold boundary fan: leave the vertex alone.
                v.position
            }
        } else {
            let n = ring.len() as f64;
            let inner = 0.375 + 0.25 * (2.0 * std::f64::consts::PI / n).cos();
            let beta = (0.625 - inner * inner) / n;
            let ring_sum = ring
                .iter()
                .fold(Vector3::zeros(), |acc, &w| acc + mesh.position(w).coords);
            Point3::from(v.position.coords * (1.0 - n * beta) + ring_sum * beta)
        };
        even.push(Vertex::new(position));
    }

    // Odd vertex positions, one per edge.
    let mut out = IndexedMesh::with_capacity(
        mesh.vertices.len() + adjacency.edge_count(),
        mesh.faces.len() * 4,
    );
    out.vertices = even;

    let mut edge_vertex: HashMap<(u32, u32), u32> = HashMap::new();
    let mut odd = |a: u32, b: u32, out: &mut IndexedMesh| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&i) = edge_vertex.get(&key) {
            return i;
        }
        let pa = mesh.position(a).coords;
        let pb = mesh.position(b).coords;
        let position = match adjacency.faces_for_edge(a, b) {
            Some(fs) if fs.len() == 2 => {
                let c = opposite_vertex(&mesh.faces[fs[0] as usize], a, b);
                let d = opposite_vertex(&mesh.faces[fs[1] as usize], a, b);
                match (c, d) {
                    (Some(c), Some(d)) => {
                        let pc = mesh.position(c).coords;
                        let pd = mesh.position(d).coords;
                        Point3::from((pa + pb) * 0.375 + (pc + pd) * 0.125)
                    }
                    _ => Point3::from((pa + pb) * 0.5),
                }
            }
            _ => Point3::from((pa + pb) * 0.5), // boundary or non-manifold
        };
        let index = out.vertices.len() as u32;
        out.vertices.push(Vertex::new(position));
        edge_vertex.insert(key, index);
        index
    };

    for &[a, b, c] in &mesh.faces {
        let ab = odd(a, b, &mut out);
        let bc = odd(b, c, &mut out);
        let ca = odd(c, a, &mut out);
        out.faces.push([a, ab, ca]);
        out.faces.push([b, bc, ab]);
        out.faces.push([c, ca, bc]);
        out.faces.push([ab, bc, ca]);
    }
    out
}

/// The face corner that is neither `a` nor `b`.
fn opposite_vertex(face: &[u32; 3], a: u32, b: u32) -> Option<u32> {
    face.iter().copied().find(|&v| v != a && v != b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::subdivision_counts;
    use crate::ico::ico_sphere;
    use approx::assert_relative_eq;

    fn tetrahedron() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 1.0));
        mesh.vertices.push(Vertex::from_coords(1.0, -1.0, -1.0));
        mesh.vertices.push(Vertex::from_coords(-1.0, 1.0, -1.0));
        mesh.vertices.push(Vertex::from_coords(-1.0, -1.0, 1.0));
        mesh.faces.extend_from_slice(&[[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]]);
        mesh
    }

    #[test]
    fn empty_and_invalid_inputs() {
        assert!(matches!(
            subdivide(&IndexedMesh::new(), &SubdivideParams::default()),
            Err(SubdivideError::EmptyMesh)
        ));
        let tetra = tetrahedron();
        assert!(matches!(
            subdivide(&tetra, &SubdivideParams::default().with_iterations(0)),
            Err(SubdivideError::InvalidIterations(0))
        ));
        assert!(matches!(
            subdivide(&tetra, &SubdivideParams::default().with_iterations(4).with_max_faces(100)),
            Err(SubdivideError::MeshTooLarge { .. })
        ));
    }

    #[test]
    fn closed_mesh_count_recurrences() {
        // V' = V + E, E' = 2E + 3F, F' = 4F, verified against the built
        // meshes for three midpoint iterations of a tetrahedron.
        let mut mesh = tetrahedron();
        let progression = subdivision_counts(4, 6, 4, 3);
        for step in 1..=3usize {
            mesh = subdivide(&mesh, &SubdivideParams::midpoint()).unwrap().mesh;
            let adjacency = MeshAdjacency::build(&mesh.faces);
            let (v, e, f) = progression[step];
            assert_eq!(mesh.vertex_count() as u64, v);
            assert_eq!(adjacency.edge_count() as u64, e);
            assert_eq!(mesh.face_count() as u64, f);
        }
    }

    #[test]
    fn loop_tetrahedron_six_levels_counts() {
        let params = SubdivideParams::loop_subdivision()
            .with_iterations(6)
            .with_max_faces(20_000);
        let result = subdivide(&tetrahedron(), &params).unwrap();
        let progression = subdivision_counts(4, 6, 4, 6);
        let (v, _, f) = progression[6];
        assert_eq!(result.final_vertices as u64, v);
        assert_eq!(result.final_faces as u64, f);
    }

    #[test]
    fn loop_smooths_toward_sphere() {
        // A Loop-subdivided tetrahedron pulls vertices inward; the result
        // stays strictly inside the circumscribed sphere.
        let result = subdivide(
            &tetrahedron(),
            &SubdivideParams::loop_subdivision().with_iterations(2),
        )
        .unwrap();
        let limit = 3.0f64.sqrt();
        for v in &result.mesh.vertices {
            assert!(v.position.coords.norm() < limit - 1e-6);
        }
    }

    #[test]
    fn boundary_edges_double_per_level() {
        // Delete 5 faces from an ico-sphere to open a boundary, then check
        // E_bd(s) = 2^s * E_bd(0) under midpoint subdivision.
        let mut mesh = ico_sphere(1, 1.0);
        mesh.faces.truncate(mesh.faces.len() - 5);
        mesh.garbage_collect();
        let initial = MeshAdjacency::build(&mesh.faces).boundary_edges().count();
        assert!(initial > 0);

        for s in 1..=3usize {
            mesh = subdivide(&mesh, &SubdivideParams::midpoint()).unwrap().mesh;
            let boundary = MeshAdjacency::build(&mesh.faces).boundary_edges().count();
            assert_eq!(boundary, initial << s);
        }
    }

    #[test]
    fn loop_boundary_vertices_stay_on_straight_boundary() {
        // Two coplanar triangles with a straight boundary segment along
        // the x axis: boundary smoothing keeps those vertices on the line.
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.faces.extend_from_slice(&[[0, 1, 3], [1, 2, 3]]);

        let result = subdivide(&mesh, &SubdivideParams::loop_subdivision()).unwrap();
        // Vertex 1 was interior to the bottom boundary chain; its smoothed
        // position must stay on y = 0.
        assert_relative_eq!(result.mesh.vertices[1].position.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.mesh.vertices[1].position.z, 0.0, epsilon = 1e-12);
    }
}
