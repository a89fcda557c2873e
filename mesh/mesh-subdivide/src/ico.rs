//! Geodesic ico-sphere construction.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Vertex};
use tracing::debug;

/// Vertices of an icosahedron.
const N_ICO_VERTICES: u64 = 12;
/// Edges of an icosahedron.
const N_ICO_EDGES: u64 = 30;

/// Vertex count of an ico-sphere at subdivision level `k`.
///
/// Closed form `(30 * (4^k - 1) + 3 * 12) / 3`, which simplifies to
/// `10 * 4^k + 2`. This count is a contract: the surface evolver derives
/// its stabilization scaling from it.
#[must_use]
pub fn ico_sphere_vertex_count(subdivision: u32) -> u64 {
    (N_ICO_EDGES * (4u64.pow(subdivision) - 1) + 3 * N_ICO_VERTICES) / 3
}

/// Edge count of an ico-sphere at subdivision level `k`: `30 * 4^k`.
#[must_use]
pub fn ico_sphere_edge_count(subdivision: u32) -> u64 {
    N_ICO_EDGES * 4u64.pow(subdivision)
}

/// Face count of an ico-sphere at subdivision level `k`:
/// `2 * (V(k) - 2)` by Euler's formula for a closed genus-0 surface.
#[must_use]
pub fn ico_sphere_face_count(subdivision: u32) -> u64 {
    2 * (ico_sphere_vertex_count(subdivision) - 2)
}

/// Builds a geodesic ico-sphere.
///
/// Starts from a regular icosahedron, splits every face into four at the
/// edge midpoints `subdivision` times, and projects each vertex onto the
/// sphere of the given radius centered at the origin.
///
/// # Example
///
/// ```
/// use mesh_subdivide::{ico_sphere, ico_sphere_vertex_count};
/// use mesh_types::MeshTopology;
///
/// let sphere = ico_sphere(2, 1.0);
/// assert_eq!(sphere.vertex_count() as u64, ico_sphere_vertex_count(2));
/// assert_eq!(sphere.face_count(), 320);
/// ```
#[must_use]
pub fn ico_sphere(subdivision: u32, radius: f64) -> IndexedMesh {
    let t = (1.0 + 5.0f64.sqrt()) / 2.0;

    let mut mesh = IndexedMesh::new();
    for &(x, y, z) in &[
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ] {
        mesh.vertices.push(Vertex::from_coords(x, y, z));
    }
    mesh.faces.extend_from_slice(&[
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ]);

    for _ in 0..subdivision {
        mesh = split_faces_at_midpoints(&mesh);
    }

    // Project onto the sphere.
    for v in &mut mesh.vertices {
        let dir = v.position.coords.normalize();
        v.position = Point3::from(dir * radius);
    }

    debug!(
        "ico-sphere level {}: {} vertices, {} faces",
        subdivision,
        mesh.vertices.len(),
        mesh.faces.len()
    );
    mesh
}

/// One 1-to-4 split of every face, sharing midpoint vertices across edges.
pub(crate) fn split_faces_at_midpoints(mesh: &IndexedMesh) -> IndexedMesh {
    let mut out = IndexedMesh::with_capacity(
        mesh.vertices.len() + mesh.faces.len() * 3 / 2,
        mesh.faces.len() * 4,
    );
    out.vertices = mesh.vertices.clone();

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vertex>| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *midpoints.entry(key).or_insert_with(|| {
            let pa = vertices[a as usize].position;
            let pb = vertices[b as usize].position;
            let index = vertices.len() as u32;
            vertices.push(Vertex::new(Point3::from((pa.coords + pb.coords) * 0.5)));
            index
        })
    };

    for &[a, b, c] in &mesh.faces {
        let ab = midpoint(a, b, &mut out.vertices);
        let bc = midpoint(b, c, &mut out.vertices);
        let ca = midpoint(c, a, &mut out.vertices);
        out.faces.push([a, ab, ca]);
        out.faces.push([b, bc, ab]);
        out.faces.push([c, ca, bc]);
        out.faces.push([ab, bc, ca]);
    }
    out
}
