//! Indexed triangle mesh.

use nalgebra::{Point3, Vector3};

use crate::bounds::Aabb;
use crate::triangle::Triangle;
use crate::vertex::Vertex;

/// A triangle mesh with indexed vertices.
///
/// Faces are `[u32; 3]` index triplets into `vertices`, wound
/// counter-clockwise when viewed from outside.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    /// Vertex list.
    pub vertices: Vec<Vertex>,
    /// Triangle faces as vertex index triplets.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Creates an empty mesh with reserved capacity.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Builds a mesh from flat position data and face indices.
    ///
    /// `positions` is interpreted as consecutive `(x, y, z)` triples.
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self { vertices, faces }
    }

    /// Position of vertex `v`.
    #[must_use]
    pub fn position(&self, v: u32) -> Point3<f64> {
        self.vertices[v as usize].position
    }

    /// The face at index `f` as a concrete [`Triangle`].
    #[must_use]
    pub fn triangle(&self, f: usize) -> Triangle {
        let [i, j, k] = self.faces[f];
        Triangle::new(self.position(i), self.position(j), self.position(k))
    }

    /// Iterates over all faces as concrete triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).map(|f| self.triangle(f))
    }

    /// Tight bounding box of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Signed volume via the divergence theorem.
    ///
    /// Positive for a closed, outward-wound mesh.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.a.coords.dot(&t.b.coords.cross(&t.c.coords)) / 6.0)
            .sum()
    }

    /// Per-vertex unit normals, weighted by the incident corner angle.
    ///
    /// Angle weighting (Thürmer & Wüthrich) is stable under uneven
    /// triangle sizes, which matters for adaptively remeshed surfaces.
    /// Isolated vertices get the zero vector.
    #[must_use]
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for face in &self.faces {
            let tri = Triangle::new(
                self.position(face[0]),
                self.position(face[1]),
                self.position(face[2]),
            );
            let n = tri.normal();
            if n == Vector3::zeros() {
                continue;
            }
            let angles = tri.angles();
            for (corner, &v) in face.iter().enumerate() {
                normals[v as usize] += n * angles[corner];
            }
        }
        for n in &mut normals {
            if let Some(unit) = n.try_normalize(f64::EPSILON) {
                *n = unit;
            }
        }
        normals
    }

    /// Translates all vertices by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            v.position += offset;
        }
    }

    /// Applies the similarity transform `x -> scale * (x - center)`.
    ///
    /// Used to stabilize the evolution time step; the inverse transform is
    /// `x -> x / scale + center`.
    pub fn transform_similarity(&mut self, scale: f64, center: Point3<f64>) {
        for v in &mut self.vertices {
            v.position = Point3::from((v.position - center) * scale);
        }
    }

    /// Removes faces referencing out-of-range vertices and compacts unused
    /// vertices, remapping face indices.
    ///
    /// This is the indexed-mesh analogue of half-edge garbage collection
    /// after a batch of edge collapses.
    pub fn garbage_collect(&mut self) {
        let n = self.vertices.len() as u32;
        self.faces.retain(|f| f.iter().all(|&v| v < n));

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for face in &self.faces {
            for &v in face {
                if remap[v as usize] == u32::MAX {
                    remap[v as usize] = kept.len() as u32;
                    kept.push(self.vertices[v as usize]);
                }
            }
        }
        for face in &mut self.faces {
            for v in face.iter_mut() {
                *v = remap[*v as usize];
            }
        }
        self.vertices = kept;
    }
}

/// Builds a unit cube spanning `[-0.5, 0.5]^3`, triangulated into 12 faces.
///
/// Wound counter-clockwise viewed from outside, so the signed volume is
/// `+1`.
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity(8, 12);
    for z in [-0.5, 0.5] {
        for y in [-0.5, 0.5] {
            for x in [-0.5, 0.5] {
                mesh.vertices.push(Vertex::from_coords(x, y, z));
            }
        }
    }
    // Vertex index = x + 2y + 4z over the {0,1} lattice.
    mesh.faces.extend_from_slice(&[
        [0, 2, 1],
        [1, 2, 3], // bottom (z = -0.5)
        [4, 5, 6],
        [5, 7, 6], // top (z = 0.5)
        [0, 1, 4],
        [1, 5, 4], // front (y = -0.5)
        [2, 6, 3],
        [3, 6, 7], // back (y = 0.5)
        [0, 4, 2],
        [2, 4, 6], // left (x = -0.5)
        [1, 3, 5],
        [3, 7, 5], // right (x = 0.5)
    ]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_counts_and_volume() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 12);
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn cube_bounds() {
        let b = unit_cube().bounds();
        assert_relative_eq!(b.min_extent(), 1.0, epsilon = 1e-12);
        assert_relative_eq!((b.center() - Point3::origin()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn cube_vertex_normals_point_outward() {
        let cube = unit_cube();
        let normals = cube.vertex_normals();
        for (v, n) in cube.vertices.iter().zip(&normals) {
            // Corner normals of a cube point away from the center.
            assert!(n.dot(&v.position.coords) > 0.0);
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn transform_similarity_roundtrip() {
        let mut mesh = unit_cube();
        let center = Point3::new(0.5, -1.0, 2.0);
        mesh.translate(center.coords);
        let original = mesh.clone();

        mesh.transform_similarity(3.0, center);
        mesh.transform_similarity(1.0 / 3.0, Point3::origin());
        mesh.translate(center.coords);

        for (a, b) in mesh.vertices.iter().zip(&original.vertices) {
            assert_relative_eq!((a.position - b.position).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn garbage_collect_compacts() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(9.0, 9.0, 9.0)); // unreferenced
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 2, 3]);

        mesh.garbage_collect();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn from_raw_chunks() {
        let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces.len(), 1);
        assert_relative_eq!(mesh.triangle(0).area(), 0.5);
    }
}
