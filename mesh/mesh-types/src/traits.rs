//! Read-only mesh view traits.

use crate::bounds::Aabb;
use crate::mesh::IndexedMesh;

/// Topological counts of a mesh.
///
/// The minimal read-only view the pipeline components need from any mesh
/// source.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangle faces.
    fn face_count(&self) -> usize;

    /// `true` if the mesh has no vertices or no faces.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }
}

/// Spatial extent of a mesh.
pub trait MeshBounds {
    /// Tight axis-aligned bounding box.
    fn bounding_box(&self) -> Aabb;
}

impl MeshTopology for IndexedMesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }
}

impl MeshBounds for IndexedMesh {
    fn bounding_box(&self) -> Aabb {
        self.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_cube;

    #[test]
    fn cube_topology() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        assert!(!cube.is_empty());
        assert!(IndexedMesh::new().is_empty());
    }

    #[test]
    fn cube_bounding_box() {
        let bb = unit_cube().bounding_box();
        assert!((bb.max_extent() - 1.0).abs() < 1e-12);
    }
}
