//! Result type for subdivision operations.

use mesh_types::IndexedMesh;

use crate::params::SubdivisionMethod;

/// Outcome of a subdivision run.
#[derive(Debug, Clone)]
pub struct SubdivisionOutcome {
    /// The subdivided mesh.
    pub mesh: IndexedMesh,
    /// Vertex count before subdivision.
    pub original_vertices: usize,
    /// Face count before subdivision.
    pub original_faces: usize,
    /// Vertex count after subdivision.
    pub final_vertices: usize,
    /// Face count after subdivision.
    pub final_faces: usize,
    /// Iterations performed.
    pub iterations: u32,
    /// Scheme used.
    pub method: SubdivisionMethod,
}

impl std::fmt::Display for SubdivisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} subdivision x{}: {} -> {} faces, {} -> {} vertices",
            self.method,
            self.iterations,
            self.original_faces,
            self.final_faces,
            self.original_vertices,
            self.final_vertices
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_counts() {
        let outcome = SubdivisionOutcome {
            mesh: IndexedMesh::new(),
            original_vertices: 4,
            original_faces: 4,
            final_vertices: 10,
            final_faces: 16,
            iterations: 1,
            method: SubdivisionMethod::Loop,
        };
        let text = outcome.to_string();
        assert!(text.contains("Loop"));
        assert!(text.contains("16"));
    }
}
