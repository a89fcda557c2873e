//! Result types for remeshing.

use mesh_types::IndexedMesh;

/// Edge length statistics of a mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeStatistics {
    /// Shortest edge.
    pub min_length: f64,
    /// Longest edge.
    pub max_length: f64,
    /// Mean edge length.
    pub mean_length: f64,
    /// Number of distinct edges.
    pub edge_count: usize,
}

/// Outcome of a remeshing run.
#[derive(Debug, Clone)]
pub struct RemeshOutput {
    /// The remeshed surface.
    pub mesh: IndexedMesh,
    /// Vertex count before remeshing.
    pub original_vertices: usize,
    /// Face count before remeshing.
    pub original_faces: usize,
    /// Edge splits performed.
    pub splits: usize,
    /// Edge collapses performed.
    pub collapses: usize,
    /// Edge flips performed.
    pub flips: usize,
    /// Iterations actually run (stops early on convergence).
    pub iterations_run: u32,
    /// Edge statistics before remeshing.
    pub original_edges: EdgeStatistics,
    /// Edge statistics after remeshing.
    pub final_edges: EdgeStatistics,
}

impl std::fmt::Display for RemeshOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "remeshed in {} iterations: {} -> {} faces ({} splits, {} collapses, {} flips), \
             edge length {:.4}..{:.4}",
            self.iterations_run,
            self.original_faces,
            self.mesh.faces.len(),
            self.splits,
            self.collapses,
            self.flips,
            self.final_edges.min_length,
            self.final_edges.max_length,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reports_operations() {
        let output = RemeshOutput {
            mesh: IndexedMesh::new(),
            original_vertices: 10,
            original_faces: 16,
            splits: 4,
            collapses: 2,
            flips: 1,
            iterations_run: 3,
            original_edges: EdgeStatistics::default(),
            final_edges: EdgeStatistics::default(),
        };
        let text = output.to_string();
        assert!(text.contains("4 splits"));
        assert!(text.contains("3 iterations"));
    }
}
