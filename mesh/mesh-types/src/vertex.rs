//! Mesh vertex type.

use nalgebra::Point3;

/// A mesh vertex.
///
/// Holds only the position; derived per-vertex data (normals, metrics,
/// sizing fields) lives in [`crate::VertexProperties`] so it can be
/// regenerated after topology-changing edits.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Vertex};
///
/// let v = Vertex::from_coords(1.0, 2.0, 3.0);
/// assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in world space.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Creates a vertex at the given position.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Creates a vertex from raw coordinates.
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_from_coords() {
        let v = Vertex::from_coords(1.0, -2.0, 0.5);
        assert_eq!(v.position.x, 1.0);
        assert_eq!(v.position.y, -2.0);
        assert_eq!(v.position.z, 0.5);
    }

    #[test]
    fn vertex_from_point() {
        let p = Point3::new(0.1, 0.2, 0.3);
        let v: Vertex = p.into();
        assert_eq!(v.position, p);
    }
}
