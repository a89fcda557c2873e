//! Subdivision parameters.

/// Subdivision scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubdivisionMethod {
    /// Split each triangle into four at the edge midpoints without moving
    /// any vertex.
    #[default]
    Midpoint,
    /// Loop subdivision: midpoint connectivity plus the Loop smoothing
    /// masks. Boundary vertices use the cubic B-spline boundary rules.
    Loop,
}

/// Parameters for [`crate::subdivide`].
#[derive(Debug, Clone)]
pub struct SubdivideParams {
    /// Scheme to apply.
    pub method: SubdivisionMethod,
    /// Number of 1-to-4 iterations.
    pub iterations: u32,
    /// Upper bound on the produced face count.
    pub max_faces: usize,
}

impl Default for SubdivideParams {
    fn default() -> Self {
        Self {
            method: SubdivisionMethod::default(),
            iterations: 1,
            max_faces: 10_000_000,
        }
    }
}

impl SubdivideParams {
    /// Default parameters for Loop subdivision.
    #[must_use]
    pub fn loop_subdivision() -> Self {
        Self {
            method: SubdivisionMethod::Loop,
            ..Self::default()
        }
    }

    /// Default parameters for midpoint subdivision.
    #[must_use]
    pub fn midpoint() -> Self {
        Self::default()
    }

    /// Sets the iteration count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the face limit.
    #[must_use]
    pub const fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Face count after all iterations (each multiplies by 4).
    #[must_use]
    pub const fn projected_faces(&self, current: usize) -> usize {
        let mut faces = current;
        let mut i = 0;
        while i < self.iterations {
            faces *= 4;
            i += 1;
        }
        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = SubdivideParams::default();
        assert_eq!(p.method, SubdivisionMethod::Midpoint);
        assert_eq!(p.iterations, 1);
    }

    #[test]
    fn projected_faces_grows_by_four() {
        let p = SubdivideParams::default().with_iterations(3);
        assert_eq!(p.projected_faces(12), 768);
    }

    #[test]
    fn builders() {
        let p = SubdivideParams::loop_subdivision().with_iterations(2).with_max_faces(100);
        assert_eq!(p.method, SubdivisionMethod::Loop);
        assert_eq!(p.max_faces, 100);
    }
}
