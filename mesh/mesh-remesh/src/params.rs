//! Remeshing parameters.

use crate::error::RemeshError;

/// Target sizing field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingMode {
    /// One target edge length everywhere.
    Uniform {
        /// Target edge length.
        edge_length: f64,
    },
    /// Curvature-adaptive sizing
    /// `clamp(sqrt(6*e/k_max - 3*e^2), min, max)` with `e` the
    /// approximation error and `k_max` the largest absolute principal
    /// curvature at the vertex.
    Adaptive {
        /// Lower sizing clamp.
        min_edge_length: f64,
        /// Upper sizing clamp.
        max_edge_length: f64,
        /// Target approximation error.
        approx_error: f64,
    },
}

/// Parameters for [`crate::remesh`].
///
/// # Example
///
/// ```
/// use mesh_remesh::RemeshParams;
///
/// let params = RemeshParams::adaptive(0.05, 0.25, 0.05).with_iterations(5);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RemeshParams {
    /// Target sizing field.
    pub sizing: SizingMode,
    /// Full split/collapse/flip/relax iterations.
    pub iterations: u32,
    /// Tangential relaxation sweeps per iteration.
    pub smoothing_iterations: u32,
    /// Back-project vertices onto the input surface after relaxation.
    pub use_projection: bool,
    /// Dihedral angle (radians) above which an edge and its vertices are
    /// locked as features. `None` disables feature locking.
    pub feature_angle: Option<f64>,
    /// Convex-hull mode: an extra split pass per iteration that targets
    /// the longest edge of elongated triangles, yielding more-equilateral
    /// triangulations near stretched features.
    pub convex_hull_priority: bool,
}

impl RemeshParams {
    /// Uniform remeshing toward one edge length.
    #[must_use]
    pub const fn uniform(edge_length: f64) -> Self {
        Self {
            sizing: SizingMode::Uniform { edge_length },
            iterations: 10,
            smoothing_iterations: 6,
            use_projection: true,
            feature_angle: None,
            convex_hull_priority: false,
        }
    }

    /// Curvature-adaptive remeshing.
    #[must_use]
    pub const fn adaptive(min_edge_length: f64, max_edge_length: f64, approx_error: f64) -> Self {
        Self {
            sizing: SizingMode::Adaptive {
                min_edge_length,
                max_edge_length,
                approx_error,
            },
            iterations: 10,
            smoothing_iterations: 6,
            use_projection: true,
            feature_angle: None,
            convex_hull_priority: false,
        }
    }

    /// Sets the iteration count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the tangential smoothing sweeps per iteration.
    #[must_use]
    pub const fn with_smoothing_iterations(mut self, iterations: u32) -> Self {
        self.smoothing_iterations = iterations;
        self
    }

    /// Enables or disables back-projection.
    #[must_use]
    pub const fn with_projection(mut self, use_projection: bool) -> Self {
        self.use_projection = use_projection;
        self
    }

    /// Sets the feature-locking dihedral angle.
    #[must_use]
    pub const fn with_feature_angle(mut self, angle: f64) -> Self {
        self.feature_angle = Some(angle);
        self
    }

    /// Enables convex-hull split prioritization.
    #[must_use]
    pub const fn with_convex_hull_priority(mut self, enabled: bool) -> Self {
        self.convex_hull_priority = enabled;
        self
    }

    /// Checks the numeric fields.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), RemeshError> {
        if self.iterations == 0 {
            return Err(RemeshError::InvalidIterations(0));
        }
        match self.sizing {
            SizingMode::Uniform { edge_length } => {
                if edge_length <= 0.0 || !edge_length.is_finite() {
                    return Err(RemeshError::InvalidSizing(edge_length));
                }
            }
            SizingMode::Adaptive {
                min_edge_length,
                max_edge_length,
                approx_error,
            } => {
                for len in [min_edge_length, max_edge_length, approx_error] {
                    if len <= 0.0 || !len.is_finite() {
                        return Err(RemeshError::InvalidSizing(len));
                    }
                }
                if max_edge_length < min_edge_length {
                    return Err(RemeshError::InvalidSizing(max_edge_length));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_defaults() {
        let p = RemeshParams::uniform(0.1);
        assert_eq!(p.iterations, 10);
        assert_eq!(p.smoothing_iterations, 6);
        assert!(p.use_projection);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn invalid_sizings_rejected() {
        assert!(RemeshParams::uniform(0.0).validate().is_err());
        assert!(RemeshParams::adaptive(0.2, 0.1, 0.1).validate().is_err());
        assert!(RemeshParams::adaptive(0.1, 0.2, f64::NAN).validate().is_err());
        assert!(RemeshParams::uniform(0.1).with_iterations(0).validate().is_err());
    }

    #[test]
    fn builder_chain() {
        let p = RemeshParams::uniform(0.1)
            .with_iterations(3)
            .with_feature_angle(0.7)
            .with_convex_hull_priority(true)
            .with_projection(false);
        assert_eq!(p.iterations, 3);
        assert_eq!(p.feature_angle, Some(0.7));
        assert!(p.convex_hull_priority);
        assert!(!p.use_projection);
    }
}
