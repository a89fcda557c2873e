//! Motion weight strategies.
//!
//! Every evolver variant shares the same implicit step driver and differs
//! only in the two per-vertex weight functions: the Laplacian (fidelity)
//! weight `eps` and the advection weight `eta`. The strategies follow
//! Huska, Medla, Mikula & Morigi (2021).

/// Per-vertex weight functions driving one evolver variant.
pub trait MotionWeights {
    /// Laplacian (curvature fidelity) weight from the signed distance to
    /// the target iso-level.
    fn laplacian_weight(&self, distance: f64) -> f64;

    /// Advection weight from the signed distance and the alignment
    /// `g . n` of the advection direction with the vertex normal.
    fn advection_weight(&self, distance: f64, grad_dot_normal: f64) -> f64;
}

/// Shrink-wrapping against a signed distance field.
///
/// `eps(d) = 1 - exp(-d^2)` fades the smoothing out as the surface
/// reaches the target; `eta(d, s) = d * (s - sqrt(max(0, 1 - s^2)))`
/// drives vertices along their normals toward the iso-level. The inner
/// clamp absorbs `|s| > 1` from interpolation error instead of producing
/// NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceFieldWeights;

impl MotionWeights for DistanceFieldWeights {
    fn laplacian_weight(&self, distance: f64) -> f64 {
        1.0 - (-distance * distance).exp()
    }

    fn advection_weight(&self, distance: f64, grad_dot_normal: f64) -> f64 {
        let tangential = (1.0 - grad_dot_normal * grad_dot_normal).max(0.0).sqrt();
        distance * (grad_dot_normal - tangential)
    }
}

/// Pure mean curvature flow, used by the shrinking-sphere benchmark.
///
/// The discrete Laplace-Beltrami of the position equals `-2 H n`; a speed
/// of `0.5` yields motion by `v = -H n`, matching the closed-form
/// shrinking sphere `r(t) = sqrt(r0^2 - 2t)`.
#[derive(Debug, Clone, Copy)]
pub struct MeanCurvatureWeights {
    /// Constant Laplacian weight.
    pub speed: f64,
}

impl Default for MeanCurvatureWeights {
    fn default() -> Self {
        Self { speed: 0.5 }
    }
}

impl MotionWeights for MeanCurvatureWeights {
    fn laplacian_weight(&self, _distance: f64) -> f64 {
        self.speed
    }

    fn advection_weight(&self, _distance: f64, _grad_dot_normal: f64) -> f64 {
        0.0
    }
}

/// Height-driven sheet membrane between two levels.
///
/// The "distance" fed to the weights is the sampled height field; the
/// driving term ramps linearly from full speed at `z_start` to zero at
/// `z_end`. Boundary vertices are constrained by the step driver, so only
/// the interior of the sheet descends.
#[derive(Debug, Clone, Copy)]
pub struct SheetMembraneWeights {
    /// Height where the membrane starts.
    pub z_start: f64,
    /// Height where the driving term vanishes.
    pub z_end: f64,
}

impl MotionWeights for SheetMembraneWeights {
    fn laplacian_weight(&self, _distance: f64) -> f64 {
        1.0
    }

    fn advection_weight(&self, distance: f64, _grad_dot_normal: f64) -> f64 {
        let span = self.z_start - self.z_end;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        -((distance - self.z_end) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_weights_vanish_on_target() {
        let w = DistanceFieldWeights;
        assert_relative_eq!(w.laplacian_weight(0.0), 0.0);
        assert_relative_eq!(w.advection_weight(0.0, -1.0), 0.0);
    }

    #[test]
    fn distance_weights_grow_with_distance() {
        let w = DistanceFieldWeights;
        assert!(w.laplacian_weight(1.0) > w.laplacian_weight(0.1));
        // Anti-aligned gradient and normal: full inward drive.
        assert_relative_eq!(w.advection_weight(0.5, -1.0), -0.5);
    }

    #[test]
    fn advection_weight_clamps_interpolation_overshoot() {
        let w = DistanceFieldWeights;
        // |g . n| slightly above 1 from trilinear interpolation error must
        // not produce NaN.
        let value = w.advection_weight(0.5, -1.0000001);
        assert!(value.is_finite());
        assert_relative_eq!(value, -0.5, epsilon = 1e-6);
    }

    #[test]
    fn mean_curvature_weights_are_constant() {
        let w = MeanCurvatureWeights::default();
        assert_relative_eq!(w.laplacian_weight(123.0), 0.5);
        assert_relative_eq!(w.advection_weight(123.0, 0.3), 0.0);
    }

    #[test]
    fn sheet_weights_ramp_between_levels() {
        let w = SheetMembraneWeights {
            z_start: 1.0,
            z_end: 0.0,
        };
        assert_relative_eq!(w.advection_weight(1.0, 0.0), -1.0);
        assert_relative_eq!(w.advection_weight(0.5, 0.0), -0.5);
        assert_relative_eq!(w.advection_weight(-0.2, 0.0), 0.0);
    }
}
