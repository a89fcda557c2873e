//! Analytical shrinking-sphere benchmark.
//!
//! Under motion by mean curvature `v = -H n`, a sphere of radius `r0`
//! collapses along `r(t) = sqrt(r0^2 - 2t)`. The benchmark evolves an
//! ico-sphere with the implicit step (constant Laplacian weight `1/2`, no
//! advection, no remeshing, no stabilization scaling) and records the
//! per-step radius errors against the closed form.

use mesh_subdivide::ico_sphere;
use mesh_types::{MeshAdjacency, MeshTopology, Point3};
use nalgebra::DMatrix;
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use tracing::debug;

use crate::error::{EvolveError, EvolveResult};
use crate::laplacian::cotangent_stencils;

/// Errors of one benchmark step.
#[derive(Debug, Clone, Copy)]
pub struct SphereStepRecord {
    /// Step index (1-based: after this many steps).
    pub step: u32,
    /// Simulated time.
    pub time: f64,
    /// Mean vertex radius.
    pub mean_radius: f64,
    /// Closed-form radius `sqrt(r0^2 - 2t)`.
    pub expected_radius: f64,
    /// `max_v | |x_v| - r(t) |`.
    pub linf_error: f64,
    /// Root mean square of the per-vertex radius errors.
    pub l2_error: f64,
}

/// Full benchmark output.
#[derive(Debug, Clone)]
pub struct SphereTestReport {
    /// Initial radius.
    pub initial_radius: f64,
    /// Time step used.
    pub time_step: f64,
    /// Longest edge of the initial ico-sphere (the spatial resolution
    /// `h` in the pass criterion `error <= C * h`).
    pub mesh_resolution: f64,
    /// Per-step records, up to collapse.
    pub steps: Vec<SphereStepRecord>,
}

impl std::fmt::Display for SphereTestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "shrinking sphere: r0 = {}, tau = {}, h = {:.4}",
            self.initial_radius, self.time_step, self.mesh_resolution
        )?;
        for record in &self.steps {
            writeln!(
                f,
                "step {:3}: t = {:.4}, r = {:.4} (expected {:.4}), Linf = {:.5}, L2 = {:.5}",
                record.step,
                record.time,
                record.mean_radius,
                record.expected_radius,
                record.linf_error,
                record.l2_error
            )?;
        }
        Ok(())
    }
}

/// Runs the shrinking-sphere benchmark.
///
/// Steps stop early once the closed-form sphere would collapse within the
/// next step.
///
/// # Errors
///
/// Returns [`EvolveError::SolverFailure`] if a factorization fails.
///
/// # Example
///
/// ```no_run
/// use mesh_evolve::shrinking_sphere_test;
///
/// let report = shrinking_sphere_test(1.0, 3, 0.01, 40).unwrap();
/// println!("{report}");
/// ```
pub fn shrinking_sphere_test(
    initial_radius: f64,
    subdivision: u32,
    time_step: f64,
    n_steps: u32,
) -> EvolveResult<SphereTestReport> {
    let mut mesh = ico_sphere(subdivision, initial_radius);
    let mesh_resolution = mesh
        .triangles()
        .flat_map(|t| t.edge_lengths())
        .fold(0.0f64, f64::max);

    let mut report = SphereTestReport {
        initial_radius,
        time_step,
        mesh_resolution,
        steps: Vec::new(),
    };

    for step in 0..n_steps {
        let time = time_step * f64::from(step + 1);
        let expected_sq = initial_radius * initial_radius - 2.0 * time;
        if expected_sq <= 0.0 {
            debug!("sphere collapses at step {step}; stopping benchmark");
            break;
        }
        let expected_radius = expected_sq.sqrt();

        mean_curvature_step(&mut mesh, time_step, step)?;

        let n = mesh.vertex_count() as f64;
        let mut linf: f64 = 0.0;
        let mut sum_sq = 0.0;
        let mut sum_radius = 0.0;
        for v in &mesh.vertices {
            let error = (v.position.coords.norm() - expected_radius).abs();
            linf = linf.max(error);
            sum_sq += error * error;
            sum_radius += v.position.coords.norm();
        }
        report.steps.push(SphereStepRecord {
            step: step + 1,
            time,
            mean_radius: sum_radius / n,
            expected_radius,
            linf_error: linf,
            l2_error: (sum_sq / n).sqrt(),
        });
    }

    Ok(report)
}

/// One implicit step of `v = -H n`: `(I + tau/2 * L) x_new = x_old`.
fn mean_curvature_step(
    mesh: &mut mesh_types::IndexedMesh,
    tau: f64,
    step: u32,
) -> EvolveResult<()> {
    let n = mesh.vertex_count();
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let stencils = cotangent_stencils(mesh, &adjacency);

    let mut coo = CooMatrix::new(n, n);
    let mut rhs = DMatrix::<f64>::zeros(n, 3);
    let eps = 0.5;

    for v in 0..n {
        let stencil = &stencils[v];
        coo.push(v, v, 1.0 + tau * eps * stencil.weight_sum);
        for &(w, weight) in &stencil.neighbors {
            coo.push(v, w as usize, -tau * eps * weight);
        }
        let position = mesh.vertices[v].position;
        for c in 0..3 {
            rhs[(v, c)] = position[c];
        }
    }

    let system = CscMatrix::from(&coo);
    let factorization =
        CscCholesky::factor(&system).map_err(|error| EvolveError::SolverFailure {
            step,
            reason: format!("{error:?}"),
        })?;
    let solution = factorization.solve(&rhs);
    for v in 0..n {
        mesh.vertices[v].position =
            Point3::new(solution[(v, 0)], solution[(v, 1)], solution[(v, 2)]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_closed_form_radius() {
        let report = shrinking_sphere_test(1.0, 3, 0.01, 40).unwrap();
        assert!(!report.steps.is_empty());
        let h = report.mesh_resolution;

        for record in &report.steps {
            assert!(
                (record.mean_radius - record.expected_radius).abs() <= 0.5 * h,
                "step {}: mean radius {} vs expected {}",
                record.step,
                record.mean_radius,
                record.expected_radius
            );
            assert!(
                record.linf_error <= 2.0 * h,
                "step {}: Linf {} exceeds 2h = {}",
                record.step,
                record.linf_error,
                2.0 * h
            );
            assert!(record.l2_error <= record.linf_error + 1e-12);
        }
    }

    #[test]
    fn stops_before_collapse() {
        // r0 = 0.5 collapses at t = 0.125; with tau = 0.02 only 6 steps fit.
        let report = shrinking_sphere_test(0.5, 2, 0.02, 50).unwrap();
        assert!(report.steps.len() <= 6);
        let last = report.steps.last().unwrap();
        assert!(last.expected_radius > 0.0);
    }

    #[test]
    fn radius_decreases_monotonically() {
        let report = shrinking_sphere_test(1.0, 2, 0.01, 10).unwrap();
        for pair in report.steps.windows(2) {
            assert!(pair[1].mean_radius < pair[0].mean_radius);
        }
    }

    #[test]
    fn report_display_lists_steps() {
        let report = shrinking_sphere_test(1.0, 1, 0.01, 3).unwrap();
        let text = report.to_string();
        assert!(text.contains("shrinking sphere"));
        assert!(text.contains("step"));
    }
}
