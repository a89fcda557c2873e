//! The implicit surface evolution driver.
//!
//! One step: sample the field and its advection direction at every
//! vertex, assemble the implicit Euler system from the cotangent
//! Laplacian and the motion weights, solve the three SPD systems with a
//! sparse Cholesky factorization, write positions back, and adaptively
//! remesh. All variants share this driver and differ only in their
//! [`MotionWeights`] and initial surface.

use std::path::Path;
use std::time::Instant;

use mesh_remesh::{remesh, RemeshParams};
use mesh_subdivide::{ico_sphere, ico_sphere_vertex_count};
use mesh_types::{IndexedMesh, MeshAdjacency, MeshTopology, Point3, Vector3, Vertex};
use nalgebra::DMatrix;
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use sw_spatial::{negated_normalized_gradient, ScalarGrid, VectorGrid};
use tracing::{debug, info};

use crate::error::{EvolveError, EvolveResult};
use crate::params::SurfaceEvolutionSettings;
use crate::weights::MotionWeights;

/// Multiplier on the field box's shortest extent giving the initial
/// ico-sphere radius.
const ICO_SPHERE_RADIUS_FACTOR: f64 = 0.4;

/// Lifecycle of an evolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionPhase {
    /// Created, not yet started.
    Constructed,
    /// Initial surface built and stabilization transform applied.
    Preprocessed,
    /// Currently inside the given time step.
    Stepping(u32),
    /// Completed all steps.
    Finished,
    /// Aborted at the given step.
    Failed {
        /// The failing step index.
        step: u32,
    },
}

/// How the evolving surface is created.
enum InitialSurface {
    /// Ico-sphere of radius `0.4 * min_extent(field box)` at the field
    /// box center.
    IcoSphere,
    /// Externally produced surface (marching-cubes iso surface, brain
    /// presets) in world coordinates.
    Supplied(IndexedMesh),
    /// Axis-aligned triangulated plane at a fixed height; its boundary
    /// loop is constrained for the whole run.
    PlanarSheet {
        /// Quads per side.
        resolution: usize,
        /// Plane height.
        z_level: f64,
    },
}

/// Result of a completed evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Final surface in world coordinates.
    pub mesh: IndexedMesh,
    /// Steps completed.
    pub steps_completed: u32,
    /// Vertex count of the final surface.
    pub final_vertex_count: usize,
}

/// Mutable per-run state after preprocessing.
struct EvolutionState {
    mesh: IndexedMesh,
    field: ScalarGrid,
    advection: VectorGrid,
    scale: f64,
    center: Point3<f64>,
}

impl EvolutionState {
    /// The evolving surface mapped back to world coordinates.
    fn world_mesh(&self) -> IndexedMesh {
        let mut mesh = self.mesh.clone();
        mesh.transform_similarity(1.0 / self.scale, Point3::origin());
        mesh.translate(self.center.coords);
        mesh
    }
}

/// Evolves a closed surface toward the level set of a scalar field.
///
/// The evolver exclusively owns its evolving mesh and borrows the field;
/// preprocessing clones the field so the stabilization transform never
/// touches the caller's grid.
///
/// # Example
///
/// ```no_run
/// use mesh_evolve::{DistanceFieldWeights, SurfaceEvolver, SurfaceEvolutionSettings};
/// # fn field() -> sw_spatial::ScalarGrid { unimplemented!() }
///
/// let field = field();
/// let settings = SurfaceEvolutionSettings::named("wrap").with_steps(40);
/// let mut evolver = SurfaceEvolver::new(&field, DistanceFieldWeights, settings).unwrap();
/// let outcome = evolver.evolve().unwrap();
/// println!("final surface: {} vertices", outcome.final_vertex_count);
/// ```
pub struct SurfaceEvolver<'f, W: MotionWeights> {
    settings: SurfaceEvolutionSettings,
    field: &'f ScalarGrid,
    weights: W,
    initial: InitialSurface,
    phase: EvolutionPhase,
}

impl<'f, W: MotionWeights> SurfaceEvolver<'f, W> {
    /// Creates an evolver starting from an ico-sphere inside the field
    /// box.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings or an inconsistent field.
    pub fn new(
        field: &'f ScalarGrid,
        weights: W,
        settings: SurfaceEvolutionSettings,
    ) -> EvolveResult<Self> {
        Self::with_initial(field, weights, settings, InitialSurface::IcoSphere)
    }

    /// Creates an evolver starting from a supplied surface in world
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings, an inconsistent field, or
    /// an empty initial surface.
    pub fn with_initial_mesh(
        field: &'f ScalarGrid,
        weights: W,
        settings: SurfaceEvolutionSettings,
        initial: IndexedMesh,
    ) -> EvolveResult<Self> {
        if initial.is_empty() {
            return Err(EvolveError::EmptyInitialSurface);
        }
        Self::with_initial(field, weights, settings, InitialSurface::Supplied(initial))
    }

    /// Creates an evolver starting from a boundary-constrained planar
    /// sheet at `z_level`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings or an inconsistent field.
    pub fn with_planar_sheet(
        field: &'f ScalarGrid,
        weights: W,
        settings: SurfaceEvolutionSettings,
        resolution: usize,
        z_level: f64,
    ) -> EvolveResult<Self> {
        Self::with_initial(
            field,
            weights,
            settings,
            InitialSurface::PlanarSheet {
                resolution: resolution.max(2),
                z_level,
            },
        )
    }

    fn with_initial(
        field: &'f ScalarGrid,
        weights: W,
        settings: SurfaceEvolutionSettings,
        initial: InitialSurface,
    ) -> EvolveResult<Self> {
        settings.validate()?;
        if !field.is_valid() {
            return Err(EvolveError::InvalidField);
        }
        Ok(Self {
            settings,
            field,
            weights,
            initial,
            phase: EvolutionPhase::Constructed,
        })
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    /// Runs the evolution to completion.
    ///
    /// # Errors
    ///
    /// Returns a typed error carrying the failing step index; snapshots
    /// written before the failure remain on disk.
    pub fn evolve(&mut self) -> EvolveResult<EvolutionOutcome> {
        info!("{}", self.settings);
        let mut state = self.preprocess();
        self.phase = EvolutionPhase::Preprocessed;

        let n_steps = self.settings.n_steps;
        for step in 0..n_steps {
            self.phase = EvolutionPhase::Stepping(step);
            if let Err(error) = self.run_step(&mut state, step) {
                self.phase = EvolutionPhase::Failed { step };
                return Err(error);
            }
        }

        self.phase = EvolutionPhase::Finished;
        let mesh = state.world_mesh();
        Ok(EvolutionOutcome {
            final_vertex_count: mesh.vertex_count(),
            steps_completed: n_steps,
            mesh,
        })
    }

    /// Builds the initial surface and applies the stabilization
    /// transform to the mesh and the working copy of the field.
    fn preprocess(&self) -> EvolutionState {
        let center = self.field.bounds().center();
        let min_extent = self.field.bounds().min_extent();
        let tau = self.settings.time_step;

        let (mut mesh, expected_covolume) = match &self.initial {
            InitialSurface::IcoSphere => {
                let radius = ICO_SPHERE_RADIUS_FACTOR * min_extent;
                let level = self.settings.ico_sphere_subdivision;
                let mut sphere = ico_sphere(level, radius);
                sphere.translate(center.coords);
                let vertex_count = ico_sphere_vertex_count(level) as f64;
                let area = 4.0 * std::f64::consts::PI * radius * radius;
                (sphere, self.settings.stabilization_factor * area / vertex_count)
            }
            InitialSurface::Supplied(surface) => {
                let area = surface.surface_area();
                let vertex_count = surface.vertex_count().max(1) as f64;
                (
                    surface.clone(),
                    self.settings.stabilization_factor * area / vertex_count,
                )
            }
            InitialSurface::PlanarSheet { resolution, z_level } => {
                let sheet = planar_sheet(self.field.bounds().min, self.field.bounds().max, *resolution, *z_level);
                let area = sheet.surface_area();
                let vertex_count = sheet.vertex_count().max(1) as f64;
                (
                    sheet,
                    self.settings.stabilization_factor * area / vertex_count,
                )
            }
        };

        let scale = (tau / expected_covolume).cbrt();
        mesh.transform_similarity(scale, center);

        let mut field = self.field.clone();
        field.transform_similarity(scale, center);
        let advection = negated_normalized_gradient(&field);

        debug!(
            "preprocess: {} vertices, stabilization scale {:.4}",
            mesh.vertex_count(),
            scale
        );

        EvolutionState {
            mesh,
            field,
            advection,
            scale,
            center,
        }
    }

    /// One implicit time step plus remeshing and optional export.
    fn run_step(&self, state: &mut EvolutionState, step: u32) -> EvolveResult<()> {
        let started = Instant::now();
        let tau = self.settings.time_step;
        let iso = self.settings.field_iso_level;
        let tangential_weight = self.settings.tangential_redistribution_weight;

        let n = state.mesh.vertex_count();
        let normals = state.mesh.vertex_normals();
        let adjacency = MeshAdjacency::build(&state.mesh.faces);
        let stencils = crate::laplacian::cotangent_stencils(&state.mesh, &adjacency);

        let mut coo = CooMatrix::new(n, n);
        let mut rhs = DMatrix::<f64>::zeros(n, 3);

        for v in 0..n {
            let position = state.mesh.vertices[v].position;

            // Boundary loops (the sheet membrane) are hard-constrained by
            // identity rows, which keeps the system SPD.
            if adjacency.is_boundary_vertex(v as u32) {
                coo.push(v, v, 1.0);
                for c in 0..3 {
                    rhs[(v, c)] = position[c];
                }
                continue;
            }

            let distance = state.field.sample(&position) - iso;
            let advection_dir = state.advection.sample(&position);
            let normal = normals[v];

            let eps = self.weights.laplacian_weight(distance);
            let eta = self
                .weights
                .advection_weight(distance, advection_dir.dot(&normal));

            let stencil = &stencils[v];
            coo.push(v, v, 1.0 + tau * eps * stencil.weight_sum);
            // Constrained (boundary) neighbors are eliminated into the
            // right-hand side, which keeps the matrix symmetric against
            // their identity rows.
            let mut eliminated = Vector3::zeros();
            for &(w, weight) in &stencil.neighbors {
                if adjacency.is_boundary_vertex(w) {
                    eliminated +=
                        state.mesh.vertices[w as usize].position.coords * (tau * eps * weight);
                } else {
                    coo.push(v, w as usize, -tau * eps * weight);
                }
            }

            let mut forcing = normal * (tau * eta) + eliminated;
            if tangential_weight != 0.0 {
                forcing += tangential_velocity(state, &adjacency, v as u32, &normal)
                    * (tau * tangential_weight);
            }
            for c in 0..3 {
                rhs[(v, c)] = position[c] + forcing[c];
            }
        }

        let system = CscMatrix::from(&coo);
        let factorization = CscCholesky::factor(&system).map_err(|error| {
            EvolveError::SolverFailure {
                step,
                reason: format!("{error:?}"),
            }
        })?;
        let solution = factorization.solve(&rhs);

        for v in 0..n {
            state.mesh.vertices[v].position =
                Point3::new(solution[(v, 0)], solution[(v, 1)], solution[(v, 2)]);
        }

        let interval = self.settings.remeshing_interval;
        if interval > 0 && (step + 1) % interval == 0 {
            let min_edge = tau.sqrt();
            let params = RemeshParams::adaptive(min_edge, 5.0 * min_edge, min_edge);
            let output = remesh(&state.mesh, &params)
                .map_err(|source| EvolveError::RemeshFailure { step, source })?;
            state.mesh = output.mesh;
        }

        if self.settings.export_per_step {
            if let Some(dir) = &self.settings.output_dir {
                self.export_snapshot(state, step, dir)?;
            }
        }

        debug!(
            "time step {}/{}: {} vertices, {:.3} s",
            step + 1,
            self.settings.n_steps,
            state.mesh.vertex_count(),
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn export_snapshot(
        &self,
        state: &EvolutionState,
        step: u32,
        dir: &Path,
    ) -> EvolveResult<()> {
        let path = dir.join(format!("{}_Evol_{step}.obj", self.settings.name));
        mesh_io::save_obj(&state.world_mesh(), path)
            .map_err(|source| EvolveError::ExportFailure { step, source })
    }
}

/// Uniform-ring tangential redistribution velocity at `v`.
fn tangential_velocity(
    state: &EvolutionState,
    adjacency: &MeshAdjacency,
    v: u32,
    normal: &Vector3<f64>,
) -> Vector3<f64> {
    let ring = adjacency.neighbors(v);
    if ring.is_empty() {
        return Vector3::zeros();
    }
    let mut centroid = Vector3::zeros();
    for &w in ring {
        centroid += state.mesh.vertices[w as usize].position.coords;
    }
    centroid /= ring.len() as f64;
    let offset = centroid - state.mesh.vertices[v as usize].position.coords;
    offset - normal * offset.dot(normal)
}

/// Triangulated axis-aligned plane across the box's xy footprint.
fn planar_sheet(
    min: Point3<f64>,
    max: Point3<f64>,
    resolution: usize,
    z_level: f64,
) -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity((resolution + 1).pow(2), 2 * resolution * resolution);
    for j in 0..=resolution {
        for i in 0..=resolution {
            let x = min.x + (max.x - min.x) * i as f64 / resolution as f64;
            let y = min.y + (max.y - min.y) * j as f64 / resolution as f64;
            mesh.vertices.push(Vertex::from_coords(x, y, z_level));
        }
    }
    let stride = (resolution + 1) as u32;
    for j in 0..resolution as u32 {
        for i in 0..resolution as u32 {
            let a = i + j * stride;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            mesh.faces.push([a, b, d]);
            mesh.faces.push([a, d, c]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::{DistanceFieldWeights, SheetMembraneWeights};
    use mesh_sdf::{generate_sdf, DistanceFieldSettings};
    use mesh_types::Aabb;

    fn sphere_field() -> ScalarGrid {
        let target = ico_sphere(3, 1.0);
        let settings = DistanceFieldSettings::with_cell_size(0.05)
            .with_expansion_factor(0.2)
            .with_truncation_value(0.15);
        generate_sdf(&target, &settings).unwrap().grid
    }

    #[test]
    fn invalid_settings_rejected_at_construction() {
        let field = sphere_field();
        let settings = SurfaceEvolutionSettings::default().with_steps(0);
        assert!(matches!(
            SurfaceEvolver::new(&field, DistanceFieldWeights, settings),
            Err(EvolveError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn empty_initial_surface_rejected() {
        let field = sphere_field();
        assert!(matches!(
            SurfaceEvolver::with_initial_mesh(
                &field,
                DistanceFieldWeights,
                SurfaceEvolutionSettings::default(),
                IndexedMesh::new(),
            ),
            Err(EvolveError::EmptyInitialSurface)
        ));
    }

    #[test]
    fn shrink_wraps_a_sphere_field() {
        let field = sphere_field();
        let settings = SurfaceEvolutionSettings::named("sphere-wrap")
            .with_steps(30)
            .with_time_step(0.05)
            .with_subdivision(2);
        let mut evolver = SurfaceEvolver::new(&field, DistanceFieldWeights, settings).unwrap();
        assert_eq!(evolver.phase(), EvolutionPhase::Constructed);

        let outcome = evolver.evolve().unwrap();
        assert_eq!(evolver.phase(), EvolutionPhase::Finished);
        assert_eq!(outcome.steps_completed, 30);

        // The final surface sits near the unit sphere in world coords.
        let radii: Vec<f64> = outcome
            .mesh
            .vertices
            .iter()
            .map(|v| v.position.coords.norm())
            .collect();
        let mean: f64 = radii.iter().sum::<f64>() / radii.len() as f64;
        assert!(
            (0.88..=1.15).contains(&mean),
            "mean radius {mean} after shrink wrap"
        );
    }

    #[test]
    fn supplied_surface_near_target_stays_put() {
        let field = sphere_field();
        let initial = ico_sphere(2, 1.0);
        let settings = SurfaceEvolutionSettings::named("hold")
            .with_steps(5)
            .with_time_step(0.02);
        let mut evolver =
            SurfaceEvolver::with_initial_mesh(&field, DistanceFieldWeights, settings, initial)
                .unwrap();
        let outcome = evolver.evolve().unwrap();

        let mean: f64 = outcome
            .mesh
            .vertices
            .iter()
            .map(|v| v.position.coords.norm())
            .sum::<f64>()
            / outcome.mesh.vertex_count() as f64;
        assert!((0.9..=1.1).contains(&mean), "mean radius drifted to {mean}");
    }

    #[test]
    fn sheet_membrane_descends_with_fixed_boundary() {
        // Height field: value = z of the cell center.
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let mut field = ScalarGrid::with_init(0.1, &bounds, 0.0).unwrap();
        let (nx, ny, nz) = field.dimensions().as_tuple();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let c = field.cell_center(x, y, z);
                    let i = field.linear_index(x, y, z);
                    field.values_mut()[i] = c.z;
                }
            }
        }

        let weights = SheetMembraneWeights {
            z_start: 0.8,
            z_end: 0.2,
        };
        let settings = SurfaceEvolutionSettings::named("sheet")
            .with_steps(20)
            .with_time_step(0.01)
            .with_remeshing_interval(0);
        let mut evolver =
            SurfaceEvolver::with_planar_sheet(&field, weights, settings, 8, 0.8).unwrap();
        let outcome = evolver.evolve().unwrap();

        let adjacency = MeshAdjacency::build(&outcome.mesh.faces);
        let mut interior_max: f64 = f64::NEG_INFINITY;
        for (v, vertex) in outcome.mesh.vertices.iter().enumerate() {
            if adjacency.is_boundary_vertex(v as u32) {
                assert!(
                    (vertex.position.z - 0.8).abs() < 1e-9,
                    "boundary vertex moved to z = {}",
                    vertex.position.z
                );
            } else {
                interior_max = interior_max.max(vertex.position.z);
            }
        }
        assert!(interior_max < 0.8, "interior did not descend: {interior_max}");
    }

    #[test]
    fn snapshots_are_written_per_step() {
        let field = sphere_field();
        let dir = std::env::temp_dir().join(format!("shrinkwrap-evolve-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let settings = SurfaceEvolutionSettings::named("snap")
            .with_steps(2)
            .with_time_step(0.05)
            .with_subdivision(1)
            .with_snapshot_export(dir.clone());
        let mut evolver = SurfaceEvolver::new(&field, DistanceFieldWeights, settings).unwrap();
        evolver.evolve().unwrap();

        for step in 0..2 {
            let path = dir.join(format!("snap_Evol_{step}.obj"));
            assert!(path.exists(), "missing snapshot {path:?}");
        }
        std::fs::remove_dir_all(dir).ok();
    }
}
