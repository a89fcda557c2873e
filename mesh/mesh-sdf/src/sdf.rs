//! The distance field generation pipeline.
//!
//! `frame -> seed narrow band -> fast sweep -> sign -> blur`, following
//! the settings in [`DistanceFieldSettings`].

use std::time::Instant;

use mesh_types::{IndexedMesh, MeshTopology, Point3, Triangle};
use rayon::prelude::*;
use sw_spatial::{GridDimensions, ScalarGrid, TriangleKdTree};
use tracing::{debug, info};

use crate::blur::box_blur;
use crate::error::{SdfError, SdfResult};
use crate::octree::octree_seed;
use crate::params::{DistanceFieldSettings, FieldPreprocessing, SignComputation};
use crate::sign::{apply_flood_fill_sign, apply_pseudonormal_sign};

/// Area below which a face is treated as degenerate and skipped.
const DEGENERATE_AREA_EPS: f64 = 1e-12;

/// Output of [`generate_sdf`].
#[derive(Debug, Clone)]
pub struct DistanceFieldResult {
    /// The signed (or unsigned, per settings) distance grid.
    pub grid: ScalarGrid,
    /// Zero-area faces skipped during preprocessing.
    pub degenerate_faces_skipped: usize,
    /// Cells seeded with exact distances before sweeping.
    pub seeded_cells: usize,
    /// Full 8-ordering sweep passes until convergence.
    pub sweep_passes: usize,
    /// Wall-clock build time in seconds.
    pub build_seconds: f64,
}

impl std::fmt::Display for DistanceFieldResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let GridDimensions { nx, ny, nz } = self.grid.dimensions();
        writeln!(f, "grid dimensions: {nx} x {ny} x {nz},")?;
        writeln!(f, "seeded cells: {},", self.seeded_cells)?;
        writeln!(f, "degenerate faces skipped: {},", self.degenerate_faces_skipped)?;
        writeln!(f, "sweep passes: {},", self.sweep_passes)?;
        write!(f, "build time: {:.3} s", self.build_seconds)
    }
}

/// Generates a voxelized signed distance field for a triangle mesh.
///
/// # Errors
///
/// Returns [`SdfError::EmptyMesh`] for a mesh without faces,
/// [`SdfError::NoUsableFaces`] when every face is degenerate, and the
/// settings validation errors for out-of-range parameters.
///
/// # Example
///
/// ```
/// use mesh_sdf::{generate_sdf, DistanceFieldSettings};
/// use mesh_types::{unit_cube, Point3};
///
/// let settings = DistanceFieldSettings::with_cell_size(0.1)
///     .with_expansion_factor(0.5)
///     .with_truncation_value(0.3);
/// let result = generate_sdf(&unit_cube(), &settings).unwrap();
/// assert!(result.grid.sample(&Point3::origin()) < 0.0);
/// ```
pub fn generate_sdf(
    mesh: &IndexedMesh,
    settings: &DistanceFieldSettings,
) -> SdfResult<DistanceFieldResult> {
    settings.validate()?;
    if mesh.is_empty() {
        return Err(SdfError::EmptyMesh);
    }

    let start = Instant::now();

    // Degenerate faces contribute nothing to distances and break
    // normal-based sign logic; skip them and report the count.
    let mut faces = Vec::with_capacity(mesh.faces.len());
    let mut triangles = Vec::with_capacity(mesh.faces.len());
    for (f, tri) in mesh.triangles().enumerate() {
        if tri.is_degenerate(DEGENERATE_AREA_EPS) {
            continue;
        }
        faces.push(mesh.faces[f]);
        triangles.push(tri);
    }
    let degenerate_faces_skipped = mesh.faces.len() - faces.len();
    if faces.is_empty() {
        return Err(SdfError::NoUsableFaces {
            degenerate: degenerate_faces_skipped,
        });
    }

    // Frame: expand the mesh box on all sides.
    let mesh_bounds = mesh.bounds();
    let margin = settings.volume_expansion_factor * mesh_bounds.min_extent();
    let bounds = mesh_bounds.expanded(margin);
    let mut grid = ScalarGrid::new(settings.cell_size, &bounds)?;

    info!(
        "generating SDF: {} faces, cell size {}, grid {:?}",
        faces.len(),
        settings.cell_size,
        grid.dimensions().as_tuple()
    );

    let positions: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
    let truncation = settings.truncation_value;

    // Narrow-band seeding.
    let seeds = match settings.preprocessing {
        FieldPreprocessing::None => brute_force_seed(&triangles, &grid, truncation),
        FieldPreprocessing::NoOctree => {
            let tree = TriangleKdTree::from_parts(
                faces.clone(),
                positions.clone(),
                settings.kdtree_split_policy,
            )?;
            kdtree_seed(&tree, &grid, truncation)
        }
        FieldPreprocessing::Octree => octree_seed(&triangles, &grid, truncation),
    };
    let seeded_cells = seeds.len();
    for (i, d) in seeds {
        grid.values_mut()[i] = d;
        grid.freeze(i);
    }
    debug!("seeded {seeded_cells} narrow-band cells");

    // Propagate outward and pin the far field to the truncation value.
    let sweep_passes = fast_sweep(&mut grid, truncation);

    match settings.sign_computation {
        SignComputation::None => {}
        SignComputation::VoxelFloodFill => apply_flood_fill_sign(&mut grid),
        SignComputation::PseudoNormal => {
            let tree = TriangleKdTree::from_parts(
                faces.clone(),
                positions.clone(),
                settings.kdtree_split_policy,
            )?;
            apply_pseudonormal_sign(&mut grid, &faces, &positions, &tree);
        }
    }

    box_blur(&mut grid, settings.blur.radius());

    let result = DistanceFieldResult {
        grid,
        degenerate_faces_skipped,
        seeded_cells,
        sweep_passes,
        build_seconds: start.elapsed().as_secs_f64(),
    };
    info!("SDF done:\n{result}");
    Ok(result)
}

/// Per-voxel brute force over every triangle.
fn brute_force_seed(
    triangles: &[Triangle],
    grid: &ScalarGrid,
    truncation: f64,
) -> Vec<(usize, f64)> {
    per_voxel_seed(grid, truncation, |p| {
        triangles
            .iter()
            .map(|t| t.distance_squared(p))
            .fold(f64::INFINITY, f64::min)
            .sqrt()
    })
}

/// Per-voxel nearest query against the KD-tree.
fn kdtree_seed(tree: &TriangleKdTree, grid: &ScalarGrid, truncation: f64) -> Vec<(usize, f64)> {
    per_voxel_seed(grid, truncation, |p| {
        tree.nearest(p).map_or(f64::INFINITY, |(_, d2)| d2.sqrt())
    })
}

/// Evaluates `distance` at every cell center in parallel and keeps cells
/// within the truncation band.
fn per_voxel_seed(
    grid: &ScalarGrid,
    truncation: f64,
    distance: impl Fn(&Point3<f64>) -> f64 + Sync,
) -> Vec<(usize, f64)> {
    let (nx, ny, nz) = grid.dimensions().as_tuple();
    (0..nx * ny * nz)
        .into_par_iter()
        .filter_map(|i| {
            let x = i % nx;
            let y = (i / nx) % ny;
            let z = i / (nx * ny);
            let d = distance(&grid.cell_center(x, y, z));
            (d <= truncation).then_some((i, d))
        })
        .collect()
}

/// Fast sweeping over the 8 diagonal orderings.
///
/// Each unfrozen cell is lowered to the minimum of its three upstream
/// axis-neighbors plus the cell size. Passes repeat until no cell
/// decreases; afterwards the unfrozen far field is clamped to the
/// truncation value.
fn fast_sweep(grid: &mut ScalarGrid, truncation: f64) -> usize {
    let (nx, ny, nz) = grid.dimensions().as_tuple();
    let h = grid.cell_size();
    let max_passes = nx + ny + nz;
    let mut passes = 0;

    loop {
        let mut changed = false;
        for ordering in 0..8u8 {
            let step_x: i64 = if ordering & 1 == 0 { 1 } else { -1 };
            let step_y: i64 = if ordering & 2 == 0 { 1 } else { -1 };
            let step_z: i64 = if ordering & 4 == 0 { 1 } else { -1 };

            let xs: Vec<usize> = ordered_range(nx, step_x);
            let ys: Vec<usize> = ordered_range(ny, step_y);
            let zs: Vec<usize> = ordered_range(nz, step_z);

            for &z in &zs {
                for &y in &ys {
                    for &x in &xs {
                        let i = grid.linear_index(x, y, z);
                        if grid.is_frozen(i) {
                            continue;
                        }
                        let mut best = grid.values()[i];
                        let upstream = [
                            (x as i64 - step_x, y as i64, z as i64),
                            (x as i64, y as i64 - step_y, z as i64),
                            (x as i64, y as i64, z as i64 - step_z),
                        ];
                        for (px, py, pz) in upstream {
                            if px < 0
                                || py < 0
                                || pz < 0
                                || px >= nx as i64
                                || py >= ny as i64
                                || pz >= nz as i64
                            {
                                continue;
                            }
                            let neighbor =
                                grid.values()[grid.linear_index(px as usize, py as usize, pz as usize)];
                            best = best.min(neighbor + h);
                        }
                        if best < grid.values()[i] {
                            grid.values_mut()[i] = best;
                            changed = true;
                        }
                    }
                }
            }
        }
        passes += 1;
        if !changed || passes >= max_passes {
            break;
        }
    }

    // Pin the far field.
    let frozen: Vec<bool> = grid.frozen_mask().to_vec();
    for (i, v) in grid.values_mut().iter_mut().enumerate() {
        if !frozen[i] && *v > truncation {
            *v = truncation;
        }
    }
    passes
}

fn ordered_range(n: usize, step: i64) -> Vec<usize> {
    if step > 0 {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    }
}
