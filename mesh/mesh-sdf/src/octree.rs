//! Face-set octree used for narrow-band seeding.
//!
//! The octree covers the grid box with a power-of-two cube of voxels.
//! Each node keeps the faces whose triangles overlap the node's box
//! expanded by the truncation radius, so the traversal only ever descends
//! into regions that can contain band voxels. Leaves correspond to single
//! grid cells.

use mesh_types::{Point3, Triangle};
use nalgebra::Vector3;
use rayon::prelude::*;
use sw_spatial::{triangle_intersects_box, ScalarGrid};

/// A cubic octree node region.
#[derive(Debug, Clone, Copy)]
struct CubeRegion {
    /// Minimum corner.
    min: Point3<f64>,
    /// Edge length.
    side: f64,
}

impl CubeRegion {
    fn center(&self) -> Point3<f64> {
        let h = self.side * 0.5;
        Point3::new(self.min.x + h, self.min.y + h, self.min.z + h)
    }

    fn child(&self, octant: usize) -> Self {
        let h = self.side * 0.5;
        Self {
            min: Point3::new(
                self.min.x + if octant & 1 == 0 { 0.0 } else { h },
                self.min.y + if octant & 2 == 0 { 0.0 } else { h },
                self.min.z + if octant & 4 == 0 { 0.0 } else { h },
            ),
            side: h,
        }
    }
}

/// Seeds narrow-band voxels by octree traversal.
///
/// Returns `(linear_index, distance)` pairs for every grid cell whose
/// center lies within `truncation` of some triangle. A cell may only be
/// produced once: leaves map one-to-one onto grid cells.
pub(crate) fn octree_seed(
    triangles: &[Triangle],
    grid: &ScalarGrid,
    truncation: f64,
) -> Vec<(usize, f64)> {
    let dims = grid.dimensions();
    let (nx, ny, nz) = dims.as_tuple();
    let cell = grid.cell_size();

    // Power-of-two cube covering the grid.
    let max_dim = nx.max(ny).max(nz);
    let mut cells_per_side = 1usize;
    while cells_per_side < max_dim {
        cells_per_side *= 2;
    }
    let root = CubeRegion {
        min: grid.bounds().min,
        side: cells_per_side as f64 * cell,
    };

    let all: Vec<u32> = (0..triangles.len() as u32).collect();

    // Fan the eight root octants out over the thread pool; each subtree is
    // independent per the shared-resource policy.
    if cells_per_side == 1 {
        let mut out = Vec::new();
        descend(triangles, &all, root, cell, truncation, grid, &mut out);
        return out;
    }

    (0..8usize)
        .into_par_iter()
        .flat_map(|octant| {
            let child = root.child(octant);
            let ids = faces_overlapping(triangles, &all, &child, truncation);
            let mut out = Vec::new();
            if !ids.is_empty() {
                descend(triangles, &ids, child, cell, truncation, grid, &mut out);
            }
            out
        })
        .collect()
}

/// Faces of `ids` whose triangles overlap `region` expanded by `margin`.
fn faces_overlapping(
    triangles: &[Triangle],
    ids: &[u32],
    region: &CubeRegion,
    margin: f64,
) -> Vec<u32> {
    let half = region.side * 0.5 + margin;
    let half = Vector3::new(half, half, half);
    let center = region.center();
    ids.iter()
        .copied()
        .filter(|&f| triangle_intersects_box(&triangles[f as usize], &center, &half))
        .collect()
}

fn descend(
    triangles: &[Triangle],
    ids: &[u32],
    region: CubeRegion,
    cell: f64,
    truncation: f64,
    grid: &ScalarGrid,
    out: &mut Vec<(usize, f64)>,
) {
    if region.side <= cell * 1.000_001 {
        // Leaf: one grid cell.
        let (nx, ny, nz) = grid.dimensions().as_tuple();
        let rel = region.min - grid.bounds().min;
        let x = (rel.x / cell).round() as i64;
        let y = (rel.y / cell).round() as i64;
        let z = (rel.z / cell).round() as i64;
        if x < 0 || y < 0 || z < 0 || x >= nx as i64 || y >= ny as i64 || z >= nz as i64 {
            return;
        }
        let center = region.center();
        let d = ids
            .iter()
            .map(|&f| triangles[f as usize].distance_squared(&center))
            .fold(f64::INFINITY, f64::min)
            .sqrt();
        if d <= truncation {
            out.push((grid.linear_index(x as usize, y as usize, z as usize), d));
        }
        return;
    }

    for octant in 0..8 {
        let child = region.child(octant);
        let child_ids = faces_overlapping(triangles, ids, &child, truncation);
        if !child_ids.is_empty() {
            descend(triangles, &child_ids, child, cell, truncation, grid, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, Aabb, MeshTopology};

    #[test]
    fn seeds_cells_near_cube_surface() {
        let mesh = unit_cube();
        assert_eq!(mesh.face_count(), 12);
        let triangles: Vec<Triangle> = mesh.triangles().collect();

        let bounds = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let grid = ScalarGrid::new(0.125, &bounds).unwrap();
        let seeded = octree_seed(&triangles, &grid, 0.2);

        assert!(!seeded.is_empty());
        // Every seeded cell is within truncation of the surface, and the
        // cell adjacent to a face center is present.
        for &(_, d) in &seeded {
            assert!(d <= 0.2 + 1e-12);
        }
        let near_face = seeded
            .iter()
            .any(|&(_, d)| d < 0.125);
        assert!(near_face);
    }

    #[test]
    fn distant_surface_seeds_nothing() {
        let mut mesh = unit_cube();
        mesh.translate(nalgebra::Vector3::new(50.0, 0.0, 0.0));
        let triangles: Vec<Triangle> = mesh.triangles().collect();

        let bounds = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let grid = ScalarGrid::new(0.25, &bounds).unwrap();
        let seeded = octree_seed(&triangles, &grid, 0.2);
        assert!(seeded.is_empty());
    }
}
