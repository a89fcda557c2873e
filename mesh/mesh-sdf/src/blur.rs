//! Box-kernel smoothing of a scalar grid.

use sw_spatial::ScalarGrid;

/// Convolves the grid with a cubic box kernel of the given radius.
///
/// The kernel is clamped at the box boundary (the average runs over the
/// cells that exist). Frozen cells contribute to their neighbors' averages
/// but are not overwritten themselves.
pub(crate) fn box_blur(grid: &mut ScalarGrid, radius: usize) {
    if radius == 0 {
        return;
    }
    let (nx, ny, nz) = grid.dimensions().as_tuple();
    let r = radius as i64;
    let old = grid.values().to_vec();

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let i = grid.linear_index(x, y, z);
                if grid.is_frozen(i) {
                    continue;
                }
                let mut sum = 0.0;
                let mut count = 0usize;
                for dz in -r..=r {
                    for dy in -r..=r {
                        for dx in -r..=r {
                            let px = x as i64 + dx;
                            let py = y as i64 + dy;
                            let pz = z as i64 + dz;
                            if px < 0
                                || py < 0
                                || pz < 0
                                || px >= nx as i64
                                || py >= ny as i64
                                || pz >= nz as i64
                            {
                                continue;
                            }
                            sum += old[grid.linear_index(px as usize, py as usize, pz as usize)];
                            count += 1;
                        }
                    }
                }
                grid.values_mut()[i] = sum / count as f64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Aabb, Point3};

    fn impulse_grid() -> ScalarGrid {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let mut grid = ScalarGrid::with_init(0.2, &bounds, 0.0).unwrap();
        let i = grid.linear_index(2, 2, 2);
        grid.values_mut()[i] = 27.0;
        grid
    }

    #[test]
    fn three_cube_spreads_impulse() {
        let mut grid = impulse_grid();
        box_blur(&mut grid, 1);
        let center = grid.linear_index(2, 2, 2);
        let side = grid.linear_index(1, 2, 2);
        assert_relative_eq!(grid.values()[center], 1.0);
        assert_relative_eq!(grid.values()[side], 1.0);
        let far = grid.linear_index(0, 2, 2);
        assert_relative_eq!(grid.values()[far], 0.0);
    }

    #[test]
    fn frozen_cells_keep_their_value() {
        let mut grid = impulse_grid();
        let frozen = grid.linear_index(1, 2, 2);
        grid.freeze(frozen);
        box_blur(&mut grid, 1);
        assert_relative_eq!(grid.values()[frozen], 0.0);
        // Unfrozen neighbor still sees the impulse.
        let other = grid.linear_index(3, 2, 2);
        assert_relative_eq!(grid.values()[other], 1.0);
    }

    #[test]
    fn zero_radius_is_identity() {
        let mut grid = impulse_grid();
        let before = grid.values().to_vec();
        box_blur(&mut grid, 0);
        assert_eq!(grid.values(), &before[..]);
    }
}
