//! Finite-difference gradient operators on scalar grids.
//!
//! Central differences in the interior, one-sided differences on the box
//! boundary. Cell spacing is the grid's cell size along every axis.

use nalgebra::Vector3;

use crate::grid::{ScalarGrid, VectorGrid};

/// Computes the gradient field of a scalar grid.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
/// use sw_spatial::{gradient, ScalarGrid};
///
/// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let mut grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
/// // f(p) = 2x
/// let (nx, ny, nz) = grid.dimensions().as_tuple();
/// for z in 0..nz {
///     for y in 0..ny {
///         for x in 0..nx {
///             let c = grid.cell_center(x, y, z);
///             let i = grid.linear_index(x, y, z);
///             grid.values_mut()[i] = 2.0 * c.x;
///         }
///     }
/// }
/// let grad = gradient(&grid);
/// let g = grad.sample(&Point3::new(0.5, 0.5, 0.5));
/// assert!((g.x - 2.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn gradient(grid: &ScalarGrid) -> VectorGrid {
    let dims = grid.dimensions();
    let (nx, ny, nz) = dims.as_tuple();
    let h = grid.cell_size();
    let values = grid.values();
    let mut out = VectorGrid::from_scalar_shape(grid);

    // One-sided difference on the boundary, central inside.
    let diff = |lo: f64, hi: f64, steps: f64| (hi - lo) / (steps * h);

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let i = grid.linear_index(x, y, z);

                let gx = match x {
                    0 => diff(values[i], values[grid.linear_index(x + 1, y, z)], 1.0),
                    _ if x == nx - 1 => {
                        diff(values[grid.linear_index(x - 1, y, z)], values[i], 1.0)
                    }
                    _ => diff(
                        values[grid.linear_index(x - 1, y, z)],
                        values[grid.linear_index(x + 1, y, z)],
                        2.0,
                    ),
                };
                let gy = match y {
                    0 => diff(values[i], values[grid.linear_index(x, y + 1, z)], 1.0),
                    _ if y == ny - 1 => {
                        diff(values[grid.linear_index(x, y - 1, z)], values[i], 1.0)
                    }
                    _ => diff(
                        values[grid.linear_index(x, y - 1, z)],
                        values[grid.linear_index(x, y + 1, z)],
                        2.0,
                    ),
                };
                let gz = match z {
                    0 => diff(values[i], values[grid.linear_index(x, y, z + 1)], 1.0),
                    _ if z == nz - 1 => {
                        diff(values[grid.linear_index(x, y, z - 1)], values[i], 1.0)
                    }
                    _ => diff(
                        values[grid.linear_index(x, y, z - 1)],
                        values[grid.linear_index(x, y, z + 1)],
                        2.0,
                    ),
                };

                out.set(i, Vector3::new(gx, gy, gz));
            }
        }
    }
    out
}

/// Gradient field with every cell normalized to unit length.
///
/// Zero-length gradients produce the zero vector, never NaN.
#[must_use]
pub fn normalized_gradient(grid: &ScalarGrid) -> VectorGrid {
    let mut g = gradient(grid);
    g.normalize();
    g
}

/// Negated unit gradient field: the advection direction used by the
/// surface evolver.
#[must_use]
pub fn negated_normalized_gradient(grid: &ScalarGrid) -> VectorGrid {
    let mut g = normalized_gradient(grid);
    g.negate();
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::Aabb;
    use nalgebra::Point3;

    fn linear_field(slope: Vector3<f64>) -> ScalarGrid {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let mut grid = ScalarGrid::with_init(0.125, &bounds, 0.0).unwrap();
        let (nx, ny, nz) = grid.dimensions().as_tuple();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let c = grid.cell_center(x, y, z);
                    let i = grid.linear_index(x, y, z);
                    grid.values_mut()[i] = slope.dot(&c.coords);
                }
            }
        }
        grid
    }

    #[test]
    fn gradient_of_linear_field_is_exact() {
        let slope = Vector3::new(1.0, -2.0, 3.0);
        let grad = gradient(&linear_field(slope));
        // Exact everywhere, including the one-sided boundary stencils.
        for i in 0..grad.dimensions().cell_count() {
            let g = grad.get(i);
            assert_relative_eq!(g.x, slope.x, epsilon = 1e-10);
            assert_relative_eq!(g.y, slope.y, epsilon = 1e-10);
            assert_relative_eq!(g.z, slope.z, epsilon = 1e-10);
        }
    }

    #[test]
    fn normalized_gradient_unit_length() {
        let grad = normalized_gradient(&linear_field(Vector3::new(3.0, 4.0, 0.0)));
        let g = grad.sample(&Point3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(g.norm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(g.x, 0.6, epsilon = 1e-10);
    }

    #[test]
    fn constant_field_yields_zero_not_nan() {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let grid = ScalarGrid::with_init(0.25, &bounds, 5.0).unwrap();
        let grad = normalized_gradient(&grid);
        for i in 0..grad.dimensions().cell_count() {
            assert_eq!(grad.get(i), Vector3::zeros());
        }
    }

    #[test]
    fn negated_gradient_flips_sign() {
        let slope = Vector3::new(1.0, 0.0, 0.0);
        let neg = negated_normalized_gradient(&linear_field(slope));
        let g = neg.sample(&Point3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(g.x, -1.0, epsilon = 1e-10);
    }
}
