//! Dense scalar and vector field grids.
//!
//! A grid is a uniform lattice of `f64` cells over a world-space box. The
//! box is snapped outward to integer multiples of the cell size, so a grid
//! built from any box has cell centers on a global lattice. Values are
//! stored row-major with x fastest: `linear = x + nx * (y + ny * z)`.
//!
//! Sampling is trilinear between cell centers; queries outside the box
//! clamp to the nearest cell center.

use mesh_types::Aabb;
use nalgebra::{Point3, Vector3};

use crate::error::{SpatialError, SpatialResult};

/// Default initialization value, far above any plausible distance.
pub const DEFAULT_SCALAR_INIT: f64 = 1.0e9;

/// Integer extents of a grid.
///
/// # Example
///
/// ```
/// use sw_spatial::GridDimensions;
///
/// let dims = GridDimensions { nx: 4, ny: 6, nz: 4 };
/// assert_eq!(dims.cell_count(), 96);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    /// Cell count along x.
    pub nx: usize,
    /// Cell count along y.
    pub ny: usize,
    /// Cell count along z.
    pub nz: usize,
}

impl GridDimensions {
    /// Total cell count `nx * ny * nz`.
    ///
    /// # Example
    ///
    /// ```
    /// use sw_spatial::GridDimensions;
    ///
    /// let dims = GridDimensions { nx: 2, ny: 3, nz: 5 };
    /// assert_eq!(dims.cell_count(), 30);
    /// ```
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Extents as a tuple.
    ///
    /// # Example
    ///
    /// ```
    /// use sw_spatial::GridDimensions;
    ///
    /// let dims = GridDimensions { nx: 2, ny: 3, nz: 5 };
    /// assert_eq!(dims.as_tuple(), (2, 3, 5));
    /// ```
    #[must_use]
    pub const fn as_tuple(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }
}

/// Snaps a box outward to integer multiples of `cell_size` and returns the
/// adjusted box together with the resulting dimensions.
fn snap_box(cell_size: f64, bounds: &Aabb) -> SpatialResult<(Aabb, GridDimensions)> {
    if cell_size <= 0.0 || !cell_size.is_finite() {
        return Err(SpatialError::InvalidCellSize(cell_size));
    }
    if bounds.is_empty() || bounds.min_extent() <= 0.0 {
        return Err(SpatialError::InvalidBounds(bounds.min_extent()));
    }

    let mut lo = [0i64; 3];
    let mut hi = [0i64; 3];
    for axis in 0..3 {
        lo[axis] = (bounds.min[axis] / cell_size).floor() as i64;
        hi[axis] = (bounds.max[axis] / cell_size).ceil() as i64;
    }

    let snapped = Aabb::new(
        Point3::new(
            lo[0] as f64 * cell_size,
            lo[1] as f64 * cell_size,
            lo[2] as f64 * cell_size,
        ),
        Point3::new(
            hi[0] as f64 * cell_size,
            hi[1] as f64 * cell_size,
            hi[2] as f64 * cell_size,
        ),
    );
    let dims = GridDimensions {
        nx: (hi[0] - lo[0]).max(1) as usize,
        ny: (hi[1] - lo[1]).max(1) as usize,
        nz: (hi[2] - lo[2]).max(1) as usize,
    };
    Ok((snapped, dims))
}

/// Trilinear interpolation stencil: eight cell indices and their weights.
struct TrilinearStencil {
    idx: [usize; 8],
    w: [f64; 8],
}

fn trilinear_stencil(bounds: &Aabb, cell_size: f64, dims: GridDimensions, p: &Point3<f64>) -> TrilinearStencil {
    let n = [dims.nx, dims.ny, dims.nz];
    let mut i0 = [0usize; 3];
    let mut i1 = [0usize; 3];
    let mut t = [0.0f64; 3];

    for axis in 0..3 {
        // Continuous coordinate in units of cells, measured from the first
        // cell center.
        let g = (p[axis] - bounds.min[axis]) / cell_size - 0.5;
        let last = n[axis] - 1;
        let base = g.floor();
        let clamped = (base.max(0.0) as usize).min(last);
        i0[axis] = clamped;
        i1[axis] = (clamped + 1).min(last);
        t[axis] = (g - base).clamp(0.0, 1.0);
        if base < 0.0 {
            t[axis] = 0.0; // below the first center: clamp
        } else if base as usize >= last {
            t[axis] = 0.0; // beyond the last center: clamp
            i1[axis] = last;
        }
    }

    let lin = |x: usize, y: usize, z: usize| x + n[0] * (y + n[1] * z);
    let (tx, ty, tz) = (t[0], t[1], t[2]);
    TrilinearStencil {
        idx: [
            lin(i0[0], i0[1], i0[2]),
            lin(i1[0], i0[1], i0[2]),
            lin(i0[0], i1[1], i0[2]),
            lin(i1[0], i1[1], i0[2]),
            lin(i0[0], i0[1], i1[2]),
            lin(i1[0], i0[1], i1[2]),
            lin(i0[0], i1[1], i1[2]),
            lin(i1[0], i1[1], i1[2]),
        ],
        w: [
            (1.0 - tx) * (1.0 - ty) * (1.0 - tz),
            tx * (1.0 - ty) * (1.0 - tz),
            (1.0 - tx) * ty * (1.0 - tz),
            tx * ty * (1.0 - tz),
            (1.0 - tx) * (1.0 - ty) * tz,
            tx * (1.0 - ty) * tz,
            (1.0 - tx) * ty * tz,
            tx * ty * tz,
        ],
    }
}

/// A dense scalar field over a snapped world-space box.
///
/// Carries a parallel `frozen` mask. Frozen cells are never overwritten by
/// the fast-sweeping propagation, and blur kernels read but do not write
/// them.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
/// use sw_spatial::ScalarGrid;
///
/// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
/// assert_eq!(grid.dimensions().as_tuple(), (4, 4, 4));
/// ```
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    cell_size: f64,
    bounds: Aabb,
    dims: GridDimensions,
    values: Vec<f64>,
    frozen: Vec<bool>,
}

impl ScalarGrid {
    /// Creates a grid initialized to [`DEFAULT_SCALAR_INIT`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCellSize`] or
    /// [`SpatialError::InvalidBounds`] on a degenerate input.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::{ScalarGrid, DEFAULT_SCALAR_INIT};
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::new(0.5, &bounds).unwrap();
    /// assert_eq!(grid.values()[0], DEFAULT_SCALAR_INIT);
    /// ```
    pub fn new(cell_size: f64, bounds: &Aabb) -> SpatialResult<Self> {
        Self::with_init(cell_size, bounds, DEFAULT_SCALAR_INIT)
    }

    /// Creates a grid with every cell set to `init`.
    ///
    /// The box is snapped outward to integer multiples of `cell_size` on
    /// both sides.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCellSize`] or
    /// [`SpatialError::InvalidBounds`] on a degenerate input.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// // The box is not a multiple of the cell size: it grows outward.
    /// let bounds = Aabb::new(Point3::new(0.1, 0.0, 0.0), Point3::new(0.9, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.25, &bounds, 7.0).unwrap();
    /// assert_eq!(grid.bounds().min.x, 0.0);
    /// assert_eq!(grid.bounds().max.x, 1.0);
    /// assert!(grid.values().iter().all(|&v| v == 7.0));
    /// ```
    pub fn with_init(cell_size: f64, bounds: &Aabb, init: f64) -> SpatialResult<Self> {
        let (snapped, dims) = snap_box(cell_size, bounds)?;
        let n = dims.cell_count();
        Ok(Self {
            cell_size,
            bounds: snapped,
            dims,
            values: vec![init; n],
            frozen: vec![false; n],
        })
    }

    /// Rebuilds a grid from explicit geometry and a value buffer, without
    /// snapping the box.
    ///
    /// Intended for deserialization, where `min_corner` already lies on
    /// the cell lattice.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCellSize`] for a bad cell size and
    /// [`SpatialError::DimensionMismatch`] when the buffer length does
    /// not match the dimensions.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::Point3;
    /// use sw_spatial::{GridDimensions, ScalarGrid};
    ///
    /// let dims = GridDimensions { nx: 2, ny: 2, nz: 2 };
    /// let grid = ScalarGrid::from_raw(0.5, Point3::new(0.0, 0.0, 0.0), dims, vec![1.0; 8]).unwrap();
    /// assert_eq!(grid.bounds().max, Point3::new(1.0, 1.0, 1.0));
    ///
    /// // Buffer length must match the dimensions.
    /// assert!(ScalarGrid::from_raw(0.5, Point3::new(0.0, 0.0, 0.0), dims, vec![1.0; 7]).is_err());
    /// ```
    pub fn from_raw(
        cell_size: f64,
        min_corner: Point3<f64>,
        dims: GridDimensions,
        values: Vec<f64>,
    ) -> SpatialResult<Self> {
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        if values.len() != dims.cell_count() {
            return Err(SpatialError::DimensionMismatch {
                expected: dims.as_tuple(),
                got: (values.len(), 1, 1),
            });
        }
        let size = Vector3::new(
            dims.nx as f64 * cell_size,
            dims.ny as f64 * cell_size,
            dims.nz as f64 * cell_size,
        );
        let n = values.len();
        Ok(Self {
            cell_size,
            bounds: Aabb::new(min_corner, min_corner + size),
            dims,
            values,
            frozen: vec![false; n],
        })
    }

    /// Cell size `h`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
    /// assert_eq!(grid.cell_size(), 0.25);
    /// ```
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Snapped world-space box.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Read access to the value buffer.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Write access to the value buffer.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// let i = grid.linear_index(1, 0, 0);
    /// grid.values_mut()[i] = 3.0;
    /// assert_eq!(grid.values()[i], 3.0);
    /// ```
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Linear index for cell `(x, y, z)`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
    ///
    /// // x varies fastest.
    /// assert_eq!(grid.linear_index(1, 0, 0), 1);
    /// assert_eq!(grid.linear_index(0, 1, 0), 4);
    /// assert_eq!(grid.linear_index(0, 0, 1), 16);
    /// ```
    #[must_use]
    pub const fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims.nx * (y + self.dims.ny * z)
    }

    /// World-space center of cell `(x, y, z)`.
    ///
    /// # Example
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
    /// let center = grid.cell_center(0, 0, 0);
    /// assert_relative_eq!(center.x, 0.125, epsilon = 1e-12);
    /// assert_relative_eq!(center.y, 0.125, epsilon = 1e-12);
    /// ```
    #[must_use]
    pub fn cell_center(&self, x: usize, y: usize, z: usize) -> Point3<f64> {
        Point3::new(
            (x as f64 + 0.5).mul_add(self.cell_size, self.bounds.min.x),
            (y as f64 + 0.5).mul_add(self.cell_size, self.bounds.min.y),
            (z as f64 + 0.5).mul_add(self.cell_size, self.bounds.min.z),
        )
    }

    /// Cell `(x, y, z)` containing `p`, clamped into range.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
    ///
    /// assert_eq!(grid.cell_containing(&Point3::new(0.3, 0.6, 0.9)), (1, 2, 3));
    /// // Out-of-box points clamp to the nearest cell.
    /// assert_eq!(grid.cell_containing(&Point3::new(-5.0, 5.0, 0.5)), (0, 3, 2));
    /// ```
    #[must_use]
    pub fn cell_containing(&self, p: &Point3<f64>) -> (usize, usize, usize) {
        let clamp_axis = |w: f64, lo: f64, n: usize| -> usize {
            let i = ((w - lo) / self.cell_size).floor();
            (i.max(0.0) as usize).min(n - 1)
        };
        (
            clamp_axis(p.x, self.bounds.min.x, self.dims.nx),
            clamp_axis(p.y, self.bounds.min.y, self.dims.ny),
            clamp_axis(p.z, self.bounds.min.z, self.dims.nz),
        )
    }

    /// Trilinear sample at `p`, clamping to the nearest cell center
    /// outside the box.
    ///
    /// # Example
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.25, &bounds, 2.5).unwrap();
    ///
    /// // A constant field samples to the constant everywhere, including
    /// // outside the box.
    /// assert_relative_eq!(grid.sample(&Point3::new(0.4, 0.6, 0.2)), 2.5, epsilon = 1e-12);
    /// assert_relative_eq!(grid.sample(&Point3::new(9.0, 9.0, 9.0)), 2.5, epsilon = 1e-12);
    /// ```
    #[must_use]
    pub fn sample(&self, p: &Point3<f64>) -> f64 {
        let st = trilinear_stencil(&self.bounds, self.cell_size, self.dims, p);
        st.idx
            .iter()
            .zip(st.w.iter())
            .map(|(&i, &w)| self.values[i] * w)
            .sum()
    }

    /// Adds `s` to every cell in place.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.5, &bounds, 1.0).unwrap();
    /// grid.add_scalar(0.5);
    /// assert_eq!(grid.values()[0], 1.5);
    /// ```
    pub fn add_scalar(&mut self, s: f64) {
        for v in &mut self.values {
            *v += s;
        }
    }

    /// Multiplies every cell by `s` in place.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.5, &bounds, 2.0).unwrap();
    /// grid.multiply_scalar(3.0);
    /// assert_eq!(grid.values()[0], 6.0);
    /// ```
    pub fn multiply_scalar(&mut self, s: f64) {
        for v in &mut self.values {
            *v *= s;
        }
    }

    /// Pointwise negation in place.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.5, &bounds, 4.0).unwrap();
    /// grid.negate();
    /// assert_eq!(grid.values()[0], -4.0);
    /// ```
    pub fn negate(&mut self) {
        for v in &mut self.values {
            *v = -*v;
        }
    }

    /// Permanently freezes the cell at `index`.
    ///
    /// Frozen cells are skipped by the fast-sweeping propagation and
    /// never overwritten by blur kernels.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    ///
    /// assert!(!grid.is_frozen(3));
    /// grid.freeze(3);
    /// assert!(grid.is_frozen(3));
    /// ```
    pub fn freeze(&mut self, index: usize) {
        self.frozen[index] = true;
    }

    /// Whether the cell at `index` is frozen.
    #[must_use]
    pub fn is_frozen(&self, index: usize) -> bool {
        self.frozen[index]
    }

    /// Read access to the frozen mask.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// grid.freeze(0);
    /// assert_eq!(grid.frozen_mask().iter().filter(|&&f| f).count(), 1);
    /// ```
    #[must_use]
    pub fn frozen_mask(&self) -> &[bool] {
        &self.frozen
    }

    /// Applies the similarity transform `x -> scale * (x - center)` to the
    /// grid frame. Cell values are unchanged; the box and cell size scale.
    ///
    /// # Example
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mut grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
    ///
    /// grid.transform_similarity(2.0, Point3::new(0.5, 0.5, 0.5));
    /// assert_relative_eq!(grid.cell_size(), 0.5);
    /// assert_relative_eq!(grid.bounds().min.x, -1.0);
    /// assert_relative_eq!(grid.bounds().max.x, 1.0);
    /// ```
    pub fn transform_similarity(&mut self, scale: f64, center: Point3<f64>) {
        self.bounds = Aabb::new(
            Point3::from((self.bounds.min - center) * scale),
            Point3::from((self.bounds.max - center) * scale),
        );
        self.cell_size *= scale;
    }

    /// `true` if the buffers are consistent with the dimensions.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    /// use sw_spatial::ScalarGrid;
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let grid = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// assert!(grid.is_valid());
    /// ```
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let n = self.dims.cell_count();
        self.cell_size > 0.0
            && self.cell_size.is_finite()
            && self.values.len() == n
            && self.frozen.len() == n
    }
}

/// A dense 3-component vector field sharing its shape with a scalar grid.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
/// use sw_spatial::{ScalarGrid, VectorGrid};
///
/// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let scalar = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
/// let vectors = VectorGrid::from_scalar_shape(&scalar);
/// assert_eq!(vectors.dimensions(), scalar.dimensions());
/// ```
#[derive(Debug, Clone)]
pub struct VectorGrid {
    cell_size: f64,
    bounds: Aabb,
    dims: GridDimensions,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl VectorGrid {
    /// Creates a zero-filled vector grid with the shape of `source`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3, Vector3};
    /// use sw_spatial::{ScalarGrid, VectorGrid};
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let scalar = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// let vectors = VectorGrid::from_scalar_shape(&scalar);
    /// assert_eq!(vectors.get(0), Vector3::zeros());
    /// ```
    #[must_use]
    pub fn from_scalar_shape(source: &ScalarGrid) -> Self {
        let n = source.dimensions().cell_count();
        Self {
            cell_size: source.cell_size(),
            bounds: *source.bounds(),
            dims: source.dimensions(),
            x: vec![0.0; n],
            y: vec![0.0; n],
            z: vec![0.0; n],
        }
    }

    /// Cell size `h`.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Snapped world-space box.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Vector value at linear `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Vector3<f64> {
        Vector3::new(self.x[index], self.y[index], self.z[index])
    }

    /// Sets the vector value at linear `index`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3, Vector3};
    /// use sw_spatial::{ScalarGrid, VectorGrid};
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let scalar = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// let mut vectors = VectorGrid::from_scalar_shape(&scalar);
    ///
    /// vectors.set(3, Vector3::new(1.0, 2.0, 3.0));
    /// assert_eq!(vectors.get(3), Vector3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn set(&mut self, index: usize, v: Vector3<f64>) {
        self.x[index] = v.x;
        self.y[index] = v.y;
        self.z[index] = v.z;
    }

    /// Trilinear sample at `p`, clamped like [`ScalarGrid::sample`].
    ///
    /// # Example
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use mesh_types::{Aabb, Point3, Vector3};
    /// use sw_spatial::{ScalarGrid, VectorGrid};
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let scalar = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// let mut vectors = VectorGrid::from_scalar_shape(&scalar);
    /// for i in 0..vectors.dimensions().cell_count() {
    ///     vectors.set(i, Vector3::new(0.0, 3.0, 0.0));
    /// }
    ///
    /// let v = vectors.sample(&Point3::new(0.5, 0.5, 0.5));
    /// assert_relative_eq!(v.y, 3.0);
    /// ```
    #[must_use]
    pub fn sample(&self, p: &Point3<f64>) -> Vector3<f64> {
        let st = trilinear_stencil(&self.bounds, self.cell_size, self.dims, p);
        let mut out = Vector3::zeros();
        for (&i, &w) in st.idx.iter().zip(st.w.iter()) {
            out.x += self.x[i] * w;
            out.y += self.y[i] * w;
            out.z += self.z[i] * w;
        }
        out
    }

    /// Normalizes every cell vector in place; zero-length vectors stay zero.
    ///
    /// # Example
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use mesh_types::{Aabb, Point3, Vector3};
    /// use sw_spatial::{ScalarGrid, VectorGrid};
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let scalar = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// let mut vectors = VectorGrid::from_scalar_shape(&scalar);
    /// vectors.set(0, Vector3::new(3.0, 4.0, 0.0));
    ///
    /// vectors.normalize();
    /// assert_relative_eq!(vectors.get(0).norm(), 1.0, epsilon = 1e-12);
    /// assert_eq!(vectors.get(1), Vector3::zeros()); // zero stays zero
    /// ```
    pub fn normalize(&mut self) {
        for i in 0..self.x.len() {
            let v = self.get(i);
            let len = v.norm();
            if len > f64::EPSILON {
                self.set(i, v / len);
            } else {
                self.set(i, Vector3::zeros());
            }
        }
    }

    /// Negates every cell vector in place.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3, Vector3};
    /// use sw_spatial::{ScalarGrid, VectorGrid};
    ///
    /// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let scalar = ScalarGrid::with_init(0.5, &bounds, 0.0).unwrap();
    /// let mut vectors = VectorGrid::from_scalar_shape(&scalar);
    /// vectors.set(0, Vector3::new(1.0, -2.0, 0.5));
    ///
    /// vectors.negate();
    /// assert_eq!(vectors.get(0), Vector3::new(-1.0, 2.0, -0.5));
    /// ```
    pub fn negate(&mut self) {
        for v in self.x.iter_mut().chain(&mut self.y).chain(&mut self.z) {
            *v = -*v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn snapping_to_cell_multiples() {
        let bounds = Aabb::new(Point3::new(0.1, -0.1, 0.0), Point3::new(0.9, 1.1, 1.0));
        let grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
        // min snapped down, max snapped up, both to multiples of 0.25
        assert_relative_eq!(grid.bounds().min.x, 0.0);
        assert_relative_eq!(grid.bounds().min.y, -0.25);
        assert_relative_eq!(grid.bounds().max.y, 1.25);
        assert_eq!(grid.dimensions().as_tuple(), (4, 6, 4));
        assert!(grid.is_valid());
    }

    #[test]
    fn invalid_inputs_rejected() {
        assert!(matches!(
            ScalarGrid::new(0.0, &unit_box()),
            Err(SpatialError::InvalidCellSize(_))
        ));
        assert!(matches!(
            ScalarGrid::new(f64::NAN, &unit_box()),
            Err(SpatialError::InvalidCellSize(_))
        ));
        assert!(matches!(
            ScalarGrid::new(0.1, &Aabb::empty()),
            Err(SpatialError::InvalidBounds(_))
        ));
    }

    #[test]
    fn default_init_value() {
        let grid = ScalarGrid::new(0.5, &unit_box()).unwrap();
        assert_relative_eq!(grid.values()[0], DEFAULT_SCALAR_INIT);
    }

    #[test]
    fn linear_index_x_fastest() {
        let grid = ScalarGrid::with_init(0.25, &unit_box(), 0.0).unwrap();
        assert_eq!(grid.linear_index(1, 0, 0), 1);
        assert_eq!(grid.linear_index(0, 1, 0), 4);
        assert_eq!(grid.linear_index(0, 0, 1), 16);
    }

    #[test]
    fn sample_reproduces_linear_field() {
        // Fill with f(p) = p.x; trilinear sampling must reproduce it
        // exactly between cell centers.
        let mut grid = ScalarGrid::with_init(0.25, &unit_box(), 0.0).unwrap();
        let (nx, ny, nz) = grid.dimensions().as_tuple();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let c = grid.cell_center(x, y, z);
                    let i = grid.linear_index(x, y, z);
                    grid.values_mut()[i] = c.x;
                }
            }
        }
        for &px in &[0.2, 0.5, 0.7] {
            let s = grid.sample(&Point3::new(px, 0.5, 0.5));
            assert_relative_eq!(s, px, epsilon = 1e-12);
        }
    }

    #[test]
    fn sample_clamps_outside_box() {
        let mut grid = ScalarGrid::with_init(0.25, &unit_box(), 0.0).unwrap();
        let i = grid.linear_index(0, 0, 0);
        grid.values_mut()[i] = 7.0;
        let far = grid.sample(&Point3::new(-10.0, -10.0, -10.0));
        assert_relative_eq!(far, 7.0);
    }

    #[test]
    fn in_place_ops() {
        let mut grid = ScalarGrid::with_init(0.5, &unit_box(), 2.0).unwrap();
        grid.add_scalar(1.0);
        grid.multiply_scalar(2.0);
        grid.negate();
        assert_relative_eq!(grid.values()[0], -6.0);
    }

    #[test]
    fn freeze_is_permanent() {
        let mut grid = ScalarGrid::with_init(0.5, &unit_box(), 0.0).unwrap();
        assert!(!grid.is_frozen(3));
        grid.freeze(3);
        assert!(grid.is_frozen(3));
    }

    #[test]
    fn transform_similarity_scales_frame() {
        let mut grid = ScalarGrid::with_init(0.25, &unit_box(), 0.0).unwrap();
        grid.transform_similarity(2.0, Point3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(grid.cell_size(), 0.5);
        assert_relative_eq!(grid.bounds().min.x, -1.0);
        assert_relative_eq!(grid.bounds().max.x, 1.0);
    }

    #[test]
    fn vector_grid_shape_and_sampling() {
        let scalar = ScalarGrid::with_init(0.25, &unit_box(), 0.0).unwrap();
        let mut vg = VectorGrid::from_scalar_shape(&scalar);
        assert_eq!(vg.dimensions(), scalar.dimensions());

        for i in 0..vg.dimensions().cell_count() {
            vg.set(i, Vector3::new(2.0, 0.0, 0.0));
        }
        let s = vg.sample(&Point3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(s.x, 2.0);

        vg.normalize();
        assert_relative_eq!(vg.get(0).x, 1.0);
        vg.negate();
        assert_relative_eq!(vg.get(0).x, -1.0);
    }

    #[test]
    fn vector_grid_zero_normalizes_to_zero() {
        let scalar = ScalarGrid::with_init(0.5, &unit_box(), 0.0).unwrap();
        let mut vg = VectorGrid::from_scalar_shape(&scalar);
        vg.normalize();
        assert_eq!(vg.get(0), Vector3::zeros());
    }
}
