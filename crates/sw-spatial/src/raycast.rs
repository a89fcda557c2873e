//! Watertight ray-triangle intersection and ray-box slab test.
//!
//! The triangle test follows Woop, Benthin & Wald, "Watertight
//! Ray/Triangle Intersection" (2013): axes are permuted so the dominant
//! direction component becomes z, shear constants map the ray onto the
//! unit z axis, and the three 2D edge functions decide containment. Rays
//! crossing a shared edge or vertex hit exactly one of the adjacent
//! triangles.

use mesh_types::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};

/// A ray with precomputed traversal state.
///
/// Construction normalizes the direction, caches the inverse direction for
/// slab tests (axis-parallel rays get `±inf` components), and precomputes
/// the Woop shear constants. `hit_param` carries the closest hit found so
/// far and lets KD traversal prune farther nodes.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Triangle};
/// use nalgebra::Vector3;
/// use sw_spatial::Ray;
///
/// let mut ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Vector3::z());
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!(ray.intersects_triangle(&tri));
/// assert!((ray.hit_param - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin.
    pub start: Point3<f64>,
    /// Unit direction.
    pub direction: Vector3<f64>,
    /// Componentwise inverse direction (`±inf` where direction is zero).
    pub inv_direction: Vector3<f64>,
    /// Lower parameter bound.
    pub t_min: f64,
    /// Upper parameter bound.
    pub t_max: f64,
    /// Closest hit parameter found so far.
    pub hit_param: f64,
    kx: usize,
    ky: usize,
    kz: usize,
    sx: f64,
    sy: f64,
    sz: f64,
}

impl Ray {
    /// Creates a ray from a start point and direction.
    ///
    /// The direction is normalized internally; a zero direction is mapped
    /// to `+x`.
    #[must_use]
    pub fn new(start: Point3<f64>, direction: Vector3<f64>) -> Self {
        let dir = direction
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::x);

        // Dominant axis becomes z; winding is preserved by swapping the
        // other two axes when the dominant component is negative.
        let abs = dir.abs();
        let kz = if abs.x > abs.y && abs.x > abs.z {
            0
        } else if abs.y > abs.z {
            1
        } else {
            2
        };
        let (mut kx, mut ky) = ((kz + 1) % 3, (kz + 2) % 3);
        if dir[kz] < 0.0 {
            std::mem::swap(&mut kx, &mut ky);
        }

        Self {
            start,
            direction: dir,
            inv_direction: Vector3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z),
            t_min: 0.0,
            t_max: f64::MAX,
            hit_param: f64::MAX,
            kx,
            ky,
            kz,
            sx: dir[kx] / dir[kz],
            sy: dir[ky] / dir[kz],
            sz: 1.0 / dir[kz],
        }
    }

    /// Point along the ray at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.start + self.direction * t
    }

    /// Watertight ray-triangle test.
    ///
    /// On a hit inside `[t_min, t_max]` the ray's `hit_param` is lowered
    /// if the new hit is closer. Returns `true` on any in-range hit.
    pub fn intersects_triangle(&mut self, triangle: &Triangle) -> bool {
        let (kx, ky, kz) = (self.kx, self.ky, self.kz);

        let a = triangle.a - self.start;
        let b = triangle.b - self.start;
        let c = triangle.c - self.start;

        // Shear the corners onto the z-aligned ray frame.
        let ax = a[kx] - self.sx * a[kz];
        let ay = a[ky] - self.sy * a[kz];
        let bx = b[kx] - self.sx * b[kz];
        let by = b[ky] - self.sy * b[kz];
        let cx = c[kx] - self.sx * c[kz];
        let cy = c[ky] - self.sy * c[kz];

        // 2D edge functions.
        let u = cx * by - cy * bx;
        let v = ax * cy - ay * cx;
        let w = bx * ay - by * ax;

        // Signs must agree (zero is allowed on either side: edge/vertex
        // crossings stay watertight).
        if (u < 0.0 || v < 0.0 || w < 0.0) && (u > 0.0 || v > 0.0 || w > 0.0) {
            return false;
        }

        let det = u + v + w;
        if det == 0.0 {
            return false;
        }

        let az = self.sz * a[kz];
        let bz = self.sz * b[kz];
        let cz = self.sz * c[kz];
        let t = (u * az + v * bz + w * cz) / det;

        if t < self.t_min || t > self.t_max {
            return false;
        }
        if t < self.hit_param {
            self.hit_param = t;
        }
        true
    }
}

/// Slab test of a ray against an axis-aligned box.
///
/// Uses the cached inverse direction; axis-parallel rays work through the
/// `±inf` components (`f64::min`/`f64::max` discard the NaNs produced by
/// `0 * inf`). The test is bounded above by the ray's current `hit_param`
/// so traversal naturally prunes.
#[must_use]
pub fn ray_intersects_aabb(ray: &Ray, aabb: &Aabb) -> bool {
    let mut t_near = ray.t_min;
    let mut t_far = ray.t_max.min(ray.hit_param);

    for axis in 0..3 {
        let t1 = (aabb.min[axis] - ray.start[axis]) * ray.inv_direction[axis];
        let t2 = (aabb.max[axis] - ray.start[axis]) * ray.inv_direction[axis];
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
    }
    t_near <= t_far
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn xy_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn direct_hit_records_param() {
        let mut ray = Ray::new(Point3::new(0.2, 0.2, -2.0), Vector3::z());
        assert!(ray.intersects_triangle(&xy_triangle()));
        assert_relative_eq!(ray.hit_param, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn miss_outside_triangle() {
        let mut ray = Ray::new(Point3::new(2.0, 2.0, -1.0), Vector3::z());
        assert!(!ray.intersects_triangle(&xy_triangle()));
        assert_eq!(ray.hit_param, f64::MAX);
    }

    #[test]
    fn behind_origin_rejected() {
        let mut ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::z());
        assert!(!ray.intersects_triangle(&xy_triangle()));
    }

    #[test]
    fn parallel_ray_rejected() {
        let mut ray = Ray::new(Point3::new(-1.0, 0.2, 0.0), Vector3::x());
        assert!(!ray.intersects_triangle(&xy_triangle()));
    }

    #[test]
    fn closer_hit_lowers_param() {
        let near = Triangle::new(
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        );
        let far = Triangle::new(
            Point3::new(-1.0, -1.0, 3.0),
            Point3::new(1.0, -1.0, 3.0),
            Point3::new(0.0, 2.0, 3.0),
        );
        let mut ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        assert!(ray.intersects_triangle(&far));
        assert_relative_eq!(ray.hit_param, 3.0, epsilon = 1e-12);
        assert!(ray.intersects_triangle(&near));
        assert_relative_eq!(ray.hit_param, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn shared_edge_crossing_hits_exactly_one() {
        // Two triangles sharing the edge (0,0,0)-(1,0,0); rays through the
        // shared edge must report exactly one hit (XOR), never zero or two.
        let t1 = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        );
        let t2 = Triangle::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        );
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let x = rng.gen_range(0.05..0.95);
            // Graze the shared edge from either side, down to sub-ulp-ish
            // offsets; exactly one triangle must claim the hit.
            let side: f64 = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let y = side * 10f64.powf(rng.gen_range(-12.0..-3.0));
            let origin = Point3::new(x, y, -1.0);
            let mut ray = Ray::new(origin, Vector3::z());
            let h1 = ray.intersects_triangle(&t1);
            let mut ray2 = Ray::new(origin, Vector3::z());
            let h2 = ray2.intersects_triangle(&t2);
            assert!(h1 ^ h2, "edge crossing at x={x}, y={y} hit {h1}/{h2}");
        }
    }

    #[test]
    fn slab_test_hits_and_misses() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let hit = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::x());
        let miss = Ray::new(Point3::new(-5.0, 3.0, 0.0), Vector3::x());
        assert!(ray_intersects_aabb(&hit, &aabb));
        assert!(!ray_intersects_aabb(&miss, &aabb));
    }

    #[test]
    fn slab_test_axis_parallel_on_face() {
        // Direction has zero y/z components: inverse direction is infinite
        // there and must not poison the result.
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vector3::x());
        assert!(ray_intersects_aabb(&ray, &aabb));
    }

    #[test]
    fn slab_test_prunes_past_hit() {
        let aabb = Aabb::new(Point3::new(10.0, -1.0, -1.0), Point3::new(12.0, 1.0, 1.0));
        let mut ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
        ray.hit_param = 5.0; // already found something closer
        assert!(!ray_intersects_aabb(&ray, &aabb));
    }
}
