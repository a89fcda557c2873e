//! Separating-axis triangle-box overlap test.
//!
//! The classic 13-axis SAT (Akenine-Möller): the three box axes, the
//! triangle normal, and the nine cross products of box axes and triangle
//! edges. Used by the SDF builder's octree to assign faces to nodes.

use mesh_types::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};

/// Interval of a projected triangle: `(min, max)` over the three corners.
#[inline]
fn project_extent(a: f64, b: f64, c: f64) -> (f64, f64) {
    (a.min(b).min(c), a.max(b).max(c))
}

/// Tests whether a triangle overlaps an axis-aligned box given by its
/// center and half-size.
///
/// Returns `false` as soon as any of the 13 candidate axes separates the
/// two shapes.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Triangle};
/// use nalgebra::Vector3;
/// use sw_spatial::triangle_intersects_box;
///
/// let tri = Triangle::new(
///     Point3::new(-1.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// let half = Vector3::new(0.5, 0.5, 0.5);
/// assert!(triangle_intersects_box(&tri, &Point3::origin(), &half));
/// assert!(!triangle_intersects_box(&tri, &Point3::new(0.0, 0.0, 3.0), &half));
/// ```
#[must_use]
pub fn triangle_intersects_box(
    triangle: &Triangle,
    box_center: &Point3<f64>,
    box_half_size: &Vector3<f64>,
) -> bool {
    // Move the box to the origin.
    let v0 = triangle.a - box_center;
    let v1 = triangle.b - box_center;
    let v2 = triangle.c - box_center;

    let e0 = v1 - v0;
    let e1 = v2 - v1;
    let e2 = v0 - v2;

    // 1) The three box axes (AABB-vs-triangle-AABB).
    for axis in 0..3 {
        let (lo, hi) = project_extent(v0[axis], v1[axis], v2[axis]);
        if lo > box_half_size[axis] || hi < -box_half_size[axis] {
            return false;
        }
    }

    // 2) The nine edge cross-product axes.
    for edge in [&e0, &e1, &e2] {
        for axis in 0..3 {
            // cross(unit axis_i, edge) written out componentwise
            let mut a = Vector3::zeros();
            a[(axis + 1) % 3] = -edge[(axis + 2) % 3];
            a[(axis + 2) % 3] = edge[(axis + 1) % 3];

            let (lo, hi) = project_extent(a.dot(&v0), a.dot(&v1), a.dot(&v2));
            let r = box_half_size.x * a.x.abs()
                + box_half_size.y * a.y.abs()
                + box_half_size.z * a.z.abs();
            if lo > r || hi < -r {
                return false;
            }
        }
    }

    // 3) The triangle's supporting plane.
    let normal = e0.cross(&e1);
    let d = -normal.dot(&v0);
    let r = box_half_size.x * normal.x.abs()
        + box_half_size.y * normal.y.abs()
        + box_half_size.z * normal.z.abs();
    d.abs() <= r
}

/// Convenience wrapper testing a triangle against an [`Aabb`].
#[must_use]
pub fn triangle_intersects_aabb(triangle: &Triangle, aabb: &Aabb) -> bool {
    let half = aabb.size() * 0.5;
    triangle_intersects_box(triangle, &aabb.center(), &half)
}
