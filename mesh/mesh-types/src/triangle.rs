//! A concrete triangle with geometric queries.

use nalgebra::{Point3, Vector3};

use crate::bounds::Aabb;

/// A triangle given by its three corner positions.
///
/// Used by distance queries, overlap tests, and quality metrics. The
/// winding order `a -> b -> c` determines the normal direction by the
/// right-hand rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub a: Point3<f64>,
    /// Second corner.
    pub b: Point3<f64>,
    /// Third corner.
    pub c: Point3<f64>,
}

impl Triangle {
    /// Creates a triangle from three corners.
    #[must_use]
    pub const fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    /// Unnormalized normal `(b - a) x (c - a)`.
    ///
    /// Its length is twice the triangle area.
    #[must_use]
    pub fn scaled_normal(&self) -> Vector3<f64> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Unit normal, or the zero vector for a degenerate triangle.
    #[must_use]
    pub fn normal(&self) -> Vector3<f64> {
        self.scaled_normal()
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Triangle area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.scaled_normal().norm() * 0.5
    }

    /// Returns `true` if the area is below `eps`.
    #[must_use]
    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.area() < eps
    }

    /// Centroid (arithmetic mean of the corners).
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// Tight axis-aligned bounding box.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points([&self.a, &self.b, &self.c])
    }

    /// Edge lengths `[|b-a|, |c-b|, |a-c|]`.
    #[must_use]
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            (self.b - self.a).norm(),
            (self.c - self.b).norm(),
            (self.a - self.c).norm(),
        ]
    }

    /// Interior angles at corners `a`, `b`, `c` in radians.
    ///
    /// Degenerate corners yield an angle of zero.
    #[must_use]
    pub fn angles(&self) -> [f64; 3] {
        [
            corner_angle(&self.a, &self.b, &self.c),
            corner_angle(&self.b, &self.c, &self.a),
            corner_angle(&self.c, &self.a, &self.b),
        ]
    }

    /// Closest point on the triangle to `p`.
    ///
    /// Classifies the foot of perpendicular into a vertex, edge, or face
    /// region from the barycentric signs, then projects accordingly.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Point3, Triangle};
    ///
    /// let tri = Triangle::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    ///     Point3::new(0.0, 2.0, 0.0),
    /// );
    /// let closest = tri.closest_point(&Point3::new(0.5, 0.5, 3.0));
    /// assert!((closest.z - 0.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn closest_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = p - self.a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a; // vertex region a
        }

        let bp = p - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b; // vertex region b
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + ab * v; // edge region ab
        }

        let cp = p - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c; // vertex region c
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + ac * w; // edge region ac
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w; // edge region bc
        }

        // face region
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + ab * v + ac * w
    }

    /// Squared Euclidean distance from `p` to the triangle.
    #[must_use]
    pub fn distance_squared(&self, p: &Point3<f64>) -> f64 {
        (self.closest_point(p) - p).norm_squared()
    }
}

/// Angle at `at` in the triangle `(at, p, q)`.
fn corner_angle(at: &Point3<f64>, p: &Point3<f64>, q: &Point3<f64>) -> f64 {
    let u = p - at;
    let v = q - at;
    let lu = u.norm();
    let lv = v.norm();
    if lu < f64::EPSILON || lv < f64::EPSILON {
        return 0.0;
    }
    (u.dot(&v) / (lu * lv)).clamp(-1.0, 1.0).acos()
}
