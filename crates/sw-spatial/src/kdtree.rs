//! Static KD-tree over mesh triangles.
//!
//! Built top-down over face bounding boxes: the split axis is the widest
//! extent of the node's box, the split position comes from the
//! [`KdSplitPolicy`], and a face goes to every child whose box its AABB
//! overlaps. There is no rebalancing after construction; queries are
//! read-only and safe to run from concurrent readers.

use mesh_types::{Aabb, IndexedMesh, Point3, Triangle};

use crate::error::{SpatialError, SpatialResult};
use crate::raycast::{ray_intersects_aabb, Ray};

/// Faces per leaf below which subdivision stops.
const LEAF_FACE_COUNT: usize = 4;
/// Hard recursion limit.
const MAX_DEPTH: usize = 24;

/// How a node picks its split position along the widest axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum KdSplitPolicy {
    /// Midpoint of the node's box along the split axis.
    #[default]
    Center,
    /// Median of the face centroid coordinates along the split axis.
    Median,
}

#[derive(Debug, Clone)]
enum KdNodeKind {
    Leaf { faces: Vec<u32> },
    Internal { left: u32, right: u32 },
}

#[derive(Debug, Clone)]
struct KdNode {
    bounds: Aabb,
    kind: KdNodeKind,
}

/// A static KD-tree over the faces of a triangle mesh.
///
/// The tree owns copies of the face and position arrays, so it stays valid
/// independently of the source mesh (the evolving mesh is remeshed every
/// step; trees built for back-projection reference the pre-step surface).
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, Point3};
/// use sw_spatial::{KdSplitPolicy, TriangleKdTree};
///
/// let tree = TriangleKdTree::build(&unit_cube(), KdSplitPolicy::Center).unwrap();
/// let (face, d2) = tree.nearest(&Point3::new(0.0, 0.0, 2.0)).unwrap();
/// assert!(face < 12);
/// assert!((d2 - 2.25).abs() < 1e-12); // 1.5^2 to the top face
/// ```
#[derive(Debug, Clone)]
pub struct TriangleKdTree {
    nodes: Vec<KdNode>,
    faces: Vec<[u32; 3]>,
    positions: Vec<Point3<f64>>,
}

impl TriangleKdTree {
    /// Builds a tree over all faces of `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::EmptyFaceSet`] for a mesh without faces.
    pub fn build(mesh: &IndexedMesh, policy: KdSplitPolicy) -> SpatialResult<Self> {
        Self::from_parts(
            mesh.faces.clone(),
            mesh.vertices.iter().map(|v| v.position).collect(),
            policy,
        )
    }

    /// Builds a tree from raw face and position arrays.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::EmptyFaceSet`] for an empty face list.
    pub fn from_parts(
        faces: Vec<[u32; 3]>,
        positions: Vec<Point3<f64>>,
        policy: KdSplitPolicy,
    ) -> SpatialResult<Self> {
        if faces.is_empty() {
            return Err(SpatialError::EmptyFaceSet);
        }

        let mut tree = Self {
            nodes: Vec::new(),
            faces,
            positions,
        };

        let face_boxes: Vec<Aabb> = (0..tree.faces.len())
            .map(|f| tree.triangle(f as u32).aabb())
            .collect();
        let mut root_bounds = Aabb::empty();
        for fb in &face_boxes {
            root_bounds.expand_to_include_aabb(fb);
        }

        let all: Vec<u32> = (0..tree.faces.len() as u32).collect();
        tree.build_node(all, root_bounds, 0, policy, &face_boxes);
        Ok(tree)
    }

    /// The triangle for face `f`.
    #[must_use]
    pub fn triangle(&self, f: u32) -> Triangle {
        let [i, j, k] = self.faces[f as usize];
        Triangle::new(
            self.positions[i as usize],
            self.positions[j as usize],
            self.positions[k as usize],
        )
    }

    /// Number of indexed faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Recursively builds a node, returning its index.
    fn build_node(
        &mut self,
        face_ids: Vec<u32>,
        bounds: Aabb,
        depth: usize,
        policy: KdSplitPolicy,
        face_boxes: &[Aabb],
    ) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(KdNode {
            bounds,
            kind: KdNodeKind::Leaf { faces: Vec::new() },
        });

        if face_ids.len() <= LEAF_FACE_COUNT || depth >= MAX_DEPTH {
            self.nodes[index as usize].kind = KdNodeKind::Leaf { faces: face_ids };
            return index;
        }

        let axis = bounds.widest_axis();
        let split = match policy {
            KdSplitPolicy::Center => (bounds.min[axis] + bounds.max[axis]) * 0.5,
            KdSplitPolicy::Median => {
                let mut coords: Vec<f64> = face_ids
                    .iter()
                    .map(|&f| self.triangle(f).centroid()[axis])
                    .collect();
                coords.sort_unstable_by(f64::total_cmp);
                coords[coords.len() / 2]
            }
        };

        let mut left_bounds = bounds;
        left_bounds.max[axis] = split;
        let mut right_bounds = bounds;
        right_bounds.min[axis] = split;

        // A face belongs to every child its AABB overlaps; straddlers land
        // in both.
        let left_ids: Vec<u32> = face_ids
            .iter()
            .copied()
            .filter(|&f| face_boxes[f as usize].intersects(&left_bounds))
            .collect();
        let right_ids: Vec<u32> = face_ids
            .iter()
            .copied()
            .filter(|&f| face_boxes[f as usize].intersects(&right_bounds))
            .collect();

        // Degenerate split: all faces straddle, or one side took everything.
        if left_ids.len() == face_ids.len() && right_ids.len() == face_ids.len()
            || left_ids.is_empty()
            || right_ids.is_empty()
        {
            self.nodes[index as usize].kind = KdNodeKind::Leaf { faces: face_ids };
            return index;
        }

        let left = self.build_node(left_ids, left_bounds, depth + 1, policy, face_boxes);
        let right = self.build_node(right_ids, right_bounds, depth + 1, policy, face_boxes);
        self.nodes[index as usize].kind = KdNodeKind::Internal { left, right };
        index
    }

    /// Nearest face to `point` with its squared distance.
    ///
    /// Branch-and-bound over node boxes, visiting the nearer child first.
    /// Returns `None` only for a tree that lost all faces (never happens
    /// for a successfully built tree).
    #[must_use]
    pub fn nearest(&self, point: &Point3<f64>) -> Option<(u32, f64)> {
        let mut best: Option<(u32, f64)> = None;
        self.nearest_in_node(0, point, &mut best);
        best
    }

    fn nearest_in_node(&self, node: u32, point: &Point3<f64>, best: &mut Option<(u32, f64)>) {
        let node = &self.nodes[node as usize];
        if let Some((_, best_d2)) = best {
            if aabb_distance_squared(&node.bounds, point) > *best_d2 {
                return;
            }
        }
        match &node.kind {
            KdNodeKind::Leaf { faces } => {
                for &f in faces {
                    let d2 = self.triangle(f).distance_squared(point);
                    if best.map_or(true, |(_, b)| d2 < b) {
                        *best = Some((f, d2));
                    }
                }
            }
            KdNodeKind::Internal { left, right } => {
                let dl = aabb_distance_squared(&self.nodes[*left as usize].bounds, point);
                let dr = aabb_distance_squared(&self.nodes[*right as usize].bounds, point);
                let (first, second) = if dl <= dr {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                self.nearest_in_node(first, point, best);
                self.nearest_in_node(second, point, best);
            }
        }
    }

    /// Whether the ray hits any indexed triangle.
    ///
    /// Every tested leaf triangle updates `ray.hit_param`, so box tests
    /// deeper in the traversal prune against the closest hit so far.
    pub fn intersects(&self, ray: &mut Ray) -> bool {
        self.intersects_node(0, ray)
    }

    fn intersects_node(&self, node: u32, ray: &mut Ray) -> bool {
        let bounds = self.nodes[node as usize].bounds;
        if !ray_intersects_aabb(ray, &bounds) {
            return false;
        }
        match &self.nodes[node as usize].kind {
            KdNodeKind::Leaf { faces } => {
                let mut hit = false;
                for &f in faces {
                    hit |= ray.intersects_triangle(&self.triangle(f));
                }
                hit
            }
            KdNodeKind::Internal { left, right } => {
                let (left, right) = (*left, *right);
                let hit_left = self.intersects_node(left, ray);
                let hit_right = self.intersects_node(right, ray);
                hit_left || hit_right
            }
        }
    }

    /// All faces whose bounding boxes overlap `query`, deduplicated.
    #[must_use]
    pub fn faces_in_aabb(&self, query: &Aabb) -> Vec<u32> {
        let mut out = Vec::new();
        self.collect_in_aabb(0, query, &mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_in_aabb(&self, node: u32, query: &Aabb, out: &mut Vec<u32>) {
        let node = &self.nodes[node as usize];
        if !node.bounds.intersects(query) {
            return;
        }
        match &node.kind {
            KdNodeKind::Leaf { faces } => {
                for &f in faces {
                    if self.triangle(f).aabb().intersects(query) {
                        out.push(f);
                    }
                }
            }
            KdNodeKind::Internal { left, right } => {
                self.collect_in_aabb(*left, query, out);
                self.collect_in_aabb(*right, query, out);
            }
        }
    }
}

/// Squared distance from a point to a box (zero inside).
fn aabb_distance_squared(aabb: &Aabb, p: &Point3<f64>) -> f64 {
    let mut d2 = 0.0;
    for axis in 0..3 {
        let d = (aabb.min[axis] - p[axis]).max(0.0).max(p[axis] - aabb.max[axis]);
        d2 += d * d;
    }
    d2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, Vertex};
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_soup(n: usize, seed: u64) -> IndexedMesh {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mesh = IndexedMesh::with_capacity(3 * n, n);
        for f in 0..n {
            let base = Point3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            for _ in 0..3 {
                let jitter = Vector3::new(
                    rng.gen_range(-0.2..0.2),
                    rng.gen_range(-0.2..0.2),
                    rng.gen_range(-0.2..0.2),
                );
                mesh.vertices.push(Vertex::new(base + jitter));
            }
            let i = (3 * f) as u32;
            mesh.faces.push([i, i + 1, i + 2]);
        }
        mesh
    }

    #[test]
    fn empty_face_set_rejected() {
        let result = TriangleKdTree::build(&IndexedMesh::new(), KdSplitPolicy::Center);
        assert!(matches!(result, Err(SpatialError::EmptyFaceSet)));
    }

    #[test]
    fn nearest_matches_brute_force() {
        let soup = random_soup(1000, 7);
        let tree = TriangleKdTree::build(&soup, KdSplitPolicy::Center).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let q = Point3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
            );
            let (_, kd_d2) = tree.nearest(&q).unwrap();
            let brute = (0..soup.faces.len())
                .map(|f| soup.triangle(f).distance_squared(&q))
                .fold(f64::INFINITY, f64::min);
            assert_relative_eq!(kd_d2, brute, epsilon = 1e-9);
        }
    }

    #[test]
    fn median_policy_matches_brute_force() {
        let soup = random_soup(200, 21);
        let tree = TriangleKdTree::build(&soup, KdSplitPolicy::Median).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let q = Point3::new(
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1.5..1.5),
            );
            let (_, kd_d2) = tree.nearest(&q).unwrap();
            let brute = (0..soup.faces.len())
                .map(|f| soup.triangle(f).distance_squared(&q))
                .fold(f64::INFINITY, f64::min);
            assert_relative_eq!(kd_d2, brute, epsilon = 1e-9);
        }
    }

    #[test]
    fn ray_from_inside_cube_hits() {
        let tree = TriangleKdTree::build(&unit_cube(), KdSplitPolicy::Center).unwrap();
        let mut ray = Ray::new(Point3::origin(), Vector3::z());
        assert!(tree.intersects(&mut ray));
        assert_relative_eq!(ray.hit_param, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn ray_away_from_cube_misses() {
        let tree = TriangleKdTree::build(&unit_cube(), KdSplitPolicy::Center).unwrap();
        let mut ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::z());
        assert!(!tree.intersects(&mut ray));
    }

    #[test]
    fn faces_in_aabb_finds_top_faces() {
        let tree = TriangleKdTree::build(&unit_cube(), KdSplitPolicy::Center).unwrap();
        let query = Aabb::new(Point3::new(-0.6, -0.6, 0.45), Point3::new(0.6, 0.6, 0.55));
        let found = tree.faces_in_aabb(&query);
        // Both top-face triangles; side faces also touch z = 0.5.
        assert!(found.len() >= 2);
        for f in found {
            assert!(tree.triangle(f).aabb().max.z >= 0.45);
        }
    }
}
