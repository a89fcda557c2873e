//! Closed-form count progressions for 1-to-4 subdivision.

/// Vertex/edge/face counts for `steps` subdivision levels, inclusive of
/// level 0.
///
/// Each level applies `V' = V + E`, `E' = 2E + 3F`, `F' = 4F`, which holds
/// for any triangle mesh under midpoint-style 1-to-4 splitting.
///
/// # Example
///
/// ```
/// use mesh_subdivide::subdivision_counts;
///
/// // A tetrahedron: V=4, E=6, F=4.
/// let progression = subdivision_counts(4, 6, 4, 2);
/// assert_eq!(progression[1], (10, 24, 16));
/// assert_eq!(progression[2], (34, 96, 64));
/// ```
#[must_use]
pub fn subdivision_counts(
    vertices: u64,
    edges: u64,
    faces: u64,
    steps: u32,
) -> Vec<(u64, u64, u64)> {
    let mut progression = Vec::with_capacity(steps as usize + 1);
    let (mut v, mut e, mut f) = (vertices, edges, faces);
    progression.push((v, e, f));
    for _ in 0..steps {
        let v_next = v + e;
        let e_next = 2 * e + 3 * f;
        let f_next = 4 * f;
        v = v_next;
        e = e_next;
        f = f_next;
        progression.push((v, e, f));
    }
    progression
}

/// Boundary edge count after `steps` subdivisions: each split doubles
/// every boundary edge, so `E_bd(s) = 2^s * E_bd(0)`.
#[must_use]
pub const fn boundary_edge_count(initial: u64, steps: u32) -> u64 {
    initial << steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedron_progression() {
        let p = subdivision_counts(4, 6, 4, 6);
        assert_eq!(p[0], (4, 6, 4));
        assert_eq!(p[3], (130, 384, 256));
        // Closed mesh: Euler characteristic 2 is preserved at every level.
        for &(v, e, f) in &p {
            assert_eq!(v as i64 - e as i64 + f as i64, 2);
        }
    }

    #[test]
    fn icosahedron_progression_matches_ico_formulas() {
        let p = subdivision_counts(12, 30, 20, 4);
        for (k, &(v, e, f)) in p.iter().enumerate() {
            let k = k as u32;
            assert_eq!(v, crate::ico_sphere_vertex_count(k));
            assert_eq!(e, crate::ico_sphere_edge_count(k));
            assert_eq!(f, crate::ico_sphere_face_count(k));
        }
    }

    #[test]
    fn boundary_edges_double() {
        assert_eq!(boundary_edge_count(3, 0), 3);
        assert_eq!(boundary_edge_count(3, 4), 48);
    }
}
