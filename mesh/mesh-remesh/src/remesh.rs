//! Incremental isotropic remeshing.
//!
//! Iterates split / collapse / flip / tangential relaxation, optionally
//! followed by back-projection onto the input surface. Edges longer than
//! `4/3` of the local sizing are split, edges shorter than `4/5` are
//! collapsed, and flips reduce the deviation of vertex valences from 6
//! (interior) or 4 (boundary).

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, MeshTopology, Point3, Triangle, Vector3, Vertex};
use sw_spatial::{KdSplitPolicy, TriangleKdTree};
use tracing::debug;

use crate::error::{RemeshError, RemeshResult};
use crate::params::{RemeshParams, SizingMode};
use crate::result::{EdgeStatistics, RemeshOutput};
use crate::sizing::vertex_sizing;

/// Split threshold factor over the local sizing.
const SPLIT_FACTOR: f64 = 4.0 / 3.0;
/// Collapse threshold factor under the local sizing.
const COLLAPSE_FACTOR: f64 = 4.0 / 5.0;
/// Threshold scale for the convex-hull priority split pass.
const HULL_SPLIT_SCALE: f64 = 0.75;

/// Working copy of the mesh during remeshing.
struct Working {
    positions: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    sizing: Vec<f64>,
    locked: Vec<bool>,
}

/// Remeshes a surface toward the target sizing field.
///
/// # Errors
///
/// Returns an error for an empty mesh or invalid parameters.
///
/// # Example
///
/// ```
/// use mesh_remesh::{remesh, RemeshParams};
/// use mesh_types::unit_cube;
///
/// let params = RemeshParams::uniform(0.4).with_iterations(3).with_projection(false);
/// let output = remesh(&unit_cube(), &params).unwrap();
/// assert!(output.mesh.faces.len() >= 12);
/// ```
pub fn remesh(mesh: &IndexedMesh, params: &RemeshParams) -> RemeshResult<RemeshOutput> {
    if mesh.vertices.is_empty() {
        return Err(RemeshError::EmptyMesh);
    }
    if mesh.faces.is_empty() {
        return Err(RemeshError::NoFaces);
    }
    params.validate()?;

    let original_vertices = mesh.vertex_count();
    let original_faces = mesh.face_count();

    let mut working = Working {
        positions: mesh.vertices.iter().map(|v| v.position).collect(),
        faces: mesh.faces.clone(),
        sizing: vertex_sizing(mesh, &params.sizing)?,
        locked: vec![false; mesh.vertex_count()],
    };
    let original_edges = edge_statistics(&working.positions, &working.faces);

    let reference = if params.use_projection {
        Some(TriangleKdTree::build(mesh, KdSplitPolicy::Center).map_err(|_| RemeshError::NoFaces)?)
    } else {
        None
    };

    let mut total_splits = 0;
    let mut total_collapses = 0;
    let mut total_flips = 0;
    let mut iterations_run = 0;

    for iteration in 0..params.iterations {
        iterations_run = iteration + 1;
        mark_feature_vertices(&mut working, params.feature_angle);

        let mut splits = 0;
        if params.convex_hull_priority {
            splits += split_long_edges(&mut working, HULL_SPLIT_SCALE, true);
        }
        splits += split_long_edges(&mut working, 1.0, false);

        let collapses = collapse_short_edges(&mut working);
        let flips = flip_edges(&mut working);

        for _ in 0..params.smoothing_iterations {
            tangential_relax(&mut working);
        }
        if let Some(tree) = &reference {
            project_to_reference(&mut working, tree);
        }

        debug!(
            "remesh iteration {}: {} splits, {} collapses, {} flips",
            iteration + 1,
            splits,
            collapses,
            flips
        );
        total_splits += splits;
        total_collapses += collapses;
        total_flips += flips;

        if splits == 0 && collapses == 0 && flips == 0 {
            break;
        }
    }

    let mut result_mesh = IndexedMesh {
        vertices: working.positions.iter().map(|&p| Vertex::new(p)).collect(),
        faces: working.faces,
    };
    result_mesh.garbage_collect();
    let final_edges = edge_statistics(
        &result_mesh.vertices.iter().map(|v| v.position).collect::<Vec<_>>(),
        &result_mesh.faces,
    );

    Ok(RemeshOutput {
        mesh: result_mesh,
        original_vertices,
        original_faces,
        splits: total_splits,
        collapses: total_collapses,
        flips: total_flips,
        iterations_run,
        original_edges,
        final_edges,
    })
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn edge_faces(faces: &[[u32; 3]]) -> HashMap<(u32, u32), Vec<u32>> {
    let mut map: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
    for (fi, face) in faces.iter().enumerate() {
        for corner in 0..3 {
            let e = ordered(face[corner], face[(corner + 1) % 3]);
            map.entry(e).or_default().push(fi as u32);
        }
    }
    map
}

fn boundary_vertices(faces: &[[u32; 3]]) -> HashSet<u32> {
    edge_faces(faces)
        .iter()
        .filter(|(_, fs)| fs.len() == 1)
        .flat_map(|(&(a, b), _)| [a, b])
        .collect()
}

fn face_normal(positions: &[Point3<f64>], face: &[u32; 3]) -> Vector3<f64> {
    Triangle::new(
        positions[face[0] as usize],
        positions[face[1] as usize],
        positions[face[2] as usize],
    )
    .normal()
}

/// Locks vertices on sharp creases so collapse, flip, and relaxation
/// leave them alone.
fn mark_feature_vertices(working: &mut Working, feature_angle: Option<f64>) {
    working.locked.resize(working.positions.len(), false);
    for flag in &mut working.locked {
        *flag = false;
    }
    let Some(threshold) = feature_angle else {
        return;
    };

    let map = edge_faces(&working.faces);
    for (&(a, b), fs) in &map {
        if fs.len() != 2 {
            continue;
        }
        let n0 = face_normal(&working.positions, &working.faces[fs[0] as usize]);
        let n1 = face_normal(&working.positions, &working.faces[fs[1] as usize]);
        let dihedral = n0.dot(&n1).clamp(-1.0, 1.0).acos();
        if dihedral > threshold {
            working.locked[a as usize] = true;
            working.locked[b as usize] = true;
        }
    }
}

/// Splits edges longer than `scale * 4/3 * min(sizing)` at their
/// midpoints. With `longest_edge_only`, an edge is considered only where
/// it is the longest edge of one of its faces (the convex-hull priority
/// pass).
fn split_long_edges(working: &mut Working, scale: f64, longest_edge_only: bool) -> usize {
    let mut candidates: Vec<(u32, u32, f64)> = Vec::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();

    for face in &working.faces {
        let lengths: Vec<(usize, f64)> = (0..3)
            .map(|corner| {
                let a = face[corner] as usize;
                let b = face[(corner + 1) % 3] as usize;
                (corner, (working.positions[a] - working.positions[b]).norm())
            })
            .collect();
        let longest = lengths
            .iter()
            .cloned()
            .fold((0usize, f64::NEG_INFINITY), |acc, x| {
                if x.1 > acc.1 {
                    x
                } else {
                    acc
                }
            });

        for &(corner, length) in &lengths {
            if longest_edge_only && corner != longest.0 {
                continue;
            }
            let a = face[corner];
            let b = face[(corner + 1) % 3];
            let threshold = scale
                * SPLIT_FACTOR
                * working.sizing[a as usize].min(working.sizing[b as usize]);
            if length > threshold && seen.insert(ordered(a, b)) {
                candidates.push((a, b, length));
            }
        }
    }

    // Longest first so one pass makes the most progress.
    candidates.sort_by(|x, y| y.2.total_cmp(&x.2));

    let mut splits = 0;
    for (a, b, _) in candidates {
        if split_edge(working, a, b) {
            splits += 1;
        }
    }
    splits
}

/// Splits one edge, replacing each adjacent face with two.
fn split_edge(working: &mut Working, a: u32, b: u32) -> bool {
    let mut adjacent: Vec<usize> = Vec::new();
    for (fi, face) in working.faces.iter().enumerate() {
        for corner in 0..3 {
            let u = face[corner];
            let v = face[(corner + 1) % 3];
            if (u == a && v == b) || (u == b && v == a) {
                adjacent.push(fi);
                break;
            }
        }
    }
    if adjacent.is_empty() {
        return false;
    }

    let pa = working.positions[a as usize];
    let pb = working.positions[b as usize];
    let mid = working.positions.len() as u32;
    working
        .positions
        .push(Point3::from((pa.coords + pb.coords) * 0.5));
    working.sizing.push(
        (working.sizing[a as usize] + working.sizing[b as usize]) * 0.5,
    );
    working
        .locked
        .push(working.locked[a as usize] && working.locked[b as usize]);

    let mut new_faces = Vec::with_capacity(adjacent.len());
    for &fi in adjacent.iter().rev() {
        let face = working.faces.swap_remove(fi);
        // Keep the winding of the original face in both halves.
        let corner = (0..3)
            .find(|&c| {
                let u = face[c];
                let v = face[(c + 1) % 3];
                (u == a && v == b) || (u == b && v == a)
            })
            .unwrap_or(0);
        let u = face[corner];
        let v = face[(corner + 1) % 3];
        let w = face[(corner + 2) % 3];
        new_faces.push([u, mid, w]);
        new_faces.push([mid, v, w]);
    }
    working.faces.extend(new_faces);
    true
}

/// Collapses edges shorter than `4/5 * min(sizing)`, guarded against
/// feature vertices, boundary topology changes, non-manifold links,
/// normal flips, and over-long result edges.
fn collapse_short_edges(working: &mut Working) -> usize {
    let boundary = boundary_vertices(&working.faces);

    let mut candidates: Vec<(u32, u32, f64)> = Vec::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    for face in &working.faces {
        for corner in 0..3 {
            let a = face[corner];
            let b = face[(corner + 1) % 3];
            let length = (working.positions[a as usize] - working.positions[b as usize]).norm();
            let threshold =
                COLLAPSE_FACTOR * working.sizing[a as usize].min(working.sizing[b as usize]);
            if length < threshold && seen.insert(ordered(a, b)) {
                candidates.push((a, b, length));
            }
        }
    }
    candidates.sort_by(|x, y| x.2.total_cmp(&y.2));

    let mut collapses = 0;
    let mut removed: HashSet<u32> = HashSet::new();
    for (keep, remove, _) in candidates {
        if removed.contains(&keep) || removed.contains(&remove) {
            continue;
        }
        if working.locked[keep as usize] || working.locked[remove as usize] {
            continue;
        }
        if boundary.contains(&keep) || boundary.contains(&remove) {
            continue;
        }
        if collapse_edge(working, keep, remove) {
            removed.insert(remove);
            collapses += 1;
        }
    }
    collapses
}

/// Collapses `remove` into `keep` if all validity checks pass.
fn collapse_edge(working: &mut Working, keep: u32, remove: u32) -> bool {
    // Neighbor rings.
    let mut ring_keep: HashSet<u32> = HashSet::new();
    let mut ring_remove: HashSet<u32> = HashSet::new();
    let mut shared_faces = 0usize;
    for face in &working.faces {
        let has_keep = face.contains(&keep);
        let has_remove = face.contains(&remove);
        if has_keep && has_remove {
            shared_faces += 1;
        }
        for &v in face {
            if has_keep && v != keep {
                ring_keep.insert(v);
            }
            if has_remove && v != remove {
                ring_remove.insert(v);
            }
        }
    }
    if shared_faces != 2 {
        return false; // boundary or non-manifold edge
    }
    // Link condition: the rings may only share the two opposite vertices.
    if ring_keep.intersection(&ring_remove).count() != 2 {
        return false;
    }

    // Geometric guards on the faces that survive the collapse.
    let p_keep = working.positions[keep as usize];
    let max_edge = SPLIT_FACTOR * working.sizing[keep as usize];
    for face in &working.faces {
        if !face.contains(&remove) || face.contains(&keep) {
            continue;
        }
        let before = face_normal(&working.positions, face);
        let moved = face.map(|v| if v == remove { keep } else { v });
        let tri = Triangle::new(
            working.positions[moved[0] as usize],
            working.positions[moved[1] as usize],
            working.positions[moved[2] as usize],
        );
        if tri.is_degenerate(1e-12) || tri.normal().dot(&before) <= 0.0 {
            return false;
        }
        for &v in &moved {
            if v != keep && (working.positions[v as usize] - p_keep).norm() > max_edge {
                return false;
            }
        }
    }

    // Execute: remap and drop the two degenerate faces.
    for face in &mut working.faces {
        for v in face.iter_mut() {
            if *v == remove {
                *v = keep;
            }
        }
    }
    working
        .faces
        .retain(|f| f[0] != f[1] && f[1] != f[2] && f[2] != f[0]);
    true
}

/// Flips interior edges when doing so strictly reduces the total valence
/// deviation from the target (6 interior, 4 boundary).
fn flip_edges(working: &mut Working) -> usize {
    let boundary = boundary_vertices(&working.faces);
    let mut valence = vec![0i64; working.positions.len()];
    {
        let mut neighbor_sets: Vec<HashSet<u32>> = vec![HashSet::new(); working.positions.len()];
        for face in &working.faces {
            for corner in 0..3 {
                let v = face[corner];
                neighbor_sets[v as usize].insert(face[(corner + 1) % 3]);
                neighbor_sets[v as usize].insert(face[(corner + 2) % 3]);
            }
        }
        for (v, set) in neighbor_sets.iter().enumerate() {
            valence[v] = set.len() as i64;
        }
    }
    let target = |v: u32| -> i64 {
        if boundary.contains(&v) {
            4
        } else {
            6
        }
    };
    let deviation = |v: u32, valence: &[i64]| -> i64 {
        (valence[v as usize] - target(v)).abs()
    };

    let map = edge_faces(&working.faces);
    let mut edge_set: HashSet<(u32, u32)> = map.keys().copied().collect();
    let mut flips = 0;

    for (&(a, b), fs) in &map {
        if fs.len() != 2 {
            continue;
        }
        if working.locked[a as usize] || working.locked[b as usize] {
            continue;
        }
        let f0 = working.faces[fs[0] as usize];
        let f1 = working.faces[fs[1] as usize];
        // Faces may have been rewritten by an earlier flip this pass.
        if !(f0.contains(&a) && f0.contains(&b) && f1.contains(&a) && f1.contains(&b)) {
            continue;
        }
        // Orient (a, b) along f0's winding so the rebuilt triangles keep
        // the mesh orientation.
        let (a, b) = if (0..3).any(|c| f0[c] == a && f0[(c + 1) % 3] == b) {
            (a, b)
        } else {
            (b, a)
        };
        let Some(c) = f0.iter().copied().find(|&v| v != a && v != b) else {
            continue;
        };
        let Some(d) = f1.iter().copied().find(|&v| v != a && v != b) else {
            continue;
        };
        if edge_set.contains(&ordered(c, d)) {
            continue;
        }

        let before = deviation(a, &valence)
            + deviation(b, &valence)
            + deviation(c, &valence)
            + deviation(d, &valence);
        valence[a as usize] -= 1;
        valence[b as usize] -= 1;
        valence[c as usize] += 1;
        valence[d as usize] += 1;
        let after = deviation(a, &valence)
            + deviation(b, &valence)
            + deviation(c, &valence)
            + deviation(d, &valence);
        if after >= before {
            valence[a as usize] += 1;
            valence[b as usize] += 1;
            valence[c as usize] -= 1;
            valence[d as usize] -= 1;
            continue;
        }

        // Geometric validity of the two new triangles.
        let old_normal =
            face_normal(&working.positions, &f0) + face_normal(&working.positions, &f1);
        let n0 = face_normal(&working.positions, &[a, d, c]);
        let n1 = face_normal(&working.positions, &[b, c, d]);
        let degenerate = n0 == Vector3::zeros() || n1 == Vector3::zeros();
        if degenerate || n0.dot(&old_normal) <= 0.0 || n1.dot(&old_normal) <= 0.0 {
            valence[a as usize] += 1;
            valence[b as usize] += 1;
            valence[c as usize] -= 1;
            valence[d as usize] -= 1;
            continue;
        }

        working.faces[fs[0] as usize] = [a, d, c];
        working.faces[fs[1] as usize] = [b, c, d];
        edge_set.remove(&ordered(a, b));
        edge_set.insert(ordered(c, d));
        flips += 1;
    }
    flips
}

/// Moves each free vertex toward the centroid of its one-ring, restricted
/// to the tangent plane.
fn tangential_relax(working: &mut Working) {
    let boundary = boundary_vertices(&working.faces);

    let mut normals = vec![Vector3::zeros(); working.positions.len()];
    let mut centroid_sums = vec![Vector3::zeros(); working.positions.len()];
    let mut weights = vec![0.0f64; working.positions.len()];
    for face in &working.faces {
        let tri = Triangle::new(
            working.positions[face[0] as usize],
            working.positions[face[1] as usize],
            working.positions[face[2] as usize],
        );
        let area = tri.area();
        let n = tri.scaled_normal();
        let centroid = tri.centroid();
        for &v in face {
            normals[v as usize] += n;
            centroid_sums[v as usize] += centroid.coords * area;
            weights[v as usize] += area;
        }
    }

    for v in 0..working.positions.len() {
        if boundary.contains(&(v as u32)) || working.locked[v] || weights[v] < 1e-15 {
            continue;
        }
        let Some(normal) = normals[v].try_normalize(f64::EPSILON) else {
            continue;
        };
        let centroid = centroid_sums[v] / weights[v];
        let offset = centroid - working.positions[v].coords;
        let tangential = offset - normal * offset.dot(&normal);
        working.positions[v] += tangential;
    }
}

/// Snaps free vertices back onto the reference surface.
fn project_to_reference(working: &mut Working, tree: &TriangleKdTree) {
    let boundary = boundary_vertices(&working.faces);
    for v in 0..working.positions.len() {
        if boundary.contains(&(v as u32)) || working.locked[v] {
            continue;
        }
        if let Some((face, _)) = tree.nearest(&working.positions[v]) {
            working.positions[v] = tree.triangle(face).closest_point(&working.positions[v]);
        }
    }
}

/// Edge length statistics over the distinct edges of a face list.
fn edge_statistics(positions: &[Point3<f64>], faces: &[[u32; 3]]) -> EdgeStatistics {
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut min_length = f64::INFINITY;
    let mut max_length: f64 = 0.0;
    let mut sum = 0.0;
    for face in faces {
        for corner in 0..3 {
            let e = ordered(face[corner], face[(corner + 1) % 3]);
            if seen.insert(e) {
                let length = (positions[e.0 as usize] - positions[e.1 as usize]).norm();
                min_length = min_length.min(length);
                max_length = max_length.max(length);
                sum += length;
            }
        }
    }
    let edge_count = seen.len();
    EdgeStatistics {
        min_length: if edge_count == 0 { 0.0 } else { min_length },
        max_length,
        mean_length: if edge_count == 0 { 0.0 } else { sum / edge_count as f64 },
        edge_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_subdivide::ico_sphere;
    use mesh_types::unit_cube;

    #[test]
    fn empty_inputs_rejected() {
        assert!(matches!(
            remesh(&IndexedMesh::new(), &RemeshParams::uniform(0.1)),
            Err(RemeshError::EmptyMesh)
        ));
        let mut vertices_only = IndexedMesh::new();
        vertices_only.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(matches!(
            remesh(&vertices_only, &RemeshParams::uniform(0.1)),
            Err(RemeshError::NoFaces)
        ));
    }

    #[test]
    fn uniform_refines_coarse_sphere() {
        let sphere = ico_sphere(1, 1.0);
        let target = 0.25;
        let params = RemeshParams::uniform(target).with_iterations(6);
        let output = remesh(&sphere, &params).unwrap();

        assert!(output.splits > 0);
        assert!(output.mesh.faces.len() > sphere.faces.len());
        // Sizing bounds with margin: splits bound the long side, collapse
        // guards may leave a few short stragglers.
        assert!(output.final_edges.max_length <= SPLIT_FACTOR * target * 1.1);
        assert!(output.final_edges.mean_length > 0.5 * target);
        assert!(output.final_edges.min_length > 0.3 * COLLAPSE_FACTOR * target);
    }

    #[test]
    fn uniform_coarsens_fine_sphere() {
        let sphere = ico_sphere(3, 1.0);
        let original_faces = sphere.faces.len();
        let params = RemeshParams::uniform(0.5).with_iterations(6);
        let output = remesh(&sphere, &params).unwrap();
        assert!(output.collapses > 0);
        assert!(output.mesh.faces.len() < original_faces);
    }

    #[test]
    fn remeshed_sphere_stays_closed_manifold() {
        let sphere = ico_sphere(2, 1.0);
        let params = RemeshParams::uniform(0.3).with_iterations(5);
        let output = remesh(&sphere, &params).unwrap();
        let adjacency = mesh_types::MeshAdjacency::build(&output.mesh.faces);
        assert!(adjacency.is_closed_manifold());
    }

    #[test]
    fn projection_keeps_vertices_on_sphere() {
        let sphere = ico_sphere(2, 1.0);
        let params = RemeshParams::uniform(0.3).with_iterations(4);
        let output = remesh(&sphere, &params).unwrap();
        for v in &output.mesh.vertices {
            let r = v.position.coords.norm();
            // Chordal sag of the level-2 ico-sphere is about 2%.
            assert!((0.95..=1.001).contains(&r), "radius {r} off the sphere");
        }
    }

    #[test]
    fn adaptive_sizing_runs_on_sphere() {
        let sphere = ico_sphere(2, 1.0);
        let params = RemeshParams::adaptive(0.1, 0.5, 0.1).with_iterations(4);
        let output = remesh(&sphere, &params).unwrap();
        let adjacency = mesh_types::MeshAdjacency::build(&output.mesh.faces);
        assert!(adjacency.is_closed_manifold());
        assert!(output.final_edges.max_length <= SPLIT_FACTOR * 0.5 * 1.1);
    }

    #[test]
    fn feature_angle_locks_cube_corners() {
        // All cube vertices sit on 90-degree creases; with feature locking
        // nothing may move them or collapse them away.
        let cube = unit_cube();
        let params = RemeshParams::uniform(0.6)
            .with_iterations(3)
            .with_feature_angle(0.5)
            .with_projection(false);
        let output = remesh(&cube, &params).unwrap();
        for corner in &cube.vertices {
            let kept = output
                .mesh
                .vertices
                .iter()
                .any(|v| (v.position - corner.position).norm() < 1e-9);
            assert!(kept, "corner {:?} lost", corner.position);
        }
    }

    #[test]
    fn convex_hull_mode_splits_elongated_faces() {
        // Stretch a sphere along x to create elongated triangles.
        let mut stretched = ico_sphere(1, 1.0);
        for v in &mut stretched.vertices {
            v.position.x *= 4.0;
        }
        let params = RemeshParams::uniform(0.6)
            .with_iterations(4)
            .with_convex_hull_priority(true)
            .with_projection(false);
        let output = remesh(&stretched, &params).unwrap();
        assert!(output.splits > 0);
        assert!(output.final_edges.max_length <= SPLIT_FACTOR * 0.6 * 1.2);
    }
}
