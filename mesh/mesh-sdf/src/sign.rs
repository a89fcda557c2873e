//! Sign determination for the unsigned narrow-band field.

use std::collections::VecDeque;

use mesh_types::{MeshAdjacency, Point3, Triangle, Vector3};
use rayon::prelude::*;
use sw_spatial::{ScalarGrid, TriangleKdTree};
use tracing::debug;

/// Flood-fills "outside" from the grid boundary and negates every
/// unreached cell.
///
/// The fill moves along 6-connected neighbors and only enters cells whose
/// value exceeds the interior safety margin (one cell size), so it cannot
/// leak through the narrow band of a closed surface. Cells the fill never
/// reaches are interior.
pub(crate) fn apply_flood_fill_sign(grid: &mut ScalarGrid) {
    let (nx, ny, nz) = grid.dimensions().as_tuple();
    let n = nx * ny * nz;
    let margin = grid.cell_size();

    let mut outside = vec![false; n];
    let mut queue: VecDeque<(usize, usize, usize)> = VecDeque::new();

    // Every grid-boundary cell starts outside.
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                if x == 0 || y == 0 || z == 0 || x == nx - 1 || y == ny - 1 || z == nz - 1 {
                    let i = grid.linear_index(x, y, z);
                    if !outside[i] {
                        outside[i] = true;
                        queue.push_back((x, y, z));
                    }
                }
            }
        }
    }

    while let Some((x, y, z)) = queue.pop_front() {
        let neighbors = [
            (x.wrapping_sub(1), y, z),
            (x + 1, y, z),
            (x, y.wrapping_sub(1), z),
            (x, y + 1, z),
            (x, y, z.wrapping_sub(1)),
            (x, y, z + 1),
        ];
        for (px, py, pz) in neighbors {
            if px >= nx || py >= ny || pz >= nz {
                continue;
            }
            let i = grid.linear_index(px, py, pz);
            if !outside[i] && grid.values()[i] > margin {
                outside[i] = true;
                queue.push_back((px, py, pz));
            }
        }
    }

    let mut interior = 0usize;
    let values = grid.values_mut();
    for (i, v) in values.iter_mut().enumerate() {
        if !outside[i] {
            *v = -*v;
            interior += 1;
        }
    }
    debug!("flood fill: {interior} interior cells of {n}");
}

/// Signs each cell by the angle-weighted pseudonormal at its closest
/// surface feature.
///
/// The closest point is classified into a face, edge, or vertex region
/// from its barycentric coordinates; the pseudonormal is the face normal,
/// the sum of the two adjacent face normals, or the angle-weighted sum of
/// the incident face normals respectively (Baerentzen & Aanaes).
pub(crate) fn apply_pseudonormal_sign(
    grid: &mut ScalarGrid,
    faces: &[[u32; 3]],
    positions: &[Point3<f64>],
    tree: &TriangleKdTree,
) {
    let adjacency = MeshAdjacency::build(faces);
    let face_normals: Vec<Vector3<f64>> = faces
        .iter()
        .map(|&[i, j, k]| {
            Triangle::new(
                positions[i as usize],
                positions[j as usize],
                positions[k as usize],
            )
            .normal()
        })
        .collect();

    let (nx, ny, nz) = grid.dimensions().as_tuple();
    let n = nx * ny * nz;

    let negative: Vec<bool> = (0..n)
        .into_par_iter()
        .map(|i| {
            let x = i % nx;
            let y = (i / nx) % ny;
            let z = i / (nx * ny);
            let p = grid.cell_center(x, y, z);

            let Some((f, _)) = tree.nearest(&p) else {
                return false;
            };
            let tri = tree.triangle(f);
            let q = tri.closest_point(&p);
            let normal = pseudonormal_at(
                &q,
                f,
                faces,
                positions,
                &face_normals,
                &adjacency,
            );
            (p - q).dot(&normal) < 0.0
        })
        .collect();

    let values = grid.values_mut();
    for (i, neg) in negative.iter().enumerate() {
        if *neg {
            values[i] = -values[i];
        }
    }
}

/// Barycentric coordinates of `q` with respect to the triangle.
fn barycentric(tri: &Triangle, q: &Point3<f64>) -> (f64, f64, f64) {
    let v0 = tri.b - tri.a;
    let v1 = tri.c - tri.a;
    let v2 = q - tri.a;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < f64::EPSILON {
        return (1.0, 0.0, 0.0);
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    (1.0 - v - w, v, w)
}

/// Pseudonormal at the closest feature of face `f` containing `q`.
fn pseudonormal_at(
    q: &Point3<f64>,
    f: u32,
    faces: &[[u32; 3]],
    positions: &[Point3<f64>],
    face_normals: &[Vector3<f64>],
    adjacency: &MeshAdjacency,
) -> Vector3<f64> {
    const BARY_EPS: f64 = 1e-9;
    let corners = faces[f as usize];
    let tri = Triangle::new(
        positions[corners[0] as usize],
        positions[corners[1] as usize],
        positions[corners[2] as usize],
    );
    let (u, v, w) = barycentric(&tri, q);
    let bary = [u, v, w];
    let zero: Vec<usize> = (0..3).filter(|&c| bary[c] < BARY_EPS).collect();

    match zero.len() {
        // Interior of the face.
        0 => face_normals[f as usize],
        // On an edge: average of the two adjacent face normals.
        1 => {
            let (a, b) = match zero[0] {
                0 => (corners[1], corners[2]),
                1 => (corners[2], corners[0]),
                _ => (corners[0], corners[1]),
            };
            adjacency
                .faces_for_edge(a, b)
                .map_or(face_normals[f as usize], |fs| {
                    fs.iter()
                        .fold(Vector3::zeros(), |acc, &g| acc + face_normals[g as usize])
                })
        }
        // At a vertex: angle-weighted sum of incident face normals.
        _ => {
            let corner = (0..3).find(|c| !zero.contains(c)).unwrap_or(0);
            let vertex = corners[corner];
            let mut sum = Vector3::zeros();
            for &g in adjacency.faces_for_vertex(vertex) {
                let gc = faces[g as usize];
                let gt = Triangle::new(
                    positions[gc[0] as usize],
                    positions[gc[1] as usize],
                    positions[gc[2] as usize],
                );
                let angle_idx = gc.iter().position(|&c| c == vertex).unwrap_or(0);
                sum += face_normals[g as usize] * gt.angles()[angle_idx];
            }
            sum
        }
    }
}
