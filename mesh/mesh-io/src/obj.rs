//! Wavefront OBJ support.
//!
//! The reader parses `v`, `vn`, and `f` records; faces with more than
//! three corners are fan-triangulated. Parsing runs over newline-aligned
//! byte chunks on the thread pool by default; chunk results are joined in
//! chunk order.
//!
//! **Ordering contract**: with parallel parsing, face order is the chunk
//! concatenation order, not guaranteed to be the file order. Load with
//! [`load_obj_with`] and `parallel = false` when downstream code relies
//! on file ordering.

use std::fs;
use std::io::Write;
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};
use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Byte size under which parallel parsing is not worth the fan-out.
const PARALLEL_THRESHOLD_BYTES: usize = 1 << 16;

/// Per-chunk parse output.
#[derive(Debug, Default)]
struct ChunkData {
    vertices: Vec<Vertex>,
    normals: Vec<Vector3<f64>>,
    faces: Vec<Vec<u32>>,
}

/// Loads a mesh from an OBJ file with parallel chunk parsing.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a record is malformed.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_obj;
///
/// let mesh = load_obj("model.obj").unwrap();
/// println!("{} faces", mesh.faces.len());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    load_obj_with(path, true)
}

/// Loads a mesh from an OBJ file, optionally in parallel.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a record is malformed.
pub fn load_obj_with<P: AsRef<Path>>(path: P, parallel: bool) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    let chunks: Vec<ChunkData> =
        if parallel && content.len() > PARALLEL_THRESHOLD_BYTES {
            let ranges = newline_aligned_ranges(content.as_bytes(), rayon::current_num_threads());
            debug!("parsing OBJ in {} chunks", ranges.len());
            ranges
                .into_par_iter()
                .map(|(start, end)| parse_chunk(&content[start..end]))
                .collect::<IoResult<Vec<_>>>()?
        } else {
            vec![parse_chunk(&content)?]
        };

    // Join in chunk order; vertex indices in OBJ are absolute, so the
    // concatenation preserves them.
    let mut mesh = IndexedMesh::new();
    let mut normal_count = 0usize;
    let mut polygons: Vec<Vec<u32>> = Vec::new();
    for chunk in chunks {
        mesh.vertices.extend(chunk.vertices);
        normal_count += chunk.normals.len();
        polygons.extend(chunk.faces);
    }

    let vertex_count = mesh.vertices.len() as u32;
    for polygon in polygons {
        if polygon.len() < 3 {
            return Err(IoError::invalid_content("face with fewer than 3 corners"));
        }
        if let Some(&bad) = polygon.iter().find(|&&v| v >= vertex_count) {
            return Err(IoError::invalid_content(format!(
                "face index {} out of range ({} vertices)",
                bad + 1,
                vertex_count
            )));
        }
        for corner in 1..polygon.len() - 1 {
            mesh.faces
                .push([polygon[0], polygon[corner], polygon[corner + 1]]);
        }
    }

    debug!(
        "loaded OBJ: {} vertices, {} faces, {} normals",
        mesh.vertices.len(),
        mesh.faces.len(),
        normal_count
    );
    Ok(mesh)
}

/// Splits `bytes` into roughly equal ranges, each ending on a newline.
fn newline_aligned_ranges(bytes: &[u8], want: usize) -> Vec<(usize, usize)> {
    let want = want.max(1);
    let step = bytes.len().div_ceil(want);
    let mut ranges = Vec::with_capacity(want);
    let mut start = 0;
    while start < bytes.len() {
        let mut end = (start + step).min(bytes.len());
        while end < bytes.len() && bytes[end - 1] != b'\n' {
            end += 1;
        }
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Parses the `v` / `vn` / `f` records of one chunk.
fn parse_chunk(text: &str) -> IoResult<ChunkData> {
    let mut data = ChunkData::default();
    for line in text.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("v ") {
            let [x, y, z] = parse_three_floats(rest)?;
            data.vertices.push(Vertex::from_coords(x, y, z));
        } else if let Some(rest) = line.strip_prefix("vn ") {
            let [x, y, z] = parse_three_floats(rest)?;
            data.normals.push(Vector3::new(x, y, z));
        } else if let Some(rest) = line.strip_prefix("f ") {
            let mut polygon = Vec::with_capacity(4);
            for token in rest.split_whitespace() {
                let index_text = token.split('/').next().unwrap_or(token);
                let index: i64 = index_text.parse()?;
                if index < 1 {
                    return Err(IoError::invalid_content(format!(
                        "unsupported face index {index} (relative indices are not supported)"
                    )));
                }
                polygon.push((index - 1) as u32);
            }
            data.faces.push(polygon);
        }
    }
    Ok(data)
}

fn parse_three_floats(text: &str) -> IoResult<[f64; 3]> {
    let mut out = [0.0f64; 3];
    let mut fields = text.split_whitespace();
    for slot in &mut out {
        let token = fields
            .next()
            .ok_or_else(|| IoError::invalid_content("expected 3 coordinates"))?;
        *slot = token.parse()?;
    }
    Ok(out)
}

/// Saves a mesh as ASCII OBJ.
///
/// Coordinates are written with round-trip precision: loading the file
/// back yields bit-equal positions.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = fs::File::create(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "# {} vertices, {} faces", mesh.vertices.len(), mesh.faces.len())?;
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.position.x, v.position.y, v.position.z)?;
    }
    for face in &mesh.faces {
        writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shrinkwrap-objtest-{}-{name}", std::process::id()))
    }

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = temp_path(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_vertices_and_faces() {
        let path = write_temp("basic.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mesh = load_obj(&path).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn quads_are_fan_triangulated() {
        let path = write_temp(
            "quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1/1 2/2 3/3 4/4\n",
        );
        let mesh = load_obj(&path).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn out_of_range_index_rejected() {
        let path = write_temp("bad.obj", "v 0 0 0\nf 1 2 3\n");
        assert!(load_obj(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn roundtrip_positions_bit_equal() {
        let sphere = mesh_subdivide::ico_sphere(2, 1.0);
        let path = temp_path("roundtrip.obj");
        save_obj(&sphere, &path).unwrap();
        let loaded = load_obj(&path).unwrap();

        assert_eq!(loaded.vertices.len(), sphere.vertices.len());
        for (a, b) in sphere.vertices.iter().zip(&loaded.vertices) {
            assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
            assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
            assert_eq!(a.position.z.to_bits(), b.position.z.to_bits());
        }
        assert_eq!(loaded.faces, sphere.faces);
        fs::remove_file(path).ok();
    }

    #[test]
    fn parallel_and_serial_agree() {
        // Build a file large enough to trigger chunked parsing.
        let sphere = mesh_subdivide::ico_sphere(4, 1.0);
        let path = temp_path("parallel.obj");
        save_obj(&sphere, &path).unwrap();
        assert!(fs::metadata(&path).unwrap().len() as usize > PARALLEL_THRESHOLD_BYTES);

        let parallel = load_obj_with(&path, true).unwrap();
        let serial = load_obj_with(&path, false).unwrap();
        assert_eq!(parallel.vertices, serial.vertices);
        assert_eq!(parallel.faces, serial.faces);
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_obj("/nonexistent/missing.obj").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
