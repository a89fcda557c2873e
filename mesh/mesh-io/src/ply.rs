//! PLY (Polygon File Format) ASCII support.
//!
//! Reads and writes the ASCII subset: a header declaring `element vertex
//! N` with `x y z` float properties and `element face M` with a vertex
//! index list. Binary PLY is out of scope.

use std::fs;
use std::io::Write;
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};

use crate::error::{IoError, IoResult};

/// Loads a mesh from an ASCII PLY file.
///
/// Faces with more than three corners are fan-triangulated.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the header is not ASCII
/// PLY, or a record is malformed.
pub fn load_ply<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
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
    let mut lines = content.lines();

    if lines.next().map(str::trim) != Some("ply") {
        return Err(IoError::invalid_content("missing 'ply' magic line"));
    }

    let mut vertex_count = 0usize;
    let mut face_count = 0usize;
    let mut saw_format = false;
    for line in lines.by_ref() {
        let line = line.trim();
        if line == "end_header" {
            break;
        }
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("format") => {
                if fields.next() != Some("ascii") {
                    return Err(IoError::invalid_content("only ascii PLY is supported"));
                }
                saw_format = true;
            }
            Some("element") => match (fields.next(), fields.next()) {
                (Some("vertex"), Some(n)) => vertex_count = n.parse()?,
                (Some("face"), Some(n)) => face_count = n.parse()?,
                _ => {}
            },
            _ => {} // property declarations and comments
        }
    }
    if !saw_format {
        return Err(IoError::invalid_content("missing 'format' line"));
    }

    let mut mesh = IndexedMesh::with_capacity(vertex_count, face_count);
    for _ in 0..vertex_count {
        let line = lines
            .next()
            .ok_or_else(|| IoError::invalid_content("truncated vertex list"))?;
        let mut fields = line.split_whitespace();
        let mut coords = [0.0f64; 3];
        for slot in &mut coords {
            let token = fields
                .next()
                .ok_or_else(|| IoError::invalid_content("vertex with fewer than 3 floats"))?;
            *slot = token.parse()?;
        }
        mesh.vertices
            .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
    }

    for _ in 0..face_count {
        let line = lines
            .next()
            .ok_or_else(|| IoError::invalid_content("truncated face list"))?;
        let mut fields = line.split_whitespace();
        let count: usize = fields
            .next()
            .ok_or_else(|| IoError::invalid_content("face without corner count"))?
            .parse()?;
        let corners: Vec<u32> = fields
            .take(count)
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        if corners.len() != count || count < 3 {
            return Err(IoError::invalid_content("malformed face record"));
        }
        if let Some(&bad) = corners.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(IoError::invalid_content(format!("face index {bad} out of range")));
        }
        for i in 1..count - 1 {
            mesh.faces.push([corners[0], corners[i], corners[i + 1]]);
        }
    }

    Ok(mesh)
}

/// Saves a mesh as ASCII PLY.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_ply<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = fs::File::create(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", mesh.vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", mesh.faces.len())?;
    writeln!(writer, "property list uchar uint vertex_indices")?;
    writeln!(writer, "end_header")?;
    for v in &mesh.vertices {
        writeln!(writer, "{} {} {}", v.position.x, v.position.y, v.position.z)?;
    }
    for face in &mesh.faces {
        writeln!(writer, "3 {} {} {}", face[0], face[1], face[2])?;
    }
    Ok(())
}
