//! Mesh and field grid file I/O.
//!
//! Formats:
//!
//! - **OBJ** (read/write) - parallel chunked reader; see the ordering
//!   contract on [`load_obj_with`]
//! - **PLY** (read/write) - ASCII subset
//! - **VTK** (write) - legacy `POLYDATA` for meshes,
//!   `STRUCTURED_POINTS` for grids
//! - **VTI** (read/write) - ASCII ImageData for scalar grids
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! let mesh = load_mesh("model.obj").unwrap();
//! save_mesh(&mesh, "model.ply").unwrap();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod error;
mod obj;
mod ply;
mod vti;
mod vtk;

pub use error::{IoError, IoResult};
pub use obj::{load_obj, load_obj_with, save_obj};
pub use ply::{load_ply, save_ply};
pub use vti::{load_grid_vti, save_grid_vti};
pub use vtk::{save_grid_vtk, save_mesh_vtk};

use std::path::Path;

use mesh_types::IndexedMesh;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ.
    Obj,
    /// Polygon File Format (ASCII).
    Ply,
    /// Legacy VTK (write-only).
    Vtk,
    /// VTK ImageData (scalar grids only).
    Vti,
}

impl MeshFormat {
    /// Detects the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownFormat`] for unrecognized extensions.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "obj" => Ok(Self::Obj),
            "ply" => Ok(Self::Ply),
            "vtk" => Ok(Self::Vtk),
            "vti" => Ok(Self::Vti),
            _ => Err(IoError::UnknownFormat { extension }),
        }
    }
}

/// Loads a mesh, detecting the format from the extension.
///
/// # Errors
///
/// Returns an error for unknown extensions, grid-only formats, or parse
/// failures.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    match MeshFormat::from_path(&path)? {
        MeshFormat::Obj => load_obj(path),
        MeshFormat::Ply => load_ply(path),
        MeshFormat::Vtk => Err(IoError::UnsupportedOperation {
            format: "vtk",
            operation: "mesh loading",
        }),
        MeshFormat::Vti => Err(IoError::UnsupportedOperation {
            format: "vti",
            operation: "mesh loading",
        }),
    }
}

/// Saves a mesh, detecting the format from the extension.
///
/// # Errors
///
/// Returns an error for unknown extensions, grid-only formats, or write
/// failures.
pub fn save_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    match MeshFormat::from_path(&path)? {
        MeshFormat::Obj => save_obj(mesh, path),
        MeshFormat::Ply => save_ply(mesh, path),
        MeshFormat::Vtk => save_mesh_vtk(mesh, path),
        MeshFormat::Vti => Err(IoError::UnsupportedOperation {
            format: "vti",
            operation: "mesh saving",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection() {
        assert_eq!(MeshFormat::from_path("a.obj").unwrap(), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path("a.PLY").unwrap(), MeshFormat::Ply);
        assert_eq!(MeshFormat::from_path("a.vti").unwrap(), MeshFormat::Vti);
        assert!(MeshFormat::from_path("a.stl").is_err());
        assert!(MeshFormat::from_path("noext").is_err());
    }

    #[test]
    fn grid_formats_refuse_meshes() {
        let cube = mesh_types::unit_cube();
        let path = std::env::temp_dir().join(format!("shrinkwrap-io-{}.vti", std::process::id()));
        assert!(matches!(
            save_mesh(&cube, &path),
            Err(IoError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn dispatch_roundtrip_via_ply() {
        let cube = mesh_types::unit_cube();
        let path = std::env::temp_dir().join(format!("shrinkwrap-io-{}.ply", std::process::id()));
        save_mesh(&cube, &path).unwrap();
        let loaded = load_mesh(&path).unwrap();
        assert_eq!(loaded.faces, cube.faces);
        std::fs::remove_file(path).ok();
    }
}
