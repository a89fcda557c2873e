//! Legacy VTK export.
//!
//! Writes version-3 legacy ASCII files: `POLYDATA` for meshes and
//! `STRUCTURED_POINTS` for scalar grids. Write-only; the modern pipeline
//! reads VTI instead.

use std::fs;
use std::io::Write;
use std::path::Path;

use mesh_types::IndexedMesh;
use sw_spatial::ScalarGrid;

use crate::error::IoResult;

/// Saves a mesh as legacy VTK `POLYDATA`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_mesh_vtk<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = fs::File::create(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "shrinkwrap surface")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;

    writeln!(writer, "POINTS {} double", mesh.vertices.len())?;
    for v in &mesh.vertices {
        writeln!(writer, "{} {} {}", v.position.x, v.position.y, v.position.z)?;
    }

    writeln!(writer, "POLYGONS {} {}", mesh.faces.len(), mesh.faces.len() * 4)?;
    for face in &mesh.faces {
        writeln!(writer, "3 {} {} {}", face[0], face[1], face[2])?;
    }
    Ok(())
}

/// Saves a scalar grid as legacy VTK `STRUCTURED_POINTS`.
///
/// Point data lives at cell centers, so the origin is the center of the
/// first cell.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_grid_vtk<P: AsRef<Path>>(grid: &ScalarGrid, path: P) -> IoResult<()> {
    let file = fs::File::create(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    let (nx, ny, nz) = grid.dimensions().as_tuple();
    let h = grid.cell_size();
    let origin = grid.cell_center(0, 0, 0);

    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "shrinkwrap distance field")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET STRUCTURED_POINTS")?;
    writeln!(writer, "DIMENSIONS {nx} {ny} {nz}")?;
    writeln!(writer, "ORIGIN {} {} {}", origin.x, origin.y, origin.z)?;
    writeln!(writer, "SPACING {h} {h} {h}")?;
    writeln!(writer, "POINT_DATA {}", nx * ny * nz)?;
    writeln!(writer, "SCALARS distance double 1")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for v in grid.values() {
        writeln!(writer, "{v}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Aabb, Point3};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shrinkwrap-vtktest-{}-{name}", std::process::id()))
    }

    #[test]
    fn mesh_file_has_polydata_sections() {
        let path = temp_path("mesh.vtk");
        save_mesh_vtk(&mesh_types::unit_cube(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("DATASET POLYDATA"));
        assert!(text.contains("POINTS 8 double"));
        assert!(text.contains("POLYGONS 12 48"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn grid_file_has_structured_points_sections() {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let grid = ScalarGrid::with_init(0.5, &bounds, 1.5).unwrap();
        let path = temp_path("grid.vtk");
        save_grid_vtk(&grid, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("DATASET STRUCTURED_POINTS"));
        assert!(text.contains("DIMENSIONS 2 2 2"));
        assert!(text.contains("POINT_DATA 8"));
        assert!(text.contains("1.5"));
        fs::remove_file(path).ok();
    }
}
