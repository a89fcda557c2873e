//! VTI (VTK ImageData XML) support for scalar grids.
//!
//! Reads and writes the ASCII `DataArray` payload only; base64 and
//! appended binary payloads are out of scope. The grid box minimum is
//! written as the image `Origin`, so a written file reconstructs the
//! exact grid frame.

use std::fs;
use std::io::Write;
use std::path::Path;

use nalgebra::Point3;
use sw_spatial::{GridDimensions, ScalarGrid};

use crate::error::{IoError, IoResult};

/// Saves a scalar grid as an ASCII VTI file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_grid_vti<P: AsRef<Path>>(grid: &ScalarGrid, path: P) -> IoResult<()> {
    let file = fs::File::create(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    let (nx, ny, nz) = grid.dimensions().as_tuple();
    let h = grid.cell_size();
    let origin = grid.bounds().min;

    writeln!(
        writer,
        "<VTKFile type=\"ImageData\" version=\"0.1\" byte_order=\"LittleEndian\">"
    )?;
    writeln!(
        writer,
        "  <ImageData WholeExtent=\"0 {} 0 {} 0 {}\" Origin=\"{} {} {}\" Spacing=\"{h} {h} {h}\">",
        nx - 1,
        ny - 1,
        nz - 1,
        origin.x,
        origin.y,
        origin.z
    )?;
    writeln!(
        writer,
        "    <Piece Extent=\"0 {} 0 {} 0 {}\">",
        nx - 1,
        ny - 1,
        nz - 1
    )?;
    writeln!(writer, "      <PointData Scalars=\"distance\">")?;
    writeln!(
        writer,
        "        <DataArray type=\"Float64\" Name=\"distance\" format=\"ascii\">"
    )?;
    for v in grid.values() {
        writeln!(writer, "          {v}")?;
    }
    writeln!(writer, "        </DataArray>")?;
    writeln!(writer, "      </PointData>")?;
    writeln!(writer, "      <CellData/>")?;
    writeln!(writer, "    </Piece>")?;
    writeln!(writer, "  </ImageData>")?;
    writeln!(writer, "</VTKFile>")?;
    Ok(())
}

/// Loads a scalar grid from an ASCII VTI file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, required attributes are
/// missing, the payload is not ASCII, or the value count does not match
/// the extent.
pub fn load_grid_vti<P: AsRef<Path>>(path: P) -> IoResult<ScalarGrid> {
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

    if !content.contains("type=\"ImageData\"") {
        return Err(IoError::invalid_content("not a VTI ImageData file"));
    }

    let extent = attribute(&content, "WholeExtent")?;
    let origin = attribute(&content, "Origin")?;
    let spacing = attribute(&content, "Spacing")?;

    let extent: Vec<i64> = extent
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    if extent.len() != 6 {
        return Err(IoError::invalid_content("WholeExtent must have 6 entries"));
    }
    let dims = GridDimensions {
        nx: (extent[1] - extent[0] + 1).max(1) as usize,
        ny: (extent[3] - extent[2] + 1).max(1) as usize,
        nz: (extent[5] - extent[4] + 1).max(1) as usize,
    };

    let origin: Vec<f64> = origin
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    let spacing: Vec<f64> = spacing
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    if origin.len() != 3 || spacing.len() != 3 {
        return Err(IoError::invalid_content("Origin/Spacing must have 3 entries"));
    }

    let payload_start = content
        .find("format=\"ascii\">")
        .ok_or_else(|| IoError::invalid_content("only ascii DataArray payloads are supported"))?
        + "format=\"ascii\">".len();
    let payload_end = content[payload_start..]
        .find("</DataArray>")
        .ok_or_else(|| IoError::invalid_content("unterminated DataArray"))?
        + payload_start;
    let values: Vec<f64> = content[payload_start..payload_end]
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()?;

    if values.len() != dims.cell_count() {
        return Err(IoError::invalid_content(format!(
            "expected {} values for extent, found {}",
            dims.cell_count(),
            values.len()
        )));
    }

    Ok(ScalarGrid::from_raw(
        spacing[0],
        Point3::new(origin[0], origin[1], origin[2]),
        dims,
        values,
    )?)
}

/// Extracts the value of `name="..."` from the document.
fn attribute<'a>(content: &'a str, name: &str) -> IoResult<&'a str> {
    let key = format!("{name}=\"");
    let start = content
        .find(&key)
        .ok_or_else(|| IoError::invalid_content(format!("missing {name} attribute")))?
        + key.len();
    let end = content[start..]
        .find('"')
        .ok_or_else(|| IoError::invalid_content(format!("unterminated {name} attribute")))?
        + start;
    Ok(&content[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::Aabb;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shrinkwrap-vtitest-{}-{name}", std::process::id()))
    }

    #[test]
    fn roundtrip_preserves_frame_and_values() {
        let bounds = Aabb::new(Point3::new(-1.0, 0.0, 0.5), Point3::new(1.0, 1.0, 1.5));
        let mut grid = ScalarGrid::with_init(0.25, &bounds, 0.0).unwrap();
        for (i, v) in grid.values_mut().iter_mut().enumerate() {
            *v = i as f64 * 0.125 - 3.0;
        }

        let path = temp_path("roundtrip.vti");
        save_grid_vti(&grid, &path).unwrap();
        let loaded = load_grid_vti(&path).unwrap();

        assert_eq!(loaded.dimensions(), grid.dimensions());
        assert_relative_eq!(loaded.cell_size(), grid.cell_size());
        assert_relative_eq!(loaded.bounds().min.x, grid.bounds().min.x, epsilon = 1e-12);
        assert_relative_eq!(loaded.bounds().max.z, grid.bounds().max.z, epsilon = 1e-12);
        for (a, b) in grid.values().iter().zip(loaded.values()) {
            assert_relative_eq!(*a, *b);
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_non_imagedata() {
        let path = temp_path("bad.vti");
        fs::write(&path, "<VTKFile type=\"PolyData\"></VTKFile>").unwrap();
        assert!(load_grid_vti(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_wrong_value_count() {
        let path = temp_path("short.vti");
        fs::write(
            &path,
            "<VTKFile type=\"ImageData\"><ImageData WholeExtent=\"0 1 0 1 0 1\" \
             Origin=\"0 0 0\" Spacing=\"1 1 1\"><Piece><PointData>\
             <DataArray type=\"Float64\" format=\"ascii\">1 2 3</DataArray>\
             </PointData></Piece></ImageData></VTKFile>",
        )
        .unwrap();
        assert!(load_grid_vti(&path).is_err());
        fs::remove_file(path).ok();
    }
}
