//! Legacy VTK polydata point clouds.
//!
//! Writes an ASCII `DATASET POLYDATA` file holding only `POINTS`, which
//! ParaView shows with the *Point Gaussian* representation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::IoResult;

/// Save points to an ASCII legacy VTK file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::save_vtk_points;
/// use nalgebra::Point3;
///
/// save_vtk_points(&[Point3::new(0.0, 0.0, 0.0)], "lattice.vtk").unwrap();
/// ```
pub fn save_vtk_points<P: AsRef<Path>>(points: &[Point3<f64>], path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_vtk_points(points, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_vtk_points<W: Write>(points: &[Point3<f64>], writer: &mut W) -> IoResult<()> {
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "Generated by CortenForge mesh-io")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;
    writeln!(writer, "POINTS {} double", points.len())?;
    for p in points {
        writeln!(writer, "{:?} {:?} {:?}", p.x, p.y, p.z)?;
    }
    Ok(())
}
