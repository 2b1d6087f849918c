//! Point cloud file output for CortenForge.
//!
//! This crate writes bare point sets, such as FFD control lattices, in
//! formats that common viewers open directly:
//!
//! - **PLY** (Polygon File Format) - Binary and ASCII, vertices only
//! - **VTK** (legacy polydata) - ASCII `POINTS` dataset
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Other game engines
//! - Python bindings
//!
//! # Format Detection
//!
//! The format is detected from the file extension:
//!
//! ```no_run
//! use mesh_io::save_point_cloud;
//! use nalgebra::Point3;
//!
//! let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
//! save_point_cloud(&points, "lattice.vtk").unwrap();
//! save_point_cloud(&points, "lattice.ply").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod ply;
mod vtk;

pub use error::{IoError, IoResult};
pub use ply::{load_ply_points, save_ply_points};
pub use vtk::save_vtk_points;

use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

/// Supported point cloud file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointCloudFormat {
    /// PLY (Polygon File Format).
    /// Supports binary and ASCII variants.
    Ply,
    /// Legacy VTK polydata, ASCII.
    Vtk,
}

impl PointCloudFormat {
    /// Detect format from file extension.
    ///
    /// # Returns
    ///
    /// The detected format, or `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "ply" => Some(Self::Ply),
            "vtk" => Some(Self::Vtk),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Ply => "ply",
            Self::Vtk => "vtk",
        }
    }
}

/// Save a point cloud, detecting format from extension.
///
/// PLY output is binary.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The file cannot be written
pub fn save_point_cloud<P: AsRef<Path>>(points: &[Point3<f64>], path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = PointCloudFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    debug!(
        path = %path.display(),
        format = format.extension(),
        points = points.len(),
        "Writing point cloud"
    );

    match format {
        PointCloudFormat::Ply => save_ply_points(points, path, true),
        PointCloudFormat::Vtk => save_vtk_points(points, path),
    }
}
