//! Physical positions of the lattice control points.
//!
//! Used to export the lattice for visualization, before or after the
//! weights are applied.

use std::path::Path;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::info;

use crate::{FfdResult, ParameterStore};

/// Computes the world-space position of every control point.
///
/// The lattice spans `[0, box_length]` on each local axis with evenly spaced
/// points (a single point at 0 when an axis has one control point). With
/// `displaced`, each point is moved by its weights scaled by the box
/// lengths. Points are then rotated and translated by the box origin.
///
/// The result has `nx * ny * nz` points in canonical `(i, j, k)` order with
/// `k` fastest, the same order as the weight grids.
///
/// # Errors
///
/// Returns [`crate::FfdError::WeightShapeMismatch`] if the weights do not
/// match `n_control_points`.
///
/// # Example
///
/// ```
/// use mesh_ffd::{ParameterStore, lattice_points};
/// use nalgebra::Point3;
///
/// let mut params = ParameterStore::default();
/// params.weights_z[[0, 0, 1]] = 0.5;
///
/// let points = lattice_points(&params, true).unwrap();
/// assert_eq!(points.len(), 8);
/// assert_eq!(points[1], Point3::new(0.0, 0.0, 1.5));
/// ```
pub fn lattice_points(params: &ParameterStore, displaced: bool) -> FfdResult<Vec<Point3<f64>>> {
    params.validate_shape()?;

    let [nx, ny, nz] = params.n_control_points;
    let xs = linspace(params.box_length.x, nx);
    let ys = linspace(params.box_length.y, ny);
    let zs = linspace(params.box_length.z, nz);
    let rotation = params.rotation_matrix();

    let wx = params.weights_x.as_slice();
    let wy = params.weights_y.as_slice();
    let wz = params.weights_z.as_slice();

    let points = (0..params.control_point_count())
        .into_par_iter()
        .map(|flat| {
            let k = flat % nz;
            let j = (flat / nz) % ny;
            let i = flat / (ny * nz);

            let mut local = Vector3::new(xs[i], ys[j], zs[k]);
            if displaced {
                local += Vector3::new(wx[flat], wy[flat], wz[flat]).component_mul(&params.box_length);
            }
            params.box_origin + rotation * local
        })
        .collect();

    Ok(points)
}

/// `count` evenly spaced values from 0 to `stop` inclusive.
fn linspace(stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = stop / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        stop
                    } else {
                        #[allow(clippy::cast_precision_loss)]
                        let t = i as f64;
                        t * step
                    }
                })
                .collect()
        }
    }
}

impl ParameterStore {
    /// World-space control point positions. See [`lattice_points`].
    ///
    /// # Errors
    ///
    /// Same as [`lattice_points`].
    pub fn lattice_points(&self, displaced: bool) -> FfdResult<Vec<Point3<f64>>> {
        lattice_points(self, displaced)
    }

    /// Writes the control points to a point cloud file.
    ///
    /// The format follows the extension (`.ply` or `.vtk`). With `displaced`
    /// the deformed lattice is written, otherwise the original one.
    ///
    /// # Errors
    ///
    /// Returns an error if the weights do not match `n_control_points`, the
    /// extension is not a point cloud format, or the file cannot be written.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mesh_ffd::ParameterStore;
    ///
    /// let params = ParameterStore::read("parameters.prm").unwrap();
    /// params.save_points("lattice.vtk", true).unwrap();
    /// ```
    pub fn save_points<P: AsRef<Path>>(&self, path: P, displaced: bool) -> FfdResult<()> {
        let path = path.as_ref();
        let points = self.lattice_points(displaced)?;
        mesh_io::save_point_cloud(&points, path)?;
        info!(
            path = %path.display(),
            points = points.len(),
            displaced,
            "Saved FFD lattice points"
        );
        Ok(())
    }
}
