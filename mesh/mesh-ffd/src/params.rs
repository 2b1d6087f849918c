//! FFD parameter set.
//!
//! This module provides [`ParameterStore`], the control lattice resolution,
//! the placement of the lattice box and the per-axis control point weights.

use std::fmt;

use nalgebra::{Matrix3, Point3, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::weights::checked_count;
use crate::{Axis, FfdError, FfdResult, LatticeTransform, WeightGrid, rotation_from_angles};

/// Lattice resolution used by [`ParameterStore::default`].
pub const DEFAULT_CONTROL_POINTS: [usize; 3] = [2, 2, 2];

/// Parameters of a free-form deformation lattice.
///
/// The lattice is a regular `nx × ny × nz` grid of control points spanning a
/// box of size `box_length`, placed at `box_origin` and rotated by
/// `rot_angle` degrees. Each control point carries one weight per axis: a
/// displacement normalized by the box length along that axis.
///
/// The three weight grids always share the shape `n_control_points`. Fields
/// are public; callers that change `n_control_points` directly must
/// re-allocate the weights, e.g. with [`ParameterStore::resize`].
///
/// # Examples
///
/// ```
/// use mesh_ffd::ParameterStore;
/// use nalgebra::Vector3;
///
/// let mut params = ParameterStore::new([3, 2, 2])
///     .unwrap()
///     .with_box_length(Vector3::new(2.0, 1.0, 1.0));
/// params.weights_z[[1, 0, 1]] = 0.1;
///
/// assert_eq!(params.control_point_count(), 12);
/// params.reset_deformation();
/// assert_eq!(params.weights_z[[1, 0, 1]], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterStore {
    /// Unit scale factor. Carried along but not used by the lattice math.
    pub conversion_unit: f64,
    /// Extents of the box along the local x, y and z axes.
    pub box_length: Vector3<f64>,
    /// World-space position of the local origin (lattice index `[0, 0, 0]`).
    pub box_origin: Point3<f64>,
    /// Rotation about x, y and z in degrees, composed as described by
    /// [`crate::ROTATION_ORDER`].
    pub rot_angle: Vector3<f64>,
    /// Number of control points along x, y and z.
    pub n_control_points: [usize; 3],
    /// Displacements along x, normalized by `box_length.x`.
    pub weights_x: WeightGrid,
    /// Displacements along y, normalized by `box_length.y`.
    pub weights_y: WeightGrid,
    /// Displacements along z, normalized by `box_length.z`.
    pub weights_z: WeightGrid,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::with_weights(
            DEFAULT_CONTROL_POINTS,
            WeightGrid::zeros(DEFAULT_CONTROL_POINTS),
        )
    }
}

impl ParameterStore {
    /// Creates a unit box at the origin with the given resolution and zero weights.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::InvalidResolution`] if any axis has no control
    /// points or the lattice exceeds [`crate::MAX_CONTROL_POINTS`].
    pub fn new(n_control_points: [usize; 3]) -> FfdResult<Self> {
        let grid = WeightGrid::try_zeros(n_control_points)?;
        Ok(Self::with_weights(n_control_points, grid))
    }

    fn with_weights(n_control_points: [usize; 3], grid: WeightGrid) -> Self {
        Self {
            conversion_unit: 1.0,
            box_length: Vector3::new(1.0, 1.0, 1.0),
            box_origin: Point3::origin(),
            rot_angle: Vector3::zeros(),
            n_control_points,
            weights_x: grid.clone(),
            weights_y: grid.clone(),
            weights_z: grid,
        }
    }

    /// Sets the box lengths.
    #[must_use]
    pub fn with_box_length(mut self, box_length: Vector3<f64>) -> Self {
        self.box_length = box_length;
        self
    }

    /// Sets the box origin.
    #[must_use]
    pub fn with_box_origin(mut self, box_origin: Point3<f64>) -> Self {
        self.box_origin = box_origin;
        self
    }

    /// Sets the rotation angles, in degrees.
    #[must_use]
    pub fn with_rot_angle(mut self, rot_angle: Vector3<f64>) -> Self {
        self.rot_angle = rot_angle;
        self
    }

    /// Sets the unit conversion factor.
    #[must_use]
    pub fn with_conversion_unit(mut self, conversion_unit: f64) -> Self {
        self.conversion_unit = conversion_unit;
        self
    }

    /// Total number of control points.
    #[must_use]
    pub const fn control_point_count(&self) -> usize {
        self.n_control_points[0] * self.n_control_points[1] * self.n_control_points[2]
    }

    /// Changes the resolution, re-allocating all three weight grids as zeros.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::InvalidResolution`] if any axis has no control
    /// points or the lattice exceeds [`crate::MAX_CONTROL_POINTS`]. The store
    /// is unchanged on error.
    pub fn resize(&mut self, n_control_points: [usize; 3]) -> FfdResult<()> {
        let grid = WeightGrid::try_zeros(n_control_points)?;
        self.n_control_points = n_control_points;
        self.weights_x = grid.clone();
        self.weights_y = grid.clone();
        self.weights_z = grid;
        Ok(())
    }

    /// Sets every weight to zero. No other field is touched.
    pub fn reset_deformation(&mut self) {
        self.weights_x.fill(0.0);
        self.weights_y.fill(0.0);
        self.weights_z.fill(0.0);
    }

    /// Weights of the displacement component along `axis`.
    #[must_use]
    pub const fn weights(&self, axis: Axis) -> &WeightGrid {
        match axis {
            Axis::X => &self.weights_x,
            Axis::Y => &self.weights_y,
            Axis::Z => &self.weights_z,
        }
    }

    /// Mutable weights of the displacement component along `axis`.
    pub fn weights_mut(&mut self, axis: Axis) -> &mut WeightGrid {
        match axis {
            Axis::X => &mut self.weights_x,
            Axis::Y => &mut self.weights_y,
            Axis::Z => &mut self.weights_z,
        }
    }

    /// Checks that every weight grid has shape `n_control_points` and holds
    /// one value per control point.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::WeightShapeMismatch`] or
    /// [`FfdError::WeightCountMismatch`] for the first grid that disagrees,
    /// or [`FfdError::InvalidResolution`] for a rejected resolution.
    pub fn validate_shape(&self) -> FfdResult<()> {
        check_resolution(self.n_control_points)?;
        for axis in Axis::ALL {
            let found = self.weights(axis).dims();
            if found != self.n_control_points {
                return Err(FfdError::WeightShapeMismatch {
                    axis,
                    expected: self.n_control_points,
                    found,
                });
            }
            let len = self.weights(axis).len();
            if len != self.control_point_count() {
                return Err(FfdError::WeightCountMismatch { dims: found, found: len });
            }
        }
        Ok(())
    }

    /// Validated geometric view of the box.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::DegenerateBox`] if a box length is not positive.
    pub fn transform(&self) -> FfdResult<LatticeTransform> {
        LatticeTransform::new(self)
    }

    /// The box rotation matrix. Defined for any box, degenerate or not.
    #[must_use]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        rotation_from_angles(&self.rot_angle)
    }
}

pub(crate) fn check_resolution(n_control_points: [usize; 3]) -> FfdResult<()> {
    if checked_count(n_control_points).is_none() {
        return Err(FfdError::InvalidResolution {
            resolution: n_control_points,
        });
    }
    Ok(())
}

impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "conversion_unit = {}", self.conversion_unit)?;
        writeln!(f, "n_control_points = {:?}", self.n_control_points)?;
        writeln!(f)?;
        writeln!(f, "box_length = {}", fmt_vector(&self.box_length))?;
        writeln!(f, "box_origin = {}", fmt_vector(&self.box_origin.coords))?;
        writeln!(f, "rot_angle  = {}", fmt_vector(&self.rot_angle))?;

        for axis in Axis::ALL {
            writeln!(f)?;
            writeln!(f, "weights_{axis} =")?;
            for (index, value) in self.weights(axis).iter_indexed() {
                writeln!(f, "  {index:?} {value}")?;
            }
        }

        match self.transform() {
            Ok(transform) => {
                writeln!(f)?;
                write!(f, "psi_mapping ={}", transform.psi_mapping())?;
                write!(f, "rotation_matrix ={}", transform.rotation_matrix())?;
                writeln!(f, "position_vertices =")?;
                for vertex in transform.position_vertices() {
                    writeln!(f, "  {}", fmt_vector(&vertex.coords))?;
                }
            }
            Err(err) => writeln!(f, "\n{err}")?,
        }
        Ok(())
    }
}

fn fmt_vector(v: &Vector3<f64>) -> String {
    format!("[{}, {}, {}]", v.x, v.y, v.z)
}
