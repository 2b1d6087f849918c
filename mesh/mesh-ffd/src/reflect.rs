//! Mirroring the control lattice across one of its faces.

use tracing::{debug, info};

use crate::params::check_resolution;
use crate::{Axis, FfdError, FfdResult, ParameterStore};

impl ParameterStore {
    /// Reflects the lattice along `axis`.
    ///
    /// The mirror plane is the lattice face opposite the origin, i.e. the
    /// last slice along `axis`. The origin is preserved. Afterwards the
    /// lattice has `2n - 1` control points along `axis` and a doubled box
    /// length. In the appended half the weights along `axis` are negated
    /// while the other two components are copied unchanged.
    ///
    /// Reflecting twice along the same axis requires the new boundary face to
    /// be undeformed along that axis as well.
    ///
    /// # Errors
    ///
    /// - [`FfdError::SymmetryPlaneDeformed`] if any weight along `axis` in the
    ///   mirror plane is non-zero
    /// - [`FfdError::WeightShapeMismatch`] if the weights do not match
    ///   `n_control_points`
    /// - [`FfdError::InvalidResolution`] if the reflected lattice would exceed
    ///   [`crate::MAX_CONTROL_POINTS`]
    ///
    /// The store is left untouched on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use mesh_ffd::{Axis, ParameterStore};
    ///
    /// let mut params = ParameterStore::new([3, 2, 2]).unwrap();
    /// params.weights_x[[1, 0, 0]] = 0.2;
    /// params.weights_y[[1, 0, 0]] = 0.1;
    ///
    /// params.reflect(Axis::X).unwrap();
    ///
    /// assert_eq!(params.n_control_points, [5, 2, 2]);
    /// assert_eq!(params.box_length.x, 2.0);
    /// assert_eq!(params.weights_x[[3, 0, 0]], -0.2);
    /// assert_eq!(params.weights_y[[3, 0, 0]], 0.1);
    /// ```
    pub fn reflect(&mut self, axis: Axis) -> FfdResult<()> {
        self.validate_shape()?;

        let a = axis.index();
        let plane = self.n_control_points[a] - 1;
        let nonzero = self.weights(axis).count_nonzero_in_slice(axis, plane);
        if nonzero != 0 {
            return Err(FfdError::SymmetryPlaneDeformed { axis, nonzero });
        }

        let mut reflected = self.n_control_points;
        reflected[a] = 2 * reflected[a] - 1;
        check_resolution(reflected)?;

        self.n_control_points = reflected;
        self.box_length[a] *= 2.0;

        for component in Axis::ALL {
            let sign = if component == axis { -1.0 } else { 1.0 };
            let mirrored = self.weights(component).mirrored(axis, sign);
            *self.weights_mut(component) = mirrored;
        }

        debug!(
            axis = %axis,
            n_control_points = ?self.n_control_points,
            "Mirrored weight grids"
        );
        info!(axis = %axis, box_length = self.box_length[a], "Reflected FFD lattice");

        Ok(())
    }

    /// Reflects along the axis with numeric index `axis` (0, 1 or 2).
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::InvalidAxis`] for indices above 2, otherwise the
    /// errors of [`ParameterStore::reflect`].
    pub fn reflect_axis_index(&mut self, axis: usize) -> FfdResult<()> {
        self.reflect(Axis::try_from(axis)?)
    }
}
