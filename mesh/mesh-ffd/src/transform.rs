//! Placement of the FFD box in physical space.
//!
//! The box is described by an origin, axis-aligned lengths in its local
//! frame and three rotation angles in degrees. A physical point `p` maps to
//! reference coordinates `u` in the unit cube by
//!
//! ```text
//! u = psi · Rᵀ · (p − origin)        psi = diag(1 / box_length)
//! ```
//!
//! and back by `p = origin + R · diag(box_length) · u`.

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

use crate::{Axis, FfdError, FfdResult, ParameterStore};

/// Order in which the per-axis rotations are composed, outermost first.
///
/// The box rotation is `R = Rz(γ) · Ry(β) · Rx(α)`: the x rotation is
/// applied to a vector first and the z rotation last.
pub const ROTATION_ORDER: [Axis; 3] = [Axis::Z, Axis::Y, Axis::X];

/// Builds the box rotation from angles in degrees about x, y and z.
///
/// Composition follows [`ROTATION_ORDER`].
///
/// # Example
///
/// ```
/// use mesh_ffd::rotation_from_angles;
/// use nalgebra::{Matrix3, Vector3};
///
/// let r = rotation_from_angles(&Vector3::zeros());
/// assert!((r - Matrix3::identity()).norm() < 1e-15);
/// ```
#[must_use]
pub fn rotation_from_angles(rot_angle_deg: &Vector3<f64>) -> Matrix3<f64> {
    ROTATION_ORDER
        .iter()
        .fold(Matrix3::identity(), |acc, &axis| {
            acc * axis_rotation(axis, rot_angle_deg[axis.index()].to_radians())
        })
}

/// Right-handed rotation by `angle` radians about a single axis.
fn axis_rotation(axis: Axis, angle: f64) -> Matrix3<f64> {
    let unit = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };
    Rotation3::from_axis_angle(&unit, angle).into_inner()
}

/// Validated geometric view of an FFD box.
///
/// Construction rejects boxes with a zero, negative or non-finite length,
/// so every mapping here is well defined.
///
/// # Example
///
/// ```
/// use mesh_ffd::ParameterStore;
/// use nalgebra::{Point3, Vector3};
///
/// let store = ParameterStore::default()
///     .with_box_length(Vector3::new(2.0, 4.0, 8.0))
///     .with_box_origin(Point3::new(1.0, 1.0, 1.0));
/// let transform = store.transform().unwrap();
///
/// let u = transform.to_reference(&Point3::new(2.0, 3.0, 5.0));
/// assert!((u - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeTransform {
    origin: Point3<f64>,
    length: Vector3<f64>,
    rotation: Matrix3<f64>,
}

impl LatticeTransform {
    /// Builds the transform for a parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::DegenerateBox`] if any box length is not strictly
    /// positive and finite.
    pub fn new(params: &ParameterStore) -> FfdResult<Self> {
        for axis in Axis::ALL {
            let length = params.box_length[axis.index()];
            if !(length.is_finite() && length > 0.0) {
                return Err(FfdError::DegenerateBox { axis, length });
            }
        }

        Ok(Self {
            origin: params.box_origin,
            length: params.box_length,
            rotation: rotation_from_angles(&params.rot_angle),
        })
    }

    /// Map from physical offsets to the reference domain: `diag(1 / box_length)`.
    #[must_use]
    pub fn psi_mapping(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.length.map(f64::recip))
    }

    /// Map from the reference domain to physical offsets: `diag(box_length)`.
    #[must_use]
    pub fn inv_psi_mapping(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&self.length)
    }

    /// The box rotation, see [`ROTATION_ORDER`].
    #[must_use]
    pub const fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation
    }

    /// The origin and the three box corners adjacent to it.
    ///
    /// Four non-coplanar vertices identify the parallelepiped uniquely.
    /// Entry `1 + a` is `origin + R · (box_length[a] · e_a)`.
    #[must_use]
    pub fn position_vertices(&self) -> [Point3<f64>; 4] {
        let edges = self.rotation * self.inv_psi_mapping();
        [
            self.origin,
            self.origin + edges.column(0).into_owned(),
            self.origin + edges.column(1).into_owned(),
            self.origin + edges.column(2).into_owned(),
        ]
    }

    /// Maps a physical point into unit-cube reference coordinates.
    #[must_use]
    pub fn to_reference(&self, point: &Point3<f64>) -> Point3<f64> {
        let local = self.rotation.transpose() * (point - self.origin);
        Point3::from(self.psi_mapping() * local)
    }

    /// Maps reference coordinates back to a physical point.
    #[must_use]
    pub fn to_physical(&self, reference: &Point3<f64>) -> Point3<f64> {
        self.origin + self.rotation * (self.inv_psi_mapping() * reference.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn store(length: [f64; 3], origin: [f64; 3], angles: [f64; 3]) -> ParameterStore {
        ParameterStore::default()
            .with_box_length(Vector3::from(length))
            .with_box_origin(Point3::from(origin))
            .with_rot_angle(Vector3::from(angles))
    }

    #[test]
    fn zero_angles_give_identity() {
        let r = rotation_from_angles(&Vector3::zeros());
        assert_relative_eq!(r, Matrix3::identity(), epsilon = 1e-15);
    }

    #[test]
    fn single_axis_rotation_z() {
        let r = rotation_from_angles(&Vector3::new(0.0, 0.0, 90.0));
        let v = r * Vector3::x();
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn composition_is_z_outermost() {
        let angles = Vector3::new(30.0, 45.0, 60.0);
        let rx = axis_rotation(Axis::X, 30f64.to_radians());
        let ry = axis_rotation(Axis::Y, 45f64.to_radians());
        let rz = axis_rotation(Axis::Z, 60f64.to_radians());
        let r = rotation_from_angles(&angles);
        assert_relative_eq!(r, rz * ry * rx, epsilon = 1e-12);

        // Swapping the order gives a visibly different frame
        assert!((r - rx * ry * rz).norm() > 1e-3);
    }

    #[test]
    fn rotation_is_orthonormal() {
        let r = rotation_from_angles(&Vector3::new(12.0, -77.0, 140.0));
        assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn psi_mappings_are_inverse() {
        let t = store([2.0, 0.5, 7.0], [0.0; 3], [0.0; 3]).transform().unwrap();
        assert_relative_eq!(
            t.inv_psi_mapping() * t.psi_mapping(),
            Matrix3::identity(),
            epsilon = 1e-12
        );
        assert_relative_eq!(t.psi_mapping()[(0, 0)], 0.5);
        assert_relative_eq!(t.psi_mapping()[(1, 1)], 2.0);
    }

    #[test]
    fn degenerate_lengths_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = store([1.0, bad, 1.0], [0.0; 3], [0.0; 3])
                .transform()
                .unwrap_err();
            assert!(matches!(err, FfdError::DegenerateBox { axis: Axis::Y, .. }));
        }
    }

    #[test]
    fn position_vertices_unrotated() {
        let t = store([1.0, 2.0, 3.0], [5.0, 6.0, 7.0], [0.0; 3])
            .transform()
            .unwrap();
        let v = t.position_vertices();
        assert_relative_eq!(v[0], Point3::new(5.0, 6.0, 7.0));
        assert_relative_eq!(v[1], Point3::new(6.0, 6.0, 7.0));
        assert_relative_eq!(v[2], Point3::new(5.0, 8.0, 7.0));
        assert_relative_eq!(v[3], Point3::new(5.0, 6.0, 10.0));
    }

    #[test]
    fn position_vertices_rotated_about_z() {
        let t = store([2.0, 1.0, 1.0], [0.0; 3], [0.0, 0.0, 90.0])
            .transform()
            .unwrap();
        let v = t.position_vertices();
        assert_relative_eq!(v[1], Point3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(v[2], Point3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn reference_mapping_roundtrip() {
        let t = store([2.0, 3.0, 0.5], [1.0, -2.0, 4.0], [10.0, 20.0, 30.0])
            .transform()
            .unwrap();
        let p = Point3::new(0.3, 1.7, -2.2);
        let back = t.to_physical(&t.to_reference(&p));
        assert_relative_eq!(back, p, epsilon = 1e-12);

        // Box vertices land on unit cube corners
        let v = t.position_vertices();
        assert_relative_eq!(t.to_reference(&v[0]), Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(
            t.to_reference(&v[3]),
            Point3::new(0.0, 0.0, 1.0),
            epsilon = 1e-12
        );
    }
}
