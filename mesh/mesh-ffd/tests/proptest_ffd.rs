//! Property-based tests for FFD lattice parameters.
//!
//! Run with: cargo test -p mesh-ffd -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_ffd::{Axis, FfdError, ParameterStore, from_prm_str, to_prm_string};
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_axis() -> impl Strategy<Value = Axis> {
    prop_oneof![Just(Axis::X), Just(Axis::Y), Just(Axis::Z)]
}

fn arb_resolution() -> impl Strategy<Value = [usize; 3]> {
    prop::array::uniform3(1usize..5)
}

/// A store with random placement and weights in `[-0.5, 0.5)`.
fn arb_store() -> impl Strategy<Value = ParameterStore> {
    arb_resolution().prop_flat_map(|n| {
        let count = n[0] * n[1] * n[2];
        (
            prop::array::uniform3(0.1..100.0f64),
            prop::array::uniform3(-100.0..100.0f64),
            prop::array::uniform3(-180.0..180.0f64),
            prop::collection::vec(prop::array::uniform3(-0.5..0.5f64), count),
        )
            .prop_map(move |(length, origin, angle, weights)| {
                let mut params = ParameterStore::new(n)
                    .unwrap()
                    .with_box_length(Vector3::from(length))
                    .with_box_origin(Point3::from(origin))
                    .with_rot_angle(Vector3::from(angle));
                let cells = (0..n[0])
                    .flat_map(|i| (0..n[1]).flat_map(move |j| (0..n[2]).map(move |k| [i, j, k])));
                for (idx, w) in cells.zip(weights) {
                    params.weights_x[idx] = w[0];
                    params.weights_y[idx] = w[1];
                    params.weights_z[idx] = w[2];
                }
                params
            })
    })
}

/// Clears the last slice along `axis` so the store can be reflected.
fn clear_plane(params: &mut ParameterStore, axis: Axis) {
    let a = axis.index();
    let last = params.n_control_points[a] - 1;
    for component in Axis::ALL {
        let grid = params.weights_mut(component);
        let cells: Vec<[usize; 3]> = grid
            .iter_indexed()
            .filter(|(idx, _)| idx[a] == last)
            .map(|(idx, _)| idx)
            .collect();
        for idx in cells {
            grid[idx] = 0.0;
        }
    }
}

// =============================================================================
// Reflection
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reflection_doubles_resolution_and_length(mut params in arb_store(), axis in arb_axis()) {
        clear_plane(&mut params, axis);
        let before = params.clone();
        params.reflect(axis).unwrap();

        let a = axis.index();
        for b in 0..3 {
            if b == a {
                prop_assert_eq!(params.n_control_points[b], 2 * before.n_control_points[b] - 1);
                prop_assert_eq!(params.box_length[b], 2.0 * before.box_length[b]);
            } else {
                prop_assert_eq!(params.n_control_points[b], before.n_control_points[b]);
                prop_assert_eq!(params.box_length[b], before.box_length[b]);
            }
        }
        prop_assert!(params.validate_shape().is_ok());
    }

    #[test]
    fn reflection_is_mirror_symmetric(mut params in arb_store(), axis in arb_axis()) {
        clear_plane(&mut params, axis);
        let before = params.clone();
        params.reflect(axis).unwrap();

        let a = axis.index();
        let n = before.n_control_points[a];
        for component in Axis::ALL {
            let sign = if component == axis { -1.0 } else { 1.0 };
            let old = before.weights(component);
            let new = params.weights(component);
            for (idx, value) in old.iter_indexed() {
                prop_assert_eq!(new[idx], value);
                let mut mirror = idx;
                mirror[a] = 2 * n - 2 - idx[a];
                prop_assert_eq!(new[mirror], sign * value);
            }
        }
    }

    #[test]
    fn reflection_rejects_deformed_plane(
        mut params in arb_store(),
        axis in arb_axis(),
        value in 0.01..1.0f64,
    ) {
        clear_plane(&mut params, axis);
        let a = axis.index();
        let mut idx = [0, 0, 0];
        idx[a] = params.n_control_points[a] - 1;
        params.weights_mut(axis)[idx] = value;
        let before = params.clone();

        let err = params.reflect(axis).unwrap_err();
        let is_plane_error = matches!(err, FfdError::SymmetryPlaneDeformed { nonzero: 1, .. });
        prop_assert!(is_plane_error);
        prop_assert_eq!(params, before);
    }

    #[test]
    fn reflection_allows_other_components_on_plane(
        mut params in arb_store(),
        axis in arb_axis(),
        shift in 1usize..3,
        value in 0.01..1.0f64,
    ) {
        clear_plane(&mut params, axis);
        let a = axis.index();
        let other = Axis::ALL[(a + shift) % 3];
        let mut idx = [0, 0, 0];
        idx[a] = params.n_control_points[a] - 1;
        params.weights_mut(other)[idx] = value;

        prop_assert!(params.reflect(axis).is_ok());
        prop_assert_eq!(params.weights(other)[idx], value);
    }
}

// =============================================================================
// Parameter files and mappings
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prm_text_roundtrip(params in arb_store()) {
        let text = to_prm_string(&params).unwrap();
        prop_assert_eq!(from_prm_str(&text).unwrap(), params);
    }

    #[test]
    fn psi_mappings_are_inverse(params in arb_store()) {
        let transform = params.transform().unwrap();
        let product = transform.psi_mapping() * transform.inv_psi_mapping();
        prop_assert!((product - nalgebra::Matrix3::identity()).norm() < 1e-9);
    }

    #[test]
    fn rotation_is_orthonormal(params in arb_store()) {
        let r = params.rotation_matrix();
        prop_assert!((r.transpose() * r - nalgebra::Matrix3::identity()).norm() < 1e-12);
        prop_assert!((r.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reference_mapping_roundtrip(
        params in arb_store(),
        local in prop::array::uniform3(0.0..1.0f64),
    ) {
        let transform = params.transform().unwrap();
        let reference = Point3::from(local);
        let physical = transform.to_physical(&reference);
        let back = transform.to_reference(&physical);
        prop_assert!((back - reference).norm() < 1e-9);
    }

    #[test]
    fn lattice_has_one_point_per_control_point(params in arb_store()) {
        let points = params.lattice_points(true).unwrap();
        prop_assert_eq!(points.len(), params.control_point_count());
        let origin = params.lattice_points(false).unwrap()[0];
        prop_assert!((origin - params.box_origin).norm() < 1e-9);
    }
}
