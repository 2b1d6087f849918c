//! Free-form deformation (FFD) lattice parameters.
//!
//! This crate manages the parameters of an FFD lattice used to morph 3D
//! geometry: a regular grid of control points with per-point displacement
//! weights, and the box (origin, lengths, rotation) that places the grid in
//! physical space.
//!
//! - [`ParameterStore`] - resolution, box placement and the three weight grids
//! - [`LatticeTransform`] - reference-domain mappings, rotation and box vertices
//! - [`ParameterStore::reflect`] - mirror the lattice across one of its faces
//! - [`ParameterStore::read`] / [`ParameterStore::write`] - `.prm` parameter files
//! - [`lattice_points`] - control point positions for visualization
//! - [`ParameterStore::build_bounding_box`] - fit the box around a shape
//!
//! Applying the deformation to a mesh is not part of this crate.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Quick Start
//!
//! ```
//! use mesh_ffd::{Axis, ParameterStore, from_prm_str, to_prm_string};
//! use nalgebra::Vector3;
//!
//! let mut params = ParameterStore::new([3, 2, 2])
//!     .unwrap()
//!     .with_box_length(Vector3::new(10.0, 5.0, 5.0));
//! params.weights_z[[1, 0, 1]] = 0.2;
//!
//! // Mirror along x: 5 control points, box twice as long
//! params.reflect(Axis::X).unwrap();
//! assert_eq!(params.n_control_points, [5, 2, 2]);
//! assert_eq!(params.weights_z[[3, 0, 1]], 0.2);
//!
//! // Persist and restore
//! let text = to_prm_string(&params).unwrap();
//! assert_eq!(from_prm_str(&text).unwrap(), params);
//!
//! // Deformed control points in world space
//! let points = params.lattice_points(true).unwrap();
//! assert_eq!(points.len(), 20);
//! ```
//!
//! # Weights
//!
//! Weights are dimensionless: the displacement of a control point along an
//! axis is its weight times the box length on that axis. The grids are
//! indexed `[i, j, k]` and stored with `k` fastest; parameter files and
//! [`lattice_points`] use the same order.
//!
//! # Rotation
//!
//! Angles are in degrees and composed as `R = Rz · Ry · Rx`
//! ([`ROTATION_ORDER`]).

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod axis;
mod bbox;
mod error;
mod lattice;
mod params;
mod prm;
mod reflect;
mod transform;
mod weights;

pub use axis::Axis;
pub use bbox::{BoundingBoxOptions, BoundingBoxSource};
pub use error::{FfdError, FfdResult};
pub use lattice::lattice_points;
pub use params::{DEFAULT_CONTROL_POINTS, ParameterStore};
pub use prm::{BOX_SECTION, WEIGHTS_SECTION, from_prm_str, to_prm_string};
pub use transform::{LatticeTransform, ROTATION_ORDER, rotation_from_angles};
pub use weights::{MAX_CONTROL_POINTS, WeightGrid};
