//! Error types for FFD parameter operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::Axis;

/// Errors that can occur while building, transforming or persisting FFD parameters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FfdError {
    /// An axis index outside `{0, 1, 2}` was supplied.
    #[error("axis must be 0, 1 or 2, got {axis}")]
    InvalidAxis {
        /// The rejected axis index.
        axis: usize,
    },

    /// Reflection was requested but the symmetry plane is displaced along the mirrored axis.
    #[error(
        "cannot reflect along {axis}: {nonzero} control point(s) in the symmetry plane are displaced along {axis}"
    )]
    SymmetryPlaneDeformed {
        /// The requested reflection axis.
        axis: Axis,
        /// Number of non-zero weights found in the symmetry plane.
        nonzero: usize,
    },

    /// A path argument cannot name a parameter file.
    #[error("invalid parameter file path: {path:?}")]
    InvalidPath {
        /// The rejected path.
        path: PathBuf,
    },

    /// A lattice resolution has a zero component or too many control points.
    #[error(
        "invalid lattice resolution {resolution:?}: every axis needs at least one control point, at most {max} in total",
        max = crate::MAX_CONTROL_POINTS
    )]
    InvalidResolution {
        /// The rejected resolution.
        resolution: [usize; 3],
    },

    /// A weight array does not match `n_control_points`.
    #[error("weights along {axis} have shape {found:?}, expected {expected:?}")]
    WeightShapeMismatch {
        /// Weight component with the wrong shape.
        axis: Axis,
        /// The store's `n_control_points`.
        expected: [usize; 3],
        /// The shape actually held.
        found: [usize; 3],
    },

    /// A weight grid holds a different number of values than its shape implies.
    #[error("weight grid of shape {dims:?} holds {found} value(s)")]
    WeightCountMismatch {
        /// Declared grid shape.
        dims: [usize; 3],
        /// Number of values actually held.
        found: usize,
    },

    /// A weight index lies outside the lattice.
    #[error("weight index {index:?} is out of bounds for a {dims:?} lattice")]
    IndexOutOfBounds {
        /// The offending `(i, j, k)` index.
        index: [usize; 3],
        /// Lattice resolution.
        dims: [usize; 3],
    },

    /// A bounding box was requested for geometry without any points.
    #[error("cannot compute a bounding box of empty geometry")]
    EmptyGeometry,

    /// A required `[section]` is absent from a parameter file.
    #[error("missing section [{section}]")]
    MissingSection {
        /// Section name.
        section: String,
    },

    /// A required key is absent from a parameter file section.
    #[error("missing key '{key}' in section [{section}]")]
    MissingKey {
        /// Section name.
        section: String,
        /// Key name.
        key: String,
    },

    /// A value could not be parsed or is out of range.
    #[error("invalid value for '{key}': {value:?} ({reason})")]
    InvalidValue {
        /// Key the value belongs to.
        key: String,
        /// The raw value text.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A line does not fit the parameter file grammar.
    #[error("line {line}: {message}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// The box has a zero, negative or non-finite extent.
    #[error("degenerate FFD box: length along {axis} is {length}")]
    DegenerateBox {
        /// Axis with the bad extent.
        axis: Axis,
        /// The offending length.
        length: f64,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The point cloud writer failed.
    #[error("point cloud output failed: {0}")]
    PointCloud(#[from] mesh_io::IoError),
}

impl FfdError {
    /// Returns `true` for argument and state validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAxis { .. }
                | Self::SymmetryPlaneDeformed { .. }
                | Self::InvalidPath { .. }
                | Self::InvalidResolution { .. }
                | Self::WeightShapeMismatch { .. }
                | Self::WeightCountMismatch { .. }
                | Self::EmptyGeometry
        )
    }

    /// Returns `true` for parameter file parsing failures.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::MissingSection { .. }
                | Self::MissingKey { .. }
                | Self::InvalidValue { .. }
                | Self::MalformedLine { .. }
                | Self::IndexOutOfBounds { .. }
        )
    }

    pub(crate) fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            message: message.into(),
        }
    }
}

/// Result type for FFD parameter operations.
pub type FfdResult<T> = Result<T, FfdError>;
