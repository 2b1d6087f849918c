//! Dense per-axis weight storage.

use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Axis, FfdError, FfdResult};

/// Upper bound on the number of control points in one lattice.
pub const MAX_CONTROL_POINTS: usize = 1 << 24;

/// Number of entries in a `dims` grid, or `None` if it is empty, overflows
/// or exceeds [`MAX_CONTROL_POINTS`].
pub(crate) fn checked_count(dims: [usize; 3]) -> Option<usize> {
    let count = dims[0].checked_mul(dims[1])?.checked_mul(dims[2])?;
    (count > 0 && count <= MAX_CONTROL_POINTS).then_some(count)
}

/// A dense 3D array of normalized control point displacements.
///
/// Values are stored row-major with the last index fastest, so
/// `(i, j, k)` lives at `(i * ny + j) * nz + k`. This is the order in
/// which parameter files list weights and in which lattice points are
/// emitted.
///
/// # Example
///
/// ```
/// use mesh_ffd::WeightGrid;
///
/// let mut grid = WeightGrid::zeros([2, 3, 2]);
/// grid[[1, 2, 0]] = 0.25;
/// assert_eq!(grid.get(1, 2, 0), Some(0.25));
/// assert_eq!(grid.get(2, 0, 0), None);
/// assert_eq!(grid.len(), 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWeightGrid"))]
pub struct WeightGrid {
    dims: [usize; 3],
    values: Vec<f64>,
}

/// Unchecked serialized form of [`WeightGrid`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawWeightGrid {
    dims: [usize; 3],
    values: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWeightGrid> for WeightGrid {
    type Error = FfdError;

    fn try_from(raw: RawWeightGrid) -> FfdResult<Self> {
        let expected = checked_count(raw.dims).ok_or(FfdError::InvalidResolution {
            resolution: raw.dims,
        })?;
        if raw.values.len() != expected {
            return Err(FfdError::WeightCountMismatch {
                dims: raw.dims,
                found: raw.values.len(),
            });
        }
        Ok(Self {
            dims: raw.dims,
            values: raw.values,
        })
    }
}

impl WeightGrid {
    /// Creates a grid of the given shape filled with zeros.
    ///
    /// # Panics
    ///
    /// Panics if `nx * ny * nz` overflows `usize`. Use
    /// [`WeightGrid::try_zeros`] for untrusted shapes.
    #[must_use]
    pub fn zeros(dims: [usize; 3]) -> Self {
        Self {
            dims,
            values: vec![0.0; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Creates a zero grid, rejecting shapes that are empty or hold more
    /// than [`MAX_CONTROL_POINTS`] entries.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::InvalidResolution`] for a rejected shape.
    pub fn try_zeros(dims: [usize; 3]) -> FfdResult<Self> {
        let count =
            checked_count(dims).ok_or(FfdError::InvalidResolution { resolution: dims })?;
        Ok(Self {
            dims,
            values: vec![0.0; count],
        })
    }

    /// Shape of the grid as `[nx, ny, nz]`.
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the grid holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat values in canonical `(i, j, k)` order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Flat offset of `(i, j, k)`, or `None` when out of bounds.
    #[must_use]
    pub const fn offset(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        if i < nx && j < ny && k < nz {
            Some((i * ny + j) * nz + k)
        } else {
            None
        }
    }

    /// Reads the weight at `(i, j, k)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        self.offset(i, j, k).map(|idx| self.values[idx])
    }

    /// Writes the weight at `(i, j, k)`.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::IndexOutOfBounds`] if the index is outside the grid.
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) -> FfdResult<()> {
        let idx = self
            .offset(i, j, k)
            .ok_or(FfdError::IndexOutOfBounds {
                index: [i, j, k],
                dims: self.dims,
            })?;
        self.values[idx] = value;
        Ok(())
    }

    /// Sets every entry to `value`.
    pub fn fill(&mut self, value: f64) {
        self.values.fill(value);
    }

    /// Iterates `([i, j, k], weight)` pairs in canonical order.
    pub fn iter_indexed(&self) -> impl Iterator<Item = ([usize; 3], f64)> + '_ {
        let [_, ny, nz] = self.dims;
        self.values.iter().enumerate().map(move |(flat, &value)| {
            let k = flat % nz;
            let j = (flat / nz) % ny;
            let i = flat / (ny * nz);
            ([i, j, k], value)
        })
    }

    /// Counts the non-zero weights in the slice `index` along `axis`.
    ///
    /// Returns 0 when `index` is outside the grid.
    #[must_use]
    pub fn count_nonzero_in_slice(&self, axis: Axis, index: usize) -> usize {
        let a = axis.index();
        self.iter_indexed()
            .filter(|(idx, value)| idx[a] == index && *value != 0.0)
            .count()
    }

    /// Builds the grid mirrored across its last slice along `axis`.
    ///
    /// The result has `2n - 1` entries along `axis`. Indices below `n` keep
    /// their values; index `m >= n` takes the value at `2n - 2 - m` scaled by
    /// `sign`, so the last slice is shared rather than duplicated.
    #[must_use]
    pub fn mirrored(&self, axis: Axis, sign: f64) -> Self {
        let a = axis.index();
        let n = self.dims[a];
        if n == 0 {
            return self.clone();
        }

        let mut dims = self.dims;
        dims[a] = 2 * n - 1;

        let mut values = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    let mut src = [i, j, k];
                    let m = src[a];
                    if m < n {
                        values.push(self[src]);
                    } else {
                        src[a] = 2 * n - 2 - m;
                        values.push(sign * self[src]);
                    }
                }
            }
        }

        Self { dims, values }
    }
}

impl Index<[usize; 3]> for WeightGrid {
    type Output = f64;

    fn index(&self, [i, j, k]: [usize; 3]) -> &f64 {
        match self.offset(i, j, k) {
            Some(idx) => &self.values[idx],
            None => panic!(
                "weight index {:?} out of bounds for {:?} grid",
                [i, j, k],
                self.dims
            ),
        }
    }
}

impl IndexMut<[usize; 3]> for WeightGrid {
    fn index_mut(&mut self, [i, j, k]: [usize; 3]) -> &mut f64 {
        match self.offset(i, j, k) {
            Some(idx) => &mut self.values[idx],
            None => panic!(
                "weight index {:?} out of bounds for {:?} grid",
                [i, j, k],
                self.dims
            ),
        }
    }
}
