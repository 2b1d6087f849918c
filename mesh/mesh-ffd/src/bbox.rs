//! Fitting the FFD box around geometry.

use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::{FfdError, FfdResult, ParameterStore};

/// Options for computing the bounding box of a shape.
///
/// # Example
///
/// ```
/// use mesh_ffd::BoundingBoxOptions;
///
/// let options = BoundingBoxOptions::default()
///     .with_tolerance(1e-3)
///     .with_triangulation(0.05);
/// assert!(options.triangulate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxOptions {
    /// Gap added around the exact bounds on every side.
    pub tolerance: f64,
    /// Triangulate the shape before measuring it.
    pub triangulate: bool,
    /// Size of the triangles created when `triangulate` is set.
    pub triangulate_tolerance: f64,
}

impl Default for BoundingBoxOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            triangulate: false,
            triangulate_tolerance: 1e-1,
        }
    }
}

impl BoundingBoxOptions {
    /// Sets the gap added around the bounds.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enables triangulation with the given triangle size.
    #[must_use]
    pub const fn with_triangulation(mut self, triangulate_tolerance: f64) -> Self {
        self.triangulate = true;
        self.triangulate_tolerance = triangulate_tolerance;
        self
    }
}

/// Geometry that can report its axis-aligned bounds.
///
/// Implement this for a CAD shape handle to fit an FFD box around it with
/// [`ParameterStore::build_bounding_box`].
pub trait BoundingBoxSource {
    /// Returns the `(min, max)` corners of the shape's bounding box.
    ///
    /// # Errors
    ///
    /// Implementations report shapes whose bounds cannot be computed.
    fn compute_bbox(&self, options: &BoundingBoxOptions)
    -> FfdResult<(Point3<f64>, Point3<f64>)>;
}

/// Exact point data: the bounds are the coordinate extremes, widened by
/// `tolerance`. Triangulation does not apply.
impl BoundingBoxSource for [Point3<f64>] {
    fn compute_bbox(
        &self,
        options: &BoundingBoxOptions,
    ) -> FfdResult<(Point3<f64>, Point3<f64>)> {
        let (first, rest) = self.split_first().ok_or(FfdError::EmptyGeometry)?;
        let (min, max) = rest.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        let gap = Vector3::repeat(options.tolerance);
        Ok((min - gap, max + gap))
    }
}

impl BoundingBoxSource for Vec<Point3<f64>> {
    fn compute_bbox(
        &self,
        options: &BoundingBoxOptions,
    ) -> FfdResult<(Point3<f64>, Point3<f64>)> {
        self.as_slice().compute_bbox(options)
    }
}

impl ParameterStore {
    /// Fits the box around `shape`.
    ///
    /// The origin becomes the minimum corner and the lengths the extent of
    /// the bounds. All weights are reset; rotation and resolution are kept.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`BoundingBoxSource::compute_bbox`]. The store
    /// is unchanged on error.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_ffd::{BoundingBoxOptions, ParameterStore};
    /// use nalgebra::Point3;
    ///
    /// let points = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 6.0, 8.0)];
    /// let options = BoundingBoxOptions::default().with_tolerance(0.0);
    ///
    /// let mut params = ParameterStore::default();
    /// params.build_bounding_box(&points, &options).unwrap();
    /// assert_eq!(params.box_origin, Point3::new(1.0, 2.0, 3.0));
    /// assert_eq!(params.box_length.z, 5.0);
    /// ```
    pub fn build_bounding_box<S>(&mut self, shape: &S, options: &BoundingBoxOptions) -> FfdResult<()>
    where
        S: BoundingBoxSource + ?Sized,
    {
        let (min, max) = shape.compute_bbox(options)?;
        self.box_origin = min;
        self.box_length = max - min;
        self.reset_deformation();
        info!(
            origin = ?self.box_origin,
            length = ?self.box_length,
            "Fitted FFD box to bounding box"
        );
        Ok(())
    }
}
