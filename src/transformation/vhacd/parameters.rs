use super::{CancellationFlag, ProgressCallback};
use crate::math::Real;
use crate::transformation::voxelization::FillMode;
use crate::DecompositionError;
use std::fmt::Display;

/// Parameters controlling the approximate convex decomposition.
///
/// Every field can be set directly. [`Parameters::validate`] is run before any computation
/// and rejects out-of-range or non-finite values.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Voxel budget of the voxelization stage.
    ///
    /// It sets the number of voxels along the axis where the mesh has the largest extent,
    /// see [`Parameters::voxel_grid_dimension`]. The other axes get as many voxels as
    /// needed to keep the voxels cubic, plus two. The grid may thus hold more voxels than
    /// this budget: a cube is voxelized on a `71 × 71 × 69` grid with the default value.
    ///
    /// Valid range: `[10_000, 64_000_000]`. Default: `100_000`.
    pub resolution: u32,
    /// Maximum number of convex hulls to produce.
    ///
    /// Hulls are merged until this count is reached.
    /// Valid range: `[1, 2048]`. Default: `32`.
    pub max_convex_hulls: u32,
    /// Maximum depth of the recursive splitting.
    ///
    /// Valid range: `[1, 15]`. Default: `10`.
    pub max_recursion_depth: u32,
    /// Maximum allowed concavity of a part, normalized by the volume of the convex hull
    /// of the whole mesh. Parts below this threshold are not split further.
    ///
    /// Valid range: `[0.0, 1.0]`. Default: `0.01`.
    pub concavity: Real,
    /// Controls the granularity of the search for the best clipping plane.
    ///
    /// Valid range: `[1, 16]`. Default: `4`.
    pub plane_downsampling: u32,
    /// Controls the precision of the convex-hull generation process during the
    /// clipping plane selection stage.
    ///
    /// Valid range: `[1, 16]`. Default: `4`.
    pub convex_hull_downsampling: u32,
    /// Controls the bias toward clipping along symmetry planes.
    ///
    /// Valid range: `[0.0, 1.0]`. Default: `0.05`.
    pub alpha: Real,
    /// Controls the bias toward clipping along revolution planes.
    ///
    /// Valid range: `[0.0, 1.0]`. Default: `0.05`.
    pub beta: Real,
    /// Controls the maximum number of vertices per convex hull.
    ///
    /// Valid range: `[4, 1024]`. Default: `64`.
    pub max_num_vertices_per_ch: u32,
    /// Minimum number of voxels along each axis of a part for it to be split.
    ///
    /// Valid range: `[1, 16]`. Default: `2`.
    pub min_edge_length: u32,
    /// Controls the way the input mesh is voxelized.
    ///
    /// Default: `FillMode::FloodFill`.
    pub fill_mode: FillMode,
    /// Build the convex hulls from the source triangles clipped by the voxels of each
    /// part instead of the voxel corners.
    ///
    /// Default: `true`.
    pub shrink_wrap: bool,
    /// Allows the computation to run on the `rayon` thread pool. This has no effect
    /// unless the `parallel` feature is enabled.
    ///
    /// Default: `true`.
    pub parallel: bool,
    /// Flag polled during the computation to interrupt it.
    #[cfg_attr(feature = "serde-serialize", serde(skip))]
    pub cancel: CancellationFlag,
    /// Hook notified as the computation progresses.
    #[cfg_attr(feature = "serde-serialize", serde(skip))]
    pub progress: ProgressCallback,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            resolution: 100_000,
            max_convex_hulls: 32,
            max_recursion_depth: 10,
            concavity: 0.01,
            plane_downsampling: 4,
            convex_hull_downsampling: 4,
            alpha: 0.05,
            beta: 0.05,
            max_num_vertices_per_ch: 64,
            min_edge_length: 2,
            fill_mode: FillMode::FloodFill,
            shrink_wrap: true,
            parallel: true,
            cancel: CancellationFlag::new(),
            progress: ProgressCallback::none(),
        }
    }
}

impl Parameters {
    /// Checks that every parameter lies in its valid range.
    pub fn validate(&self) -> Result<(), DecompositionError> {
        check_range("resolution", self.resolution, 10_000, 64_000_000)?;
        check_range("max_convex_hulls", self.max_convex_hulls, 1, 2048)?;
        check_range("max_recursion_depth", self.max_recursion_depth, 1, 15)?;
        check_range("concavity", self.concavity, 0.0, 1.0)?;
        check_range("plane_downsampling", self.plane_downsampling, 1, 16)?;
        check_range(
            "convex_hull_downsampling",
            self.convex_hull_downsampling,
            1,
            16,
        )?;
        check_range("alpha", self.alpha, 0.0, 1.0)?;
        check_range("beta", self.beta, 0.0, 1.0)?;
        check_range(
            "max_num_vertices_per_ch",
            self.max_num_vertices_per_ch,
            4,
            1024,
        )?;
        check_range("min_edge_length", self.min_edge_length, 1, 16)
    }

    /// The number of voxels along the longest axis of the voxelization grid, that is
    /// `max(32, 1.5 * cbrt(resolution))`.
    pub fn voxel_grid_dimension(&self) -> u32 {
        // Minimum voxel resolution is 32x32x32.
        ((1.5 * (self.resolution as Real).cbrt()) as u32).max(32)
    }
}

// NaN fails both comparisons, so it is reported as out of range.
fn check_range<T: PartialOrd + Display>(
    name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), DecompositionError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(DecompositionError::invalid_input(format!(
            "parameter `{}` is {}, expected a value in [{}, {}]",
            name, value, min, max
        )))
    }
}
