//! Approximate convex decomposition using the VHACD algorithm.

pub use self::cancellation::CancellationFlag;
pub use self::parameters::Parameters;
pub use self::progress::{ProgressCallback, Stage};
pub use self::vhacd::{approximate_convex_decomposition, VHACD};
pub use crate::transformation::voxelization::FillMode;

pub(crate) use self::vhacd::CutPlane;

mod cancellation;
mod merge;
mod parameters;
mod progress;
mod simplify;
mod vhacd;
