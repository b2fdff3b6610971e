use crate::math::Real;
use std::fmt;
use std::sync::Arc;

/// The stages of a decomposition, in execution order.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Rasterization and filling of the input mesh.
    Voxelization,
    /// Recursive splitting of the voxelized mesh.
    Splitting,
    /// Generation and simplification of one convex hull per part.
    HullGeneration,
    /// Merging of the convex hulls down to the requested count.
    Merging,
}

type ProgressFn = dyn Fn(Stage, Real) + Send + Sync;

/// A hook notified as a decomposition progresses.
///
/// The callback receives the current [`Stage`] and the completed fraction of that stage,
/// in `[0, 1]`. Every stage reports `0.0` when it starts and `1.0` when it ends. The
/// callback may be invoked from worker threads when the decomposition runs in parallel.
///
/// Clones share the same callback. The default value reports nothing.
#[derive(Clone, Default)]
pub struct ProgressCallback(Option<Arc<ProgressFn>>);

impl ProgressCallback {
    /// Wraps `f` into a progress callback.
    pub fn new(f: impl Fn(Stage, Real) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(f)))
    }

    /// A callback that ignores every report.
    pub fn none() -> Self {
        Self(None)
    }

    pub(crate) fn report(&self, stage: Stage, progress: Real) {
        if let Some(f) = &self.0 {
            f(stage, progress.clamp(0.0, 1.0))
        }
    }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("ProgressCallback(..)"),
            None => f.write_str("ProgressCallback(None)"),
        }
    }
}

impl PartialEq for ProgressCallback {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}
