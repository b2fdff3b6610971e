use crate::DecompositionError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag used to interrupt a running decomposition.
///
/// Clones share the same underlying flag, so a clone kept by another thread can cancel a
/// computation running with the [`Parameters`](super::Parameters) it was taken from. The
/// decomposition checks this flag for every triangle it voxelizes, every cut plane it
/// evaluates, every part it processes, every hull it generates, and every simplification
/// or merge step.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a new, unset, flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the cancellation of every computation sharing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release)
    }

    /// Has the cancellation been requested?
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the flag so it can be used for another computation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release)
    }

    pub(crate) fn check(&self) -> Result<(), DecompositionError> {
        if self.is_cancelled() {
            Err(DecompositionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl PartialEq for CancellationFlag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
