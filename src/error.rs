use crate::transformation::ConvexHullError;

/// Errors reported by the decomposition pipeline, the sessions, and the handle table.
///
/// Every failure is observable by the caller: nothing in this crate swallows one of
/// these errors silently. [`DecompositionError::InvalidInput`] and
/// [`DecompositionError::IndexOutOfRange`] are detected before any state is
/// modified, so they never corrupt a [`Session`](crate::session::Session).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    /// The mesh buffers or the parameters are invalid.
    ///
    /// This is detected before the computation starts.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The decomposition could not be completed.
    ///
    /// For example the mesh has a zero extent, or its voxelization did not
    /// produce any voxel.
    #[error("Computation failure: {0}")]
    ComputationFailure(String),

    /// The computation was interrupted through its cancellation flag.
    #[error("The computation was cancelled.")]
    Cancelled,

    /// A hull index was greater than or equal to the number of hulls.
    #[error("Hull index {index} is out of range (hull count: {count}).")]
    IndexOutOfRange {
        /// The requested index.
        index: u32,
        /// The number of hulls available.
        count: u32,
    },

    /// The operation is not allowed in the current state of the session or handle.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<ConvexHullError> for DecompositionError {
    fn from(err: ConvexHullError) -> Self {
        DecompositionError::ComputationFailure(err.to_string())
    }
}

impl DecompositionError {
    /// Shorthand for building an [`DecompositionError::InvalidInput`].
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        DecompositionError::InvalidInput(msg.into())
    }

    /// Shorthand for building an [`DecompositionError::InvalidState`].
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        DecompositionError::InvalidState(msg.into())
    }
}
