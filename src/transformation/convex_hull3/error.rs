/// Errors generated by the convex-hull calculation.
///
/// The decomposition only ever builds hulls of 3D point clouds, so any input spanning less
/// than three dimensions is rejected with [`ConvexHullError::Degenerate`] instead of being
/// turned into a flat mesh.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvexHullError {
    /// Something went very wrong.
    #[error("Internal error: {0}")]
    InternalError(&'static str),
    /// The input geometry was invalid.
    #[error("Input points are either invalid (NaN) or are almost coplanar.")]
    MissingSupportPoint,
    /// Less than four points were given to the algorithm.
    #[error("Less than 4 points were given to the convex-hull algorithm.")]
    IncompleteInput,
    /// The input points span a subspace of dimension lower than 3.
    #[error("Input points only span {0} dimension(s).")]
    Degenerate(usize),
    /// Internal error: reached an unreachable code path.
    #[error("Internal error: unreachable code path")]
    Unreachable,
    /// A triangle of the output mesh misses one of its neighbors.
    #[error("Detected unfinished triangle")]
    UnfinishedTriangle,
    /// An edge is shared by more than two triangles.
    #[error("Detected t-junction for triangle {0}, edge: ({1}, {2})")]
    TJunction(usize, u32, u32),
    /// Two output vertices share the same coordinates.
    #[error("Detected duplicate points {0} and {1}")]
    DuplicatePoints(usize, usize),
    /// The output mesh is closed but its Euler characteristic is not 2.
    #[error("Invalid Euler characteristic: {0}")]
    EulerCharacteristic(isize),
}
