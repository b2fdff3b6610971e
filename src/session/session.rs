use super::HullStore;
use crate::input::{InputMesh, InputScalar};
use crate::shape::ConvexHull;
use crate::transformation::vhacd::{approximate_convex_decomposition, Parameters};
use crate::DecompositionError;
use log::{debug, warn};

/// The lifecycle state of a [`Session`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No computation has been run yet.
    #[default]
    Created,
    /// A computation is running.
    Computing,
    /// The last computation succeeded and its hulls can be retrieved.
    Ready,
    /// The last computation failed.
    Failed,
    /// The last computation was cancelled.
    Cancelled,
}

/// A decomposition session.
///
/// A session owns the last mesh and parameters it was computed with, the resulting hulls,
/// and the error of the last failed operation. It holds the results of at most one
/// computation: computing again first clears the previous hulls.
///
/// Invalid inputs are rejected before anything is modified, so a failed call to
/// [`Session::compute`] with an invalid mesh keeps the previous results available.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    mesh: Option<InputMesh>,
    parameters: Option<Parameters>,
    hulls: HullStore,
    last_error: Option<DecompositionError>,
}

impl Session {
    /// Creates a new session, in the [`SessionState::Created`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state of this session.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The error returned by the last operation that failed, if any.
    pub fn last_error(&self) -> Option<&DecompositionError> {
        self.last_error.as_ref()
    }

    /// The mesh of the last computation that passed input validation.
    pub fn mesh(&self) -> Option<&InputMesh> {
        self.mesh.as_ref()
    }

    /// The parameters of the last computation that passed input validation.
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Decomposes the mesh given as flat buffers.
    ///
    /// See [`InputMesh::from_flat`] for the layout of the buffers. They are copied, so
    /// they can be reused as soon as this returns.
    pub fn compute<T: InputScalar>(
        &mut self,
        points: &[T],
        point_count: u32,
        triangles: &[u32],
        triangle_count: u32,
        params: &Parameters,
    ) -> Result<(), DecompositionError> {
        match InputMesh::from_flat(points, point_count, triangles, triangle_count) {
            Ok(mesh) => self.compute_mesh(mesh, params),
            Err(err) => Err(self.record_error(err)),
        }
    }

    /// Decomposes the given mesh.
    pub fn compute_mesh(
        &mut self,
        mesh: InputMesh,
        params: &Parameters,
    ) -> Result<(), DecompositionError> {
        if let Err(err) = params.validate() {
            return Err(self.record_error(err));
        }

        self.hulls.clear();
        self.last_error = None;
        self.state = SessionState::Computing;

        let result = approximate_convex_decomposition(&mesh, params);
        self.mesh = Some(mesh);
        self.parameters = Some(params.clone());

        match result {
            Ok(hulls) => {
                self.hulls.extend(hulls);
                self.state = SessionState::Ready;
                debug!(
                    "Decomposition produced {} convex hulls (total volume: {}).",
                    self.hulls.count(),
                    self.hulls.total_volume()
                );
                Ok(())
            }
            Err(err) => {
                self.state = if err == DecompositionError::Cancelled {
                    SessionState::Cancelled
                } else {
                    SessionState::Failed
                };
                Err(self.record_error(err))
            }
        }
    }

    /// The number of hulls produced by the last computation.
    ///
    /// This is `0` after a failed or cancelled computation, and an error before the first
    /// computation.
    pub fn hull_count(&self) -> Result<u32, DecompositionError> {
        match self.state {
            SessionState::Created => Err(DecompositionError::invalid_state(
                "no decomposition has been computed yet",
            )),
            SessionState::Computing => Err(DecompositionError::invalid_state(
                "the decomposition is still being computed",
            )),
            SessionState::Ready | SessionState::Failed | SessionState::Cancelled => {
                Ok(self.hulls.count())
            }
        }
    }

    /// A copy of the `index`-th hull produced by the last computation.
    pub fn get_hull(&self, index: u32) -> Result<ConvexHull, DecompositionError> {
        if self.state != SessionState::Ready {
            return Err(DecompositionError::invalid_state(format!(
                "hulls can only be retrieved from a ready session, this session is {:?}",
                self.state
            )));
        }

        self.hulls.get(index)
    }

    /// The hulls produced by the last computation.
    pub fn hulls(&self) -> &HullStore {
        &self.hulls
    }

    fn record_error(&mut self, err: DecompositionError) -> DecompositionError {
        warn!("{}", err);
        self.last_error = Some(err.clone());
        err
    }
}
