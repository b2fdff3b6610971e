//! Handle-based access to decomposition sessions.
//!
//! This exposes the lifecycle of a [`Session`] through opaque [`SessionHandle`]s stored
//! in a process-wide table: create, compute, query hulls, destroy. It is the call table a
//! foreign-language binding wraps. Each session is protected by its own lock, so sessions
//! can be computed concurrently from different threads. Calls targeting a session that is
//! currently computing return [`DecompositionError::InvalidState`] instead of blocking.

use crate::input::InputScalar;
use crate::session::{Session, SessionState};
use crate::shape::ConvexHull;
use crate::transformation::vhacd::Parameters;
use crate::DecompositionError;
use log::debug;
use slab::Slab;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, TryLockError};

/// An opaque reference to a session stored in a [`SessionTable`].
///
/// Handles are never reused: a handle to a destroyed session stays invalid even if
/// another session is created afterward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    key: u32,
    generation: u32,
}

/// A convex hull flattened into plain buffers.
///
/// `points` contains `3 * n` coordinates and `triangle_indices` contains `3 * m`
/// indices, each smaller than `n`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatHull {
    /// The coordinates of the hull vertices.
    pub points: Vec<f64>,
    /// The indices of the vertices of each triangle of the hull.
    pub triangle_indices: Vec<u32>,
    /// The number of vertices.
    pub n: u32,
    /// The number of triangles.
    pub m: u32,
}

impl From<&ConvexHull> for FlatHull {
    fn from(hull: &ConvexHull) -> Self {
        Self {
            points: hull.points().iter().flat_map(|p| p.coords.iter().copied()).collect(),
            triangle_indices: hull.indices().iter().flatten().copied().collect(),
            n: hull.num_points() as u32,
            m: hull.num_triangles() as u32,
        }
    }
}

type SharedSession = Arc<Mutex<Session>>;

#[derive(Default)]
struct TableEntries {
    sessions: Slab<(u32, SharedSession)>,
    generation: u32,
}

/// A table of sessions addressed by [`SessionHandle`]s.
///
/// The free functions of this module operate on a global table. Independent tables can
/// be created for isolation.
#[derive(Default)]
pub struct SessionTable {
    entries: Mutex<TableEntries>,
}

impl SessionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, TableEntries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, handle: SessionHandle) -> Result<SharedSession, DecompositionError> {
        match self.entries().sessions.get(handle.key as usize) {
            Some((generation, session)) if *generation == handle.generation => {
                Ok(session.clone())
            }
            _ => Err(invalid_handle(handle)),
        }
    }

    fn with_session<R>(
        &self,
        handle: SessionHandle,
        f: impl FnOnce(&mut Session) -> Result<R, DecompositionError>,
    ) -> Result<R, DecompositionError> {
        let session = self.lookup(handle)?;
        let mut guard = match session.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(busy(handle)),
        };
        f(&mut guard)
    }

    /// Creates a new session.
    pub fn create(&self) -> SessionHandle {
        let mut entries = self.entries();
        entries.generation = entries.generation.wrapping_add(1);
        let generation = entries.generation;
        let key = entries
            .sessions
            .insert((generation, Arc::new(Mutex::new(Session::new()))));
        debug!("Created session {}.", key);

        SessionHandle {
            key: key as u32,
            generation,
        }
    }

    /// Destroys a session, releasing its mesh and hulls.
    ///
    /// Destroying an already destroyed session, or a session that is computing, fails
    /// with [`DecompositionError::InvalidState`].
    pub fn destroy(&self, handle: SessionHandle) -> Result<(), DecompositionError> {
        let mut entries = self.entries();
        let key = handle.key as usize;

        match entries.sessions.get(key) {
            Some((generation, session)) if *generation == handle.generation => {
                if let Err(TryLockError::WouldBlock) = session.try_lock() {
                    return Err(busy(handle));
                }
            }
            _ => return Err(invalid_handle(handle)),
        }

        let _ = entries.sessions.remove(key);
        debug!("Destroyed session {}.", key);
        Ok(())
    }

    /// Decomposes the given mesh with the session `handle`.
    ///
    /// See [`Session::compute`].
    pub fn try_compute<T: InputScalar>(
        &self,
        handle: SessionHandle,
        points: &[T],
        point_count: u32,
        triangles: &[u32],
        triangle_count: u32,
        params: &Parameters,
    ) -> Result<(), DecompositionError> {
        self.with_session(handle, |session| {
            session.compute(points, point_count, triangles, triangle_count, params)
        })
    }

    /// Decomposes the given mesh with the session `handle`, returning `true` on success.
    ///
    /// On failure, the error can be retrieved with [`SessionTable::last_error`], unless the
    /// handle itself is invalid.
    pub fn compute<T: InputScalar>(
        &self,
        handle: SessionHandle,
        points: &[T],
        point_count: u32,
        triangles: &[u32],
        triangle_count: u32,
        params: &Parameters,
    ) -> bool {
        self.try_compute(handle, points, point_count, triangles, triangle_count, params)
            .is_ok()
    }

    /// The state of the session `handle`.
    pub fn status(&self, handle: SessionHandle) -> Result<SessionState, DecompositionError> {
        let session = self.lookup(handle)?;
        let state = match session.try_lock() {
            Ok(guard) => guard.state(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().state(),
            Err(TryLockError::WouldBlock) => SessionState::Computing,
        };
        Ok(state)
    }

    /// The last error recorded by the session `handle`.
    pub fn last_error(
        &self,
        handle: SessionHandle,
    ) -> Result<Option<DecompositionError>, DecompositionError> {
        self.with_session(handle, |session| Ok(session.last_error().cloned()))
    }

    /// The number of hulls of the session `handle`.
    ///
    /// See [`Session::hull_count`].
    pub fn hull_count(&self, handle: SessionHandle) -> Result<u32, DecompositionError> {
        self.with_session(handle, |session| session.hull_count())
    }

    /// A copy of the `index`-th hull of the session `handle`.
    pub fn get_hull(
        &self,
        handle: SessionHandle,
        index: u32,
    ) -> Result<FlatHull, DecompositionError> {
        self.with_session(handle, |session| {
            session.get_hull(index).map(|hull| FlatHull::from(&hull))
        })
    }

    /// The number of live sessions in this table.
    pub fn len(&self) -> usize {
        self.entries().sessions.len()
    }

    /// Does this table contain no live session?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn invalid_handle(handle: SessionHandle) -> DecompositionError {
    DecompositionError::invalid_state(format!(
        "session handle {:?} is invalid or was destroyed",
        handle
    ))
}

fn busy(handle: SessionHandle) -> DecompositionError {
    DecompositionError::invalid_state(format!("session {:?} is computing", handle))
}

fn global_table() -> &'static SessionTable {
    static TABLE: OnceLock<SessionTable> = OnceLock::new();
    TABLE.get_or_init(SessionTable::new)
}

/// Creates a new session in the global table.
pub fn create() -> SessionHandle {
    global_table().create()
}

/// Destroys a session of the global table.
///
/// See [`SessionTable::destroy`].
pub fn destroy(handle: SessionHandle) -> Result<(), DecompositionError> {
    global_table().destroy(handle)
}

/// Decomposes a mesh with a session of the global table, returning `true` on success.
///
/// See [`SessionTable::compute`].
pub fn compute<T: InputScalar>(
    handle: SessionHandle,
    points: &[T],
    point_count: u32,
    triangles: &[u32],
    triangle_count: u32,
    params: &Parameters,
) -> bool {
    global_table().compute(handle, points, point_count, triangles, triangle_count, params)
}

/// Decomposes a mesh with a session of the global table.
pub fn try_compute<T: InputScalar>(
    handle: SessionHandle,
    points: &[T],
    point_count: u32,
    triangles: &[u32],
    triangle_count: u32,
    params: &Parameters,
) -> Result<(), DecompositionError> {
    global_table().try_compute(handle, points, point_count, triangles, triangle_count, params)
}

/// The state of a session of the global table.
pub fn status(handle: SessionHandle) -> Result<SessionState, DecompositionError> {
    global_table().status(handle)
}

/// The last error recorded by a session of the global table.
pub fn last_error(handle: SessionHandle) -> Result<Option<DecompositionError>, DecompositionError> {
    global_table().last_error(handle)
}

/// The number of hulls of a session of the global table.
pub fn hull_count(handle: SessionHandle) -> Result<u32, DecompositionError> {
    global_table().hull_count(handle)
}

/// A copy of a hull of a session of the global table.
pub fn get_hull(handle: SessionHandle, index: u32) -> Result<FlatHull, DecompositionError> {
    global_table().get_hull(handle, index)
}

/// Releases a hull returned by [`get_hull`].
pub fn release_hull(hull: FlatHull) {
    drop(hull)
}
