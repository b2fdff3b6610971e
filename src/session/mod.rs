//! Sessions binding an input mesh, its decomposition parameters, and the resulting hulls.

pub use self::hull_store::HullStore;
pub use self::session::{Session, SessionState};

mod hull_store;
mod session;
