//! Validation and copy of the mesh buffers given to a decomposition.

pub use self::mesh::InputMesh;
pub use self::scalar::InputScalar;

mod mesh;
mod scalar;
