//! Shapes manipulated by the decomposition pipeline.

pub use self::convex_hull::ConvexHull;
pub use self::tetrahedron::Tetrahedron;
pub use self::triangle::Triangle;

mod convex_hull;
mod tetrahedron;
mod triangle;
