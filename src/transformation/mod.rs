//! Convex hull computation, voxelization, and approximate convex decomposition of meshes.

pub use self::convex_hull3::{check_convex_hull, try_convex_hull, ConvexHullError};

mod convex_hull3;
pub(crate) mod convex_hull_utils;
/// Approximate convex decomposition using the VHACD algorithm.
pub mod vhacd;
/// Voxelization of a 3D triangle mesh.
pub mod voxelization;

#[cfg(feature = "wavefront")]
mod wavefront;
