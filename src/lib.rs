/*!
acd3d
========

**acd3d** computes approximate convex decompositions of 3-dimensional
triangle meshes, written with the rust programming language.

A mesh is voxelized, the resulting volume is recursively split along
axis-aligned cut planes until every part is close enough to its own convex
hull, and one convex hull is then generated, simplified and possibly merged
for every part.

The entry point for most users is the [`session::Session`]:

```
use acd3d::session::{Session, SessionState};
use acd3d::transformation::vhacd::Parameters;

let points = [
    0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
];
let triangles = [
    0u32, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4,
    1, 2, 6, 1, 6, 5, 2, 3, 7, 2, 7, 6, 3, 0, 4, 3, 4, 7,
];

let mut session = Session::new();
session
    .compute(&points, 8, &triangles, 12, &Parameters::default())
    .unwrap();
assert_eq!(session.state(), SessionState::Ready);
assert_eq!(session.hull_count(), Ok(1));
```

The [`interface`] module exposes the same lifecycle through opaque handles,
mirroring the flat create/compute/query/destroy call table expected by
foreign bindings.
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![warn(unused_qualifications)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod input;
pub mod interface;
pub mod session;
pub mod shape;
pub mod transformation;
pub mod utils;

mod error;

pub use self::error::DecompositionError;

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use na::{Matrix3, Point3, UnitVector3, Vector3};

    /// The scalar type used throughout this crate.
    ///
    /// Input coordinates given in single precision are widened to this type
    /// before any computation happens.
    pub type Real = f64;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The matrix type.
    pub use Matrix3 as Matrix;
}
