use crate::math::Real;
use num::{AsPrimitive, Float};

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A floating-point type accepted for input coordinates.
///
/// This is implemented for `f32` and `f64` only. Both are widened to [`Real`] exactly,
/// so a mesh given in single precision decomposes into the same hulls as its
/// double-precision conversion.
pub trait InputScalar:
    private::Sealed + Float + AsPrimitive<Real> + Send + Sync + 'static
{
}

impl InputScalar for f32 {}
impl InputScalar for f64 {}
