//! Element types the engine is instantiated for.

use num_traits::Float;
use std::fmt::Debug;

/// Floating-point coordinate type (`f32` or `f64`).
///
/// Distances, sums, costs and sampling weights are computed in `f64` whatever the
/// coordinate type, so `widen` / `narrow` are the only conversions the
/// kernels need.
pub trait Scalar: Float + Debug + Default + Send + Sync + 'static {
    /// Convert to `f64` without loss.
    fn widen(self) -> f64;

    /// Convert from `f64`, rounding to the nearest representable value.
    fn narrow(value: f64) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn narrow(value: f64) -> Self {
        value as f32
    }
}

impl Scalar for f64 {
    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn narrow(value: f64) -> Self {
        value
    }
}
