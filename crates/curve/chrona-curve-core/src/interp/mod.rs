//! Sampling modes for curves.
//!
//! A curve samples its timeline through a [`Sampling`] implementation chosen at
//! the type level: [`Step`] holds the last value, [`Linear`] interpolates toward
//! the successor keyframe.

pub mod functions;

use crate::error::CurveError;
use crate::keyframe::KeyframeRef;
use crate::time::SimTime;
use crate::timeline::Timeline;

pub use functions::{linear_value, step_value};

/// Values that can be blended linearly in their own arithmetic.
///
/// `elapsed` and `span` are raw [`SimTime`] tick counts with `0 <= elapsed < span`.
/// `None` means the blend is not representable in `Self`.
pub trait Interpolate: Sized {
    fn interpolate(from: &Self, to: &Self, elapsed: i128, span: i128) -> Option<Self>;
}

/// How a curve derives a value at an arbitrary time from its keyframes.
pub trait Sampling<V> {
    const NAME: &'static str;

    /// `at` is `timeline.last(t)`.
    fn sample(timeline: &Timeline<V>, at: KeyframeRef, t: SimTime) -> Result<V, CurveError>;
}

/// Step-hold sampling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Step;

/// Linear interpolation sampling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Linear;

impl<V: Clone> Sampling<V> for Step {
    const NAME: &'static str = "step";

    fn sample(timeline: &Timeline<V>, at: KeyframeRef, _t: SimTime) -> Result<V, CurveError> {
        step_value(timeline, at)
    }
}

impl<V: Clone + Interpolate> Sampling<V> for Linear {
    const NAME: &'static str = "linear";

    fn sample(timeline: &Timeline<V>, at: KeyframeRef, t: SimTime) -> Result<V, CurveError> {
        linear_value(timeline, at, t)
    }
}

macro_rules! impl_interpolate_float {
    ($($ty:ty),*) => {$(
        impl Interpolate for $ty {
            #[inline]
            fn interpolate(from: &Self, to: &Self, elapsed: i128, span: i128) -> Option<Self> {
                let frac = elapsed as f64 / span as f64;
                Some(*from + (*to - *from) * frac as $ty)
            }
        }
    )*};
}

macro_rules! impl_interpolate_int {
    ($($ty:ty),*) => {$(
        impl Interpolate for $ty {
            #[inline]
            fn interpolate(from: &Self, to: &Self, elapsed: i128, span: i128) -> Option<Self> {
                let delta = (*to as i128 - *from as i128).checked_mul(elapsed)? / span;
                <$ty>::try_from(*from as i128 + delta).ok()
            }
        }
    )*};
}

impl_interpolate_float!(f32, f64);
impl_interpolate_int!(i32, i64);

impl Interpolate for SimTime {
    fn interpolate(from: &Self, to: &Self, elapsed: i128, span: i128) -> Option<Self> {
        i64::interpolate(&from.raw(), &to.raw(), elapsed, span).map(SimTime::from_raw)
    }
}

/// Componentwise.
impl<T: Interpolate + Copy, const N: usize> Interpolate for [T; N] {
    fn interpolate(from: &Self, to: &Self, elapsed: i128, span: i128) -> Option<Self> {
        let mut out = *from;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = T::interpolate(&from[i], &to[i], elapsed, span)?;
        }
        Some(out)
    }
}
