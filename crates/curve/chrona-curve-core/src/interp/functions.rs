//! Value functions behind the sampling modes:
//! - step_value (hold)
//! - linear_value (interpolate toward the successor, hold past the last keyframe)

use crate::error::CurveError;
use crate::interp::Interpolate;
use crate::keyframe::KeyframeRef;
use crate::time::SimTime;
use crate::timeline::Timeline;

#[inline]
pub fn step_value<V: Clone>(timeline: &Timeline<V>, at: KeyframeRef) -> Result<V, CurveError> {
    Ok(timeline.resolve(at)?.value.clone())
}

/// Holds when there is no successor, when `t` sits exactly on the keyframe, or
/// when `at` is the sentinel (nothing is interpolated out of `-inf`).
pub fn linear_value<V: Clone + Interpolate>(
    timeline: &Timeline<V>,
    at: KeyframeRef,
    t: SimTime,
) -> Result<V, CurveError> {
    let k0 = timeline.resolve(at)?;
    let k1 = match timeline.next(at).and_then(|r| timeline.get(r)) {
        Some(k1) if !at.is_sentinel() && t != k0.time => k1,
        _ => return Ok(k0.value.clone()),
    };

    let span = k1.time.raw() as i128 - k0.time.raw() as i128;
    let elapsed = t.raw() as i128 - k0.time.raw() as i128;
    let divergent = CurveError::DivergentInterpolation {
        from: k0.time,
        to: k1.time,
    };
    if span <= 0 || elapsed < 0 {
        return Err(divergent);
    }
    V::interpolate(&k0.value, &k1.value, elapsed, span).ok_or(divergent)
}
