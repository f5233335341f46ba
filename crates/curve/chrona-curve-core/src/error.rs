//! Error types for timelines and curves

use crate::time::SimTime;

/// Failures raised by timeline and curve operations.
///
/// Everything except [`CurveError::StaleKeyframe`] means a timeline invariant was
/// broken and the current tick cannot continue.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CurveError {
    /// Linear interpolation over a zero or negative time delta, or one whose
    /// result does not fit the value type
    #[error("divergent interpolation between {from} and {to}")]
    DivergentInterpolation { from: SimTime, to: SimTime },

    /// Keyframes out of time order
    #[error("keyframe {index} at {time} precedes its predecessor at {prev}")]
    OrderingViolation {
        index: usize,
        prev: SimTime,
        time: SimTime,
    },

    /// Timeline lost its `-inf` sentinel
    #[error("timeline has no sentinel keyframe")]
    MissingSentinel,

    /// Attempt to erase the sentinel
    #[error("the sentinel keyframe cannot be erased")]
    SentinelRemoval,

    /// A keyframe reference from an older timeline generation
    #[error("stale keyframe reference {index}@{generation} (timeline is at generation {current})")]
    StaleKeyframe {
        index: usize,
        generation: u64,
        current: u64,
    },
}

impl CurveError {
    /// Stale references are recovered by re-fetching; everything else is fatal.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StaleKeyframe { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::DivergentInterpolation { .. } => "interpolation",
            Self::OrderingViolation { .. } | Self::MissingSentinel => "invariant",
            Self::SentinelRemoval | Self::StaleKeyframe { .. } => "reference",
        }
    }
}
