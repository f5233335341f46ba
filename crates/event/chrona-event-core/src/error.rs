//! Error types for the scheduler

use chrona_curve::{CurveError, SimTime};

use crate::instance::InstanceId;

/// Errors surfaced by [`EventLoop`](crate::EventLoop) operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EventError {
    /// `create_event` named a class that was never registered
    #[error("unknown event class: {name}")]
    UnknownEventClass { name: String },

    /// `add_class` with a name that is already taken
    #[error("event class already registered: {name}")]
    DuplicateEventClass { name: String },

    /// No live instance with this id
    #[error("unknown event instance: {instance}")]
    UnknownInstance { instance: InstanceId },

    /// A prediction fell before the earliest admissible time
    #[error("{class} ({instance}) predicted {predicted}, which is not after now={now}")]
    PastSchedulingViolation {
        class: String,
        instance: InstanceId,
        predicted: SimTime,
        now: SimTime,
    },

    /// Invoke/mutate/notify cycles did not settle
    #[error("event cascade at t={time} exceeded {limit} invocations ({invocations} run)")]
    ReentrantExplosion {
        time: SimTime,
        invocations: usize,
        limit: usize,
    },

    /// `advance` called from inside `invoke`
    #[error("advance called while {instance} is being invoked")]
    ReentrantAdvance { instance: InstanceId },

    /// Timeline or curve invariant broken
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Invalid loop configuration
    #[error("invalid loop configuration: {reason}")]
    Config { reason: String },
}

impl EventError {
    /// Recoverable errors leave the loop consistent; the caller may go on.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UnknownEventClass { .. }
            | Self::DuplicateEventClass { .. }
            | Self::UnknownInstance { .. }
            | Self::Config { .. } => true,
            Self::Curve(err) => err.is_recoverable(),
            Self::PastSchedulingViolation { .. }
            | Self::ReentrantExplosion { .. }
            | Self::ReentrantAdvance { .. } => false,
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownEventClass { .. } | Self::DuplicateEventClass { .. } => "registry",
            Self::UnknownInstance { .. } => "instance",
            Self::PastSchedulingViolation { .. }
            | Self::ReentrantExplosion { .. }
            | Self::ReentrantAdvance { .. } => "scheduling",
            Self::Curve(_) => "curve",
            Self::Config { .. } => "config",
        }
    }
}

/// Outcome channel of [`EventClass::invoke`](crate::EventClass::invoke).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    /// The condition that scheduled the event no longer holds. The firing is
    /// skipped and `advance` continues.
    #[error("stale precondition: {reason}")]
    StalePreconditionViolation { reason: String },

    /// The effect could not be applied. Logged, skipped, `advance` continues.
    #[error("invocation failed: {reason}")]
    Failed { reason: String },

    /// Aborts the whole `advance`.
    #[error(transparent)]
    Fatal(#[from] EventError),
}

impl InvokeError {
    pub fn stale(reason: impl Into<String>) -> Self {
        Self::StalePreconditionViolation {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

impl From<CurveError> for InvokeError {
    fn from(err: CurveError) -> Self {
        Self::Fatal(EventError::Curve(err))
    }
}
