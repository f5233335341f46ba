//! Event targets and the simulation state contract.

use std::fmt;

use chrona_curve::{Curve, CurveId};
use serde::{Deserialize, Serialize};

/// Non-owning handle to a curve, used for dependency bookkeeping and as the
/// subject an event acts on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventTarget {
    pub curve: CurveId,
}

impl EventTarget {
    pub fn new(curve: CurveId) -> Self {
        Self { curve }
    }
}

impl From<CurveId> for EventTarget {
    fn from(curve: CurveId) -> Self {
        Self { curve }
    }
}

impl<V, M> From<&Curve<V, M>> for EventTarget {
    fn from(curve: &Curve<V, M>) -> Self {
        Self { curve: curve.id() }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target({})", self.curve)
    }
}

/// The externally owned aggregate of curves an event loop runs against.
///
/// The scheduler does not look inside it; it only passes it to event classes and
/// asks whether targets still exist.
pub trait SimulationState {
    /// Events on dead targets are dropped instead of invoked.
    fn target_alive(&self, _target: EventTarget) -> bool {
        true
    }
}

impl SimulationState for () {}
