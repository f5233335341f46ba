//! Live bindings of an event class to a target.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use chrona_curve::{CurveId, SimTime};
use serde::{Deserialize, Serialize};

use crate::class::EventClass;
use crate::params::ParamMap;
use crate::target::EventTarget;

/// Creation-ordered id; the schedule's tie-breaker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceState {
    Scheduled(SimTime),
    /// Off the schedule until a dependency change or trigger revives it.
    Dormant,
    /// Currently inside `invoke`.
    Firing,
}

pub struct EventInstance<S> {
    pub(crate) id: InstanceId,
    pub(crate) class: Rc<dyn EventClass<S>>,
    pub(crate) target: EventTarget,
    pub(crate) params: ParamMap,
    pub(crate) dependencies: BTreeSet<CurveId>,
    pub(crate) state: InstanceState,
    pub(crate) last_fired: Option<SimTime>,
}

impl<S> EventInstance<S> {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn dependencies(&self) -> &BTreeSet<CurveId> {
        &self.dependencies
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn scheduled_time(&self) -> Option<SimTime> {
        match self.state {
            InstanceState::Scheduled(t) => Some(t),
            _ => None,
        }
    }

    pub fn last_fired(&self) -> Option<SimTime> {
        self.last_fired
    }
}

impl<S> fmt::Debug for EventInstance<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventInstance")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .field("target", &self.target)
            .field("state", &self.state)
            .field("dependencies", &self.dependencies)
            .field("last_fired", &self.last_fired)
            .finish()
    }
}
