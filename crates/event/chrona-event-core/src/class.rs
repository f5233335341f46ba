//! The event class contract.

use std::collections::BTreeSet;

use chrona_curve::{CurveId, SimTime};
use serde::{Deserialize, Serialize};

use crate::error::InvokeError;
use crate::event_loop::EventLoop;
use crate::params::ParamMap;
use crate::target::EventTarget;

/// When an instance of a class is (re)scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Re-predicted on every dependency change and after every firing.
    OnChange,
    /// Fires at most once, then is discarded. Dependency changes still move it.
    Once,
    /// Scheduled at the time of each dependency change, without prediction.
    /// Dormant between changes.
    Immediate,
    /// Scheduled only through [`EventLoop::trigger`]. Dormant otherwise.
    Trigger,
}

impl TriggerKind {
    /// Kinds whose firing time comes from `predict_next_time`.
    #[inline]
    pub fn predicts(self) -> bool {
        matches!(self, TriggerKind::OnChange | TriggerKind::Once)
    }
}

/// Collects the dependencies of an instance while its class sets it up.
#[derive(Debug)]
pub struct SetupContext<'a> {
    target: EventTarget,
    params: &'a ParamMap,
    dependencies: BTreeSet<CurveId>,
}

impl<'a> SetupContext<'a> {
    pub(crate) fn new(target: EventTarget, params: &'a ParamMap) -> Self {
        Self {
            target,
            params,
            dependencies: BTreeSet::new(),
        }
    }

    /// Changes to `curve` will re-evaluate this instance.
    pub fn depend_on(&mut self, curve: impl Into<EventTarget>) {
        self.dependencies.insert(curve.into().curve);
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn params(&self) -> &ParamMap {
        self.params
    }

    pub(crate) fn into_dependencies(self) -> BTreeSet<CurveId> {
        self.dependencies
    }
}

/// A named, stateless rule. One registered class serves every instance created
/// from it; per-instance data lives in the instance's [`ParamMap`].
pub trait EventClass<S> {
    /// Registry key.
    fn name(&self) -> &str;

    fn kind(&self) -> TriggerKind;

    /// Runs once when an instance is created. Declare every curve whose change
    /// should re-evaluate the instance with [`SetupContext::depend_on`].
    fn setup(&self, ctx: &mut SetupContext<'_>, state: &S);

    /// The effect. By the time this runs the condition that scheduled it may no
    /// longer hold; re-check it and return
    /// [`InvokeError::StalePreconditionViolation`] if so.
    fn invoke(
        &self,
        lp: &mut EventLoop<S>,
        target: EventTarget,
        state: &mut S,
        now: SimTime,
        params: &mut ParamMap,
    ) -> Result<(), InvokeError>;

    /// Next firing time given the current curve values. [`SimTime::MAX`] means
    /// never. Must not mutate anything.
    fn predict_next_time(&self, target: EventTarget, state: &S, now: SimTime) -> SimTime;
}
