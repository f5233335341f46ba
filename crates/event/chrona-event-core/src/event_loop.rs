//! The scheduler.
//!
//! `EventLoop` owns every event instance, keeps the live ones in a
//! [`Schedule`] ordered by `(time, id)`, and maps curves to the instances that
//! depend on them. Curve writes arrive through the loop's [`ChangeSink`]; they
//! are drained at the start of [`EventLoop::advance`] and again after every
//! single invocation, so chains of events caused by one another inside the same
//! `advance` are seen in time order.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrona_curve::{ChangeSink, CurveChange, CurveId, SimTime};
use hashbrown::HashMap;
use log::{debug, trace, warn};

use crate::class::{EventClass, SetupContext, TriggerKind};
use crate::config::{LoopConfig, PastSchedulingPolicy};
use crate::diagnostics::{AdvanceReport, InvocationRecord, InvokeOutcome};
use crate::error::{EventError, InvokeError};
use crate::instance::{EventInstance, InstanceId, InstanceState};
use crate::params::ParamMap;
use crate::schedule::{DependencyIndex, Schedule};
use crate::target::{EventTarget, SimulationState};

pub struct EventLoop<S> {
    config: LoopConfig,
    classes: HashMap<String, Rc<dyn EventClass<S>>>,
    instances: BTreeMap<InstanceId, EventInstance<S>>,
    schedule: Schedule,
    dependents: DependencyIndex,
    changes: ChangeSink,
    next_instance: u64,
    now: SimTime,
    active: Option<InstanceId>,
    trace: Vec<InvocationRecord>,
}

impl<S: SimulationState> Default for EventLoop<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SimulationState> EventLoop<S> {
    pub fn new() -> Self {
        Self::build(LoopConfig::default())
    }

    pub fn with_config(config: LoopConfig) -> Result<Self, EventError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: LoopConfig) -> Self {
        Self {
            config,
            classes: HashMap::new(),
            instances: BTreeMap::new(),
            schedule: Schedule::new(),
            dependents: DependencyIndex::new(),
            changes: ChangeSink::new(),
            next_instance: 0,
            now: SimTime::MIN,
            active: None,
            trace: Vec::new(),
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Sink to construct curves with; their writes reschedule dependents.
    pub fn change_sink(&self) -> &ChangeSink {
        &self.changes
    }

    /// Time of the last firing, or the target of the last completed `advance`.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Instance currently inside `invoke`, if any.
    pub fn active_event(&self) -> Option<InstanceId> {
        self.active
    }

    // ---------- registry ----------

    pub fn add_class<C>(&mut self, class: C) -> Result<(), EventError>
    where
        C: EventClass<S> + 'static,
    {
        self.add_shared_class(Rc::new(class))
    }

    pub fn add_shared_class(&mut self, class: Rc<dyn EventClass<S>>) -> Result<(), EventError> {
        let name = class.name().to_string();
        if self.classes.contains_key(&name) {
            return Err(EventError::DuplicateEventClass { name });
        }
        debug!("registered event class '{name}' ({:?})", class.kind());
        self.classes.insert(name, class);
        Ok(())
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    // ---------- instances ----------

    /// [`EventLoop::create_event_with_params`] with no parameters.
    pub fn create_event(
        &mut self,
        class_name: &str,
        target: impl Into<EventTarget>,
        state: &S,
        now: SimTime,
    ) -> Result<InstanceId, EventError> {
        self.create_event_with_params(class_name, target, state, now, ParamMap::new())
    }

    /// Instantiates `class_name` on `target`, runs its setup and schedules it.
    ///
    /// Predicting classes are scheduled at `predict_next_time(now)`. If that is
    /// never, the instance stays dormant when it has dependencies that could
    /// revive it and is discarded otherwise; the returned id then names no live
    /// instance. `Immediate` and `Trigger` instances start dormant.
    pub fn create_event_with_params(
        &mut self,
        class_name: &str,
        target: impl Into<EventTarget>,
        state: &S,
        now: SimTime,
        params: ParamMap,
    ) -> Result<InstanceId, EventError> {
        let class = self
            .classes
            .get(class_name)
            .cloned()
            .ok_or_else(|| EventError::UnknownEventClass {
                name: class_name.to_string(),
            })?;
        let target = target.into();
        let id = InstanceId(self.next_instance);
        self.next_instance = self.next_instance.wrapping_add(1);

        let mut ctx = SetupContext::new(target, &params);
        class.setup(&mut ctx, state);
        let dependencies = ctx.into_dependencies();

        let kind = class.kind();
        let predicted = if kind.predicts() {
            class.predict_next_time(target, state, now)
        } else {
            SimTime::MAX
        };
        if predicted.is_never() && kind.predicts() && dependencies.is_empty() {
            debug!("{class_name} on {target}: never fires and has no dependencies, discarded");
            return Ok(id);
        }

        self.dependents.register(id, &dependencies);
        self.instances.insert(
            id,
            EventInstance {
                id,
                class,
                target,
                params,
                dependencies,
                state: InstanceState::Dormant,
                last_fired: None,
            },
        );
        debug!("created {id} ({class_name}) on {target}");
        if let Err(err) = self.place(id, predicted) {
            self.remove_instance(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Deregisters an instance. Allowed from inside its own `invoke`.
    pub fn cancel(&mut self, id: InstanceId) -> Result<(), EventError> {
        if self.remove_instance(id) {
            debug!("cancelled {id}");
            Ok(())
        } else {
            Err(EventError::UnknownInstance { instance: id })
        }
    }

    pub fn instance(&self, id: InstanceId) -> Option<&EventInstance<S>> {
        self.instances.get(&id)
    }

    pub fn instance_state(&self, id: InstanceId) -> Option<InstanceState> {
        self.instances.get(&id).map(|i| i.state)
    }

    pub fn scheduled_time(&self, id: InstanceId) -> Option<SimTime> {
        self.instances.get(&id).and_then(|i| i.scheduled_time())
    }

    pub fn params(&self, id: InstanceId) -> Option<&ParamMap> {
        self.instances.get(&id).map(|i| &i.params)
    }

    /// Sorted snapshot of the schedule.
    pub fn pending(&self) -> Vec<(SimTime, InstanceId)> {
        self.schedule.iter().collect()
    }

    pub fn dependents_of(&self, curve: CurveId) -> Vec<InstanceId> {
        self.dependents.dependents_of(curve).collect()
    }

    /// Live instances, scheduled or dormant.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn trace(&self) -> &[InvocationRecord] {
        &self.trace
    }

    pub fn take_trace(&mut self) -> Vec<InvocationRecord> {
        std::mem::take(&mut self.trace)
    }

    // ---------- change propagation ----------

    /// Re-evaluates every instance depending on `curve` after a write at `at`.
    /// Returns how many instances were re-evaluated.
    pub fn notify_dependency_changed(
        &mut self,
        curve: CurveId,
        at: SimTime,
        state: &S,
    ) -> Result<usize, EventError> {
        let dependents: Vec<_> = self
            .dependents
            .dependents_of(curve)
            .map(|id| (id, at))
            .collect();
        self.replan_all(dependents, state)
    }

    /// Drains the change sink and re-evaluates the affected instances, each
    /// once, at the earliest change time that touched it.
    pub fn process_changes(&mut self, state: &S) -> Result<usize, EventError> {
        let changes = self.changes.drain();
        if changes.is_empty() {
            return Ok(0);
        }
        trace!("processing {} curve changes", changes.len());

        let mut earliest: BTreeMap<InstanceId, SimTime> = BTreeMap::new();
        for CurveChange { curve, time } in changes {
            for id in self.dependents.dependents_of(curve) {
                earliest
                    .entry(id)
                    .and_modify(|t| *t = (*t).min(time))
                    .or_insert(time);
            }
        }

        self.replan_all(earliest, state)
    }

    /// Re-evaluates every listed instance, including those after a failed one,
    /// then returns the first error.
    fn replan_all(
        &mut self,
        affected: impl IntoIterator<Item = (InstanceId, SimTime)>,
        state: &S,
    ) -> Result<usize, EventError> {
        let mut n = 0;
        let mut first_err = None;
        for (id, at) in affected {
            match self.replan_after_change(id, at, state) {
                Ok(true) => n += 1,
                Ok(false) => {}
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(n),
        }
    }

    /// Schedules every `Trigger` instance on `target` at `at`.
    pub fn trigger(&mut self, target: impl Into<EventTarget>, at: SimTime) -> Result<usize, EventError> {
        let target = target.into();
        let ids: Vec<_> = self
            .instances
            .values()
            .filter(|i| i.target == target && i.class.kind() == TriggerKind::Trigger)
            .filter(|i| i.state != InstanceState::Firing)
            .map(|i| i.id)
            .collect();
        for id in &ids {
            self.place(*id, at)?;
        }
        Ok(ids.len())
    }

    fn replan_after_change(&mut self, id: InstanceId, at: SimTime, state: &S) -> Result<bool, EventError> {
        let Some(inst) = self.instances.get(&id) else {
            return Ok(false);
        };
        if inst.state == InstanceState::Firing {
            // Re-evaluated once its invoke returns.
            return Ok(false);
        }
        let class = Rc::clone(&inst.class);
        let target = inst.target;
        // A write behind `now` is re-predicted from `now`; the past is settled.
        let from = at.max(self.now);

        let next = match class.kind() {
            TriggerKind::OnChange | TriggerKind::Once => {
                if !state.target_alive(target) {
                    return Ok(false);
                }
                class.predict_next_time(target, state, from)
            }
            TriggerKind::Immediate => from.max(Self::floor(self.now, inst)),
            TriggerKind::Trigger => return Ok(false),
        };
        debug!("{id} ({}) re-evaluated after change at {at}: next {next}", class.name());
        self.place(id, next)?;
        Ok(true)
    }

    /// Earliest time `inst` may be placed at.
    fn floor(now: SimTime, inst: &EventInstance<S>) -> SimTime {
        if inst.last_fired == Some(now) {
            now + SimTime::EPSILON
        } else {
            now
        }
    }

    /// Moves `id` to `predicted` (or off the schedule for never), enforcing the
    /// no-past-scheduling rule: nothing may be placed before `now`, and an
    /// instance that already fired at `now` must move strictly past it.
    fn place(&mut self, id: InstanceId, predicted: SimTime) -> Result<(), EventError> {
        let Some(inst) = self.instances.get_mut(&id) else {
            return Ok(());
        };
        if let InstanceState::Scheduled(old) = inst.state {
            self.schedule.remove(old, id);
        }
        if predicted.is_never() {
            trace!("{id} dormant");
            inst.state = InstanceState::Dormant;
            return Ok(());
        }

        let floor = Self::floor(self.now, inst);
        let at = if predicted < floor {
            match self.config.past_scheduling {
                PastSchedulingPolicy::Fail => {
                    inst.state = InstanceState::Dormant;
                    return Err(EventError::PastSchedulingViolation {
                        class: inst.class.name().to_string(),
                        instance: id,
                        predicted,
                        now: self.now,
                    });
                }
                PastSchedulingPolicy::Clamp => {
                    warn!(
                        "{id} ({}) predicted {predicted} at now={}; clamped to {floor}",
                        inst.class.name(),
                        self.now
                    );
                    floor
                }
            }
        } else {
            predicted
        };

        inst.state = InstanceState::Scheduled(at);
        self.schedule.insert(at, id);
        trace!("{id} scheduled at {at}");
        Ok(())
    }

    fn remove_instance(&mut self, id: InstanceId) -> bool {
        match self.instances.remove(&id) {
            Some(inst) => {
                if let InstanceState::Scheduled(t) = inst.state {
                    self.schedule.remove(t, id);
                }
                self.dependents.unregister(id, &inst.dependencies);
                true
            }
            None => false,
        }
    }

    // ---------- execution ----------

    /// Fires, in time order, every instance due at or before `to`.
    ///
    /// Pending curve changes are processed first and after each invocation, and
    /// the head of the schedule is re-read every time, so events (re)scheduled by
    /// an invocation can still fire in this call. Afterwards `now()` is
    /// `max(now, to)`.
    pub fn advance(&mut self, to: SimTime, state: &mut S) -> Result<AdvanceReport, EventError> {
        if let Some(instance) = self.active {
            return Err(EventError::ReentrantAdvance { instance });
        }
        let mut report = AdvanceReport::new(to);
        report.rescheduled += self.process_changes(state)?;

        let per_instant = self.config.max_invocations_per_instant;
        let per_advance = self.config.max_invocations_per_advance;
        let mut instant = SimTime::MIN;
        let mut at_instant = 0usize;
        let mut total = 0usize;

        while let Some((time, id)) = self.schedule.peek() {
            if time > to {
                break;
            }
            if time == instant {
                at_instant += 1;
            } else {
                instant = time;
                at_instant = 1;
            }
            total += 1;
            if at_instant > per_instant {
                return Err(EventError::ReentrantExplosion {
                    time,
                    invocations: at_instant - 1,
                    limit: per_instant,
                });
            }
            if total > per_advance {
                return Err(EventError::ReentrantExplosion {
                    time,
                    invocations: total - 1,
                    limit: per_advance,
                });
            }

            self.schedule.remove(time, id);
            self.fire(time, id, state, &mut report)?;
            report.rescheduled += self.process_changes(state)?;
        }

        if to > self.now {
            self.now = to;
        }
        trace!("reached {to}: {report:?}");
        Ok(report)
    }

    fn fire(
        &mut self,
        time: SimTime,
        id: InstanceId,
        state: &mut S,
        report: &mut AdvanceReport,
    ) -> Result<(), EventError> {
        let Some(inst) = self.instances.get_mut(&id) else {
            return Ok(());
        };
        inst.state = InstanceState::Firing;
        let class = Rc::clone(&inst.class);
        let target = inst.target;
        let mut params = std::mem::take(&mut inst.params);
        self.now = time;

        if !state.target_alive(target) {
            debug!("{id} ({}) dropped: {target} is gone", class.name());
            self.remove_instance(id);
            self.record(id, class.name(), target, time, InvokeOutcome::Dropped, report);
            return Ok(());
        }

        debug!("invoking {id} ({}) on {target} at {time}", class.name());
        self.active = Some(id);
        let result = class.invoke(self, target, state, time, &mut params);
        self.active = None;

        // The instance may have cancelled itself.
        let alive = match self.instances.get_mut(&id) {
            Some(inst) => {
                inst.params = params;
                inst.last_fired = Some(time);
                inst.state = InstanceState::Dormant;
                true
            }
            None => false,
        };

        let outcome = match result {
            Ok(()) => InvokeOutcome::Completed,
            Err(InvokeError::StalePreconditionViolation { reason }) => {
                debug!("{id} ({}) skipped at {time}: {reason}", class.name());
                InvokeOutcome::Stale
            }
            Err(InvokeError::Failed { reason }) => {
                warn!("{id} ({}) failed at {time}: {reason}", class.name());
                InvokeOutcome::Failed
            }
            Err(InvokeError::Fatal(err)) => {
                warn!("{id} ({}) aborted the tick at {time}: {err}", class.name());
                return Err(err);
            }
        };
        self.record(id, class.name(), target, time, outcome, report);

        if alive {
            match class.kind() {
                TriggerKind::Once => {
                    self.remove_instance(id);
                }
                TriggerKind::OnChange => {
                    let next = class.predict_next_time(target, state, time);
                    self.place(id, next)?;
                }
                TriggerKind::Immediate | TriggerKind::Trigger => {}
            }
        }
        Ok(())
    }

    fn record(
        &mut self,
        instance: InstanceId,
        class: &str,
        target: EventTarget,
        time: SimTime,
        outcome: InvokeOutcome,
        report: &mut AdvanceReport,
    ) {
        report.record(outcome);
        if self.config.record_trace {
            self.trace.push(InvocationRecord {
                instance,
                class: class.to_string(),
                target,
                time,
                outcome,
            });
        }
    }
}
