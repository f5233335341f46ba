use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use chrona_curve::{Curve, CurveId, Discrete, SimTime};
use chrona_event::{
    EventClass, EventError, EventLoop, EventTarget, InstanceState, InvokeError, InvokeOutcome,
    LoopConfig, ParamMap, PastSchedulingPolicy, SetupContext, SimulationState, TriggerKind,
};

fn t(secs: i64) -> SimTime {
    SimTime::from_int(secs)
}

#[derive(Clone, Copy)]
enum Dep {
    X,
    Y,
}

struct World {
    x: Discrete<i64>,
    y: Discrete<i64>,
    hits: Vec<(&'static str, SimTime)>,
    dead: BTreeSet<CurveId>,
    limit: i64,
}

impl World {
    fn new(lp: &EventLoop<World>) -> Self {
        Self {
            x: Curve::with_sink(CurveId(0), 0, lp.change_sink()),
            y: Curve::with_sink(CurveId(1), 0, lp.change_sink()),
            hits: Vec::new(),
            dead: BTreeSet::new(),
            limit: 0,
        }
    }

    fn curve(&self, dep: Dep) -> &Discrete<i64> {
        match dep {
            Dep::X => &self.x,
            Dep::Y => &self.y,
        }
    }
}

impl SimulationState for World {
    fn target_alive(&self, target: EventTarget) -> bool {
        !self.dead.contains(&target.curve)
    }
}

type Predict = fn(&World, SimTime) -> SimTime;
type Effect =
    fn(&mut EventLoop<World>, &mut World, SimTime, &mut ParamMap) -> Result<(), InvokeError>;

/// Event class assembled from plain functions; every firing is logged into
/// `World::hits` before the effect runs.
struct Rule {
    name: &'static str,
    kind: TriggerKind,
    deps: &'static [Dep],
    predict: Predict,
    effect: Effect,
}

fn never(_: &World, _: SimTime) -> SimTime {
    SimTime::MAX
}

fn nothing(
    _: &mut EventLoop<World>,
    _: &mut World,
    _: SimTime,
    _: &mut ParamMap,
) -> Result<(), InvokeError> {
    Ok(())
}

impl Rule {
    fn new(name: &'static str, kind: TriggerKind) -> Self {
        Self {
            name,
            kind,
            deps: &[],
            predict: never,
            effect: nothing,
        }
    }

    fn deps(mut self, deps: &'static [Dep]) -> Self {
        self.deps = deps;
        self
    }

    fn predict(mut self, f: Predict) -> Self {
        self.predict = f;
        self
    }

    fn effect(mut self, f: Effect) -> Self {
        self.effect = f;
        self
    }
}

impl EventClass<World> for Rule {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> TriggerKind {
        self.kind
    }

    fn setup(&self, ctx: &mut SetupContext<'_>, state: &World) {
        for dep in self.deps {
            ctx.depend_on(state.curve(*dep));
        }
    }

    fn invoke(
        &self,
        lp: &mut EventLoop<World>,
        _target: EventTarget,
        state: &mut World,
        now: SimTime,
        params: &mut ParamMap,
    ) -> Result<(), InvokeError> {
        state.hits.push((self.name, now));
        (self.effect)(lp, state, now, params)
    }

    fn predict_next_time(&self, _target: EventTarget, state: &World, now: SimTime) -> SimTime {
        (self.predict)(state, now)
    }
}

/// Counts predictions; never schedules.
struct PredictCounter {
    name: &'static str,
    dep: Dep,
    calls: Rc<Cell<usize>>,
}

impl EventClass<World> for PredictCounter {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::OnChange
    }

    fn setup(&self, ctx: &mut SetupContext<'_>, state: &World) {
        ctx.depend_on(state.curve(self.dep));
    }

    fn invoke(
        &self,
        _lp: &mut EventLoop<World>,
        _target: EventTarget,
        _state: &mut World,
        _now: SimTime,
        _params: &mut ParamMap,
    ) -> Result<(), InvokeError> {
        Ok(())
    }

    fn predict_next_time(&self, _target: EventTarget, _state: &World, _now: SimTime) -> SimTime {
        self.calls.set(self.calls.get() + 1);
        SimTime::MAX
    }
}

fn setup_with(config: LoopConfig) -> (EventLoop<World>, World) {
    let lp = EventLoop::with_config(config.with_trace()).unwrap();
    let world = World::new(&lp);
    (lp, world)
}

fn setup() -> (EventLoop<World>, World) {
    setup_with(LoopConfig::default().with_policy(PastSchedulingPolicy::Fail))
}

fn latest(c: &Discrete<i64>) -> (SimTime, i64) {
    let k = c.frame(SimTime::MAX);
    (k.time, k.value)
}

fn one_after(_: &World, now: SimTime) -> SimTime {
    now + t(1)
}

#[test]
fn dependency_change_pulls_event_earlier() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("deadline", TriggerKind::OnChange)
            .deps(&[Dep::X])
            .predict(|w, now| {
                let at = t(w.x.get(SimTime::MAX));
                if at < now || w.hits.iter().any(|(_, h)| *h == at) {
                    SimTime::MAX
                } else {
                    at
                }
            }),
    )
    .unwrap();

    w.x.set_last(t(0), 5);
    lp.process_changes(&w).unwrap();
    let id = lp.create_event("deadline", &w.x, &w, t(0)).unwrap();
    assert_eq!(lp.scheduled_time(id), Some(t(5)));

    w.x.set_drop(t(2), 3);
    lp.process_changes(&w).unwrap();
    assert_eq!(lp.scheduled_time(id), Some(t(3)));

    let report = lp.advance(t(10), &mut w).unwrap();
    assert_eq!(report.invoked, 1);
    assert_eq!(w.hits, vec![("deadline", t(3))]);
    assert_eq!(lp.trace().len(), 1);
    assert_eq!(lp.instance_state(id), Some(InstanceState::Dormant));
}

#[test]
fn once_event_never_fires_twice() {
    let (mut lp, mut w) = setup();
    lp.add_class(Rule::new("reset", TriggerKind::Once).predict(one_after))
        .unwrap();
    let id = lp.create_event("reset", &w.x, &w, t(0)).unwrap();

    lp.advance(t(5), &mut w).unwrap();
    assert_eq!(w.hits, vec![("reset", t(1))]);
    assert_eq!(lp.instance_state(id), None);
    assert!(lp.pending().is_empty());

    let report = lp.advance(t(20), &mut w).unwrap();
    assert_eq!(report.invoked, 0);
    assert_eq!(w.hits.len(), 1);
}

fn ping_pong(lp: &mut EventLoop<World>, w: &World) {
    // "B" copies x into y, "A" copies y back into x; each write lands one
    // second after its firing and the other side reacts two seconds later.
    lp.add_class(
        Rule::new("B", TriggerKind::OnChange)
            .deps(&[Dep::X])
            .predict(|w, _| {
                let (ta, a) = latest(&w.x);
                let (_, b) = latest(&w.y);
                if ta.is_finite() && a >= b {
                    ta + t(2)
                } else {
                    SimTime::MAX
                }
            })
            .effect(|_, w, now, _| {
                let a = latest(&w.x).1;
                w.y.set_last(now + t(1), a + 1);
                Ok(())
            }),
    )
    .unwrap();
    lp.add_class(
        Rule::new("A", TriggerKind::OnChange)
            .deps(&[Dep::Y])
            .predict(|w, _| {
                let (tb, b) = latest(&w.y);
                let (_, a) = latest(&w.x);
                if tb.is_finite() && b > a {
                    tb + t(2)
                } else {
                    SimTime::MAX
                }
            })
            .effect(|_, w, now, _| {
                let b = latest(&w.y).1;
                w.x.set_last(now + t(1), b + 1);
                Ok(())
            }),
    )
    .unwrap();

    let b = lp.create_event("B", &w.y, w, t(1)).unwrap();
    let a = lp.create_event("A", &w.x, w, t(1)).unwrap();
    assert_eq!(lp.instance_state(b), Some(InstanceState::Dormant));
    assert_eq!(lp.instance_state(a), Some(InstanceState::Dormant));
}

fn expected_rally() -> Vec<(&'static str, SimTime)> {
    vec![
        ("B", t(3)),
        ("A", t(6)),
        ("B", t(9)),
        ("A", t(12)),
        ("B", t(15)),
        ("A", t(18)),
    ]
}

#[test]
fn ping_pong_hands_over_in_time_order() {
    let (mut lp, mut w) = setup();
    ping_pong(&mut lp, &w);
    w.x.set_last(t(1), 0);

    for i in 1..=10 {
        lp.advance(t(i * 2), &mut w).unwrap();
    }
    assert_eq!(w.hits, expected_rally());
}

#[test]
fn causal_chains_fire_within_one_advance() {
    let (mut lp, mut w) = setup();
    ping_pong(&mut lp, &w);
    w.x.set_last(t(1), 0);

    let report = lp.advance(t(20), &mut w).unwrap();
    assert_eq!(w.hits, expected_rally());
    assert_eq!(report.invoked, 6);
}

#[test]
fn replay_produces_identical_invocations() {
    let run = |stepwise: bool| {
        let (mut lp, mut w) = setup();
        ping_pong(&mut lp, &w);
        w.x.set_last(t(1), 0);
        if stepwise {
            for i in 1..=20 {
                lp.advance(t(i), &mut w).unwrap();
            }
        } else {
            lp.advance(t(20), &mut w).unwrap();
        }
        (lp.take_trace(), w.x.timeline().keyframes().to_vec())
    };
    let (trace_a, x_a) = run(true);
    let (trace_b, x_b) = run(false);
    assert_eq!(trace_a, trace_b);
    assert_eq!(x_a, x_b);
    assert!(trace_a.iter().all(|r| r.outcome == InvokeOutcome::Completed));
}

#[test]
fn only_dependents_are_reevaluated() {
    let (mut lp, mut w) = setup();
    let on_x = Rc::new(Cell::new(0));
    let on_y = Rc::new(Cell::new(0));
    lp.add_class(PredictCounter {
        name: "watch_x",
        dep: Dep::X,
        calls: on_x.clone(),
    })
    .unwrap();
    lp.add_class(PredictCounter {
        name: "watch_y",
        dep: Dep::Y,
        calls: on_y.clone(),
    })
    .unwrap();
    lp.create_event("watch_x", &w.x, &w, t(0)).unwrap();
    lp.create_event("watch_y", &w.y, &w, t(0)).unwrap();
    on_x.set(0);
    on_y.set(0);

    w.x.set_last(t(1), 1);
    assert_eq!(lp.process_changes(&w).unwrap(), 1);
    assert_eq!((on_x.get(), on_y.get()), (1, 0));

    // Several writes to one curve collapse into one re-evaluation.
    w.y.set_drop(t(2), 5);
    w.y.set_drop(t(3), 6);
    w.x.set_last(t(4), 2);
    let report = lp.advance(t(5), &mut w).unwrap();
    assert_eq!(report.rescheduled, 2);
    assert_eq!((on_x.get(), on_y.get()), (2, 1));

    assert_eq!(lp.notify_dependency_changed(CurveId(1), t(6), &w).unwrap(), 1);
    assert_eq!(on_y.get(), 2);
    assert_eq!(lp.notify_dependency_changed(CurveId(42), t(6), &w).unwrap(), 0);
}

#[test]
fn due_events_fire_in_time_then_creation_order() {
    let (mut lp, mut w) = setup();
    lp.add_class(Rule::new("tick", TriggerKind::Once).predict(one_after))
        .unwrap();
    for start in [7, 3, 5, 3, 1] {
        lp.create_event("tick", &w.x, &w, t(start)).unwrap();
    }
    lp.advance(t(10), &mut w).unwrap();

    let times: Vec<_> = w.hits.iter().map(|(_, at)| *at).collect();
    assert_eq!(times, vec![t(2), t(4), t(4), t(6), t(8)]);
    let order: Vec<_> = lp.trace().iter().map(|r| r.instance.0).collect();
    assert_eq!(order, vec![4, 1, 3, 2, 0]);
}

#[test]
fn stale_and_failed_invocations_do_not_stop_advance() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("stale", TriggerKind::Once)
            .predict(one_after)
            .effect(|_, _, _, _| Err(InvokeError::stale("ball already in bounds"))),
    )
    .unwrap();
    lp.add_class(
        Rule::new("broken", TriggerKind::Once)
            .predict(one_after)
            .effect(|_, _, _, _| Err(InvokeError::failed("nothing to do"))),
    )
    .unwrap();
    lp.add_class(Rule::new("fine", TriggerKind::Once).predict(one_after))
        .unwrap();
    for name in ["stale", "broken", "fine"] {
        lp.create_event(name, &w.x, &w, t(0)).unwrap();
    }

    let report = lp.advance(t(5), &mut w).unwrap();
    assert_eq!(report.invoked, 3);
    assert_eq!(report.stale, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.completed(), 1);
    let outcomes: Vec<_> = lp.trace().iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![InvokeOutcome::Stale, InvokeOutcome::Failed, InvokeOutcome::Completed]
    );
    assert!(lp.is_empty());
}

#[test]
fn fatal_invocation_aborts_advance() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("misconfigured", TriggerKind::Once)
            .predict(one_after)
            .effect(|lp, w, now, _| {
                lp.create_event("missing", CurveId(9), &*w, now)?;
                Ok(())
            }),
    )
    .unwrap();
    lp.add_class(Rule::new("later", TriggerKind::Once).predict(one_after))
        .unwrap();
    lp.create_event("misconfigured", &w.x, &w, t(0)).unwrap();
    lp.create_event("later", &w.x, &w, t(1)).unwrap();

    let err = lp.advance(t(5), &mut w).unwrap_err();
    assert_eq!(
        err,
        EventError::UnknownEventClass {
            name: "missing".into()
        }
    );
    assert_eq!(w.hits, vec![("misconfigured", t(1))]);
}

#[test]
fn predictions_into_the_past_fail_or_clamp() {
    let early = || {
        Rule::new("early", TriggerKind::Once).predict(|_, now| now - t(1))
    };

    let (mut lp, mut w) = setup();
    lp.add_class(early()).unwrap();
    lp.advance(t(5), &mut w).unwrap();
    let err = lp.create_event("early", &w.x, &w, t(5)).unwrap_err();
    assert!(matches!(
        err,
        EventError::PastSchedulingViolation { predicted, now, .. } if predicted == t(4) && now == t(5)
    ));
    assert!(!err.is_recoverable());
    assert!(lp.is_empty());

    let (mut lp, mut w) = setup_with(LoopConfig::default().with_policy(PastSchedulingPolicy::Clamp));
    lp.add_class(early()).unwrap();
    lp.advance(t(5), &mut w).unwrap();
    let id = lp.create_event("early", &w.x, &w, t(5)).unwrap();
    assert_eq!(lp.scheduled_time(id), Some(t(5)));
    lp.advance(t(5), &mut w).unwrap();
    assert_eq!(w.hits, vec![("early", t(5))]);
}

#[test]
fn refiring_at_the_same_instant_is_non_progress() {
    let stuck = || Rule::new("stuck", TriggerKind::OnChange).predict(|_, now| now);

    let (mut lp, mut w) = setup();
    lp.add_class(stuck()).unwrap();
    lp.create_event("stuck", &w.x, &w, t(1)).unwrap();
    let err = lp.advance(t(3), &mut w).unwrap_err();
    assert!(matches!(err, EventError::PastSchedulingViolation { now, .. } if now == t(1)));
    assert_eq!(w.hits, vec![("stuck", t(1))]);

    // Clamping moves it by one epsilon per firing; the per-advance cap stops it.
    let mut config = LoopConfig::default().with_policy(PastSchedulingPolicy::Clamp);
    config.max_invocations_per_advance = 100;
    let (mut lp, mut w) = setup_with(config);
    lp.add_class(stuck()).unwrap();
    lp.create_event("stuck", &w.x, &w, t(1)).unwrap();
    let err = lp.advance(t(3), &mut w).unwrap_err();
    assert!(matches!(
        err,
        EventError::ReentrantExplosion { invocations: 100, limit: 100, .. }
    ));
    assert_eq!(w.hits.len(), 100);
    assert_eq!(w.hits[99].1, t(1) + SimTime::from_raw(99));
}

#[test]
fn unbounded_cascade_at_one_instant_is_detected() {
    let mut config = LoopConfig::default().with_policy(PastSchedulingPolicy::Fail);
    config.max_invocations_per_instant = 50;
    let (mut lp, mut w) = setup_with(config);
    lp.add_class(
        Rule::new("spawner", TriggerKind::Once)
            .predict(|_, now| now)
            .effect(|lp, w, now, _| {
                lp.create_event("spawner", CurveId(0), &*w, now)?;
                Ok(())
            }),
    )
    .unwrap();
    lp.create_event("spawner", &w.x, &w, t(1)).unwrap();

    let err = lp.advance(t(2), &mut w).unwrap_err();
    assert_eq!(
        err,
        EventError::ReentrantExplosion {
            time: t(1),
            invocations: 50,
            limit: 50
        }
    );
    assert_eq!(w.hits.len(), 50);
}

#[test]
fn advance_from_invoke_is_rejected() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("nested", TriggerKind::Once)
            .predict(one_after)
            .effect(|lp, w, now, _| match lp.advance(now + t(1), w) {
                Err(EventError::ReentrantAdvance { .. }) => Ok(()),
                other => Err(InvokeError::failed(format!("unexpected {other:?}"))),
            }),
    )
    .unwrap();
    lp.create_event("nested", &w.x, &w, t(0)).unwrap();
    let report = lp.advance(t(5), &mut w).unwrap();
    assert_eq!(report.completed(), 1);
}

#[test]
fn immediate_events_fire_at_change_time() {
    let (mut lp, mut w) = setup();
    lp.add_class(Rule::new("imm", TriggerKind::Immediate).deps(&[Dep::X]))
        .unwrap();
    let id = lp.create_event("imm", &w.x, &w, t(0)).unwrap();
    assert_eq!(lp.instance_state(id), Some(InstanceState::Dormant));

    w.x.set_last(t(2), 1);
    lp.advance(t(5), &mut w).unwrap();
    assert_eq!(w.hits, vec![("imm", t(2))]);
    assert_eq!(lp.instance_state(id), Some(InstanceState::Dormant));

    w.x.set_last(t(7), 2);
    w.x.set_last(t(6), 3);
    lp.advance(t(10), &mut w).unwrap();
    assert_eq!(w.hits, vec![("imm", t(2)), ("imm", t(6))]);
}

#[test]
fn trigger_events_fire_only_when_triggered() {
    let (mut lp, mut w) = setup();
    lp.add_class(Rule::new("trig", TriggerKind::Trigger).deps(&[Dep::X]))
        .unwrap();
    let id = lp.create_event("trig", &w.x, &w, t(0)).unwrap();

    w.x.set_last(t(1), 1);
    lp.advance(t(2), &mut w).unwrap();
    assert!(w.hits.is_empty());

    assert_eq!(lp.trigger(&w.x, t(3)).unwrap(), 1);
    assert_eq!(lp.trigger(&w.y, t(3)).unwrap(), 0);
    lp.advance(t(5), &mut w).unwrap();
    assert_eq!(w.hits, vec![("trig", t(3))]);
    assert_eq!(lp.instance_state(id), Some(InstanceState::Dormant));
}

#[test]
fn events_on_dead_targets_are_dropped() {
    let (mut lp, mut w) = setup();
    lp.add_class(Rule::new("doomed", TriggerKind::OnChange).predict(one_after))
        .unwrap();
    let id = lp.create_event("doomed", &w.y, &w, t(0)).unwrap();
    w.dead.insert(w.y.id());

    let report = lp.advance(t(5), &mut w).unwrap();
    assert_eq!(report.dropped, 1);
    assert_eq!(report.invoked, 0);
    assert!(w.hits.is_empty());
    assert_eq!(lp.instance_state(id), None);
    assert_eq!(lp.trace()[0].outcome, InvokeOutcome::Dropped);
}

#[test]
fn params_persist_across_firings() {
    let (mut lp, mut w) = setup();
    w.limit = 3;
    lp.add_class(
        Rule::new("counter", TriggerKind::OnChange)
            .predict(|w, now| {
                if now < t(w.limit) {
                    t(now.to_f64() as i64 + 1)
                } else {
                    SimTime::MAX
                }
            })
            .effect(|_, _, _, params| {
                params.increment("count");
                Ok(())
            }),
    )
    .unwrap();
    let id = lp
        .create_event_with_params(
            "counter",
            &w.x,
            &w,
            t(0),
            ParamMap::new().with("label", "tick"),
        )
        .unwrap();
    lp.advance(t(10), &mut w).unwrap();

    let params = lp.params(id).unwrap();
    assert_eq!(params.get("count", 0i64), 3);
    assert_eq!(params.get("label", String::new()), "tick");
    assert_eq!(w.hits.len(), 3);
}

#[test]
fn instances_may_cancel_themselves() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("quitter", TriggerKind::OnChange)
            .predict(one_after)
            .effect(|lp, _, _, _| {
                if let Some(me) = lp.active_event() {
                    lp.cancel(me)?;
                }
                Ok(())
            }),
    )
    .unwrap();
    lp.create_event("quitter", &w.x, &w, t(0)).unwrap();
    lp.advance(t(10), &mut w).unwrap();
    assert_eq!(w.hits, vec![("quitter", t(1))]);
    assert!(lp.is_empty());
    assert!(lp.dependents_of(w.x.id()).is_empty());
}

#[test]
fn never_predicted_without_dependencies_is_discarded() {
    let (mut lp, w) = setup();
    lp.add_class(Rule::new("idle", TriggerKind::OnChange)).unwrap();
    lp.add_class(Rule::new("watcher", TriggerKind::OnChange).deps(&[Dep::Y]))
        .unwrap();
    let idle = lp.create_event("idle", &w.x, &w, t(0)).unwrap();
    let watcher = lp.create_event("watcher", &w.x, &w, t(0)).unwrap();
    assert_eq!(lp.instance_state(idle), None);
    assert_eq!(lp.instance_state(watcher), Some(InstanceState::Dormant));
    assert_eq!(lp.dependents_of(w.y.id()), vec![watcher]);
}

#[test]
fn retroactive_write_replans_from_now() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("follow", TriggerKind::OnChange)
            .deps(&[Dep::X])
            .predict(one_after),
    )
    .unwrap();
    lp.add_class(Rule::new("imm", TriggerKind::Immediate).deps(&[Dep::Y]))
        .unwrap();
    let follow = lp.create_event("follow", &w.x, &w, t(0)).unwrap();
    lp.create_event("imm", &w.y, &w, t(0)).unwrap();

    lp.advance(t(10), &mut w).unwrap();
    assert_eq!(w.hits.len(), 10);
    assert_eq!(lp.scheduled_time(follow), Some(t(11)));

    // Corrections behind `now` are legal under the strict policy.
    w.x.set_drop(t(5), 42);
    w.y.set_last(t(3), 7);
    let report = lp.advance(t(20), &mut w).unwrap();
    assert_eq!(report.rescheduled, 2);
    assert_eq!(w.hits[10], ("imm", t(10)));
    assert_eq!(w.hits[11], ("follow", t(11)));
    assert_eq!(w.hits.last(), Some(&("follow", t(20))));
    assert_eq!(lp.scheduled_time(follow), Some(t(21)));
}

#[test]
fn failed_replan_still_updates_other_dependents() {
    let (mut lp, mut w) = setup();
    lp.add_class(
        Rule::new("behind", TriggerKind::OnChange)
            .deps(&[Dep::X])
            .predict(|w, now| {
                if w.x.get(SimTime::MAX) == 0 {
                    SimTime::MAX
                } else {
                    now - t(1)
                }
            }),
    )
    .unwrap();
    lp.add_class(
        Rule::new("tracker", TriggerKind::OnChange)
            .deps(&[Dep::X])
            .predict(|w, _| t(10 + w.x.get(SimTime::MAX))),
    )
    .unwrap();
    let behind = lp.create_event("behind", &w.x, &w, t(0)).unwrap();
    let tracker = lp.create_event("tracker", &w.x, &w, t(0)).unwrap();
    assert_eq!(lp.scheduled_time(tracker), Some(t(10)));
    lp.advance(t(2), &mut w).unwrap();

    w.x.set_last(t(1), 5);
    let err = lp.process_changes(&w).unwrap_err();
    assert!(matches!(
        err,
        EventError::PastSchedulingViolation { ref class, .. } if class == "behind"
    ));
    assert_eq!(lp.instance_state(behind), Some(InstanceState::Dormant));
    assert_eq!(lp.scheduled_time(tracker), Some(t(15)));
    assert_eq!(lp.process_changes(&w).unwrap(), 0);
}
