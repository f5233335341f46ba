use anyhow::{ensure, Result};
use chrona_curve::{Curve, CurveId, Discrete, SimTime};
use chrona_event::{
    EventClass, EventLoop, EventTarget, InvocationRecord, InvokeError, LoopConfig, ParamMap,
    SetupContext, SimulationState, TriggerKind,
};

struct Countdown {
    remaining: Discrete<i64>,
}

impl SimulationState for Countdown {}

/// Decrements the counter one second after each write, down to zero.
struct Tick;

impl EventClass<Countdown> for Tick {
    fn name(&self) -> &str {
        "countdown.tick"
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::OnChange
    }

    fn setup(&self, ctx: &mut SetupContext<'_>, state: &Countdown) {
        ctx.depend_on(&state.remaining);
    }

    fn invoke(
        &self,
        _lp: &mut EventLoop<Countdown>,
        _target: EventTarget,
        state: &mut Countdown,
        now: SimTime,
        params: &mut ParamMap,
    ) -> Result<(), InvokeError> {
        let left = state.remaining.get(now);
        state.remaining.set_drop(now, left - 1);
        params.increment("ticks");
        Ok(())
    }

    fn predict_next_time(&self, _target: EventTarget, state: &Countdown, now: SimTime) -> SimTime {
        let last = state.remaining.frame(now);
        if last.value > 0 {
            last.time.max(SimTime::ZERO) + SimTime::from_int(1)
        } else {
            SimTime::MAX
        }
    }
}

fn run(config: &LoopConfig, steps: &[i64]) -> Result<(Vec<InvocationRecord>, i64)> {
    let mut lp = EventLoop::with_config(config.clone())?;
    let mut state = Countdown {
        remaining: Curve::with_sink(CurveId(0), 5, lp.change_sink()),
    };
    lp.add_class(Tick)?;
    let id = lp.create_event("countdown.tick", &state.remaining, &state, SimTime::ZERO)?;
    for step in steps {
        lp.advance(SimTime::from_int(*step), &mut state)?;
    }
    let ticks = lp.params(id).map_or(0, |p| p.get("ticks", 0i64));
    Ok((lp.take_trace(), ticks))
}

#[test]
fn json_config_drives_a_replayable_run() -> Result<()> {
    let config = LoopConfig::from_json_str(
        r#"{ "past_scheduling": "fail", "record_trace": true, "max_invocations_per_instant": 4 }"#,
    )?;

    let (trace, ticks) = run(&config, &[10])?;
    ensure!(ticks == 5, "expected five ticks, got {ticks}");
    let times: Vec<_> = trace.iter().map(|r| r.time).collect();
    ensure!(times == (1..=5).map(SimTime::from_int).collect::<Vec<_>>());

    let (stepped, _) = run(&config, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])?;
    ensure!(stepped == trace, "stepwise run diverged");

    let json = serde_json::to_string(&trace)?;
    let back: Vec<InvocationRecord> = serde_json::from_str(&json)?;
    ensure!(back == trace);
    Ok(())
}

#[test]
fn trace_is_off_by_default() -> Result<()> {
    let (trace, ticks) = run(&LoopConfig::default(), &[3])?;
    ensure!(trace.is_empty());
    ensure!(ticks == 3);
    Ok(())
}
