//! Driver tying the state, the physics events and player input together.

use chrona_curve::SimTime;
use chrona_event::{AdvanceReport, EventError, EventLoop, LoopConfig, PastSchedulingPolicy};

use crate::input::{PongEvent, PongInputQueue, TimedInput};
use crate::physics::{Physics, PhysicsEvents};
use crate::state::{PongConfig, PongState};

pub struct PongGame {
    pub state: PongState,
    pub events: EventLoop<PongState>,
    pub physics: PhysicsEvents,
}

impl PongGame {
    /// Rounding in the ball predictions may land a hair behind `now`; the
    /// loop clamps those instead of failing.
    pub fn new(cfg: &PongConfig) -> Result<Self, EventError> {
        Self::with_loop_config(
            cfg,
            LoopConfig::default().with_policy(PastSchedulingPolicy::Clamp),
        )
    }

    pub fn with_loop_config(cfg: &PongConfig, loop_cfg: LoopConfig) -> Result<Self, EventError> {
        let mut events = EventLoop::with_config(loop_cfg)?;
        let state = PongState::new(cfg, events.change_sink());
        let physics = Physics::init(&mut events, &state, SimTime::ZERO)?;
        Ok(Self {
            state,
            events,
            physics,
        })
    }

    pub fn now(&self) -> SimTime {
        self.events.now().max(SimTime::ZERO)
    }

    /// Runs every event due up to `now`, then applies `inputs` at `now` and
    /// runs whatever they made due.
    pub fn step(&mut self, now: SimTime, inputs: &[PongEvent]) -> Result<AdvanceReport, EventError> {
        let mut report = self.events.advance(now, &mut self.state)?;
        if !inputs.is_empty() {
            Physics::process_input(&mut self.events, &mut self.state, inputs, now)?;
            report.merge(&self.events.advance(now, &mut self.state)?);
        }
        Ok(report)
    }

    /// Drains whatever an input thread queued and applies it at `now`.
    pub fn step_from_queue(
        &mut self,
        now: SimTime,
        queue: &PongInputQueue,
    ) -> Result<AdvanceReport, EventError> {
        let inputs = queue.drain();
        self.step(now, &inputs)
    }

    /// Plays `script` until `until`, applying each command at its own time and
    /// additionally stepping every `tick` when one is given. A tick that is not
    /// positive is rejected.
    pub fn replay(
        &mut self,
        script: &[TimedInput],
        until: SimTime,
        tick: Option<SimTime>,
    ) -> Result<AdvanceReport, EventError> {
        if let Some(dt) = tick.filter(|dt| *dt <= SimTime::ZERO) {
            return Err(EventError::Config {
                reason: format!("replay tick must be positive, got {dt}"),
            });
        }
        let mut report = AdvanceReport::new(self.now());
        let mut next_tick = tick.map(|dt| self.now() + dt);
        let mut pending = script.iter().filter(|i| i.at() <= until).peekable();

        loop {
            let next_input = pending.peek().map(|i| i.at());
            let now = match (next_input, next_tick) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) if b < until => b,
                _ => break,
            };

            let mut batch = Vec::new();
            while let Some(input) = pending.next_if(|i| i.at() <= now) {
                batch.push(input.event());
            }
            if let (Some(dt), Some(t)) = (tick, next_tick) {
                if t <= now {
                    next_tick = Some(t + dt);
                }
            }
            report.merge(&self.step(now, &batch)?);
        }

        report.merge(&self.events.advance(until, &mut self.state)?);
        Ok(report)
    }
}
