//! Ball and paddle physics as event classes.
//!
//! The ball moves in straight lines between keyframes of its position curve.
//! Two reactive events predict when it next meets a horizontal wall or a panel
//! line and rewrite the curves there; a one-shot reset re-serves after a miss.

use chrona_curve::{Continuous, Interpolate, SimTime};
use chrona_event::{
    EventClass, EventError, EventLoop, EventTarget, InstanceId, InvokeError, ParamMap,
    SetupContext, TriggerKind,
};
use log::{debug, info, warn};
use rand::Rng;

use crate::input::{Command, PongEvent};
use crate::state::{PongPlayer, PongState};

pub const REFLECT_WALL: &str = "demo.ball.reflect_wall";
pub const REFLECT_PANEL: &str = "demo.ball.reflect_panel";
pub const RESET: &str = "demo.reset";

/// How far ahead a paddle move is predicted, in seconds.
const PREDICTED_MOVEMENT: f64 = 5.0;
/// Paddle speed, cells per second.
const MOVEMENT_SPEED: f64 = 8.0;
/// Distance from a side line within which the panel decides the ball's fate.
const PANEL_REACH: f64 = 1.0;

/// Time until a coordinate at `pos` moving at `speed` reaches `0` or `limit`.
fn time_to_bound(pos: f64, speed: f64, limit: f64) -> Option<SimTime> {
    let secs = if speed > 0.0 {
        (limit - pos) / speed
    } else if speed < 0.0 {
        pos / -speed
    } else {
        return None;
    };
    Some(SimTime::from_f64(secs.max(0.0)))
}

fn travel(pos: [f64; 2], speed: [f64; 2], dt: SimTime) -> [f64; 2] {
    let dt = dt.to_f64();
    [pos[0] + speed[0] * dt, pos[1] + speed[1] * dt]
}

/// Truncates the future of a continuous curve and jumps to `value` at `now`.
fn jump<V: Clone + Interpolate>(curve: &mut Continuous<V>, now: SimTime, value: V) {
    let current = curve.get(now);
    curve.set_drop(now, current);
    curve.set_drop(now, value);
}

/// Reflects the ball off the top and bottom walls.
pub struct BallReflectWall;

impl EventClass<PongState> for BallReflectWall {
    fn name(&self) -> &str {
        REFLECT_WALL
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::OnChange
    }

    fn setup(&self, ctx: &mut SetupContext<'_>, state: &PongState) {
        ctx.depend_on(&state.ball.position);
        ctx.depend_on(&state.ball.speed);
    }

    fn invoke(
        &self,
        _lp: &mut EventLoop<PongState>,
        _target: EventTarget,
        state: &mut PongState,
        now: SimTime,
        _params: &mut ParamMap,
    ) -> Result<(), InvokeError> {
        let pos = state.ball.position.get(now);
        let mut speed = state.ball.speed.get(now);
        speed[1] = -speed[1];
        state.ball.speed.set_drop(now, speed);
        state.ball.position.set_drop(now, pos);

        if let Some(ty) = time_to_bound(pos[1], speed[1], state.display_boundary[1]) {
            state.ball.position.set_drop(now + ty, travel(pos, speed, ty));
        }
        debug!("wall bounce at {now}, y={:.3}", pos[1]);
        Ok(())
    }

    fn predict_next_time(&self, _target: EventTarget, state: &PongState, now: SimTime) -> SimTime {
        let pos = state.ball.position.get(now);
        let speed = state.ball.speed.get(now);
        match time_to_bound(pos[1], speed[1], state.display_boundary[1]) {
            Some(ty) => now + ty,
            None => SimTime::MAX,
        }
    }
}

/// Decides, when the ball reaches a side line, between a paddle bounce and a
/// lost life. Counts bounces and misses in the instance parameters.
pub struct BallReflectPanel;

impl EventClass<PongState> for BallReflectPanel {
    fn name(&self) -> &str {
        REFLECT_PANEL
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::OnChange
    }

    fn setup(&self, ctx: &mut SetupContext<'_>, state: &PongState) {
        ctx.depend_on(&state.ball.position);
        ctx.depend_on(&state.ball.speed);
        ctx.depend_on(&state.p1.position);
        ctx.depend_on(&state.p2.position);
    }

    fn invoke(
        &self,
        lp: &mut EventLoop<PongState>,
        _target: EventTarget,
        state: &mut PongState,
        now: SimTime,
        params: &mut ParamMap,
    ) -> Result<(), InvokeError> {
        let pos = state.ball.position.get(now);
        let mut speed = state.ball.speed.get(now);
        let width = state.display_boundary[0];

        let side = if pos[0] <= PANEL_REACH && speed[0] < 0.0 {
            0
        } else if pos[0] >= width - PANEL_REACH && speed[0] > 0.0 {
            1
        } else {
            return Err(InvokeError::stale(format!(
                "ball at x={:.3} is not heading into a panel",
                pos[0]
            )));
        };

        let missed = state.player(side).map_or(true, |p| p.misses(pos[1], now));
        if missed {
            let Some(player) = state.player_mut(side) else {
                return Err(InvokeError::failed(format!("no player on side {side}")));
            };
            let lives = player.lives.get(now) - 1;
            player.lives.set_drop(now, lives);
            params.increment("misses");
            info!("player {} missed at {now}, {lives} lives left", side + 1);

            // Parked on the side line until the reset serves again.
            let line = if side == 0 { 0.0 } else { width };
            state.ball.position.set_drop(now, [line, pos[1]]);
            state.ball.speed.set_drop(now, [0.0, 0.0]);
            Physics::reset(lp, state, now)?;
            return Ok(());
        }

        speed[0] = -speed[0];
        state.ball.speed.set_drop(now, speed);
        state.ball.position.set_drop(now, pos);
        let hits = params.increment("hits");
        info!("panel hit #{hits} by player {} at {now}", side + 1);

        if let Some(tx) = time_to_bound(pos[0], speed[0], width) {
            let mut hit = travel(pos, speed, tx);
            hit[0] = if speed[0] > 0.0 { width } else { 0.0 };
            state.ball.position.set_drop(now + tx, hit);
        }
        Ok(())
    }

    fn predict_next_time(&self, _target: EventTarget, state: &PongState, now: SimTime) -> SimTime {
        let pos = state.ball.position.get(now);
        let speed = state.ball.speed.get(now);
        match time_to_bound(pos[0], speed[0], state.display_boundary[0]) {
            Some(tx) => {
                debug!("predicting panel reflection at {now}, next at {}", now + tx);
                now + tx
            }
            None => SimTime::MAX,
        }
    }
}

/// Serves a new ball from the centre with a random speed.
pub struct ResetGame;

impl EventClass<PongState> for ResetGame {
    fn name(&self) -> &str {
        RESET
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Once
    }

    fn setup(&self, _ctx: &mut SetupContext<'_>, _state: &PongState) {}

    fn invoke(
        &self,
        _lp: &mut EventLoop<PongState>,
        _target: EventTarget,
        state: &mut PongState,
        now: SimTime,
        _params: &mut ParamMap,
    ) -> Result<(), InvokeError> {
        if state.ball_in_play(now) {
            return Err(InvokeError::stale("ball is still in play"));
        }
        let [width, height] = state.display_boundary;
        let center = [width / 2.0, height / 2.0];
        jump(&mut state.ball.position, now, center);
        for player in [&mut state.p1, &mut state.p2] {
            jump(&mut player.position, now, height / 2.0);
            player.speed.set_drop(now, 0.0);
            player.input.set_drop(now, Command::Idle);
        }

        let rng = &mut state.rng;
        let dirx = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let diry = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let speed = [
            dirx * (1.5 + f64::from(rng.gen_range(0u32..100)) / 3.0),
            diry * (0.3 + f64::from(rng.gen_range(0u32..100)) / 18.0),
        ];
        state.ball.speed.set_drop(now, speed);

        let next = time_to_bound(center[1], speed[1], height)
            .or_else(|| time_to_bound(center[0], speed[0], width));
        if let Some(ty) = next {
            state.ball.position.set_drop(now + ty, travel(center, speed, ty));
        }
        info!("game reset at {now}, serving at [{:.2}, {:.2}]", speed[0], speed[1]);
        Ok(())
    }

    fn predict_next_time(&self, _target: EventTarget, _state: &PongState, now: SimTime) -> SimTime {
        now
    }
}

/// Instances created by [`Physics::init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsEvents {
    pub wall: InstanceId,
    pub panel: InstanceId,
}

pub struct Physics;

impl Physics {
    /// Registers the event classes and creates the two reactive ball events.
    pub fn init(
        lp: &mut EventLoop<PongState>,
        state: &PongState,
        now: SimTime,
    ) -> Result<PhysicsEvents, EventError> {
        info!("physics initialization");
        lp.add_class(BallReflectPanel)?;
        lp.add_class(BallReflectWall)?;
        lp.add_class(ResetGame)?;

        let wall = lp.create_event(REFLECT_WALL, &state.ball.position, state, now)?;
        let panel = lp.create_event(REFLECT_PANEL, &state.ball.position, state, now)?;
        Ok(PhysicsEvents { wall, panel })
    }

    /// Applies player commands issued at `now`. A command equal to the
    /// player's current input state is ignored.
    pub fn process_input(
        lp: &mut EventLoop<PongState>,
        state: &mut PongState,
        events: &[PongEvent],
        now: SimTime,
    ) -> Result<(), EventError> {
        let height = state.display_boundary[1];
        for event in events {
            let Some(player) = state.player_mut(event.player) else {
                warn!("input for unknown player {}", event.player);
                continue;
            };
            if player.input.get(now) == event.command {
                continue;
            }
            player.input.set_drop(now, event.command);
            match event.command {
                Command::Up => move_paddle(player, -MOVEMENT_SPEED, height, now),
                Command::Down => move_paddle(player, MOVEMENT_SPEED, height, now),
                Command::Idle => {
                    let current = player.position.get(now);
                    player.position.set_drop(now, current);
                    player.speed.set_drop(now, 0.0);
                }
                Command::Start => {
                    Physics::reset(lp, state, now)?;
                }
            }
        }
        Ok(())
    }

    /// Arms a reset at `now`; it is skipped if the ball is in play by then.
    pub fn reset(
        lp: &mut EventLoop<PongState>,
        state: &PongState,
        now: SimTime,
    ) -> Result<InstanceId, EventError> {
        lp.create_event(RESET, &state.ball.position, state, now)
    }
}

/// Starts a paddle moving and predicts where it stops: after the look-ahead
/// window or at the edge of the field, whichever comes first.
fn move_paddle(player: &mut PongPlayer, velocity: f64, height: f64, now: SimTime) {
    let current = player.position.get(now);
    player.position.set_drop(now, current);
    player.speed.set_drop(now, velocity);

    let mut duration = PREDICTED_MOVEMENT;
    let mut target = current + velocity * duration;
    if target < 0.0 {
        duration = current / MOVEMENT_SPEED;
        target = 0.0;
    }
    if target > height {
        duration = (height - current) / MOVEMENT_SPEED;
        target = height;
    }

    let stop = now + SimTime::from_f64(duration);
    player.input.set_drop(stop, Command::Idle);
    player.speed.set_drop(stop, 0.0);
    player.position.set_drop(stop, target);
}
