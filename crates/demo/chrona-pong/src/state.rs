//! Game state: every quantity that changes over time is a curve.

use chrona_curve::{ChangeSink, Continuous, CurveId, CurveIdAllocator, Discrete, SimTime};
use chrona_event::{EventTarget, SimulationState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::input::Command;

/// Default playfield, in character cells of a classic 80x25 terminal.
pub const DEFAULT_BOUNDARY: [f64; 2] = [80.0, 25.0];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    pub display_boundary: [f64; 2],
    pub paddle_size: f64,
    pub lives: i64,
    pub seed: u64,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            display_boundary: DEFAULT_BOUNDARY,
            paddle_size: 4.0,
            lives: 3,
            seed: 42,
        }
    }
}

#[derive(Debug)]
pub struct PongBall {
    pub position: Continuous<[f64; 2]>,
    pub speed: Discrete<[f64; 2]>,
}

/// One paddle. Its position runs along the vertical axis.
#[derive(Debug)]
pub struct PongPlayer {
    pub index: usize,
    pub input: Discrete<Command>,
    pub position: Continuous<f64>,
    pub speed: Discrete<f64>,
    pub size: Discrete<f64>,
    pub lives: Discrete<i64>,
}

impl PongPlayer {
    fn new(index: usize, ids: &mut CurveIdAllocator, sink: &ChangeSink, cfg: &PongConfig) -> Self {
        Self {
            index,
            input: Discrete::with_sink(ids.alloc(), Command::Idle, sink),
            position: Continuous::with_sink(ids.alloc(), cfg.display_boundary[1] / 2.0, sink),
            speed: Discrete::with_sink(ids.alloc(), 0.0, sink),
            size: Discrete::with_sink(ids.alloc(), cfg.paddle_size, sink),
            lives: Discrete::with_sink(ids.alloc(), cfg.lives, sink),
        }
    }

    /// Whether a ball at height `y` passes the paddle at `now`.
    pub fn misses(&self, y: f64, now: SimTime) -> bool {
        let center = self.position.get(now);
        let half = self.size.get(now) / 2.0;
        y < center - half || y > center + half
    }

    fn owns(&self, curve: CurveId) -> bool {
        [
            self.input.id(),
            self.position.id(),
            self.speed.id(),
            self.size.id(),
            self.lives.id(),
        ]
        .contains(&curve)
    }
}

/// Everything the physics events read and write.
#[derive(Debug)]
pub struct PongState {
    pub ball: PongBall,
    pub p1: PongPlayer,
    pub p2: PongPlayer,
    pub display_boundary: [f64; 2],
    pub(crate) rng: ChaCha8Rng,
}

impl PongState {
    /// Builds the curves and wires them to `sink`, normally the event loop's.
    pub fn new(cfg: &PongConfig, sink: &ChangeSink) -> Self {
        let mut ids = CurveIdAllocator::new();
        let ball = PongBall {
            position: Continuous::with_sink(ids.alloc(), [0.0, 0.0], sink),
            speed: Discrete::with_sink(ids.alloc(), [0.0, 0.0], sink),
        };
        let p1 = PongPlayer::new(0, &mut ids, sink, cfg);
        let p2 = PongPlayer::new(1, &mut ids, sink, cfg);
        Self {
            ball,
            p1,
            p2,
            display_boundary: cfg.display_boundary,
            rng: ChaCha8Rng::seed_from_u64(cfg.seed),
        }
    }

    pub fn player(&self, index: usize) -> Option<&PongPlayer> {
        match index {
            0 => Some(&self.p1),
            1 => Some(&self.p2),
            _ => None,
        }
    }

    pub fn player_mut(&mut self, index: usize) -> Option<&mut PongPlayer> {
        match index {
            0 => Some(&mut self.p1),
            1 => Some(&mut self.p2),
            _ => None,
        }
    }

    /// Strictly between the left and right boundaries.
    pub fn ball_in_play(&self, now: SimTime) -> bool {
        let x = self.ball.position.get(now)[0];
        x > 0.0 && x < self.display_boundary[0]
    }

    /// True once either player has no lives left.
    pub fn game_over(&self, now: SimTime) -> bool {
        self.p1.lives.get(now) <= 0 || self.p2.lives.get(now) <= 0
    }

    /// Drops history older than `t` from every curve.
    pub fn trim_before(&mut self, t: SimTime) -> usize {
        let mut dropped = self.ball.position.trim_before(t) + self.ball.speed.trim_before(t);
        for p in [&mut self.p1, &mut self.p2] {
            dropped += p.input.trim_before(t)
                + p.position.trim_before(t)
                + p.speed.trim_before(t)
                + p.size.trim_before(t)
                + p.lives.trim_before(t);
        }
        dropped
    }
}

impl SimulationState for PongState {
    fn target_alive(&self, target: EventTarget) -> bool {
        let curve = target.curve;
        curve == self.ball.position.id()
            || curve == self.ball.speed.id()
            || self.p1.owns(curve)
            || self.p2.owns(curve)
    }
}
