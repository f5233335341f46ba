//! Player commands and the handoff from an input thread.

use chrona_curve::SimTime;
use chrona_event::InputQueue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    #[default]
    Idle,
    Up,
    Down,
    Start,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongEvent {
    pub player: usize,
    pub command: Command,
}

impl PongEvent {
    pub fn new(player: usize, command: Command) -> Self {
        Self { player, command }
    }
}

/// Shared queue an input thread pushes into and the game loop drains.
pub type PongInputQueue = InputQueue<PongEvent>;

/// A scripted command, stamped with the second it is issued at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedInput {
    pub time: f64,
    pub player: usize,
    pub command: Command,
}

impl TimedInput {
    pub fn at(&self) -> SimTime {
        SimTime::from_f64(self.time)
    }

    pub fn event(&self) -> PongEvent {
        PongEvent::new(self.player, self.command)
    }
}

/// Parses a JSON array of [`TimedInput`] and orders it by time.
pub fn parse_script(raw: &str) -> serde_json::Result<Vec<TimedInput>> {
    let mut script: Vec<TimedInput> = serde_json::from_str(raw)?;
    script.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(script)
}
