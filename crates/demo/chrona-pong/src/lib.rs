//! Headless pong on top of `chrona_event`.
//!
//! Nothing here advances in fixed steps: the ball's path is a set of keyframes,
//! and wall bounces, paddle hits and resets are events predicted from those
//! curves. Player input rewrites the curves, which re-predicts whatever
//! depends on them.

pub mod game;
pub mod input;
pub mod physics;
pub mod state;

pub use game::PongGame;
pub use input::{parse_script, Command, PongEvent, PongInputQueue, TimedInput};
pub use physics::{
    BallReflectPanel, BallReflectWall, Physics, PhysicsEvents, ResetGame, REFLECT_PANEL,
    REFLECT_WALL, RESET,
};
pub use state::{PongBall, PongConfig, PongPlayer, PongState, DEFAULT_BOUNDARY};
