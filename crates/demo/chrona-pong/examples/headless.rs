//! Plays a headless match between two simple bots.
//!
//! A bot thread pushes commands into the input queue; the game loop drains it
//! every frame. Run with `cargo run -p chrona-pong --example headless [seed]`.

use std::sync::mpsc;
use std::thread;

use chrona_curve::SimTime;
use chrona_pong::{Command, PongConfig, PongEvent, PongGame, PongInputQueue};

/// What the bots see of a frame.
struct Frame {
    ball_y: f64,
    paddles: [f64; 2],
}

fn main() -> anyhow::Result<()> {
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(42);
    let cfg = PongConfig {
        seed,
        ..PongConfig::default()
    };
    let mut game = PongGame::new(&cfg)?;
    let queue = PongInputQueue::new();

    let (frames_tx, frames_rx) = mpsc::channel::<Frame>();
    let producer = queue.clone();
    let bots = thread::spawn(move || {
        producer.push(PongEvent::new(0, Command::Start));
        for frame in frames_rx {
            for (player, paddle) in frame.paddles.iter().enumerate() {
                let command = if frame.ball_y < paddle - 1.0 {
                    Command::Up
                } else if frame.ball_y > paddle + 1.0 {
                    Command::Down
                } else {
                    Command::Idle
                };
                producer.push(PongEvent::new(player, command));
            }
        }
    });

    let dt = SimTime::from_f64(0.1);
    let mut now = SimTime::ZERO;
    let mut frames = 0u32;
    while !game.state.game_over(now) && now < SimTime::from_int(300) {
        game.step_from_queue(now, &queue)?;
        let state = &game.state;
        let frame = Frame {
            ball_y: state.ball.position.get(now)[1],
            paddles: [state.p1.position.get(now), state.p2.position.get(now)],
        };
        if frames_tx.send(frame).is_err() {
            break;
        }
        // Let the bots answer before the next frame.
        while queue.len() < 2 && !bots.is_finished() {
            thread::yield_now();
        }
        frames += 1;
        now += dt;
    }
    drop(frames_tx);
    if bots.join().is_err() {
        anyhow::bail!("bot thread panicked");
    }

    let state = &game.state;
    println!(
        "after {frames} frames ({now}s): lives {} : {}",
        state.p1.lives.get(now),
        state.p2.lives.get(now)
    );
    if let Some(panel) = game.events.params(game.physics.panel) {
        println!(
            "paddle hits: {}, misses: {}",
            panel.get("hits", 0i64),
            panel.get("misses", 0i64)
        );
    }
    Ok(())
}
