use std::thread;

use chrona_curve::SimTime;
use chrona_event::{EventError, InvokeOutcome, LoopConfig, PastSchedulingPolicy};
use chrona_pong::{
    parse_script, Command, PongConfig, PongEvent, PongGame, PongInputQueue, TimedInput, RESET,
};
use chrona_test_fixtures::input_scripts;

fn script(name: &str) -> Vec<TimedInput> {
    let raw = input_scripts::json(name).expect("input script fixture");
    parse_script(&raw).expect("input script parses")
}

fn config_for(name: &str) -> PongConfig {
    let mut cfg = PongConfig::default();
    if let Some(seed) = input_scripts::seed(name).expect("input script fixture") {
        cfg.seed = seed;
    }
    cfg
}

fn traced_game(cfg: &PongConfig) -> PongGame {
    let loop_cfg = LoopConfig::default()
        .with_policy(PastSchedulingPolicy::Clamp)
        .with_trace();
    PongGame::with_loop_config(cfg, loop_cfg).expect("game builds")
}

#[test]
fn replay_is_independent_of_step_size() {
    let inputs = script("rally");
    let cfg = config_for("rally");
    let until = SimTime::from_int(40);

    let mut coarse = traced_game(&cfg);
    coarse.replay(&inputs, until, None).unwrap();
    let mut fine = traced_game(&cfg);
    fine.replay(&inputs, until, Some(SimTime::from_f64(0.25)))
        .unwrap();

    assert_eq!(
        coarse.state.ball.position.timeline().keyframes(),
        fine.state.ball.position.timeline().keyframes()
    );
    assert_eq!(
        coarse.state.ball.speed.timeline().keyframes(),
        fine.state.ball.speed.timeline().keyframes()
    );
    assert_eq!(coarse.events.trace(), fine.events.trace());
    assert_eq!(coarse.now(), until);
    assert!(!coarse.events.trace().is_empty());
}

#[test]
fn same_seed_same_game() {
    let inputs = script("rally");
    let cfg = config_for("rally");
    let run = || {
        let mut game = traced_game(&cfg);
        game.replay(&inputs, SimTime::from_int(30), None).unwrap();
        game.state.ball.speed.timeline().keyframes().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn ball_stays_on_the_field() {
    let inputs = script("rally");
    let cfg = config_for("rally");
    let mut game = PongGame::new(&cfg).unwrap();
    game.replay(&inputs, SimTime::from_int(40), None).unwrap();

    let [width, height] = cfg.display_boundary;
    let tol = 1e-2;
    let end = game.now().to_f64();
    let mut t = 0.0;
    while t <= end {
        let [x, y] = game.state.ball.position.get(SimTime::from_f64(t));
        assert!((-tol..=width + tol).contains(&x), "x={x} at t={t}");
        assert!((-tol..=height + tol).contains(&y), "y={y} at t={t}");
        t += 0.05;
    }
}

#[test]
fn missing_the_ball_costs_a_life() {
    let cfg = PongConfig {
        paddle_size: 0.0,
        lives: 1,
        ..PongConfig::default()
    };
    let mut game = traced_game(&cfg);
    game.replay(&script("idle"), SimTime::from_int(60), None)
        .unwrap();

    let now = game.now();
    assert!(game.state.game_over(now));
    assert!(game.state.p1.lives.get(now) + game.state.p2.lives.get(now) < 2);

    let panel = game.events.params(game.physics.panel).unwrap();
    assert!(panel.get("misses", 0i64) >= 1);
    assert_eq!(panel.get("hits", 0i64), 0);

    let resets = game
        .events
        .trace()
        .iter()
        .filter(|r| r.class == RESET && r.outcome == InvokeOutcome::Completed)
        .count();
    assert!(resets >= 2, "serve plus at least one re-serve, got {resets}");
}

#[test]
fn start_during_play_is_skipped() {
    let mut game = traced_game(&PongConfig::default());
    game.replay(&script("idle"), SimTime::from_int(1), None)
        .unwrap();

    let report = game
        .step(
            SimTime::from_int(1),
            &[PongEvent::new(1, Command::Start)],
        )
        .unwrap();
    assert_eq!(report.stale, 1);
    let last = game.events.trace().last().unwrap();
    assert_eq!(last.class, RESET);
    assert_eq!(last.outcome, InvokeOutcome::Stale);
}

#[test]
fn input_thread_feeds_the_game() {
    let mut game = PongGame::new(&PongConfig::default()).unwrap();
    let queue = PongInputQueue::new();

    let producer = queue.clone();
    thread::spawn(move || {
        producer.push(PongEvent::new(0, Command::Up));
        producer.push(PongEvent::new(1, Command::Down));
        producer.push(PongEvent::new(7, Command::Down));
    })
    .join()
    .unwrap();

    let t = SimTime::from_int(2);
    game.step_from_queue(t, &queue).unwrap();
    assert!(queue.is_empty());
    assert_eq!(game.state.p1.input.get(t), Command::Up);
    assert_eq!(game.state.p1.speed.get(t), -8.0);
    assert_eq!(game.state.p2.speed.get(t), 8.0);

    // Both paddles start at mid-height and stop at the edges.
    let later = SimTime::from_int(10);
    assert_eq!(game.state.p1.position.get(later), 0.0);
    assert_eq!(game.state.p2.position.get(later), 25.0);
    assert_eq!(game.state.p1.input.get(later), Command::Idle);
}

#[test]
fn replay_rejects_non_positive_ticks() {
    let inputs = script("idle");
    for tick in [SimTime::ZERO, SimTime::from_int(-1)] {
        let mut game = PongGame::new(&PongConfig::default()).unwrap();
        let err = game
            .replay(&inputs, SimTime::from_int(5), Some(tick))
            .unwrap_err();
        assert!(matches!(err, EventError::Config { .. }), "{err:?}");
        assert_eq!(game.now(), SimTime::ZERO);
    }
}
