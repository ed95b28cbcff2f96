//! End-to-end runs of the judgement engine against a manual clock.

use std::f64::consts::TAU;

use super::{GameEngine, ObjectState, RunState};
use crate::input::autoplay::autoplay_inputs;
use crate::input::events::{PlayerInput, TimedInput};
use crate::logic::clock::{Clock, ManualClock};
use crate::logic::game_loop::GameLoop;
use crate::logic::replay_engine::ReplayEngine;
use crate::models::engine::{Beatmap, BreakPeriod, DifficultyParams, HitObject, Pos};
use crate::models::mods::{GameMod, GameMods};
use crate::models::settings::GameplaySettings;
use crate::models::stats::Judgement;
use crate::system::bus::{EngineEvent, EventBus};

const STEP_MS: f64 = 10.0;

struct Harness {
    engine: GameEngine,
    clock: ManualClock,
    inputs: Vec<TimedInput>,
    next_input: usize,
}

impl Harness {
    fn new(map: Beatmap, mods: GameMods) -> Self {
        let clock = ManualClock::new(map.last_end_time() + 10_000.0);
        Self::with_clock(map, mods, clock)
    }

    fn with_clock(map: Beatmap, mods: GameMods, clock: ManualClock) -> Self {
        let engine = GameEngine::new(map, mods, GameplaySettings::default(), Box::new(clock.clone()));
        Self {
            engine,
            clock,
            inputs: Vec::new(),
            next_input: 0,
        }
    }

    fn play(map: Beatmap) -> Self {
        let mut h = Self::new(map, GameMods::NONE);
        h.engine.start();
        h
    }

    fn schedule(&mut self, inputs: Vec<TimedInput>) {
        self.inputs.extend(inputs);
        self.inputs.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Steps frames of `STEP_MS` up to `until`, delivering scheduled inputs
    /// at their exact times.
    fn run_until(&mut self, until: f64) {
        let mut t = self.clock.current_time_ms();
        while t < until && !self.engine.is_finished() {
            t = (t + STEP_MS).min(until);
            while let Some(input) = self.inputs.get(self.next_input).copied() {
                if input.time > t {
                    break;
                }
                self.clock.set_time(input.time.max(self.clock.current_time_ms()));
                self.engine.handle_input(input.input);
                self.next_input += 1;
            }
            self.clock.set_time(t);
            self.engine.update();
        }
    }

    /// Jumps to `t` and runs a single frame.
    fn frame_at(&mut self, t: f64) {
        self.clock.set_time(t);
        self.engine.update();
    }

    fn input_at(&mut self, t: f64, input: PlayerInput) {
        self.clock.set_time(t);
        self.engine.handle_input(input);
    }
}

fn map_with(objects: Vec<HitObject>, od: f64) -> Beatmap {
    Beatmap::new(
        objects,
        DifficultyParams {
            overall_difficulty: od,
            ..DifficultyParams::default()
        },
    )
}

fn three_circles() -> Beatmap {
    map_with(
        vec![
            HitObject::circle(1000.0, 100.0, 100.0),
            HitObject::circle(1500.0, 200.0, 100.0),
            HitObject::circle(2000.0, 300.0, 100.0),
        ],
        5.0,
    )
}

fn click(time: f64, x: f64, y: f64) -> TimedInput {
    TimedInput::new(time, PlayerInput::Click { x, y })
}

fn moves_along(path: impl Fn(f64) -> Pos, from: f64, to: f64) -> Vec<TimedInput> {
    let mut inputs = Vec::new();
    let mut t = from;
    while t <= to {
        let p = path(t);
        inputs.push(TimedInput::new(t, PlayerInput::Move { x: p.x, y: p.y }));
        t += STEP_MS;
    }
    inputs
}

/// Straight slider at 1000ms lasting 1000ms with two ticks.
fn straight_slider() -> Beatmap {
    map_with(
        vec![HitObject::slider(
            1000.0,
            vec![Pos::new(100.0, 100.0), Pos::new(380.0, 100.0)],
            1,
        )],
        5.0,
    )
}

fn slider_ball(t: f64) -> Pos {
    let progress = ((t - 1000.0) / 1000.0).clamp(0.0, 1.0);
    Pos::new(100.0 + 280.0 * progress, 100.0)
}

fn spin_motion(center: Pos, from: f64, to: f64) -> Vec<TimedInput> {
    moves_along(
        |t| {
            let angle = (t - from) / 1000.0 * 5.0 * TAU;
            Pos::new(center.x + 64.0 * angle.cos(), center.y + 64.0 * angle.sin())
        },
        from,
        to,
    )
}

#[test]
fn three_circles_hit_on_time() {
    let mut h = Harness::play(three_circles());
    h.schedule(vec![
        click(1000.0, 100.0, 100.0),
        TimedInput::new(1040.0, PlayerInput::Release),
        click(1500.0, 200.0, 100.0),
        TimedInput::new(1540.0, PlayerInput::Release),
        click(2000.0, 300.0, 100.0),
        TimedInput::new(2040.0, PlayerInput::Release),
    ]);
    h.run_until(5000.0);

    let state = h.engine.snapshot();
    assert_eq!(state.perfect_count, 3);
    assert_eq!(state.miss_count, 0);
    assert_eq!(state.combo, 3);
    assert_eq!(state.max_combo, 3);
    assert_eq!(state.accuracy, 100.0);
    assert_eq!(state.score, 300 + 600 + 900);
    assert!(h.engine.is_finished());
}

#[test]
fn three_circles_missed_by_timeout() {
    let mut h = Harness::play(three_circles());
    h.run_until(5000.0);

    let state = h.engine.snapshot();
    assert_eq!(state.miss_count, 3);
    assert_eq!(state.combo, 0);
    assert_eq!(state.max_combo, 0);
    assert_eq!(state.accuracy, 0.0);
    assert_eq!(state.score, 0);
    assert!(state.hp <= 85.0);
    assert!(state.hp >= 0.0);
    assert_eq!(h.engine.judgements().len(), 3);
}

#[test]
fn late_hit_is_great() {
    let mut h = Harness::play(three_circles());
    h.input_at(1070.0, PlayerInput::Click { x: 100.0, y: 100.0 });

    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Great));
    assert_eq!(h.engine.snapshot().score, 100);
    assert_eq!(h.engine.judgements()[0].result, Judgement::Great);
}

#[test]
fn clicks_outside_radius_or_window_are_ignored() {
    let mut h = Harness::play(three_circles());
    h.input_at(1000.0, PlayerInput::Click { x: 200.0, y: 300.0 });
    h.input_at(1000.0, PlayerInput::Click { x: 200.0, y: 100.0 });

    assert!(h.engine.judgements().is_empty());
    assert_eq!(h.engine.object_state(0), ObjectState::Pending);
    assert_eq!(h.engine.object_state(1), ObjectState::Pending);
    // Every click is still recorded.
    assert_eq!(h.engine.replay().press_count(), 2);
}

#[test]
fn miss_is_judged_once() {
    let mut h = Harness::play(three_circles());
    h.frame_at(1151.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Miss));

    h.frame_at(1200.0);
    h.input_at(1210.0, PlayerInput::Click { x: 100.0, y: 100.0 });
    h.frame_at(1300.0);

    assert_eq!(h.engine.snapshot().miss_count, 1);
    assert_eq!(h.engine.judgements().len(), 1);
}

#[test]
fn second_click_on_judged_circle_is_ignored() {
    let mut h = Harness::play(three_circles());
    h.input_at(1000.0, PlayerInput::Click { x: 100.0, y: 100.0 });
    h.input_at(1020.0, PlayerInput::Click { x: 100.0, y: 100.0 });
    h.frame_at(1030.0);

    assert_eq!(h.engine.judgements().len(), 1);
    assert_eq!(h.engine.snapshot().perfect_count, 1);
    assert_eq!(h.engine.snapshot().combo, 1);
}

#[test]
fn stop_is_idempotent() {
    let mut h = Harness::play(straight_slider());
    h.input_at(1000.0, PlayerInput::Click { x: 100.0, y: 100.0 });
    h.frame_at(1100.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Engaged);

    h.engine.stop();
    let once = h.engine.snapshot();
    h.engine.stop();

    assert_eq!(h.engine.snapshot(), once);
    assert_eq!(h.engine.run_state(), RunState::Stopped);
    assert_eq!(h.engine.object_state(0), ObjectState::Pending);
    assert!(h.engine.active_slider(0).is_none());

    h.frame_at(5000.0);
    assert_eq!(h.engine.snapshot(), once);
    assert!(!h.engine.is_finished());
}

#[test]
fn pause_gates_frame_processing() {
    let mut h = Harness::play(three_circles());
    h.engine.pause();
    h.frame_at(1200.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Pending);

    h.engine.resume();
    h.frame_at(1200.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Miss));
}

#[test]
fn tracked_slider_is_great() {
    let mut h = Harness::play(straight_slider());
    let mut inputs = vec![click(1000.0, 100.0, 100.0)];
    inputs.extend(moves_along(slider_ball, 1010.0, 2000.0));
    h.schedule(inputs);

    h.run_until(1500.0);
    let slider = h.engine.active_slider(0).copied().unwrap();
    assert!((slider.progress - 0.5).abs() < 1e-9);
    assert_eq!(slider.ticks_hit, 1);
    assert_eq!(h.engine.snapshot().score, 100);

    h.run_until(2100.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Great));
    assert_eq!(h.engine.snapshot().score, 200);
    assert_eq!(h.engine.snapshot().combo, 1);
}

#[test]
fn leaving_follow_area_loses_tracking() {
    let mut h = Harness::play(straight_slider());
    let mut inputs = vec![click(1000.0, 100.0, 100.0)];
    inputs.extend(moves_along(slider_ball, 1010.0, 1200.0));
    inputs.push(TimedInput::new(1210.0, PlayerInput::Move { x: 500.0, y: 350.0 }));
    inputs.extend(moves_along(slider_ball, 1300.0, 2000.0));
    h.schedule(inputs);

    h.run_until(1250.0);
    assert!(h.engine.active_slider(0).unwrap().tracking_lost);

    h.run_until(2100.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Good));
    assert_eq!(h.engine.snapshot().score, 150);
}

#[test]
fn reclick_resumes_slider_ticks() {
    let mut h = Harness::play(straight_slider());
    let mut inputs = vec![
        click(1000.0, 100.0, 100.0),
        TimedInput::new(1100.0, PlayerInput::Release),
    ];
    inputs.extend(moves_along(slider_ball, 1010.0, 2000.0));
    let ball = slider_ball(1605.0);
    inputs.push(click(1605.0, ball.x, ball.y));
    h.schedule(inputs);

    h.run_until(1550.0);
    let slider = h.engine.active_slider(0).copied().unwrap();
    assert!(!slider.is_held);
    assert!(!slider.tracking_lost);
    assert_eq!(slider.ticks_hit, 0);
    assert_eq!(slider.ticks_passed, 1);

    h.run_until(2100.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Great));
}

#[test]
fn unengaged_slider_misses_after_its_end() {
    let mut h = Harness::play(straight_slider());
    h.frame_at(2100.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Pending);

    h.frame_at(2151.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Miss));
}

#[test]
fn spinning_spinner_is_perfect_with_bonus() {
    let map = map_with(vec![HitObject::spinner(1000.0, 3000.0)], 5.0);
    let center = map.hit_objects[0].position;
    let mut h = Harness::play(map);
    h.schedule(spin_motion(center, 1000.0, 3000.0));

    h.run_until(1500.0);
    let spinner = h.engine.active_spinner(0).copied().unwrap();
    assert_eq!(spinner.required_spins, 5);
    assert!(spinner.spins_rewarded >= 2);
    assert_eq!(h.engine.object_state(0), ObjectState::Active);

    h.run_until(3100.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Perfect));
    // At least five bonus spins plus the 300 itself.
    assert!(h.engine.snapshot().score >= 5 * 1000 + 300);
}

#[test]
fn idle_spinner_misses() {
    let mut h = Harness::play(map_with(vec![HitObject::spinner(1000.0, 2000.0)], 5.0));
    h.frame_at(1000.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Active);

    h.frame_at(2000.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Miss));
}

#[test]
fn fail_fires_once_and_run_continues() {
    let objects = (0..25)
        .map(|i| HitObject::circle(1000.0 + i as f64 * 100.0, 256.0, 192.0))
        .collect();
    let map = map_with(objects, 5.0);

    let bus = EventBus::new();
    let mut h = Harness::new(map, GameMods::NONE);
    h.engine.subscribe(Box::new(bus.sink()));
    h.engine.start();
    h.run_until(10_000.0);

    let events: Vec<EngineEvent> = bus.try_iter().collect();
    let fails = events.iter().filter(|e| **e == EngineEvent::Fail).count();
    assert_eq!(fails, 1);

    let state = h.engine.snapshot();
    assert!(state.failed);
    assert_eq!(state.hp, 0.0);
    assert_eq!(state.miss_count, 25);
}

#[test]
fn observers_see_each_event_once() {
    let bus = EventBus::new();
    let mut h = Harness::new(three_circles(), GameMods::NONE);
    h.engine.subscribe(Box::new(bus.sink()));
    h.engine.start();
    h.schedule(vec![
        click(1000.0, 100.0, 100.0),
        click(1500.0, 200.0, 100.0),
    ]);
    h.run_until(6000.0);

    let events: Vec<EngineEvent> = bus.try_iter().collect();
    let judgements = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::Judgement(_)))
        .count();
    let ends: Vec<&EngineEvent> = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::GameEnd { .. }))
        .collect();

    assert_eq!(judgements, 3);
    assert_eq!(ends.len(), 1);
    assert!(matches!(events.last(), Some(EngineEvent::GameEnd { .. })));

    if let EngineEvent::GameEnd { state, replay } = ends[0] {
        assert_eq!(state.perfect_count, 2);
        assert_eq!(state.miss_count, 1);
        assert_eq!(replay.stats.score, state.score);
        assert_eq!(replay.press_count(), 2);
    }
}

#[test]
fn breaks_suspend_drain() {
    let mut map = map_with(
        vec![
            HitObject::circle(1000.0, 100.0, 100.0),
            HitObject::circle(5000.0, 100.0, 100.0),
        ],
        5.0,
    );
    map.breaks.push(BreakPeriod {
        start_time: 1500.0,
        end_time: 4500.0,
    });

    let mut h = Harness::play(map);
    h.schedule(vec![click(1000.0, 100.0, 100.0)]);

    h.run_until(1400.0);
    let before_break = h.engine.snapshot().hp;
    assert!(before_break < 100.0);

    h.run_until(1600.0);
    let in_break = h.engine.snapshot().hp;
    h.run_until(4400.0);
    assert_eq!(h.engine.snapshot().hp, in_break);

    h.run_until(4800.0);
    assert!(h.engine.snapshot().hp < in_break);
}

/// HP left after `until` ms of play with no input on a chart whose first
/// circle at 0 is missed.
fn hp_after_idle(mods: GameMods, until: f64) -> f64 {
    let map = map_with(
        vec![
            HitObject::circle(0.0, 100.0, 100.0),
            HitObject::circle(20_000.0, 100.0, 100.0),
        ],
        5.0,
    );
    let mut h = Harness::new(map, mods);
    h.engine.start();
    h.run_until(until);
    assert_eq!(h.engine.snapshot().miss_count, 1);
    h.engine.snapshot().hp
}

/// `hp_drain_rate * 0.01 * rate * easy` per nominal frame, over the real time
/// it takes to cover `chart_ms` at `rate`.
fn expected_drain(chart_ms: f64, rate: f64, easy: f64) -> f64 {
    let frame_ms = GameplaySettings::default().frame_ms;
    let real_frames = chart_ms / rate / frame_ms;
    5.0 * 0.01 * rate * easy * real_frames
}

#[test]
fn drain_follows_rate_and_easy() {
    // The first frame only sets the reference time.
    let nomod = hp_after_idle(GameMods::NONE, 1000.0);
    assert!((nomod - (100.0 - 5.0 - expected_drain(990.0, 1.0, 1.0))).abs() < 1e-9);
    assert!((nomod - 92.03).abs() < 1e-9);

    let easy = hp_after_idle(GameMods::new().with(GameMod::Easy), 1000.0);
    assert!((easy - (100.0 - 5.0 - expected_drain(990.0, 1.0, 0.5))).abs() < 1e-9);
    assert!((easy - 93.515).abs() < 1e-9);

    // 1500 chart ms is one real second at 1.5x.
    let dt = hp_after_idle(GameMods::new().with(GameMod::DoubleTime), 1500.0);
    assert!((dt - (100.0 - 5.0 - expected_drain(1490.0, 1.5, 1.0))).abs() < 1e-9);
    assert!((dt - 90.53).abs() < 1e-9);
}

#[test]
fn drain_runs_before_first_object_and_during_grace() {
    let map = map_with(vec![HitObject::circle(5000.0, 100.0, 100.0)], 5.0);
    let mut h = Harness::play(map);
    h.schedule(vec![click(5000.0, 100.0, 100.0)]);

    h.run_until(4000.0);
    assert!((h.engine.snapshot().hp - 88.03).abs() < 1e-9);

    h.run_until(5000.0);
    assert_eq!(h.engine.object_state(0), ObjectState::Judged(Judgement::Perfect));
    let after_hit = h.engine.snapshot().hp;
    assert!((after_hit - 87.03).abs() < 1e-9);

    h.run_until(6500.0);
    assert!(!h.engine.is_finished());
    assert!((h.engine.snapshot().hp - 82.53).abs() < 1e-9);
}

#[test]
fn half_spun_spinner_is_great() {
    let map = map_with(
        vec![
            HitObject::circle(500.0, 100.0, 100.0),
            HitObject::spinner(1000.0, 3000.0),
        ],
        5.0,
    );
    let center = map.hit_objects[1].position;
    let object_count = map.hit_objects.len() as u32;
    let mut h = Harness::play(map);
    let mut inputs = vec![
        click(500.0, 100.0, 100.0),
        TimedInput::new(540.0, PlayerInput::Release),
    ];
    // About 3.5 of the 5 required spins.
    inputs.extend(spin_motion(center, 1000.0, 1700.0));
    h.schedule(inputs);

    h.run_until(3100.0);
    assert!(h.engine.active_spinner(1).is_none());
    assert_eq!(h.engine.object_state(1), ObjectState::Judged(Judgement::Great));

    let state = h.engine.snapshot();
    assert_eq!(state.perfect_count, 1);
    assert_eq!(state.great_count, 1);
    assert_eq!(state.max_combo, 2);
    assert!(state.max_combo <= object_count);
    // 300 at combo 1, three spin bonuses, 100 at combo 2.
    assert_eq!(state.score, 300 + 3 * 1000 + 200);
}

#[test]
fn hard_rock_shrinks_hit_area() {
    let map = Beatmap::new(
        vec![HitObject::circle(1000.0, 100.0, 100.0)],
        DifficultyParams {
            circle_size: 2.0,
            ..DifficultyParams::default()
        },
    );
    let click = PlayerInput::Click { x: 143.0, y: 100.0 };

    let mut nomod = Harness::new(map.clone(), GameMods::NONE);
    nomod.engine.start();
    nomod.input_at(1000.0, click);
    assert_eq!(nomod.engine.object_state(0), ObjectState::Judged(Judgement::Perfect));

    let mut hr = Harness::new(map, GameMods::new().with(GameMod::HardRock));
    hr.engine.start();
    hr.input_at(1000.0, click);
    assert_eq!(hr.engine.object_state(0), ObjectState::Pending);
}

#[test]
fn double_time_sets_rate_and_multiplier() {
    let mut h = Harness::new(three_circles(), GameMods::new().with(GameMod::DoubleTime));
    h.engine.start();
    assert_eq!(h.clock.rate(), 1.5);

    h.input_at(1000.0, PlayerInput::Click { x: 100.0, y: 100.0 });
    assert_eq!(h.engine.snapshot().score, 336);
}

#[test]
fn exhausted_clock_ends_run_with_objects_left() {
    let map = map_with(vec![HitObject::circle(5000.0, 100.0, 100.0)], 5.0);
    let mut h = Harness::with_clock(map, GameMods::NONE, ManualClock::new(3000.0));
    h.engine.start();
    h.run_until(3000.0);

    assert!(h.engine.is_finished());
    assert_eq!(h.engine.object_state(0), ObjectState::Pending);
    assert_eq!(h.engine.snapshot().judged_count(), 0);
}

#[test]
fn visible_objects_follow_approach() {
    let mut h = Harness::play(map_with(vec![HitObject::circle(2000.0, 100.0, 100.0)], 5.0));
    h.frame_at(799.0);
    assert!(h.engine.visible_objects().is_empty());

    h.frame_at(1400.0);
    let visible = h.engine.visible_objects();
    assert_eq!(visible.len(), 1);
    assert!((visible[0].approach_progress - 0.5).abs() < 1e-9);
    assert_eq!(visible[0].state, ObjectState::Pending);
}

#[test]
fn autoplay_replay_reproduces_the_run() {
    let objects = vec![
        HitObject::circle(1000.0, 100.0, 100.0),
        HitObject::slider(1500.0, vec![Pos::new(200.0, 200.0), Pos::new(340.0, 200.0)], 2),
        HitObject::spinner(3000.0, 5000.0),
        HitObject::circle(5500.0, 400.0, 300.0),
    ];
    let map = map_with(objects, 8.0);
    let settings = GameplaySettings::default();

    let inputs = autoplay_inputs(&map);
    let engine = GameLoop::new(map.clone(), GameMods::NONE, settings.clone(), inputs).run();
    let played = engine.snapshot();

    assert!(engine.is_finished());
    assert_eq!(played.miss_count, 0);
    assert_eq!(played.perfect_count, 3);
    assert_eq!(played.great_count, 1);
    assert_eq!(played.max_combo, 4);

    let replay = engine.replay().clone();
    assert_eq!(replay.stats.score, played.score);
    let decoded = crate::models::replay::Replay::decode(&replay.encode().unwrap()).unwrap();

    let replayed = ReplayEngine::new(map, &decoded, settings).run().snapshot();
    assert_eq!(replayed.score, played.score);
    assert_eq!(replayed.hit_stats(), played.hit_stats());
    assert_eq!(replayed.max_combo, played.max_combo);
}
