//! Core judgement engine.
//!
//! The `GameEngine` owns everything that changes during a run:
//! - Object lifecycles (circle / slider / spinner)
//! - Score, combo, health and accuracy
//! - The replay being recorded
//!
//! It is frame-driven: the caller advances it with [`GameEngine::update`] once
//! per tick and feeds player input between ticks with
//! [`GameEngine::handle_input`]. Time always comes from the external clock.

mod input;
mod notes;
pub mod objects;
pub mod scoring;
mod snapshot;

#[cfg(test)]
mod tests;

use crate::logic::clock::Clock;
use crate::models::engine::{Beatmap, Pos, ResolvedDifficulty};
use crate::models::mods::GameMods;
use crate::models::replay::{Replay, ReplayStats};
use crate::models::settings::GameplaySettings;
use crate::models::stats::HitJudgement;
use crate::shared::snapshot::GameState;
use crate::system::bus::EventSink;
use objects::ObjectTracker;

pub use objects::{ActiveSlider, ActiveSpinner, ObjectState};
pub use snapshot::VisibleObject;

/// Transport state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, not started yet.
    Ready,
    Playing,
    Paused,
    /// Cancelled with [`GameEngine::stop`].
    Stopped,
    /// Reached the end of the chart or of playback.
    Ended,
}

/// Main gameplay engine handling object timing, scoring and replay capture.
pub struct GameEngine {
    /// The chart being played (read-only during a run).
    pub(crate) beatmap: Beatmap,
    pub(crate) mods: GameMods,
    pub(crate) difficulty: ResolvedDifficulty,
    pub(crate) settings: GameplaySettings,
    pub(crate) clock: Box<dyn Clock>,

    pub(crate) tracker: ObjectTracker,
    pub(crate) state: GameState,
    pub(crate) judgements: Vec<HitJudgement>,
    pub(crate) replay: Replay,
    sinks: Vec<Box<dyn EventSink>>,

    pub(crate) run_state: RunState,
    /// Index of the first object that may still be live.
    pub(crate) head_index: usize,
    /// Time of the previous frame advance.
    pub(crate) last_frame_time: Option<f64>,
    /// Last known pointer position.
    pub(crate) pointer: Option<Pos>,
    pub(crate) button_held: bool,
    last_end_time: f64,
}

impl GameEngine {
    /// Creates an engine for one run of `beatmap` with the given modifiers.
    pub fn new(
        beatmap: Beatmap,
        mods: GameMods,
        settings: GameplaySettings,
        clock: Box<dyn Clock>,
    ) -> Self {
        let difficulty = ResolvedDifficulty::resolve(&beatmap.difficulty, mods);
        let last_end_time = beatmap.last_end_time();

        Self {
            tracker: ObjectTracker::new(beatmap.hit_objects.len()),
            replay: Replay::new(beatmap.chart_hash.clone(), mods),
            beatmap,
            mods,
            difficulty,
            settings,
            clock,
            state: GameState::new(),
            judgements: Vec::new(),
            sinks: Vec::new(),
            run_state: RunState::Ready,
            head_index: 0,
            last_frame_time: None,
            pointer: None,
            button_held: false,
            last_end_time,
        }
    }

    /// Registers an observer. Subscribe before [`GameEngine::start`].
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Starts playback of the external clock at the resolved rate.
    pub fn start(&mut self) {
        if self.run_state != RunState::Ready {
            log::warn!("ENGINE: start() ignored in state {:?}", self.run_state);
            return;
        }
        self.clock.set_rate(self.difficulty.time_rate);
        self.clock.play();
        self.run_state = RunState::Playing;
        log::info!(
            "ENGINE: Run started ({} objects, mods {}, rate {:.2})",
            self.beatmap.hit_objects.len(),
            self.mods,
            self.difficulty.time_rate
        );
    }

    /// Suspends frame processing; all state is preserved.
    pub fn pause(&mut self) {
        if self.run_state == RunState::Playing {
            self.clock.pause();
            self.run_state = RunState::Paused;
            log::info!("ENGINE: Paused at {:.0}ms", self.clock.current_time_ms());
        }
    }

    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.clock.resume();
            self.run_state = RunState::Playing;
            log::info!("ENGINE: Resumed at {:.0}ms", self.clock.current_time_ms());
        }
    }

    /// Cancels the run: discards in-flight object state and silences any
    /// further frame processing. Calling it again has no effect.
    pub fn stop(&mut self) {
        if matches!(self.run_state, RunState::Stopped | RunState::Ended) {
            return;
        }
        self.tracker.clear_active();
        self.clock.stop();
        self.run_state = RunState::Stopped;
        log::info!("ENGINE: Stopped at {:.0}ms", self.state.time);
    }

    /// Advances the simulation to the clock's current time.
    ///
    /// Per frame:
    /// 1. Activate spinners whose span contains `t`
    /// 2. Judge objects whose deadline passed
    /// 3. Advance engaged sliders and active spinners
    /// 4. Drain HP unless inside a break
    /// 5. Detect the end of the run
    /// 6. Notify observers
    pub fn update(&mut self) {
        if self.run_state != RunState::Playing {
            return;
        }

        let now = self.clock.current_time_ms();
        let dt = self.last_frame_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame_time = Some(now);
        self.state.time = now;

        self.activate_spinners(now);
        self.sweep_misses(now);
        self.advance_active(now);

        if !self.beatmap.is_in_break(now) {
            self.drain_hp(dt);
        }

        let ended = self.is_run_over(now);

        for sink in self.sinks.iter_mut() {
            sink.on_state_update(&self.state);
        }

        if ended {
            self.finish();
        }
    }

    fn is_run_over(&self, now: f64) -> bool {
        let chart_done =
            self.tracker.all_judged() && now > self.last_end_time + self.settings.end_grace_ms;
        chart_done || self.clock.is_exhausted()
    }

    /// Applies HP drain for a frame of `dt` chart milliseconds.
    ///
    /// Normalized to a nominal frame so the result does not depend on the
    /// tick rate; per nominal real-time frame this removes
    /// `hp_drain_rate * 0.01 * rate * (0.5 under Easy)`.
    fn drain_hp(&mut self, dt: f64) {
        if dt <= 0.0 || self.settings.frame_ms <= 0.0 {
            return;
        }

        let frames = dt / self.settings.frame_ms;
        let drain =
            self.difficulty.hp_drain_rate * 0.01 * self.difficulty.hp_drain_multiplier * frames;
        self.state.apply_hp(-drain);
        self.check_fail();
    }

    /// Raises the fail signal the first time HP reaches 0.
    pub(crate) fn check_fail(&mut self) {
        if self.state.hp > 0.0 || self.state.failed {
            return;
        }
        self.state.failed = true;
        log::info!("ENGINE: HP depleted at {:.0}ms", self.state.time);
        for sink in self.sinks.iter_mut() {
            sink.on_fail();
        }
    }

    fn finish(&mut self) {
        self.run_state = RunState::Ended;
        self.replay.stats = ReplayStats {
            score: self.state.score,
            max_combo: self.state.max_combo,
            accuracy: self.state.accuracy,
            hit_stats: self.state.hit_stats(),
            failed: self.state.failed,
        };

        if !self.tracker.all_judged() {
            log::debug!(
                "ENGINE: Playback exhausted with {} objects unjudged",
                self.tracker.len() - self.tracker.judged_count()
            );
        }
        log::info!(
            "ENGINE: Run ended - score {} acc {:.2}% max combo {} ({}/{}/{}/{})",
            self.state.score,
            self.state.accuracy,
            self.state.max_combo,
            self.state.perfect_count,
            self.state.great_count,
            self.state.good_count,
            self.state.miss_count
        );

        for sink in self.sinks.iter_mut() {
            sink.on_game_end(&self.state, &self.replay);
        }
    }

    pub(crate) fn notify_judgement(&mut self, judgement: &HitJudgement) {
        for sink in self.sinks.iter_mut() {
            sink.on_judgement(judgement);
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_finished(&self) -> bool {
        self.run_state == RunState::Ended
    }

    pub fn beatmap(&self) -> &Beatmap {
        &self.beatmap
    }

    pub fn mods(&self) -> GameMods {
        self.mods
    }

    pub fn difficulty(&self) -> &ResolvedDifficulty {
        &self.difficulty
    }

    /// Every judgement produced so far, in order.
    pub fn judgements(&self) -> &[HitJudgement] {
        &self.judgements
    }

    /// The replay recorded so far.
    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    pub fn object_state(&self, idx: usize) -> ObjectState {
        self.tracker.state(idx)
    }

    pub fn active_slider(&self, idx: usize) -> Option<&ActiveSlider> {
        self.tracker.slider(idx)
    }

    pub fn active_spinner(&self, idx: usize) -> Option<&ActiveSpinner> {
        self.tracker.spinner(idx)
    }

    /// Current chart time according to the clock.
    pub fn get_time(&self) -> f64 {
        self.clock.current_time_ms()
    }
}
