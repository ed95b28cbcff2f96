//! Fixed-timestep driver for offline runs.
//!
//! Owns a [`ManualClock`] handle shared with the engine, advances it by one
//! tick at a time, and delivers scheduled inputs at their exact timestamps
//! before each frame advance.

use crate::input::events::TimedInput;
use crate::logic::clock::{Clock, ManualClock};
use crate::models::engine::Beatmap;
use crate::models::mods::GameMods;
use crate::models::settings::GameplaySettings;
use crate::state::game::{GameEngine, RunState};
use crate::system::bus::EventSink;

/// Target ticks per second of simulated wall time.
pub const TPS: u32 = 200;

/// Extra playback after the grace period before the clock reports exhaustion.
const TAIL_MS: f64 = 1000.0;

pub struct GameLoop {
    engine: GameEngine,
    clock: ManualClock,
    inputs: Vec<TimedInput>,
    input_index: usize,
    tick_ms: f64,
}

impl GameLoop {
    /// Prepares a run of `beatmap` that will be fed `inputs`.
    ///
    /// The clock starts `settings.lead_in_ms` before 0 and is exhausted a
    /// little after the last object plus the end grace period.
    pub fn new(
        beatmap: Beatmap,
        mods: GameMods,
        settings: GameplaySettings,
        mut inputs: Vec<TimedInput>,
    ) -> Self {
        let duration = beatmap.last_end_time() + settings.end_grace_ms + TAIL_MS;
        let clock = ManualClock::starting_at(duration, -settings.lead_in_ms.max(0.0));
        inputs.sort_by(|a, b| a.time.total_cmp(&b.time));

        let engine = GameEngine::new(beatmap, mods, settings, Box::new(clock.clone()));

        Self {
            engine,
            clock,
            inputs,
            input_index: 0,
            tick_ms: 1000.0 / TPS as f64,
        }
    }

    /// Registers an observer on the underlying engine.
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.engine.subscribe(sink);
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Starts the engine if it has not been started yet.
    pub fn start(&mut self) {
        if self.engine.run_state() == RunState::Ready {
            self.engine.start();
        }
    }

    /// Advances one tick. Returns `false` once the run is no longer playing.
    pub fn step(&mut self) -> bool {
        if self.engine.run_state() != RunState::Playing {
            return false;
        }

        let target = self.clock.current_time_ms() + self.tick_ms * self.clock.rate();

        while let Some(next) = self.inputs.get(self.input_index) {
            if next.time > target {
                break;
            }
            if next.time > self.clock.current_time_ms() {
                self.clock.set_time(next.time);
            }
            self.engine.handle_input(next.input);
            self.input_index += 1;
        }

        self.clock.set_time(target);
        self.engine.update();

        self.engine.run_state() == RunState::Playing
    }

    /// Runs to the end and hands back the finished engine.
    pub fn run(mut self) -> GameEngine {
        self.start();
        while self.step() {}

        if self.input_index < self.inputs.len() {
            log::debug!(
                "ENGINE: {} inputs left undelivered at the end of the run",
                self.inputs.len() - self.input_index
            );
        }
        self.engine
    }
}
