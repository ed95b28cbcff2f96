//! Replay engine for run reproduction.
//!
//! Feeds the frames of a saved [`Replay`] back into a fresh `GameEngine` at
//! their recorded timestamps. With motion recorded, the result matches the
//! original run.

use crate::input::events::{PlayerInput, TimedInput};
use crate::logic::game_loop::GameLoop;
use crate::models::engine::Beatmap;
use crate::models::replay::{Replay, ReplayFrame};
use crate::models::settings::GameplaySettings;
use crate::state::game::GameEngine;

/// Engine that re-simulates a replay against its chart.
pub struct ReplayEngine {
    game: GameLoop,
}

impl ReplayEngine {
    /// Prepares playback of `replay` on `beatmap`.
    ///
    /// A chart identity mismatch is logged but not rejected.
    pub fn new(beatmap: Beatmap, replay: &Replay, settings: GameplaySettings) -> Self {
        if !replay.chart_hash.is_empty() && replay.chart_hash != beatmap.chart_hash {
            log::warn!(
                "REPLAY: Chart hash mismatch (replay {}, chart {})",
                replay.chart_hash,
                beatmap.chart_hash
            );
        }

        let mut frames = replay.frames.clone();
        frames.sort_by(|a, b| a.time.total_cmp(&b.time));
        let inputs = frames_to_inputs(&frames);
        log::info!(
            "REPLAY: Playing back {} frames ({} clicks) with {}",
            frames.len(),
            replay.press_count(),
            replay.mods
        );

        Self {
            game: GameLoop::new(beatmap, replay.mods, settings, inputs),
        }
    }

    /// Runs the playback to completion and returns the finished engine.
    pub fn run(self) -> GameEngine {
        let engine = self.game.run();
        let state = engine.snapshot();
        log::info!(
            "REPLAY: Finished - score {} acc {:.2}% ({}/{}/{}/{})",
            state.score,
            state.accuracy,
            state.perfect_count,
            state.great_count,
            state.good_count,
            state.miss_count
        );
        engine
    }
}

/// Decodes the button mask of each frame into player input.
///
/// A `PRESS` frame is a click; a frame that drops `HOLD` after a held frame
/// is a release; anything else is pointer motion.
pub fn frames_to_inputs(frames: &[ReplayFrame]) -> Vec<TimedInput> {
    let mut held = false;
    frames
        .iter()
        .map(|frame| {
            let input = if frame.is_press() {
                PlayerInput::Click {
                    x: frame.x,
                    y: frame.y,
                }
            } else if held && !frame.is_held() {
                PlayerInput::Release
            } else {
                PlayerInput::Move {
                    x: frame.x,
                    y: frame.y,
                }
            };
            held = frame.is_held();
            TimedInput::new(frame.time, input)
        })
        .collect()
}
