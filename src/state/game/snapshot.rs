//! Snapshot creation for GameEngine - snapshot, visible_objects

use super::GameEngine;
use super::objects::ObjectState;
use crate::models::engine::Pos;
use crate::shared::snapshot::GameState;

/// One object a renderer should draw at the current time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleObject {
    pub index: usize,
    pub state: ObjectState,
    /// Where to draw it: the head, or the slider ball once engaged.
    pub position: Pos,
    /// 0 when it appears, 1 at its nominal time.
    pub approach_progress: f64,
}

impl GameEngine {
    /// Copy of the current score/combo/health state.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Unjudged objects whose approach has started at the clock's time.
    pub fn visible_objects(&self) -> Vec<VisibleObject> {
        let now = self.clock.current_time_ms();

        self.beatmap
            .hit_objects
            .iter()
            .enumerate()
            .skip(self.head_index)
            .take_while(|(_, obj)| self.difficulty.is_visible(obj.time, now))
            .filter_map(|(index, obj)| {
                let state = self.tracker.state(index);
                if state.is_judged() {
                    return None;
                }

                let position = match (obj.as_slider(), self.tracker.slider(index)) {
                    (Some(data), Some(slider)) => data.position_at(slider.progress),
                    _ => obj.position,
                };

                Some(VisibleObject {
                    index,
                    state,
                    position,
                    approach_progress: self.difficulty.approach_progress(obj.time, now),
                })
            })
            .collect()
    }
}
