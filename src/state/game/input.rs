//! Input handling for GameEngine - handle_input, hit test, spinner rotation

use std::f64::consts::{PI, TAU};

use super::GameEngine;
use super::RunState;
use super::scoring::slider_engage_points;
use crate::input::events::PlayerInput;
use crate::models::engine::{Beatmap, Pos};
use crate::models::replay::{BUTTON_HOLD, BUTTON_PRESS};

impl GameEngine {
    /// Handles one player input at the clock's current time.
    ///
    /// Effects are applied immediately and are visible to the next
    /// [`GameEngine::update`]. Ignored unless the run is playing.
    pub fn handle_input(&mut self, input: PlayerInput) {
        if self.run_state != RunState::Playing {
            return;
        }
        let now = self.clock.current_time_ms();

        match input {
            PlayerInput::Click { x, y } => {
                let pos = Pos::new(x, y);
                self.pointer = Some(pos);
                self.button_held = true;
                self.replay.push(now, x, y, BUTTON_PRESS | BUTTON_HOLD);

                self.rehold_sliders(pos);
                self.rotate_spinners(pos);
                self.process_click(now, pos);
            }
            PlayerInput::Move { x, y } => {
                let pos = Pos::new(x, y);
                self.pointer = Some(pos);
                if self.settings.record_motion {
                    let buttons = if self.button_held { BUTTON_HOLD } else { 0 };
                    self.replay.push(now, x, y, buttons);
                }
                self.rotate_spinners(pos);
            }
            PlayerInput::Release => {
                self.button_held = false;
                self.tracker.release_sliders();
                let pos = self.pointer.unwrap_or_else(Beatmap::playfield_center);
                self.replay.push(now, pos.x, pos.y, 0);
            }
        }
    }

    /// Finds the first pending circle or slider that `pos` hits at `now`.
    ///
    /// Objects are scanned in time order; the first one inside both the
    /// good window and the circle radius wins. A click that hits nothing is
    /// ignored.
    fn process_click(&mut self, now: f64, pos: Pos) {
        let window = self.difficulty.hit_window;
        let radius = self.difficulty.circle_radius;

        let mut hit = None;
        for idx in self.head_index..self.beatmap.hit_objects.len() {
            let obj = &self.beatmap.hit_objects[idx];
            if obj.time - now > window.good_ms {
                break;
            }
            if obj.is_spinner() || !self.tracker.is_pending(idx) {
                continue;
            }
            if pos.distance(obj.position) > radius {
                continue;
            }
            if let Some(judgement) = window.judge(now - obj.time) {
                hit = Some((idx, judgement));
                break;
            }
        }

        let Some((idx, judgement)) = hit else {
            return;
        };
        let obj = &self.beatmap.hit_objects[idx];
        let position = obj.position;

        if obj.is_circle() {
            self.judge(idx, judgement, position, now);
        } else if self.tracker.engage_slider(idx, judgement) {
            let points = self.add_score(slider_engage_points(judgement), true);
            log::debug!(
                "ENGINE: Slider #{} engaged ({}) at {:.0}ms (+{})",
                idx,
                judgement,
                now,
                points
            );
        }
    }

    /// Pressing again while inside an engaged slider's follow area holds it.
    fn rehold_sliders(&mut self, pos: Pos) {
        let capture = self.difficulty.circle_radius * self.settings.slider_capture_factor;
        let active = self.tracker.active_indices().to_vec();

        for idx in active {
            let Some(data) = self.beatmap.hit_objects[idx].as_slider() else {
                continue;
            };
            let Some(slider) = self.tracker.slider_mut(idx) else {
                continue;
            };
            if pos.distance(data.position_at(slider.progress)) <= capture {
                slider.is_held = true;
            }
        }
    }

    /// Accumulates rotation on every active spinner from a new pointer sample
    /// and pays out the bonus for each newly completed spin.
    fn rotate_spinners(&mut self, pos: Pos) {
        let active = self.tracker.active_indices().to_vec();
        let mut new_spins = 0;

        for idx in active {
            let center = self.beatmap.hit_objects[idx].position;
            let Some(spinner) = self.tracker.spinner_mut(idx) else {
                continue;
            };

            let angle = (pos.y - center.y).atan2(pos.x - center.x);
            if let Some(last) = spinner.last_angle {
                spinner.rotation += wrap_angle(angle - last).abs();
            }
            spinner.last_angle = Some(angle);

            let completed = spinner.spins_completed().floor() as u32;
            if completed > spinner.spins_rewarded {
                new_spins += completed - spinner.spins_rewarded;
                spinner.spins_rewarded = completed;
            }
        }

        for _ in 0..new_spins {
            self.add_score(self.settings.spinner_spin_bonus, false);
        }
    }
}

/// Normalizes an angle delta into `(-PI, PI]`.
fn wrap_angle(delta: f64) -> f64 {
    let d = delta % TAU;
    if d > PI {
        d - TAU
    } else if d <= -PI {
        d + TAU
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::wrap_angle;
    use std::f64::consts::PI;

    #[test]
    fn wrap_angle_avoids_wraparound_jumps() {
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(2.0 * PI - 0.1) + 0.1).abs() < 1e-12);
        assert!((wrap_angle(-2.0 * PI + 0.1) - 0.1).abs() < 1e-12);
        assert_eq!(wrap_angle(-PI), PI);
    }
}
