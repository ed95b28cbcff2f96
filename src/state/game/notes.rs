//! Object processing - activation, miss sweep, slider/spinner advance, judge

use super::GameEngine;
use super::scoring::{required_spins, score_for, slider_result, spinner_result};
use crate::models::engine::{HitObjectKind, Pos};
use crate::models::stats::{HitJudgement, Judgement};

impl GameEngine {
    /// Activates pending spinners whose span contains `now`.
    pub(crate) fn activate_spinners(&mut self, now: f64) {
        for idx in self.head_index..self.beatmap.hit_objects.len() {
            let obj = &self.beatmap.hit_objects[idx];
            if obj.time > now {
                break;
            }
            let HitObjectKind::Spinner { end_time } = obj.kind else {
                continue;
            };
            let required = required_spins(end_time - obj.time);
            if now <= end_time && self.tracker.activate_spinner(idx, required) {
                log::debug!("ENGINE: Spinner #{} active until {:.0}ms", idx, end_time);
            }
        }
    }

    /// Judges every pending object whose deadline has passed.
    pub(crate) fn sweep_misses(&mut self, now: f64) {
        let good = self.difficulty.hit_window.good_ms;
        let mut idx = self.head_index;

        while idx < self.beatmap.hit_objects.len() {
            let obj = &self.beatmap.hit_objects[idx];
            if obj.time > now {
                break;
            }

            if self.tracker.is_pending(idx) {
                let expired = match &obj.kind {
                    HitObjectKind::Circle => (now > obj.time + good).then_some(Judgement::Miss),
                    HitObjectKind::Slider(_) => {
                        (now > obj.end_time() + good).then_some(Judgement::Miss)
                    }
                    // Frame skipped over the whole span; nothing was spun.
                    HitObjectKind::Spinner { end_time } => (now > *end_time)
                        .then(|| spinner_result(0.0, required_spins(*end_time - obj.time))),
                };
                if let Some(result) = expired {
                    let position = obj.position;
                    self.judge(idx, result, position, now);
                }
            }

            idx += 1;
        }

        while self.head_index < self.tracker.len() && self.tracker.is_processed(self.head_index) {
            self.head_index += 1;
        }
    }

    /// Advances engaged sliders and active spinners, judging those that finish.
    pub(crate) fn advance_active(&mut self, now: f64) {
        let active = self.tracker.active_indices().to_vec();
        for idx in active {
            let obj = &self.beatmap.hit_objects[idx];
            if obj.is_slider() {
                self.advance_slider(idx, now);
            } else if obj.is_spinner() && now >= obj.end_time() {
                self.finish_spinner(idx, now);
            }
        }
    }

    fn advance_slider(&mut self, idx: usize, now: f64) {
        let obj = &self.beatmap.hit_objects[idx];
        let Some(data) = obj.as_slider() else {
            return;
        };

        let progress = if data.duration > 0.0 {
            ((now - obj.time) / data.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let ball = data.position_at(progress);
        let tick_count = data.tick_count;
        let capture = self.difficulty.circle_radius * self.settings.slider_capture_factor;
        let pointer = self.pointer;

        let Some(slider) = self.tracker.slider_mut(idx) else {
            return;
        };
        slider.progress = progress;

        if slider.is_held && !slider.tracking_lost {
            let inside = pointer.is_some_and(|p| p.distance(ball) <= capture);
            if !inside {
                slider.tracking_lost = true;
                log::debug!("ENGINE: Slider #{} tracking lost at {:.0}ms", idx, now);
            }
        }

        let reached = ((progress * tick_count as f64).floor() as u32).min(tick_count);
        while slider.ticks_passed < reached {
            slider.ticks_passed += 1;
            if slider.is_held && !slider.tracking_lost {
                slider.ticks_hit += 1;
            }
        }

        if progress >= 1.0 {
            let result = slider_result(slider.ticks_hit, tick_count);
            log::debug!(
                "ENGINE: Slider #{} finished with {}/{} ticks",
                idx,
                slider.ticks_hit,
                tick_count
            );
            self.judge(idx, result, ball, now);
        }
    }

    fn finish_spinner(&mut self, idx: usize, now: f64) {
        let Some(spinner) = self.tracker.spinner(idx) else {
            return;
        };
        let result = spinner_result(spinner.spins_completed(), spinner.required_spins);
        log::debug!(
            "ENGINE: Spinner #{} finished with {:.2}/{} spins",
            idx,
            spinner.spins_completed(),
            spinner.required_spins
        );
        let position = self.beatmap.hit_objects[idx].position;
        self.judge(idx, result, position, now);
    }

    /// Resolves object `idx`. Ignored if it was already judged.
    pub(crate) fn judge(&mut self, idx: usize, result: Judgement, position: Pos, time: f64) {
        if !self.tracker.mark_judged(idx, result) {
            return;
        }

        self.state.record(result);
        if result.is_miss() {
            self.state.combo = 0;
        } else {
            self.state.combo += 1;
            self.state.max_combo = self.state.max_combo.max(self.state.combo);
        }

        let points = self.add_score(result.base_points(), true);
        self.state.apply_hp(result.hp_delta());
        self.check_fail();

        let judgement = HitJudgement {
            time,
            result,
            position,
            object_index: idx,
            points,
        };
        log::debug!(
            "ENGINE: #{} judged {} at {:.0}ms (+{}, combo {})",
            idx,
            result,
            time,
            points,
            self.state.combo
        );

        self.judgements.push(judgement.clone());
        self.notify_judgement(&judgement);
    }

    /// Adds `base_points` to the score and returns the points granted.
    pub(crate) fn add_score(&mut self, base_points: u32, apply_combo_multiplier: bool) -> u64 {
        let points = score_for(
            base_points,
            self.state.combo,
            apply_combo_multiplier,
            self.difficulty.score_multiplier,
        );
        self.state.score += points;
        points
    }
}
