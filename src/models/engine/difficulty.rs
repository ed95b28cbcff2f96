//! Resolution of raw chart difficulty into concrete gameplay constants.

use super::beatmap::DifficultyParams;
use super::hit_window::HitWindow;
use crate::models::mods::{GameMod, GameMods};

/// Factor applied to CS/AR/OD by HardRock.
const HARD_ROCK_FACTOR: f64 = 1.4;

/// Upper bound for any difficulty value after modifier scaling.
const MAX_DIFFICULTY: f64 = 10.0;

/// Concrete constants consumed every frame by the judgement engine.
///
/// Resolved once per run from the chart and modifier set; never mutated
/// while a run is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDifficulty {
    /// Effective (post-modifier) circle size.
    pub circle_size: f64,
    /// Effective (post-modifier) approach rate.
    pub approach_rate: f64,
    /// Effective (post-modifier) overall difficulty.
    pub overall_difficulty: f64,
    /// Hit circle radius in playfield units.
    pub circle_radius: f64,
    /// How long before its time an object becomes visible (ms).
    pub approach_ms: f64,
    pub hit_window: HitWindow,
    /// Base HP drain rate from the chart.
    pub hp_drain_rate: f64,
    /// 0.5 under Easy, 1.0 otherwise.
    pub hp_drain_multiplier: f64,
    /// Product of every active modifier's score factor.
    pub score_multiplier: f64,
    /// Playback rate the external clock should run at.
    pub time_rate: f64,
}

impl ResolvedDifficulty {
    /// Applies modifiers to the base numbers, then runs the formulas.
    pub fn resolve(params: &DifficultyParams, mods: GameMods) -> Self {
        let mut cs = params.circle_size;
        let mut ar = params.approach_rate;
        let mut od = params.overall_difficulty;

        if mods.contains(GameMod::Easy) {
            cs *= 0.5;
            ar *= 0.5;
            od *= 0.5;
        } else if mods.contains(GameMod::HardRock) {
            cs = (cs * HARD_ROCK_FACTOR).min(MAX_DIFFICULTY);
            ar = (ar * HARD_ROCK_FACTOR).min(MAX_DIFFICULTY);
            od = (od * HARD_ROCK_FACTOR).min(MAX_DIFFICULTY);
        }

        let resolved = Self {
            circle_size: cs,
            approach_rate: ar,
            overall_difficulty: od,
            circle_radius: circle_radius(cs),
            approach_ms: approach_duration(ar),
            hit_window: HitWindow::from_od(od),
            hp_drain_rate: params.hp_drain_rate,
            hp_drain_multiplier: if mods.contains(GameMod::Easy) { 0.5 } else { 1.0 },
            score_multiplier: mods.score_multiplier(),
            time_rate: mods.clock_rate(),
        };

        log::debug!(
            "ENGINE: Resolved difficulty [{}] CS {:.2} AR {:.2} OD {:.2} -> radius {:.2}, approach {:.0}ms",
            mods,
            cs,
            ar,
            od,
            resolved.circle_radius,
            resolved.approach_ms
        );

        resolved
    }

    /// Normalized approach progress in `[0, 1]` for an object at `object_time`.
    ///
    /// 0 when the object first appears, 1 at its nominal time.
    pub fn approach_progress(&self, object_time: f64, now: f64) -> f64 {
        if self.approach_ms <= 0.0 {
            return 1.0;
        }
        (1.0 - (object_time - now) / self.approach_ms).clamp(0.0, 1.0)
    }

    /// Whether an object at `object_time` is visible at `now`.
    pub fn is_visible(&self, object_time: f64, now: f64) -> bool {
        now >= object_time - self.approach_ms
    }
}

pub fn circle_radius(cs: f64) -> f64 {
    54.4 - 4.48 * cs
}

pub fn approach_duration(ar: f64) -> f64 {
    if ar < 5.0 {
        1800.0 - 120.0 * ar
    } else {
        1200.0 - 150.0 * (ar - 5.0)
    }
}
