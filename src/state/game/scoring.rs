//! Score and combo model.

use crate::models::stats::Judgement;

/// Points added for `base_points` at the given combo.
///
/// `floor(base * max(1, combo) * mods)` when the combo multiplier applies,
/// `floor(base * mods)` otherwise.
pub fn score_for(base_points: u32, combo: u32, apply_combo_multiplier: bool, mod_multiplier: f64) -> u64 {
    let combo_multiplier = if apply_combo_multiplier { combo.max(1) } else { 1 };
    let points = base_points as f64 * combo_multiplier as f64 * mod_multiplier;
    if points.is_finite() && points > 0.0 {
        points.floor() as u64
    } else {
        0
    }
}

/// Provisional credit for engaging a slider head in `window`.
pub fn slider_engage_points(window: Judgement) -> u32 {
    window.base_points() / 3
}

/// Required revolutions for a spinner lasting `duration_ms`.
pub fn required_spins(duration_ms: f64) -> u32 {
    if duration_ms <= 0.0 || !duration_ms.is_finite() {
        return 0;
    }
    (duration_ms / 1000.0 * 2.5).ceil() as u32
}

/// Final judgement of a spinner.
pub fn spinner_result(spins_completed: f64, required_spins: u32) -> Judgement {
    let required = required_spins as f64;
    if spins_completed >= required {
        Judgement::Perfect
    } else if spins_completed >= 0.5 * required {
        Judgement::Great
    } else {
        Judgement::Miss
    }
}

/// Final judgement of a slider that was engaged.
pub fn slider_result(ticks_hit: u32, tick_count: u32) -> Judgement {
    if ticks_hit as f64 >= tick_count as f64 * 0.5 {
        Judgement::Great
    } else {
        Judgement::Good
    }
}
