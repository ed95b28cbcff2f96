//! Per-run game state as seen by observers.

use crate::models::stats::{HitStats, Judgement};
use serde::{Deserialize, Serialize};

/// Maximum (and starting) health.
pub const MAX_HP: f64 = 100.0;

/// Score, combo, health and accuracy of one run.
///
/// The engine owns the live instance; observers receive clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Percentage in `[0, 100]`.
    pub accuracy: f64,
    /// Health in `[0, 100]`.
    pub hp: f64,
    pub perfect_count: u32,
    pub great_count: u32,
    pub good_count: u32,
    pub miss_count: u32,
    /// Simulation time of the frame that produced this state (ms).
    pub time: f64,
    /// Whether HP has reached 0 at some point.
    pub failed: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            accuracy: 100.0,
            hp: MAX_HP,
            perfect_count: 0,
            great_count: 0,
            good_count: 0,
            miss_count: 0,
            time: 0.0,
            failed: false,
        }
    }

    pub fn hit_stats(&self) -> HitStats {
        HitStats {
            perfect: self.perfect_count,
            great: self.great_count,
            good: self.good_count,
            miss: self.miss_count,
        }
    }

    /// Increments the matching counter and refreshes accuracy.
    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => self.perfect_count += 1,
            Judgement::Great => self.great_count += 1,
            Judgement::Good => self.good_count += 1,
            Judgement::Miss => self.miss_count += 1,
        }
        self.accuracy = self.hit_stats().calculate_accuracy();
    }

    pub fn judged_count(&self) -> u32 {
        self.hit_stats().total()
    }

    /// Adds `delta` to health, clamped to `[0, 100]`.
    pub fn apply_hp(&mut self, delta: f64) {
        self.hp = (self.hp + delta).clamp(0.0, MAX_HP);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
