//! Hit statistics and judgement types.
//!
//! This module defines the judgement tiers used for scoring, the per-object
//! judgement record, and the accumulated counters that accuracy derives from.

use crate::models::engine::Pos;
use serde::{Deserialize, Serialize};

/// Hit judgement tiers from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    /// Tightest timing window (300).
    Perfect,
    /// Middle timing window (100).
    Great,
    /// Loosest timing window (50).
    Good,
    /// Object not hit in time.
    Miss,
}

impl Judgement {
    /// Base points awarded before combo and mod multipliers.
    pub fn base_points(self) -> u32 {
        match self {
            Judgement::Perfect => 300,
            Judgement::Great => 100,
            Judgement::Good => 50,
            Judgement::Miss => 0,
        }
    }

    /// Health change applied when an object receives this judgement.
    pub fn hp_delta(self) -> f64 {
        match self {
            Judgement::Perfect => 2.0,
            Judgement::Great => 1.0,
            Judgement::Good => 0.5,
            Judgement::Miss => -5.0,
        }
    }

    pub fn is_miss(self) -> bool {
        matches!(self, Judgement::Miss)
    }
}

impl std::fmt::Display for Judgement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Judgement::Perfect => write!(f, "300"),
            Judgement::Great => write!(f, "100"),
            Judgement::Good => write!(f, "50"),
            Judgement::Miss => write!(f, "miss"),
        }
    }
}

/// Immutable record of one resolved object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitJudgement {
    /// Simulation time at which the judgement was made (ms).
    pub time: f64,
    pub result: Judgement,
    /// Where the judgement happened (circle/spinner position, slider end).
    pub position: Pos,
    /// Index of the judged object in the beatmap.
    pub object_index: usize,
    /// Score actually added by this judgement.
    pub points: u64,
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub miss: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter matching `judgement`.
    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => self.perfect += 1,
            Judgement::Great => self.great += 1,
            Judgement::Good => self.good += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    /// Number of objects judged so far.
    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.good + self.miss
    }

    /// Calculates accuracy percentage (0-100).
    ///
    /// Weighted by base points (300/100/50/0) over the maximum possible.
    /// Defined as 100 when nothing has been judged yet.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.total() as f64;

        if total == 0.0 {
            return 100.0;
        }

        let points = self.perfect as f64 * 300.0 + self.great as f64 * 100.0 + self.good as f64 * 50.0;

        points / (total * 300.0) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_defaults_to_full_when_empty() {
        assert_eq!(HitStats::new().calculate_accuracy(), 100.0);
    }

    #[test]
    fn accuracy_weights_by_base_points() {
        let mut stats = HitStats::new();
        stats.record(Judgement::Perfect);
        assert_eq!(stats.calculate_accuracy(), 100.0);

        stats.record(Judgement::Miss);
        assert_eq!(stats.calculate_accuracy(), 50.0);

        let mut stats = HitStats::new();
        stats.record(Judgement::Great);
        stats.record(Judgement::Good);
        assert!((stats.calculate_accuracy() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn hp_deltas_match_tiers() {
        assert_eq!(Judgement::Perfect.hp_delta(), 2.0);
        assert_eq!(Judgement::Great.hp_delta(), 1.0);
        assert_eq!(Judgement::Good.hp_delta(), 0.5);
        assert_eq!(Judgement::Miss.hp_delta(), -5.0);
    }
}
