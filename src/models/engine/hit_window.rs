//! Hit window timing thresholds derived from Overall Difficulty.

use crate::models::stats::Judgement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub good_ms: f64,
}

impl HitWindow {
    /// Creates a window from osu! Overall Difficulty.
    pub fn from_od(od: f64) -> Self {
        Self {
            perfect_ms: 80.0 - 6.0 * od,
            great_ms: 140.0 - 8.0 * od,
            good_ms: 200.0 - 10.0 * od,
        }
    }

    /// Judges a signed timing offset.
    ///
    /// Returns `None` when the offset falls outside the `good` window, in which
    /// case the input is not eligible for this object at all. Boundaries belong
    /// to the tighter band.
    pub fn judge(&self, timing_diff_ms: f64) -> Option<Judgement> {
        let abs_diff = timing_diff_ms.abs();

        if abs_diff <= self.perfect_ms {
            Some(Judgement::Perfect)
        } else if abs_diff <= self.great_ms {
            Some(Judgement::Great)
        } else if abs_diff <= self.good_ms {
            Some(Judgement::Good)
        } else {
            None
        }
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::from_od(5.0)
    }
}
