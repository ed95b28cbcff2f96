//! Per-object judgement state.
//!
//! Every object is tracked by its index in the beatmap. `states` is the single
//! source of truth for whether an object is still live; ephemeral slider and
//! spinner state lives in dense per-index slots that are cleared exactly once,
//! when the object is judged.

use crate::models::stats::Judgement;

/// Lifecycle state of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Not interacted with yet.
    Pending,
    /// Slider whose head was hit; following the path.
    Engaged,
    /// Spinner inside its time span.
    Active,
    /// Resolved; never changes again.
    Judged(Judgement),
}

impl ObjectState {
    pub fn is_judged(&self) -> bool {
        matches!(self, ObjectState::Judged(_))
    }
}

/// Tracking state of an engaged slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSlider {
    /// Fraction of the total duration elapsed, in `[0, 1]`.
    pub progress: f64,
    pub ticks_hit: u32,
    /// Ticks already passed, credited or not.
    pub ticks_passed: u32,
    pub is_held: bool,
    /// Set once the pointer leaves the follow area; no more ticks after that.
    pub tracking_lost: bool,
    /// Window the head was hit in.
    pub head_judgement: Judgement,
}

/// Rotation state of an active spinner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSpinner {
    /// Unsigned accumulated rotation in radians.
    pub rotation: f64,
    pub last_angle: Option<f64>,
    /// Full revolutions already rewarded with a bonus.
    pub spins_rewarded: u32,
    pub required_spins: u32,
}

impl ActiveSpinner {
    pub fn new(required_spins: u32) -> Self {
        Self {
            rotation: 0.0,
            last_angle: None,
            spins_rewarded: 0,
            required_spins,
        }
    }

    /// Revolutions completed so far (fractional).
    pub fn spins_completed(&self) -> f64 {
        self.rotation / std::f64::consts::TAU
    }
}

/// Owns the lifecycle of every object of a run.
#[derive(Debug, Clone)]
pub struct ObjectTracker {
    states: Vec<ObjectState>,
    sliders: Vec<Option<ActiveSlider>>,
    spinners: Vec<Option<ActiveSpinner>>,
    /// Indices currently `Engaged` or `Active`, in activation order.
    active: Vec<usize>,
    judged: usize,
}

impl ObjectTracker {
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![ObjectState::Pending; len],
            sliders: vec![None; len],
            spinners: vec![None; len],
            active: Vec::new(),
            judged: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State of `idx`; out-of-range indices read as judged.
    pub fn state(&self, idx: usize) -> ObjectState {
        self.states
            .get(idx)
            .copied()
            .unwrap_or(ObjectState::Judged(Judgement::Miss))
    }

    pub fn is_processed(&self, idx: usize) -> bool {
        self.state(idx).is_judged()
    }

    pub fn is_pending(&self, idx: usize) -> bool {
        self.state(idx) == ObjectState::Pending
    }

    pub fn judged_count(&self) -> usize {
        self.judged
    }

    pub fn all_judged(&self) -> bool {
        self.judged == self.states.len()
    }

    /// Indices of engaged sliders and active spinners.
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    /// `Pending -> Engaged`. Returns `false` if the slider was not pending.
    pub fn engage_slider(&mut self, idx: usize, head_judgement: Judgement) -> bool {
        if !self.is_pending(idx) {
            return false;
        }
        self.states[idx] = ObjectState::Engaged;
        self.sliders[idx] = Some(ActiveSlider {
            progress: 0.0,
            ticks_hit: 0,
            ticks_passed: 0,
            is_held: true,
            tracking_lost: false,
            head_judgement,
        });
        self.active.push(idx);
        true
    }

    /// `Pending -> Active`. Returns `false` if the spinner was not pending.
    pub fn activate_spinner(&mut self, idx: usize, required_spins: u32) -> bool {
        if !self.is_pending(idx) {
            return false;
        }
        self.states[idx] = ObjectState::Active;
        self.spinners[idx] = Some(ActiveSpinner::new(required_spins));
        self.active.push(idx);
        true
    }

    pub fn slider(&self, idx: usize) -> Option<&ActiveSlider> {
        self.sliders.get(idx).and_then(Option::as_ref)
    }

    pub fn slider_mut(&mut self, idx: usize) -> Option<&mut ActiveSlider> {
        self.sliders.get_mut(idx).and_then(Option::as_mut)
    }

    pub fn spinner(&self, idx: usize) -> Option<&ActiveSpinner> {
        self.spinners.get(idx).and_then(Option::as_ref)
    }

    pub fn spinner_mut(&mut self, idx: usize) -> Option<&mut ActiveSpinner> {
        self.spinners.get_mut(idx).and_then(Option::as_mut)
    }

    /// Clears `is_held` on every engaged slider.
    pub fn release_sliders(&mut self) {
        for idx in &self.active {
            if let Some(slider) = self.sliders[*idx].as_mut() {
                slider.is_held = false;
            }
        }
    }

    /// Records the final judgement of `idx` and drops its active state.
    ///
    /// Returns `false`, leaving everything untouched, when the object was
    /// already judged or does not exist.
    pub fn mark_judged(&mut self, idx: usize, judgement: Judgement) -> bool {
        if idx >= self.states.len() || self.states[idx].is_judged() {
            return false;
        }
        self.states[idx] = ObjectState::Judged(judgement);
        self.sliders[idx] = None;
        self.spinners[idx] = None;
        self.active.retain(|&i| i != idx);
        self.judged += 1;
        true
    }

    /// Discards all in-flight slider and spinner state.
    ///
    /// Engaged/active objects go back to pending; judged objects stay judged.
    pub fn clear_active(&mut self) {
        for idx in self.active.drain(..) {
            self.states[idx] = ObjectState::Pending;
            self.sliders[idx] = None;
            self.spinners[idx] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judged_exactly_once() {
        let mut tracker = ObjectTracker::new(2);
        assert!(tracker.mark_judged(0, Judgement::Great));
        assert!(!tracker.mark_judged(0, Judgement::Miss));
        assert_eq!(tracker.state(0), ObjectState::Judged(Judgement::Great));
        assert_eq!(tracker.judged_count(), 1);
        assert!(!tracker.all_judged());
        assert!(!tracker.mark_judged(5, Judgement::Miss));
    }

    #[test]
    fn slider_lifecycle() {
        let mut tracker = ObjectTracker::new(1);
        assert!(tracker.engage_slider(0, Judgement::Perfect));
        assert!(!tracker.engage_slider(0, Judgement::Perfect));
        assert_eq!(tracker.active_indices(), &[0]);

        tracker.release_sliders();
        assert!(!tracker.slider(0).unwrap().is_held);

        assert!(tracker.mark_judged(0, Judgement::Good));
        assert!(tracker.slider(0).is_none());
        assert!(tracker.active_indices().is_empty());
        assert!(tracker.all_judged());
    }

    #[test]
    fn judged_objects_cannot_activate() {
        let mut tracker = ObjectTracker::new(1);
        tracker.mark_judged(0, Judgement::Miss);
        assert!(!tracker.activate_spinner(0, 3));
        assert!(tracker.spinner(0).is_none());
    }

    #[test]
    fn clear_active_resets_in_flight_objects() {
        let mut tracker = ObjectTracker::new(3);
        tracker.engage_slider(0, Judgement::Great);
        tracker.activate_spinner(1, 2);
        tracker.mark_judged(2, Judgement::Perfect);
        tracker.clear_active();

        assert!(tracker.is_pending(0));
        assert!(tracker.is_pending(1));
        assert!(tracker.is_processed(2));
        assert!(tracker.active_indices().is_empty());
    }
}
