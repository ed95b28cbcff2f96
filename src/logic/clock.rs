//! Playback clock consumed by the judgement engine.
//!
//! The real clock is owned by the audio collaborator; the engine only reads
//! the current chart time from it and forwards transport commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// External playback clock.
pub trait Clock {
    /// Current chart time in ms. Monotonic while playing and already scaled
    /// by the playback rate.
    fn current_time_ms(&self) -> f64;

    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, time_ms: f64);

    /// Total playable length in ms.
    fn duration_ms(&self) -> f64;

    /// Sets the playback rate (1.0 = normal speed).
    fn set_rate(&mut self, rate: f64);

    /// Whether playback has run past the end of the track.
    fn is_exhausted(&self) -> bool {
        self.current_time_ms() >= self.duration_ms()
    }
}

/// Externally driven clock.
///
/// Clones share the same position, so a test or a frame loop can keep a
/// handle and advance time while the engine owns another one. The position
/// is stored as the bits of an `f64`.
#[derive(Clone, Debug)]
pub struct ManualClock {
    position: Arc<AtomicU64>,
    rate: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    duration_ms: f64,
}

impl ManualClock {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            position: Arc::new(AtomicU64::new(0f64.to_bits())),
            rate: Arc::new(AtomicU64::new(1f64.to_bits())),
            playing: Arc::new(AtomicBool::new(false)),
            duration_ms,
        }
    }

    /// Starts the clock at `start_ms` (negative for a lead-in).
    pub fn starting_at(duration_ms: f64, start_ms: f64) -> Self {
        let clock = Self::new(duration_ms);
        clock.set_position(start_ms);
        clock
    }

    fn set_position(&self, time_ms: f64) {
        self.position.store(time_ms.to_bits(), Ordering::Relaxed);
    }

    pub fn rate(&self) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed))
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Advances by `wall_ms` of real time, scaled by the playback rate.
    ///
    /// Does nothing while paused or stopped.
    pub fn advance(&self, wall_ms: f64) {
        if !self.is_playing() {
            return;
        }
        let now = self.current_time_ms();
        self.set_position(now + wall_ms * self.rate());
    }

    /// Jumps directly to `time_ms` regardless of the transport state.
    pub fn set_time(&self, time_ms: f64) {
        self.set_position(time_ms);
    }
}

impl Clock for ManualClock {
    fn current_time_ms(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn play(&mut self) {
        self.playing.store(true, Ordering::Relaxed);
    }

    fn pause(&mut self) {
        self.playing.store(false, Ordering::Relaxed);
    }

    fn resume(&mut self) {
        self.playing.store(true, Ordering::Relaxed);
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::Relaxed);
    }

    fn seek(&mut self, time_ms: f64) {
        self.set_position(time_ms);
    }

    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate.store(rate.to_bits(), Ordering::Relaxed);
    }
}
