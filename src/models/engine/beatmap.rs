//! Engine-side chart model.
//!
//! A [`Beatmap`] is produced by an external loader (see [`super::loader`]) and
//! treated as read-only for the duration of a run.

use super::hit_object::{HitObject, HitObjectKind, Pos};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Default beat length (120 BPM) used when a chart has no timing points.
const DEFAULT_BEAT_LEN: f64 = 500.0;

/// Raw difficulty numbers as authored in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub circle_size: f64,
    pub approach_rate: f64,
    pub overall_difficulty: f64,
    pub hp_drain_rate: f64,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            circle_size: 4.0,
            approach_rate: 5.0,
            overall_difficulty: 5.0,
            hp_drain_rate: 5.0,
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
        }
    }
}

impl DifficultyParams {
    /// Replaces non-finite values with defaults and clamps to `[0, 10]`.
    ///
    /// Returns `true` if anything had to be changed.
    fn normalize(&mut self) -> bool {
        let defaults = Self::default();
        let mut changed = false;

        let mut fix = |value: &mut f64, default: f64, max: f64| {
            let fixed = if value.is_finite() { value.clamp(0.0, max) } else { default };
            if fixed != *value {
                changed = true;
                *value = fixed;
            }
        };

        fix(&mut self.circle_size, defaults.circle_size, 10.0);
        fix(&mut self.approach_rate, defaults.approach_rate, 10.0);
        fix(&mut self.overall_difficulty, defaults.overall_difficulty, 10.0);
        fix(&mut self.hp_drain_rate, defaults.hp_drain_rate, 10.0);
        fix(&mut self.slider_multiplier, defaults.slider_multiplier, f64::MAX);
        fix(&mut self.slider_tick_rate, defaults.slider_tick_rate, f64::MAX);

        if self.slider_multiplier <= 0.0 {
            self.slider_multiplier = defaults.slider_multiplier;
            changed = true;
        }
        if self.slider_tick_rate <= 0.0 {
            self.slider_tick_rate = defaults.slider_tick_rate;
            changed = true;
        }

        changed
    }
}

/// An uninherited timing point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    pub time: f64,
    /// Milliseconds per beat.
    pub beat_len: f64,
}

/// A break interval during which HP does not drain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakPeriod {
    pub start_time: f64,
    pub end_time: f64,
}

impl BreakPeriod {
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// RGB combo colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ComboColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Palette used when a chart defines none.
    pub fn default_palette() -> Vec<ComboColor> {
        vec![
            ComboColor::new(255, 192, 0),
            ComboColor::new(0, 202, 0),
            ComboColor::new(18, 124, 255),
            ComboColor::new(242, 24, 57),
        ]
    }
}

/// A playable chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    /// Time-ascending.
    pub hit_objects: Vec<HitObject>,
    pub difficulty: DifficultyParams,
    /// Time-ascending.
    pub timing_points: Vec<TimingPoint>,
    /// Time-ascending.
    pub breaks: Vec<BreakPeriod>,
    pub combo_colors: Vec<ComboColor>,
    /// Identity used by replays (md5 of the source file when loaded from disk).
    pub chart_hash: String,
}

impl Default for Beatmap {
    fn default() -> Self {
        Self {
            hit_objects: Vec::new(),
            difficulty: DifficultyParams::default(),
            timing_points: Vec::new(),
            breaks: Vec::new(),
            combo_colors: ComboColor::default_palette(),
            chart_hash: String::new(),
        }
    }
}

impl Beatmap {
    pub fn new(hit_objects: Vec<HitObject>, difficulty: DifficultyParams) -> Self {
        let mut map = Self {
            hit_objects,
            difficulty,
            ..Self::default()
        };
        map.compute_slider_timings();
        map
    }

    /// Beat length of the timing point active at `time`.
    pub fn beat_len_at(&self, time: f64) -> f64 {
        self.timing_points
            .iter()
            .take_while(|tp| tp.time <= time)
            .last()
            .or_else(|| self.timing_points.first())
            .map(|tp| tp.beat_len)
            .filter(|len| len.is_finite() && *len > 0.0)
            .unwrap_or(DEFAULT_BEAT_LEN)
    }

    /// Fills in every slider's duration and tick count.
    ///
    /// One span lasts `path_length / (slider_multiplier * 100 * velocity)` beats;
    /// ticks fall every `beat_len / slider_tick_rate` ms over the whole slider.
    pub fn compute_slider_timings(&mut self) {
        let multiplier = self.difficulty.slider_multiplier;
        let tick_rate = self.difficulty.slider_tick_rate;
        let beat_lens: Vec<f64> = self
            .hit_objects
            .iter()
            .map(|obj| self.beat_len_at(obj.time))
            .collect();

        for (obj, beat_len) in self.hit_objects.iter_mut().zip(beat_lens) {
            let HitObjectKind::Slider(slider) = &mut obj.kind else {
                continue;
            };

            let px_per_beat = multiplier * 100.0 * slider.velocity;
            let span_duration = if px_per_beat > 0.0 {
                slider.path_length / px_per_beat * beat_len
            } else {
                0.0
            };
            slider.duration = (span_duration * slider.repeat_count as f64).max(0.0);

            let tick_interval = beat_len / tick_rate;
            slider.tick_count = if tick_interval > 0.0 && slider.duration.is_finite() {
                (slider.duration / tick_interval).floor() as u32
            } else {
                0
            };
        }
    }

    /// Sorts objects by time and normalizes difficulty numbers.
    ///
    /// The loader is expected to uphold these, so any repair is logged.
    pub fn normalize(&mut self) {
        if self.difficulty.normalize() {
            log::warn!("CHART: Non-finite or out-of-range difficulty values were normalized");
        }

        if !self.hit_objects.windows(2).all(|w| w[0].time <= w[1].time) {
            log::warn!("CHART: Hit objects were not sorted by time, sorting");
            self.hit_objects.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        self.timing_points.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.breaks.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        if self.combo_colors.is_empty() {
            self.combo_colors = ComboColor::default_palette();
        }
    }

    pub fn is_in_break(&self, time: f64) -> bool {
        self.breaks.iter().any(|b| b.contains(time))
    }

    /// Effective end time of the last object.
    pub fn last_end_time(&self) -> f64 {
        self.hit_objects
            .iter()
            .map(HitObject::end_time)
            .fold(f64::NEG_INFINITY, f64::max)
            .max(0.0)
    }

    /// Generates a circle-only chart for debugging and demos.
    pub fn random(seed: u64, count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut objects = Vec::with_capacity(count);
        let mut current_time = 1000.0;
        let palette_len = ComboColor::default_palette().len();
        let mut combo_index = 0;
        let mut color = 0;

        for _ in 0..count {
            if combo_index >= 4 {
                combo_index = 0;
                color = (color + 1) % palette_len;
            }
            combo_index += 1;

            let mut obj = HitObject::circle(
                current_time,
                rng.random_range(32.0..480.0),
                rng.random_range(32.0..352.0),
            );
            obj.combo_index = combo_index;
            obj.combo_color_index = color;
            objects.push(obj);
            current_time += rng.random_range(250.0..600.0);
        }

        let mut map = Self::new(objects, DifficultyParams::default());
        map.chart_hash = format!("random-{seed}");
        map.timing_points.push(TimingPoint {
            time: 0.0,
            beat_len: DEFAULT_BEAT_LEN,
        });
        map
    }

    /// Center of the 512x384 playfield.
    pub fn playfield_center() -> Pos {
        Pos::new(256.0, 192.0)
    }
}
