//! Hit objects: circles, sliders and spinners.

use serde::{Deserialize, Serialize};

/// Position in playfield coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub x: f64,
    pub y: f64,
}

impl Pos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Pos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(self, other: Pos, t: f64) -> Pos {
        Pos::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Slider-specific data. `duration` and `tick_count` are filled in once at
/// load time by [`Beatmap::compute_slider_timings`](super::Beatmap::compute_slider_timings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderData {
    /// Absolute control points; the first one is the head.
    pub control_path: Vec<Pos>,
    /// Number of spans (1 = no repeat).
    pub repeat_count: u32,
    /// Length of one span in playfield units.
    pub path_length: f64,
    /// Slider velocity multiplier active at the slider's time.
    pub velocity: f64,
    /// Total duration over every span (ms).
    pub duration: f64,
    pub tick_count: u32,
}

impl SliderData {
    pub fn new(control_path: Vec<Pos>, repeat_count: u32, path_length: f64) -> Self {
        Self {
            control_path,
            repeat_count: repeat_count.max(1),
            path_length,
            velocity: 1.0,
            duration: 0.0,
            tick_count: 0,
        }
    }

    /// Sum of the segment lengths of the control path.
    pub fn polyline_length(points: &[Pos]) -> f64 {
        points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Position along the path at overall `progress` in `[0, 1]`.
    ///
    /// Spans alternate direction; odd spans run from tail back to head.
    /// Interpolation is piecewise linear across the control points and a
    /// single-point path holds the head position.
    pub fn position_at(&self, progress: f64) -> Pos {
        let Some(&head) = self.control_path.first() else {
            return Pos::default();
        };
        if self.control_path.len() < 2 {
            return head;
        }

        let spans = self.repeat_count.max(1) as f64;
        let scaled = progress.clamp(0.0, 1.0) * spans;
        let span = (scaled.floor() as u32).min(self.repeat_count.max(1) - 1);
        let mut local = scaled - span as f64;
        if span % 2 == 1 {
            local = 1.0 - local;
        }

        self.position_along_span(local)
    }

    fn position_along_span(&self, t: f64) -> Pos {
        let total = Self::polyline_length(&self.control_path);
        if total <= 0.0 {
            return self.control_path[0];
        }

        let mut remaining = t.clamp(0.0, 1.0) * total;
        for w in self.control_path.windows(2) {
            let seg = w[0].distance(w[1]);
            if remaining <= seg {
                let frac = if seg > 0.0 { remaining / seg } else { 0.0 };
                return w[0].lerp(w[1], frac);
            }
            remaining -= seg;
        }

        self.control_path[self.control_path.len() - 1]
    }

    /// Where the slider finishes after all spans.
    pub fn end_position(&self) -> Pos {
        self.position_at(1.0)
    }
}

/// Variant-specific data of a hit object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitObjectKind {
    Circle,
    Slider(SliderData),
    Spinner { end_time: f64 },
}

/// A single object of the chart. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitObject {
    pub position: Pos,
    /// Nominal hit time in ms, chart-relative.
    pub time: f64,
    /// 1-based number within the current combo.
    pub combo_index: u32,
    pub combo_color_index: usize,
    pub kind: HitObjectKind,
}

impl HitObject {
    pub fn circle(time: f64, x: f64, y: f64) -> Self {
        Self {
            position: Pos::new(x, y),
            time,
            combo_index: 1,
            combo_color_index: 0,
            kind: HitObjectKind::Circle,
        }
    }

    /// Builds a slider whose head is the first control point.
    pub fn slider(time: f64, control_path: Vec<Pos>, repeat_count: u32) -> Self {
        let position = control_path.first().copied().unwrap_or_default();
        let length = SliderData::polyline_length(&control_path);
        Self {
            position,
            time,
            combo_index: 1,
            combo_color_index: 0,
            kind: HitObjectKind::Slider(SliderData::new(control_path, repeat_count, length)),
        }
    }

    pub fn spinner(time: f64, end_time: f64) -> Self {
        Self {
            position: Pos::new(256.0, 192.0),
            time,
            combo_index: 1,
            combo_color_index: 0,
            kind: HitObjectKind::Spinner { end_time },
        }
    }

    /// End of the object itself (slider/spinner end, or `time` for circles).
    pub fn end_time(&self) -> f64 {
        match &self.kind {
            HitObjectKind::Circle => self.time,
            HitObjectKind::Slider(slider) => self.time + slider.duration,
            HitObjectKind::Spinner { end_time } => *end_time,
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self.kind, HitObjectKind::Circle)
    }

    pub fn is_slider(&self) -> bool {
        matches!(self.kind, HitObjectKind::Slider(_))
    }

    pub fn is_spinner(&self) -> bool {
        matches!(self.kind, HitObjectKind::Spinner { .. })
    }

    pub fn as_slider(&self) -> Option<&SliderData> {
        match &self.kind {
            HitObjectKind::Slider(slider) => Some(slider),
            _ => None,
        }
    }
}
