//! Conversion of `.osu` files into the engine [`Beatmap`].

use super::beatmap::{Beatmap, BreakPeriod, ComboColor, DifficultyParams, TimingPoint};
use super::hit_object::{HitObject, HitObjectKind, Pos, SliderData};
use rosu_map::section::hit_objects::HitObjectKind as OsuKind;
use std::path::Path;

/// Failure while loading a chart.
#[derive(Debug)]
pub enum ChartError {
    /// The file could not be read.
    Io(std::io::Error),
    /// rosu-map rejected the content.
    Parse(String),
    /// The chart contains no playable object.
    Empty,
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::Io(e) => write!(f, "Failed to read chart: {}", e),
            ChartError::Parse(msg) => write!(f, "Failed to parse chart: {}", msg),
            ChartError::Empty => write!(f, "Chart has no playable objects"),
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChartError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChartError {
    fn from(e: std::io::Error) -> Self {
        ChartError::Io(e)
    }
}

/// Loads a chart from a `.osu` file.
pub fn load_map(path: &Path) -> Result<Beatmap, ChartError> {
    let bytes = std::fs::read(path)?;
    let map = load_map_from_bytes(&bytes)?;
    log::info!(
        "CHART: Loaded {:?} ({} objects, hash {})",
        path,
        map.hit_objects.len(),
        map.chart_hash
    );
    Ok(map)
}

/// Parses `.osu` content and converts it.
pub fn load_map_from_bytes(bytes: &[u8]) -> Result<Beatmap, ChartError> {
    let osu = rosu_map::Beatmap::from_bytes(bytes).map_err(|e| ChartError::Parse(e.to_string()))?;
    let mut map = convert(&osu);
    map.chart_hash = format!("{:x}", md5::compute(bytes));

    if map.hit_objects.is_empty() {
        return Err(ChartError::Empty);
    }

    Ok(map)
}

fn convert(osu: &rosu_map::Beatmap) -> Beatmap {
    let difficulty = DifficultyParams {
        circle_size: f64::from(osu.circle_size),
        approach_rate: f64::from(osu.approach_rate),
        overall_difficulty: f64::from(osu.overall_difficulty),
        hp_drain_rate: f64::from(osu.hp_drain_rate),
        slider_multiplier: osu.slider_multiplier,
        slider_tick_rate: osu.slider_tick_rate,
    };

    let timing_points = osu
        .control_points
        .timing_points
        .iter()
        .map(|tp| TimingPoint {
            time: tp.time,
            beat_len: tp.beat_len,
        })
        .collect();

    let breaks = osu
        .breaks
        .iter()
        .map(|b| BreakPeriod {
            start_time: b.start_time,
            end_time: b.end_time,
        })
        .collect();

    let palette = combo_palette(osu);
    let mut combo_index = 0;
    let mut color = 0;
    let mut hit_objects = Vec::with_capacity(osu.hit_objects.len());

    for (i, obj) in osu.hit_objects.iter().enumerate() {
        let (pos, new_combo, combo_offset, kind) = match &obj.kind {
            OsuKind::Circle(circle) => (
                to_pos(circle.pos.x, circle.pos.y),
                circle.new_combo,
                circle.combo_offset,
                HitObjectKind::Circle,
            ),
            OsuKind::Slider(slider) => {
                let head = to_pos(slider.pos.x, slider.pos.y);
                let mut control_path: Vec<Pos> = slider
                    .path
                    .control_points()
                    .iter()
                    .map(|cp| to_pos(slider.pos.x + cp.pos.x, slider.pos.y + cp.pos.y))
                    .collect();
                if control_path.first() != Some(&head) {
                    control_path.insert(0, head);
                }
                let length = slider
                    .path
                    .expected_dist()
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .unwrap_or_else(|| SliderData::polyline_length(&control_path));
                let spans = u32::try_from(slider.repeat_count + 1).unwrap_or(1);

                let mut data = SliderData::new(control_path, spans, length);
                data.velocity = slider_velocity_at(osu, obj.start_time);

                (head, slider.new_combo, slider.combo_offset, HitObjectKind::Slider(data))
            }
            OsuKind::Spinner(spinner) => (
                to_pos(spinner.pos.x, spinner.pos.y),
                spinner.new_combo,
                0,
                HitObjectKind::Spinner {
                    end_time: obj.start_time + spinner.duration,
                },
            ),
            OsuKind::Hold(_) => {
                log::warn!("CHART: Skipping hold note #{} (mania object)", i);
                continue;
            }
        };

        if new_combo || hit_objects.is_empty() {
            if !hit_objects.is_empty() {
                let skip = usize::try_from(combo_offset).unwrap_or(0);
                color = (color + 1 + skip) % palette.len();
            }
            combo_index = 0;
        }
        combo_index += 1;

        hit_objects.push(HitObject {
            position: pos,
            time: obj.start_time,
            combo_index,
            combo_color_index: color,
            kind,
        });
    }

    let mut map = Beatmap {
        hit_objects,
        difficulty,
        timing_points,
        breaks,
        combo_colors: palette,
        chart_hash: String::new(),
    };
    map.normalize();
    map.compute_slider_timings();
    map
}

/// The chart's own combo colours, or the default palette when it has none.
fn combo_palette(osu: &rosu_map::Beatmap) -> Vec<ComboColor> {
    if osu.custom_combo_colors.is_empty() {
        return ComboColor::default_palette();
    }
    osu.custom_combo_colors
        .iter()
        .map(|c| ComboColor::new(c.red(), c.green(), c.blue()))
        .collect()
}

fn slider_velocity_at(osu: &rosu_map::Beatmap, time: f64) -> f64 {
    osu.control_points
        .difficulty_points
        .iter()
        .take_while(|dp| dp.time <= time)
        .last()
        .map(|dp| dp.slider_velocity)
        .filter(|sv| sv.is_finite() && *sv > 0.0)
        .unwrap_or(1.0)
}

fn to_pos(x: f32, y: f32) -> Pos {
    Pos::new(f64::from(x), f64::from(y))
}
