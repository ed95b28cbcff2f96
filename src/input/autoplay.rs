//! Ideal input generation for a chart.
//!
//! Produces the inputs a perfect player would send: a click at each object's
//! time, pointer motion along slider paths and around spinners, and a release
//! after each object.

use std::f64::consts::TAU;

use super::events::{PlayerInput, TimedInput};
use crate::models::engine::{Beatmap, HitObjectKind, Pos};

/// Spacing of generated pointer samples (ms).
const MOTION_STEP_MS: f64 = 10.0;
/// How long the button stays down after a circle.
const RELEASE_DELAY_MS: f64 = 40.0;
/// Radius of the circle traced around a spinner's center.
const SPIN_RADIUS: f64 = 64.0;
/// Revolutions per second traced on spinners.
const SPINS_PER_SECOND: f64 = 5.0;

/// Builds the full input sequence for `beatmap`, sorted by time.
pub fn autoplay_inputs(beatmap: &Beatmap) -> Vec<TimedInput> {
    let objects = &beatmap.hit_objects;
    let mut inputs = Vec::with_capacity(objects.len() * 2);

    for (idx, obj) in objects.iter().enumerate() {
        let end = obj.end_time();
        let next_time = objects.get(idx + 1).map(|next| next.time);

        match &obj.kind {
            HitObjectKind::Circle => {
                inputs.push(click_at(obj.time, obj.position));
            }
            HitObjectKind::Slider(data) => {
                inputs.push(click_at(obj.time, obj.position));
                let mut t = obj.time + MOTION_STEP_MS;
                while t < end {
                    let progress = (t - obj.time) / data.duration;
                    inputs.push(move_to(t, data.position_at(progress)));
                    t += MOTION_STEP_MS;
                }
                inputs.push(move_to(end, data.end_position()));
            }
            HitObjectKind::Spinner { end_time } => {
                let center = obj.position;
                let mut t = obj.time;
                while t <= *end_time {
                    let angle = (t - obj.time) / 1000.0 * SPINS_PER_SECOND * TAU;
                    let pos = Pos::new(
                        center.x + SPIN_RADIUS * angle.cos(),
                        center.y + SPIN_RADIUS * angle.sin(),
                    );
                    inputs.push(move_to(t, pos));
                    t += MOTION_STEP_MS;
                }
            }
        }

        // Releasing into the next object's head would drop its hold.
        let release_at = end + RELEASE_DELAY_MS;
        match next_time {
            Some(next) if next <= release_at => {
                if next > end {
                    inputs.push(TimedInput::new((end + next) / 2.0, PlayerInput::Release));
                }
            }
            _ => inputs.push(TimedInput::new(release_at, PlayerInput::Release)),
        }
    }

    inputs.sort_by(|a, b| a.time.total_cmp(&b.time));
    log::debug!(
        "ENGINE: Generated {} autoplay inputs for {} objects",
        inputs.len(),
        objects.len()
    );
    inputs
}

fn click_at(time: f64, pos: Pos) -> TimedInput {
    TimedInput::new(time, PlayerInput::Click { x: pos.x, y: pos.y })
}

fn move_to(time: f64, pos: Pos) -> TimedInput {
    TimedInput::new(time, PlayerInput::Move { x: pos.x, y: pos.y })
}
