//! Player input delivered by the rendering/UI layer.
//!
//! Coordinates are playfield units (512x384 logical canvas), already
//! inverse-transformed from screen space.

use crate::models::engine::Pos;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerInput {
    /// Button pressed at the given position.
    Click { x: f64, y: f64 },
    /// Pointer moved.
    Move { x: f64, y: f64 },
    /// Button released.
    Release,
}

impl PlayerInput {
    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Pos> {
        match *self {
            PlayerInput::Click { x, y } | PlayerInput::Move { x, y } => Some(Pos::new(x, y)),
            PlayerInput::Release => None,
        }
    }
}

/// An input stamped with the chart time it should be delivered at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedInput {
    pub time: f64,
    pub input: PlayerInput,
}

impl TimedInput {
    pub fn new(time: f64, input: PlayerInput) -> Self {
        Self { time, input }
    }
}
