//! Input events and the autoplay input generator.

pub mod autoplay;
pub mod events;

pub use events::{PlayerInput, TimedInput};
