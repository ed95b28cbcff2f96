//! Gameplay state.
//!
//! - `GameEngine` - an active run: object lifecycles, scoring, replay capture

pub mod game;

pub use game::{GameEngine, RunState};
