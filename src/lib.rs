//! Judgement engine for a circle-clicking rhythm game.
//!
//! A run is driven by an external [`logic::clock::Clock`] and fed player input
//! between frames; [`state::GameEngine`] resolves every hit object, keeps
//! score, combo, health and accuracy, and records a [`models::replay::Replay`].

pub mod input;
pub mod logic;
pub mod models;
pub mod shared;
pub mod state;
pub mod system;
