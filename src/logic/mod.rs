//! Run orchestration around the judgement engine.
//!
//! The clock abstraction the engine reads time from, the fixed-timestep
//! driver used for offline runs, and replay playback.

pub mod clock;
pub mod game_loop;
pub mod replay_engine;
