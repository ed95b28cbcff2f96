pub mod engine;
pub mod mods;
pub mod replay;
pub mod settings;
pub mod stats;
