//! Serializable replay structures.
//!
//! A replay stores the chart identity, the modifiers, the final stats and the
//! ordered pointer frames recorded during a run. Frames are enough to
//! re-simulate the run with [`crate::logic::replay_engine::ReplayEngine`].

use crate::models::mods::GameMods;
use crate::models::stats::HitStats;
use serde::{Deserialize, Serialize};
use zstd::stream::{decode_all, encode_all};

/// Current replay format version.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// Zstd compression level used by [`Replay::encode`].
const COMPRESSION_LEVEL: i32 = 19;

/// Button mask bit: the button went down on this frame.
pub const BUTTON_PRESS: u8 = 1 << 0;
/// Button mask bit: the button is held during this frame.
pub const BUTTON_HOLD: u8 = 1 << 1;

/// A single pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Chart time in ms.
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub buttons: u8,
}

impl ReplayFrame {
    #[inline]
    pub fn is_press(&self) -> bool {
        self.buttons & BUTTON_PRESS != 0
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.buttons & BUTTON_HOLD != 0
    }
}

/// Final statistics of the recorded run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayStats {
    pub score: u64,
    pub max_combo: u32,
    pub accuracy: f64,
    pub hit_stats: HitStats,
    pub failed: bool,
}

/// Failure while encoding or decoding a replay.
#[derive(Debug)]
pub enum ReplayError {
    Json(serde_json::Error),
    Encode(String),
    Decode(String),
    Compression(std::io::Error),
    /// The data was written by an unknown format version.
    Version(u8),
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Json(e) => write!(f, "Replay JSON error: {}", e),
            ReplayError::Encode(msg) => write!(f, "Serialization error: {}", msg),
            ReplayError::Decode(msg) => write!(f, "Deserialization error: {}", msg),
            ReplayError::Compression(e) => write!(f, "Compression error: {}", e),
            ReplayError::Version(v) => write!(f, "Unsupported replay version {}", v),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Recording of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Format version for future compatibility.
    pub version: u8,
    /// Identity of the chart that was played.
    pub chart_hash: String,
    pub mods: GameMods,
    /// Playback rate used during the play.
    pub rate: f64,
    /// Filled in when the run ends.
    #[serde(default)]
    pub stats: ReplayStats,
    /// All recorded frames in chronological order.
    pub frames: Vec<ReplayFrame>,
}

impl Replay {
    /// Creates an empty replay.
    pub fn new(chart_hash: impl Into<String>, mods: GameMods) -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            chart_hash: chart_hash.into(),
            mods,
            rate: mods.clock_rate(),
            stats: ReplayStats::default(),
            frames: Vec::new(),
        }
    }

    /// Appends a frame.
    pub fn push(&mut self, time: f64, x: f64, y: f64, buttons: u8) {
        self.frames.push(ReplayFrame { time, x, y, buttons });
    }

    /// Number of recorded clicks.
    pub fn press_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_press()).count()
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, ReplayError> {
        serde_json::to_string(self).map_err(ReplayError::Json)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let replay: Self = serde_json::from_str(json).map_err(ReplayError::Json)?;
        replay.check_version()
    }

    /// Serializes with bincode and compresses with zstd.
    pub fn encode(&self) -> Result<Vec<u8>, ReplayError> {
        let binary = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ReplayError::Encode(e.to_string()))?;

        encode_all(&binary[..], COMPRESSION_LEVEL).map_err(ReplayError::Compression)
    }

    /// Inverse of [`Replay::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ReplayError> {
        let binary = decode_all(bytes).map_err(ReplayError::Compression)?;

        let (replay, _len): (Self, usize) =
            bincode::serde::decode_from_slice(&binary, bincode::config::standard())
                .map_err(|e| ReplayError::Decode(e.to_string()))?;

        replay.check_version()
    }

    fn check_version(self) -> Result<Self, ReplayError> {
        if self.version != REPLAY_FORMAT_VERSION {
            log::warn!("REPLAY: Rejecting replay with version {}", self.version);
            return Err(ReplayError::Version(self.version));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mods::GameMod;

    fn sample() -> Replay {
        let mut replay = Replay::new("abc", GameMods::new().with(GameMod::DoubleTime));
        replay.push(1000.0, 10.0, 20.0, BUTTON_PRESS | BUTTON_HOLD);
        replay.push(1010.0, 12.0, 20.0, BUTTON_HOLD);
        replay.push(1020.0, 12.0, 20.0, 0);
        replay.stats.score = 300;
        replay
    }

    #[test]
    fn new_replay_takes_rate_from_mods() {
        assert_eq!(sample().rate, 1.5);
        assert_eq!(sample().press_count(), 1);
    }

    #[test]
    fn compressed_codec_preserves_frames() {
        let replay = sample();
        let bytes = replay.encode().unwrap();
        assert_eq!(Replay::decode(&bytes).unwrap(), replay);
    }

    #[test]
    fn json_preserves_frames() {
        let replay = sample();
        let json = replay.to_json().unwrap();
        assert_eq!(Replay::from_json(&json).unwrap(), replay);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut replay = sample();
        replay.version = 99;
        let json = replay.to_json().unwrap();
        assert!(matches!(Replay::from_json(&json), Err(ReplayError::Version(99))));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(Replay::decode(b"not a replay").is_err());
    }
}
