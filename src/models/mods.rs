//! Gameplay modifiers and their composition.

use serde::{Deserialize, Serialize};

/// A single gameplay modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMod {
    /// Halves CS, AR and OD; halves HP drain.
    Easy,
    /// Scales CS, AR and OD up (capped at 10).
    HardRock,
    /// Plays the chart at 1.5x.
    DoubleTime,
    /// Plays the chart at 0.75x.
    HalfTime,
    /// Objects fade out while approaching.
    Hidden,
    /// Only a small area around the cursor is visible.
    Flashlight,
}

impl GameMod {
    pub const ALL: [GameMod; 6] = [
        GameMod::Easy,
        GameMod::HardRock,
        GameMod::DoubleTime,
        GameMod::HalfTime,
        GameMod::Hidden,
        GameMod::Flashlight,
    ];

    const fn bit(self) -> u8 {
        match self {
            GameMod::Easy => 1 << 0,
            GameMod::HardRock => 1 << 1,
            GameMod::DoubleTime => 1 << 2,
            GameMod::HalfTime => 1 << 3,
            GameMod::Hidden => 1 << 4,
            GameMod::Flashlight => 1 << 5,
        }
    }

    /// Two-letter acronym.
    pub fn acronym(self) -> &'static str {
        match self {
            GameMod::Easy => "EZ",
            GameMod::HardRock => "HR",
            GameMod::DoubleTime => "DT",
            GameMod::HalfTime => "HT",
            GameMod::Hidden => "HD",
            GameMod::Flashlight => "FL",
        }
    }

    pub fn from_acronym(acronym: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.acronym().eq_ignore_ascii_case(acronym))
    }

    /// Fixed score multiplier of this modifier.
    pub fn score_multiplier(self) -> f64 {
        match self {
            GameMod::Easy => 0.5,
            GameMod::HardRock => 1.06,
            GameMod::DoubleTime => 1.12,
            GameMod::HalfTime => 0.3,
            GameMod::Hidden => 1.06,
            GameMod::Flashlight => 1.12,
        }
    }

    /// The modifier that cannot be active together with this one.
    fn incompatible(self) -> Option<GameMod> {
        match self {
            GameMod::Easy => Some(GameMod::HardRock),
            GameMod::HardRock => Some(GameMod::Easy),
            GameMod::DoubleTime => Some(GameMod::HalfTime),
            GameMod::HalfTime => Some(GameMod::DoubleTime),
            GameMod::Hidden | GameMod::Flashlight => None,
        }
    }
}

/// Set of active modifiers, stored as a bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameMods(u8);

impl GameMods {
    pub const NONE: GameMods = GameMods(0);

    pub fn new() -> Self {
        Self::NONE
    }

    /// Adds a modifier, dropping the one it is incompatible with.
    pub fn insert(&mut self, m: GameMod) {
        if let Some(other) = m.incompatible() {
            self.0 &= !other.bit();
        }
        self.0 |= m.bit();
    }

    pub fn with(mut self, m: GameMod) -> Self {
        self.insert(m);
        self
    }

    pub fn contains(&self, m: GameMod) -> bool {
        self.0 & m.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = GameMod> + '_ {
        GameMod::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Product of every active modifier's score multiplier.
    pub fn score_multiplier(&self) -> f64 {
        self.iter().map(GameMod::score_multiplier).product()
    }

    /// Playback rate applied to the external clock.
    pub fn clock_rate(&self) -> f64 {
        if self.contains(GameMod::DoubleTime) {
            1.5
        } else if self.contains(GameMod::HalfTime) {
            0.75
        } else {
            1.0
        }
    }

    /// Parses a concatenated acronym string such as `"HDHR"`.
    ///
    /// Unknown pairs are skipped with a warning.
    pub fn from_acronyms(s: &str) -> Self {
        let mut mods = Self::new();
        let chars: Vec<char> = s.chars().filter(|c| c.is_ascii_alphabetic()).collect();

        for pair in chars.chunks(2) {
            let acronym: String = pair.iter().collect();
            match GameMod::from_acronym(&acronym) {
                Some(m) => mods.insert(m),
                None => log::warn!("MODS: Unknown modifier acronym {:?}", acronym),
            }
        }

        mods
    }
}

impl FromIterator<GameMod> for GameMods {
    fn from_iter<I: IntoIterator<Item = GameMod>>(iter: I) -> Self {
        let mut mods = Self::new();
        for m in iter {
            mods.insert(m);
        }
        mods
    }
}

impl std::fmt::Display for GameMods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "NM");
        }
        for m in self.iter() {
            write!(f, "{}", m.acronym())?;
        }
        Ok(())
    }
}
