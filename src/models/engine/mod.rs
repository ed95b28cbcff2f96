pub mod beatmap;
pub mod difficulty;
pub mod hit_object;
pub mod hit_window;
pub mod loader;

pub use beatmap::{Beatmap, BreakPeriod, ComboColor, DifficultyParams, TimingPoint};
pub use difficulty::ResolvedDifficulty;
pub use hit_object::{HitObject, HitObjectKind, Pos, SliderData};
pub use hit_window::HitWindow;
pub use loader::{ChartError, load_map, load_map_from_bytes};
