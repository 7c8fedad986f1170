//! Daily accent watch face
//!
//! Shows the time and date on top of two colored panels that slide in when
//! the face starts. The panel colors change once a day and the choice
//! survives restarts through a small key-value store.
#![cfg_attr(not(test), no_std)]

pub mod animation;
pub mod clock;
pub mod face;
pub mod format;
pub mod palette;
pub mod persist;
pub mod picker;

pub use face::{AccentFace, FaceConfig, TickOutcome};
pub use format::ClockStyle;
pub use palette::AccentPair;
pub use persist::{KeyValueStore, MemoryStore, SectorBackend, SectorImage, SectorStore};
pub use picker::{pick_daily_color, ColorChoice, DayOfWeek, PersistedState};

/// Display width in pixels
pub const SCREEN_W: u32 = 240;
/// Display height in pixels
pub const SCREEN_H: u32 = 240;
