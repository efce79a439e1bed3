//! RPS Arena - a rock-paper-scissors battle simulation
//!
//! Core modules:
//! - `sim`: Simulation engine (motion, spatial grid, collisions, rounds, owners)
//! - `settings`: Configuration inputs
//! - `history`: Completed round records
//! - `audio`: Sound cue planning for the host synthesizer

pub mod audio;
pub mod error;
pub mod history;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, RuleError};
pub use history::{RoundHistory, RoundRecord};
pub use settings::Settings;

/// Simulation configuration constants
pub mod consts {
    /// Frame timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena defaults
    pub const DEFAULT_ARENA_WIDTH: f32 = 800.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

    /// Entity defaults
    pub const DEFAULT_ENTITY_RADIUS: f32 = 5.0;
    /// Initial velocity components are uniform in (-MAX, MAX)
    pub const INITIAL_SPEED_MAX: f32 = 1.0;
    /// Spin re-randomized on wall contact (rad/tick, symmetric)
    pub const WALL_SPIN_JITTER: f32 = 0.05;
    /// Spin re-randomized on entity bounce (rad/tick, symmetric)
    pub const BOUNCE_SPIN_JITTER: f32 = 0.1;

    /// Delay between a round ending and the next one starting (seconds)
    pub const ROUND_RESET_DELAY: f32 = 2.0;
    /// Largest spatial grid (cells) an arena may need
    pub const MAX_GRID_CELLS: usize = 1 << 22;

    /// Rounds kept in history
    pub const HISTORY_CAPACITY: usize = 10;
}
