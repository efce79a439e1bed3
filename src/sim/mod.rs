//! Simulation module
//!
//! All battle logic lives here. Given the same seed and settings a run
//! replays exactly:
//! - Seeded RNG only, threaded explicitly through every random draw
//! - Stable iteration order (storage order, sorted neighbor lists)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod chart;
pub mod collision;
pub mod grid;
pub mod owners;
pub mod round;
pub mod rules;
pub mod state;
pub mod tick;

pub use arena::{Arena, integrate};
pub use chart::{PopulationChart, PopulationSample};
pub use collision::{PairOutcome, bounce, resolve_collisions, resolve_pair};
pub use grid::SpatialGrid;
pub use owners::{OwnerRating, OwnerTracker, assign_owners, pick_winning_owner};
pub use round::{detect_winner, resize, restart, set_variation, shutdown};
pub use rules::{RuleTable, Variation};
pub use state::{Entity, EntityView, RoundPhase, SimEvent, SimState};
pub use tick::{TickInput, tick};
