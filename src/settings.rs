//! Simulation settings and preferences
//!
//! Persisted as JSON next to the binary; every field has a default so older
//! files keep loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::grid;
use crate::sim::rules::RuleTable;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Population ===
    /// Entities spawned per element type at round start
    pub entities_per_type: u32,
    /// Entity radius (pixels)
    pub entity_radius: f32,

    // === Motion ===
    /// Global speed multiplier applied to every velocity
    pub speed: f32,

    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Spatial grid cell size; raised to the collision distance if smaller
    pub cell_size: Option<f32>,

    // === Rounds ===
    /// Active variation name
    pub variation: String,
    /// Pick a random variation for each new round
    pub random_variation: bool,
    /// Seconds between round end and the next round
    pub reset_delay: f32,
    /// Seconds between chart/leaderboard samples
    pub sample_interval: f32,

    // === Owners ===
    /// Assign owner names to entities and track a leaderboard
    pub owners_enabled: bool,
    pub owner_names: Vec<String>,
    /// Leaderboard rows kept after sorting
    pub leaderboard_size: usize,

    // === Audio ===
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            entities_per_type: 10,
            entity_radius: DEFAULT_ENTITY_RADIUS,

            speed: 1.0,

            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,
            cell_size: None,

            variation: "classic".to_string(),
            random_variation: false,
            reset_delay: ROUND_RESET_DELAY,
            sample_interval: 0.5,

            owners_enabled: false,
            owner_names: Vec::new(),
            leaderboard_size: 10,

            // Muted by default
            sound_enabled: false,
        }
    }
}

impl Settings {
    /// Check every field against the rule table. Called before any round
    /// is initialized so a bad config never reaches the tick loop.
    pub fn validate(&self, rules: &RuleTable) -> Result<(), ConfigError> {
        rules.get(&self.variation)?;

        if self.entities_per_type == 0 {
            return Err(ConfigError::Invalid {
                field: "entities_per_type",
                reason: "must be at least 1",
            });
        }
        positive("entity_radius", self.entity_radius)?;
        positive("speed", self.speed)?;
        positive("arena_width", self.arena_width)?;
        positive("arena_height", self.arena_height)?;
        positive("sample_interval", self.sample_interval)?;
        if !self.reset_delay.is_finite() || self.reset_delay < 0.0 {
            return Err(ConfigError::Invalid {
                field: "reset_delay",
                reason: "must be a non-negative number",
            });
        }
        if let Some(cell) = self.cell_size {
            positive("cell_size", cell)?;
        }
        if self.arena_width < self.entity_radius * 2.0
            || self.arena_height < self.entity_radius * 2.0
        {
            return Err(ConfigError::Invalid {
                field: "entity_radius",
                reason: "entities do not fit inside the arena",
            });
        }
        grid::check_size(
            self.effective_cell_size(),
            self.arena_width,
            self.arena_height,
        )?;
        if self.leaderboard_size == 0 {
            return Err(ConfigError::Invalid {
                field: "leaderboard_size",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Effective grid cell size (never below the collision distance)
    pub fn effective_cell_size(&self) -> f32 {
        let min = self.entity_radius * 2.0;
        self.cell_size.map_or(min, |c| c.max(min))
    }

    /// Whether ownership tracking actually runs
    pub fn ownership_active(&self) -> bool {
        self.owners_enabled && !self.owner_names.is_empty()
    }

    /// Replace owner names from newline-separated text (blank lines dropped)
    pub fn set_owner_names_from_text(&mut self, text: &str) {
        self.owner_names = parse_owner_names(text);
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a positive number",
        })
    }
}

/// Split a player list (one name per line), trimming and skipping blanks
pub fn parse_owner_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
