//! Simulation state and core types
//!
//! Everything the tick loop mutates lives in [`SimState`]; collaborators only
//! get read access through views and drained events.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::chart::PopulationChart;
use super::grid::SpatialGrid;
use super::owners::OwnerTracker;
use super::round;
use super::rules::{RuleTable, Variation};
use crate::consts::*;
use crate::error::ConfigError;
use crate::history::{RoundHistory, RoundRecord};
use crate::settings::Settings;

/// Round lifecycle. Pausing is tracked separately in [`SimState::paused`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Entities move and collide
    Running,
    /// One type has won; frozen until the reset timer fires
    Completing { reset_in: f32 },
    /// Torn down; no further ticks or timers run
    Stopped,
}

/// One mobile item in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Element type index into the active variation
    pub kind: usize,
    pub radius: f32,
    /// Rotation angle (radians)
    pub rotation: f32,
    /// Rotation speed (radians per tick)
    pub spin: f32,
    pub owner: Option<String>,
}

impl Entity {
    /// A motionless entity at a fixed position
    pub fn new(id: u32, pos: Vec2, kind: usize, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            kind,
            radius,
            rotation: 0.0,
            spin: 0.0,
            owner: None,
        }
    }

    /// Spawn at a random position with random heading and spin
    pub fn spawn(id: u32, kind: usize, radius: f32, arena: &Arena, rng: &mut impl Rng) -> Self {
        let pos = arena.random_position(radius, rng);
        let vel = Vec2::new(
            rng.random_range(-INITIAL_SPEED_MAX..INITIAL_SPEED_MAX),
            rng.random_range(-INITIAL_SPEED_MAX..INITIAL_SPEED_MAX),
        );
        Self {
            id,
            pos,
            vel,
            kind,
            radius,
            rotation: rng.random_range(0.0..std::f32::consts::TAU),
            spin: random_spin(WALL_SPIN_JITTER, rng),
            owner: None,
        }
    }

    /// Centers closer than the sum of radii
    #[inline]
    pub fn collides_with(&self, other: &Entity) -> bool {
        let reach = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < reach * reach
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.vel.length_squared()
    }
}

/// Uniform spin in `[-jitter, jitter)`
#[inline]
pub fn random_spin(jitter: f32, rng: &mut impl Rng) -> f32 {
    rng.random_range(-jitter..jitter)
}

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView<'a> {
    pub pos: Vec2,
    pub rotation: f32,
    pub kind: usize,
    pub glyph: Option<&'a str>,
    pub owner: Option<&'a str>,
}

/// Notifications for hosts (history panel, toasts, sound)
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    RoundStarted {
        round: u32,
        variation: String,
        instrument: String,
    },
    /// A loser of type `from` was converted to `to`
    Converted { from: usize, to: usize },
    /// Two entities bounced; `kind` is the first entity's type
    Bounced { kind: usize },
    /// Periodic population sample; owner ratings are refreshed at the same time
    Sampled { time: f32, counts: Vec<u32> },
    RoundComplete(RoundRecord),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub settings: Settings,
    rules: RuleTable,
    pub(crate) variation: Variation,
    pub arena: Arena,
    /// Flat entity storage, replaced wholesale each round
    pub entities: Vec<Entity>,
    /// Live per-type counts
    pub counts: Vec<u32>,
    pub phase: RoundPhase,
    /// Orthogonal to the phase: no ticks run while paused
    pub paused: bool,
    /// Number of rounds started this session
    pub round_index: u32,
    /// Seconds of simulation since the round started
    pub round_time: f32,
    pub(crate) since_sample: f32,
    /// Types populated when the round started
    pub(crate) initial_types: usize,
    /// Variation to switch to when the next round starts
    pub pending_variation: Option<String>,
    /// Winner shown while the round is completing
    pub last_winner: Option<RoundRecord>,
    pub history: RoundHistory,
    pub owners: Option<OwnerTracker>,
    pub chart: PopulationChart,
    pub(crate) grid: SpatialGrid,
    pub(crate) neighbors: Vec<usize>,
    pub(crate) events: Vec<SimEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl SimState {
    /// Validate settings and start the first round with a seeded RNG
    pub fn new(settings: Settings, rules: RuleTable, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(settings, rules, seed, Pcg32::seed_from_u64(seed))
    }

    /// Same as [`SimState::new`] with a caller-supplied RNG
    pub fn with_rng(
        settings: Settings,
        rules: RuleTable,
        seed: u64,
        rng: Pcg32,
    ) -> Result<Self, ConfigError> {
        settings.validate(&rules)?;
        let variation = rules.get(&settings.variation)?.clone();
        let arena = Arena::new(settings.arena_width, settings.arena_height);
        let grid = SpatialGrid::new(settings.effective_cell_size(), arena.width, arena.height)?;
        let owners = settings
            .ownership_active()
            .then(|| OwnerTracker::new(settings.leaderboard_size));
        if settings.owners_enabled && owners.is_none() {
            log::warn!("Owner tracking enabled without owner names - leaderboard disabled");
        }

        let mut state = Self {
            seed,
            settings,
            rules,
            variation,
            arena,
            entities: Vec::new(),
            counts: Vec::new(),
            phase: RoundPhase::Running,
            paused: false,
            round_index: 0,
            round_time: 0.0,
            since_sample: 0.0,
            initial_types: 0,
            pending_variation: None,
            last_winner: None,
            history: RoundHistory::new(),
            owners,
            chart: PopulationChart::default(),
            grid,
            neighbors: Vec::new(),
            events: Vec::new(),
            rng,
            next_id: 1,
        };
        round::start_round(&mut state);
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Variation the current round is played with
    pub fn variation(&self) -> &Variation {
        &self.variation
    }

    pub fn total_entities(&self) -> usize {
        self.entities.len()
    }

    /// Recount entities per type
    pub fn recount(&mut self) {
        self.counts.clear();
        self.counts.resize(self.variation.element_count(), 0);
        for entity in &self.entities {
            if let Some(c) = self.counts.get_mut(entity.kind) {
                *c += 1;
            }
        }
    }

    /// Renderer snapshot, in storage order
    pub fn snapshot(&self) -> impl Iterator<Item = EntityView<'_>> {
        let glyphs = self.variation.glyphs();
        self.entities.iter().map(move |e| EntityView {
            pos: e.pos,
            rotation: e.rotation,
            kind: e.kind,
            glyph: glyphs.get(e.kind).map(String::as_str),
            owner: e.owner.as_deref(),
        })
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running && !self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(settings: Settings) -> Result<SimState, ConfigError> {
        SimState::new(settings, RuleTable::builtin().unwrap(), 17)
    }

    #[test]
    fn test_unknown_variation_rejected_before_first_round() {
        let result = state(Settings {
            variation: "tic_tac_toe".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::UnknownVariation(_))));
    }

    #[test]
    fn test_snapshot_exposes_glyphs_and_owners() {
        let s = state(Settings {
            owners_enabled: true,
            owner_names: vec!["kim".to_string()],
            ..Default::default()
        })
        .unwrap();

        let views: Vec<EntityView> = s.snapshot().collect();
        assert_eq!(views.len(), 30);
        assert_eq!(views[0].glyph, Some("🗿"));
        assert_eq!(views[29].glyph, Some("✂️"));
        assert!(views.iter().all(|v| v.owner == Some("kim")));
        assert_eq!(views[5].pos, s.entities[5].pos);
    }

    #[test]
    fn test_owners_need_names() {
        let s = state(Settings {
            owners_enabled: true,
            ..Default::default()
        })
        .unwrap();
        assert!(s.owners.is_none());
        assert!(s.entities.iter().all(|e| e.owner.is_none()));
    }

    #[test]
    fn test_spawned_entities_are_valid() {
        let s = state(Settings::default()).unwrap();
        let mut ids: Vec<u32> = s.entities.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 30);
        for e in &s.entities {
            assert!(s.arena.contains(e));
            assert!(e.vel.x.abs() < INITIAL_SPEED_MAX && e.vel.y.abs() < INITIAL_SPEED_MAX);
            assert!((0.0..std::f32::consts::TAU).contains(&e.rotation));
            assert!(e.spin.abs() <= WALL_SPIN_JITTER);
        }
        assert!(s.is_running());
    }

    #[test]
    fn test_recount_tracks_kind_changes() {
        let mut s = state(Settings::default()).unwrap();
        s.entities[0].kind = 2;
        s.recount();
        assert_eq!(s.counts, vec![9, 10, 11]);
        assert_eq!(s.counts.iter().sum::<u32>() as usize, s.total_entities());
    }
}
