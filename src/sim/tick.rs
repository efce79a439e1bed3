//! Per-frame simulation tick
//!
//! One call per host frame. Running rounds go through
//! Motion -> Index rebuild -> Collision -> Round check -> Sampling.

use super::arena::integrate;
use super::collision::resolve_collisions;
use super::round;
use super::state::{RoundPhase, SimEvent, SimState};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Abandon the round and start a fresh one
    pub restart: bool,
}

/// Advance the simulation by one frame of `dt` wall-clock seconds.
///
/// Motion is per tick; `dt` only drives the round clock, the sampling
/// cadence and the reset timer.
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) {
    if state.phase == RoundPhase::Stopped {
        return;
    }

    // Restart replaces the entity set before anything else touches it
    if input.restart {
        round::restart(state);
    }
    if input.pause {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
    }

    // Negative or NaN deltas count as no time
    let dt = dt.max(0.0);

    match state.phase {
        // The reset timer keeps running while paused so a finished round
        // never gets stuck on screen
        RoundPhase::Completing { .. } => {
            round::advance_reset(state, dt);
        }
        // Wall clock: paused time still counts toward the round duration
        RoundPhase::Running if state.paused => state.round_time += dt,
        RoundPhase::Running => step(state, dt),
        RoundPhase::Stopped => {}
    }
}

/// One simulation step of a running round
fn step(state: &mut SimState, dt: f32) {
    state.round_time += dt;

    // Motion
    let speed = state.settings.speed;
    for entity in &mut state.entities {
        integrate(entity, &state.arena, speed, &mut state.rng);
    }

    // Index rebuild
    state.grid.rebuild(state.entities.iter().map(|e| &e.pos));

    // Collision
    resolve_collisions(
        &mut state.entities,
        &state.grid,
        &state.variation,
        &mut state.rng,
        &mut state.neighbors,
        &mut state.events,
    );
    // Separation can nudge an entity past a wall
    for entity in &mut state.entities {
        entity.pos = state.arena.clamp(entity.pos, entity.radius);
    }

    // Round check
    state.recount();
    if let Some(winner) = round::detect_winner(&state.counts, state.initial_types) {
        round::complete_round(state, winner);
        return;
    }

    // Sampling
    state.since_sample += dt;
    if state.since_sample >= state.settings.sample_interval {
        state.since_sample = 0.0;
        state.chart.record(state.round_time, &state.counts);
        if let Some(tracker) = state.owners.as_mut() {
            tracker.sample(&state.entities);
        }
        log::debug!("t={:.1}s counts={:?}", state.round_time, state.counts);
        state.events.push(SimEvent::Sampled {
            time: state.round_time,
            counts: state.counts.clone(),
        });
    }
}
