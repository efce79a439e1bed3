//! Round lifecycle
//!
//! `Running` until a single type holds the whole population, then
//! `Completing` for a fixed delay while the winner is shown, then a fresh
//! round. Pausing is orthogonal and handled by the tick loop.

use rand::Rng;

use super::grid::check_size;
use super::owners::{assign_owners, pick_winning_owner};
use super::state::{Entity, RoundPhase, SimEvent, SimState};
use crate::error::ConfigError;
use crate::history::RoundRecord;

/// The single populated type, if exactly one remains.
///
/// Only meaningful when the round started with at least two populated
/// types; a population that began single-typed can never be decided.
pub fn detect_winner(counts: &[u32], initial_types: usize) -> Option<usize> {
    if initial_types < 2 {
        return None;
    }
    let mut populated = counts.iter().enumerate().filter(|&(_, &c)| c > 0);
    match (populated.next(), populated.next()) {
        (Some((kind, _)), None) => Some(kind),
        _ => None,
    }
}

/// Enter `Running`: apply any queued variation and respawn everything
pub fn start_round(state: &mut SimState) {
    state.last_winner = None;

    if let Some(next) = state.pending_variation.take() {
        match state.rules().get(&next).cloned() {
            Ok(variation) => {
                log::info!("Switching variation: {} -> {}", state.variation.name(), next);
                state.variation = variation;
                state.settings.variation = next;
            }
            Err(e) => log::warn!("Ignoring queued variation: {e}"),
        }
    }

    spawn_entities(state);

    state.round_index += 1;
    state.round_time = 0.0;
    state.since_sample = 0.0;
    state.phase = RoundPhase::Running;

    state.recount();
    state.initial_types = state.counts.iter().filter(|&&c| c > 0).count();
    state.chart.reset(&state.counts);
    if let Some(tracker) = state.owners.as_mut() {
        tracker.reset();
        tracker.sample(&state.entities);
    }

    log::info!(
        "Round {} started: {} ({} entities, {} types)",
        state.round_index,
        state.variation.name(),
        state.entities.len(),
        state.variation.element_count()
    );
    state.events.push(SimEvent::RoundStarted {
        round: state.round_index,
        variation: state.variation.name().to_string(),
        instrument: state.variation.instrument().to_string(),
    });
}

/// Replace the entity set: equal count per type, owners round-robin
fn spawn_entities(state: &mut SimState) {
    let per_type = state.settings.entities_per_type;
    let radius = state.settings.entity_radius;
    let kinds = state.variation.element_count();

    state.entities.clear();
    state.entities.reserve(kinds * per_type as usize);
    for kind in 0..kinds {
        for _ in 0..per_type {
            let id = state.next_entity_id();
            let entity = Entity::spawn(id, kind, radius, &state.arena, &mut state.rng);
            state.entities.push(entity);
        }
    }

    if state.owners.is_some() {
        assign_owners(
            &state.settings.owner_names,
            &mut state.entities,
            &mut state.rng,
        );
    }
}

/// Freeze the round with `winner` and arm the reset timer
pub fn complete_round(state: &mut SimState, winner: usize) {
    let duration = state.round_time;
    let winner_owner = if state.owners.is_some() {
        pick_winning_owner(&state.entities, &mut state.rng)
    } else {
        None
    };

    // Final samples so the chart and leaderboard show the finished state
    state.chart.record(duration, &state.counts);
    if let Some(tracker) = state.owners.as_mut() {
        tracker.sample(&state.entities);
    }

    let record = RoundRecord {
        round: state.round_index,
        variation: state.variation.name().to_string(),
        winner,
        winner_glyph: state.variation.glyph(winner),
        winner_owner,
        counts: state.counts.clone(),
        duration,
    };
    log::info!(
        "Round {} complete: {} wins in {:.1}s{}",
        record.round,
        record.winner_glyph,
        record.duration,
        record
            .winner_owner
            .as_deref()
            .map(|o| format!(" (owner {o})"))
            .unwrap_or_default()
    );

    if state.settings.random_variation {
        state.pending_variation = choose_variation(state);
    }

    state.history.push(record.clone());
    state.last_winner = Some(record.clone());
    state.events.push(SimEvent::RoundComplete(record));
    state.phase = RoundPhase::Completing {
        reset_in: state.settings.reset_delay,
    };
}

/// Random variation name for the next round (may repeat the current one)
fn choose_variation(state: &mut SimState) -> Option<String> {
    let count = state.rules().len();
    if count == 0 {
        return None;
    }
    let pick = state.rng.random_range(0..count);
    state.rules().names().nth(pick).map(str::to_string)
}

/// Count down the reset timer; starts the next round when it fires.
/// Returns true if a new round was started.
pub fn advance_reset(state: &mut SimState, dt: f32) -> bool {
    let RoundPhase::Completing { reset_in } = state.phase else {
        return false;
    };
    let remaining = reset_in - dt;
    if remaining > 0.0 {
        state.phase = RoundPhase::Completing {
            reset_in: remaining,
        };
        return false;
    }
    start_round(state);
    true
}

/// Abandon the current round (and any pending reset) and start over
pub fn restart(state: &mut SimState) {
    if state.phase == RoundPhase::Stopped {
        return;
    }
    state.paused = false;
    start_round(state);
}

/// Switch variation immediately, restarting the round
pub fn set_variation(state: &mut SimState, name: &str) -> Result<(), ConfigError> {
    state.rules().get(name)?;
    state.pending_variation = Some(name.to_string());
    restart(state);
    Ok(())
}

/// Change arena dimensions, pulling entities back inside
pub fn resize(state: &mut SimState, width: f32, height: f32) -> Result<(), ConfigError> {
    let radius = state.settings.entity_radius;
    if !(width.is_finite() && height.is_finite()) || width < radius * 2.0 || height < radius * 2.0
    {
        return Err(ConfigError::Invalid {
            field: "arena",
            reason: "entities do not fit inside the arena",
        });
    }
    check_size(state.grid.cell_size(), width, height)?;
    state.arena.width = width;
    state.arena.height = height;
    state.settings.arena_width = width;
    state.settings.arena_height = height;
    for entity in &mut state.entities {
        entity.pos = state.arena.clamp(entity.pos, entity.radius);
    }
    state.grid.resize(width, height);
    Ok(())
}

/// Tear down: cancel the reset timer and stop all ticking
pub fn shutdown(state: &mut SimState) {
    if state.phase != RoundPhase::Stopped {
        log::info!("Simulation stopped after {} rounds", state.round_index);
    }
    state.phase = RoundPhase::Stopped;
}
