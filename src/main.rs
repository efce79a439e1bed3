//! RPS Arena headless runner
//!
//! Plays rounds without a window and prints the round history. Useful for
//! checking variations, seeds and owner setups from the terminal.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rps_arena::audio::SoundSystem;
use rps_arena::consts::SIM_DT;
use rps_arena::settings::parse_owner_names;
use rps_arena::sim::{RoundPhase, RuleTable, SimEvent, SimState, TickInput, shutdown, tick};
use rps_arena::{ConfigError, Settings};

/// Headless RPS Arena - run battle rounds and report the winners
#[derive(Parser, Debug)]
#[command(name = "rps-arena")]
#[command(about = "Run rock-paper-scissors battle rounds headless")]
struct Args {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Variation to play (overrides the settings file)
    #[arg(long)]
    variation: Option<String>,

    /// Pick a random variation after every round
    #[arg(long)]
    random_variation: bool,

    /// Comma or newline separated owner names; enables the leaderboard
    #[arg(long)]
    owners: Option<String>,

    /// Number of rounds to play
    #[arg(long, default_value_t = 3)]
    rounds: u32,

    /// Frame budget for the whole run (60 frames per simulated second)
    #[arg(long, default_value_t = 2_000_000)]
    max_frames: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Count planned sound cues
    #[arg(long)]
    sound: bool,

    /// List the built-in variations and exit
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ConfigError> {
    let rules = RuleTable::builtin()?;

    if args.list {
        for name in rules.names() {
            let variation = rules.get(name)?;
            println!(
                "{:<14} {} ({} types, {})",
                name,
                variation.glyphs().join(" "),
                variation.element_count(),
                variation.instrument()
            );
        }
        return Ok(());
    }

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(variation) = args.variation {
        settings.variation = variation;
    }
    if args.random_variation {
        settings.random_variation = true;
    }
    if let Some(owners) = &args.owners {
        settings.owners_enabled = true;
        settings.owner_names = parse_owner_names(&owners.replace(',', "\n"));
    }
    settings.sound_enabled |= args.sound;

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("RPS Arena starting (seed {seed})");

    let mut state = SimState::new(settings, rules, seed)?;
    let mut sound = SoundSystem::new();
    if state.settings.sound_enabled {
        sound.enable();
    }

    let input = TickInput::default();
    let mut cues = 0usize;
    let mut loudest = 0.0f32;
    let mut completed = 0u32;
    let mut frames = 0u64;

    while completed < args.rounds && frames < args.max_frames {
        tick(&mut state, &input, SIM_DT);
        frames += 1;

        for event in state.drain_events() {
            sound.handle(&event);
            if let SimEvent::RoundComplete(record) = &event {
                completed += 1;
                println!(
                    "Round {:>3}  {:<14} {} wins in {:>6.1}s (peak type count {}){}",
                    record.round,
                    record.variation,
                    record.winner_glyph,
                    record.duration,
                    state.chart.peak(),
                    record
                        .winner_owner
                        .as_deref()
                        .map(|o| format!("  owner: {o}"))
                        .unwrap_or_default()
                );
                if let Some(tracker) = &state.owners {
                    for rating in tracker.ratings() {
                        println!(
                            "    #{:<2} {:<16} {:>4}{}",
                            rating.rank,
                            rating.name,
                            rating.count,
                            if rating.eliminated { "  (eliminated)" } else { "" }
                        );
                    }
                }
            }
        }
        for cue in sound.drain() {
            cues += 1;
            loudest = loudest.max(cue.peak_gain());
        }
    }

    if completed < args.rounds {
        log::warn!(
            "Frame budget exhausted after {completed} of {} rounds",
            args.rounds
        );
        if state.phase == RoundPhase::Running {
            println!(
                "Round {:>3} unfinished after {:.1}s, counts {:?}",
                state.round_index, state.round_time, state.counts
            );
        }
    }
    shutdown(&mut state);

    println!();
    println!("Last {} rounds (most recent first):", state.history.len());
    for record in state.history.entries() {
        println!(
            "  #{:<3} {:<14} {} {:>6.1}s  {:?}",
            record.round, record.variation, record.winner_glyph, record.duration, record.counts
        );
    }
    if !state.settings.random_variation {
        let variation = state.variation();
        let wins = state.history.wins_by_type(variation.element_count());
        let tally: Vec<String> = wins
            .iter()
            .enumerate()
            .map(|(kind, n)| format!("{} x{n}", variation.glyph(kind)))
            .collect();
        println!("Wins by type: {}", tally.join(", "));
    }
    if sound.is_enabled() {
        println!("Sound cues planned: {cues} (loudest gain {loudest:.2})");
    }
    log::info!("Finished {completed} rounds in {frames} frames");
    Ok(())
}
