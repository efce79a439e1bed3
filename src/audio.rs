//! Sound cue planning
//!
//! Turns simulation events into timed MIDI note cues shaped by the active
//! variation's instrument. No audio backend lives here; the host drains the
//! cues and feeds its own synthesizer.

use crate::sim::SimEvent;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

/// Envelope and filter settings for one instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instrument {
    pub waveform: Waveform,
    /// Seconds to reach full velocity
    pub attack: f32,
    /// Seconds to fade out after the note's duration
    pub release: f32,
    /// Low-pass cutoff (Hz)
    pub filter_freq: f32,
    pub filter_q: f32,
}

impl Instrument {
    const fn new(waveform: Waveform, attack: f32, release: f32, filter_freq: f32, filter_q: f32) -> Self {
        Self {
            waveform,
            attack,
            release,
            filter_freq,
            filter_q,
        }
    }

    /// Look up a built-in instrument by name
    pub fn by_name(name: &str) -> Option<Self> {
        use Waveform::*;
        let instrument = match name {
            "piano" => Self::new(Triangle, 0.01, 0.5, 2000.0, 1.0),
            "synth" => Self::new(Sawtooth, 0.05, 0.3, 3000.0, 5.0),
            "pad" => Self::new(Sine, 0.2, 1.5, 1000.0, 2.0),
            "ambient" => Self::new(Sine, 0.3, 2.0, 800.0, 1.0),
            "pluck" => Self::new(Triangle, 0.005, 0.2, 4000.0, 3.0),
            "marimba" => Self::new(Sine, 0.01, 0.3, 5000.0, 2.0),
            "digital" => Self::new(Square, 0.01, 0.1, 3000.0, 8.0),
            "vocal" => Self::new(Sine, 0.1, 0.4, 1500.0, 2.0),
            "harp" => Self::new(Triangle, 0.005, 1.0, 3000.0, 1.0),
            "guitar" => Self::new(Sawtooth, 0.01, 0.5, 2500.0, 2.0),
            "brass" => Self::new(Sawtooth, 0.1, 0.3, 1200.0, 3.0),
            "water" => Self::new(Sine, 0.1, 0.8, 600.0, 1.0),
            "kalimba" => Self::new(Sine, 0.01, 1.2, 4000.0, 1.0),
            "engine" => Self::new(Square, 0.05, 0.2, 800.0, 4.0),
            _ => return None,
        };
        Some(instrument)
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Self::new(Waveform::Triangle, 0.01, 0.5, 2000.0, 1.0)
    }
}

/// MIDI note number to frequency (A4 = 69 = 440 Hz)
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

/// Output gain shared by every note
const MASTER_GAIN: f32 = 0.5;

/// One note to be played by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteCue {
    pub note: u8,
    pub freq: f32,
    /// Seconds from the moment the cue is drained
    pub delay: f32,
    pub duration: f32,
    /// Peak envelope gain before the master gain
    pub velocity: f32,
    pub instrument: Instrument,
}

impl NoteCue {
    /// When the oscillator can be stopped, relative to the drain time
    pub fn stop_at(&self) -> f32 {
        self.delay + self.duration + self.instrument.release + 0.1
    }

    /// Envelope peak after the master gain
    pub fn peak_gain(&self) -> f32 {
        self.velocity * MASTER_GAIN
    }
}

/// Base note for an element type
fn type_note(kind: usize) -> u8 {
    (60 + kind * 4).min(127) as u8
}

/// Event-to-cue mapper for the game
#[derive(Debug, Clone)]
pub struct SoundSystem {
    enabled: bool,
    instrument_name: String,
    instrument: Instrument,
    queue: Vec<NoteCue>,
}

impl Default for SoundSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundSystem {
    /// Starts disabled with the piano instrument
    pub fn new() -> Self {
        Self {
            enabled: false,
            instrument_name: "piano".to_string(),
            instrument: Instrument::default(),
            queue: Vec::new(),
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop producing cues and drop anything still queued
    pub fn disable(&mut self) {
        self.enabled = false;
        self.queue.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch instrument; unknown names keep the current one
    pub fn set_instrument(&mut self, name: &str) {
        match Instrument::by_name(name) {
            Some(instrument) => {
                self.instrument = instrument;
                self.instrument_name = name.to_string();
            }
            None => log::warn!("Unknown instrument '{name}', keeping {}", self.instrument_name),
        }
    }

    pub fn instrument_name(&self) -> &str {
        &self.instrument_name
    }

    /// Queue the cues for one simulation event
    pub fn handle(&mut self, event: &SimEvent) {
        // Instrument follows the variation even while muted
        if let SimEvent::RoundStarted { instrument, .. } = event {
            self.set_instrument(instrument);
        }
        if !self.enabled {
            return;
        }

        match event {
            SimEvent::RoundStarted { .. } | SimEvent::Sampled { .. } => {}
            SimEvent::Converted { from, to } => {
                self.push(type_note(*from), 0.0, 0.1, 0.4);
                self.push(type_note(*to), 0.1, 0.2, 0.6);
            }
            SimEvent::Bounced { kind } => {
                self.push(type_note(*kind), 0.0, 0.1, 0.3);
            }
            SimEvent::RoundComplete(record) => {
                let base = type_note(record.winner);
                for (i, step) in [0u8, 4, 7, 12].into_iter().enumerate() {
                    self.push(base.saturating_add(step).min(127), i as f32 * 0.15, 0.3, 0.7);
                }
            }
        }
    }

    fn push(&mut self, note: u8, delay: f32, duration: f32, velocity: f32) {
        self.queue.push(NoteCue {
            note,
            freq: midi_to_freq(note),
            delay,
            duration,
            velocity,
            instrument: self.instrument,
        });
    }

    /// Take every cue queued since the last call
    pub fn drain(&mut self) -> Vec<NoteCue> {
        std::mem::take(&mut self.queue)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::RoundRecord;

    fn started(instrument: &str) -> SimEvent {
        SimEvent::RoundStarted {
            round: 1,
            variation: "test".to_string(),
            instrument: instrument.to_string(),
        }
    }

    #[test]
    fn test_midi_to_freq() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-2);
        assert!((midi_to_freq(60) - 261.63).abs() < 1e-2);
    }

    #[test]
    fn test_disabled_drops_events() {
        let mut sound = SoundSystem::new();
        sound.handle(&SimEvent::Bounced { kind: 0 });
        assert_eq!(sound.pending(), 0);
    }

    #[test]
    fn test_conversion_plays_two_notes() {
        let mut sound = SoundSystem::new();
        sound.enable();
        sound.handle(&SimEvent::Converted { from: 1, to: 0 });
        let cues = sound.drain();
        assert_eq!(cues.len(), 2);
        assert_eq!((cues[0].note, cues[0].delay, cues[0].duration), (64, 0.0, 0.1));
        assert_eq!((cues[1].note, cues[1].delay, cues[1].duration), (60, 0.1, 0.2));
        assert_eq!(cues[1].velocity, 0.6);
        assert!((cues[1].peak_gain() - 0.3).abs() < 1e-6);
        assert!(sound.drain().is_empty());
    }

    #[test]
    fn test_victory_arpeggio() {
        let mut sound = SoundSystem::new();
        sound.enable();
        sound.handle(&SimEvent::RoundComplete(RoundRecord {
            round: 3,
            variation: "classic".to_string(),
            winner: 2,
            winner_glyph: "✂️".to_string(),
            winner_owner: None,
            counts: vec![0, 0, 30],
            duration: 12.0,
        }));
        let cues = sound.drain();
        let notes: Vec<u8> = cues.iter().map(|c| c.note).collect();
        assert_eq!(notes, vec![68, 72, 75, 80]);
        assert!((cues[3].delay - 0.45).abs() < 1e-6);
        assert!(cues.iter().all(|c| c.velocity == 0.7));
    }

    #[test]
    fn test_instrument_follows_round_start() {
        let mut sound = SoundSystem::new();
        sound.handle(&started("kalimba"));
        assert_eq!(sound.instrument_name(), "kalimba");

        sound.enable();
        sound.handle(&SimEvent::Bounced { kind: 1 });
        let cue = sound.drain()[0];
        assert_eq!(cue.instrument.waveform, Waveform::Sine);
        assert_eq!(cue.instrument.release, 1.2);
        assert!((cue.stop_at() - 1.4).abs() < 1e-6);

        sound.set_instrument("theremin");
        assert_eq!(sound.instrument_name(), "kalimba");
    }

    #[test]
    fn test_disable_clears_queue() {
        let mut sound = SoundSystem::new();
        sound.enable();
        sound.handle(&SimEvent::Bounced { kind: 0 });
        sound.disable();
        assert_eq!(sound.pending(), 0);
        assert!(!sound.is_enabled());
    }
}
