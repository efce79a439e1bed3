//! Round history
//!
//! Session-only record of completed rounds, newest first, capped at 10.

use serde::{Deserialize, Serialize};

use crate::consts::HISTORY_CAPACITY;

/// A completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number within the session
    pub round: u32,
    /// Variation the round was played with
    pub variation: String,
    /// Winning element type
    pub winner: usize,
    /// Winning type's glyph
    pub winner_glyph: String,
    /// Owner credited with the win (ownership tracking only)
    pub winner_owner: Option<String>,
    /// Final per-type counts
    pub counts: Vec<u32>,
    /// Seconds from round start to termination
    pub duration: f32,
}

impl RoundRecord {
    /// Entities held by the winning type at the end
    pub fn winner_count(&self) -> u32 {
        self.counts.get(self.winner).copied().unwrap_or(0)
    }

    /// Total population of the round
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Bounded list of completed rounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundHistory {
    entries: Vec<RoundRecord>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Push a record to the front, dropping the oldest beyond capacity
    pub fn push(&mut self, record: RoundRecord) {
        self.entries.insert(0, record);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Records, most recent first
    pub fn entries(&self) -> &[RoundRecord] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&RoundRecord> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wins per element type across the kept history
    pub fn wins_by_type(&self, element_count: usize) -> Vec<u32> {
        let mut wins = vec![0; element_count];
        for entry in &self.entries {
            if let Some(w) = wins.get_mut(entry.winner) {
                *w += 1;
            }
        }
        wins
    }
}
