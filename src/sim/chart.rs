//! Population chart samples
//!
//! Per-round series of type counts, taken on the sampling cadence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSample {
    /// Seconds since round start
    pub time: f32,
    pub counts: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationChart {
    samples: Vec<PopulationSample>,
}

impl PopulationChart {
    /// Start a new series from the initial counts at time 0
    pub fn reset(&mut self, initial: &[u32]) {
        self.samples.clear();
        self.record(0.0, initial);
    }

    pub fn record(&mut self, time: f32, counts: &[u32]) {
        self.samples.push(PopulationSample {
            time,
            counts: counts.to_vec(),
        });
    }

    pub fn samples(&self) -> &[PopulationSample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&PopulationSample> {
        self.samples.last()
    }

    /// Highest count any type reached this round
    pub fn peak(&self) -> u32 {
        self.samples
            .iter()
            .flat_map(|s| s.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}
