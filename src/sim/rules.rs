//! Variation rule tables
//!
//! A variation names a set of element types and the dominance relation
//! between them. Tables are loaded once, validated, and never mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RuleError};

/// Built-in variations shipped with the game
const BUILTIN_VARIATIONS: &str = include_str!("variations.json");

/// On-disk shape of a single variation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawVariation {
    elements: usize,
    beats: Vec<Vec<usize>>,
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    instrument: Option<String>,
}

/// A validated variation with a precomputed defeat matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    name: String,
    elements: usize,
    /// Row-major `elements x elements`, `defeats[a * elements + b]`
    defeats: Vec<bool>,
    glyphs: Vec<String>,
    instrument: String,
}

impl Variation {
    /// Build and validate a variation from its beat lists
    pub fn new(
        name: impl Into<String>,
        elements: usize,
        beats: &[Vec<usize>],
        glyphs: Vec<String>,
        instrument: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        if elements < 2 {
            return Err(RuleError::TooFewElements {
                variation: name,
                elements,
            });
        }
        if beats.len() != elements {
            return Err(RuleError::RowCountMismatch {
                variation: name,
                elements,
                rows: beats.len(),
            });
        }
        if !glyphs.is_empty() && glyphs.len() != elements {
            return Err(RuleError::GlyphCountMismatch {
                variation: name,
                elements,
                glyphs: glyphs.len(),
            });
        }

        let mut defeats = vec![false; elements * elements];
        for (from, row) in beats.iter().enumerate() {
            for &to in row {
                if to >= elements {
                    return Err(RuleError::IndexOutOfRange {
                        variation: name,
                        from,
                        to,
                    });
                }
                if to == from {
                    return Err(RuleError::SelfDefeat {
                        variation: name,
                        kind: from,
                    });
                }
                defeats[from * elements + to] = true;
            }
        }

        for a in 0..elements {
            for b in (a + 1)..elements {
                if defeats[a * elements + b] && defeats[b * elements + a] {
                    return Err(RuleError::MutualDefeat {
                        variation: name,
                        a,
                        b,
                    });
                }
            }
        }

        Ok(Self {
            name,
            elements,
            defeats,
            glyphs,
            instrument: instrument.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of element types
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// Whether type `a` converts type `b` on contact
    #[inline]
    pub fn defeats(&self, a: usize, b: usize) -> bool {
        a < self.elements && b < self.elements && self.defeats[a * self.elements + b]
    }

    /// Visual identifier for a type (falls back to its index)
    pub fn glyph(&self, kind: usize) -> String {
        self.glyphs
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_string())
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }
}

/// All known variations, keyed by name
#[derive(Debug, Clone)]
pub struct RuleTable {
    variations: BTreeMap<String, Variation>,
}

impl RuleTable {
    /// The variations bundled with the crate
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_json(BUILTIN_VARIATIONS)
    }

    /// Parse and validate a table from JSON
    /// (`{"name": {"elements": n, "beats": [[..], ..], "items": [..], "instrument": ".."}}`)
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let raw: BTreeMap<String, RawVariation> =
            serde_json::from_str(json).map_err(|e| RuleError::Parse(e.to_string()))?;
        Self::from_variations(raw.into_iter().map(|(name, v)| {
            Variation::new(
                name,
                v.elements,
                &v.beats,
                v.items,
                v.instrument.unwrap_or_else(|| "piano".to_string()),
            )
        }))
    }

    /// Collect already-built variations, failing on the first invalid one
    pub fn from_variations(
        variations: impl IntoIterator<Item = Result<Variation, RuleError>>,
    ) -> Result<Self, RuleError> {
        let mut map = BTreeMap::new();
        for variation in variations {
            let variation = variation?;
            map.insert(variation.name.clone(), variation);
        }
        if map.is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(Self { variations: map })
    }

    /// Look up a variation by name
    pub fn get(&self, name: &str) -> Result<&Variation, ConfigError> {
        self.variations
            .get(name)
            .ok_or_else(|| ConfigError::UnknownVariation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variations.contains_key(name)
    }

    pub fn element_count(&self, name: &str) -> Result<usize, ConfigError> {
        self.get(name).map(Variation::element_count)
    }

    /// Unknown variations never defeat anything
    pub fn defeats(&self, name: &str, a: usize, b: usize) -> bool {
        self.variations
            .get(name)
            .is_some_and(|v| v.defeats(a, b))
    }

    /// Variation names in stable (sorted) order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }
}
