//! Configuration and rule-table errors
//!
//! Everything here is detected before a round starts. The tick loop itself
//! has no failure modes.

use thiserror::Error;

/// A malformed variation in the rule table
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("variation `{variation}` needs at least 2 elements, has {elements}")]
    TooFewElements { variation: String, elements: usize },

    #[error("variation `{variation}` has {rows} beat rows for {elements} elements")]
    RowCountMismatch {
        variation: String,
        elements: usize,
        rows: usize,
    },

    #[error("variation `{variation}`: type {from} beats out-of-range type {to}")]
    IndexOutOfRange {
        variation: String,
        from: usize,
        to: usize,
    },

    #[error("variation `{variation}`: type {kind} defeats itself")]
    SelfDefeat { variation: String, kind: usize },

    #[error("variation `{variation}`: types {a} and {b} defeat each other")]
    MutualDefeat {
        variation: String,
        a: usize,
        b: usize,
    },

    #[error("variation `{variation}` has {glyphs} glyphs for {elements} elements")]
    GlyphCountMismatch {
        variation: String,
        elements: usize,
        glyphs: usize,
    },

    #[error("rule table is empty")]
    Empty,

    #[error("rule table is not valid JSON: {0}")]
    Parse(String),
}

/// Settings that cannot drive a simulation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown variation `{0}`")]
    UnknownVariation(String),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
