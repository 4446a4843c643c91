// Search configuration for the counterpoint engine.
//
// Controls how the search tree is explored: whether sibling branches are
// interleaved in a random order, which seed drives that order, and how many
// whole-piece restarts the driver may attempt before giving up. Every field
// has a default so a partial JSON file (or `{}`) is a valid config.
//
// Loaded by the `generate` CLI from `--config`, then overridden by explicit
// flags. Consumed by `engine::generate_with`.

use crate::error::CounterpointError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Seed for the search PRNG. `None` seeds from the system clock.
    pub seed: Option<u64>,

    /// Interleave sibling branches in a seeded random order. When false the
    /// tree is walked depth-first in generator order.
    pub randomized: bool,

    /// Upper bound on whole-piece restarts. `None` searches without limit,
    /// which may not terminate for a cantus firmus with no valid
    /// realization.
    pub max_restarts: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            randomized: true,
            max_restarts: None,
        }
    }
}

impl SearchConfig {
    /// Ordered depth-first enumeration, no randomness involved.
    pub fn ordered() -> Self {
        Self {
            randomized: false,
            ..Self::default()
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CounterpointError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CounterpointError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The configured seed, or one derived from the current time.
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}
