//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```json
//! { "tie_threshold": 0.02, "scoring": { "price": 0.4 }, "seed": 7 }
//! ```

use crate::ranking::RankingWeights;
use anyhow::{Context, Result};
use pipeline::{MatchScores, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringWeights,
    pub match_scores: MatchScores,
    pub ranking: RankingWeights,
    /// Width of a near-tie score band; zero disables shuffling
    pub tie_threshold: f64,
    /// Upper bound on candidates scored per request
    pub max_candidates: Option<usize>,
    /// Fixed seed for near-tie shuffling; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringWeights::default(),
            match_scores: MatchScores::default(),
            ranking: RankingWeights::default(),
            tie_threshold: 0.05,
            max_candidates: Some(200),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid engine configuration")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tie_threshold(mut self, threshold: f64) -> Self {
        self.tie_threshold = threshold;
        self
    }

    pub fn with_max_candidates(mut self, max: Option<usize>) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn with_scoring_weights(mut self, weights: ScoringWeights) -> Self {
        self.scoring = weights;
        self
    }

    pub fn with_ranking_weights(mut self, weights: RankingWeights) -> Self {
        self.ranking = weights;
        self
    }
}
