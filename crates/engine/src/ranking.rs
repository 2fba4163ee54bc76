//! Final score aggregation and rank stabilization.
//!
//! ## Algorithm
//! 1. Combine similarity and utility (and optionally an external score)
//! 2. Collapse variants: one item per (brand, model), the best-scoring one
//! 3. Bucket by `floor(score / threshold)`; buckets descending, items inside
//!    a bucket shuffled so near-ties rotate between requests
//! 4. Keep the top N

use catalog::Item;
use pipeline::{FeatureScores, ScoringWeights};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// How the final score mixes its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub similarity: f64,
    pub utility: f64,
    /// Share of the final score given to an external model, when one is configured
    pub external: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            utility: 0.4,
            external: 0.1,
        }
    }
}

impl RankingWeights {
    /// Similarity/utility mix normalized over its own total, then blended
    /// with the external score when present. Always in [0,1].
    pub fn combine(&self, similarity: f64, utility: f64, external: Option<f64>) -> f64 {
        let ws = self.similarity.max(0.0);
        let wu = self.utility.max(0.0);
        let total = ws + wu;
        let base = if total > 0.0 {
            (similarity * ws + utility * wu) / total
        } else {
            (similarity + utility) / 2.0
        };

        let combined = match external {
            Some(score) => {
                let we = self.external.clamp(0.0, 1.0);
                base * (1.0 - we) + score * we
            }
            None => base,
        };
        combined.clamp(0.0, 1.0)
    }
}

/// Why an item scored what it scored. Built per request, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub features: FeatureScores,
    /// Normalized weights the utility was computed with
    pub weights: ScoringWeights,
    pub utility: f64,
    pub similarity: f64,
    pub external: Option<f64>,
    pub final_score: f64,
}

/// A candidate with its score breakdown, borrowed from the catalog.
#[derive(Debug, Clone)]
pub struct ScoredItem<'a> {
    pub item: &'a Item,
    pub breakdown: ScoreBreakdown,
}

impl ScoredItem<'_> {
    pub fn score(&self) -> f64 {
        self.breakdown.final_score
    }
}

/// Orders scored candidates into the final list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankAggregator {
    weights: RankingWeights,
    tie_threshold: f64,
}

impl Default for RankAggregator {
    fn default() -> Self {
        Self::new(RankingWeights::default(), 0.05)
    }
}

impl RankAggregator {
    /// A threshold of zero or below disables near-tie shuffling
    pub fn new(weights: RankingWeights, tie_threshold: f64) -> Self {
        Self {
            weights,
            tie_threshold,
        }
    }

    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    pub fn final_score(&self, similarity: f64, utility: f64, external: Option<f64>) -> f64 {
        self.weights.combine(similarity, utility, external)
    }

    /// Dedupe, shuffle near-ties, truncate
    pub fn rank<'a, R: Rng + ?Sized>(
        &self,
        scored: Vec<ScoredItem<'a>>,
        n: usize,
        rng: &mut R,
    ) -> Vec<ScoredItem<'a>> {
        let deduped = deduplicate_variants(scored);
        let mut ranked = self.shuffle_near_ties(deduped, rng);
        ranked.truncate(n);
        ranked
    }

    /// Sort descending, then shuffle inside each score band.
    pub fn shuffle_near_ties<'a, R: Rng + ?Sized>(
        &self,
        mut scored: Vec<ScoredItem<'a>>,
        rng: &mut R,
    ) -> Vec<ScoredItem<'a>> {
        sort_descending(&mut scored);
        if self.tie_threshold <= 0.0 || !self.tie_threshold.is_finite() {
            return scored;
        }

        let band = |s: &ScoredItem| (s.score() / self.tie_threshold).floor() as i64;
        let mut start = 0;
        while start < scored.len() {
            let current = band(&scored[start]);
            let mut end = start + 1;
            while end < scored.len() && band(&scored[end]) == current {
                end += 1;
            }
            scored[start..end].shuffle(rng);
            start = end;
        }
        scored
    }
}

/// Descending by final score, ties by id so the order never depends on
/// input order
fn sort_descending(scored: &mut [ScoredItem<'_>]) {
    scored.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
}

/// Keep only the best-scoring item of each (brand, model) group
pub fn deduplicate_variants(scored: Vec<ScoredItem<'_>>) -> Vec<ScoredItem<'_>> {
    let mut best: HashMap<(String, String), ScoredItem> = HashMap::new();
    for candidate in scored {
        best.entry(candidate.item.variant_key())
            .and_modify(|existing| {
                if candidate.score() > existing.score() {
                    *existing = candidate.clone();
                }
            })
            .or_insert(candidate);
    }
    let mut deduped: Vec<ScoredItem> = best.into_values().collect();
    sort_descending(&mut deduped);
    deduped
}

/// Keep the first occurrence of each (brand, model) in an already ordered list
pub fn first_per_variant<T>(ordered: Vec<T>, item_of: impl Fn(&T) -> &Item) -> Vec<T> {
    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|entry| seen.insert(item_of(entry).variant_key()))
        .collect()
}
