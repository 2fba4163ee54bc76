//! # Recommendation Orchestrator
//!
//! Coordinates one request end to end:
//! 1. Derive filter criteria from the preference snapshot
//! 2. Hard-filter the catalog (fall back to the full catalog when nothing survives)
//! 3. Cap the candidate set
//! 4. Build the ideal vector and score every candidate (cosine + utility, in parallel)
//! 5. Blend in the external model when one is configured
//! 6. Dedupe variants, shuffle near-ties, keep the top N
//! 7. Attach explanations
//!
//! The similar-item path skips steps 1-5 and ranks by Euclidean distance.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use catalog::{Catalog, Item, ItemId, PoolStats, PreferenceSnapshot};
use pipeline::{FeatureScores, FilterCriteria, FilterPipeline, UtilityScorer};
use vectors::{FeatureVectorFactory, NearestNeighborRanker, cosine_similarity};

use crate::config::EngineConfig;
use crate::explanation::explain;
use crate::external::{ExternalScorer, score_or_neutral};
use crate::ranking::{RankAggregator, ScoreBreakdown, ScoredItem, first_per_variant};

/// One entry of a recommendation list
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub item: Item,
    /// 1-based position
    pub rank: usize,
    pub score: f64,
    /// Present for preference-based results
    pub breakdown: Option<ScoreBreakdown>,
    pub explanation: String,
}

/// Main entry point for recommendation requests
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    factory: FeatureVectorFactory,
    filter_pipeline: FilterPipeline,
    scorer: UtilityScorer,
    aggregator: RankAggregator,
    external: Option<Box<dyn ExternalScorer>>,
    config: EngineConfig,
}

impl RecommendationOrchestrator {
    /// Build the orchestrator and learn the vector layout from the catalog
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let factory = FeatureVectorFactory::from_catalog(catalog.items());
        let scorer = UtilityScorer::new(config.scoring).with_match_scores(config.match_scores);
        let aggregator = RankAggregator::new(config.ranking, config.tie_threshold);

        info!(
            "Orchestrator ready: {} items, max_candidates={:?}, tie_threshold={}",
            catalog.len(),
            config.max_candidates,
            config.tie_threshold
        );

        Self {
            catalog,
            factory,
            filter_pipeline: FilterPipeline::hard_filter(),
            scorer,
            aggregator,
            external: None,
            config,
        }
    }

    pub fn with_external_scorer(mut self, scorer: impl ExternalScorer + 'static) -> Self {
        info!("External scorer '{}' attached", scorer.name());
        self.external = Some(Box::new(scorer));
        self
    }

    pub fn with_filter_pipeline(mut self, pipeline: FilterPipeline) -> Self {
        self.filter_pipeline = pipeline;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn factory(&self) -> &FeatureVectorFactory {
        &self.factory
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Top `n` items for a preference snapshot.
    ///
    /// Near-tie shuffling uses the configured seed, or OS entropy when none
    /// is set.
    pub fn recommend_from_preferences(
        &self,
        preferences: &PreferenceSnapshot,
        n: usize,
    ) -> Result<Vec<Recommendation>> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.recommend_from_preferences_with_rng(preferences, n, &mut rng)
    }

    #[instrument(skip(self, preferences, rng))]
    pub fn recommend_from_preferences_with_rng<R: Rng + ?Sized>(
        &self,
        preferences: &PreferenceSnapshot,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<Recommendation>> {
        let start_time = Instant::now();
        if n == 0 || self.catalog.is_empty() {
            return Ok(Vec::new());
        }

        let scored = self.score_candidates(preferences, &self.catalog.all())?;
        let scored_count = scored.len();
        let ranked = self.aggregator.rank(scored, n, rng);

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .enumerate()
            .map(|(pos, scored)| Recommendation {
                explanation: explain(scored.item, preferences, &scored.breakdown),
                item: scored.item.clone(),
                rank: pos + 1,
                score: scored.score(),
                breakdown: Some(scored.breakdown),
            })
            .collect();

        info!(
            "Returned {} of {} scored candidates in {:?}",
            recommendations.len(),
            scored_count,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Filter, cap and score `pool` against `preferences`, unranked.
    pub fn score_candidates<'a>(
        &self,
        preferences: &PreferenceSnapshot,
        pool: &[&'a Item],
    ) -> Result<Vec<ScoredItem<'a>>> {
        let criteria = FilterCriteria::from(preferences);
        let mut candidates = self
            .filter_pipeline
            .apply(pool.to_vec(), &criteria)
            .context("Failed to apply hard filters")?;

        if candidates.is_empty() {
            info!(
                "No candidates passed the hard filters, falling back to all {} items",
                pool.len()
            );
            candidates = pool.to_vec();
        }
        if let Some(max) = self.config.max_candidates {
            if candidates.len() > max {
                debug!("Capping {} candidates to {}", candidates.len(), max);
                candidates.truncate(max);
            }
        }

        let ideal = self
            .factory
            .create_ideal_vector(preferences, &candidates)
            .context("Failed to build ideal vector")?;
        let stats = PoolStats::from_items(candidates.iter().copied());
        let weights = self.scorer.weights_for(preferences);
        let external = self.external.as_deref();

        candidates
            .par_iter()
            .map(|&item| -> Result<ScoredItem<'a>> {
                let vector = self.factory.create_vector(item)?;
                let similarity = cosine_similarity(&ideal, &vector)?;
                let features = self.scorer.feature_scores(item, preferences, &stats);
                let utility = UtilityScorer::utility(&features, &weights);
                let external_score = external.map(|scorer| score_or_neutral(scorer, item, &candidates));

                Ok(ScoredItem {
                    item,
                    breakdown: ScoreBreakdown {
                        features,
                        weights,
                        utility,
                        similarity,
                        external: external_score,
                        final_score: self.aggregator.final_score(similarity, utility, external_score),
                    },
                })
            })
            .collect()
    }

    /// Items closest to catalog item `target_id`, one per brand and model
    pub fn recommend_similar(&self, target_id: ItemId, n: usize) -> Result<Vec<Recommendation>> {
        let target = self
            .catalog
            .get(target_id)
            .with_context(|| format!("Item {} not found in catalog", target_id))?;
        self.recommend_similar_in(target, &self.catalog.all(), n)
    }

    /// Items from `candidates` closest to `target`.
    ///
    /// The target itself and other listings of the same brand, model and
    /// year are excluded.
    #[instrument(skip(self, target, candidates), fields(target_id = target.id))]
    pub fn recommend_similar_in(
        &self,
        target: &Item,
        candidates: &[&Item],
        n: usize,
    ) -> Result<Vec<Recommendation>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let start_time = Instant::now();
        let target_key = target.variant_key();
        let pool: Vec<&Item> = candidates
            .iter()
            .copied()
            .filter(|item| !(item.variant_key() == target_key && item.year == target.year))
            .collect();

        let ranker = NearestNeighborRanker::new(&self.factory);
        let neighbors = ranker
            .find_nearest_neighbors(target, &pool, pool.len())
            .context("Nearest-neighbour search failed")?;
        let k = neighbors.len();

        let recommendations: Vec<Recommendation> = first_per_variant(neighbors, |neighbor| neighbor.item)
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(pos, neighbor)| Recommendation {
                item: neighbor.item.clone(),
                rank: pos + 1,
                score: neighbor.similarity,
                breakdown: None,
                explanation: format!(
                    "Similar to {}. {}",
                    target.display_name(),
                    neighbor.explanation(k)
                ),
            })
            .collect();

        info!(
            "Found {} items similar to {} in {:?}",
            recommendations.len(),
            target.id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Euclidean k-NN to the ideal vector over the filtered pool
    #[instrument(skip(self, preferences))]
    pub fn recommend_knn_from_preferences(
        &self,
        preferences: &PreferenceSnapshot,
        n: usize,
    ) -> Result<Vec<Recommendation>> {
        if n == 0 || self.catalog.is_empty() {
            return Ok(Vec::new());
        }
        let all = self.catalog.all();
        let mut candidates = self
            .filter_pipeline
            .apply(all.clone(), &FilterCriteria::from(preferences))
            .context("Failed to apply hard filters")?;
        if candidates.is_empty() {
            info!("No candidates passed the hard filters, falling back to the catalog");
            candidates = all;
        }
        if let Some(max) = self.config.max_candidates {
            candidates.truncate(max);
        }

        let ranker = NearestNeighborRanker::new(&self.factory);
        let neighbors = ranker
            .find_nearest_neighbors_from_preferences(preferences, &candidates, candidates.len())
            .context("Nearest-neighbour search failed")?;
        let k = neighbors.len();
        let stats = PoolStats::from_items(candidates.iter().copied());
        let weights = self.scorer.weights_for(preferences);

        Ok(first_per_variant(neighbors, |neighbor| neighbor.item)
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(pos, neighbor)| {
                let features: FeatureScores =
                    self.scorer.feature_scores(neighbor.item, preferences, &stats);
                let breakdown = ScoreBreakdown {
                    utility: UtilityScorer::utility(&features, &weights),
                    features,
                    weights,
                    similarity: neighbor.similarity,
                    external: None,
                    final_score: neighbor.similarity,
                };
                let explanation = format!(
                    "{} {}",
                    explain(neighbor.item, preferences, &breakdown),
                    neighbor.explanation(k)
                );
                Recommendation {
                    item: neighbor.item.clone(),
                    rank: pos + 1,
                    score: neighbor.similarity,
                    breakdown: Some(breakdown),
                    explanation,
                }
            })
            .collect())
    }
}
