//! Recommendation algorithms under evaluation.
//!
//! Each algorithm scores one candidate against a query context; the default
//! `recommend` ranks the training pool by that score. Algorithms are looked
//! up by id in an [`AlgorithmRegistry`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use catalog::{Item, PoolStats, PreferenceSnapshot};
use engine::{ExternalScorer, RankAggregator, ScoreBreakdown, ScoredItem, score_or_neutral};
use pipeline::UtilityScorer;
use rand::rngs::StdRng;
use vectors::{
    FeatureVector, FeatureVectorFactory, cosine_similarity, distance_to_similarity,
    euclidean_distance,
};

use crate::error::{EvaluationError, Result};
use crate::weighted_similarity::{SimilarityWeights, weighted_similarity};

/// Everything an algorithm may use to score candidates for one query.
pub struct QueryContext<'a> {
    pub query: &'a Item,
    /// Candidate pool; the query itself is never recommended
    pub train: &'a [&'a Item],
    pub stats: &'a PoolStats,
    pub factory: &'a FeatureVectorFactory,
    pub query_vector: FeatureVector,
    /// Preferences implied by the query item
    pub preferences: PreferenceSnapshot,
    pub ideal_vector: FeatureVector,
    pub similarity_weights: SimilarityWeights,
}

impl<'a> QueryContext<'a> {
    pub fn new(
        query: &'a Item,
        train: &'a [&'a Item],
        stats: &'a PoolStats,
        factory: &'a FeatureVectorFactory,
        similarity_weights: SimilarityWeights,
    ) -> Result<Self> {
        let preferences = PreferenceSnapshot::from_reference_item(query);
        let query_vector = factory.create_vector(query)?;
        let ideal_vector = factory.create_ideal_vector(&preferences, train)?;
        Ok(Self {
            query,
            train,
            stats,
            factory,
            query_vector,
            preferences,
            ideal_vector,
            similarity_weights,
        })
    }

    /// Training items other than the query
    pub fn candidates(&self) -> impl Iterator<Item = &'a Item> + '_ {
        self.train
            .iter()
            .copied()
            .filter(move |item| item.id != self.query.id)
    }
}

pub trait RecommendationAlgorithm: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// Higher is better
    fn score(&self, candidate: &Item, context: &QueryContext<'_>) -> Result<f64>;

    /// Top `top_k` candidates by score, ties broken by id
    fn recommend<'a>(
        &self,
        context: &QueryContext<'a>,
        top_k: usize,
        _rng: &mut StdRng,
    ) -> Result<Vec<&'a Item>> {
        let mut scored: Vec<(&'a Item, f64)> = context
            .candidates()
            .map(|item| -> Result<(&'a Item, f64)> { Ok((item, self.score(item, context)?)) })
            .collect::<Result<_>>()?;

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        Ok(scored.into_iter().take(top_k).map(|(item, _)| item).collect())
    }
}

/// Cosine similarity between item vectors
pub struct CosineAlgorithm;

impl RecommendationAlgorithm for CosineAlgorithm {
    fn id(&self) -> &str {
        "cosine"
    }

    fn description(&self) -> &str {
        "Cosine similarity between feature vectors"
    }

    fn score(&self, candidate: &Item, context: &QueryContext<'_>) -> Result<f64> {
        let vector = context.factory.create_vector(candidate)?;
        Ok(cosine_similarity(&context.query_vector, &vector)?)
    }
}

/// Euclidean nearest neighbours
pub struct KnnAlgorithm;

impl RecommendationAlgorithm for KnnAlgorithm {
    fn id(&self) -> &str {
        "knn"
    }

    fn description(&self) -> &str {
        "Nearest neighbours by Euclidean distance"
    }

    fn score(&self, candidate: &Item, context: &QueryContext<'_>) -> Result<f64> {
        let vector = context.factory.create_vector(candidate)?;
        Ok(distance_to_similarity(euclidean_distance(&context.query_vector, &vector)?))
    }
}

/// Attribute-weighted similarity, using the context's (possibly tuned) weights
pub struct WeightedAlgorithm;

impl RecommendationAlgorithm for WeightedAlgorithm {
    fn id(&self) -> &str {
        "weighted"
    }

    fn description(&self) -> &str {
        "Weighted power/budget/year/fuel similarity"
    }

    fn score(&self, candidate: &Item, context: &QueryContext<'_>) -> Result<f64> {
        Ok(weighted_similarity(
            context.query,
            candidate,
            context.stats,
            &context.similarity_weights,
        ))
    }
}

/// Utility plus cosine-to-ideal, ranked like the live engine
#[derive(Default)]
pub struct HybridAlgorithm {
    scorer: UtilityScorer,
    aggregator: RankAggregator,
}

impl HybridAlgorithm {
    pub fn new(scorer: UtilityScorer, aggregator: RankAggregator) -> Self {
        Self { scorer, aggregator }
    }

    fn scored<'a>(&self, candidate: &'a Item, context: &QueryContext<'_>) -> Result<ScoredItem<'a>> {
        let vector = context.factory.create_vector(candidate)?;
        let similarity = cosine_similarity(&context.ideal_vector, &vector)?;
        let weights = self.scorer.weights_for(&context.preferences);
        let features = self
            .scorer
            .feature_scores(candidate, &context.preferences, context.stats);
        let utility = UtilityScorer::utility(&features, &weights);

        Ok(ScoredItem {
            item: candidate,
            breakdown: ScoreBreakdown {
                features,
                weights,
                utility,
                similarity,
                external: None,
                final_score: self.aggregator.final_score(similarity, utility, None),
            },
        })
    }
}

impl RecommendationAlgorithm for HybridAlgorithm {
    fn id(&self) -> &str {
        "hybrid"
    }

    fn description(&self) -> &str {
        "Utility and cosine-to-ideal blended by the rank aggregator"
    }

    fn score(&self, candidate: &Item, context: &QueryContext<'_>) -> Result<f64> {
        Ok(self.scored(candidate, context)?.score())
    }

    fn recommend<'a>(
        &self,
        context: &QueryContext<'a>,
        top_k: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<&'a Item>> {
        let scored: Vec<ScoredItem<'a>> = context
            .candidates()
            .map(|item| self.scored(item, context))
            .collect::<Result<_>>()?;
        Ok(self
            .aggregator
            .rank(scored, top_k, rng)
            .into_iter()
            .map(|s| s.item)
            .collect())
    }
}

/// An external model evaluated like any other algorithm
pub struct ExternalAlgorithm<S> {
    id: String,
    scorer: S,
}

impl<S: ExternalScorer> ExternalAlgorithm<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            id: scorer.name().to_string(),
            scorer,
        }
    }
}

impl<S: ExternalScorer> RecommendationAlgorithm for ExternalAlgorithm<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "Externally trained scoring model"
    }

    fn score(&self, candidate: &Item, context: &QueryContext<'_>) -> Result<f64> {
        Ok(score_or_neutral(&self.scorer, candidate, context.train))
    }
}

/// Algorithms by id, iterated in id order
#[derive(Default)]
pub struct AlgorithmRegistry {
    algorithms: BTreeMap<String, Box<dyn RecommendationAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cosine`, `knn`, `weighted` and `hybrid`
    pub fn with_builtins() -> Self {
        Self::new()
            .register(CosineAlgorithm)
            .register(KnnAlgorithm)
            .register(WeightedAlgorithm)
            .register(HybridAlgorithm::default())
    }

    /// Add an algorithm, replacing any with the same id
    pub fn register(mut self, algorithm: impl RecommendationAlgorithm + 'static) -> Self {
        self.algorithms
            .insert(algorithm.id().to_string(), Box::new(algorithm));
        self
    }

    pub fn get(&self, id: &str) -> Result<&dyn RecommendationAlgorithm> {
        self.algorithms
            .get(id)
            .map(|algorithm| algorithm.as_ref())
            .ok_or_else(|| EvaluationError::UnknownAlgorithm(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.algorithms.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.algorithms.keys().map(String::as_str).collect()
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &dyn RecommendationAlgorithm> {
        self.algorithms.values().map(|algorithm| algorithm.as_ref())
    }

    /// Dispatch to the algorithm registered under `id`
    pub fn recommend<'a>(
        &self,
        id: &str,
        context: &QueryContext<'a>,
        top_k: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<&'a Item>> {
        self.get(id)?.recommend(context, top_k, rng)
    }
}
