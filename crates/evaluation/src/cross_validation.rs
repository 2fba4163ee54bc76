//! # K-fold cross-validation
//!
//! ## Algorithm
//! 1. Keep the valid catalog items
//! 2. Shuffle all indices once and cut them into k contiguous folds
//! 3. Draw one base seed from the harness RNG; fold `i` seeds its own
//!    `StdRng` from `base + i`
//! 4. Per fold (in parallel): optionally tune similarity weights on the
//!    training part, then for each of the first `max_test_queries` test
//!    items build the relevant set, ask the algorithm for `top_k` items and
//!    score the list
//! 5. Average per fold, then across folds
//!
//! Every algorithm in a comparison sees the same folds and the same seeds.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use catalog::{Catalog, Item, ItemId, PoolStats};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use vectors::FeatureVectorFactory;

use crate::error::{EvaluationError, Result};
use crate::hyperparameter::{HyperparameterSearch, TuningOutcome};
use crate::metrics::{f1_score, mae, mean, precision_at_k, recall, rmse, std_dev};
use crate::registry::{AlgorithmRegistry, QueryContext};
use crate::relevance::RelevanceJudge;
use crate::weighted_similarity::SimilarityWeights;

/// Train/test index pairs
pub type Split = (Vec<usize>, Vec<usize>);

/// K-fold splitter over shuffled indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    /// At least two folds are required
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(EvaluationError::InvalidFoldCount(n_splits));
        }
        Ok(Self { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Shuffle `0..n` once and cut it into folds of `n / k`; the last fold
    /// takes the remainder. With fewer samples than folds, every sample
    /// becomes its own fold.
    pub fn split<R: Rng + ?Sized>(&self, n_samples: usize, rng: &mut R) -> Vec<Split> {
        if n_samples == 0 {
            return Vec::new();
        }
        let k = self.n_splits.min(n_samples);
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(rng);

        let fold_size = n_samples / k;
        (0..k)
            .map(|fold| {
                let start = fold * fold_size;
                let end = if fold == k - 1 { n_samples } else { start + fold_size };
                let test = indices[start..end].to_vec();
                let train = indices[..start]
                    .iter()
                    .chain(&indices[end..])
                    .copied()
                    .collect();
                (train, test)
            })
            .collect()
    }
}

/// Knobs of a cross-validation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossValidationConfig {
    /// Test queries evaluated per fold
    pub max_test_queries: usize,
    /// Tune similarity weights on each fold's training part
    pub tune_per_fold: bool,
    /// Weights used by `weighted` when not tuning
    pub similarity_weights: SimilarityWeights,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            max_test_queries: 50,
            tune_per_fold: false,
            similarity_weights: SimilarityWeights::default(),
        }
    }
}

/// Metrics of one fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldMetrics {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    /// Queries with a non-empty relevant set
    pub queries: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Mean recommended price against the query price
    pub price_mae: f64,
    pub price_rmse: f64,
    pub mean_latency_ms: f64,
    pub tuned_weights: Option<SimilarityWeights>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationResult {
    pub algorithm: String,
    pub top_k: usize,
    pub folds: Vec<FoldMetrics>,
    pub mean_precision: f64,
    pub precision_std: f64,
    pub mean_recall: f64,
    pub mean_f1: f64,
    pub mean_price_mae: f64,
    pub mean_price_rmse: f64,
    pub mean_latency_ms: f64,
}

impl CrossValidationResult {
    fn from_folds(algorithm: &str, top_k: usize, folds: Vec<FoldMetrics>) -> Self {
        let column = |f: fn(&FoldMetrics) -> f64| folds.iter().map(f).collect::<Vec<f64>>();
        let precision = column(|m| m.precision);
        Self {
            algorithm: algorithm.to_string(),
            top_k,
            mean_precision: mean(&precision),
            precision_std: std_dev(&precision),
            mean_recall: mean(&column(|m| m.recall)),
            mean_f1: mean(&column(|m| m.f1)),
            mean_price_mae: mean(&column(|m| m.price_mae)),
            mean_price_rmse: mean(&column(|m| m.price_rmse)),
            mean_latency_ms: mean(&column(|m| m.mean_latency_ms)),
            folds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmComparison {
    /// One result per registered algorithm, in id order
    pub results: Vec<CrossValidationResult>,
    pub best_precision: Option<String>,
    pub best_recall: Option<String>,
    pub fastest: Option<String>,
}

impl AlgorithmComparison {
    fn from_results(results: Vec<CrossValidationResult>) -> Self {
        let pick = |key: fn(&CrossValidationResult) -> f64, highest: bool| {
            results
                .iter()
                .filter(|r| !r.folds.is_empty())
                .max_by(|a, b| {
                    let ordering = key(a).total_cmp(&key(b));
                    if highest { ordering } else { ordering.reverse() }
                })
                .map(|r| r.algorithm.clone())
        };
        Self {
            best_precision: pick(|r| r.mean_precision, true),
            best_recall: pick(|r| r.mean_recall, true),
            fastest: pick(|r| r.mean_latency_ms, false),
            results,
        }
    }
}

/// Runs algorithms from a registry over k-fold splits of one catalog.
pub struct CrossValidationHarness {
    catalog: Arc<Catalog>,
    factory: FeatureVectorFactory,
    registry: AlgorithmRegistry,
    search: HyperparameterSearch,
    judge: RelevanceJudge,
    config: CrossValidationConfig,
}

impl CrossValidationHarness {
    /// Harness with the built-in algorithms
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let factory = FeatureVectorFactory::from_catalog(catalog.items());
        Self {
            catalog,
            factory,
            registry: AlgorithmRegistry::with_builtins(),
            search: HyperparameterSearch::default(),
            judge: RelevanceJudge::default(),
            config: CrossValidationConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: AlgorithmRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: CrossValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_search(mut self, search: HyperparameterSearch) -> Self {
        self.search = search;
        self
    }

    pub fn with_judge(mut self, judge: RelevanceJudge) -> Self {
        self.judge = judge;
        self
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CrossValidationConfig {
        &self.config
    }

    /// Grid search on an explicit split
    pub fn tune_hyperparameters(&self, train: &[&Item], test: &[&Item]) -> TuningOutcome {
        self.search.search(train, test)
    }

    /// Top `top_k` items for `query` from `train` by algorithm `id`
    pub fn recommend<'a>(
        &'a self,
        id: &str,
        query: &'a Item,
        top_k: usize,
        train: &'a [&'a Item],
        stats: &'a PoolStats,
        rng: &mut StdRng,
    ) -> Result<Vec<&'a Item>> {
        let context = QueryContext::new(
            query,
            train,
            stats,
            &self.factory,
            self.config.similarity_weights,
        )?;
        self.registry.recommend(id, &context, top_k, rng)
    }

    fn valid_items(&self) -> Vec<&Item> {
        self.catalog.valid_items()
    }

    /// k-fold evaluation of one algorithm
    #[instrument(skip(self, rng))]
    pub fn cross_validate<R: Rng + ?Sized>(
        &self,
        algorithm_id: &str,
        k: usize,
        top_k: usize,
        rng: &mut R,
    ) -> Result<CrossValidationResult> {
        self.registry.get(algorithm_id)?;
        let kfold = KFold::new(k)?;
        let items = self.valid_items();
        let splits = kfold.split(items.len(), rng);
        let base_seed = rng.next_u64();

        self.cross_validate_on_folds(algorithm_id, &items, &splits, top_k, base_seed)
    }

    /// Evaluate one algorithm on precomputed splits of `items`
    pub fn cross_validate_on_folds(
        &self,
        algorithm_id: &str,
        items: &[&Item],
        splits: &[Split],
        top_k: usize,
        base_seed: u64,
    ) -> Result<CrossValidationResult> {
        let start_time = Instant::now();
        self.registry.get(algorithm_id)?;

        let folds = splits
            .par_iter()
            .enumerate()
            .map(|(fold, (train_idx, test_idx))| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(fold as u64));
                self.evaluate_fold(algorithm_id, fold, items, train_idx, test_idx, top_k, &mut rng)
            })
            .collect::<Result<Vec<FoldMetrics>>>()?;

        let result = CrossValidationResult::from_folds(algorithm_id, top_k, folds);
        info!(
            "{}: {} folds, precision {:.3} ± {:.3}, recall {:.3}, f1 {:.3} in {:?}",
            algorithm_id,
            result.folds.len(),
            result.mean_precision,
            result.precision_std,
            result.mean_recall,
            result.mean_f1,
            start_time.elapsed()
        );
        Ok(result)
    }

    /// Every registered algorithm on the same folds
    #[instrument(skip(self, rng))]
    pub fn compare_algorithms<R: Rng + ?Sized>(
        &self,
        k: usize,
        top_k: usize,
        rng: &mut R,
    ) -> Result<AlgorithmComparison> {
        let kfold = KFold::new(k)?;
        let items = self.valid_items();
        let splits = kfold.split(items.len(), rng);
        let base_seed = rng.next_u64();

        let results = self
            .registry
            .ids()
            .into_iter()
            .map(|id| self.cross_validate_on_folds(id, &items, &splits, top_k, base_seed))
            .collect::<Result<Vec<_>>>()?;

        let comparison = AlgorithmComparison::from_results(results);
        info!(
            "Best precision: {:?}, best recall: {:?}, fastest: {:?}",
            comparison.best_precision, comparison.best_recall, comparison.fastest
        );
        Ok(comparison)
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate_fold(
        &self,
        algorithm_id: &str,
        fold: usize,
        items: &[&Item],
        train_idx: &[usize],
        test_idx: &[usize],
        top_k: usize,
        rng: &mut StdRng,
    ) -> Result<FoldMetrics> {
        let train: Vec<&Item> = train_idx.iter().map(|&i| items[i]).collect();
        let test: Vec<&Item> = test_idx.iter().map(|&i| items[i]).collect();
        let stats = PoolStats::from_items(train.iter().copied());

        let tuned_weights = if self.config.tune_per_fold {
            let outcome = self.tune_hyperparameters(&train, &test);
            if outcome.best.is_none() {
                warn!("Fold {}: tuning found no configuration, using defaults", fold);
            }
            Some(outcome.best.map_or(self.config.similarity_weights, |best| best.weights))
        } else {
            None
        };
        let weights = tuned_weights.unwrap_or(self.config.similarity_weights);

        let mut precisions = Vec::new();
        let mut recalls = Vec::new();
        let mut f1s = Vec::new();
        let mut price_errors = Vec::new();
        let mut latencies = Vec::new();

        for query in test.iter().take(self.config.max_test_queries) {
            let relevant: HashSet<ItemId> = self.judge.relevant_ids(query, &train);
            if relevant.is_empty() {
                continue;
            }

            let started = Instant::now();
            let context = QueryContext::new(query, &train, &stats, &self.factory, weights)?;
            let recommended = self.registry.recommend(algorithm_id, &context, top_k, rng)?;
            latencies.push(started.elapsed().as_secs_f64() * 1000.0);

            let ids: Vec<ItemId> = recommended.iter().map(|item| item.id).collect();
            let query_precision = precision_at_k(&ids, &relevant, top_k);
            let query_recall = recall(&ids, &relevant);
            precisions.push(query_precision);
            recalls.push(query_recall);
            f1s.push(f1_score(query_precision, query_recall));

            if !recommended.is_empty() {
                let mean_price =
                    recommended.iter().map(|item| item.price).sum::<f64>() / recommended.len() as f64;
                price_errors.push(mean_price - query.price);
            }
        }

        debug!(
            "Fold {}: {} train, {} test, {} queries",
            fold,
            train.len(),
            test.len(),
            precisions.len()
        );

        Ok(FoldMetrics {
            fold,
            train_size: train.len(),
            test_size: test.len(),
            queries: precisions.len(),
            precision: mean(&precisions),
            recall: mean(&recalls),
            f1: mean(&f1s),
            price_mae: mae(&price_errors),
            price_rmse: rmse(&price_errors),
            mean_latency_ms: mean(&latencies),
            tuned_weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_count_must_be_at_least_two() {
        assert!(matches!(KFold::new(1), Err(EvaluationError::InvalidFoldCount(1))));
        assert!(KFold::new(2).is_ok());
    }

    #[test]
    fn test_split_covers_every_index_once() {
        let kfold = KFold::new(3).unwrap();
        let splits = kfold.split(10, &mut StdRng::seed_from_u64(5));
        assert_eq!(splits.len(), 3);

        let sizes: Vec<usize> = splits.iter().map(|(_, test)| test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 4]);

        let mut seen: Vec<usize> = splits.iter().flat_map(|(_, test)| test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        for (train, test) in &splits {
            assert_eq!(train.len() + test.len(), 10);
            assert!(test.iter().all(|i| !train.contains(i)));
        }
    }

    #[test]
    fn test_fewer_samples_than_folds() {
        let splits = KFold::new(5).unwrap().split(3, &mut StdRng::seed_from_u64(0));
        assert_eq!(splits.len(), 3);
        assert!(splits.iter().all(|(_, test)| test.len() == 1));
        assert!(KFold::new(5).unwrap().split(0, &mut StdRng::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn test_split_is_reproducible_from_seed() {
        let kfold = KFold::new(4).unwrap();
        let a = kfold.split(20, &mut StdRng::seed_from_u64(9));
        let b = kfold.split(20, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
