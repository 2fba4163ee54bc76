//! Grid search over similarity weights.
//!
//! ## Algorithm
//! 1. Enumerate power x budget x year x fuel, keeping combinations that sum to 1
//! 2. Keep the first `max_configurations` in enumeration order
//! 3. Score each configuration in parallel: for each of the first
//!    `max_test_items` held-out items, the best similarity to any training
//!    item; the mean of those is the configuration's score
//! 4. Sort descending; the first result is the best

use std::cmp::Ordering;
use std::time::Instant;

use catalog::{Item, PoolStats};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::weighted_similarity::{SimilarityWeights, weighted_similarity};

/// Candidate values per weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub power: Vec<f64>,
    pub budget: Vec<f64>,
    pub year: Vec<f64>,
    pub fuel: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            power: vec![0.15, 0.20, 0.25, 0.30, 0.35],
            budget: vec![0.25, 0.30, 0.35, 0.40],
            year: vec![0.15, 0.20, 0.25, 0.30],
            fuel: vec![0.15, 0.20, 0.25, 0.30, 0.35],
        }
    }
}

impl ParameterGrid {
    /// Every combination whose weights sum to 1, in enumeration order
    pub fn combinations(&self) -> Vec<SimilarityWeights> {
        let mut combinations = Vec::new();
        for &power in &self.power {
            for &budget in &self.budget {
                for &year in &self.year {
                    for &fuel in &self.fuel {
                        let weights = SimilarityWeights::new(power, budget, year, fuel);
                        if weights.sums_to_one() {
                            combinations.push(weights);
                        }
                    }
                }
            }
        }
        combinations
    }
}

/// Score of one evaluated configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningResult {
    pub weights: SimilarityWeights,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TuningOutcome {
    pub best: Option<TuningResult>,
    /// Sorted by score, best first
    pub results: Vec<TuningResult>,
}

#[derive(Debug, Clone)]
pub struct HyperparameterSearch {
    grid: ParameterGrid,
    max_configurations: usize,
    max_test_items: usize,
}

impl Default for HyperparameterSearch {
    fn default() -> Self {
        Self {
            grid: ParameterGrid::default(),
            max_configurations: 20,
            max_test_items: 20,
        }
    }
}

impl HyperparameterSearch {
    pub fn new(grid: ParameterGrid) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    pub fn with_max_configurations(mut self, max: usize) -> Self {
        self.max_configurations = max;
        self
    }

    pub fn with_max_test_items(mut self, max: usize) -> Self {
        self.max_test_items = max;
        self
    }

    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    /// Evaluate the grid on a train/test split. Invalid items are ignored.
    #[instrument(skip(self, train, test), fields(train = train.len(), test = test.len()))]
    pub fn search(&self, train: &[&Item], test: &[&Item]) -> TuningOutcome {
        let start_time = Instant::now();
        let train: Vec<&Item> = train.iter().copied().filter(|item| item.is_valid()).collect();
        let test: Vec<&Item> = test
            .iter()
            .copied()
            .filter(|item| item.is_valid())
            .take(self.max_test_items)
            .collect();

        if train.is_empty() || test.is_empty() {
            info!("No valid items to tune on");
            return TuningOutcome::default();
        }

        let stats = PoolStats::from_items(train.iter().chain(test.iter()).copied());
        let configurations: Vec<SimilarityWeights> = self
            .grid
            .combinations()
            .into_iter()
            .take(self.max_configurations)
            .collect();
        debug!("Evaluating {} configurations", configurations.len());

        let mut results: Vec<TuningResult> = configurations
            .par_iter()
            .map(|weights| TuningResult {
                weights: *weights,
                score: mean_best_similarity(&train, &test, &stats, weights),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let best = results.first().copied();
        if let Some(best) = &best {
            info!(
                "Best of {} configurations scored {:.4} in {:?}",
                results.len(),
                best.score,
                start_time.elapsed()
            );
        }
        TuningOutcome { best, results }
    }
}

fn mean_best_similarity(
    train: &[&Item],
    test: &[&Item],
    stats: &PoolStats,
    weights: &SimilarityWeights,
) -> f64 {
    let total: f64 = test
        .iter()
        .map(|query| {
            train
                .iter()
                .filter(|candidate| candidate.id != query.id)
                .map(|candidate| weighted_similarity(query, candidate, stats, weights))
                .fold(0.0, f64::max)
        })
        .sum();
    total / test.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: u32, fuel: &str, price: f64, power: u32, year: u16) -> Item {
        Item {
            id,
            brand: "Opel".to_string(),
            model: format!("M{}", id),
            power,
            fuel: fuel.to_string(),
            price,
            year,
            transmission: String::new(),
            body_type: String::new(),
        }
    }

    #[test]
    fn test_default_grid_keeps_only_unit_sums() {
        let combinations = ParameterGrid::default().combinations();
        assert!(!combinations.is_empty());
        assert!(combinations.len() > 20);
        assert!(combinations.iter().all(|w| (w.total() - 1.0).abs() < 1e-6));
        // enumeration order: power is the outer loop
        assert_eq!(combinations[0].power, 0.15);
    }

    #[test]
    fn test_search_caps_and_sorts() {
        let train = vec![
            car(1, "Petrol", 10_000.0, 60, 2012),
            car(2, "Diesel", 20_000.0, 100, 2016),
            car(3, "Petrol", 30_000.0, 150, 2021),
        ];
        let test = vec![car(4, "Diesel", 19_000.0, 95, 2015), car(5, "Petrol", 29_000.0, 140, 2020)];
        let train_refs: Vec<&Item> = train.iter().collect();
        let test_refs: Vec<&Item> = test.iter().collect();

        let outcome = HyperparameterSearch::default().search(&train_refs, &test_refs);
        assert_eq!(outcome.results.len(), 20);
        assert!(outcome.results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(outcome.best, outcome.results.first().copied());
        let best = outcome.best.unwrap();
        assert!((0.0..=1.0).contains(&best.score));
    }

    #[test]
    fn test_no_valid_items_yields_no_best() {
        let invalid = car(1, "Petrol", 0.0, 0, 2010);
        let outcome = HyperparameterSearch::default().search(&[&invalid], &[&invalid]);
        assert!(outcome.best.is_none());
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_query_never_matches_itself() {
        let a = car(1, "Petrol", 10_000.0, 60, 2012);
        let b = car(2, "Diesel", 30_000.0, 150, 2021);
        let stats = PoolStats::from_items([&a, &b]);
        let score = mean_best_similarity(&[&a, &b], &[&a], &stats, &SimilarityWeights::default());
        assert!(score < 1e-9);
    }
}
