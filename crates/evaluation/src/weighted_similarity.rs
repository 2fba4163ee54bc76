//! Attribute-weighted item similarity used by grid search and the
//! `weighted` algorithm.

use catalog::{FUEL_FAMILIES, Item, MatchKind, NumericAttribute, NumericRange, PoolStats};
use serde::{Deserialize, Serialize};

/// Weights of the four attributes compared by [`weighted_similarity`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub power: f64,
    pub budget: f64,
    pub year: f64,
    pub fuel: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            power: 0.25,
            budget: 0.30,
            year: 0.20,
            fuel: 0.25,
        }
    }
}

impl SimilarityWeights {
    pub fn new(power: f64, budget: f64, year: f64, fuel: f64) -> Self {
        Self {
            power,
            budget,
            year,
            fuel,
        }
    }

    pub fn total(&self) -> f64 {
        self.power + self.budget + self.year + self.fuel
    }

    pub fn sums_to_one(&self) -> bool {
        (self.total() - 1.0).abs() < 1e-6
    }
}

/// Similarity of two items in [0,1].
///
/// Numeric attributes contribute `1 - |norm(a) - norm(b)|` over the ranges
/// in `stats`; fuel contributes 1.0 for the same label and 0.5 for the same
/// family.
pub fn weighted_similarity(a: &Item, b: &Item, stats: &PoolStats, weights: &SimilarityWeights) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }

    let numeric = |attribute: NumericAttribute| {
        match (attribute.value(a), attribute.value(b), stats.range(attribute)) {
            (Some(x), Some(y), Some(range)) => closeness(x, y, range),
            _ => 0.0,
        }
    };

    let score = weights.power * numeric(NumericAttribute::Power)
        + weights.budget * numeric(NumericAttribute::Price)
        + weights.year * numeric(NumericAttribute::Year)
        + weights.fuel * fuel_similarity(&a.fuel, &b.fuel);

    (score / total).clamp(0.0, 1.0)
}

fn closeness(x: f64, y: f64, range: &NumericRange) -> f64 {
    if range.is_degenerate() {
        return 0.0;
    }
    (1.0 - (range.normalize(x) - range.normalize(y)).abs()).max(0.0)
}

fn fuel_similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }
    match FUEL_FAMILIES.matches(a, b) {
        MatchKind::Exact => 1.0,
        MatchKind::Family => 0.5,
        MatchKind::None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: u32, fuel: &str, price: f64, power: u32, year: u16) -> Item {
        Item {
            id,
            brand: "Ford".to_string(),
            model: format!("M{}", id),
            power,
            fuel: fuel.to_string(),
            price,
            year,
            transmission: String::new(),
            body_type: String::new(),
        }
    }

    fn stats() -> PoolStats {
        PoolStats::from_items(&[
            car(1, "Petrol", 10_000.0, 50, 2010),
            car(2, "Diesel", 30_000.0, 150, 2020),
        ])
    }

    #[test]
    fn test_identical_items_score_one() {
        let a = car(1, "Petrol", 20_000.0, 100, 2015);
        let score = weighted_similarity(&a, &a, &stats(), &SimilarityWeights::default());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_items_score_zero() {
        let a = car(1, "Petrol", 10_000.0, 50, 2010);
        let b = car(2, "Diesel", 30_000.0, 150, 2020);
        let score = weighted_similarity(&a, &b, &stats(), &SimilarityWeights::default());
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn test_fuel_family_scores_half() {
        assert_eq!(fuel_similarity("Petrol", "petrol"), 1.0);
        assert_eq!(fuel_similarity("Petrol", "Gasoline"), 0.5);
        assert_eq!(fuel_similarity("Petrol", "Diesel"), 0.0);
        assert_eq!(fuel_similarity("", "Diesel"), 0.0);
    }

    #[test]
    fn test_degenerate_range_contributes_nothing() {
        let pool = PoolStats::from_items(&[car(1, "Petrol", 20_000.0, 100, 2015)]);
        let a = car(1, "Petrol", 20_000.0, 100, 2015);
        let weights = SimilarityWeights::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(weighted_similarity(&a, &a, &pool, &weights), 1.0);
        let numeric_only = SimilarityWeights::new(0.5, 0.5, 0.0, 0.0);
        assert_eq!(weighted_similarity(&a, &a, &pool, &numeric_only), 0.0);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(SimilarityWeights::default().sums_to_one());
    }
}
