//! Multi-factor utility scoring.
//!
//! Every candidate gets seven sub-scores in [0,1], each measured against the
//! statistics of the pool being ranked:
//!
//! | Feature      | Score |
//! |--------------|-------|
//! | price        | budget-fit curve, or closeness to the pool mean without a budget |
//! | power        | normalized power shaped by the comfort/sport dial |
//! | year         | normalized model year (newer scores higher) |
//! | fuel         | 1.0 exact, family constant, 0.0 otherwise |
//! | brand        | 1.0 exact, partial constant, 0.0 otherwise |
//! | body type    | 1.0 exact, family constant, 0.0 otherwise |
//! | transmission | 1.0 when the gearbox kind matches, 0.0 otherwise |
//!
//! Unstated categorical preferences score a neutral 0.5. Utility is the
//! weighted sum with weights normalized to 1.

use catalog::{
    BODY_TYPE_GROUPS, BRAND_ALIASES, FUEL_FAMILIES, Feature, Item, MatchKind, NumericRange,
    PoolStats, PreferenceSnapshot, SynonymTable, TransmissionKind, MIN_VALID_YEAR,
};
use serde::{Deserialize, Serialize};

/// Totals below this are treated as "no weights"
const MIN_WEIGHT_TOTAL: f64 = 1e-3;

/// Relative importance of each sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub price: f64,
    pub power: f64,
    pub year: f64,
    pub fuel: f64,
    pub brand: f64,
    pub body_type: f64,
    pub transmission: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: 0.25,
            power: 0.20,
            year: 0.15,
            fuel: 0.15,
            brand: 0.10,
            body_type: 0.10,
            transmission: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Price => self.price,
            Feature::Power => self.power,
            Feature::Year => self.year,
            Feature::Fuel => self.fuel,
            Feature::Brand => self.brand,
            Feature::BodyType => self.body_type,
            Feature::Transmission => self.transmission,
        }
    }

    fn get_mut(&mut self, feature: Feature) -> &mut f64 {
        match feature {
            Feature::Price => &mut self.price,
            Feature::Power => &mut self.power,
            Feature::Year => &mut self.year,
            Feature::Fuel => &mut self.fuel,
            Feature::Brand => &mut self.brand,
            Feature::BodyType => &mut self.body_type,
            Feature::Transmission => &mut self.transmission,
        }
    }

    /// Sum of the usable (finite, non-negative) weights
    pub fn total(&self) -> f64 {
        Feature::ALL.iter().map(|&f| sanitize(self.get(f))).sum()
    }

    /// Scale so the weights sum to 1. A vector with no usable weight falls
    /// back to the defaults.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total < MIN_WEIGHT_TOTAL {
            return Self::default();
        }
        let mut out = *self;
        for feature in Feature::ALL {
            *out.get_mut(feature) = sanitize(self.get(feature)) / total;
        }
        out
    }

    /// Multiply each weight by the importance the buyer attached to it, then
    /// normalize. Unstated importances leave their weight unchanged.
    pub fn with_importance(&self, preferences: &PreferenceSnapshot) -> Self {
        let mut out = *self;
        for feature in Feature::ALL {
            if let Some(importance) = preferences.importance(feature) {
                *out.get_mut(feature) = sanitize(self.get(feature)) * importance;
            }
        }
        out.normalized()
    }
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() { weight.max(0.0) } else { 0.0 }
}

/// Partial-match credit for categorical sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchScores {
    pub fuel_family: f64,
    pub brand_partial: f64,
    pub body_type_family: f64,
    /// Score of a categorical dimension the buyer left open
    pub unstated: f64,
}

impl Default for MatchScores {
    fn default() -> Self {
        Self {
            fuel_family: 0.7,
            brand_partial: 0.8,
            body_type_family: 0.7,
            unstated: 0.5,
        }
    }
}

/// The seven sub-scores of one (item, preferences) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureScores {
    pub price: f64,
    pub power: f64,
    pub year: f64,
    pub fuel: f64,
    pub brand: f64,
    pub body_type: f64,
    pub transmission: f64,
}

impl FeatureScores {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Price => self.price,
            Feature::Power => self.power,
            Feature::Year => self.year,
            Feature::Fuel => self.fuel,
            Feature::Brand => self.brand,
            Feature::BodyType => self.body_type,
            Feature::Transmission => self.transmission,
        }
    }
}

/// Scores candidates against preferences with normalized weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityScorer {
    weights: ScoringWeights,
    match_scores: MatchScores,
}

impl Default for UtilityScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl UtilityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights: weights.normalized(),
            match_scores: MatchScores::default(),
        }
    }

    pub fn with_match_scores(mut self, match_scores: MatchScores) -> Self {
        self.match_scores = match_scores;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Base weights adjusted by the buyer's importance map
    pub fn weights_for(&self, preferences: &PreferenceSnapshot) -> ScoringWeights {
        self.weights.with_importance(preferences)
    }

    /// Compute all seven sub-scores
    pub fn feature_scores(
        &self,
        item: &Item,
        preferences: &PreferenceSnapshot,
        pool: &PoolStats,
    ) -> FeatureScores {
        let m = &self.match_scores;
        FeatureScores {
            price: price_fit(item.price, preferences.max_budget, pool.price.as_ref()),
            power: power_fit(item.power, preferences.comfort_vs_sport, pool.power.as_ref()),
            year: recency_fit(item.year, pool.year.as_ref()),
            fuel: categorical_fit(
                &FUEL_FAMILIES,
                PreferenceSnapshot::stated(&preferences.fuel),
                &item.fuel,
                m.fuel_family,
                m.unstated,
            ),
            brand: categorical_fit(
                &BRAND_ALIASES,
                PreferenceSnapshot::stated(&preferences.brand),
                &item.brand,
                m.brand_partial,
                m.unstated,
            ),
            body_type: categorical_fit(
                &BODY_TYPE_GROUPS,
                PreferenceSnapshot::stated(&preferences.body_type),
                &item.body_type,
                m.body_type_family,
                m.unstated,
            ),
            transmission: transmission_fit(
                preferences.automatic_transmission,
                &item.transmission,
                m.unstated,
            ),
        }
    }

    /// Weighted sum of sub-scores, clamped to [0,1]
    pub fn utility(scores: &FeatureScores, weights: &ScoringWeights) -> f64 {
        Feature::ALL
            .iter()
            .map(|&f| scores.get(f) * weights.get(f))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// Sub-scores and utility in one call
    pub fn score(
        &self,
        item: &Item,
        preferences: &PreferenceSnapshot,
        pool: &PoolStats,
    ) -> (FeatureScores, f64) {
        let scores = self.feature_scores(item, preferences, pool);
        let utility = Self::utility(&scores, &self.weights_for(preferences));
        (scores, utility)
    }
}

/// Budget fit.
///
/// Under budget the score climbs through four bands so that spending close
/// to the budget wins: below half the budget 0..0.5, then 0.5..0.7,
/// 0.7..0.9 and 0.9..1.0 at exactly the budget. Over budget it drops to 0.5
/// and reaches 0 at 20% overage. Without a budget, closeness to the pool
/// mean relative to the pool's spread.
pub fn price_fit(price: f64, budget: Option<f64>, pool: Option<&NumericRange>) -> f64 {
    let budget = budget.filter(|b| b.is_finite() && *b > 0.0);
    let score = match budget {
        Some(budget) if price > budget => {
            let overage = (price - budget) / budget;
            if overage <= 0.05 {
                0.5 - (overage / 0.05) * 0.2
            } else {
                (0.3 - ((overage - 0.05) * 2.0).min(0.3)).max(0.0)
            }
        }
        Some(budget) => {
            let ratio = price / budget;
            if ratio >= 0.85 {
                0.9 + ((ratio - 0.85) / 0.15) * 0.1
            } else if ratio >= 0.70 {
                0.7 + ((ratio - 0.70) / 0.15) * 0.2
            } else if ratio >= 0.50 {
                0.5 + ((ratio - 0.50) / 0.20) * 0.2
            } else {
                (ratio / 0.5) * 0.5
            }
        }
        None => match pool {
            Some(range) if !range.is_degenerate() => {
                1.0 - (price - range.mean).abs() / range.span()
            }
            _ => 0.5,
        },
    };
    score.clamp(0.0, 1.0)
}

/// Power fit shaped by the comfort/sport dial.
///
/// Sporty buyers (dial < 0.4) get raw normalized power; comfort buyers
/// (dial > 0.6) peak at 0.4 of the pool range; everyone else peaks at the
/// middle.
pub fn power_fit(power: u32, comfort_vs_sport: f64, pool: Option<&NumericRange>) -> f64 {
    if power == 0 {
        return 0.5;
    }
    let normalized = catalog::normalize_in(pool, f64::from(power));
    let score = if comfort_vs_sport < 0.4 {
        normalized
    } else if comfort_vs_sport > 0.6 {
        1.0 - 2.0 * (normalized - 0.4).abs()
    } else {
        1.0 - 2.0 * (normalized - 0.5).abs()
    };
    score.clamp(0.0, 1.0)
}

/// Newer is better; placeholder years score neutral
pub fn recency_fit(year: u16, pool: Option<&NumericRange>) -> f64 {
    if year < MIN_VALID_YEAR {
        return 0.5;
    }
    catalog::normalize_in(pool, f64::from(year))
}

fn categorical_fit(
    table: &SynonymTable,
    preferred: Option<&str>,
    actual: &str,
    partial: f64,
    unstated: f64,
) -> f64 {
    let Some(preferred) = preferred else {
        return unstated;
    };
    match table.matches(preferred, actual) {
        MatchKind::Exact => 1.0,
        MatchKind::Family => partial,
        MatchKind::None => 0.0,
    }
}

fn transmission_fit(automatic: Option<bool>, actual: &str, unstated: f64) -> f64 {
    match automatic {
        None => unstated,
        Some(automatic) => {
            let wanted = TransmissionKind::from_automatic_flag(automatic);
            if TransmissionKind::infer(actual) == Some(wanted) { 1.0 } else { 0.0 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(price: f64, power: u32, year: u16) -> Item {
        Item {
            id: 1,
            brand: "Audi".to_string(),
            model: "A4".to_string(),
            power,
            fuel: "Petrol".to_string(),
            price,
            year,
            transmission: "Automatic".to_string(),
            body_type: "Sedan".to_string(),
        }
    }

    fn range(min: f64, max: f64, mean: f64) -> NumericRange {
        NumericRange { min, max, mean }
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_sums_to_one() {
        let weights = ScoringWeights {
            price: 3.0,
            power: 1.0,
            year: 0.5,
            fuel: 0.0,
            brand: 2.0,
            body_type: 0.25,
            transmission: 0.25,
        };
        let normalized = weights.normalized();
        assert!((normalized.total() - 1.0).abs() < 1e-6);
        assert!((normalized.price - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weights_fall_back_to_defaults() {
        let zero = ScoringWeights {
            price: 0.0,
            power: 0.0,
            year: 0.0,
            fuel: 0.0,
            brand: 0.0,
            body_type: 0.0,
            transmission: -1.0,
        };
        assert_eq!(zero.normalized(), ScoringWeights::default());
    }

    #[test]
    fn test_importance_reweights() {
        let prefs = PreferenceSnapshot::new()
            .with_importance(Feature::Brand, 0.0)
            .with_importance(Feature::Price, 1.5);
        let weights = ScoringWeights::default().with_importance(&prefs);

        assert_eq!(weights.brand, 0.0);
        assert!(weights.price > ScoringWeights::default().price);
        assert!((weights.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_price_fit_monotone_under_budget() {
        let budget = Some(20_000.0);
        let mut previous = -1.0;
        for step in 0..=50 {
            let ratio = 0.5 + f64::from(step) * 0.01;
            let score = price_fit(20_000.0 * ratio, budget, None);
            assert!(score >= previous, "not monotone at ratio {}", ratio);
            previous = score;
        }
        assert!((price_fit(20_000.0, budget, None) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_fit_decreases_over_budget() {
        let budget = Some(20_000.0);
        let mut previous = 2.0;
        for step in 1..=30 {
            let price = 20_000.0 * (1.0 + f64::from(step) * 0.01);
            let score = price_fit(price, budget, None);
            assert!(score <= previous);
            previous = score;
        }
        assert_eq!(price_fit(30_000.0, budget, None), 0.0);
        assert!((price_fit(22_000.0, budget, None) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_price_fit_band_ordering() {
        let budget = Some(20_000.0);
        let near_ceiling = price_fit(18_000.0, budget, None);
        let half = price_fit(10_000.0, budget, None);
        let over = price_fit(22_000.0, budget, None);
        assert!(near_ceiling > half && half > over);
        assert!((half - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_price_fit_without_budget_prefers_pool_mean() {
        let pool_range = range(8_000.0, 35_000.0, 22_333.33);
        let near_mean = price_fit(23_000.0, None, Some(&pool_range));
        let cheap = price_fit(8_000.0, None, Some(&pool_range));
        let dear = price_fit(35_000.0, None, Some(&pool_range));
        assert!(near_mean > dear && dear > cheap);

        let flat = range(10_000.0, 10_000.0, 10_000.0);
        assert_eq!(price_fit(10_000.0, None, Some(&flat)), 0.5);
        assert_eq!(price_fit(10_000.0, None, None), 0.5);
    }

    #[test]
    fn test_power_fit_follows_dial() {
        let pool_range = range(100.0, 300.0, 200.0);
        // sporty: strongest wins
        assert!(power_fit(300, 0.1, Some(&pool_range)) > power_fit(200, 0.1, Some(&pool_range)));
        // neutral: middle wins
        assert_eq!(power_fit(200, 0.5, Some(&pool_range)), 1.0);
        assert_eq!(power_fit(300, 0.5, Some(&pool_range)), 0.0);
        // comfort: peak at 0.4 of the range
        assert!((power_fit(180, 0.9, Some(&pool_range)) - 1.0).abs() < 1e-9);
        assert_eq!(power_fit(0, 0.1, Some(&pool_range)), 0.5);
    }

    #[test]
    fn test_recency_fit() {
        let pool_range = range(2010.0, 2020.0, 2015.0);
        assert_eq!(recency_fit(2020, Some(&pool_range)), 1.0);
        assert_eq!(recency_fit(2010, Some(&pool_range)), 0.0);
        assert_eq!(recency_fit(1800, Some(&pool_range)), 0.5);
    }

    #[test]
    fn test_categorical_scores() {
        let scorer = UtilityScorer::default();
        let pool = PoolStats::default();
        let item = Item {
            fuel: "Gasoline".to_string(),
            brand: "Mercedes-Benz".to_string(),
            body_type: "Estate".to_string(),
            transmission: "Manual".to_string(),
            ..car(20_000.0, 120, 2018)
        };
        let prefs = PreferenceSnapshot::new()
            .with_fuel("petrol")
            .with_brand("mercedes")
            .with_body_type("station")
            .with_automatic_transmission(true);

        let scores = scorer.feature_scores(&item, &prefs, &pool);
        assert_eq!(scores.fuel, 0.7);
        assert_eq!(scores.brand, 0.8);
        assert_eq!(scores.body_type, 0.7);
        assert_eq!(scores.transmission, 0.0);

        let open = scorer.feature_scores(&item, &PreferenceSnapshot::default(), &pool);
        assert_eq!(open.fuel, 0.5);
        assert_eq!(open.brand, 0.5);
        assert_eq!(open.transmission, 0.5);
    }

    #[test]
    fn test_non_ascii_brand_is_exact() {
        let item = Item {
            brand: "Škoda".to_string(),
            ..car(20_000.0, 120, 2018)
        };
        let prefs = PreferenceSnapshot::new().with_brand("škoda");
        let scores = UtilityScorer::default().feature_scores(&item, &prefs, &PoolStats::default());
        assert_eq!(scores.brand, 1.0);
    }

    #[test]
    fn test_custom_match_scores() {
        let scorer = UtilityScorer::default().with_match_scores(MatchScores {
            fuel_family: 0.4,
            ..MatchScores::default()
        });
        let item = Item {
            fuel: "Benzine".to_string(),
            ..car(20_000.0, 120, 2018)
        };
        let prefs = PreferenceSnapshot::new().with_fuel("petrol");
        let scores = scorer.feature_scores(&item, &prefs, &PoolStats::default());
        assert_eq!(scores.fuel, 0.4);
    }

    #[test]
    fn test_utility_is_bounded() {
        let scorer = UtilityScorer::default();
        let items = [car(5_000.0, 50, 2001), car(90_000.0, 400, 2024), car(0.0, 0, 1800)];
        let pool = PoolStats::from_items(&items);
        let prefs = PreferenceSnapshot::new()
            .with_max_budget(20_000.0)
            .with_brand("BMW")
            .with_comfort_vs_sport(0.0);

        for item in &items {
            let (_, utility) = scorer.score(item, &prefs, &pool);
            assert!((0.0..=1.0).contains(&utility));
        }
    }
}
