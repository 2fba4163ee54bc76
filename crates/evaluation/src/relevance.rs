//! Synthetic ground truth for evaluation.
//!
//! A training item counts as relevant to a query when it shares most
//! categorical attributes with it, or shares some and sits close on price,
//! year and power.

use std::collections::HashSet;

use catalog::{Item, ItemId, same_label};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceJudge {
    /// Shared categoricals that make an item relevant on their own
    pub strong_shared: usize,
    /// Shared categoricals needed alongside numeric closeness
    pub near_shared: usize,
    /// Relative price tolerance
    pub price_tolerance: f64,
    /// Model years either side
    pub year_tolerance: u16,
    /// Relative power tolerance
    pub power_tolerance: f64,
    pub max_relevant: usize,
}

impl Default for RelevanceJudge {
    fn default() -> Self {
        Self {
            strong_shared: 3,
            near_shared: 2,
            price_tolerance: 0.20,
            year_tolerance: 3,
            power_tolerance: 0.15,
            max_relevant: 20,
        }
    }
}

impl RelevanceJudge {
    /// Brand, fuel, transmission and body type labels equal to the query's
    /// after normalization
    pub fn shared_attributes(query: &Item, candidate: &Item) -> usize {
        [
            (&query.brand, &candidate.brand),
            (&query.fuel, &candidate.fuel),
            (&query.transmission, &candidate.transmission),
            (&query.body_type, &candidate.body_type),
        ]
        .into_iter()
        .filter(|(a, b)| same_label(a, b))
        .count()
    }

    fn is_near(&self, query: &Item, candidate: &Item) -> bool {
        let price_ok = (candidate.price - query.price).abs() <= query.price * self.price_tolerance;
        let year_ok = candidate.year.abs_diff(query.year) <= self.year_tolerance;
        let power_ok = (f64::from(candidate.power) - f64::from(query.power)).abs()
            <= f64::from(query.power) * self.power_tolerance;
        price_ok && year_ok && power_ok
    }

    pub fn is_relevant(&self, query: &Item, candidate: &Item) -> bool {
        if candidate.id == query.id {
            return false;
        }
        let shared = Self::shared_attributes(query, candidate);
        shared >= self.strong_shared || (shared >= self.near_shared && self.is_near(query, candidate))
    }

    /// Relevant ids among `pool`, the first `max_relevant` in pool order
    pub fn relevant_ids(&self, query: &Item, pool: &[&Item]) -> HashSet<ItemId> {
        pool.iter()
            .filter(|candidate| self.is_relevant(query, candidate))
            .take(self.max_relevant)
            .map(|candidate| candidate.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: u32, brand: &str, fuel: &str, price: f64, power: u32, year: u16) -> Item {
        Item {
            id,
            brand: brand.to_string(),
            model: format!("M{}", id),
            power,
            fuel: fuel.to_string(),
            price,
            year,
            transmission: "Manual".to_string(),
            body_type: "Hatchback".to_string(),
        }
    }

    #[test]
    fn test_three_shared_attributes_are_enough() {
        let judge = RelevanceJudge::default();
        let query = car(1, "Fiat", "Petrol", 10_000.0, 50, 2015);
        // fuel, transmission, body type shared; numbers far apart
        let other = car(2, "Mazda", "Petrol", 40_000.0, 200, 2023);
        assert_eq!(RelevanceJudge::shared_attributes(&query, &other), 3);
        assert!(judge.is_relevant(&query, &other));
    }

    #[test]
    fn test_two_shared_need_numeric_closeness() {
        let judge = RelevanceJudge::default();
        let query = car(1, "Fiat", "Petrol", 10_000.0, 100, 2015);
        let close = car(2, "Mazda", "Diesel", 11_500.0, 110, 2017);
        let far = car(3, "Mazda", "Diesel", 13_000.0, 110, 2017);
        assert!(judge.is_relevant(&query, &close));
        assert!(!judge.is_relevant(&query, &far));
    }

    #[test]
    fn test_query_is_never_relevant_to_itself() {
        let query = car(1, "Fiat", "Petrol", 10_000.0, 100, 2015);
        assert!(!RelevanceJudge::default().is_relevant(&query, &query));
    }

    #[test]
    fn test_relevant_set_is_capped() {
        let query = car(0, "Fiat", "Petrol", 10_000.0, 100, 2015);
        let pool: Vec<Item> = (1..=30).map(|i| car(i, "Fiat", "Petrol", 10_000.0, 100, 2015)).collect();
        let refs: Vec<&Item> = pool.iter().collect();
        let relevant = RelevanceJudge::default().relevant_ids(&query, &refs);
        assert_eq!(relevant.len(), 20);
        assert!(relevant.contains(&1) && !relevant.contains(&21));
    }

    #[test]
    fn test_non_ascii_labels_are_shared() {
        let query = car(1, "Škoda", "Elektrisch", 30_000.0, 150, 2021);
        let other = car(2, "ŠKODA", "elektrisch", 90_000.0, 400, 2010);
        assert_eq!(RelevanceJudge::shared_attributes(&query, &other), 4);
    }
}
