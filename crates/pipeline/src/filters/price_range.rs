//! Keeps items whose price lies inside the requested budget.

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use anyhow::Result;
use catalog::Item;

pub struct PriceRangeFilter;

impl Filter for PriceRangeFilter {
    fn name(&self) -> &str {
        "PriceRangeFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        if criteria.min_price.is_none() && criteria.max_price.is_none() {
            return Ok(candidates);
        }
        let min = criteria.min_price.unwrap_or(f64::NEG_INFINITY);
        let max = criteria.max_price.unwrap_or(f64::INFINITY);

        Ok(candidates
            .into_iter()
            .filter(|item| item.price >= min && item.price <= max)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{create_test_items, ids};

    #[test]
    fn test_max_budget_is_inclusive() {
        let items = create_test_items();
        let criteria = FilterCriteria {
            max_price: Some(23_000.0),
            ..Default::default()
        };
        let filtered = PriceRangeFilter.apply(items.iter().collect(), &criteria).unwrap();
        assert_eq!(ids(&filtered), vec![1, 4]);
    }

    #[test]
    fn test_price_window() {
        let items = create_test_items();
        let criteria = FilterCriteria {
            min_price: Some(20_000.0),
            max_price: Some(30_000.0),
            ..Default::default()
        };
        let filtered = PriceRangeFilter.apply(items.iter().collect(), &criteria).unwrap();
        assert_eq!(ids(&filtered), vec![1, 3]);
    }
}
