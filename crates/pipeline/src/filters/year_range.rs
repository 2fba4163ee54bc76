//! Keeps items built inside the requested model-year window.

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use anyhow::Result;
use catalog::Item;

pub struct YearRangeFilter;

impl Filter for YearRangeFilter {
    fn name(&self) -> &str {
        "YearRangeFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        if criteria.min_year.is_none() && criteria.max_year.is_none() {
            return Ok(candidates);
        }
        let min = criteria.min_year.unwrap_or(u16::MIN);
        let max = criteria.max_year.unwrap_or(u16::MAX);
        Ok(candidates
            .into_iter()
            .filter(|item| (min..=max).contains(&item.year))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{create_test_items, ids};

    #[test]
    fn test_year_window() {
        let items = create_test_items();
        let criteria = FilterCriteria {
            min_year: Some(2019),
            max_year: Some(2022),
            ..Default::default()
        };
        let filtered = YearRangeFilter.apply(items.iter().collect(), &criteria).unwrap();
        assert_eq!(ids(&filtered), vec![1, 2, 3]);
    }
}
