//! Keeps items whose fuel matches the preference exactly or by family
//! (e.g. "petrol" accepts "Gasoline", "hybrid" accepts "Plug-in Hybrid").

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use anyhow::Result;
use catalog::{FUEL_FAMILIES, Item, MatchKind};

pub struct FuelFilter;

impl Filter for FuelFilter {
    fn name(&self) -> &str {
        "FuelFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        let Some(fuel) = criteria.fuel.as_deref() else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|item| FUEL_FAMILIES.matches(fuel, &item.fuel) != MatchKind::None)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{create_test_items, ids};

    fn run(fuel: &str) -> Vec<u32> {
        let items = create_test_items();
        let criteria = FilterCriteria {
            fuel: Some(fuel.to_string()),
            ..Default::default()
        };
        ids(&FuelFilter.apply(items.iter().collect(), &criteria).unwrap())
    }

    #[test]
    fn test_fuel_family_matching() {
        assert_eq!(run("petrol"), vec![1, 4]);
        assert_eq!(run("Hybrid"), vec![3]);
        assert_eq!(run("diesel"), vec![2]);
        assert!(run("hydrogen").is_empty());
    }
}
