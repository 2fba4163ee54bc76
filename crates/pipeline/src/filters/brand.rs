//! Keeps items of exactly the requested brand, compared after
//! normalization (Unicode lower-casing).

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use anyhow::Result;
use catalog::{Item, same_label};

pub struct BrandFilter;

impl Filter for BrandFilter {
    fn name(&self) -> &str {
        "BrandFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        let Some(brand) = criteria.brand.as_deref() else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|item| same_label(brand, &item.brand))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{create_test_items, ids};

    #[test]
    fn test_brand_is_exact_and_case_insensitive() {
        let items = create_test_items();
        let criteria = FilterCriteria {
            brand: Some("audi".to_string()),
            ..Default::default()
        };
        let filtered = BrandFilter.apply(items.iter().collect(), &criteria).unwrap();
        assert_eq!(ids(&filtered), vec![1]);

        // aliases only count when scoring, never when filtering
        let criteria = FilterCriteria {
            brand: Some("vw".to_string()),
            ..Default::default()
        };
        assert!(BrandFilter.apply(items.iter().collect(), &criteria).unwrap().is_empty());
    }

    #[test]
    fn test_non_ascii_brand_agrees_with_scoring() {
        let mut skoda = create_test_items().remove(0);
        skoda.brand = "Škoda".to_string();
        let criteria = FilterCriteria {
            brand: Some("škoda".to_string()),
            ..Default::default()
        };
        let filtered = BrandFilter.apply(vec![&skoda], &criteria).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(
            catalog::BRAND_ALIASES.matches("škoda", &skoda.brand),
            catalog::MatchKind::Exact
        );
    }
}
