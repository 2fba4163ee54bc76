//! Keeps items whose body type matches the preference or its synonym group.
//! Items without a body type never match a stated preference.

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use anyhow::Result;
use catalog::{BODY_TYPE_GROUPS, Item, MatchKind};

pub struct BodyTypeFilter;

impl Filter for BodyTypeFilter {
    fn name(&self) -> &str {
        "BodyTypeFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        let Some(body_type) = criteria.body_type.as_deref() else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|item| BODY_TYPE_GROUPS.matches(body_type, &item.body_type) != MatchKind::None)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{car, create_test_items, ids};

    #[test]
    fn test_body_type_synonyms() {
        let items = create_test_items();
        let criteria = FilterCriteria {
            body_type: Some("SUV".to_string()),
            ..Default::default()
        };
        let filtered = BodyTypeFilter.apply(items.iter().collect(), &criteria).unwrap();
        assert_eq!(ids(&filtered), vec![3, 5]);
    }

    #[test]
    fn test_missing_body_type_never_matches() {
        let items = vec![car(9, "Fiat", "Petrol", 9_000.0, 2015, "Manual", "")];
        let criteria = FilterCriteria {
            body_type: Some("hatchback".to_string()),
            ..Default::default()
        };
        assert!(BodyTypeFilter.apply(items.iter().collect(), &criteria).unwrap().is_empty());
    }
}
