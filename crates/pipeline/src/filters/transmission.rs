//! Keeps items whose gearbox kind matches the automatic/manual preference.
//! Labels that infer to neither kind are excluded.

use crate::criteria::FilterCriteria;
use crate::traits::Filter;
use anyhow::Result;
use catalog::{Item, TransmissionKind};

pub struct TransmissionFilter;

impl Filter for TransmissionFilter {
    fn name(&self) -> &str {
        "TransmissionFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        let Some(automatic) = criteria.automatic_transmission else {
            return Ok(candidates);
        };
        let wanted = TransmissionKind::from_automatic_flag(automatic);
        Ok(candidates
            .into_iter()
            .filter(|item| TransmissionKind::infer(&item.transmission) == Some(wanted))
            .collect())
    }
}
