//! The FilterPipeline chains hard-constraint filters.
//!
//! Filters run in insertion order; the result is the conjunction of every
//! active criterion. An empty result is a normal outcome, not an error.

use crate::criteria::FilterCriteria;
use crate::filters::{
    BodyTypeFilter, BrandFilter, FuelFilter, PriceRangeFilter, TransmissionFilter,
    YearRangeFilter,
};
use crate::traits::Filter;
use anyhow::Result;
use catalog::Item;
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(PriceRangeFilter)
///     .add_filter(BrandFilter);
///
/// let filtered = pipeline.apply(catalog.all(), &criteria)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Pipeline with no filters; passes everything through
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Every hard constraint a preference snapshot can express
    pub fn hard_filter() -> Self {
        Self::new()
            .add_filter(PriceRangeFilter)
            .add_filter(FuelFilter)
            .add_filter(BrandFilter)
            .add_filter(BodyTypeFilter)
            .add_filter(TransmissionFilter)
            .add_filter(YearRangeFilter)
    }

    /// Append a filter; filters run in insertion order
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run the filters in order, stopping early once nothing is left
    pub fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>> {
        let mut current = candidates;
        for filter in &self.filters {
            if current.is_empty() {
                break;
            }
            let before = current.len();
            current = filter.apply(current, criteria)?;
            debug!("{}: {} -> {} candidates", filter.name(), before, current.len());
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
