//! The `Filter` seam shared by every hard constraint.

use crate::criteria::FilterCriteria;
use anyhow::Result;
use catalog::Item;

/// A hard constraint over candidate items.
///
/// Filters take ownership of the borrowed candidate list and return the
/// survivors. A filter whose criterion is unset must return its input
/// unchanged.
pub trait Filter: Send + Sync {
    /// Label used in pipeline logs
    fn name(&self) -> &str;

    /// Survivors of this constraint, in input order
    fn apply<'a>(
        &self,
        candidates: Vec<&'a Item>,
        criteria: &FilterCriteria,
    ) -> Result<Vec<&'a Item>>;
}
