//! Hard-constraint filtering and utility scoring of car candidates.
//!
//! This crate provides:
//! - `Filter` trait and implementations for each hard constraint
//! - `FilterPipeline` for composing filters
//! - `FilterCriteria` derived from a `PreferenceSnapshot`
//! - `UtilityScorer` for the seven weighted sub-scores
//!
//! ## Architecture
//! 1. Filters remove items that violate a stated constraint (budget, fuel,
//!    brand, body type, gearbox, model year)
//! 2. The scorer rates the survivors against the pool's own statistics
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterCriteria, FilterPipeline, UtilityScorer};
//!
//! let criteria = FilterCriteria::from(&prefs);
//! let candidates = FilterPipeline::hard_filter().apply(catalog.all(), &criteria)?;
//!
//! let pool = PoolStats::from_items(candidates.iter().copied());
//! let scorer = UtilityScorer::default();
//! let (scores, utility) = scorer.score(candidates[0], &prefs, &pool);
//! ```

pub mod traits;
pub mod criteria;
pub mod filters;
pub mod filter_pipeline;
pub mod scoring;

// Re-export main types
pub use criteria::FilterCriteria;
pub use filter_pipeline::FilterPipeline;
pub use scoring::{FeatureScores, MatchScores, ScoringWeights, UtilityScorer};
pub use traits::Filter;
