//! # Engine
//!
//! Request-level recommendation flow over an in-memory catalog.
//!
//! ## Components
//! - **RecommendationOrchestrator**: filter, score, rank and explain
//! - **RankAggregator**: final score, variant dedupe and near-tie shuffling
//! - **ExternalScorer**: seam for an externally trained model
//! - **EngineConfig**: JSON-loadable weights and thresholds
//!
//! ## Example
//!
//! ```ignore
//! let orchestrator = RecommendationOrchestrator::new(Arc::new(catalog), EngineConfig::default());
//! let prefs = PreferenceSnapshot::new().with_max_budget(25_000.0).with_brand("Audi");
//! for rec in orchestrator.recommend_from_preferences(&prefs, 5)? {
//!     println!("{}. {}", rec.rank, rec.explanation);
//! }
//! ```

pub mod config;
pub mod explanation;
pub mod external;
pub mod orchestrator;
pub mod ranking;

pub use config::EngineConfig;
pub use explanation::{explain, format_price, importance_label};
pub use external::{ExternalScorer, NEUTRAL_EXTERNAL_SCORE, ScorerError, score_or_neutral};
pub use orchestrator::{Recommendation, RecommendationOrchestrator};
pub use ranking::{
    RankAggregator, RankingWeights, ScoreBreakdown, ScoredItem, deduplicate_variants,
    first_per_variant,
};
