//! # Evaluation
//!
//! Offline comparison of recommendation strategies on a catalog.
//!
//! ## Components
//! - **CrossValidationHarness**: k-fold splits, per-fold metrics, comparisons
//! - **AlgorithmRegistry**: algorithms by id (`cosine`, `knn`, `weighted`, `hybrid`, external)
//! - **HyperparameterSearch**: grid search over similarity weights
//! - **RelevanceJudge**: synthetic ground truth from shared attributes
//!
//! ## Example
//!
//! ```ignore
//! let harness = CrossValidationHarness::new(Arc::new(catalog));
//! let mut rng = StdRng::seed_from_u64(42);
//! let comparison = harness.compare_algorithms(5, 10, &mut rng)?;
//! println!("best precision: {:?}", comparison.best_precision);
//! ```

pub mod error;
pub mod weighted_similarity;
pub mod hyperparameter;
pub mod relevance;
pub mod metrics;
pub mod registry;
pub mod cross_validation;

pub use cross_validation::{
    AlgorithmComparison, CrossValidationConfig, CrossValidationHarness, CrossValidationResult,
    FoldMetrics, KFold, Split,
};
pub use error::{EvaluationError, Result};
pub use hyperparameter::{HyperparameterSearch, ParameterGrid, TuningOutcome, TuningResult};
pub use registry::{
    AlgorithmRegistry, CosineAlgorithm, ExternalAlgorithm, HybridAlgorithm, KnnAlgorithm,
    QueryContext, RecommendationAlgorithm, WeightedAlgorithm,
};
pub use relevance::RelevanceJudge;
pub use weighted_similarity::{SimilarityWeights, weighted_similarity};
