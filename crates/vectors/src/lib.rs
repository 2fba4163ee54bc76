//! Feature vectors and the geometries used to compare them.
//!
//! - **factory**: learns the vector layout from the catalog and builds item
//!   and ideal-preference vectors
//! - **similarity**: cosine and Euclidean metrics behind `SimilarityMetric`
//! - **knn**: nearest-neighbour ranking by Euclidean distance
//!
//! ## Example Usage
//! ```ignore
//! use vectors::{FeatureVectorFactory, NearestNeighborRanker};
//!
//! let factory = FeatureVectorFactory::from_catalog(catalog.items());
//! let ranker = NearestNeighborRanker::new(&factory);
//! let neighbours = ranker.find_nearest_neighbors(&target, &catalog.all(), 5)?;
//! ```

pub mod error;
pub mod factory;
pub mod similarity;
pub mod knn;

pub use error::{Result, VectorError};
pub use factory::{CategoricalBlock, FeatureVector, FeatureVectorFactory, Vocabulary, NUMERIC_DIMENSIONS};
pub use knn::{NearestNeighborRanker, Neighbor};
pub use similarity::{
    CosineSimilarity, EuclideanSimilarity, SimilarityMetric, cosine_similarity,
    distance_to_similarity, euclidean_distance,
};
