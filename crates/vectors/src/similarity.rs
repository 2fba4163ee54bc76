//! Vector similarity and distance.
//!
//! Both geometries sit behind `SimilarityMetric` so rankers can swap them
//! without knowing which one they hold.

use crate::error::{Result, VectorError};
use crate::factory::FeatureVector;

/// Similarity in [0,1] between two vectors of the same layout.
pub trait SimilarityMetric: Send + Sync {
    fn name(&self) -> &'static str;

    fn similarity(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64>;
}

/// Angle-based similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl SimilarityMetric for CosineSimilarity {
    fn name(&self) -> &'static str {
        "cosine"
    }

    fn similarity(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
        cosine_similarity(a, b)
    }
}

/// Distance-based similarity, `1 / (1 + euclidean distance)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanSimilarity;

impl SimilarityMetric for EuclideanSimilarity {
    fn name(&self) -> &'static str {
        "euclidean"
    }

    fn similarity(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
        euclidean_distance(a, b).map(distance_to_similarity)
    }
}

fn check_dimensions(a: &FeatureVector, b: &FeatureVector) -> Result<()> {
    if a.dimension() != b.dimension() {
        return Err(VectorError::DimensionMismatch {
            left: a.dimension(),
            right: b.dimension(),
        });
    }
    Ok(())
}

/// `dot(a,b) / (|a||b|)` clamped to [0,1]; zero magnitude gives 0.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
    check_dimensions(a, b)?;

    let (dot, norm_a, norm_b) = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0))
}

pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
    check_dimensions(a, b)?;
    let sum: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    Ok(sum.sqrt())
}

/// Monotone map from distance to (0,1]; identical vectors give 1.0
pub fn distance_to_similarity(distance: f64) -> f64 {
    1.0 / (1.0 + distance.max(0.0))
}
