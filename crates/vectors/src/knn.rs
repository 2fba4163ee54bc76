//! Nearest-neighbour search by Euclidean distance.
//!
//! ## Algorithm
//! 1. Build the reference vector (a target item or the ideal vector)
//! 2. Vectorize every candidate and measure its distance (in parallel)
//! 3. Sort ascending by distance, ties broken by id
//! 4. Keep the first k and attach rank and `1/(1+d)` similarity
//!
//! Linear scan; there is no index to maintain.

use crate::error::Result;
use crate::factory::{FeatureVector, FeatureVectorFactory};
use crate::similarity::{distance_to_similarity, euclidean_distance};
use catalog::{Item, PreferenceSnapshot};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// One search hit borrowed from the candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    pub item: &'a Item,
    pub distance: f64,
    pub similarity: f64,
    /// 1-based position in the result
    pub rank: usize,
}

impl Neighbor<'_> {
    pub fn explanation(&self, k: usize) -> String {
        format!(
            "KNN distance: {:.4} (rank {}/{})",
            self.distance, self.rank, k
        )
    }
}

/// k-NN ranker over vectors from a shared factory.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighborRanker<'f> {
    factory: &'f FeatureVectorFactory,
}

impl<'f> NearestNeighborRanker<'f> {
    pub fn new(factory: &'f FeatureVectorFactory) -> Self {
        Self { factory }
    }

    /// The k candidates closest to `target`, excluding `target` itself by id
    #[instrument(skip(self, target, candidates), fields(target_id = target.id, candidates = candidates.len()))]
    pub fn find_nearest_neighbors<'a>(
        &self,
        target: &Item,
        candidates: &[&'a Item],
        k: usize,
    ) -> Result<Vec<Neighbor<'a>>> {
        let reference = self.factory.create_vector(target)?;
        self.rank_against(&reference, candidates, Some(target.id), k)
    }

    /// The k candidates closest to the ideal vector of `preferences`
    #[instrument(skip(self, preferences, candidates), fields(candidates = candidates.len()))]
    pub fn find_nearest_neighbors_from_preferences<'a>(
        &self,
        preferences: &PreferenceSnapshot,
        candidates: &[&'a Item],
        k: usize,
    ) -> Result<Vec<Neighbor<'a>>> {
        let reference = self.factory.create_ideal_vector(preferences, candidates)?;
        self.rank_against(&reference, candidates, None, k)
    }

    fn rank_against<'a>(
        &self,
        reference: &FeatureVector,
        candidates: &[&'a Item],
        exclude: Option<u32>,
        k: usize,
    ) -> Result<Vec<Neighbor<'a>>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut distances: Vec<(&'a Item, f64)> = candidates
            .par_iter()
            .filter(|item| Some(item.id) != exclude)
            .map(|&item| -> Result<(&'a Item, f64)> {
                let vector = self.factory.create_vector(item)?;
                Ok((item, euclidean_distance(reference, &vector)?))
            })
            .collect::<Result<_>>()?;

        distances.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        distances.truncate(k);

        debug!("Selected {} neighbours", distances.len());
        Ok(distances
            .into_iter()
            .enumerate()
            .map(|(pos, (item, distance))| Neighbor {
                item,
                distance,
                similarity: distance_to_similarity(distance),
                rank: pos + 1,
            })
            .collect())
    }
}
