//! Feature vector construction.
//!
//! A vector is three normalized numerics (price, year, power) followed by one
//! one-hot block per categorical attribute (brand, fuel, transmission, body
//! type). The layout is learned once from the catalog; every vector produced
//! afterwards has the same dimension.
//!
//! ## Concurrency
//! The learned vocabulary sits behind a `OnceLock`. Concurrent first calls to
//! `initialize` block on each other, exactly one scan runs, and no caller can
//! observe a half-built layout.

use crate::error::{Result, VectorError};
use catalog::synonyms::{TransmissionKind, normalize};
use catalog::{
    CategoricalAttribute, Item, NumericAttribute, NumericRange, PoolStats, PowerTarget,
    PreferenceSnapshot, normalize_in,
};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Number of numeric slots at the head of every vector
pub const NUMERIC_DIMENSIONS: usize = NumericAttribute::ALL.len();

/// Dense feature vector in the factory's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

/// Sorted vocabulary of one categorical attribute and its slot offset.
#[derive(Debug, Clone)]
pub struct CategoricalBlock {
    pub attribute: CategoricalAttribute,
    vocabulary: Vec<String>,
    offset: usize,
}

impl CategoricalBlock {
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Slot for a raw value: exact hit first, then the containment match
    /// (either direction) closest in length. `None` leaves the block zeroed.
    pub fn slot(&self, raw: &str) -> Option<usize> {
        let value = normalize(raw);
        if value.is_empty() {
            return None;
        }
        if let Ok(pos) = self.vocabulary.binary_search(&value) {
            return Some(pos);
        }
        self.vocabulary
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.contains(&value) || value.contains(entry.as_str()))
            .min_by_key(|(_, entry)| entry.len().abs_diff(value.len()))
            .map(|(pos, _)| pos)
    }

    /// Transmission preferences are a gearbox kind, not a label
    fn slot_for_transmission(&self, kind: TransmissionKind) -> Option<usize> {
        self.slot(kind.label()).or_else(|| {
            self.vocabulary
                .iter()
                .position(|entry| TransmissionKind::infer(entry) == Some(kind))
        })
    }

    fn encode(&self, slot: Option<usize>, out: &mut [f64]) {
        if let Some(pos) = slot {
            out[self.offset + pos] = 1.0;
        }
    }
}

/// Everything learned from the catalog scan.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    catalog_stats: PoolStats,
    blocks: Vec<CategoricalBlock>,
    dimension: usize,
}

impl Vocabulary {
    fn learn(items: &[Item]) -> Self {
        let catalog_stats = PoolStats::from_items(items);

        let mut offset = NUMERIC_DIMENSIONS;
        let mut blocks = Vec::with_capacity(CategoricalAttribute::ALL.len());
        for attribute in CategoricalAttribute::ALL {
            let vocabulary: Vec<String> = items
                .iter()
                .map(|item| normalize(attribute.value(item)))
                .filter(|value| !value.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let len = vocabulary.len();
            blocks.push(CategoricalBlock {
                attribute,
                vocabulary,
                offset,
            });
            offset += len;
        }

        Self {
            catalog_stats,
            blocks,
            dimension: offset,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn block(&self, attribute: CategoricalAttribute) -> Option<&CategoricalBlock> {
        self.blocks.iter().find(|block| block.attribute == attribute)
    }

    pub fn blocks(&self) -> &[CategoricalBlock] {
        &self.blocks
    }

    /// Catalog-wide min/max used for every numeric slot
    pub fn numeric_range(&self, attribute: NumericAttribute) -> Option<&NumericRange> {
        self.catalog_stats.range(attribute)
    }

    fn numeric_slot(attribute: NumericAttribute) -> usize {
        match attribute {
            NumericAttribute::Price => 0,
            NumericAttribute::Year => 1,
            NumericAttribute::Power => 2,
        }
    }
}

/// Builds item vectors and "ideal" preference vectors over one layout.
///
/// Construct one per catalog snapshot and hand out references.
#[derive(Debug, Default)]
pub struct FeatureVectorFactory {
    vocabulary: OnceLock<Vocabulary>,
}

impl FeatureVectorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory already initialized from `items`
    pub fn from_catalog(items: &[Item]) -> Self {
        let factory = Self::new();
        factory.initialize(items);
        factory
    }

    /// Learn ranges and vocabularies. Only the first call scans; later calls
    /// return the existing vocabulary untouched.
    pub fn initialize(&self, items: &[Item]) -> &Vocabulary {
        self.vocabulary.get_or_init(|| {
            let vocabulary = Vocabulary::learn(items);
            info!(
                "Initialized feature layout from {} items (dimension {})",
                items.len(),
                vocabulary.dimension()
            );
            vocabulary
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.vocabulary.get().is_some()
    }

    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.vocabulary.get().ok_or(VectorError::Uninitialized)
    }

    pub fn dimension(&self) -> Result<usize> {
        Ok(self.vocabulary()?.dimension())
    }

    /// Vector for a catalog item
    pub fn create_vector(&self, item: &Item) -> Result<FeatureVector> {
        let vocabulary = self.vocabulary()?;
        let mut values = vec![0.0; vocabulary.dimension()];

        for attribute in NumericAttribute::ALL {
            let slot = Vocabulary::numeric_slot(attribute);
            values[slot] = match attribute.value(item) {
                Some(raw) => normalize_in(vocabulary.numeric_range(attribute), raw),
                None => 0.5,
            };
        }
        for block in vocabulary.blocks() {
            block.encode(block.slot(block.attribute.value(item)), &mut values);
        }

        Ok(FeatureVector::new(values))
    }

    /// Vectors for many items, built in parallel
    pub fn create_vectors(&self, items: &[&Item]) -> Result<Vec<FeatureVector>> {
        items
            .par_iter()
            .map(|item| self.create_vector(item))
            .collect()
    }

    /// Vector describing the item the buyer asked for.
    ///
    /// Numeric slots the preferences leave open take the mean of `pool`
    /// (the catalog mean when the pool is empty). A desire-score power target
    /// is placed inside the pool's observed power range. Unstated
    /// categoricals leave their block zeroed.
    pub fn create_ideal_vector(
        &self,
        preferences: &PreferenceSnapshot,
        pool: &[&Item],
    ) -> Result<FeatureVector> {
        let vocabulary = self.vocabulary()?;
        let pool_stats = PoolStats::from_items(pool.iter().copied());
        let fallback_mean = |attribute: NumericAttribute| {
            pool_stats
                .mean(attribute)
                .or_else(|| vocabulary.catalog_stats.mean(attribute))
        };

        let price = preferences
            .max_budget
            .filter(|budget| *budget > 0.0)
            .or_else(|| fallback_mean(NumericAttribute::Price));

        let power = match preferences.power {
            Some(PowerTarget::Absolute(kw)) => Some(kw),
            Some(PowerTarget::Desire(score)) => pool_stats
                .power
                .or(vocabulary.catalog_stats.power)
                .map(|range| range.interpolate(score)),
            None => fallback_mean(NumericAttribute::Power),
        };

        let year = preferences
            .max_year
            .or(preferences.min_year)
            .map(f64::from)
            .or_else(|| fallback_mean(NumericAttribute::Year));

        let mut values = vec![0.0; vocabulary.dimension()];
        for (attribute, target) in [
            (NumericAttribute::Price, price),
            (NumericAttribute::Year, year),
            (NumericAttribute::Power, power),
        ] {
            values[Vocabulary::numeric_slot(attribute)] = match target {
                Some(raw) => normalize_in(vocabulary.numeric_range(attribute), raw),
                None => 0.5,
            };
        }

        for block in vocabulary.blocks() {
            let slot = match block.attribute {
                CategoricalAttribute::Brand => {
                    PreferenceSnapshot::stated(&preferences.brand).and_then(|v| block.slot(v))
                }
                CategoricalAttribute::Fuel => {
                    PreferenceSnapshot::stated(&preferences.fuel).and_then(|v| block.slot(v))
                }
                CategoricalAttribute::BodyType => {
                    PreferenceSnapshot::stated(&preferences.body_type).and_then(|v| block.slot(v))
                }
                CategoricalAttribute::Transmission => preferences
                    .automatic_transmission
                    .map(TransmissionKind::from_automatic_flag)
                    .and_then(|kind| block.slot_for_transmission(kind)),
            };
            block.encode(slot, &mut values);
        }

        debug!(
            "Built ideal vector (price={:?}, year={:?}, power={:?})",
            price, year, power
        );
        Ok(FeatureVector::new(values))
    }
}
