//! # Catalog Crate
//!
//! Domain model and in-memory catalog for the car recommender.
//!
//! ## Main Components
//!
//! - **types**: `Item`, `PreferenceSnapshot`, `Catalog`
//! - **stats**: min/max/mean over a candidate pool
//! - **synonyms**: fuel families, body-type groups, brand aliases, gearbox keywords
//! - **parser** / **index**: loading catalog files
//! - **error**: error types for loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{Catalog, PreferenceSnapshot};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/cars.csv"))?;
//! let prefs = PreferenceSnapshot::new().with_max_budget(25_000.0).with_brand("Audi");
//! println!("{} items, {} valid", catalog.len(), catalog.valid_items().len());
//! ```

pub mod error;
pub mod types;
pub mod stats;
pub mod synonyms;
pub mod parser;
pub mod index;

pub use error::{CatalogError, Result};
pub use stats::{NumericRange, PoolStats, normalize_in};
pub use synonyms::{
    BODY_TYPE_GROUPS, BRAND_ALIASES, FUEL_FAMILIES, MatchKind, SynonymGroup, SynonymTable,
    TransmissionKind, normalize, same_label,
};
pub use types::{
    // Type aliases
    ItemId,
    // Core types
    Item,
    Catalog,
    PreferenceSnapshot,
    PowerTarget,
    // Attribute enums
    NumericAttribute,
    CategoricalAttribute,
    Feature,
    // Constants
    MAX_IMPORTANCE,
    MIN_VALID_YEAR,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_creation() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.valid_items().is_empty());
    }

    #[test]
    fn test_default_preferences_are_neutral() {
        let prefs = PreferenceSnapshot::default();
        assert_eq!(prefs.comfort_vs_sport, 0.5);
        assert!(prefs.max_budget.is_none());
        assert!(prefs.importance.is_empty());
    }
}
