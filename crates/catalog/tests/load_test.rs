//! Loading the bundled sample catalog.

use catalog::{Catalog, CatalogError, PoolStats};
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/cars.csv")
}

#[test]
fn test_sample_catalog_loads() {
    let catalog = Catalog::load_from_file(&sample_path()).unwrap();
    assert_eq!(catalog.len(), 46);
    assert_eq!(catalog.valid_items().len(), 46);

    let golf = catalog.get(1).unwrap();
    assert_eq!(golf.brand, "Volkswagen");
    assert_eq!(golf.power, 85);
    assert_eq!(golf.body_type, "Hatchback");

    let stats = PoolStats::from_items(catalog.items());
    assert_eq!(stats.price.unwrap().min, 8_000.0);
    assert_eq!(stats.year.unwrap().max, 2022.0);
}

#[test]
fn test_search_matches_brand_and_model() {
    let catalog = Catalog::load_from_file(&sample_path()).unwrap();
    let golfs = catalog.search("volkswagen golf");
    assert_eq!(golfs.len(), 2);
    assert_eq!(catalog.search("TESLA").len(), 1);
}

#[test]
fn test_missing_file_is_reported() {
    let result = Catalog::load_from_file(&sample_path().with_file_name("missing.csv"));
    assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));
}
