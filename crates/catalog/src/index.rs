//! Catalog loading and integrity checks.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::{Catalog, Item};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

impl Catalog {
    /// Load a catalog file (JSON array or delimited text) and validate it.
    ///
    /// Duplicate ids are rejected rather than silently merged.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", path);
        let items = parser::parse_catalog_file(path)?;
        if items.is_empty() {
            return Err(CatalogError::Empty(path.display().to_string()));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
        }

        let catalog = Catalog::from_items(items);
        catalog.validate()?;

        info!(
            "Loaded {} items ({} valid for scoring)",
            catalog.len(),
            catalog.valid_items().len()
        );
        Ok(catalog)
    }

    /// Reject values no listing can have: non-finite or negative prices
    /// and model years in the future beyond the next model year.
    pub fn validate(&self) -> Result<()> {
        for item in self.items() {
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(CatalogError::InvalidValue {
                    field: "price".to_string(),
                    value: item.price.to_string(),
                });
            }
            if item.year > 2100 {
                return Err(CatalogError::InvalidValue {
                    field: "year".to_string(),
                    value: item.year.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Keep the highest-priced listing per brand + model + year.
    ///
    /// First-seen order of the surviving listings is preserved.
    pub fn deduplicate_variants(&self) -> Catalog {
        let mut best: HashMap<(String, String, u16), usize> = HashMap::new();
        let mut order: Vec<(String, String, u16)> = Vec::new();

        for (pos, item) in self.items().iter().enumerate() {
            let (brand, model) = item.variant_key();
            let key = (brand, model, item.year);
            match best.get_mut(&key) {
                Some(existing) => {
                    if item.price > self.items()[*existing].price {
                        *existing = pos;
                    }
                }
                None => {
                    order.push(key.clone());
                    best.insert(key, pos);
                }
            }
        }

        let items: Vec<Item> = order
            .iter()
            .filter_map(|key| best.get(key))
            .map(|&pos| self.items()[pos].clone())
            .collect();
        Catalog::from_items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn car(id: u32, model: &str, price: f64, year: u16) -> Item {
        Item {
            id,
            brand: "Audi".to_string(),
            model: model.to_string(),
            power: 110,
            fuel: "Petrol".to_string(),
            price,
            year,
            transmission: "Manual".to_string(),
            body_type: "Sedan".to_string(),
        }
    }

    #[test]
    fn test_deduplicate_keeps_highest_price() {
        let catalog = Catalog::from_items(vec![
            car(1, "A4", 20_000.0, 2018),
            car(2, "a4 ", 22_000.0, 2018),
            car(3, "A4", 25_000.0, 2020),
            car(4, "A3", 18_000.0, 2018),
        ]);

        let deduped = catalog.deduplicate_variants();
        let ids: Vec<u32> = deduped.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let catalog = Catalog::from_items(vec![car(1, "A4", -5.0, 2018)]);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_from_file_rejects_duplicate_ids() {
        let path = std::env::temp_dir().join(format!("catalog-dup-{}.csv", std::process::id()));
        fs::write(
            &path,
            "id,brand,model,power,fuel,price,year\n1,Audi,A4,100,Petrol,20000,2018\n1,BMW,320i,120,Petrol,25000,2019\n",
        )
        .unwrap();

        let result = Catalog::load_from_file(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(CatalogError::DuplicateId(1))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Catalog::load_from_file(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));
    }
}
