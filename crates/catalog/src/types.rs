//! Core domain types for the car catalog.
//!
//! - `Item`: one listing with its numeric and categorical attributes
//! - `PreferenceSnapshot`: what a buyer asked for in a single request
//! - `Catalog`: in-memory container owning every item

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Stable identifier of a catalog item
pub type ItemId = u32;

/// Lowest model year considered a real value rather than a placeholder
pub const MIN_VALID_YEAR: u16 = 1900;

/// Highest importance a caller may attach to a preference
pub const MAX_IMPORTANCE: f64 = 1.5;

/// A single car listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub brand: String,
    pub model: String,
    /// Engine power in kW
    pub power: u32,
    pub fuel: String,
    pub price: f64,
    pub year: u16,
    #[serde(default)]
    pub transmission: String,
    #[serde(default, alias = "bodyType")]
    pub body_type: String,
}

impl Item {
    /// Items with a placeholder price, power or year are kept in the catalog
    /// but skipped by scoring and evaluation.
    pub fn is_valid(&self) -> bool {
        self.power > 0 && self.price > 0.0 && self.year >= MIN_VALID_YEAR
    }

    /// Human readable "Brand Model (year)" label
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.year)
    }

    /// Case-insensitive (brand, model) key used to collapse variants
    pub fn variant_key(&self) -> (String, String) {
        (
            self.brand.trim().to_lowercase(),
            self.model.trim().to_lowercase(),
        )
    }
}

/// Numeric attributes in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericAttribute {
    Price,
    Year,
    Power,
}

impl NumericAttribute {
    pub const ALL: [NumericAttribute; 3] = [Self::Price, Self::Year, Self::Power];

    /// Raw value, or `None` when the item carries a placeholder
    pub fn value(self, item: &Item) -> Option<f64> {
        match self {
            Self::Price if item.price > 0.0 => Some(item.price),
            Self::Year if item.year >= MIN_VALID_YEAR => Some(f64::from(item.year)),
            Self::Power if item.power > 0 => Some(f64::from(item.power)),
            _ => None,
        }
    }
}

/// Categorical attributes in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalAttribute {
    Brand,
    Fuel,
    Transmission,
    BodyType,
}

impl CategoricalAttribute {
    pub const ALL: [CategoricalAttribute; 4] = [
        Self::Brand,
        Self::Fuel,
        Self::Transmission,
        Self::BodyType,
    ];

    pub fn value(self, item: &Item) -> &str {
        match self {
            Self::Brand => &item.brand,
            Self::Fuel => &item.fuel,
            Self::Transmission => &item.transmission,
            Self::BodyType => &item.body_type,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Fuel => "fuel",
            Self::Transmission => "transmission",
            Self::BodyType => "body type",
        }
    }
}

/// The seven scored dimensions of a preference match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Price,
    Power,
    Year,
    Fuel,
    Brand,
    BodyType,
    Transmission,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Self::Price,
        Self::Power,
        Self::Year,
        Self::Fuel,
        Self::Brand,
        Self::BodyType,
        Self::Transmission,
    ];

    /// Key used in the preference importance map
    pub fn key(self) -> &'static str {
        match self {
            Self::Price => "budget",
            Self::Power => "power",
            Self::Year => "year",
            Self::Fuel => "fuel",
            Self::Brand => "brand",
            Self::BodyType => "bodytype",
            Self::Transmission => "transmission",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match normalize_key(key).as_str() {
            "budget" | "price" => Some(Self::Price),
            "power" => Some(Self::Power),
            "year" | "recency" => Some(Self::Year),
            "fuel" => Some(Self::Fuel),
            "brand" => Some(Self::Brand),
            "bodytype" | "body" => Some(Self::BodyType),
            "transmission" => Some(Self::Transmission),
            _ => None,
        }
    }
}

/// "Body Type" and "body_type" both become "bodytype"
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Requested engine power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerTarget {
    /// Desire score in [0,1], mapped into the pool's observed power range
    Desire(f64),
    /// Concrete power in kW
    Absolute(f64),
}

impl PowerTarget {
    /// Interpret a raw number: above 100 is kW, 0..=1 is a desire score,
    /// anything else carries no usable target.
    pub fn from_raw(raw: f64) -> Option<Self> {
        if !raw.is_finite() {
            None
        } else if raw > 100.0 {
            Some(Self::Absolute(raw))
        } else if (0.0..=1.0).contains(&raw) {
            Some(Self::Desire(raw))
        } else {
            None
        }
    }
}

/// Buyer preferences for one request. Read-only for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSnapshot {
    pub max_budget: Option<f64>,
    pub min_budget: Option<f64>,
    pub power: Option<PowerTarget>,
    pub fuel: Option<String>,
    pub brand: Option<String>,
    pub body_type: Option<String>,
    pub automatic_transmission: Option<bool>,
    pub min_year: Option<u16>,
    pub max_year: Option<u16>,
    /// 0 = sporty, 1 = comfortable
    pub comfort_vs_sport: f64,
    /// Importance per feature key, each in [0, 1.5]
    pub importance: BTreeMap<String, f64>,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self {
            max_budget: None,
            min_budget: None,
            power: None,
            fuel: None,
            brand: None,
            body_type: None,
            automatic_transmission: None,
            min_year: None,
            max_year: None,
            comfort_vs_sport: 0.5,
            importance: BTreeMap::new(),
        }
    }
}

impl PreferenceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_budget(mut self, budget: f64) -> Self {
        self.max_budget = Some(budget);
        self
    }

    pub fn with_min_budget(mut self, budget: f64) -> Self {
        self.min_budget = Some(budget);
        self
    }

    pub fn with_power(mut self, target: PowerTarget) -> Self {
        self.power = Some(target);
        self
    }

    pub fn with_fuel(mut self, fuel: impl Into<String>) -> Self {
        self.fuel = Some(fuel.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_body_type(mut self, body_type: impl Into<String>) -> Self {
        self.body_type = Some(body_type.into());
        self
    }

    pub fn with_automatic_transmission(mut self, automatic: bool) -> Self {
        self.automatic_transmission = Some(automatic);
        self
    }

    pub fn with_year_range(mut self, min: Option<u16>, max: Option<u16>) -> Self {
        self.min_year = min;
        self.max_year = max;
        self
    }

    /// Set the comfort/sport dial, clamped to [0,1]
    pub fn with_comfort_vs_sport(mut self, dial: f64) -> Self {
        self.comfort_vs_sport = if dial.is_finite() {
            dial.clamp(0.0, 1.0)
        } else {
            0.5
        };
        self
    }

    pub fn with_importance(mut self, feature: Feature, importance: f64) -> Self {
        self.importance
            .insert(feature.key().to_string(), importance);
        self
    }

    /// Importance of a feature clamped to [0, 1.5], `None` when unstated.
    ///
    /// When several keys name the same feature ("budget" and "price"), the
    /// canonical key from `Feature::key` wins; otherwise the first alias in
    /// key order.
    pub fn importance(&self, feature: Feature) -> Option<f64> {
        let matching: Vec<(&String, &f64)> = self
            .importance
            .iter()
            .filter(|(key, _)| Feature::from_key(key) == Some(feature))
            .collect();
        let &(_, &value) = matching
            .iter()
            .find(|(key, _)| normalize_key(key) == feature.key())
            .or_else(|| matching.first())?;
        Some(if value.is_finite() {
            value.clamp(0.0, MAX_IMPORTANCE)
        } else {
            0.0
        })
    }

    /// Preferences that describe a reference item: its brand, fuel, body
    /// type, transmission, power and price as the budget ceiling.
    pub fn from_reference_item(item: &Item) -> Self {
        let mut prefs = Self::default();
        if item.price > 0.0 {
            prefs.max_budget = Some(item.price);
        }
        if item.power > 0 {
            prefs.power = Some(PowerTarget::Absolute(f64::from(item.power)));
        }
        prefs.brand = non_empty(&item.brand);
        prefs.fuel = non_empty(&item.fuel);
        prefs.body_type = non_empty(&item.body_type);
        prefs.automatic_transmission =
            crate::synonyms::TransmissionKind::infer(&item.transmission)
                .map(|kind| kind == crate::synonyms::TransmissionKind::Automatic);
        prefs
    }

    /// Trimmed, non-empty view of an optional categorical preference
    pub fn stated(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// In-memory catalog. Owns every item; consumers borrow.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    by_id: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from items; a later duplicate id replaces the earlier one.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Insert an item, replacing any existing item with the same id
    pub fn insert(&mut self, item: Item) {
        match self.by_id.get(&item.id) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.by_id.insert(item.id, self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.by_id.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Borrowed view over every item, the shape filters consume
    pub fn all(&self) -> Vec<&Item> {
        self.items.iter().collect()
    }

    /// Items with real price, power and year
    pub fn valid_items(&self) -> Vec<&Item> {
        self.items.iter().filter(|item| item.is_valid()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive substring search over brand and model
    pub fn search(&self, query: &str) -> Vec<&Item> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                let label = format!("{} {}", item.brand, item.model).to_lowercase();
                label.contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: ItemId, brand: &str, model: &str) -> Item {
        Item {
            id,
            brand: brand.to_string(),
            model: model.to_string(),
            power: 100,
            fuel: "petrol".to_string(),
            price: 20_000.0,
            year: 2019,
            transmission: "manual".to_string(),
            body_type: "hatchback".to_string(),
        }
    }

    #[test]
    fn test_power_target_from_raw() {
        assert_eq!(PowerTarget::from_raw(150.0), Some(PowerTarget::Absolute(150.0)));
        assert_eq!(PowerTarget::from_raw(0.7), Some(PowerTarget::Desire(0.7)));
        assert_eq!(PowerTarget::from_raw(42.0), None);
        assert_eq!(PowerTarget::from_raw(-1.0), None);
        assert_eq!(PowerTarget::from_raw(f64::NAN), None);
    }

    #[test]
    fn test_importance_is_clamped() {
        let prefs = PreferenceSnapshot::new()
            .with_importance(Feature::Brand, 4.0)
            .with_importance(Feature::Fuel, -1.0);

        assert_eq!(prefs.importance(Feature::Brand), Some(1.5));
        assert_eq!(prefs.importance(Feature::Fuel), Some(0.0));
        assert_eq!(prefs.importance(Feature::Power), None);
    }

    #[test]
    fn test_canonical_importance_key_wins_over_alias() {
        let mut prefs = PreferenceSnapshot::new();
        prefs.importance.insert("price".to_string(), 0.2);
        prefs.importance.insert("budget".to_string(), 1.3);
        assert_eq!(prefs.importance(Feature::Price), Some(1.3));

        prefs.importance.remove("budget");
        assert_eq!(prefs.importance(Feature::Price), Some(0.2));
    }

    #[test]
    fn test_importance_accepts_loose_keys() {
        let mut prefs = PreferenceSnapshot::new();
        prefs.importance.insert("Body Type".to_string(), 1.2);
        assert_eq!(prefs.importance(Feature::BodyType), Some(1.2));
    }

    #[test]
    fn test_catalog_insert_and_lookup() {
        let mut catalog = Catalog::new();
        catalog.insert(car(1, "Audi", "A3"));
        catalog.insert(car(2, "BMW", "118i"));
        catalog.insert(car(1, "Audi", "A4"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).map(|c| c.model.as_str()), Some("A4"));
        assert!(catalog.get(99).is_none());
    }

    #[test]
    fn test_search_matches_brand_and_model() {
        let catalog = Catalog::from_items(vec![car(1, "Audi", "A3"), car(2, "BMW", "118i")]);
        let hits = catalog.search("audi a3");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_invalid_items_are_excluded_from_valid_view() {
        let mut broken = car(3, "Fiat", "Panda");
        broken.price = 0.0;
        let catalog = Catalog::from_items(vec![car(1, "Audi", "A3"), broken]);
        assert_eq!(catalog.valid_items().len(), 1);
    }

    #[test]
    fn test_reference_item_preferences() {
        let mut item = car(1, "Audi", "A4");
        item.transmission = "7-speed DCT".to_string();
        item.power = 140;
        let prefs = PreferenceSnapshot::from_reference_item(&item);

        assert_eq!(prefs.brand.as_deref(), Some("Audi"));
        assert_eq!(prefs.max_budget, Some(20_000.0));
        assert_eq!(prefs.power, Some(PowerTarget::Absolute(140.0)));
        assert_eq!(prefs.automatic_transmission, Some(true));
    }
}
