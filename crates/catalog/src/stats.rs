//! Range and mean statistics over a pool of items.
//!
//! Scoring is always relative to the pool being ranked, so these are
//! recomputed per request from whichever candidates survived filtering.

use crate::types::{Item, NumericAttribute};

/// Observed min/max/mean of one numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl NumericRange {
    /// `None` when no finite value was observed
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(value);
            max = max.max(value);
            sum += value;
            count += 1;
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Map into [0,1]; a degenerate range yields the midpoint 0.5
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() || !value.is_finite() {
            return 0.5;
        }
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }

    /// Inverse of `normalize` for a fraction in [0,1]
    pub fn interpolate(&self, fraction: f64) -> f64 {
        self.min + fraction.clamp(0.0, 1.0) * self.span()
    }
}

/// Normalization helper that tolerates an absent range.
pub fn normalize_in(range: Option<&NumericRange>, value: f64) -> f64 {
    range.map_or(0.5, |r| r.normalize(value))
}

/// Price, year and power statistics of a candidate pool.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoolStats {
    pub price: Option<NumericRange>,
    pub year: Option<NumericRange>,
    pub power: Option<NumericRange>,
    pub count: usize,
}

impl PoolStats {
    /// Placeholder values (zero price/power, year before 1900) are ignored.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let items: Vec<&Item> = items.into_iter().collect();
        let range_of = |attribute: NumericAttribute| {
            NumericRange::from_values(items.iter().filter_map(|item| attribute.value(item)))
        };
        Self {
            price: range_of(NumericAttribute::Price),
            year: range_of(NumericAttribute::Year),
            power: range_of(NumericAttribute::Power),
            count: items.len(),
        }
    }

    pub fn range(&self, attribute: NumericAttribute) -> Option<&NumericRange> {
        match attribute {
            NumericAttribute::Price => self.price.as_ref(),
            NumericAttribute::Year => self.year.as_ref(),
            NumericAttribute::Power => self.power.as_ref(),
        }
    }

    pub fn mean(&self, attribute: NumericAttribute) -> Option<f64> {
        self.range(attribute).map(|r| r.mean)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(price: f64, power: u32, year: u16) -> Item {
        Item {
            id: 0,
            brand: "Test".to_string(),
            model: "Car".to_string(),
            power,
            fuel: "petrol".to_string(),
            price,
            year,
            transmission: String::new(),
            body_type: String::new(),
        }
    }

    #[test]
    fn test_normalize_clamps_and_handles_degenerate() {
        let range = NumericRange::from_values([10.0, 20.0]).unwrap();
        assert_eq!(range.normalize(15.0), 0.5);
        assert_eq!(range.normalize(40.0), 1.0);
        assert_eq!(range.normalize(0.0), 0.0);

        let flat = NumericRange::from_values([7.0, 7.0]).unwrap();
        assert_eq!(flat.normalize(7.0), 0.5);
        assert_eq!(normalize_in(None, 3.0), 0.5);
    }

    #[test]
    fn test_pool_stats_skip_placeholders() {
        let items = vec![car(10_000.0, 100, 2010), car(0.0, 0, 1800), car(30_000.0, 200, 2020)];
        let stats = PoolStats::from_items(&items);

        let price = stats.price.unwrap();
        assert_eq!(price.min, 10_000.0);
        assert_eq!(price.max, 30_000.0);
        assert_eq!(price.mean, 20_000.0);
        assert_eq!(stats.year.unwrap().min, 2010.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_empty_pool_has_no_ranges() {
        let stats = PoolStats::from_items(std::iter::empty());
        assert!(stats.price.is_none());
        assert!(stats.is_empty());
    }
}
