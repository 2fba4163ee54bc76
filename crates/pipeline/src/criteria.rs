//! Hard constraints derived from a preference snapshot.

use catalog::PreferenceSnapshot;

/// The subset of preferences that exclude items outright.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub fuel: Option<String>,
    pub brand: Option<String>,
    pub body_type: Option<String>,
    pub automatic_transmission: Option<bool>,
    pub min_year: Option<u16>,
    pub max_year: Option<u16>,
}

impl FilterCriteria {
    /// True when no filter would remove anything
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&PreferenceSnapshot> for FilterCriteria {
    fn from(prefs: &PreferenceSnapshot) -> Self {
        let positive = |value: Option<f64>| value.filter(|v| v.is_finite() && *v > 0.0);
        let stated = |value: &Option<String>| PreferenceSnapshot::stated(value).map(str::to_string);

        Self {
            min_price: positive(prefs.min_budget),
            max_price: positive(prefs.max_budget),
            fuel: stated(&prefs.fuel),
            brand: stated(&prefs.brand),
            body_type: stated(&prefs.body_type),
            automatic_transmission: prefs.automatic_transmission,
            min_year: prefs.min_year,
            max_year: prefs.max_year,
        }
    }
}
