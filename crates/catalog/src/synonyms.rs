//! Categorical matching tables.
//!
//! Partial matches between a stated preference and an item label are decided
//! by explicit synonym groups rather than ad-hoc string checks scattered over
//! the filters and the scorer. Every table is plain data so it can be audited
//! and extended in one place.

/// How well a preferred categorical value matches an item label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Same value after trimming and lower-casing
    Exact,
    /// Same synonym group, alias, or substring containment
    Family,
    None,
}

/// A canonical label and the aliases that identify it inside free text.
#[derive(Debug, Clone, Copy)]
pub struct SynonymGroup {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

/// An ordered set of synonym groups for one categorical attribute.
#[derive(Debug, Clone, Copy)]
pub struct SynonymTable {
    groups: &'static [SynonymGroup],
    /// Treat substring containment in either direction as a family match
    containment: bool,
}

pub const FUEL_FAMILIES: SynonymTable = SynonymTable {
    groups: &[
        SynonymGroup { canonical: "hybrid", aliases: &["hybrid"] },
        SynonymGroup { canonical: "electric", aliases: &["electric", "ev"] },
        SynonymGroup { canonical: "petrol", aliases: &["petrol", "gasoline", "benzine"] },
        SynonymGroup { canonical: "diesel", aliases: &["diesel"] },
        SynonymGroup { canonical: "lpg", aliases: &["lpg"] },
    ],
    containment: false,
};

pub const BODY_TYPE_GROUPS: SynonymTable = SynonymTable {
    groups: &[
        SynonymGroup { canonical: "suv", aliases: &["suv", "jeep", "4x4", "crossover"] },
        SynonymGroup {
            canonical: "station",
            aliases: &["station", "break", "combi", "estate", "touring"],
        },
        SynonymGroup {
            canonical: "sedan",
            aliases: &["sedan", "berline", "limousine", "saloon"],
        },
        SynonymGroup { canonical: "hatchback", aliases: &["hatchback", "compact"] },
    ],
    containment: true,
};

pub const BRAND_ALIASES: SynonymTable = SynonymTable {
    groups: &[
        SynonymGroup { canonical: "volkswagen", aliases: &["volkswagen", "vw", "volks"] },
        SynonymGroup { canonical: "mercedes-benz", aliases: &["mercedes", "benz"] },
    ],
    containment: true,
};

const AUTOMATIC_KEYWORDS: &[&str] = &["automatic", "automaat", "auto", "cvt", "dct"];
const MANUAL_KEYWORDS: &[&str] = &["manual", "schakel"];

impl SynonymTable {
    pub fn groups(&self) -> &'static [SynonymGroup] {
        self.groups
    }

    /// Canonical label of the first group with an alias contained in `value`
    pub fn family_of(&self, value: &str) -> Option<&'static str> {
        let value = normalize(value);
        if value.is_empty() {
            return None;
        }
        self.group_of(&value).map(|group| group.canonical)
    }

    /// Compare a preferred value against an item label.
    ///
    /// The group is taken from the preference, so "suv" matches
    /// "compact suv" while "hatchback" also matches "compact suv" only
    /// through its own aliases.
    pub fn matches(&self, preferred: &str, actual: &str) -> MatchKind {
        let preferred = normalize(preferred);
        let actual = normalize(actual);
        if preferred.is_empty() || actual.is_empty() {
            return MatchKind::None;
        }
        if preferred == actual {
            return MatchKind::Exact;
        }
        if let Some(group) = self.group_of(&preferred) {
            if group.aliases.iter().any(|alias| contains_token(&actual, alias)) {
                return MatchKind::Family;
            }
        }
        if self.containment && (actual.contains(&preferred) || preferred.contains(&actual)) {
            return MatchKind::Family;
        }
        MatchKind::None
    }

    fn group_of(&self, normalized: &str) -> Option<&'static SynonymGroup> {
        self.groups.iter().find(|group| {
            group
                .aliases
                .iter()
                .any(|alias| contains_token(normalized, alias))
        })
    }
}

/// Gearbox kind inferred from a free-text transmission label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionKind {
    Automatic,
    Manual,
}

impl TransmissionKind {
    /// Automatic keywords win over manual ones ("automated manual" is automatic).
    pub fn infer(label: &str) -> Option<Self> {
        let label = normalize(label);
        if label.is_empty() {
            None
        } else if AUTOMATIC_KEYWORDS.iter().any(|kw| label.contains(kw)) {
            Some(Self::Automatic)
        } else if MANUAL_KEYWORDS.iter().any(|kw| label.contains(kw)) {
            Some(Self::Manual)
        } else {
            None
        }
    }

    pub fn from_automatic_flag(automatic: bool) -> Self {
        if automatic { Self::Automatic } else { Self::Manual }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

/// Lower-cased, trimmed form used by every comparison
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Labels equal after normalization; an empty label never matches
pub fn same_label(a: &str, b: &str) -> bool {
    let a = normalize(a);
    !a.is_empty() && a == normalize(b)
}

/// Short aliases ("ev", "vw") must stand alone; longer ones may be embedded
fn contains_token(haystack: &str, alias: &str) -> bool {
    if alias.len() > 3 {
        return haystack.contains(alias);
    }
    haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == alias)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_family_matches() {
        assert_eq!(FUEL_FAMILIES.matches("Petrol", "petrol"), MatchKind::Exact);
        assert_eq!(FUEL_FAMILIES.matches("petrol", "Gasoline"), MatchKind::Family);
        assert_eq!(FUEL_FAMILIES.matches("hybrid", "Plug-in Hybrid"), MatchKind::Family);
        assert_eq!(FUEL_FAMILIES.matches("diesel", "petrol"), MatchKind::None);
        assert_eq!(FUEL_FAMILIES.matches("electric", "EV"), MatchKind::Family);
    }

    #[test]
    fn test_same_label_folds_non_ascii_case() {
        assert!(same_label("škoda", " Škoda "));
        assert!(same_label("CITROËN", "Citroën"));
        assert!(!same_label("", ""));
        assert!(!same_label("skoda", "Škoda"));
        assert_eq!(BRAND_ALIASES.matches("škoda", "Škoda"), MatchKind::Exact);
    }

    #[test]
    fn test_short_alias_requires_whole_token() {
        // "ev" must not match inside "chevrolet"-like labels
        assert_eq!(FUEL_FAMILIES.matches("electric", "level petrol"), MatchKind::None);
        assert_eq!(BRAND_ALIASES.matches("vw", "Volkswagen"), MatchKind::Family);
    }

    #[test]
    fn test_body_type_groups() {
        assert_eq!(BODY_TYPE_GROUPS.matches("suv", "Jeep"), MatchKind::Family);
        assert_eq!(BODY_TYPE_GROUPS.matches("station", "Estate"), MatchKind::Family);
        assert_eq!(BODY_TYPE_GROUPS.matches("sedan", "hatchback"), MatchKind::None);
        assert_eq!(BODY_TYPE_GROUPS.matches("suv", ""), MatchKind::None);
    }

    #[test]
    fn test_brand_containment() {
        assert_eq!(BRAND_ALIASES.matches("mercedes", "Mercedes-Benz"), MatchKind::Family);
        assert_eq!(BRAND_ALIASES.matches("audi", "AUDI"), MatchKind::Exact);
        assert_eq!(BRAND_ALIASES.matches("audi", "bmw"), MatchKind::None);
    }

    #[test]
    fn test_family_of() {
        assert_eq!(FUEL_FAMILIES.family_of("Benzine"), Some("petrol"));
        assert_eq!(BODY_TYPE_GROUPS.family_of("4x4 pickup"), Some("suv"));
        assert_eq!(FUEL_FAMILIES.family_of("hydrogen"), None);
    }

    #[test]
    fn test_transmission_inference() {
        assert_eq!(TransmissionKind::infer("Automaat"), Some(TransmissionKind::Automatic));
        assert_eq!(TransmissionKind::infer("7-speed DCT"), Some(TransmissionKind::Automatic));
        assert_eq!(TransmissionKind::infer("Manual 6"), Some(TransmissionKind::Manual));
        assert_eq!(TransmissionKind::infer(""), None);
        assert_eq!(TransmissionKind::infer("sequential"), None);
    }
}
