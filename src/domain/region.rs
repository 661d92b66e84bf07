//! The closed set of regions the pipeline tracks.
//!
//! Both cleaners and the forecaster share one registry value; the canonical
//! name list is defined here and nowhere else.

/// The ten provinces carried through cleaning and forecasting. Territories are
/// not tracked, even when an alias below expands to one.
const CANONICAL_NAMES: [&str; 10] = [
    "Alberta",
    "British Columbia",
    "Manitoba",
    "New Brunswick",
    "Newfoundland and Labrador",
    "Nova Scotia",
    "Ontario",
    "Prince Edward Island",
    "Quebec",
    "Saskatchewan",
];

/// Abbreviated region codes used by the case feed. Only the case cleaner
/// consults this table. Note that `NWT` expands to a territory, so rows
/// rewritten through it are still dropped by the canonical-set restriction.
const ALIASES: [(&str, &str); 4] = [
    ("BC", "British Columbia"),
    ("NL", "Newfoundland and Labrador"),
    ("NWT", "Northwest Territories"),
    ("PEI", "Prince Edward Island"),
];

/// The fixed region vocabulary: canonical names plus the case-feed alias table.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    names: &'static [&'static str],
    aliases: &'static [(&'static str, &'static str)],
}

impl RegionRegistry {
    /// Marker the case feed uses for repatriated travellers; never a region.
    pub const REPATRIATED: &'static str = "Repatriated";

    pub fn canadian_provinces() -> Self {
        Self {
            names: &CANONICAL_NAMES,
            aliases: &ALIASES,
        }
    }

    /// Whether `region` is one of the canonical names.
    pub fn contains(&self, region: &str) -> bool {
        self.names.iter().any(|name| *name == region)
    }

    /// Expand an abbreviated code to its full name, if it is a known code.
    pub fn resolve_alias(&self, code: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == code)
            .map(|(_, full)| *full)
    }

    /// The canonical names, in their fixed declaration order.
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::canadian_provinces()
    }
}
