//! Street types and their abbreviations (METeOR 429840)

use rustc_hash::FxHashMap;

use crate::error::{PmiError, Result};

/// Built-in subset used when no street-type table is supplied
const BUILTIN_STREET_TYPES: &[(&str, &str)] = &[
    ("ALLEY", "ALLY"),
    ("ARCADE", "ARC"),
    ("AVENUE", "AV"),
    ("BOULEVARD", "BVD"),
    ("CIRCUIT", "CCT"),
    ("CLOSE", "CL"),
    ("COURT", "CT"),
    ("CRESCENT", "CR"),
    ("DRIVE", "DR"),
    ("ESPLANADE", "ESP"),
    ("GARDENS", "GDNS"),
    ("GROVE", "GR"),
    ("HIGHWAY", "HWY"),
    ("LANE", "LANE"),
    ("LOOP", "LOOP"),
    ("MEWS", "MEWS"),
    ("PARADE", "PDE"),
    ("PARKWAY", "PWY"),
    ("PLACE", "PL"),
    ("PROMENADE", "PROM"),
    ("RISE", "RISE"),
    ("ROAD", "RD"),
    ("ROW", "ROW"),
    ("SQUARE", "SQ"),
    ("STREET", "ST"),
    ("TERRACE", "TCE"),
    ("TRACK", "TRK"),
    ("VIEW", "VIEW"),
    ("WALK", "WALK"),
    ("WAY", "WAY"),
];

/// Known street types, in a stable order for random draws
#[derive(Debug, Clone)]
pub struct StreetTypes {
    types: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl StreetTypes {
    /// The built-in street-type table
    #[must_use]
    pub fn builtin() -> Self {
        Self::build(
            BUILTIN_STREET_TYPES
                .iter()
                .map(|(name, abbrev)| ((*name).to_string(), (*abbrev).to_string())),
        )
    }

    /// Build from `(street type, abbreviation)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let table = Self::build(pairs);
        if table.types.is_empty() {
            return Err(PmiError::config(
                "insufficient reference data: empty street type table",
            ));
        }
        Ok(table)
    }

    fn build<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut types = Vec::new();
        let mut index = FxHashMap::default();
        for (name, abbrev) in pairs {
            let name = name.trim().to_uppercase();
            if name.is_empty() || index.contains_key(&name) {
                continue;
            }
            index.insert(name.clone(), types.len());
            types.push((name, abbrev.trim().to_uppercase()));
        }
        Self { types, index }
    }

    /// Abbreviation of a full street type
    #[must_use]
    pub fn abbreviation(&self, street_type: &str) -> Option<&str> {
        self.index
            .get(street_type)
            .map(|&i| self.types[i].1.as_str())
    }

    #[must_use]
    pub fn contains(&self, street_type: &str) -> bool {
        self.index.contains_key(street_type)
    }

    /// All `(street type, abbreviation)` pairs
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.types
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for StreetTypes {
    fn default() -> Self {
        Self::builtin()
    }
}
