//! In-memory reference data for tests
//!
//! The fixture spans four states (NSW, VIC, QLD, WA) so every synthetic
//! address constraint can be satisfied, and its name tables hold enough
//! names in several popularity buckets for a few thousand distinct people.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::config::{GeneratorConfig, GeneratorConfigBuilder};
use crate::reference::geography::{AddressBook, AddressRow};
use crate::reference::names::{FAMILY_NAME_DIVISOR, GIVEN_NAME_DIVISOR, NameTable};
use crate::reference::{Nicknames, ReferenceData, StreetTypes};

/// Fixed reference date so ages are stable across runs
#[must_use]
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default()
}

const FAMILY_NAMES: &[(&str, u64)] = &[
    ("Smith", 120_000),
    ("Jones", 80_000),
    ("Williams", 70_000),
    ("Brown", 66_000),
    ("Wilson", 52_000),
    ("Taylor", 50_000),
    ("Nguyen", 48_000),
    ("Johnson", 41_000),
    ("Martin", 39_000),
    ("White", 35_000),
    ("Anderson", 30_000),
    ("Walker", 29_000),
    ("Thompson", 28_000),
    ("Ryan", 21_000),
    ("Kelly", 19_000),
    ("Murphy", 17_000),
    ("Campbell", 15_000),
    ("Clarke", 9_000),
    ("Hughes", 7_500),
    ("Baxter", 900),
    ("Quill", 450),
    ("Ormsby", 300),
    ("Vane", 150),
    ("Yarrow", 90),
    ("Zeller", 40),
];

const BOYS_NAMES: &[(&str, u64)] = &[
    ("William", 60_000),
    ("James", 55_000),
    ("John", 52_000),
    ("Robert", 40_000),
    ("Michael", 38_000),
    ("Thomas", 30_000),
    ("Daniel", 22_000),
    ("Samuel", 15_000),
    ("Oliver", 9_000),
    ("Harold", 3_000),
    ("Percival", 800),
    ("Ambrose", 300),
];

const GIRLS_NAMES: &[(&str, u64)] = &[
    ("Elizabeth", 58_000),
    ("Margaret", 50_000),
    ("Mary", 48_000),
    ("Susan", 33_000),
    ("Jennifer", 30_000),
    ("Katherine", 25_000),
    ("Rebecca", 19_000),
    ("Olivia", 12_000),
    ("Charlotte", 8_000),
    ("Matilda", 2_000),
    ("Winifred", 700),
    ("Ottilie", 200),
];

/// (sa1, meshblock, state, postcode, suburb, streets)
const CELLS: &[(&str, &str, &str, &str, &str, &[(&str, &str)])] = &[
    ("10101000001", "MB101", "NSW", "2000", "Sydney", &[("George", "STREET"), ("Pitt", "STREET"), ("Queen", "ROAD")]),
    ("10101000002", "MB102", "NSW", "2010", "Surry Hills", &[("Crown", "STREET"), ("Bourke", "STREET")]),
    ("20601000001", "MB201", "VIC", "3000", "Melbourne", &[("Collins", "STREET"), ("Flinders", "LANE")]),
    ("20601000002", "MB202", "VIC", "3065", "Fitzroy", &[("Brunswick", "STREET"), ("George", "STREET")]),
    ("30501000001", "MB301", "QLD", "4000", "Brisbane", &[("Queen", "STREET"), ("Adelaide", "STREET")]),
    ("50302000001", "MB501", "WA", "6000", "Perth", &[("Hay", "STREET"), ("Murray", "STREET")]),
];

/// The address rows behind the fixture's address book
#[must_use]
pub fn address_rows() -> Vec<AddressRow> {
    let mut rows = Vec::new();
    for (cell, (_, meshblock, state, postcode, suburb, streets)) in CELLS.iter().enumerate() {
        for (street, (name, kind)) in streets.iter().enumerate() {
            for number in 1..=4 {
                rows.push(AddressRow {
                    street_number: (number * 2 + street).to_string(),
                    street_name: (*name).to_string(),
                    street_type: (*kind).to_string(),
                    street_suffix: None,
                    locality: (*suburb).to_string(),
                    state: (*state).to_string(),
                    postcode: (*postcode).to_string(),
                    meshblock: (*meshblock).to_string(),
                    longitude: format!("{:.4}", 115.0 + cell as f64 * 6.0 + number as f64 * 0.001),
                    latitude: format!("{:.4}", -32.0 + cell as f64 * 0.5 + number as f64 * 0.001),
                });
            }
        }
    }
    rows
}

/// Mesh block to SA1 mapping of the fixture
#[must_use]
pub fn meshblock_map() -> FxHashMap<String, String> {
    CELLS
        .iter()
        .map(|(sa1, mb, ..)| ((*mb).to_string(), (*sa1).to_string()))
        .collect()
}

/// Family-name counts: common real names plus a long tail of rare ones
#[must_use]
pub fn family_name_counts() -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = FAMILY_NAMES
        .iter()
        .map(|(name, count)| ((*name).to_string(), *count))
        .collect();
    for i in 0..200_u64 {
        let first = char::from(b'A' + (i % 26) as u8);
        let second = char::from(b'A' + (i / 26) as u8);
        counts.push((format!("{first}{second}BRIDGE"), 60 + (i * 7) % 400));
    }
    counts
}

/// Complete in-memory reference data
#[must_use]
pub fn reference_data() -> ReferenceData {
    let street_types = StreetTypes::builtin();
    let build = || -> crate::error::Result<ReferenceData> {
        ReferenceData::new(
            NameTable::from_counts("family", family_name_counts(), FAMILY_NAME_DIVISOR)?,
            NameTable::from_counts("boys", BOYS_NAMES.iter().copied(), GIVEN_NAME_DIVISOR)?,
            NameTable::from_counts("girls", GIRLS_NAMES.iter().copied(), GIVEN_NAME_DIVISOR)?,
            AddressBook::from_rows(&meshblock_map(), address_rows(), &street_types)?,
            street_types.clone(),
            Nicknames::builtin(),
        )
    };
    match build() {
        Ok(data) => data,
        Err(e) => panic!("test fixture is invalid: {e}"),
    }
}

/// Configuration builder preset with a fixed seed and reference date
#[must_use]
pub fn test_config_builder(seed: u64) -> GeneratorConfigBuilder {
    GeneratorConfig::builder()
        .random_seed(seed)
        .reference_date(reference_date())
}
