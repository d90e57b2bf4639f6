//! Immutable reference data shared by every generator
//!
//! Name-frequency tables, the geocoded address book and the small lookup
//! tables are loaded once and passed by reference into the factories, so a
//! run depends only on this data and its random source.

pub mod geography;
pub mod loader;
pub mod names;
pub mod nicknames;
pub mod street_types;

use std::path::Path;

use crate::error::{PmiError, Result};
use crate::models::Sex;

pub use geography::{AddressBook, AddressRow, State, StateSet};
pub use names::NameTable;
pub use nicknames::Nicknames;
pub use street_types::StreetTypes;

/// Every reference table a run needs
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub family_names: NameTable,
    pub boys_names: NameTable,
    pub girls_names: NameTable,
    pub addresses: AddressBook,
    pub street_types: StreetTypes,
    pub nicknames: Nicknames,
}

impl ReferenceData {
    /// Assemble reference data, rejecting empty tables
    pub fn new(
        family_names: NameTable,
        boys_names: NameTable,
        girls_names: NameTable,
        addresses: AddressBook,
        street_types: StreetTypes,
        nicknames: Nicknames,
    ) -> Result<Self> {
        if family_names.is_empty() || boys_names.is_empty() || girls_names.is_empty() {
            return Err(PmiError::config("insufficient reference data: empty name table"));
        }
        if addresses.cells().is_empty() {
            return Err(PmiError::config("insufficient reference data: no addresses"));
        }
        if street_types.is_empty() {
            return Err(PmiError::config("insufficient reference data: no street types"));
        }
        Ok(Self {
            family_names,
            boys_names,
            girls_names,
            addresses,
            street_types,
            nicknames,
        })
    }

    /// Load every table from a directory of Parquet files
    pub fn load_dir(dir: &Path) -> Result<Self> {
        loader::load_reference_dir(dir)
    }

    /// Given-name table for a sex (unknown sex draws from boys names)
    #[must_use]
    pub const fn given_names(&self, sex: Sex) -> &NameTable {
        match sex {
            Sex::Female => &self.girls_names,
            Sex::Male | Sex::Unknown => &self.boys_names,
        }
    }
}
