//! Geocoded addresses and the membership indexes used to sample and
//! fabricate addresses
//!
//! Addresses are grouped into SA1 cells. SA3 regions are the first five
//! digits of an SA1 code and the state is implied by its first digit.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{PmiError, Result};
use crate::reference::street_types::StreetTypes;

/// Australian state or territory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Nsw,
    Vic,
    Qld,
    Sa,
    Wa,
    Tas,
    Nt,
    Act,
}

impl State {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Nsw => "NSW",
            Self::Vic => "VIC",
            Self::Qld => "QLD",
            Self::Sa => "SA",
            Self::Wa => "WA",
            Self::Tas => "TAS",
            Self::Nt => "NT",
            Self::Act => "ACT",
        }
    }

    /// Parse a state abbreviation
    ///
    /// `OT` (other territories) is folded into NSW or WA by the first digit
    /// of the postcode.
    #[must_use]
    pub fn from_code(code: &str, postcode: &str) -> Option<Self> {
        match code.trim() {
            "NSW" => Some(Self::Nsw),
            "VIC" => Some(Self::Vic),
            "QLD" => Some(Self::Qld),
            "SA" => Some(Self::Sa),
            "WA" => Some(Self::Wa),
            "TAS" => Some(Self::Tas),
            "NT" => Some(Self::Nt),
            "ACT" => Some(Self::Act),
            "OT" => match postcode.trim().chars().next() {
                Some('2') => Some(Self::Nsw),
                Some('6') => Some(Self::Wa),
                _ => None,
            },
            _ => None,
        }
    }

    /// State implied by the first digit of an SA1 code
    #[must_use]
    pub fn from_sa1(sa1: &str) -> Option<Self> {
        match sa1.chars().next()? {
            '1' => Some(Self::Nsw),
            '2' => Some(Self::Vic),
            '3' => Some(Self::Qld),
            '4' => Some(Self::Sa),
            '5' | '9' => Some(Self::Wa),
            '6' => Some(Self::Tas),
            '7' => Some(Self::Nt),
            '8' => Some(Self::Act),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A small set of states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateSet(u8);

impl StateSet {
    pub fn insert(&mut self, state: State) {
        self.0 |= state.bit();
    }

    #[must_use]
    pub const fn contains(self, state: State) -> bool {
        self.0 & state.bit() != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn of(state: State) -> Self {
        Self(state.bit())
    }
}

/// One row of the geocoded address source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRow {
    pub street_number: String,
    pub street_name: String,
    pub street_type: String,
    pub street_suffix: Option<String>,
    pub locality: String,
    pub state: String,
    pub postcode: String,
    pub meshblock: String,
    pub longitude: String,
    pub latitude: String,
}

/// A real address inside a cell
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAddress {
    pub street_no: String,
    pub street_name: String,
    pub street_type: String,
    pub street_suffix: String,
    pub suburb: String,
    pub state: State,
    pub postcode: String,
    pub meshblock: String,
    pub longitude: String,
    pub latitude: String,
}

/// A geocoded point inside a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeoPoint {
    pub longitude: String,
    pub latitude: String,
    pub meshblock: String,
}

/// An SA1 region with its addresses
#[derive(Debug, Clone)]
pub struct Cell {
    pub sa1: String,
    pub state: State,
    pub addresses: Vec<SourceAddress>,
    pub points: Vec<GeoPoint>,
}

impl Cell {
    /// SA3 region containing this cell
    #[must_use]
    pub fn sa3(&self) -> &str {
        sa3_of(&self.sa1)
    }
}

/// SA3 code of an SA1 code
#[must_use]
pub fn sa3_of(sa1: &str) -> &str {
    sa1.get(..5).unwrap_or(sa1)
}

/// Geocoded addresses with the membership indexes for synthetic addresses
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    cells: Vec<Cell>,
    cell_index: FxHashMap<String, usize>,
    sa3_cells: FxHashMap<String, Vec<usize>>,
    postcodes: Vec<String>,
    postcode_states: FxHashMap<String, StateSet>,
    suburbs: Vec<String>,
    suburb_states: FxHashMap<String, StateSet>,
    street_names: Vec<String>,
    street_name_postcodes: FxHashMap<String, FxHashSet<String>>,
    street_name_types: FxHashMap<String, FxHashMap<String, StateSet>>,
}

impl AddressBook {
    /// Index address rows by cell
    ///
    /// Rows whose mesh block has no SA1, whose street type is unknown or
    /// whose state cannot be resolved are skipped. A book without any cell
    /// is a configuration error.
    pub fn from_rows<I>(
        meshblock_sa1: &FxHashMap<String, String>,
        rows: I,
        street_types: &StreetTypes,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = AddressRow>,
    {
        let mut book = Self::default();
        let mut seen_points: FxHashSet<(usize, GeoPoint)> = FxHashSet::default();
        let mut skipped = 0_usize;

        for row in rows {
            let Some(sa1) = meshblock_sa1.get(row.meshblock.trim()) else {
                skipped += 1;
                continue;
            };
            let street_type = row.street_type.trim().to_uppercase();
            if !street_types.contains(&street_type) {
                skipped += 1;
                continue;
            }
            let Some(state) = State::from_code(&row.state, &row.postcode) else {
                skipped += 1;
                continue;
            };
            let Some(cell_state) = State::from_sa1(sa1) else {
                skipped += 1;
                continue;
            };

            let postcode = row.postcode.trim().to_string();
            let suburb = row.locality.trim().to_uppercase();
            let street_name = row.street_name.trim().to_uppercase();

            book.postcode_entry(&postcode).insert(state);
            book.suburb_entry(&suburb).insert(state);
            book.street_name_postcodes_entry(&street_name)
                .insert(postcode.clone());
            book.street_name_types
                .entry(street_name.clone())
                .or_default()
                .entry(street_type.clone())
                .or_default()
                .insert(state);

            let cell = book.cell_entry(sa1, cell_state);
            let point = GeoPoint {
                longitude: row.longitude.trim().to_string(),
                latitude: row.latitude.trim().to_string(),
                meshblock: row.meshblock.trim().to_string(),
            };
            if seen_points.insert((cell, point.clone())) {
                book.cells[cell].points.push(point.clone());
            }
            book.cells[cell].addresses.push(SourceAddress {
                street_no: row.street_number.trim().to_string(),
                street_name,
                street_type,
                street_suffix: row
                    .street_suffix
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_uppercase(),
                suburb,
                state,
                postcode,
                meshblock: point.meshblock,
                longitude: point.longitude,
                latitude: point.latitude,
            });
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} addresses without a region or known street type");
        }
        if book.cells.is_empty() {
            return Err(PmiError::config(
                "insufficient reference data: no addresses could be placed in a region",
            ));
        }
        log::info!(
            "Indexed {} addresses in {} regions",
            book.address_count(),
            book.cells.len()
        );
        Ok(book)
    }

    fn cell_entry(&mut self, sa1: &str, state: State) -> usize {
        if let Some(&index) = self.cell_index.get(sa1) {
            return index;
        }
        let index = self.cells.len();
        self.cells.push(Cell {
            sa1: sa1.to_string(),
            state,
            addresses: Vec::new(),
            points: Vec::new(),
        });
        self.cell_index.insert(sa1.to_string(), index);
        self.sa3_cells
            .entry(sa3_of(sa1).to_string())
            .or_default()
            .push(index);
        index
    }

    fn postcode_entry(&mut self, postcode: &str) -> &mut StateSet {
        if !self.postcode_states.contains_key(postcode) {
            self.postcodes.push(postcode.to_string());
        }
        self.postcode_states.entry(postcode.to_string()).or_default()
    }

    fn suburb_entry(&mut self, suburb: &str) -> &mut StateSet {
        if !self.suburb_states.contains_key(suburb) {
            self.suburbs.push(suburb.to_string());
        }
        self.suburb_states.entry(suburb.to_string()).or_default()
    }

    fn street_name_postcodes_entry(&mut self, street_name: &str) -> &mut FxHashSet<String> {
        if !self.street_name_postcodes.contains_key(street_name) {
            self.street_names.push(street_name.to_string());
        }
        self.street_name_postcodes
            .entry(street_name.to_string())
            .or_default()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, sa1: &str) -> Option<&Cell> {
        self.cell_index.get(sa1).map(|&i| &self.cells[i])
    }

    /// Indexes of the cells sharing an SA3 region with `sa1`
    #[must_use]
    pub fn nearby_cells(&self, sa1: &str) -> Option<&[usize]> {
        self.sa3_cells
            .get(sa3_of(sa1))
            .map(Vec::as_slice)
            .filter(|cells| !cells.is_empty())
    }

    #[must_use]
    pub fn address_count(&self) -> usize {
        self.cells.iter().map(|c| c.addresses.len()).sum()
    }

    #[must_use]
    pub fn postcodes(&self) -> &[String] {
        &self.postcodes
    }

    /// States a postcode is attested in
    #[must_use]
    pub fn postcode_states(&self, postcode: &str) -> StateSet {
        self.postcode_states
            .get(postcode)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn suburbs(&self) -> &[String] {
        &self.suburbs
    }

    /// States a suburb name is attested in
    #[must_use]
    pub fn suburb_states(&self, suburb: &str) -> StateSet {
        self.suburb_states.get(suburb).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn street_names(&self) -> &[String] {
        &self.street_names
    }

    /// Whether a street name occurs in a postcode
    #[must_use]
    pub fn street_in_postcode(&self, street_name: &str, postcode: &str) -> bool {
        self.street_name_postcodes
            .get(street_name)
            .is_some_and(|postcodes| postcodes.contains(postcode))
    }

    /// Whether a street name is paired with a street type in a state
    #[must_use]
    pub fn street_type_in_state(&self, street_name: &str, street_type: &str, state: State) -> bool {
        self.street_name_types
            .get(street_name)
            .and_then(|types| types.get(street_type))
            .is_some_and(|states| states.contains(state))
    }
}
