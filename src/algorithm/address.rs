//! Address synthesis
//!
//! Sampled addresses are real rows of the address book. Synthetic addresses
//! combine real components that are never attested together: the postcode
//! belongs to another state than the region, the suburb to a third state,
//! the street name never occurs in the postcode and the street type is never
//! paired with that street name in the region's state.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{PmiError, Result};
use crate::models::Address;
use crate::reference::geography::{AddressBook, Cell, State, StateSet};
use crate::reference::{ReferenceData, StreetTypes};

/// Street numbers of synthetic addresses lie in this range
pub const SYNTHETIC_STREET_NUMBERS: std::ops::RangeInclusive<u32> = 999_900..=999_999;

/// Country code of every generated address
pub const COUNTRY: &str = "AUS";

/// How addresses are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Real addresses drawn from the address book
    #[default]
    Sampled,
    /// Fabricated addresses that cannot coincide with a real one
    Synthetic,
}

/// Produces addresses from the reference address book
#[derive(Debug, Clone, Copy)]
pub struct AddressSynthesizer<'a> {
    book: &'a AddressBook,
    street_types: &'a StreetTypes,
    mode: AddressMode,
    retry_budget: usize,
}

impl<'a> AddressSynthesizer<'a> {
    #[must_use]
    pub const fn new(reference: &'a ReferenceData, mode: AddressMode, retry_budget: usize) -> Self {
        Self {
            book: &reference.addresses,
            street_types: &reference.street_types,
            mode,
            retry_budget,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AddressMode {
        self.mode
    }

    /// Produce one address
    ///
    /// With `nearby` set to an SA1 code, the region is drawn from the cells
    /// sharing that code's SA3 region. An unknown SA3 falls back to a
    /// uniformly drawn region.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, nearby: Option<&str>) -> Result<Address> {
        let cell = self.pick_cell(rng, nearby)?;
        match self.mode {
            AddressMode::Sampled => self.sampled(rng, cell),
            AddressMode::Synthetic => self.synthetic(rng, cell),
        }
    }

    fn pick_cell<R: Rng + ?Sized>(&self, rng: &mut R, nearby: Option<&str>) -> Result<&'a Cell> {
        let cells = self.book.cells();
        let index = match nearby.and_then(|sa1| self.book.nearby_cells(sa1)) {
            Some(candidates) => candidates.choose(rng).copied(),
            None => (!cells.is_empty()).then(|| rng.random_range(0..cells.len())),
        };
        index
            .and_then(|i| cells.get(i))
            .ok_or_else(|| PmiError::config("insufficient reference data: no address regions"))
    }

    fn sampled<R: Rng + ?Sized>(&self, rng: &mut R, cell: &Cell) -> Result<Address> {
        let source = cell
            .addresses
            .choose(rng)
            .ok_or_else(|| PmiError::exhausted(format!("address in region {}", cell.sa1), 1))?;

        let short_type = self
            .street_types
            .abbreviation(&source.street_type)
            .unwrap_or(source.street_type.as_str());
        let (street_type, short_street_type) = if source.street_suffix.is_empty() {
            (source.street_type.clone(), short_type.to_string())
        } else {
            (
                format!("{} {}", source.street_type, source.street_suffix),
                format!("{short_type} {}", source.street_suffix),
            )
        };

        Ok(Address {
            street_no: source.street_no.clone(),
            street_name: source.street_name.clone(),
            street_type,
            short_street_type,
            suburb: source.suburb.clone(),
            state: source.state.code().to_string(),
            postcode: source.postcode.clone(),
            country: COUNTRY.to_string(),
            longitude: source.longitude.clone(),
            latitude: source.latitude.clone(),
            meshblock: source.meshblock.clone(),
            sa1: cell.sa1.clone(),
        })
    }

    fn synthetic<R: Rng + ?Sized>(&self, rng: &mut R, cell: &Cell) -> Result<Address> {
        let state = cell.state;
        let region = StateSet::of(state);

        let postcode = self.pick(rng, self.book.postcodes(), "postcode outside the region's state", |p| {
            !self.book.postcode_states(p).contains(state)
        })?;
        let excluded = region.union(self.book.postcode_states(postcode));

        let suburb = self.pick(rng, self.book.suburbs(), "suburb in a third state", |s| {
            !self.book.suburb_states(s).intersects(excluded)
        })?;
        let street_name = self.pick(rng, self.book.street_names(), "street name outside the postcode", |n| {
            !self.book.street_in_postcode(n, postcode)
        })?;
        let (street_type, short_street_type) = self.pick(
            rng,
            self.street_types.entries(),
            "street type unpaired with the street name",
            |(kind, _)| !self.book.street_type_in_state(street_name, kind, state),
        )?;

        let point = cell.points.choose(rng).ok_or_else(|| {
            PmiError::exhausted(format!("geocoded point in region {}", cell.sa1), 1)
        })?;

        Ok(Address {
            street_no: rng.random_range(SYNTHETIC_STREET_NUMBERS).to_string(),
            street_name: street_name.clone(),
            street_type: street_type.clone(),
            short_street_type: short_street_type.clone(),
            suburb: suburb.clone(),
            state: state.code().to_string(),
            postcode: postcode.clone(),
            country: COUNTRY.to_string(),
            longitude: point.longitude.clone(),
            latitude: point.latitude.clone(),
            meshblock: point.meshblock.clone(),
            sa1: cell.sa1.clone(),
        })
    }

    /// Draw uniformly until `accept` holds, within the retry budget
    fn pick<'b, T, R, F>(&self, rng: &mut R, items: &'b [T], what: &str, accept: F) -> Result<&'b T>
    where
        R: Rng + ?Sized,
        F: Fn(&T) -> bool,
    {
        for _ in 0..self.retry_budget {
            match items.choose(rng) {
                Some(item) if accept(item) => return Ok(item),
                Some(_) => {}
                None => break,
            }
        }
        Err(PmiError::exhausted(what, self.retry_budget))
    }
}

/// State of an address produced by the synthesizer
#[must_use]
pub fn address_state(address: &Address) -> Option<State> {
    State::from_code(&address.state, &address.postcode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::create_rng;
    use crate::utils::test_utils::reference_data;

    #[test]
    fn test_sampled_address_is_a_real_row() {
        let reference = reference_data();
        let synth = AddressSynthesizer::new(&reference, AddressMode::Sampled, 100);
        let mut rng = create_rng(Some(11));
        for _ in 0..50 {
            let address = synth.generate(&mut rng, None).unwrap();
            let cell = reference.addresses.cell(&address.sa1).unwrap();
            assert!(cell.addresses.iter().any(|a| a.street_no == address.street_no
                && a.street_name == address.street_name
                && a.postcode == address.postcode));
            assert_eq!(address.country, COUNTRY);
            assert!(!address.short_street_type.is_empty());
        }
    }

    #[test]
    fn test_nearby_stays_in_sa3() {
        let reference = reference_data();
        let synth = AddressSynthesizer::new(&reference, AddressMode::Sampled, 100);
        let mut rng = create_rng(Some(12));
        for _ in 0..30 {
            let address = synth.generate(&mut rng, Some("20601000001")).unwrap();
            assert!(address.sa1.starts_with("20601"));
            assert_eq!(address.state, "VIC");
        }
    }

    #[test]
    fn test_synthetic_components_never_coincide() {
        let reference = reference_data();
        let book = &reference.addresses;
        let synth = AddressSynthesizer::new(&reference, AddressMode::Synthetic, 500);
        let mut rng = create_rng(Some(13));
        for _ in 0..100 {
            let address = synth.generate(&mut rng, None).unwrap();
            let state = address_state(&address).unwrap();
            let number: u32 = address.street_no.parse().unwrap();
            assert!(SYNTHETIC_STREET_NUMBERS.contains(&number));
            assert!(!book.postcode_states(&address.postcode).contains(state));
            assert!(!book.suburb_states(&address.suburb).contains(state));
            assert!(!book
                .suburb_states(&address.suburb)
                .intersects(book.postcode_states(&address.postcode)));
            assert!(!book.street_in_postcode(&address.street_name, &address.postcode));
            assert!(!book.street_type_in_state(&address.street_name, &address.street_type, state));
        }
    }

    #[test]
    fn test_unsatisfiable_constraints_exhaust_budget() {
        use crate::reference::geography::AddressRow;
        use rustc_hash::FxHashMap;

        let mut meshblocks = FxHashMap::default();
        meshblocks.insert("MB1".to_string(), "10101000001".to_string());
        let rows = vec![AddressRow {
            street_number: "1".into(),
            street_name: "George".into(),
            street_type: "STREET".into(),
            street_suffix: None,
            locality: "Sydney".into(),
            state: "NSW".into(),
            postcode: "2000".into(),
            meshblock: "MB1".into(),
            longitude: "151.2".into(),
            latitude: "-33.8".into(),
        }];
        let base = reference_data();
        let book = AddressBook::from_rows(&meshblocks, rows, &base.street_types).unwrap();
        let reference = ReferenceData { addresses: book, ..base };

        let synth = AddressSynthesizer::new(&reference, AddressMode::Synthetic, 20);
        let err = synth.generate(&mut create_rng(Some(1)), None).unwrap_err();
        assert!(matches!(err, PmiError::DataExhaustion { attempts: 20, .. }));
    }
}
