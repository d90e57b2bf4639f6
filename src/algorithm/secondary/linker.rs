//! Cross-linking secondary records to master records

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::algorithm::demographics::identifiers::corrupt_ihi;
use crate::algorithm::pmi::decision::{AltLink, AltUrError};
use crate::algorithm::pmi::mutation::Mutator;
use crate::config::{ErrorRates, GeneratorConfig};
use crate::models::{ColumnField, PersonRecord, UrValue};
use crate::utils::random::{chance, normal, round_to};

use super::MasterIndex;

/// Address columns, copied together or not at all
const ADDRESS_COLUMNS: &[&str] = &[
    "streetNo",
    "streetName",
    "streetType",
    "shortStreetType",
    "suburb",
    "state",
    "postcode",
    "longitude",
    "latitude",
    "country",
];

/// Columns copied whenever the master carries them
const COPIED_COLUMNS: &[&str] = &[
    "mobile",
    "homePhone",
    "businessPhone",
    "email",
    "medicareNo",
    "IHI",
    "dvaNo",
    "dvaType",
    "crnNo",
    "PEN",
    "SEN",
    "HC",
    "title",
    "married",
    "race",
    "deathDate",
];

/// Chance the master address is kept
const KEEP_ADDRESS: f64 = 0.8;

/// Draws master records without replacement and links records to them
#[derive(Debug, Clone)]
pub struct AltLinker<'a> {
    master: &'a MasterIndex,
    unused: Vec<usize>,
    skipped: Vec<u64>,
    has_alt_ur: f64,
    bad_alt_ihi: f64,
    errors: Option<ErrorRates>,
    include_ihi: bool,
}

impl<'a> AltLinker<'a> {
    #[must_use]
    pub fn new(master: &'a MasterIndex, config: &GeneratorConfig) -> Self {
        let errors = config.errors_enabled().then(|| config.errors.clone());
        let skipped = match &errors {
            Some(rates) => {
                let span = config.pmi.end_ur.saturating_sub(config.pmi.start_ur) as f64;
                master.skipped_urs((span * 2.0 * rates.bad_alt_ur / 100.0) as usize)
            }
            None => Vec::new(),
        };
        Self {
            master,
            unused: (0..master.len()).collect(),
            skipped,
            has_alt_ur: config.profile.has_alt_ur,
            bad_alt_ihi: config.ihi.bad_alt_ihi,
            errors,
            include_ihi: config.flags.include_ihi,
        }
    }

    #[must_use]
    pub const fn master(&self) -> &'a MasterIndex {
        self.master
    }

    /// Master records not linked yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.unused.len()
    }

    /// Unused master UR values left for bad AltUR injection
    #[must_use]
    pub fn skipped_remaining(&self) -> usize {
        self.skipped.len()
    }

    /// Roll whether the next record is linked to a master record
    pub fn should_link<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        !self.unused.is_empty() && chance(rng, self.has_alt_ur)
    }

    /// Turn `record` into a second registration of an unused master record
    ///
    /// Returns `None` once every master record has been used.
    pub fn link<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mutator: &Mutator<'_>,
        record: &mut PersonRecord,
    ) -> Option<(AltLink, String)> {
        if self.unused.is_empty() {
            return None;
        }
        let position = rng.random_range(0..self.unused.len());
        let index = self.unused.swap_remove(position);
        let masters = self.master;
        let master = masters.record(index)?;

        let info = self.clone_master(rng, mutator, master, record);
        record.alt_ur = Some(master.ur.clone());
        if self.include_ihi {
            record.alt_ihi.clone_from(&record.ihi);
        }

        let mut link = AltLink {
            master: index,
            error: None,
            fell_back: false,
            bad_ihi: false,
        };
        let Some(rates) = &self.errors else {
            return Some((link, info));
        };

        if self.include_ihi && chance(rng, self.bad_alt_ihi) {
            if let Some(ihi) = &record.ihi {
                record.alt_ihi = Some(corrupt_ihi(rng, ihi));
                link.bad_ihi = true;
            }
        }

        let fallback = master.ur.invalidated();
        if chance(rng, rates.bad_alt_ur) {
            link.error = Some(AltUrError::Bad);
            record.alt_ur = Some(if self.skipped.is_empty() {
                fallback
            } else {
                let position = rng.random_range(0..self.skipped.len());
                UrValue::Number(self.skipped.swap_remove(position))
            });
        } else {
            let pick = if chance(rng, rates.alias_alt_ur) {
                Some((AltUrError::Alias, masters.alias_urs()))
            } else if chance(rng, rates.merged_alt_ur) {
                Some((AltUrError::Merged, masters.merged_urs()))
            } else if chance(rng, rates.deleted_alt_ur) {
                Some((AltUrError::Deleted, masters.deleted_urs()))
            } else {
                None
            };
            if let Some((error, candidates)) = pick {
                link.error = Some(error);
                match candidates.choose(rng) {
                    Some(ur) => record.alt_ur = Some(ur.clone()),
                    None => {
                        link.fell_back = true;
                        record.alt_ur = Some(fallback);
                    }
                }
            }
        }
        Some((link, info))
    }

    /// Copy the master columns onto `record`, returning the groups copied
    fn clone_master<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        mutator: &Mutator<'_>,
        master: &PersonRecord,
        record: &mut PersonRecord,
    ) -> String {
        let mut info = vec!["name"];
        record.family_name.clone_from(&master.family_name);
        record.given_name.clone_from(&master.given_name);

        if rng.random::<f64>() < KEEP_ADDRESS {
            info.push("addr");
            self.copy_columns(master, record, ADDRESS_COLUMNS);
        }
        record.birthdate = mutator.drift_birthdate(rng, master.birthdate);
        if record.birthdate == master.birthdate {
            info.push("bd");
        }
        record.sex = master.sex;
        info.push("sex");
        self.copy_columns(master, record, COPIED_COLUMNS);

        if self.master.has_column("height") {
            record.height = round_to(normal(rng, master.height, master.height / 50.0), 0);
        }
        if self.master.has_column("weight") {
            record.weight = round_to(normal(rng, master.weight, master.weight / 20.0), 1);
        }
        if self.master.has_column("waist") {
            record.waist = round_to(normal(rng, master.waist, master.waist / 25.0), 0);
        }
        if self.master.has_column("hips") {
            record.hips = round_to(normal(rng, master.hips, master.hips / 25.0), 0);
        }
        info.join(",")
    }

    fn copy_columns(&self, master: &PersonRecord, record: &mut PersonRecord, columns: &[&str]) {
        for column in columns {
            if !self.master.has_column(column) {
                continue;
            }
            if let Some(value) = master.column_value(column) {
                if let Err(message) = record.set_column(column, &value) {
                    log::debug!("master column {column} not copied: {message}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IhiConfig;
    use crate::export::StringTable;
    use crate::utils::random::create_rng;
    use crate::utils::test_utils::{reference_data, reference_date, test_config_builder};

    fn master_table(count: u64, with_ihi: bool) -> StringTable {
        let mut columns: Vec<String> = ["UR", "Alias", "Merged", "Deleted", "familyName", "givenName", "birthdate", "sex", "postcode", "height"]
            .iter()
            .map(ToString::to_string)
            .collect();
        if with_ihi {
            columns.push("IHI".to_string());
        }
        let rows = (0..count)
            .map(|i| {
                let ur = 500 + i * 3;
                let mut row = vec![
                    ur.to_string(),
                    if i % 5 == 1 { "500".to_string() } else { String::new() },
                    if i % 7 == 2 { "500".to_string() } else { String::new() },
                    if i % 4 == 3 { "D".to_string() } else { String::new() },
                    format!("FAMILY{i}"),
                    format!("GIVEN{i}"),
                    "1975-03-04".to_string(),
                    if i % 2 == 0 { "F" } else { "M" }.to_string(),
                    "2600".to_string(),
                    "170".to_string(),
                ];
                if with_ihi {
                    row.push("8003609900000019".to_string());
                }
                row
            })
            .collect();
        StringTable { columns, rows }
    }

    #[test]
    fn test_each_master_is_linked_once() {
        let master = MasterIndex::from_table(&master_table(20, false), false, "master").unwrap();
        let config = test_config_builder(1).has_alt_ur(100.0).build().unwrap();
        let reference = reference_data();
        let mutator = Mutator::new(&reference, reference_date(), false);
        let mut linker = AltLinker::new(&master, &config);
        let mut rng = create_rng(Some(1));

        let mut seen = Vec::new();
        for _ in 0..20 {
            assert!(linker.should_link(&mut rng));
            let mut record = PersonRecord::default();
            let (link, info) = linker.link(&mut rng, &mutator, &mut record).unwrap();
            let source = master.record(link.master).unwrap();
            assert_eq!(record.alt_ur.as_ref(), Some(&source.ur));
            assert_eq!(record.family_name, source.family_name);
            assert_eq!(record.sex, source.sex);
            assert!(info.starts_with("name"));
            assert!(link.error.is_none());
            if info.contains("addr") {
                assert_eq!(record.address.postcode, "2600");
            }
            assert!((record.height - 170.0).abs() < 40.0);
            seen.push(link.master);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert!(!linker.should_link(&mut rng));
        assert!(linker.link(&mut rng, &mutator, &mut PersonRecord::default()).is_none());
    }

    #[test]
    fn test_bad_alt_ur_uses_unused_master_urs() {
        let master = MasterIndex::from_table(&master_table(40, false), false, "master").unwrap();
        let errors = ErrorRates {
            bad_alt_ur: 100.0,
            ..ErrorRates::default()
        };
        let config = test_config_builder(2)
            .ur_range(1000, 1010)
            .inject_errors(true)
            .errors(errors)
            .build()
            .unwrap();
        let reference = reference_data();
        let mutator = Mutator::new(&reference, reference_date(), false);
        let mut linker = AltLinker::new(&master, &config);
        let mut rng = create_rng(Some(2));
        let master_urs: Vec<UrValue> = master.records().iter().map(|r| r.ur.clone()).collect();

        let available = linker.skipped_remaining();
        assert_eq!(available, 20);
        for _ in 0..available {
            let mut record = PersonRecord::default();
            let (link, _) = linker.link(&mut rng, &mutator, &mut record).unwrap();
            assert_eq!(link.error, Some(AltUrError::Bad));
            let alt = record.alt_ur.unwrap();
            assert!(alt.as_number().is_some());
            assert!(!master_urs.contains(&alt));
        }
        let mut record = PersonRecord::default();
        linker.link(&mut rng, &mutator, &mut record).unwrap();
        assert!(matches!(record.alt_ur, Some(UrValue::Invalid(ref s)) if s.ends_with('X')));
    }

    #[test]
    fn test_alias_alt_ur_points_at_master_alias() {
        let master = MasterIndex::from_table(&master_table(12, true), true, "master").unwrap();
        let errors = ErrorRates {
            bad_alt_ur: 0.0,
            alias_alt_ur: 100.0,
            ..ErrorRates::default()
        };
        let ihi = IhiConfig {
            bad_alt_ihi: 100.0,
            ..IhiConfig::default()
        };
        let config = test_config_builder(3)
            .include_ihi(true)
            .inject_errors(true)
            .errors(errors)
            .ihi(ihi)
            .build()
            .unwrap();
        let reference = reference_data();
        let mutator = Mutator::new(&reference, reference_date(), true);
        let mut linker = AltLinker::new(&master, &config);
        let mut rng = create_rng(Some(3));

        let mut record = PersonRecord::default();
        let (link, _) = linker.link(&mut rng, &mutator, &mut record).unwrap();
        assert_eq!(link.error, Some(AltUrError::Alias));
        assert!(master.alias_urs().contains(record.alt_ur.as_ref().unwrap()));
        assert!(link.bad_ihi);
        let alt_ihi = record.alt_ihi.unwrap();
        assert_eq!(&alt_ihi[..7], "8003609");
        assert_ne!(Some(alt_ihi), record.ihi);
    }
}
