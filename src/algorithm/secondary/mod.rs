//! Secondary PMI generation against a master PMI
//!
//! A secondary PMI belongs to a second facility. Some of its records are
//! the same people as records of the master PMI and carry the master UR in
//! `AltUR`. `MasterIndex` holds the master table, `AltLinker` draws master
//! records and links secondary records to them.

pub mod linker;

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::algorithm::demographics::UsedIdentifiers;
use crate::error::{PmiError, Result};
use crate::export::{StringTable, read_string_table};
use crate::models::{ColumnField, PersonRecord, UrValue};
use crate::utils::logging::TimedOperation;

pub use linker::AltLinker;

/// Columns a master PMI must carry
pub const REQUIRED_COLUMNS: [&str; 5] = ["UR", "familyName", "givenName", "birthdate", "sex"];

/// The master PMI, indexed for cross-linking
#[derive(Debug, Clone, Default)]
pub struct MasterIndex {
    columns: FxHashSet<String>,
    records: Vec<PersonRecord>,
    urs: FxHashSet<u64>,
    alias_urs: Vec<UrValue>,
    merged_urs: Vec<UrValue>,
    deleted_urs: Vec<UrValue>,
}

impl MasterIndex {
    /// Index a master table
    ///
    /// Fails with `MissingColumn` if a required column is absent, or `IHI`
    /// is absent while IHIs are requested. Values that do not parse are a
    /// configuration error for required columns and skipped otherwise.
    pub fn from_table(table: &StringTable, include_ihi: bool, source_name: &str) -> Result<Self> {
        let mut required: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        if include_ihi {
            required.push("IHI");
        }
        for column in &required {
            if table.column_index(column).is_none() {
                return Err(PmiError::missing_column(*column, source_name));
            }
        }

        let mut index = Self {
            columns: table.columns.iter().cloned().collect(),
            ..Self::default()
        };
        let mut skipped = 0_usize;
        for (row_number, row) in table.rows.iter().enumerate() {
            let mut record = PersonRecord::default();
            for (column, value) in table.columns.iter().zip(row) {
                match record.set_column(column, value) {
                    Ok(_) => {}
                    Err(message) if required.contains(&column.as_str()) => {
                        return Err(PmiError::config(format!(
                            "{source_name} row {}: {message}",
                            row_number + 1
                        )));
                    }
                    Err(message) => {
                        log::debug!("{source_name} row {}: {message}", row_number + 1);
                        skipped += 1;
                    }
                }
            }
            index.insert(record);
        }
        if skipped > 0 {
            log::warn!("{skipped} unreadable optional values ignored in {source_name}");
        }
        Ok(index)
    }

    /// Read and index a master PMI Parquet file
    pub fn load(path: &Path, include_ihi: bool) -> Result<Self> {
        let operation = TimedOperation::start("Loading master PMI", path);
        let table = read_string_table(path)?;
        let index = Self::from_table(&table, include_ihi, &path.display().to_string())?;
        operation.finish(index.len());
        Ok(index)
    }

    fn insert(&mut self, record: PersonRecord) {
        if let Some(ur) = record.ur.as_number() {
            self.urs.insert(ur);
        }
        if record.alias.is_some() {
            self.alias_urs.push(record.ur.clone());
        }
        if record.merged.is_some() {
            self.merged_urs.push(record.ur.clone());
        }
        if record.deleted {
            self.deleted_urs.push(record.ur.clone());
        }
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    #[must_use]
    pub fn record(&self, index: usize) -> Option<&PersonRecord> {
        self.records.get(index)
    }

    /// Whether the master table carried a column
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    #[must_use]
    pub fn alias_urs(&self) -> &[UrValue] {
        &self.alias_urs
    }

    #[must_use]
    pub fn merged_urs(&self) -> &[UrValue] {
        &self.merged_urs
    }

    #[must_use]
    pub fn deleted_urs(&self) -> &[UrValue] {
        &self.deleted_urs
    }

    /// Numeric UR values between the lowest and highest master UR that no
    /// master record uses, at most `cap` of them
    #[must_use]
    pub fn skipped_urs(&self, cap: usize) -> Vec<u64> {
        let (Some(low), Some(high)) = (self.urs.iter().min(), self.urs.iter().max()) else {
            return Vec::new();
        };
        (*low..*high)
            .filter(|ur| !self.urs.contains(ur))
            .take(cap)
            .collect()
    }

    /// Mark every master identifier as taken so fresh records never reuse one
    pub fn register_identifiers(&self, used: &mut UsedIdentifiers) {
        for record in &self.records {
            if !record.medicare_no.is_empty() {
                used.medicare.insert(record.medicare_no.clone());
            }
            if let Some(ihi) = &record.ihi {
                used.ihi.insert(ihi.clone());
            }
            if let Some(dva) = &record.dva_no {
                used.dva.insert(dva.clone());
            }
        }
    }
}
