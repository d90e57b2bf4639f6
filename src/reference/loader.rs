//! Parquet loading for reference tables
//!
//! Each table is read with `ParquetRecordBatchReaderBuilder` and converted
//! to typed rows with `serde_arrow`. Required columns are checked against
//! the file schema first so a missing column is reported by name.

use std::path::Path;

use arrow::datatypes::Schema;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::util::{safe_open_file, validate_directory};
use crate::error::{PmiError, Result};
use crate::reference::ReferenceData;
use crate::reference::geography::{AddressBook, AddressRow};
use crate::reference::names::{FAMILY_NAME_DIVISOR, GIVEN_NAME_DIVISOR, NameTable};
use crate::reference::nicknames::Nicknames;
use crate::reference::street_types::StreetTypes;
use crate::utils::logging::TimedOperation;

pub const FAMILY_NAMES_FILE: &str = "family_names.parquet";
pub const BOYS_NAMES_FILE: &str = "boys_names.parquet";
pub const GIRLS_NAMES_FILE: &str = "girls_names.parquet";
pub const MESHBLOCKS_FILE: &str = "meshblocks.parquet";
pub const ADDRESSES_FILE: &str = "addresses.parquet";
pub const STREET_TYPES_FILE: &str = "street_types.parquet";
pub const NICKNAMES_FILE: &str = "nicknames.parquet";

/// A name and its frequency in the source population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameCountRow {
    pub name: String,
    pub count: i64,
}

/// Mesh block to SA1 mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshBlockRow {
    pub meshblock: String,
    pub sa1: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetTypeRow {
    pub street_type: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicknameRow {
    pub name: String,
    pub nickname: String,
}

/// Fail with `MissingColumn` if the schema lacks any required column
pub fn require_columns(schema: &Schema, required: &[&str], source_name: &str) -> Result<()> {
    for column in required {
        if schema.index_of(column).is_err() {
            return Err(PmiError::missing_column(*column, source_name));
        }
    }
    Ok(())
}

/// Read every row of a Parquet file into typed rows
pub fn read_rows<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let file = safe_open_file(path, "reference data")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    require_columns(builder.schema(), required, &path.display().to_string())?;

    let mut rows = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let mut part: Vec<T> = serde_arrow::from_record_batch(&batch)?;
        rows.append(&mut part);
    }
    Ok(rows)
}

fn read_names(dir: &Path, file: &str, table: &str, divisor: u64) -> Result<NameTable> {
    let rows: Vec<NameCountRow> = read_rows(&dir.join(file), &["name", "count"])?;
    NameTable::from_counts(
        table,
        rows.into_iter()
            .map(|row| (row.name, u64::try_from(row.count).unwrap_or(0))),
        divisor,
    )
}

/// Load every reference table from a directory
pub fn load_reference_dir(dir: &Path) -> Result<ReferenceData> {
    validate_directory(dir, "reference data")?;
    let operation = TimedOperation::start("Loading reference data", dir);

    let family_names = read_names(dir, FAMILY_NAMES_FILE, "family", FAMILY_NAME_DIVISOR)?;
    let boys_names = read_names(dir, BOYS_NAMES_FILE, "boys", GIVEN_NAME_DIVISOR)?;
    let girls_names = read_names(dir, GIRLS_NAMES_FILE, "girls", GIVEN_NAME_DIVISOR)?;
    log::info!(
        "Read {} family names, {} boys names and {} girls names",
        family_names.len(),
        boys_names.len(),
        girls_names.len()
    );

    let street_types_path = dir.join(STREET_TYPES_FILE);
    let street_types = if street_types_path.is_file() {
        let rows: Vec<StreetTypeRow> =
            read_rows(&street_types_path, &["street_type", "abbreviation"])?;
        StreetTypes::from_pairs(rows.into_iter().map(|r| (r.street_type, r.abbreviation)))?
    } else {
        log::debug!("No {STREET_TYPES_FILE}, using built-in street types");
        StreetTypes::builtin()
    };

    let nicknames_path = dir.join(NICKNAMES_FILE);
    let nicknames = if nicknames_path.is_file() {
        let rows: Vec<NicknameRow> = read_rows(&nicknames_path, &["name", "nickname"])?;
        Nicknames::from_pairs(rows.into_iter().map(|r| (r.name, r.nickname)))
    } else {
        log::debug!("No {NICKNAMES_FILE}, using built-in nicknames");
        Nicknames::builtin()
    };

    let meshblocks: Vec<MeshBlockRow> =
        read_rows(&dir.join(MESHBLOCKS_FILE), &["meshblock", "sa1"])?;
    let meshblock_sa1: FxHashMap<String, String> = meshblocks
        .into_iter()
        .map(|row| (row.meshblock.trim().to_string(), row.sa1.trim().to_string()))
        .collect();

    let addresses: Vec<AddressRow> = read_rows(
        &dir.join(ADDRESSES_FILE),
        &[
            "street_number",
            "street_name",
            "street_type",
            "locality",
            "state",
            "postcode",
            "meshblock",
            "longitude",
            "latitude",
        ],
    )?;
    let address_rows = addresses.len();
    let addresses = AddressBook::from_rows(&meshblock_sa1, addresses, &street_types)?;

    operation.finish(address_rows);

    ReferenceData::new(
        family_names,
        boys_names,
        girls_names,
        addresses,
        street_types,
        nicknames,
    )
}
