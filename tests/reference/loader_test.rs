//! Loading reference tables from a directory of Parquet files

use std::path::Path;

use pmi_synth::reference::loader::{
    ADDRESSES_FILE, BOYS_NAMES_FILE, FAMILY_NAMES_FILE, GIRLS_NAMES_FILE, MESHBLOCKS_FILE,
    MeshBlockRow, NICKNAMES_FILE, NameCountRow, NicknameRow,
};
use pmi_synth::utils::test_utils::{address_rows, family_name_counts, meshblock_map, test_config_builder};
use pmi_synth::{IdentityGraphBuilder, PmiError, ReferenceData};

use crate::utils::write_parquet;

fn names(pairs: &[(&str, i64)]) -> Vec<NameCountRow> {
    pairs
        .iter()
        .map(|(name, count)| NameCountRow {
            name: (*name).to_string(),
            count: *count,
        })
        .collect()
}

fn write_reference_dir(dir: &Path) {
    let family: Vec<NameCountRow> = family_name_counts()
        .into_iter()
        .map(|(name, count)| NameCountRow {
            name,
            count: i64::try_from(count).unwrap(),
        })
        .collect();
    write_parquet(&dir.join(FAMILY_NAMES_FILE), &family);
    write_parquet(
        &dir.join(BOYS_NAMES_FILE),
        &names(&[("William", 60_000), ("James", 55_000), ("Thomas", 30_000), ("Ambrose", 300)]),
    );
    write_parquet(
        &dir.join(GIRLS_NAMES_FILE),
        &names(&[("Mary", 48_000), ("Susan", 33_000), ("Olivia", 12_000), ("Ottilie", 200)]),
    );

    let mut meshblocks: Vec<MeshBlockRow> = meshblock_map()
        .into_iter()
        .map(|(meshblock, sa1)| MeshBlockRow { meshblock, sa1 })
        .collect();
    meshblocks.sort_by(|a, b| a.meshblock.cmp(&b.meshblock));
    write_parquet(&dir.join(MESHBLOCKS_FILE), &meshblocks);
    write_parquet(&dir.join(ADDRESSES_FILE), &address_rows());
}

#[test]
fn test_directory_loads_and_generates() {
    let dir = tempfile::tempdir().unwrap();
    write_reference_dir(dir.path());

    let reference = ReferenceData::load_dir(dir.path()).unwrap();
    assert_eq!(reference.boys_names.len(), 4);
    assert_eq!(reference.girls_names.len(), 4);
    assert_eq!(reference.addresses.address_count(), address_rows().len());

    let config = test_config_builder(41).ur_range(1, 60).build().unwrap();
    let output = IdentityGraphBuilder::from_config(&config, &reference).run().unwrap();
    assert_eq!(output.records.len(), 59);
}

#[test]
fn test_optional_nicknames_are_read() {
    let dir = tempfile::tempdir().unwrap();
    write_reference_dir(dir.path());
    write_parquet(
        &dir.path().join(NICKNAMES_FILE),
        &[NicknameRow {
            name: "AMBROSE".to_string(),
            nickname: "BROSY".to_string(),
        }],
    );

    let reference = ReferenceData::load_dir(dir.path()).unwrap();
    let nicknames = reference.nicknames.lookup("Ambrose").unwrap();
    assert_eq!(nicknames, ["BROSY".to_string()]);
    assert_eq!(reference.nicknames.len(), 1);
}

#[test]
fn test_missing_column_is_named() {
    let dir = tempfile::tempdir().unwrap();
    write_reference_dir(dir.path());
    write_parquet(
        &dir.path().join(MESHBLOCKS_FILE),
        &[NicknameRow {
            name: "MB101".to_string(),
            nickname: "10101000001".to_string(),
        }],
    );

    match ReferenceData::load_dir(dir.path()) {
        Err(PmiError::MissingColumn { column, source_name }) => {
            assert_eq!(column, "meshblock");
            assert!(source_name.ends_with(MESHBLOCKS_FILE));
        }
        other => panic!("expected a missing column error, got {other:?}"),
    }
}

#[test]
fn test_missing_directory_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReferenceData::load_dir(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, PmiError::Usage(_)));
    assert_eq!(err.exit_code(), pmi_synth::error::EXIT_USAGE);
}
