//! Parquet export and string-table read back

use arrow::array::Array;
use pmi_synth::export::records_to_batch;
use pmi_synth::{ColumnSelection, MasterIndex, PmiError, read_string_table, write_records};

use crate::utils::{config_for, generate};

#[test]
fn test_written_table_reads_back_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pmi.parquet");
    let config = config_for(31, 1000, 1080)
        .rates(20.0, 10.0, 5.0)
        .include_ihi(true)
        .build()
        .unwrap();
    let output = generate(&config);
    let selection = ColumnSelection::from_config(&config, false).unwrap();
    write_records(&path, &output.records, &selection, None).unwrap();

    let table = read_string_table(&path).unwrap();
    assert_eq!(table.columns, selection.columns());
    assert_eq!(table.len(), output.records.len());
    for (record, row) in output.records.iter().zip(&table.rows) {
        assert_eq!(row, &selection.row(record, None).unwrap());
    }
}

#[test]
fn test_exported_links_reload_as_master() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pmi.parquet");
    let config = config_for(32, 2000, 2200).rates(25.0, 15.0, 10.0).build().unwrap();
    let output = generate(&config);
    let selection = ColumnSelection::from_config(&config, false).unwrap();
    write_records(&path, &output.records, &selection, None).unwrap();

    let index = MasterIndex::load(&path, false).unwrap();
    let aliases = output.records.iter().filter(|r| r.alias.is_some()).count();
    let merges = output.records.iter().filter(|r| r.merged.is_some()).count();
    let deleted = output.records.iter().filter(|r| r.deleted).count();
    assert_eq!(index.alias_urs().len(), aliases);
    assert_eq!(index.merged_urs().len(), merges);
    assert_eq!(index.deleted_urs().len(), deleted);
    for (loaded, record) in index.records().iter().zip(&output.records) {
        assert_eq!(loaded.ur, record.ur);
        assert_eq!(loaded.family_name, record.family_name);
        assert_eq!(loaded.birthdate, record.birthdate);
    }
}

#[test]
fn test_oversized_value_fails_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pmi.parquet");
    let config = config_for(33, 3000, 3020).fields(["email"]).build().unwrap();
    let output = generate(&config);
    let selection = ColumnSelection::from_config(&config, false).unwrap();

    let err = write_records(&path, &output.records, &selection, Some(5)).unwrap_err();
    match &err {
        PmiError::Serialization { ur, column, limit, .. } => {
            assert_eq!(ur, "3000");
            assert_eq!(column, "email");
            assert_eq!(*limit, 5);
        }
        other => panic!("expected a serialization error, got {other:?}"),
    }
    assert_eq!(err.exit_code(), pmi_synth::error::EXIT_DATA);
    assert!(!path.exists());
}

#[test]
fn test_batch_schema_follows_selection() {
    let config = config_for(34, 4000, 4015)
        .rates(0.0, 0.0, 0.0)
        .fields(["familyName", "givenName", "sex"])
        .build()
        .unwrap();
    let output = generate(&config);
    let selection = ColumnSelection::from_config(&config, false).unwrap();
    let batch = records_to_batch(&output.records, &selection, None).unwrap();

    let names: Vec<&str> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|field| field.name().as_str())
        .collect();
    assert_eq!(names, ["PID", "UR", "Alias", "Merged", "Deleted", "familyName", "givenName", "sex"]);
    assert_eq!(batch.num_rows(), 15);
    assert_eq!(batch.column(2).null_count(), 15);
}
