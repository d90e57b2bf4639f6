//! Secondary PMI generation against a master PMI written to Parquet

use std::path::Path;

use pmi_synth::config::{ErrorRates, IhiConfig};
use pmi_synth::utils::test_utils::reference_data;
use pmi_synth::{
    ColumnSelection, GeneratorConfig, IdentityGraphBuilder, MasterIndex, PmiError, PmiOutput,
    UrValue, write_records,
};
use rustc_hash::FxHashSet;

use crate::utils::{config_for, generate};

fn write_master(path: &Path, config: &GeneratorConfig) -> PmiOutput {
    let master = generate(config);
    let selection = ColumnSelection::from_config(config, false).unwrap();
    write_records(path, &master.records, &selection, None).unwrap();
    master
}

fn secondary(config: &GeneratorConfig, master: &MasterIndex) -> PmiOutput {
    let reference = reference_data();
    IdentityGraphBuilder::from_config(config, &reference)
        .with_secondary(master)
        .run()
        .unwrap()
}

#[test]
fn test_alt_urs_point_at_distinct_master_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.parquet");
    let master_config = config_for(21, 100_000, 100_150).build().unwrap();
    let master = write_master(&path, &master_config);

    let index = MasterIndex::load(&path, false).unwrap();
    assert_eq!(index.len(), master.records.len());

    let config = config_for(22, 500_000, 500_200).has_alt_ur(50.0).build().unwrap();
    let output = secondary(&config, &index);

    let master_urs: FxHashSet<UrValue> = master.records.iter().map(|r| r.ur.clone()).collect();
    let mut seen = FxHashSet::default();
    let mut linked = 0;
    for record in &output.records {
        if let Some(alt) = &record.alt_ur {
            assert!(master_urs.contains(alt), "AltUR {alt} is not a master UR");
            assert!(seen.insert(alt.clone()), "master UR {alt} linked twice");
            linked += 1;
        }
    }
    assert!(linked > 0);
    assert_eq!(linked, output.counters.alt_linked);
    assert_eq!(output.counters.branch_total(), output.records.len());
    assert!(output.records[..10].iter().all(|r| r.alt_ur.is_none()));
}

#[test]
fn test_linked_records_copy_master_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.parquet");
    let master_config = config_for(23, 200_000, 200_100).build().unwrap();
    let master = write_master(&path, &master_config);
    let index = MasterIndex::load(&path, false).unwrap();

    let config = config_for(24, 600_000, 600_100).has_alt_ur(100.0).build().unwrap();
    let output = secondary(&config, &index);

    for record in output.records.iter().filter(|r| r.alt_ur.is_some()) {
        let alt = record.alt_ur.as_ref().unwrap();
        let source = master.records.iter().find(|m| &m.ur == alt).unwrap();
        assert_eq!(record.family_name, source.family_name);
        assert_eq!(record.given_name, source.given_name);
        assert_eq!(record.sex, source.sex);
        assert_eq!(record.medicare_no, source.medicare_no);
    }
}

#[test]
fn test_corrupted_alt_urs_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.parquet");
    let master_config = config_for(25, 300_000, 300_200)
        .skip_ur(3)
        .rates(20.0, 10.0, 5.0)
        .build()
        .unwrap();
    let master = write_master(&path, &master_config);
    let index = MasterIndex::load(&path, false).unwrap();

    let errors = ErrorRates {
        bad_alt_ur: 30.0,
        alias_alt_ur: 10.0,
        ..ErrorRates::default()
    };
    let config = config_for(26, 700_000, 700_150)
        .has_alt_ur(80.0)
        .inject_errors(true)
        .errors(errors)
        .build()
        .unwrap();
    let output = secondary(&config, &index);

    let master_urs: FxHashSet<UrValue> = master.records.iter().map(|r| r.ur.clone()).collect();
    let unresolved = output
        .records
        .iter()
        .filter_map(|r| r.alt_ur.as_ref())
        .filter(|alt| !master_urs.contains(*alt))
        .count();
    assert!(output.counters.bad_alt_ur > 0);
    let counters = &output.counters;
    let corrupted = counters.bad_alt_ur + counters.alias_alt_ur + counters.merged_alt_ur + counters.deleted_alt_ur;
    assert!(unresolved <= corrupted);
    assert_eq!(output.counters.branch_total(), output.records.len());
}

#[test]
fn test_master_without_ihi_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.parquet");
    let master_config = config_for(27, 400_000, 400_030).build().unwrap();
    write_master(&path, &master_config);

    match MasterIndex::load(&path, true) {
        Err(err @ PmiError::MissingColumn { .. }) => {
            assert!(err.to_string().contains("'IHI'"));
            assert_eq!(err.exit_code(), pmi_synth::error::EXIT_CONFIG);
        }
        other => panic!("expected a missing column error, got {other:?}"),
    }
}

#[test]
fn test_secondary_ihis_follow_master() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.parquet");
    let ihi = IhiConfig {
        percent_ihi: 100.0,
        ..IhiConfig::default()
    };
    let master_config = config_for(28, 800_000, 800_080)
        .include_ihi(true)
        .ihi(ihi.clone())
        .build()
        .unwrap();
    let master = write_master(&path, &master_config);
    let index = MasterIndex::load(&path, true).unwrap();

    let config = config_for(29, 900_000, 900_080)
        .include_ihi(true)
        .ihi(ihi)
        .has_alt_ur(100.0)
        .build()
        .unwrap();
    let output = secondary(&config, &index);

    let master_ihis: FxHashSet<&str> = master.records.iter().filter_map(|r| r.ihi.as_deref()).collect();
    for record in output.records.iter().filter(|r| r.alt_ur.is_some()) {
        let ihi = record.ihi.as_deref().unwrap();
        assert!(master_ihis.contains(ihi));
        assert_eq!(record.alt_ihi.as_deref(), Some(ihi));
    }
    for record in output.records.iter().filter(|r| r.alt_ur.is_none() && !r.is_linked()) {
        if let Some(ihi) = record.ihi.as_deref() {
            assert!(!master_ihis.contains(ihi), "fresh record reuses master IHI {ihi}");
        }
    }
}
