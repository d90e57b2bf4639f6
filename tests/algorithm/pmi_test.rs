//! Identity graph properties over whole runs

use pmi_synth::algorithm::demographics::identifiers::{is_valid_luhn, is_valid_medicare};
use pmi_synth::config::{ErrorRates, IhiConfig};
use pmi_synth::utils::test_utils::reference_data;
use pmi_synth::{IdentityGraphBuilder, PersonRecord, UrValue};
use rustc_hash::FxHashSet;

use crate::utils::{config_for, generate, resolve, ur_index};

#[test]
fn test_first_ten_records_are_independent() {
    let config = config_for(1, 1000, 1010).rates(10.0, 5.0, 2.0).build().unwrap();
    let output = generate(&config);

    assert_eq!(output.records.len(), 10);
    let urs: Vec<UrValue> = output.records.iter().map(|r| r.ur.clone()).collect();
    let expected: Vec<UrValue> = (1000..1010).map(UrValue::Number).collect();
    assert_eq!(urs, expected);
    assert!(output.records.iter().all(|r| r.alias.is_none() && r.merged.is_none()));
}

#[test]
fn test_urs_unique_without_errors() {
    let config = config_for(2, 10_000, 10_300).rates(20.0, 10.0, 5.0).build().unwrap();
    let output = generate(&config);
    let distinct: FxHashSet<&UrValue> = output.records.iter().map(|r| &r.ur).collect();
    assert_eq!(distinct.len(), output.records.len());
    assert_eq!(output.counters.dup_ur, 0);
}

#[test]
fn test_repeated_urs_match_duplicate_counter() {
    let errors = ErrorRates {
        dup_ur: 15.0,
        ..ErrorRates::default()
    };
    let config = config_for(3, 20_000, 20_300)
        .inject_errors(true)
        .errors(errors)
        .build()
        .unwrap();
    let output = generate(&config);
    let distinct: FxHashSet<&UrValue> = output.records.iter().map(|r| &r.ur).collect();
    assert!(output.counters.dup_ur > 0);
    assert_eq!(output.records.len() - distinct.len(), output.counters.dup_ur);
}

#[test]
fn test_links_resolve_and_inherit_deletion() {
    let config = config_for(4, 30_000, 30_300)
        .rates(25.0, 15.0, 20.0)
        .both(true)
        .build()
        .unwrap();
    let output = generate(&config);
    let index = ur_index(&output.records);

    let mut links = 0;
    for record in &output.records {
        for value in [&record.alias, &record.merged].into_iter().flatten() {
            let targets = resolve(&output.records, &index, value);
            assert_eq!(targets.len(), 1, "link {value} of UR {} must resolve", record.ur);
            if targets[0].deleted {
                assert!(record.deleted, "UR {} links to a deleted record", record.ur);
            }
            links += 1;
        }
    }
    assert!(links > 0);
}

#[test]
fn test_no_alias_chains_by_default() {
    let config = config_for(5, 40_000, 40_300)
        .rates(30.0, 20.0, 5.0)
        .build()
        .unwrap();
    let output = generate(&config);
    let index = ur_index(&output.records);

    for record in output.records.iter().filter(|r| r.alias.is_some()) {
        let value = record.alias.as_ref().unwrap();
        for target in resolve(&output.records, &index, value) {
            assert!(!target.is_linked(), "alias {} points at a linked record", record.ur);
        }
    }
    for record in output.records.iter().filter(|r| r.merged.is_some()) {
        let value = record.merged.as_ref().unwrap();
        for target in resolve(&output.records, &index, value) {
            assert!(target.merged.is_none(), "merge {} points at a merged record", record.ur);
        }
    }
}

#[test]
fn test_branch_counters_cover_every_record() {
    for (seed, errors) in [(6, false), (7, true)] {
        let config = config_for(seed, 50_000, 50_400)
            .skip_ur(3)
            .rates(15.0, 10.0, 5.0)
            .both(true)
            .inject_errors(errors)
            .build()
            .unwrap();
        let output = generate(&config);
        assert_eq!(output.counters.records, output.records.len());
        assert_eq!(output.counters.branch_total(), output.records.len());
    }
}

#[test]
fn test_orphan_aliases_resolve_to_nothing() {
    let errors = ErrorRates {
        orphan_aliases: 100.0,
        ..ErrorRates::default()
    };
    let config = config_for(8, 60_000, 60_600)
        .skip_ur(4)
        .rates(20.0, 0.0, 2.0)
        .inject_errors(true)
        .errors(errors)
        .build()
        .unwrap();
    let output = generate(&config);
    let urs: FxHashSet<String> = output.records.iter().map(|r| r.ur.to_string()).collect();

    let aliases: Vec<&UrValue> = output.records.iter().filter_map(|r| r.alias.as_ref()).collect();
    assert!(!aliases.is_empty());
    for alias in &aliases {
        assert!(!urs.contains(&alias.to_string()), "orphan alias {alias} resolves");
    }
    assert_eq!(output.counters.orphan_alias, aliases.len());
}

#[test]
fn test_identifiers_carry_valid_check_digits() {
    let ihi = IhiConfig {
        percent_ihi: 100.0,
        ..IhiConfig::default()
    };
    let config = config_for(9, 70_000, 70_200)
        .include_ihi(true)
        .ihi(ihi)
        .build()
        .unwrap();
    let output = generate(&config);

    for record in &output.records {
        assert!(is_valid_medicare(&record.medicare_no), "medicare {}", record.medicare_no);
        let value = record.ihi.as_deref().unwrap();
        assert!(is_valid_luhn(value), "IHI {value}");
        assert!(value.starts_with("800360"));
    }
}

#[test]
fn test_same_seed_same_population() {
    let config = config_for(10, 80_000, 80_150)
        .rates(20.0, 10.0, 5.0)
        .inject_errors(true)
        .build()
        .unwrap();
    let first = generate(&config);
    let second = generate(&config);
    assert_eq!(first.records, second.records);
    assert_eq!(first.counters, second.counters);
}

#[test]
fn test_sink_sees_every_record_in_order() {
    let config = config_for(11, 90_000, 90_100).rates(20.0, 10.0, 5.0).build().unwrap();
    let reference = reference_data();
    let mut sink: Vec<PersonRecord> = Vec::new();
    let output = IdentityGraphBuilder::from_config(&config, &reference)
        .run_into(&mut sink)
        .unwrap();
    assert_eq!(sink, output.records);
}

#[test]
fn test_provenance_names_branch_and_source() {
    let config = config_for(12, 91_000, 91_200)
        .rates(30.0, 10.0, 5.0)
        .build()
        .unwrap();
    let output = generate(&config);
    let linked = output.records.iter().filter(|r| r.is_linked()).count();
    assert!(linked > 0);

    let aliases: Vec<_> = output
        .provenance
        .iter()
        .filter(|entry| entry.description.contains("Alias"))
        .collect();
    assert_eq!(aliases.len(), output.counters.aliases);
    for entry in aliases {
        let lines = entry.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("cloned ("));
    }
}

/// Every anomaly switched off, for tests that enable exactly one
fn no_errors() -> ErrorRates {
    ErrorRates {
        dup_ur: 0.0,
        pot_dup: 0.0,
        orphan_aliases: 0.0,
        orphan_merges: 0.0,
        undeleted_aliases: 0.0,
        undeleted_merges: 0.0,
        family_name_errors: 0.0,
        given_name_errors: 0.0,
        ..ErrorRates::default()
    }
}

#[test]
fn test_undeleted_aliases_stay_live() {
    let errors = ErrorRates {
        undeleted_aliases: 50.0,
        ..no_errors()
    };
    let config = config_for(13, 92_000, 92_500)
        .rates(30.0, 0.0, 25.0)
        .inject_errors(true)
        .errors(errors)
        .build()
        .unwrap();
    let output = generate(&config);
    let index = ur_index(&output.records);

    let mut to_deleted = 0;
    let mut live = 0;
    for record in output.records.iter().filter(|r| r.alias.is_some()) {
        let targets = resolve(&output.records, &index, record.alias.as_ref().unwrap());
        assert_eq!(targets.len(), 1);
        if targets[0].deleted {
            to_deleted += 1;
            if !record.deleted {
                live += 1;
            }
        }
    }
    let undeleted = output.counters.undeleted_alias;
    assert!(live > 0);
    assert!(live <= undeleted, "{live} live aliases of deleted records, {undeleted} undeleted");
    assert!(undeleted <= to_deleted);
    assert_eq!(output.counters.undeleted_merge, 0);
}

#[test]
fn test_alias_chains_when_enabled() {
    let config = config_for(14, 93_000, 93_300)
        .rates(40.0, 0.0, 0.0)
        .alias2alias(true)
        .build()
        .unwrap();
    let output = generate(&config);
    let index = ur_index(&output.records);

    let mut chained = 0;
    for record in output.records.iter().filter(|r| r.alias.is_some()) {
        let targets = resolve(&output.records, &index, record.alias.as_ref().unwrap());
        assert_eq!(targets.len(), 1, "alias of UR {} must resolve", record.ur);
        if targets[0].alias.is_some() {
            chained += 1;
        }
    }
    assert!(chained > 0);
}

#[test]
fn test_merge_chains_when_enabled() {
    let config = config_for(15, 94_000, 94_300)
        .rates(0.0, 40.0, 0.0)
        .merge2merge(true)
        .build()
        .unwrap();
    let output = generate(&config);
    let index = ur_index(&output.records);

    let mut chained = 0;
    for record in output.records.iter().filter(|r| r.merged.is_some()) {
        let targets = resolve(&output.records, &index, record.merged.as_ref().unwrap());
        assert_eq!(targets.len(), 1, "merge of UR {} must resolve", record.ur);
        if targets[0].merged.is_some() {
            chained += 1;
        }
    }
    assert!(chained > 0);
}

#[test]
fn test_both_merges_into_alias_target() {
    let config = config_for(16, 95_000, 95_300)
        .rates(60.0, 60.0, 0.0)
        .both(true)
        .build()
        .unwrap();
    let output = generate(&config);

    let both: Vec<&PersonRecord> = output
        .records
        .iter()
        .filter(|r| r.alias.is_some() && r.merged.is_some())
        .collect();
    assert!(!both.is_empty());
    assert_eq!(both.len(), output.counters.both);
    for record in both {
        assert_eq!(record.alias, record.merged, "UR {} links two targets", record.ur);
    }
}

#[test]
fn test_duplicate_classification_covers_every_clone() {
    let errors = ErrorRates {
        pot_dup: 30.0,
        ..no_errors()
    };
    let config = config_for(17, 96_000, 96_400)
        .rates(0.0, 0.0, 0.0)
        .inject_errors(true)
        .errors(errors)
        .build()
        .unwrap();
    let output = generate(&config);

    let distinct: FxHashSet<&UrValue> = output.records.iter().map(|r| &r.ur).collect();
    assert_eq!(distinct.len(), output.records.len());

    let mut seen = FxHashSet::default();
    let clones = output
        .records
        .iter()
        .filter(|r| !seen.insert(r.medicare_no.as_str()))
        .count();
    let counters = &output.counters;
    assert!(counters.potential_dup > 0);
    assert_eq!(clones, counters.potential_dup + counters.actual_dup);
    assert_eq!(counters.unlinked + clones, output.records.len());
}
