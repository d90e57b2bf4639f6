//! Per-branch counters and the run summary

use serde::Serialize;

use super::decision::{AltUrError, Branch, LinkKind, RecordDecision};

/// Counters for every branch and anomaly of one run
///
/// Each record is counted under exactly one branch, so
/// [`PmiCounters::branch_total`] always equals `records`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmiCounters {
    pub records: usize,
    pub aliases: usize,
    pub merges: usize,
    /// Records that are both an Alias and a Merge
    pub both: usize,
    /// Records deleted by the deletion stage
    pub deleted: usize,
    pub deleted_alias: usize,
    pub deleted_merge: usize,
    pub deleted_both: usize,
    /// Deleted records that are neither an Alias nor a Merge
    pub deleted_only: usize,
    /// Records deleted because their link target is deleted
    pub inherited_deleted: usize,
    pub orphan_alias: usize,
    pub orphan_merge: usize,
    pub undeleted_alias: usize,
    pub undeleted_merge: usize,
    pub dup_ur: usize,
    pub potential_dup: usize,
    pub actual_dup: usize,
    pub family_name_errors: usize,
    pub given_name_errors: usize,
    pub unlinked: usize,
    pub alt_linked: usize,
    pub bad_alt_ur: usize,
    pub alias_alt_ur: usize,
    pub merged_alt_ur: usize,
    pub deleted_alt_ur: usize,
    pub bad_alt_ihi: usize,
}

impl PmiCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished record
    pub fn record(&mut self, decision: &RecordDecision) {
        self.records += 1;

        if let Some(alt) = &decision.alt_link {
            self.alt_linked += 1;
            match alt.error {
                Some(AltUrError::Bad) => self.bad_alt_ur += 1,
                Some(AltUrError::Alias) => self.alias_alt_ur += 1,
                Some(AltUrError::Merged) => self.merged_alt_ur += 1,
                Some(AltUrError::Deleted) => self.deleted_alt_ur += 1,
                None => {}
            }
            if alt.bad_ihi {
                self.bad_alt_ihi += 1;
            }
            return;
        }

        for link in [&decision.alias, &decision.merge].into_iter().flatten() {
            let alias = link.kind == LinkKind::Alias;
            if alias {
                self.aliases += 1;
            } else {
                self.merges += 1;
            }
            if link.orphaned {
                if alias {
                    self.orphan_alias += 1;
                } else {
                    self.orphan_merge += 1;
                }
            }
            if link.undeleted {
                if alias {
                    self.undeleted_alias += 1;
                } else {
                    self.undeleted_merge += 1;
                }
            }
            if link.inherited_delete {
                self.inherited_deleted += 1;
            }
        }

        let branch = decision.branch();
        if decision.deleted {
            self.deleted += 1;
            match branch {
                Branch::AliasAndMerge => self.deleted_both += 1,
                Branch::Alias => self.deleted_alias += 1,
                Branch::Merge => self.deleted_merge += 1,
                _ => self.deleted_only += 1,
            }
        }
        match branch {
            Branch::AliasAndMerge => self.both += 1,
            Branch::Unlinked => self.unlinked += 1,
            Branch::DuplicateUr => self.dup_ur += 1,
            Branch::PotentialDuplicate => self.potential_dup += 1,
            Branch::ActualDuplicate => self.actual_dup += 1,
            Branch::Alias | Branch::Merge | Branch::DeletedOnly | Branch::AltLinked => {}
        }

        if decision.family_name_error {
            self.family_name_errors += 1;
        }
        if decision.given_name_error {
            self.given_name_errors += 1;
        }
    }

    /// Records accounted for by the branch counters
    #[must_use]
    pub const fn branch_total(&self) -> usize {
        self.aliases + self.merges - self.both
            + self.deleted_only
            + self.dup_ur
            + self.potential_dup
            + self.actual_dup
            + self.unlinked
            + self.alt_linked
    }

    /// Records carrying a duplicate of some other record
    #[must_use]
    pub const fn duplicates(&self) -> usize {
        self.dup_ur + self.potential_dup + self.actual_dup
    }

    /// Render the end-of-run report
    #[must_use]
    pub fn summary(&self, errors: bool, both: bool) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("{}\tPMI records created\n", self.records));
        summary.push_str(&format!("{}\t\talias records\n", self.aliases));
        summary.push_str(&format!("{}\t\tmerged records\n", self.merges));
        if both {
            summary.push_str(&format!(
                "\t\tof which {} were both alias and merged records\n",
                self.both
            ));
        }
        summary.push_str(&format!("{}\t\tdeleted records\n", self.deleted));
        summary.push_str(&format!("\t\tof which {} were alias records\n", self.deleted_alias));
        summary.push_str(&format!("\t\tand {} were merged records\n", self.deleted_merge));
        if both {
            summary.push_str(&format!(
                "\t\t\tand {} were both alias and merged records\n",
                self.deleted_both
            ));
        }
        summary.push_str(&format!(
            "{}\t\tlinked records inherited a deletion\n",
            self.inherited_deleted
        ));
        summary.push_str(&format!("{}\t\tunlinked records\n", self.unlinked));
        if self.alt_linked > 0 {
            summary.push_str(&format!("{}\t\trecords linked by AltUR\n", self.alt_linked));
        }

        if errors {
            summary.push_str("\nIntroduced errors\n");
            summary.push_str(&format!("{}\trecords given a duplicate UR\n", self.dup_ur));
            summary.push_str(&format!(
                "{}\trecords are duplicate records (different UR)\n",
                self.actual_dup
            ));
            summary.push_str(&format!(
                "{}\trecords are potential duplicates (different UR)\n",
                self.potential_dup
            ));
            summary.push_str(&format!("{}\torphaned alias records\n", self.orphan_alias));
            summary.push_str(&format!("{}\torphaned merged records\n", self.orphan_merge));
            summary.push_str(&format!(
                "{}\tundeleted alias of deleted records\n",
                self.undeleted_alias
            ));
            summary.push_str(&format!(
                "{}\tundeleted merges of deleted records\n",
                self.undeleted_merge
            ));
            summary.push('\n');
            summary.push_str(&format!("{}\tnon-standard given names\n", self.given_name_errors));
            summary.push_str(&format!("{}\tnon-standard family names\n", self.family_name_errors));
            if self.alt_linked > 0 {
                summary.push('\n');
                summary.push_str(&format!("{}\tbad AltUR values\n", self.bad_alt_ur));
                summary.push_str(&format!("{}\tAltUR values of an alias\n", self.alias_alt_ur));
                summary.push_str(&format!("{}\tAltUR values of a merged record\n", self.merged_alt_ur));
                summary.push_str(&format!("{}\tAltUR values of a deleted record\n", self.deleted_alt_ur));
                summary.push_str(&format!("{}\tbad AltIHI values\n", self.bad_alt_ihi));
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::pmi::decision::{AltLink, Changes, Duplicate, Link};
    use crate::models::UrValue;

    fn link(kind: LinkKind) -> Link {
        Link {
            kind,
            target: 0,
            value: UrValue::Number(1000),
            orphaned: false,
            undeleted: false,
            inherited_delete: false,
        }
    }

    #[test]
    fn test_every_branch_is_counted_once() {
        let decisions = vec![
            RecordDecision {
                bootstrap: true,
                ..RecordDecision::default()
            },
            RecordDecision {
                alias: Some(link(LinkKind::Alias)),
                merge: Some(link(LinkKind::Merge)),
                deleted: true,
                ..RecordDecision::default()
            },
            RecordDecision {
                merge: Some(Link {
                    orphaned: true,
                    ..link(LinkKind::Merge)
                }),
                ..RecordDecision::default()
            },
            RecordDecision {
                deleted: true,
                ..RecordDecision::default()
            },
            RecordDecision {
                duplicate: Some(Duplicate::SameUr { source: 0 }),
                ..RecordDecision::default()
            },
            RecordDecision {
                duplicate: Some(Duplicate::Actual {
                    source: 0,
                    changes: Changes::new(),
                }),
                given_name_error: true,
                ..RecordDecision::default()
            },
            RecordDecision {
                alt_link: Some(AltLink {
                    master: 3,
                    error: Some(AltUrError::Merged),
                    fell_back: false,
                    bad_ihi: true,
                }),
                ..RecordDecision::default()
            },
        ];
        let mut counters = PmiCounters::new();
        for decision in &decisions {
            counters.record(decision);
        }
        assert_eq!(counters.records, 7);
        assert_eq!(counters.branch_total(), counters.records);
        assert_eq!(counters.both, 1);
        assert_eq!(counters.deleted, 2);
        assert_eq!(counters.deleted_both, 1);
        assert_eq!(counters.deleted_only, 1);
        assert_eq!(counters.merges, 2);
        assert_eq!(counters.orphan_merge, 1);
        assert_eq!(counters.duplicates(), 2);
        assert_eq!(counters.given_name_errors, 1);
        assert_eq!(counters.merged_alt_ur, 1);
        assert_eq!(counters.bad_alt_ihi, 1);
    }

    #[test]
    fn test_summary_sections() {
        let counters = PmiCounters {
            records: 12,
            aliases: 2,
            ..PmiCounters::default()
        };
        let plain = counters.summary(false, false);
        assert!(plain.starts_with("12\tPMI records created\n"));
        assert!(!plain.contains("Introduced errors"));
        assert!(!plain.contains("both alias"));

        let full = counters.summary(true, true);
        assert!(full.contains("Introduced errors"));
        assert!(full.contains("of which 0 were both alias and merged records"));
        assert!(!full.contains("AltUR"));
    }
}
