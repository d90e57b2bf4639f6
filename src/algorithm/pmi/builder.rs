//! The identity graph builder
//!
//! Walks the UR range one slot at a time. Each slot gets a fresh person
//! from the demographic factory, which is then classified by the fixed
//! stage order: bootstrap, AltUR cross-link (secondary PMI only), Alias,
//! Merge, Deleted, the duplicate stage and finally name format errors.
//! Pools are updated as soon as a record is classified and the record is
//! never changed after it has been handed to the sink.

use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;

use crate::algorithm::demographics::{DemographicFactory, IhiAllocator, UsedIdentifiers};
use crate::algorithm::secondary::{AltLinker, MasterIndex};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::models::{PersonRecord, UrValue};
use crate::reference::ReferenceData;
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar};
use crate::utils::random::{chance, create_rng, offset_days};

use super::cursor::UrCursor;
use super::decision::{AltLink, Duplicate, Link, LinkKind, RecordDecision};
use super::mutation::Mutator;
use super::pools::Pools;
use super::provenance::ProvenanceLog;
use super::statistics::PmiCounters;
use super::{PmiOutput, RecordSink};

/// Records at the start of a run that are always unlinked
pub const BOOTSTRAP_RECORDS: usize = 10;

/// Where a record's identity was copied from
#[derive(Debug, Clone, Copy)]
enum Source {
    Record(usize),
    Master(usize),
}

/// Builds a synthetic PMI over the configured UR range
pub struct IdentityGraphBuilder<'a, R: Rng> {
    config: Arc<GeneratorConfig>,
    factory: DemographicFactory<'a>,
    mutator: Mutator<'a>,
    rng: R,
    used: UsedIdentifiers,
    ihi: IhiAllocator,
    linker: Option<AltLinker<'a>>,
    show_progress: bool,

    records: Vec<PersonRecord>,
    pools: Pools,
    cursor: UrCursor,
    pid: u64,
    duplicate_keys: FxHashSet<String>,
    counters: PmiCounters,
    provenance: ProvenanceLog,
}

impl<'a> IdentityGraphBuilder<'a, StdRng> {
    /// Builder with a random source seeded from the configuration
    #[must_use]
    pub fn from_config(config: &GeneratorConfig, reference: &'a ReferenceData) -> Self {
        Self::new(config, reference, create_rng(config.random_seed))
    }
}

impl<'a, R: Rng> IdentityGraphBuilder<'a, R> {
    /// Builder over a normalized copy of `config`
    ///
    /// Out-of-range percentages are reset to their defaults with a warning,
    /// however the configuration was produced.
    #[must_use]
    pub fn new(config: &GeneratorConfig, reference: &'a ReferenceData, rng: R) -> Self {
        let config = Arc::new(config.clone().normalized());
        let factory = DemographicFactory::new(reference, &config);
        let mutator = Mutator::new(reference, factory.reference_date(), config.flags.include_ihi);
        Self {
            factory,
            mutator,
            rng,
            used: UsedIdentifiers::new(),
            ihi: IhiAllocator::new(config.ihi.start_ihi, config.ihi.skip_ihi),
            linker: None,
            show_progress: false,
            records: Vec::new(),
            pools: Pools::new(),
            cursor: UrCursor::new(&config.pmi),
            pid: config.pmi.start_pid,
            duplicate_keys: FxHashSet::default(),
            counters: PmiCounters::new(),
            provenance: ProvenanceLog::new(),
            config,
        }
    }

    /// Treat these identifiers as already taken
    #[must_use]
    pub fn with_used_identifiers(mut self, used: UsedIdentifiers) -> Self {
        self.used.medicare.extend(used.medicare);
        self.used.ihi.extend(used.ihi);
        self.used.dva.extend(used.dva);
        self.used.crn.extend(used.crn);
        self
    }

    /// Generate a secondary PMI cross-linked to `master`
    ///
    /// Master identifiers and name combinations are reserved so unlinked
    /// records never coincide with a master record by accident.
    #[must_use]
    pub fn with_secondary(mut self, master: &'a MasterIndex) -> Self {
        master.register_identifiers(&mut self.used);
        for record in master.records() {
            self.factory.reserve_name(record.name_key());
        }
        self.linker = Some(AltLinker::new(master, &self.config));
        self
    }

    /// Show a progress bar while generating
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Generate every record
    pub fn run(self) -> Result<PmiOutput> {
        self.run_into(&mut ())
    }

    /// Generate every record, handing each one to `sink` as it is finished
    pub fn run_into<S: RecordSink + ?Sized>(mut self, sink: &mut S) -> Result<PmiOutput> {
        self.config.validate()?;
        log::info!(
            "Generating PMI records for UR {}..{} (step {})",
            self.config.pmi.start_ur,
            self.config.pmi.end_ur,
            self.config.pmi.skip_ur
        );
        let progress = self
            .show_progress
            .then(|| create_main_progress_bar(self.config.slot_count(), Some("Generating PMI")));

        while !self.cursor.is_done() {
            self.next_record(sink)?;
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &progress {
            finish_progress_bar(pb, Some("PMI generated"));
        }
        Ok(self.finish())
    }

    fn finish(self) -> PmiOutput {
        log::info!(
            "Generated {} records ({} aliases, {} merges, {} deleted)",
            self.counters.records,
            self.counters.aliases,
            self.counters.merges,
            self.counters.deleted
        );
        log::debug!(
            "{} identifiers and {} name combinations in use, {} spare UR values left",
            self.used.len(),
            self.factory.names_used(),
            self.pools.reserved_len()
        );
        PmiOutput {
            records: self.records,
            counters: self.counters,
            provenance: self.provenance.into_entries(),
        }
    }

    /// Create, classify and emit the record for the current slot
    fn next_record<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let slot = self.records.len();
        let mut record = self.factory.generate(&mut self.rng, &mut self.used)?;
        record.pid = self.pid;
        record.ur = UrValue::Number(self.cursor.current());
        self.assign_ihi(&mut record)?;
        self.assign_death(&mut record);
        if self.linker.is_some() && self.config.flags.include_ihi {
            record.alt_ihi.clone_from(&record.ihi);
        }

        let mut decision = RecordDecision::default();
        let source = if slot < BOOTSTRAP_RECORDS {
            decision.bootstrap = true;
            self.pools.add_bootstrap(slot);
            None
        } else if let Some(link) = self.cross_link(&mut record, &mut decision) {
            self.pools.add_active(slot);
            Some(Source::Master(link.master))
        } else {
            self.classify(slot, &mut record, &mut decision)?
        };

        sink.accept(&record)?;
        let source_record = match source {
            Some(Source::Record(index)) => self.records.get(index),
            Some(Source::Master(index)) => self
                .linker
                .as_ref()
                .and_then(|linker| linker.master().record(index)),
            None => None,
        };
        self.provenance.record(&decision, &record, source_record);
        self.counters.record(&decision);

        self.records.push(record);
        self.pid += 1;
        let skipped = self.cursor.advance(&mut self.rng);
        self.pools.reserve_all(skipped);
        Ok(())
    }

    fn assign_ihi(&mut self, record: &mut PersonRecord) -> Result<()> {
        if self.config.flags.include_ihi && chance(&mut self.rng, self.config.ihi.percent_ihi) {
            let ihi = self
                .ihi
                .allocate(&mut self.rng, &mut self.used.ihi, self.config.retry_budget)?;
            record.ihi = Some(ihi);
        }
        Ok(())
    }

    fn assign_death(&mut self, record: &mut PersonRecord) {
        if !chance(&mut self.rng, self.config.profile.deceased) {
            return;
        }
        let age_days = record.age_days(self.factory.reference_date());
        let lived = if age_days > 0 {
            self.rng.random_range(0..age_days)
        } else {
            0
        };
        record.death_date = Some(offset_days(record.birthdate, lived));
    }

    /// Link a secondary record to a master record, if the roll says so
    fn cross_link(&mut self, record: &mut PersonRecord, decision: &mut RecordDecision) -> Option<AltLink> {
        let linker = self.linker.as_mut()?;
        if !linker.should_link(&mut self.rng) {
            return None;
        }
        let (link, info) = linker.link(&mut self.rng, &self.mutator, record)?;
        decision.clone_info = Some(info);
        decision.alt_link = Some(link.clone());
        Some(link)
    }

    /// Run the Alias, Merge, Deleted, duplicate and name error stages
    fn classify(
        &mut self,
        slot: usize,
        record: &mut PersonRecord,
        decision: &mut RecordDecision,
    ) -> Result<Option<Source>> {
        let config = Arc::clone(&self.config);
        let profile = &config.profile;
        let flags = &config.flags;
        let errors = config.errors_enabled();
        let mut source = None;

        let mut alias_target = None;
        if chance(&mut self.rng, profile.aliases) {
            let target = if flags.alias2alias {
                Some(self.rng.random_range(0..slot))
            } else {
                self.pools.pick_target(&mut self.rng)
            };
            if let Some(target) = target {
                decision.clone_info = Some(self.mutator.clone_fields(&mut self.rng, &self.records[target], record));
                self.relocate_near(target, record)?;
                decision.alias_name_change = Some(self.mutator.alias_name_change(&mut self.rng, record));
                let link = self.resolve_link(LinkKind::Alias, target, record);
                record.alias = Some(link.value.clone());
                decision.alias = Some(link);
                alias_target = Some(target);
                source = Some(Source::Record(target));
            }
        }

        if (alias_target.is_none() || flags.both) && chance(&mut self.rng, profile.merged) {
            let target = match alias_target {
                Some(target) if flags.merge2merge || self.pools.is_target(target) => Some(target),
                Some(_) => self.pools.pick_target(&mut self.rng),
                None => {
                    let fresh = if flags.merge2merge {
                        Some(self.rng.random_range(0..slot))
                    } else {
                        self.pools.pick_target(&mut self.rng)
                    };
                    if let Some(target) = fresh {
                        decision.clone_info =
                            Some(self.mutator.clone_fields(&mut self.rng, &self.records[target], record));
                        self.relocate_near(target, record)?;
                        source = Some(Source::Record(target));
                    }
                    fresh
                }
            };
            if let Some(target) = target {
                let link = self.resolve_link(LinkKind::Merge, target, record);
                record.merged = Some(link.value.clone());
                decision.merge = Some(link);
            }
        }

        let linked = decision.is_linked();
        if chance(&mut self.rng, profile.deleted) {
            record.deleted = true;
            decision.deleted = true;
            if !linked {
                self.pools.add_target(slot);
            }
        } else if !linked {
            source = self.duplicate_stage(slot, record, decision, errors);
        }

        if errors && !linked && !record.deleted && decision.duplicate.is_none() {
            let rates = &config.errors;
            if chance(&mut self.rng, rates.family_name_errors) {
                self.mutator.family_name_error(&mut self.rng, record);
                decision.family_name_error = true;
            }
            if chance(&mut self.rng, rates.given_name_errors) {
                self.mutator.given_name_error(&mut self.rng, record);
                decision.given_name_error = true;
            }
        }
        Ok(source)
    }

    /// A link that did not keep its source's address moves within the
    /// source's SA3 region
    fn relocate_near(&mut self, source: usize, record: &mut PersonRecord) -> Result<()> {
        let nearby = &self.records[source].address;
        if record.address != *nearby {
            record.address = self
                .factory
                .addresses()
                .generate(&mut self.rng, Some(&nearby.sa1))?;
        }
        Ok(())
    }

    /// Resolve the value of a link to `target`, injecting orphan and
    /// undeleted anomalies and propagating deletion
    fn resolve_link(&mut self, kind: LinkKind, target: usize, record: &mut PersonRecord) -> Link {
        let config = Arc::clone(&self.config);
        let rates = &config.errors;
        let errors = config.errors_enabled();
        let (orphan_rate, undeleted_rate) = match kind {
            LinkKind::Alias => (rates.orphan_aliases, rates.undeleted_aliases),
            LinkKind::Merge => (rates.orphan_merges, rates.undeleted_merges),
        };
        let target_record = &self.records[target];
        let mut link = Link {
            kind,
            target,
            value: target_record.ur.clone(),
            orphaned: false,
            undeleted: false,
            inherited_delete: false,
        };

        if errors && chance(&mut self.rng, orphan_rate) {
            link.orphaned = true;
            link.value = self
                .pools
                .take_reserved(&mut self.rng)
                .map_or_else(|| target_record.ur.invalidated(), UrValue::Number);
        } else if target_record.deleted {
            if errors && chance(&mut self.rng, undeleted_rate) {
                link.undeleted = true;
            } else {
                link.inherited_delete = !record.deleted;
                record.deleted = true;
            }
        }
        link
    }

    /// Make an unlinked, undeleted record a duplicate of an active record,
    /// or enter it into the pools as a fresh identity
    fn duplicate_stage(
        &mut self,
        slot: usize,
        record: &mut PersonRecord,
        decision: &mut RecordDecision,
        errors: bool,
    ) -> Option<Source> {
        let config = Arc::clone(&self.config);
        let rates = &config.errors;
        if errors && chance(&mut self.rng, rates.dup_ur) {
            if let Some(source) = self.pools.pick_active(&mut self.rng) {
                self.pools.reserve(self.cursor.current());
                record.ur = self.records[source].ur.clone();
                decision.duplicate = Some(Duplicate::SameUr { source });
                return Some(Source::Record(source));
            }
        } else if errors && chance(&mut self.rng, rates.pot_dup) {
            if let Some(source) = self.pools.pick_active(&mut self.rng) {
                let original = &self.records[source];
                decision.clone_info = Some(self.mutator.clone_fields(&mut self.rng, original, record));
                let changes = self.mutator.potential_duplicate(&mut self.rng, original, record);
                let first_of_kind = self.duplicate_keys.insert(record.identity_key());
                decision.duplicate = Some(if changes.is_empty() || !first_of_kind {
                    Duplicate::Actual { source, changes }
                } else {
                    Duplicate::Potential { source, changes }
                });
                return Some(Source::Record(source));
            }
        }
        self.pools.add_active(slot);
        None
    }
}
