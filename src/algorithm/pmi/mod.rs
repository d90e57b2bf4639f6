//! Identity graph synthesis
//!
//! The builder assigns UR numbers in order and decides for every record
//! whether it is an Alias or Merge of an earlier record, deleted, a
//! duplicate or a plain registration. Decisions are counted per branch and
//! the notable ones are kept as provenance.

pub mod builder;
pub mod cursor;
pub mod decision;
pub mod mutation;
pub mod pools;
pub mod provenance;
pub mod statistics;

use crate::error::Result;
use crate::models::PersonRecord;

pub use builder::{BOOTSTRAP_RECORDS, IdentityGraphBuilder};
pub use decision::{Branch, RecordDecision};
pub use provenance::ProvenanceEntry;
pub use statistics::PmiCounters;

/// Receives each record once it is final
pub trait RecordSink {
    fn accept(&mut self, record: &PersonRecord) -> Result<()>;
}

/// Discards records
impl RecordSink for () {
    fn accept(&mut self, _record: &PersonRecord) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<PersonRecord> {
    fn accept(&mut self, record: &PersonRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct PmiOutput {
    pub records: Vec<PersonRecord>,
    pub counters: PmiCounters,
    pub provenance: Vec<ProvenanceEntry>,
}

impl PmiOutput {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
