//! Diagnostic trail of records that took a non-trivial branch

use crate::models::{PersonRecord, UrValue};

use super::decision::RecordDecision;

/// The record a provenance entry was cloned from or linked to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceSource {
    pub summary: String,
    /// Field groups copied, when the record was cloned
    pub clone_info: Option<String>,
}

/// One notable record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceEntry {
    pub pid: u64,
    pub ur: UrValue,
    pub description: String,
    pub summary: String,
    pub source: Option<ProvenanceSource>,
}

impl ProvenanceEntry {
    /// The log lines for this entry, source first
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(source) = &self.source {
            match &source.clone_info {
                Some(info) => lines.push(format!("cloned ({info}),{}", source.summary)),
                None => lines.push(format!("linked,{}", source.summary)),
            }
        }
        lines.push(format!("{},{}", self.description, self.summary));
        lines
    }
}

/// Link and identity columns of a record as one comma separated line
#[must_use]
pub fn summarize(record: &PersonRecord) -> String {
    let optional = |value: &Option<UrValue>| value.as_ref().map(ToString::to_string).unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{},{}",
        record.pid,
        record.ur,
        optional(&record.alias),
        optional(&record.merged),
        if record.deleted { "D" } else { "" },
        record.family_name,
        record.given_name,
        record.birthdate,
        record.sex.code(),
    )
}

/// Collected provenance of one run
#[derive(Debug, Clone, Default)]
pub struct ProvenanceLog {
    entries: Vec<ProvenanceEntry>,
}

impl ProvenanceLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and keep the provenance of a finished record, if it is notable
    pub fn record(&mut self, decision: &RecordDecision, record: &PersonRecord, source: Option<&PersonRecord>) {
        if !decision.is_notable() {
            return;
        }
        let entry = ProvenanceEntry {
            pid: record.pid,
            ur: record.ur.clone(),
            description: decision.to_string(),
            summary: summarize(record),
            source: source.map(|source| ProvenanceSource {
                summary: summarize(source),
                clone_info: decision.clone_info.clone(),
            }),
        };
        for line in entry.lines() {
            log::info!("{line}");
        }
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[ProvenanceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ProvenanceEntry> {
        self.entries
    }
}
