//! A Rust library for synthesizing patient master index (PMI) populations
//! with controlled identity links and data-quality defects.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod reference;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use error::{PmiError, Result};
pub use models::{PersonRecord, UrValue};
pub use reference::ReferenceData;

// Generation
pub use algorithm::demographics::{DemographicFactory, UsedIdentifiers};
pub use algorithm::pmi::{IdentityGraphBuilder, PmiCounters, PmiOutput, ProvenanceEntry, RecordSink};
pub use algorithm::secondary::MasterIndex;

// Export
pub use export::{ColumnSelection, read_string_table, write_records};
