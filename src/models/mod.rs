//! Record types for the synthetic patient master index
//!
//! `PersonRecord` is one row of the PMI. Every exported field is reachable
//! by its external column name through the `ColumnField` trait, which is
//! derived with `#[derive(ColumnField)]`.

pub mod address;
pub mod columns;
pub mod person;
pub mod types;

pub use address::Address;
pub use columns::{ColumnField, ColumnValue};
pub use person::PersonRecord;
pub use types::{DvaType, IndigenousStatus, MaritalStatus, Sex, Title, UrValue};
