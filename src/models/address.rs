//! Postal address of a person record

use macros::ColumnField;
use serde::{Deserialize, Serialize};

/// Address columns, in export order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ColumnField)]
pub struct Address {
    pub street_no: String,
    pub street_name: String,
    pub street_type: String,
    pub short_street_type: String,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub longitude: String,
    pub latitude: String,
    pub meshblock: String,
    pub sa1: String,
}
