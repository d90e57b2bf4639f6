//! Column reflection for exported records
//!
//! Records are written and read by external column name so the exported
//! column set can be chosen by configuration, and master files produced by
//! an earlier run can be read back into records.

use chrono::NaiveDate;

use crate::models::types::{DvaType, IndigenousStatus, MaritalStatus, Sex, Title, UrValue};

/// Date format used for every date column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value that has a text representation in an exported column
pub trait ColumnValue: Sized {
    /// Render the value as column text
    fn to_column(&self) -> String;

    /// Parse column text, `None` when the text is not a valid value
    fn from_column(value: &str) -> Option<Self>;
}

/// A record whose fields are addressable by external column name
///
/// Implemented with `#[derive(ColumnField)]`.
pub trait ColumnField {
    /// External names of every column, in export order
    fn column_names() -> Vec<&'static str>;

    /// Text of the named column, `None` if the record has no such column
    fn column_value(&self, column: &str) -> Option<String>;

    /// Set the named column from text
    ///
    /// Returns `Ok(false)` if the record has no such column and an error
    /// message if the text does not parse.
    fn set_column(&mut self, column: &str, value: &str) -> Result<bool, String>;
}

impl ColumnValue for String {
    fn to_column(&self) -> String {
        self.clone()
    }

    fn from_column(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl ColumnValue for u64 {
    fn to_column(&self) -> String {
        self.to_string()
    }

    fn from_column(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

impl ColumnValue for f64 {
    fn to_column(&self) -> String {
        format!("{self}")
    }

    fn from_column(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

impl ColumnValue for NaiveDate {
    fn to_column(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }

    fn from_column(value: &str) -> Option<Self> {
        let value = value.trim();
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
            .ok()
    }
}

impl ColumnValue for UrValue {
    fn to_column(&self) -> String {
        self.to_string()
    }

    fn from_column(value: &str) -> Option<Self> {
        let value = value.trim();
        Some(
            value
                .parse()
                .map_or_else(|_| Self::Invalid(value.to_string()), Self::Number),
        )
    }
}

macro_rules! coded_column_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ColumnValue for $ty {
                fn to_column(&self) -> String {
                    self.code().to_string()
                }

                fn from_column(value: &str) -> Option<Self> {
                    Self::from_code(value)
                }
            }
        )*
    };
}

coded_column_value!(Sex, MaritalStatus, Title, DvaType, IndigenousStatus);

impl<T: ColumnValue> ColumnValue for Option<T> {
    fn to_column(&self) -> String {
        self.as_ref().map(ColumnValue::to_column).unwrap_or_default()
    }

    fn from_column(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            Some(None)
        } else {
            T::from_column(value).map(Some)
        }
    }
}
