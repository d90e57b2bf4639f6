//! The exported column set
//!
//! Link columns always come first, in the order `PID, UR, Alias, Merged,
//! Deleted`, followed by `IHI` when IHIs are generated, `AltUR` (and
//! `AltIHI`) for a secondary PMI, then the configured demographic fields.

use crate::algorithm::pmi::RecordSink;
use crate::config::GeneratorConfig;
use crate::error::{PmiError, Result};
use crate::models::{ColumnField, PersonRecord};

const LINK_COLUMNS: [&str; 5] = ["PID", "UR", "Alias", "Merged", "Deleted"];

/// Ordered external column names of an output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<&'static str>,
}

impl ColumnSelection {
    /// Columns of a run, rejecting configured fields no record carries
    pub fn from_config(config: &GeneratorConfig, secondary: bool) -> Result<Self> {
        let known = PersonRecord::column_names();
        let mut columns: Vec<&'static str> = LINK_COLUMNS.to_vec();
        if config.flags.include_ihi {
            columns.push("IHI");
        }
        if secondary {
            columns.push("AltUR");
            if config.flags.include_ihi {
                columns.push("AltIHI");
            }
        }
        for field in &config.fields {
            let column = known
                .iter()
                .copied()
                .find(|name| *name == field.as_str())
                .ok_or_else(|| PmiError::config(format!("unknown output column '{field}'")))?;
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        Ok(Self { columns })
    }

    /// Every column a record carries
    #[must_use]
    pub fn all() -> Self {
        Self {
            columns: PersonRecord::column_names(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column text of one record, checked against the size limit
    pub fn row(&self, record: &PersonRecord, max_field_length: Option<usize>) -> Result<Vec<String>> {
        self.columns
            .iter()
            .map(|column| {
                let value = record.column_value(column).unwrap_or_default();
                if let Some(limit) = max_field_length {
                    let length = value.chars().count();
                    if length > limit {
                        return Err(PmiError::Serialization {
                            ur: record.ur.to_string(),
                            column: (*column).to_string(),
                            length,
                            limit,
                        });
                    }
                }
                Ok(value)
            })
            .collect()
    }

    /// Sink that fails on the first record with an oversized value
    #[must_use]
    pub const fn checker(&self, max_field_length: Option<usize>) -> RowCheck<'_> {
        RowCheck {
            selection: self,
            max_field_length,
            checked: 0,
        }
    }
}

/// Checks each generated record against the size limit
#[derive(Debug)]
pub struct RowCheck<'s> {
    selection: &'s ColumnSelection,
    max_field_length: Option<usize>,
    checked: usize,
}

impl RowCheck<'_> {
    #[must_use]
    pub const fn checked(&self) -> usize {
        self.checked
    }
}

impl RecordSink for RowCheck<'_> {
    fn accept(&mut self, record: &PersonRecord) -> Result<()> {
        self.selection.row(record, self.max_field_length)?;
        self.checked += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UrValue;
    use crate::utils::test_utils::test_config_builder;

    #[test]
    fn test_link_columns_lead() {
        let config = test_config_builder(1)
            .include_ihi(true)
            .fields(["familyName", "UR", "sex"])
            .build()
            .unwrap();
        let selection = ColumnSelection::from_config(&config, true).unwrap();
        assert_eq!(
            selection.columns(),
            &["PID", "UR", "Alias", "Merged", "Deleted", "IHI", "AltUR", "AltIHI", "familyName", "sex"]
        );

        let primary = ColumnSelection::from_config(&config, false).unwrap();
        assert!(!primary.columns().contains(&"AltUR"));
    }

    #[test]
    fn test_unknown_column_is_a_config_error() {
        let config = test_config_builder(2).fields(["favouriteColour"]).build().unwrap();
        let err = ColumnSelection::from_config(&config, false).unwrap_err();
        assert!(matches!(err, PmiError::Config(_)));
    }

    #[test]
    fn test_field_length_limit() {
        let config = test_config_builder(3).fields(["familyName"]).build().unwrap();
        let selection = ColumnSelection::from_config(&config, false).unwrap();
        let record = PersonRecord {
            ur: UrValue::Number(100_001),
            family_name: "WOLFESCHLEGELSTEINHAUSEN".to_string(),
            ..PersonRecord::default()
        };
        assert_eq!(selection.row(&record, Some(30)).unwrap()[5], "WOLFESCHLEGELSTEINHAUSEN");
        match selection.row(&record, Some(10)) {
            Err(PmiError::Serialization { ur, column, length, limit }) => {
                assert_eq!(ur, "100001");
                assert_eq!(column, "familyName");
                assert_eq!(length, 24);
                assert_eq!(limit, 10);
            }
            other => panic!("expected a serialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_checker_stops_at_oversized_record() {
        let config = test_config_builder(4).fields(["givenName"]).build().unwrap();
        let selection = ColumnSelection::from_config(&config, false).unwrap();
        let mut checker = selection.checker(Some(8));
        let short = PersonRecord {
            given_name: "ANN".to_string(),
            ..PersonRecord::default()
        };
        let long = PersonRecord {
            given_name: "MAXIMILIANA".to_string(),
            ..PersonRecord::default()
        };
        checker.accept(&short).unwrap();
        assert!(checker.accept(&long).is_err());
        assert_eq!(checker.checked(), 1);
    }
}
