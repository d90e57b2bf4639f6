//! One row of the synthetic PMI

use chrono::NaiveDate;
use macros::ColumnField;
use serde::{Deserialize, Serialize};

use crate::models::address::Address;
use crate::models::types::{DvaType, IndigenousStatus, MaritalStatus, Sex, Title, UrValue};

/// A synthetic person together with its PMI link fields
///
/// The link fields (`UR` through `AltIHI`) are assigned by the identity
/// graph builder; everything else comes from the demographic factory or
/// is cloned from another record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ColumnField)]
pub struct PersonRecord {
    #[column(name = "PID")]
    pub pid: u64,
    #[column(name = "UR")]
    pub ur: UrValue,
    #[column(name = "Alias")]
    pub alias: Option<UrValue>,
    #[column(name = "Merged")]
    pub merged: Option<UrValue>,
    #[column(name = "Deleted", marker = "D")]
    pub deleted: bool,
    #[column(name = "AltUR")]
    pub alt_ur: Option<UrValue>,
    #[column(name = "IHI")]
    pub ihi: Option<String>,
    #[column(name = "AltIHI")]
    pub alt_ihi: Option<String>,

    pub title: Title,
    pub family_name: String,
    pub given_name: String,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    #[column(flatten)]
    pub address: Address,
    pub mobile: String,
    pub home_phone: String,
    pub business_phone: String,
    pub email: String,

    pub medicare_no: String,
    pub dva_no: Option<String>,
    pub dva_type: Option<DvaType>,
    pub crn_no: Option<String>,
    #[column(name = "PEN")]
    pub pen: Option<String>,
    #[column(name = "SEN")]
    pub sen: Option<String>,
    #[column(name = "HC")]
    pub hc: Option<String>,

    pub height: f64,
    pub weight: f64,
    pub waist: f64,
    pub hips: f64,
    pub married: MaritalStatus,
    pub race: IndigenousStatus,
    pub death_date: Option<NaiveDate>,
}

impl PersonRecord {
    /// Key used to keep generated name combinations distinct
    #[must_use]
    pub fn name_key(&self) -> String {
        format!("{}~{}", self.given_name, self.family_name)
    }

    /// Key under which two records count as the same person
    #[must_use]
    pub fn identity_key(&self) -> String {
        format!(
            "{}~{}~{}~{}",
            self.family_name,
            self.given_name,
            self.sex.code(),
            self.birthdate
        )
    }

    /// Age in whole days at the reference date
    #[must_use]
    pub fn age_days(&self, reference_date: NaiveDate) -> i64 {
        (reference_date - self.birthdate).num_days()
    }

    /// Whether this record links to another record
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.alias.is_some() || self.merged.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns::ColumnField;

    #[test]
    fn test_column_names_follow_export_order() {
        let names = PersonRecord::column_names();
        assert_eq!(&names[..8], &["PID", "UR", "Alias", "Merged", "Deleted", "AltUR", "IHI", "AltIHI"]);
        let street = names.iter().position(|n| *n == "streetNo").unwrap();
        let sex = names.iter().position(|n| *n == "sex").unwrap();
        assert_eq!(street, sex + 1);
        for column in ["shortStreetType", "sa1", "crnNo", "PEN", "SEN", "HC", "deathDate", "race"] {
            assert!(names.contains(&column), "missing column {column}");
        }
    }

    #[test]
    fn test_marker_and_link_columns() {
        let mut record = PersonRecord {
            ur: UrValue::Number(100_200),
            deleted: true,
            ..Default::default()
        };
        assert_eq!(record.column_value("Deleted").as_deref(), Some("D"));
        assert_eq!(record.column_value("Alias").as_deref(), Some(""));
        assert_eq!(record.column_value("UR").as_deref(), Some("100200"));

        assert_eq!(record.set_column("Deleted", ""), Ok(true));
        assert!(!record.deleted);
        assert_eq!(record.set_column("Merged", "100007X"), Ok(true));
        assert_eq!(record.merged, Some(UrValue::Invalid("100007X".to_string())));
    }

    #[test]
    fn test_nested_address_columns() {
        let mut record = PersonRecord::default();
        assert_eq!(record.set_column("postcode", "2600"), Ok(true));
        assert_eq!(record.address.postcode, "2600");
        assert_eq!(record.column_value("postcode").as_deref(), Some("2600"));
        assert_eq!(record.set_column("nonsense", "x"), Ok(false));
        assert_eq!(record.column_value("nonsense"), None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut record = PersonRecord::default();
        assert!(record.set_column("birthdate", "not a date").is_err());
        assert!(record.set_column("sex", "Q").is_err());
        assert_eq!(record.set_column("sex", "F"), Ok(true));
        assert_eq!(record.sex, Sex::Female);
    }
}
