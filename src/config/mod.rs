//! Configuration for PMI generation
//!
//! A `GeneratorConfig` is normally read from a JSON file. Every field has a
//! default, so a file only needs to name what it changes. Out-of-range
//! percentages are clamped back to their defaults with a warning by
//! [`GeneratorConfig::normalized`]; structural problems are reported by
//! [`GeneratorConfig::validate`].

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::util::safe_open_file;
use crate::error::{PmiError, Result};

/// Default number of attempts for every bounded rejection-sampling loop
pub const DEFAULT_RETRY_BUDGET: usize = 500;

/// UR and PID numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrRange {
    /// First PID (sequential synthetic primary key)
    #[serde(rename = "startPID")]
    pub start_pid: u64,
    /// First UR
    #[serde(rename = "startUR")]
    pub start_ur: u64,
    /// UR values are generated while below this bound
    #[serde(rename = "endUR")]
    pub end_ur: u64,
    /// UR step, jittered by one either way when three or more
    #[serde(rename = "skipUR")]
    pub skip_ur: u64,
}

impl Default for UrRange {
    fn default() -> Self {
        Self {
            start_pid: 1,
            start_ur: 100_000,
            end_ur: 101_000,
            skip_ur: 1,
        }
    }
}

/// Age window for generated people, in years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgeRange {
    pub min_age: u32,
    pub max_age: u32,
}

impl Default for AgeRange {
    fn default() -> Self {
        Self {
            min_age: 0,
            max_age: 100,
        }
    }
}

/// Population profile percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub aliases: f64,
    pub merged: f64,
    pub deleted: f64,
    pub deceased: f64,
    /// Share of secondary PMI records cross-linked to the master PMI
    #[serde(rename = "hasAltUR")]
    pub has_alt_ur: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            aliases: 10.0,
            merged: 5.0,
            deleted: 2.0,
            deceased: 2.0,
            has_alt_ur: 66.6,
        }
    }
}

/// Sequential IHI allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IhiConfig {
    /// First IHI serial, reduced modulo 10^7
    #[serde(rename = "startIHI")]
    pub start_ihi: u64,
    #[serde(rename = "skipIHI")]
    pub skip_ihi: u64,
    /// Share of records that receive an IHI
    #[serde(rename = "percentIHI")]
    pub percent_ihi: f64,
    /// Share of secondary records whose AltIHI is corrupted
    #[serde(rename = "badAltIHI")]
    pub bad_alt_ihi: f64,
}

impl Default for IhiConfig {
    fn default() -> Self {
        Self {
            start_ihi: 0,
            skip_ihi: 1,
            percent_ihi: 10.0,
            bad_alt_ihi: 5.0,
        }
    }
}

/// Anomaly percentages, applied only when error injection is enabled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorRates {
    #[serde(rename = "dupUR")]
    pub dup_ur: f64,
    pub pot_dup: f64,
    pub orphan_aliases: f64,
    pub orphan_merges: f64,
    pub undeleted_aliases: f64,
    pub undeleted_merges: f64,
    pub family_name_errors: f64,
    pub given_name_errors: f64,
    #[serde(rename = "badAltUR")]
    pub bad_alt_ur: f64,
    #[serde(rename = "aliasAltUR")]
    pub alias_alt_ur: f64,
    #[serde(rename = "mergedAltUR")]
    pub merged_alt_ur: f64,
    #[serde(rename = "deletedAltUR")]
    pub deleted_alt_ur: f64,
}

impl Default for ErrorRates {
    fn default() -> Self {
        Self {
            dup_ur: 2.0,
            pot_dup: 7.0,
            orphan_aliases: 5.0,
            orphan_merges: 3.0,
            undeleted_aliases: 15.0,
            undeleted_merges: 25.0,
            family_name_errors: 2.0,
            given_name_errors: 2.0,
            bad_alt_ur: 10.0,
            alias_alt_ur: 2.0,
            merged_alt_ur: 3.0,
            deleted_alt_ur: 1.0,
        }
    }
}

/// Boolean switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flags {
    /// A record may be both an Alias and a Merge
    pub both: bool,
    /// Alias targets may themselves be Alias or Merge records
    pub alias2alias: bool,
    /// Merge targets may themselves be Alias or Merge records
    pub merge2merge: bool,
    /// Allocate IHI numbers sequentially and export the IHI column
    #[serde(rename = "includeIHI")]
    pub include_ihi: bool,
    /// Append two sequential letters to every generated name
    pub extend_names: bool,
    /// Enable anomaly injection
    pub inject_errors: bool,
    /// Fabricate addresses instead of sampling real ones
    pub synthetic_addresses: bool,
}

/// Complete generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub pmi: UrRange,
    pub age_range: AgeRange,
    pub profile: Profile,
    pub ihi: IhiConfig,
    pub errors: ErrorRates,
    pub flags: Flags,
    /// Demographic columns exported after the PMI link columns
    pub fields: Vec<String>,
    /// Longest value any exported column may hold
    pub max_field_length: Option<usize>,
    /// Date ages and death dates are computed against, today if unset
    pub reference_date: Option<NaiveDate>,
    /// Seed for reproducible runs, fresh entropy if unset
    pub random_seed: Option<u64>,
    /// Attempts allowed in each rejection-sampling loop
    pub retry_budget: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pmi: UrRange::default(),
            age_range: AgeRange::default(),
            profile: Profile::default(),
            ihi: IhiConfig::default(),
            errors: ErrorRates::default(),
            flags: Flags::default(),
            fields: default_fields(),
            max_field_length: None,
            reference_date: None,
            random_seed: None,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

/// Demographic columns exported when the configuration names none
#[must_use]
pub fn default_fields() -> Vec<String> {
    [
        "title",
        "familyName",
        "givenName",
        "birthdate",
        "sex",
        "streetNo",
        "streetName",
        "streetType",
        "suburb",
        "state",
        "postcode",
        "country",
        "mobile",
        "homePhone",
        "email",
        "medicareNo",
        "married",
        "deathDate",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Clamp a percentage to [0, 100], falling back to its default with a warning
fn clamp_percent(name: &str, value: f64, default: f64) -> f64 {
    if (0.0..=100.0).contains(&value) {
        value
    } else {
        log::warn!("{name} ({value}) is not a percentage, using the default {default}");
        default
    }
}

impl GeneratorConfig {
    /// Load a configuration from a JSON file, clamping its percentages
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "generator configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| PmiError::config(format!("{}: {e}", path.display())))?;
        Ok(config.normalized())
    }

    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }

    /// Reset out-of-range values to their defaults, logging each reset
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let profile = Profile::default();
        self.profile.aliases = clamp_percent("aliases", self.profile.aliases, profile.aliases);
        self.profile.merged = clamp_percent("merged", self.profile.merged, profile.merged);
        self.profile.deleted = clamp_percent("deleted", self.profile.deleted, profile.deleted);
        self.profile.deceased = clamp_percent("deceased", self.profile.deceased, profile.deceased);
        self.profile.has_alt_ur =
            clamp_percent("hasAltUR", self.profile.has_alt_ur, profile.has_alt_ur);

        let ihi = IhiConfig::default();
        self.ihi.percent_ihi = clamp_percent("percentIHI", self.ihi.percent_ihi, ihi.percent_ihi);
        self.ihi.bad_alt_ihi = clamp_percent("badAltIHI", self.ihi.bad_alt_ihi, ihi.bad_alt_ihi);
        self.ihi.start_ihi %= 10_000_000;
        if self.ihi.skip_ihi < 1 {
            self.ihi.skip_ihi = 1;
        }

        let errors = ErrorRates::default();
        let e = &mut self.errors;
        e.dup_ur = clamp_percent("dupUR", e.dup_ur, errors.dup_ur);
        e.pot_dup = clamp_percent("potDup", e.pot_dup, errors.pot_dup);
        e.orphan_aliases = clamp_percent("orphanAliases", e.orphan_aliases, errors.orphan_aliases);
        e.orphan_merges = clamp_percent("orphanMerges", e.orphan_merges, errors.orphan_merges);
        e.undeleted_aliases =
            clamp_percent("undeletedAliases", e.undeleted_aliases, errors.undeleted_aliases);
        e.undeleted_merges =
            clamp_percent("undeletedMerges", e.undeleted_merges, errors.undeleted_merges);
        e.family_name_errors =
            clamp_percent("familyNameErrors", e.family_name_errors, errors.family_name_errors);
        e.given_name_errors =
            clamp_percent("givenNameErrors", e.given_name_errors, errors.given_name_errors);
        e.bad_alt_ur = clamp_percent("badAltUR", e.bad_alt_ur, errors.bad_alt_ur);
        e.alias_alt_ur = clamp_percent("aliasAltUR", e.alias_alt_ur, errors.alias_alt_ur);
        e.merged_alt_ur = clamp_percent("mergedAltUR", e.merged_alt_ur, errors.merged_alt_ur);
        e.deleted_alt_ur = clamp_percent("deletedAltUR", e.deleted_alt_ur, errors.deleted_alt_ur);

        if self.pmi.skip_ur < 1 {
            log::warn!("skipUR ({}) is less than 1, using 1", self.pmi.skip_ur);
            self.pmi.skip_ur = 1;
        }
        self
    }

    /// Check the configuration for errors that cannot be clamped
    pub fn validate(&self) -> Result<()> {
        if self.pmi.end_ur <= self.pmi.start_ur {
            return Err(PmiError::config(format!(
                "empty UR range: startUR {} is not below endUR {}",
                self.pmi.start_ur, self.pmi.end_ur
            )));
        }
        if self.age_range.min_age > self.age_range.max_age {
            return Err(PmiError::config(format!(
                "minAge {} is greater than maxAge {}",
                self.age_range.min_age, self.age_range.max_age
            )));
        }
        if self.retry_budget == 0 {
            return Err(PmiError::config("retryBudget must be at least 1"));
        }
        if self.max_field_length == Some(0) {
            return Err(PmiError::config("maxFieldLength must be at least 1"));
        }
        Ok(())
    }

    /// Reference date, today when none is configured
    #[must_use]
    pub fn effective_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Whether anomaly injection is enabled
    #[must_use]
    pub const fn errors_enabled(&self) -> bool {
        self.flags.inject_errors
    }

    /// Upper bound on the number of UR slots the run will fill
    #[must_use]
    pub const fn slot_count(&self) -> u64 {
        let span = self.pmi.end_ur.saturating_sub(self.pmi.start_ur);
        let step = if self.pmi.skip_ur < 3 {
            self.pmi.skip_ur
        } else {
            self.pmi.skip_ur - 1
        };
        if step == 0 { span } else { span.div_ceil(step) }
    }
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PMI Generator Configuration:")?;
        writeln!(
            f,
            "  UR range: {}..{} step {} (first PID {})",
            self.pmi.start_ur, self.pmi.end_ur, self.pmi.skip_ur, self.pmi.start_pid
        )?;
        writeln!(
            f,
            "  Age range: {}..{} years",
            self.age_range.min_age, self.age_range.max_age
        )?;
        writeln!(
            f,
            "  Profile: aliases {}%, merged {}%, deleted {}%, deceased {}%",
            self.profile.aliases, self.profile.merged, self.profile.deleted, self.profile.deceased
        )?;
        writeln!(
            f,
            "  Flags: both {}, alias2alias {}, merge2merge {}, IHI {}, extendNames {}, synthetic addresses {}",
            self.flags.both,
            self.flags.alias2alias,
            self.flags.merge2merge,
            self.flags.include_ihi,
            self.flags.extend_names,
            self.flags.synthetic_addresses
        )?;
        if self.flags.include_ihi {
            writeln!(
                f,
                "  IHI: start {} step {} for {}% of records",
                self.ihi.start_ihi, self.ihi.skip_ihi, self.ihi.percent_ihi
            )?;
        }
        if self.flags.inject_errors {
            let e = &self.errors;
            writeln!(
                f,
                "  Errors: dupUR {}%, potDup {}%, orphan aliases {}%, orphan merges {}%",
                e.dup_ur, e.pot_dup, e.orphan_aliases, e.orphan_merges
            )?;
            writeln!(
                f,
                "          undeleted aliases {}%, undeleted merges {}%, family names {}%, given names {}%",
                e.undeleted_aliases, e.undeleted_merges, e.family_name_errors, e.given_name_errors
            )?;
        }
        writeln!(f, "  Fields: {}", self.fields.join(","))?;
        if let Some(limit) = self.max_field_length {
            writeln!(f, "  Max field length: {limit}")?;
        }
        if let Some(seed) = self.random_seed {
            writeln!(f, "  Random seed: {seed}")?;
        }
        Ok(())
    }
}

/// Builder for constructing a generator configuration
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Create a new builder with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    /// Set the UR range `[start, end)`
    #[must_use]
    pub const fn ur_range(mut self, start: u64, end: u64) -> Self {
        self.config.pmi.start_ur = start;
        self.config.pmi.end_ur = end;
        self
    }

    #[must_use]
    pub const fn skip_ur(mut self, skip: u64) -> Self {
        self.config.pmi.skip_ur = skip;
        self
    }

    #[must_use]
    pub const fn start_pid(mut self, pid: u64) -> Self {
        self.config.pmi.start_pid = pid;
        self
    }

    #[must_use]
    pub const fn age_range(mut self, min_age: u32, max_age: u32) -> Self {
        self.config.age_range = AgeRange { min_age, max_age };
        self
    }

    /// Set the alias, merge and delete percentages
    #[must_use]
    pub const fn rates(mut self, aliases: f64, merged: f64, deleted: f64) -> Self {
        self.config.profile.aliases = aliases;
        self.config.profile.merged = merged;
        self.config.profile.deleted = deleted;
        self
    }

    #[must_use]
    pub const fn deceased(mut self, percent: f64) -> Self {
        self.config.profile.deceased = percent;
        self
    }

    #[must_use]
    pub const fn has_alt_ur(mut self, percent: f64) -> Self {
        self.config.profile.has_alt_ur = percent;
        self
    }

    #[must_use]
    pub const fn both(mut self, enabled: bool) -> Self {
        self.config.flags.both = enabled;
        self
    }

    #[must_use]
    pub const fn alias2alias(mut self, enabled: bool) -> Self {
        self.config.flags.alias2alias = enabled;
        self
    }

    #[must_use]
    pub const fn merge2merge(mut self, enabled: bool) -> Self {
        self.config.flags.merge2merge = enabled;
        self
    }

    #[must_use]
    pub const fn include_ihi(mut self, enabled: bool) -> Self {
        self.config.flags.include_ihi = enabled;
        self
    }

    #[must_use]
    pub const fn extend_names(mut self, enabled: bool) -> Self {
        self.config.flags.extend_names = enabled;
        self
    }

    #[must_use]
    pub const fn inject_errors(mut self, enabled: bool) -> Self {
        self.config.flags.inject_errors = enabled;
        self
    }

    #[must_use]
    pub const fn synthetic_addresses(mut self, enabled: bool) -> Self {
        self.config.flags.synthetic_addresses = enabled;
        self
    }

    /// Replace all anomaly percentages
    #[must_use]
    pub fn errors(mut self, errors: ErrorRates) -> Self {
        self.config.errors = errors;
        self
    }

    #[must_use]
    pub fn ihi(mut self, ihi: IhiConfig) -> Self {
        self.config.ihi = ihi;
        self
    }

    #[must_use]
    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.config.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn max_field_length(mut self, limit: Option<usize>) -> Self {
        self.config.max_field_length = limit;
        self
    }

    #[must_use]
    pub const fn reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = Some(date);
        self
    }

    #[must_use]
    pub const fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn retry_budget(mut self, attempts: usize) -> Self {
        self.config.retry_budget = attempts;
        self
    }

    /// Normalize and validate the configuration
    pub fn build(self) -> Result<GeneratorConfig> {
        let config = self.config.normalized();
        config.validate()?;
        Ok(config)
    }
}
