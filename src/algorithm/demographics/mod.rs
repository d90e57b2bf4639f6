//! Synthetic person records
//!
//! The factory draws a distinct name combination, a birthdate within the
//! age window, an address, contact details, checksummed identifiers and
//! body measurements. Link fields (UR, Alias, Merged, Deleted, IHI) are
//! left for the identity graph builder.

pub mod anthropometrics;
pub mod identifiers;

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use rustc_hash::FxHashSet;

use crate::algorithm::address::{AddressMode, AddressSynthesizer};
use crate::config::GeneratorConfig;
use crate::error::{PmiError, Result};
use crate::models::{IndigenousStatus, MaritalStatus, PersonRecord, Sex, Title};
use crate::reference::ReferenceData;
use crate::utils::random::{chance, offset_days};

pub use anthropometrics::Measurements;
pub use identifiers::{IhiAllocator, UsedIdentifiers};

/// Share of generated people who are female
pub const FEMALE_PERCENT: f64 = 51.0;
/// Share of males recorded with unknown sex
pub const UNKNOWN_SEX_PERCENT: f64 = 2.0;
/// Share of people holding a DVA card
pub const DVA_PERCENT: f64 = 5.0;
/// Share of people with a Centrelink customer reference number
pub const CRN_PERCENT: f64 = 30.0;

const EMAIL_DOMAIN: &str = "his4ehr.com";
const MOBILE_PREFIX: &str = "0491570";
const MOBILE_SUFFIXES: &[&str] = &["156", "157", "158", "159", "110"];
const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Age in whole months at the reference date
#[must_use]
pub fn age_in_months(birthdate: NaiveDate, reference_date: NaiveDate) -> i64 {
    let mut months = i64::from(reference_date.year() - birthdate.year()) * 12
        + i64::from(reference_date.month()) - i64::from(birthdate.month());
    if reference_date.day() < birthdate.day() {
        months -= 1;
    }
    months
}

/// Home and business numbers in the fictitious ranges for the postcode's area
pub fn phone_numbers<R: Rng + ?Sized>(rng: &mut R, postcode: &str) -> (String, String) {
    let area = match postcode.chars().next() {
        Some('7') => '3',
        Some('2') => '2',
        Some('6') => '8',
        _ => '7',
    };
    (
        format!("0{area}5550{:04}", rng.random_range(0..10_000_u32)),
        format!("0{area}7010{:04}", rng.random_range(0..10_000_u32)),
    )
}

/// Indigenous status in population proportions
pub fn indigenous_status<R: Rng + ?Sized>(rng: &mut R) -> IndigenousStatus {
    let percent = rng.random::<f64>() * 100.0;
    if percent > 3.0 {
        IndigenousStatus::Neither
    } else if percent > 0.3 {
        IndigenousStatus::Aboriginal
    } else if percent > 0.12 {
        IndigenousStatus::TorresStraitIslander
    } else {
        IndigenousStatus::Both
    }
}

/// Marital status and title by sex and age
pub fn marital_status<R: Rng + ?Sized>(rng: &mut R, sex: Sex, age_months: i64) -> (MaritalStatus, Title) {
    let single_title = if sex == Sex::Female { Title::Ms } else { Title::Mr };
    if age_months <= 216 {
        return (MaritalStatus::Single, single_title);
    }
    let female = sex == Sex::Female;
    match rng.random_range(0..100_u32) {
        0..51 => (
            MaritalStatus::Married,
            if female { Title::Mrs } else { single_title },
        ),
        51..83 => (MaritalStatus::Single, single_title),
        83..93 => {
            let title = if female && rng.random_range(0..100_u32) < 51 {
                Title::Mrs
            } else {
                single_title
            };
            (MaritalStatus::Divorced, title)
        }
        _ => (
            MaritalStatus::Widowed,
            if female { Title::Mrs } else { single_title },
        ),
    }
}

/// Two sequential letters starting at a random place in the alphabet
pub fn name_extension<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let start = rng.random_range(0..25);
    &ALPHABET[start..start + 2]
}

/// Builds complete synthetic person records
#[derive(Debug)]
pub struct DemographicFactory<'a> {
    reference: &'a ReferenceData,
    addresses: AddressSynthesizer<'a>,
    min_age_days: i64,
    max_age_days: i64,
    reference_date: NaiveDate,
    extend_names: bool,
    retry_budget: usize,
    used_names: FxHashSet<String>,
}

impl<'a> DemographicFactory<'a> {
    #[must_use]
    pub fn new(reference: &'a ReferenceData, config: &GeneratorConfig) -> Self {
        let mode = if config.flags.synthetic_addresses {
            AddressMode::Synthetic
        } else {
            AddressMode::Sampled
        };
        Self {
            reference,
            addresses: AddressSynthesizer::new(reference, mode, config.retry_budget),
            min_age_days: i64::from(config.age_range.min_age) * 365,
            max_age_days: i64::from(config.age_range.max_age) * 365,
            reference_date: config.effective_reference_date(),
            extend_names: config.flags.extend_names,
            retry_budget: config.retry_budget,
            used_names: FxHashSet::default(),
        }
    }

    #[must_use]
    pub const fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    #[must_use]
    pub const fn addresses(&self) -> &AddressSynthesizer<'a> {
        &self.addresses
    }

    /// Mark a `given~family` combination as taken
    pub fn reserve_name(&mut self, name_key: String) -> bool {
        self.used_names.insert(name_key)
    }

    /// Number of name combinations handed out or reserved
    #[must_use]
    pub fn names_used(&self) -> usize {
        self.used_names.len()
    }

    /// Draw a sex and a given name not yet combined with a family name
    fn draw_name<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(Sex, String, String)> {
        for _ in 0..self.retry_budget {
            let sex = if chance(rng, FEMALE_PERCENT) {
                Sex::Female
            } else {
                Sex::Male
            };
            let given = self.reference.given_names(sex).select_name(rng).to_string();
            let family = self.reference.family_names.select_name(rng).to_string();
            if self.used_names.insert(format!("{given}~{family}")) {
                return Ok((sex, given, family));
            }
        }
        Err(PmiError::exhausted("name combination", self.retry_budget))
    }

    fn draw_birthdate<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDate {
        let age_days = if self.max_age_days > self.min_age_days {
            rng.random_range(self.min_age_days..=self.max_age_days)
        } else {
            self.min_age_days
        };
        offset_days(self.reference_date, -age_days)
    }

    /// Create one person
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        used: &mut UsedIdentifiers,
    ) -> Result<PersonRecord> {
        let (mut sex, mut given_name, mut family_name) = self.draw_name(rng)?;
        if self.extend_names {
            given_name.push_str(name_extension(rng));
            family_name.push_str(name_extension(rng));
        }
        if sex == Sex::Male && chance(rng, UNKNOWN_SEX_PERCENT) {
            sex = Sex::Unknown;
        }

        let birthdate = self.draw_birthdate(rng);
        let age_days = (self.reference_date - birthdate).num_days();
        let age_months = age_in_months(birthdate, self.reference_date);

        let address = self.addresses.generate(rng, None)?;
        let (home_phone, business_phone) = phone_numbers(rng, &address.postcode);
        let mobile = format!(
            "{MOBILE_PREFIX}{}",
            MOBILE_SUFFIXES.choose(rng).copied().unwrap_or("156")
        );
        let email = format!(
            "{}.{}@{EMAIL_DOMAIN}",
            given_name.to_lowercase(),
            family_name.to_lowercase()
        );

        let budget = self.retry_budget;
        let postcode = address.postcode.clone();
        let medicare_no = identifiers::draw_unique(rng, &mut used.medicare, budget, "Medicare number", |r| {
            identifiers::medicare_number(r, &postcode)
        })?;

        let (dva_no, dva_type) = if chance(rng, DVA_PERCENT) {
            let state = address.state.clone();
            let number = identifiers::draw_unique(rng, &mut used.dva, budget, "DVA number", |r| {
                identifiers::dva_number(r, &state)
            })?;
            (Some(number), Some(identifiers::dva_type(rng, age_days)))
        } else {
            (None, None)
        };

        let (mut crn_no, mut pen, mut sen, mut hc) = (None, None, None, None);
        if chance(rng, CRN_PERCENT) {
            let serial = identifiers::draw_unique(rng, &mut used.crn, budget, "CRN", identifiers::crn_serial)?;
            let crn = identifiers::crn_number(rng, serial);
            let percent = rng.random::<f64>() * 100.0;
            if age_months > 65 * 12 {
                if percent < 60.0 {
                    pen = Some(crn.clone());
                } else if percent < 90.0 {
                    sen = Some(crn.clone());
                }
            } else if percent < 65.0 {
                hc = Some(crn.clone());
            }
            crn_no = Some(crn);
        }

        let body = anthropometrics::sample(rng, sex, age_months as f64);
        let (married, title) = marital_status(rng, sex, age_months);
        let race = indigenous_status(rng);

        Ok(PersonRecord {
            title,
            family_name,
            given_name,
            birthdate,
            sex,
            address,
            mobile,
            home_phone,
            business_phone,
            email,
            medicare_no,
            dva_no,
            dva_type,
            crn_no,
            pen,
            sen,
            hc,
            height: body.height,
            weight: body.weight,
            waist: body.waist,
            hips: body.hips,
            married,
            race,
            ..PersonRecord::default()
        })
    }
}
