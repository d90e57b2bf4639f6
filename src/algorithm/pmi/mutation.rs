//! Field copying and corruption applied to linked and duplicate records
//!
//! Every rule draws replacement names from the reference tables, so a
//! corrupted record still carries individually plausible values.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::algorithm::demographics::anthropometrics::{self, Measurements};
use crate::models::{MaritalStatus, PersonRecord, Sex};
use crate::reference::ReferenceData;
use crate::utils::random::offset_days;

use super::decision::Changes;

/// Chance a cloned birthdate drifts at all
const BIRTHDATE_DRIFT: f64 = 0.2;
/// Chance a cloned address is kept
const KEEP_ADDRESS: f64 = 0.8;
/// Chance cloned contact details are kept
const KEEP_CONTACTS: f64 = 0.8;
/// Age below which a given-name error marks the record as a twin
const INFANT_DAYS: i64 = 60;

/// Markers that start a bracketed previous family name
const PREVIOUS_NAME: &[&str] = &[" (", " ["];
/// Markers that start a nickname in a given name
const NICKNAME: &[&str] = &[" (", " *"];

/// The part of `name` before the first of `markers`
fn strip_at<'n>(name: &'n str, markers: &[&str]) -> &'n str {
    markers
        .iter()
        .filter_map(|marker| name.find(marker))
        .min()
        .map_or(name, |end| &name[..end])
}

fn has_marker(name: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| name.contains(marker))
}

/// Offset by -2..=2 units of `unit_days`
fn drift<R: Rng + ?Sized>(rng: &mut R, unit_days: i64) -> i64 {
    (rng.random_range(0..5_i64) - 2) * unit_days
}

/// Applies clone and corruption rules against one reference dataset
#[derive(Debug, Clone, Copy)]
pub struct Mutator<'a> {
    reference: &'a ReferenceData,
    reference_date: NaiveDate,
    include_ihi: bool,
}

impl<'a> Mutator<'a> {
    #[must_use]
    pub const fn new(reference: &'a ReferenceData, reference_date: NaiveDate, include_ihi: bool) -> Self {
        Self {
            reference,
            reference_date,
            include_ihi,
        }
    }

    fn family_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.reference.family_names.select_name(rng).to_string()
    }

    fn given_name<R: Rng + ?Sized>(&self, rng: &mut R, sex: Sex) -> String {
        self.reference.given_names(sex).select_name(rng).to_string()
    }

    /// A birthdate near `birthdate`, never on or after the reference date
    ///
    /// Year, month and day drift independently. Returns the original date
    /// when no drift is applied or the drifted date is not in the past.
    pub fn drift_birthdate<R: Rng + ?Sized>(&self, rng: &mut R, birthdate: NaiveDate) -> NaiveDate {
        if rng.random::<f64>() >= BIRTHDATE_DRIFT {
            return birthdate;
        }
        let mut days = 0;
        if rng.random::<f64>() < 0.4 {
            days += drift(rng, 365);
        }
        if rng.random::<f64>() < 0.3 {
            days += drift(rng, 31);
        }
        if rng.random::<f64>() < 0.3 {
            days += drift(rng, 1);
        }
        let drifted = offset_days(birthdate, days);
        if drifted < self.reference_date {
            drifted
        } else {
            birthdate
        }
    }

    /// Copy the identity of `source` onto `record`
    ///
    /// Names, sex, identifiers, marital status and race are always copied;
    /// the birthdate may drift and the address and contact details are
    /// each kept with a fixed probability. Body measurements are taken
    /// again. Returns the field groups copied unchanged, e.g.
    /// `name,bd,sex,addr,ph`.
    pub fn clone_fields<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        source: &PersonRecord,
        record: &mut PersonRecord,
    ) -> String {
        let mut info = vec!["name"];
        record.family_name.clone_from(&source.family_name);
        record.given_name.clone_from(&source.given_name);

        record.birthdate = self.drift_birthdate(rng, source.birthdate);
        if record.birthdate == source.birthdate {
            info.push("bd");
        }
        record.sex = source.sex;
        info.push("sex");

        if rng.random::<f64>() < KEEP_ADDRESS {
            record.address.clone_from(&source.address);
            info.push("addr");
        }
        if rng.random::<f64>() < KEEP_CONTACTS {
            record.mobile.clone_from(&source.mobile);
            record.home_phone.clone_from(&source.home_phone);
            record.business_phone.clone_from(&source.business_phone);
            record.email.clone_from(&source.email);
            info.push("ph");
        }
        if self.include_ihi {
            record.ihi.clone_from(&source.ihi);
            info.push("IHI");
        }

        record.title = source.title;
        record.medicare_no.clone_from(&source.medicare_no);
        record.dva_no.clone_from(&source.dva_no);
        record.dva_type = source.dva_type;
        record.crn_no.clone_from(&source.crn_no);
        record.pen.clone_from(&source.pen);
        record.sen.clone_from(&source.sen);
        record.hc.clone_from(&source.hc);

        let previous = Measurements {
            height: source.height,
            weight: source.weight,
            waist: source.waist,
            hips: source.hips,
        };
        let body = anthropometrics::remeasure(rng, record.sex, &previous);
        record.height = body.height;
        record.weight = body.weight;
        record.waist = body.waist;
        record.hips = body.hips;

        record.married = source.married;
        record.race = source.race;
        record.death_date = source.death_date.map(|death| death.max(record.birthdate));
        info.join(",")
    }

    /// Give an Alias a different name, returning `fn` or `gn`
    ///
    /// Married women keep their family name and gain a bracketed previous
    /// name; other women gain a hyphenated family name; everyone else gets
    /// a new given name.
    pub fn alias_name_change<R: Rng + ?Sized>(&self, rng: &mut R, record: &mut PersonRecord) -> &'static str {
        if record.sex != Sex::Female {
            record.given_name = self.given_name(rng, record.sex);
            return "gn";
        }
        let other = self.family_name(rng);
        record.family_name = if record.married == MaritalStatus::Married {
            let base = strip_at(&record.family_name, PREVIOUS_NAME);
            if rng.random::<f64>() < 0.5 {
                format!("{base} ({other})")
            } else {
                format!("{base} (nee {other})")
            }
        } else {
            let base = strip_at(&record.family_name, &["-"]);
            format!("{base}-{other}")
        };
        "fn"
    }

    /// Corrupt a clone of `source`, returning the fields that ended up different
    ///
    /// An empty result means the record is an exact duplicate of its
    /// source under a different UR.
    pub fn potential_duplicate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        source: &PersonRecord,
        record: &mut PersonRecord,
    ) -> Changes {
        let mut changes = Changes::new();
        if rng.random::<f64>() < 0.3 {
            record.married = if record.married == MaritalStatus::Married {
                MaritalStatus::Single
            } else {
                MaritalStatus::Married
            };
            changes.push("married");
        }
        if record.birthdate != source.birthdate {
            changes.push("bd");
        }
        if rng.random::<f64>() < 0.25 {
            let given = self.given_name(rng, record.sex);
            if given != record.given_name {
                record.given_name = given;
                changes.push("gn");
            }
        }
        if rng.random::<f64>() < 0.333 {
            let family = self.family_name(rng);
            if family != record.family_name {
                record.family_name = family;
                changes.push("fn");
            }
        }
        if rng.random::<f64>() < 0.5 {
            record.sex = record.sex.flipped();
            changes.push("sex");
        }
        changes
    }

    /// Decorate a family name the way careless data entry does
    pub fn family_name_error<R: Rng + ?Sized>(&self, rng: &mut R, record: &mut PersonRecord) {
        let base = strip_at(&record.family_name, PREVIOUS_NAME).to_string();
        if record.sex == Sex::Female && record.married == MaritalStatus::Married {
            let other = self.family_name(rng);
            record.family_name = if rng.random::<f64>() < 0.3 {
                format!("{base} ({other})")
            } else if rng.random::<f64>() < 0.6 {
                format!("{base} [{other}]")
            } else {
                format!("{base} (nee {other})")
            };
            return;
        }

        let has_suffix = base.contains(' ');
        if !has_suffix && rng.random::<f64>() < 0.2 {
            record.family_name = format!("{base} III");
        } else if !has_suffix && rng.random::<f64>() < 0.5 {
            record.family_name = format!("{base} JNR");
        } else {
            let stem = strip_at(&base, &[" "]);
            let separator = if rng.random::<f64>() < 0.95 { '-' } else { '^' };
            record.family_name = format!("{stem}{separator}{}", self.family_name(rng));
        }
    }

    /// Decorate a given name with a nickname or a bracketed second name
    ///
    /// Infants under 60 days old become `TWIN 1` instead.
    pub fn given_name_error<R: Rng + ?Sized>(&self, rng: &mut R, record: &mut PersonRecord) {
        let marked = has_marker(&record.given_name, NICKNAME);
        if !marked {
            let nickname = self
                .reference
                .nicknames
                .lookup(&record.given_name)
                .and_then(|options| options.choose(rng))
                .cloned();
            if let Some(nickname) = nickname {
                if rng.random::<f64>() < 0.5 {
                    record.given_name = format!("{} *{nickname}", record.given_name);
                } else {
                    record.given_name = format!("{} ({nickname})", record.given_name);
                }
                return;
            }
        }
        if record.age_days(self.reference_date) < INFANT_DAYS {
            record.given_name = String::from("TWIN 1");
            return;
        }
        let base = strip_at(strip_at(&record.given_name, NICKNAME), &["-"]).to_string();
        record.given_name = format!("{base} ({})", self.given_name(rng, record.sex));
    }
}
