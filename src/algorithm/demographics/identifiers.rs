//! Checksummed national identifiers and the sets that keep them unique
//!
//! Medicare numbers carry a weighted mod-10 check digit, IHI numbers a
//! Luhn-style check digit. DVA and CRN numbers have no checksum but are
//! still kept unique within a run.

use rand::Rng;
use rand::seq::IndexedRandom;
use rustc_hash::FxHashSet;

use crate::error::{PmiError, Result};
use crate::models::DvaType;
use crate::utils::random::jittered_step;

/// Weights of the eight Medicare body digits
const MEDICARE_WEIGHTS: [u32; 8] = [1, 3, 7, 9, 1, 3, 7, 9];

/// IHI numbers are this prefix plus a serial below [`IHI_SERIAL_MODULUS`]
pub const IHI_PREFIX: u64 = 800_360_990_000_000;
pub const IHI_SERIAL_MODULUS: u64 = 10_000_000;

const DVA_WARS: &[&str] = &[" ", "A", "GW", "X", "SM", "SS", "KM", "PX", "P", "IV"];
const DVA_LINKS: &[&str] = &[" ", "A", "B", "C", "D", "E"];
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Luhn-style check digit: digits at odd positions from the right are
/// doubled and digit-summed, and the total is scaled by nine
#[must_use]
pub fn luhn_digit(digits: &str) -> Option<u32> {
    let mut sum = 0;
    for (position, c) in digits.chars().rev().enumerate() {
        let digit = c.to_digit(10)?;
        if position % 2 == 0 {
            let doubled = digit * 2;
            sum += doubled / 10 + doubled % 10;
        } else {
            sum += digit;
        }
    }
    Some((sum * 9) % 10)
}

/// Whether a string ends with its own Luhn-style check digit
#[must_use]
pub fn is_valid_luhn(number: &str) -> bool {
    let Some(split) = number.len().checked_sub(1) else {
        return false;
    };
    let (body, check) = number.split_at(split);
    !body.is_empty() && luhn_digit(body).is_some_and(|d| check.chars().next() == char::from_digit(d, 10))
}

/// Weighted mod-10 check digit of an eight-digit Medicare body
#[must_use]
pub fn medicare_check_digit(body: &str) -> Option<u32> {
    if body.len() != MEDICARE_WEIGHTS.len() {
        return None;
    }
    let mut sum = 0;
    for (c, weight) in body.chars().zip(MEDICARE_WEIGHTS) {
        sum += c.to_digit(10)? * weight;
    }
    Some(sum % 10)
}

/// Whether an 11-digit Medicare number carries the right check digit
#[must_use]
pub fn is_valid_medicare(number: &str) -> bool {
    number.len() == 11
        && number.chars().all(|c| c.is_ascii_digit())
        && medicare_check_digit(&number[..8])
            .is_some_and(|d| number[8..9].chars().next() == char::from_digit(d, 10))
}

/// A random Medicare number for a postcode
///
/// The first digit follows the postcode's first digit, with 0 and 7 mapped
/// to 5. Seven random digits and the check digit follow, then an issue
/// number (1-7) and an individual reference number (1-5).
pub fn medicare_number<R: Rng + ?Sized>(rng: &mut R, postcode: &str) -> String {
    let state_digit = match postcode.chars().next() {
        Some(c @ ('1'..='6' | '8'..='9')) => c,
        _ => '5',
    };
    let body = format!("{state_digit}{:07}", rng.random_range(0..10_000_000_u32));
    let check = medicare_check_digit(&body).unwrap_or_default();
    format!(
        "{body}{check}{}{}",
        rng.random_range(1..=7_u32),
        rng.random_range(1..=5_u32)
    )
}

/// The IHI for a serial number
#[must_use]
pub fn ihi_from_serial(serial: u64) -> String {
    let body = (IHI_PREFIX + serial % IHI_SERIAL_MODULUS).to_string();
    let check = luhn_digit(&body).unwrap_or_default();
    format!("{body}{check}")
}

/// An IHI that keeps the first seven characters of `ihi` and redraws the rest
pub fn corrupt_ihi<R: Rng + ?Sized>(rng: &mut R, ihi: &str) -> String {
    let prefix: String = ihi.chars().take(7).collect();
    let body = format!("{prefix}{:08}", rng.random_range(0..100_000_000_u32));
    let check = luhn_digit(&body).unwrap_or_default();
    format!("{body}{check}")
}

/// A random DVA file number for a state
///
/// State letter, war code, digits padding the number to eight characters,
/// then a link letter.
pub fn dva_number<R: Rng + ?Sized>(rng: &mut R, state: &str) -> String {
    let state_letter = match state {
        "VIC" => "V",
        "QLD" => "Q",
        "WA" => "W",
        "SA" | "NT" => "S",
        "TAS" => "T",
        _ => "N",
    };
    let war = DVA_WARS.choose(rng).copied().unwrap_or(" ");
    let mut number = format!("{state_letter}{war}");
    match number.len() {
        len if len > 3 => number.push_str(&format!("{:04}", rng.random_range(0..10_000_u32))),
        len if len > 2 => number.push_str(&format!("{:05}", rng.random_range(0..100_000_u32))),
        _ => number.push_str(&format!("{:06}", rng.random_range(0..1_000_000_u32))),
    }
    number.push_str(DVA_LINKS.choose(rng).copied().unwrap_or(" "));
    number
}

/// Card colour for a veteran of the given age
pub fn dva_type<R: Rng + ?Sized>(rng: &mut R, age_days: i64) -> DvaType {
    if age_days < 365 * 21 + 5 {
        DvaType::Gold
    } else {
        DvaType::ALL.choose(rng).copied().unwrap_or(DvaType::Gold)
    }
}

/// A random CRN serial in 900000000..=999999999
pub fn crn_serial<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.random_range(900_000_000..=999_999_999)
}

/// Append a random check letter to a CRN serial
pub fn crn_number<R: Rng + ?Sized>(rng: &mut R, serial: u64) -> String {
    let letter = LETTERS.choose(rng).copied().map_or('A', char::from);
    format!("{serial}{letter}")
}

/// Identifier values already handed out, per identifier type
#[derive(Debug, Clone, Default)]
pub struct UsedIdentifiers {
    pub medicare: FxHashSet<String>,
    pub ihi: FxHashSet<String>,
    pub dva: FxHashSet<String>,
    pub crn: FxHashSet<u64>,
}

impl UsedIdentifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers recorded across all types
    #[must_use]
    pub fn len(&self) -> usize {
        self.medicare.len() + self.ihi.len() + self.dva.len() + self.crn.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Draw values until one is not in `used`, then record it
pub fn draw_unique<T, R, F>(
    rng: &mut R,
    used: &mut FxHashSet<T>,
    budget: usize,
    what: &str,
    mut draw: F,
) -> Result<T>
where
    T: Clone + Eq + std::hash::Hash,
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> T,
{
    for _ in 0..budget {
        let value = draw(rng);
        if used.insert(value.clone()) {
            return Ok(value);
        }
    }
    Err(PmiError::exhausted(what, budget))
}

/// Sequential IHI allocation with jittered steps and modulo rollover
#[derive(Debug, Clone)]
pub struct IhiAllocator {
    next_serial: u64,
    skip: u64,
}

impl IhiAllocator {
    #[must_use]
    pub const fn new(start: u64, skip: u64) -> Self {
        Self {
            next_serial: start % IHI_SERIAL_MODULUS,
            skip,
        }
    }

    /// Allocate the next IHI not already present in `used`
    pub fn allocate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        used: &mut FxHashSet<String>,
        budget: usize,
    ) -> Result<String> {
        for _ in 0..budget {
            let ihi = ihi_from_serial(self.next_serial);
            self.advance(rng);
            if used.insert(ihi.clone()) {
                return Ok(ihi);
            }
        }
        Err(PmiError::exhausted("IHI number", budget))
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.next_serial = (self.next_serial + jittered_step(rng, self.skip)) % IHI_SERIAL_MODULUS;
    }

    #[must_use]
    pub const fn next_serial(&self) -> u64 {
        self.next_serial
    }
}
