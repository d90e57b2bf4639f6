//! Height, weight, waist and hip measurements by sex and age
//!
//! Lower and upper percentiles are tabulated at birth, 6 months, 2 years,
//! 18 years, 50 years and 80 years and interpolated linearly between the
//! breakpoints. Past 80 years the last row is used unchanged.

use rand::Rng;

use crate::models::Sex;
use crate::utils::random::{normal, round_to};

/// Age breakpoints in months
const BREAKPOINTS: [f64; 6] = [0.0, 6.0, 24.0, 216.0, 600.0, 960.0];

/// Height percentiles (cm) at each breakpoint, lower and upper
const MALE_HEIGHT: [[f64; 2]; 6] = [
    [47.0, 54.0],
    [64.0, 72.0],
    [81.0, 94.0],
    [165.0, 190.0],
    [169.0, 188.0],
    [162.0, 182.0],
];
const FEMALE_HEIGHT: [[f64; 2]; 6] = [
    [46.0, 55.0],
    [62.0, 70.0],
    [81.0, 93.0],
    [155.0, 175.0],
    [153.0, 174.0],
    [145.0, 168.0],
];

/// Weight percentiles (kg) at each breakpoint, lower and upper
const MALE_WEIGHT: [[f64; 2]; 6] = [
    [2.5, 4.5],
    [6.8, 10.0],
    [9.5, 15.0],
    [45.0, 87.0],
    [62.0, 112.0],
    [59.0, 100.0],
];
const FEMALE_WEIGHT: [[f64; 2]; 6] = [
    [2.8, 4.2],
    [6.0, 9.5],
    [9.5, 15.0],
    [45.0, 87.0],
    [51.0, 104.0],
    [48.0, 95.0],
];

/// Ratio of waist to height for a person of median weight
const WAIST_TO_HEIGHT: f64 = 0.49;

/// Body measurements of one person
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub height: f64,
    pub weight: f64,
    pub waist: f64,
    pub hips: f64,
}

/// Interpolated `[low, high]` bounds for an age in months
fn bounds(table: &[[f64; 2]; 6], age_months: f64) -> (f64, f64) {
    let last = BREAKPOINTS.len() - 1;
    if age_months >= BREAKPOINTS[last] {
        return (table[last][0], table[last][1]);
    }
    let age = age_months.max(0.0);
    let idx = BREAKPOINTS
        .windows(2)
        .position(|w| age <= w[1])
        .unwrap_or(last - 1);
    let span = BREAKPOINTS[idx + 1] - BREAKPOINTS[idx];
    let t = (age - BREAKPOINTS[idx]) / span;
    let lerp = |k: usize| table[idx][k] + (table[idx + 1][k] - table[idx][k]) * t;
    (lerp(0), lerp(1))
}

/// Height and weight percentile bounds for a sex and age
#[must_use]
pub fn percentile_bounds(sex: Sex, age_months: f64) -> ((f64, f64), (f64, f64)) {
    let (height, weight) = match sex {
        Sex::Female => (&FEMALE_HEIGHT, &FEMALE_WEIGHT),
        Sex::Male | Sex::Unknown => (&MALE_HEIGHT, &MALE_WEIGHT),
    };
    (bounds(height, age_months), bounds(weight, age_months))
}

/// Hip measurement from a waist measurement
fn hips_for<R: Rng + ?Sized>(rng: &mut R, sex: Sex, waist: f64) -> f64 {
    let ratio_mean = if sex == Sex::Male { 0.90 } else { 0.75 };
    let ratio = normal(rng, ratio_mean, 0.10).max(0.3);
    waist / ratio
}

/// Draw measurements for a person
///
/// Height and weight are normal around the middle of the percentile bounds
/// with a quarter of their width as spread. Waist scales with height and
/// with how far the weight is from the median.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, sex: Sex, age_months: f64) -> Measurements {
    let ((h_min, h_max), (w_min, w_max)) = percentile_bounds(sex, age_months);
    let w_mid = (w_min + w_max) / 2.0;
    let height = normal(rng, (h_min + h_max) / 2.0, (h_max - h_min) / 4.0).max(h_min / 2.0);
    let weight = normal(rng, w_mid, (w_max - w_min) / 4.0).max(w_min / 2.0);
    let waist = height * WAIST_TO_HEIGHT * (weight / w_mid);
    let hips = hips_for(rng, sex, waist);
    Measurements {
        height: round_to(height, 0),
        weight: round_to(weight, 1),
        waist: round_to(waist, 0),
        hips: round_to(hips, 0),
    }
}

/// Re-measure a person, as a second registration would
pub fn remeasure<R: Rng + ?Sized>(rng: &mut R, sex: Sex, previous: &Measurements) -> Measurements {
    let height = normal(rng, previous.height, previous.height / 50.0);
    let weight = normal(rng, previous.weight, previous.weight / 20.0);
    let scale = if previous.weight > 0.0 {
        weight / previous.weight
    } else {
        1.0
    };
    let waist = previous.height * WAIST_TO_HEIGHT * scale;
    let hips = hips_for(rng, sex, waist);
    Measurements {
        height: round_to(height, 0),
        weight: round_to(weight, 1),
        waist: round_to(waist, 0),
        hips: round_to(hips, 0),
    }
}
