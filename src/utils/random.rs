//! Random draws shared by the generators
//!
//! All generators take `&mut R where R: Rng + ?Sized` so a seeded `StdRng`
//! can be injected for reproducible runs.

use rand::prelude::*;
use rand_distr::{Distribution, Normal};

/// Create the run's random source, seeded when a seed is configured
#[must_use]
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// True with the given percentage probability
pub fn chance<R: Rng + ?Sized>(rng: &mut R, percent: f64) -> bool {
    rng.random::<f64>() * 100.0 < percent
}

/// Draw from a normal distribution, returning the mean for a degenerate spread
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return mean;
    }
    Normal::new(mean, std_dev).map_or(mean, |dist| dist.sample(rng))
}

/// Round to a number of decimal places
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

/// Next step of a sequence that advances by `skip`
///
/// Steps of three or more are jittered uniformly within one either side.
pub fn jittered_step<R: Rng + ?Sized>(rng: &mut R, skip: u64) -> u64 {
    if skip < 3 {
        skip.max(1)
    } else {
        rng.random_range(skip - 1..=skip + 1)
    }
}

/// Offset a date by a whole number of days
#[must_use]
pub fn offset_days(date: chrono::NaiveDate, days: i64) -> chrono::NaiveDate {
    date.checked_add_signed(chrono::Duration::days(days))
        .unwrap_or(date)
}
