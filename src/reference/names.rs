//! Frequency-weighted name sampling
//!
//! Names are grouped into buckets of similar popularity (raw count divided
//! by a fixed divisor). Buckets are ordered rarest first and each carries
//! the fraction of the population held by it and every bucket after it, so
//! the fractions decrease monotonically from 1.0 to a trailing 0.0
//! sentinel. A draw scans for the first bucket whose successor's fraction
//! no longer exceeds a uniform variate, then picks uniformly within it.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{PmiError, Result};

/// Bucket width for family names
pub const FAMILY_NAME_DIVISOR: u64 = 200;
/// Bucket width for given names
pub const GIVEN_NAME_DIVISOR: u64 = 2000;

/// Names of similar popularity
#[derive(Debug, Clone)]
struct NameBucket {
    /// Population fraction held by this bucket and all later ones
    remaining: f64,
    names: Vec<String>,
}

/// A name-frequency table prepared for weighted draws
#[derive(Debug, Clone)]
pub struct NameTable {
    buckets: Vec<NameBucket>,
    name_count: usize,
}

impl NameTable {
    /// Build a table from `(name, count)` pairs
    ///
    /// Names are stored upper-cased. An empty table, or one whose counts sum
    /// to zero, is a configuration error.
    pub fn from_counts<S, I>(table: &str, entries: I, divisor: u64) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, u64)>,
    {
        let divisor = divisor.max(1);
        let mut profile: BTreeMap<u64, (u64, Vec<String>)> = BTreeMap::new();
        let mut total = 0_u64;
        let mut name_count = 0;

        for (name, count) in entries {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let bucket = profile.entry(count / divisor).or_default();
            bucket.0 += count;
            bucket.1.push(name.to_uppercase());
            total += count;
            name_count += 1;
        }

        if total == 0 {
            return Err(PmiError::config(format!(
                "insufficient reference data: no {table} names"
            )));
        }

        let mut buckets = Vec::with_capacity(profile.len() + 1);
        let mut remaining_total = total;
        for (_, (sum, names)) in profile {
            buckets.push(NameBucket {
                remaining: remaining_total as f64 / total as f64,
                names,
            });
            remaining_total -= sum;
        }
        buckets.push(NameBucket {
            remaining: 0.0,
            names: Vec::new(),
        });

        Ok(Self {
            buckets,
            name_count,
        })
    }

    /// Draw a name, weighted by its source-table frequency
    pub fn select_name<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let choice: f64 = rng.random();
        let mut i = 0;
        while i + 2 < self.buckets.len() && self.buckets[i + 1].remaining > choice {
            i += 1;
        }
        self.buckets[i]
            .names
            .choose(rng)
            .map_or("", String::as_str)
    }

    /// Number of distinct names in the table
    #[must_use]
    pub const fn len(&self) -> usize {
        self.name_count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name_count == 0
    }

    /// Number of popularity buckets, excluding the sentinel
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len() - 1
    }

    /// Population fractions per bucket, sentinel included
    pub fn remaining_fractions(&self) -> impl Iterator<Item = f64> + '_ {
        self.buckets.iter().map(|b| b.remaining)
    }
}
