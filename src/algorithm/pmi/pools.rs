//! Index sets over the emitted records
//!
//! `active` holds live records that are neither links nor duplicates, the
//! sources for duplicate injection. `targets` is the deletable pool, the
//! default link targets: the bootstrap records and every deleted record that
//! is neither an Alias nor a Merge. `reserved` holds UR values that will
//! never be emitted.

use rand::Rng;
use rand::seq::IndexedRandom;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct Pools {
    active: Vec<usize>,
    targets: Vec<usize>,
    target_set: FxHashSet<usize>,
    reserved: Vec<u64>,
}

impl Pools {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bootstrap record: both a duplicate source and a link target
    pub fn add_bootstrap(&mut self, slot: usize) {
        self.add_active(slot);
        self.add_target(slot);
    }

    /// A fresh live identity, available as a duplicate source only
    pub fn add_active(&mut self, slot: usize) {
        self.active.push(slot);
    }

    /// A deleted record that is not itself a link
    pub fn add_target(&mut self, slot: usize) {
        if self.target_set.insert(slot) {
            self.targets.push(slot);
        }
    }

    pub fn reserve(&mut self, ur: u64) {
        self.reserved.push(ur);
    }

    pub fn reserve_all(&mut self, urs: impl IntoIterator<Item = u64>) {
        self.reserved.extend(urs);
    }

    pub fn pick_active<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.active.choose(rng).copied()
    }

    pub fn pick_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.targets.choose(rng).copied()
    }

    #[must_use]
    pub fn is_target(&self, slot: usize) -> bool {
        self.target_set.contains(&slot)
    }

    /// Remove and return a random reserved UR
    pub fn take_reserved<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u64> {
        if self.reserved.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.reserved.len());
        Some(self.reserved.swap_remove(index))
    }

    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn target_len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn reserved_len(&self) -> usize {
        self.reserved.len()
    }
}
