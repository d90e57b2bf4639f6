//! UR numbering

use rand::Rng;

use crate::config::UrRange;
use crate::utils::random::jittered_step;

/// Walks the UR range, handing stepped-over values to the reserved pool
#[derive(Debug, Clone)]
pub struct UrCursor {
    current: u64,
    end: u64,
    skip: u64,
}

impl UrCursor {
    #[must_use]
    pub const fn new(range: &UrRange) -> Self {
        Self {
            current: range.start_ur,
            end: range.end_ur,
            skip: range.skip_ur,
        }
    }

    /// UR of the slot being filled
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.current
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.current >= self.end
    }

    /// Move to the next slot, returning the UR values stepped over
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> std::ops::Range<u64> {
        let step = jittered_step(rng, self.skip);
        let skipped_from = self.current + 1;
        let next = self.current.saturating_add(step);
        self.current = next;
        skipped_from..next.min(self.end)
    }
}
