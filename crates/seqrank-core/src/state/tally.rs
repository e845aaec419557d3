//! Incremental summaries of the assigned suffix.
//!
//! A tally rides along with a [`SequenceState`](super::SequenceState) and is
//! told about every in-range digit that enters or leaves the assigned suffix.
//! Oracles read it instead of rescanning the suffix on every call.

use std::fmt::Debug;

use smallvec::{smallvec, SmallVec};

use crate::Digit;

/// Per-state summary kept in step with the assigned suffix.
///
/// Out-of-range sentinel digits never reach a tally: the state only reports
/// digits in `[0, radix)`. Implementations must be a pure function of the
/// reported digits so that two states with equal suffixes have equal tallies.
pub trait Tally: Clone + Debug + PartialEq + Send + Sync {
    /// A digit became assigned at `position`.
    fn assign(&mut self, position: usize, digit: Digit);

    /// A previously assigned digit left `position`.
    fn unassign(&mut self, position: usize, digit: Digit);

    /// Forget everything; the state is now empty.
    fn reset(&mut self);
}

impl Tally for () {
    #[inline]
    fn assign(&mut self, _position: usize, _digit: Digit) {}

    #[inline]
    fn unassign(&mut self, _position: usize, _digit: Digit) {}

    #[inline]
    fn reset(&mut self) {}
}

/// Counts occurrences of each digit value among assigned positions below a
/// window boundary.
///
/// Positions at or above `window` are not counted, which lets an oracle
/// treat a few trailing positions (a turn marker, say) separately.
///
/// # Example
///
/// ```
/// use seqrank_core::state::{DigitCounts, Tally};
///
/// let mut counts = DigitCounts::new(3, 4);
/// counts.assign(0, 2);
/// counts.assign(1, 2);
/// counts.assign(5, 1); // outside the window
/// assert_eq!(counts.count(2), 2);
/// assert_eq!(counts.count(1), 0);
/// counts.unassign(1, 2);
/// assert_eq!(counts.count(2), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitCounts {
    counts: SmallVec<[usize; 4]>,
    window: usize,
}

impl DigitCounts {
    /// Creates a tally for digits `0..num_digits` over positions `0..window`.
    pub fn new(num_digits: usize, window: usize) -> Self {
        Self {
            counts: smallvec![0; num_digits],
            window,
        }
    }

    /// Number of assigned positions holding `digit`.
    #[inline]
    pub fn count(&self, digit: Digit) -> usize {
        self.counts[digit as usize]
    }

    /// All counts, indexed by digit value.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of distinct digit values tracked.
    pub fn num_digits(&self) -> usize {
        self.counts.len()
    }

    /// Positions below this boundary are counted.
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Tally for DigitCounts {
    #[inline]
    fn assign(&mut self, position: usize, digit: Digit) {
        if position < self.window {
            self.counts[digit as usize] += 1;
        }
    }

    #[inline]
    fn unassign(&mut self, position: usize, digit: Digit) {
        if position < self.window {
            debug_assert!(self.counts[digit as usize] > 0);
            self.counts[digit as usize] -= 1;
        }
    }

    fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}
