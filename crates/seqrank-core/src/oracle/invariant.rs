//! Memoized counting over state invariants.
//!
//! Many games admit a small summary of the assigned suffix (piece counts,
//! whose turn it is, a pending constraint on the next cell) such that the
//! number of completions depends only on that summary and the cursor.
//! [`Memoized`] turns such a summary into a full [`CountingOracle`] by
//! enumerating completions once per `(cursor, invariant)` pair and caching
//! the result in lock-free tables shared by every thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use tracing::trace;

use crate::state::{SequenceState, Tally};
use crate::Digit;

use super::CountingOracle;

const UNKNOWN: u64 = u64::MAX;

/// A game described by a bounded invariant of its assigned suffix.
///
/// Two suffixes with the same cursor and the same invariant must have the
/// same number of valid completions. A suffix that breaks a rule anywhere,
/// not only at the cursor, must map to `None`: its zero would otherwise be
/// cached for every live suffix sharing the invariant.
pub trait InvariantOracle: Send + Sync {
    /// Tally the invariant is computed from.
    type Tally: Tally;

    /// Creates an empty tally for a sequence with these digit bases.
    fn new_tally(&self, radices: &[Digit]) -> Self::Tally;

    /// Exclusive upper bound of [`invariant`](Self::invariant) at `cursor`.
    fn num_invariants(&self, cursor: usize) -> usize;

    /// Invariant of the assigned suffix, or `None` if the suffix already
    /// breaks a rule and admits no completion.
    fn invariant(&self, state: &SequenceState<Self::Tally>) -> Option<usize>;

    /// From-scratch validity check of a complete state.
    fn is_valid(&self, state: &SequenceState<Self::Tally>) -> bool;
}

/// Caches completion counts of an [`InvariantOracle`] per cursor and
/// invariant.
pub struct Memoized<I> {
    inner: I,
    tables: Box<[OnceLock<Box<[AtomicU64]>>]>,
}

impl<I: InvariantOracle> Memoized<I> {
    /// Wraps `inner` for sequences of `num_elements` positions.
    pub fn new(inner: I, num_elements: usize) -> Self {
        let tables = (0..=num_elements).map(|_| OnceLock::new()).collect();
        Self { inner, tables }
    }

    /// The wrapped invariant oracle.
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Number of `(cursor, invariant)` entries computed so far.
    pub fn memoized_entries(&self) -> usize {
        self.tables
            .iter()
            .filter_map(OnceLock::get)
            .map(|table| {
                table
                    .iter()
                    .filter(|slot| slot.load(Ordering::Relaxed) != UNKNOWN)
                    .count()
            })
            .sum()
    }

    fn table(&self, cursor: usize) -> &[AtomicU64] {
        self.tables[cursor].get_or_init(|| {
            let size = self.inner.num_invariants(cursor);
            trace!(cursor, size, "Allocating invariant table");
            (0..size).map(|_| AtomicU64::new(UNKNOWN)).collect()
        })
    }

    fn count(&self, state: &mut SequenceState<I::Tally>) -> u64 {
        let Some(invariant) = self.inner.invariant(state) else {
            return 0;
        };
        let cursor = state.cursor();
        if cursor == 0 {
            return u64::from(self.inner.is_valid(state));
        }
        let slot = &self.table(cursor)[invariant];
        let cached = slot.load(Ordering::Relaxed);
        if cached != UNKNOWN {
            return cached;
        }

        let radix = state.radix(cursor - 1);
        let mut total = 0u64;
        for digit in 0..radix {
            state.push(digit);
            total = total.saturating_add(self.count(state));
            state.truncate();
        }
        // A saturated count reads back as UNKNOWN and is recomputed.
        slot.store(total, Ordering::Relaxed);
        total
    }
}

impl<I: InvariantOracle> CountingOracle for Memoized<I> {
    type Tally = I::Tally;

    fn new_tally(&self, radices: &[Digit]) -> Self::Tally {
        self.inner.new_tally(radices)
    }

    fn completions(&self, state: &SequenceState<Self::Tally>) -> u64 {
        let Some(invariant) = self.inner.invariant(state) else {
            return 0;
        };
        let cursor = state.cursor();
        if cursor == 0 {
            return u64::from(self.inner.is_valid(state));
        }
        let cached = self.table(cursor)[invariant].load(Ordering::Relaxed);
        if cached != UNKNOWN {
            return cached;
        }
        let mut scratch = state.clone();
        self.count(&mut scratch)
    }

    fn validate_complete(&self, state: &SequenceState<Self::Tally>) -> bool {
        state.is_complete() && state.digits_in_range() && self.inner.is_valid(state)
    }
}

impl<I: std::fmt::Debug> std::fmt::Debug for Memoized<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("inner", &self.inner)
            .field("num_elements", &(self.tables.len() - 1))
            .finish()
    }
}
