//! Fixed piece counts: every digit value appears an exact number of times.

use crate::error::{RankError, Result};
use crate::state::{DigitCounts, SequenceState};
use crate::Digit;

use super::CountingOracle;

/// Oracle for arrangements of a fixed multiset of pieces.
///
/// Digit `d` must appear exactly `counts[d]` times. The number of
/// completions is the multinomial coefficient of the pieces still to be
/// placed, read off the state's [`DigitCounts`] tally in O(k) for `k`
/// piece kinds.
///
/// # Example
///
/// ```
/// use seqrank_core::oracle::PieceCount;
///
/// // Two blanks (digit 0), four X (1) and three O (2) on a 3x3 board.
/// let oracle = PieceCount::new(&[2, 4, 3]).unwrap();
/// assert_eq!(oracle.num_elements(), 9);
/// assert_eq!(oracle.arrangements(), 1260);
/// ```
#[derive(Debug, Clone)]
pub struct PieceCount {
    counts: Vec<usize>,
    // Saturating Pascal triangle; every entry actually used is bounded by
    // `arrangements`, which is checked at construction.
    binomials: Vec<Vec<u64>>,
    arrangements: u64,
}

impl PieceCount {
    /// Creates the oracle; the sequence length is the sum of `counts`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::EmptyLayout`] when the counts sum to zero and
    /// [`RankError::CountOverflow`] when the total arrangements do not fit
    /// in 64 bits.
    pub fn new(counts: &[usize]) -> Result<Self> {
        let n: usize = counts.iter().sum();
        if n == 0 || counts.is_empty() {
            return Err(RankError::EmptyLayout);
        }
        let mut binomials = vec![vec![1u64; 1]; n + 1];
        for row in 1..=n {
            let mut next = vec![1u64; row + 1];
            for k in 1..row {
                next[k] = binomials[row - 1][k - 1].saturating_add(binomials[row - 1][k]);
            }
            binomials[row] = next;
        }
        let mut oracle = Self {
            counts: counts.to_vec(),
            binomials,
            arrangements: 0,
        };
        oracle.arrangements = oracle
            .checked_multinomial(counts)
            .ok_or(RankError::CountOverflow)?;
        Ok(oracle)
    }

    /// Sequence length.
    pub fn num_elements(&self) -> usize {
        self.binomials.len() - 1
    }

    /// Required count per digit value.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Digit bases for an engine using this oracle.
    pub fn radices(&self) -> Vec<Digit> {
        vec![self.counts.len() as Digit; self.num_elements()]
    }

    /// Total number of valid arrangements.
    pub fn arrangements(&self) -> u64 {
        self.arrangements
    }

    fn checked_multinomial(&self, remaining: &[usize]) -> Option<u64> {
        let mut placed = 0usize;
        let mut product = 1u64;
        for &r in remaining {
            placed += r;
            let binomial = self.binomials[placed][r];
            if binomial == u64::MAX {
                return None;
            }
            product = product.checked_mul(binomial)?;
        }
        Some(product)
    }
}

impl CountingOracle for PieceCount {
    type Tally = DigitCounts;

    fn new_tally(&self, radices: &[Digit]) -> DigitCounts {
        DigitCounts::new(self.counts.len(), radices.len())
    }

    fn completions(&self, state: &SequenceState<DigitCounts>) -> u64 {
        let tally = state.tally();
        let mut placed = 0usize;
        let mut product = 1u64;
        for (digit, &required) in self.counts.iter().enumerate() {
            let used = tally.count(digit as Digit);
            if used > required {
                return 0;
            }
            let r = required - used;
            placed += r;
            product *= self.binomials[placed][r];
        }
        debug_assert_eq!(placed, state.cursor());
        product
    }

    fn validate_complete(&self, state: &SequenceState<DigitCounts>) -> bool {
        if !state.is_complete() || !state.digits_in_range() {
            return false;
        }
        let mut seen = vec![0usize; self.counts.len()];
        for &digit in state.assigned() {
            seen[digit as usize] += 1;
        }
        seen == self.counts
    }
}
