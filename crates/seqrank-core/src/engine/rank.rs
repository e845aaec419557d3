//! Rank and unrank.

use rand::Rng;

use crate::error::{RankError, Result};
use crate::oracle::CountingOracle;
use crate::state::{Direction, SequenceState};
use crate::{Digit, Rank};

use super::RankingEngine;

/// Per-position partial rank sums of one complete state.
///
/// Entry `p` holds the rank contribution of positions `[p, N)`. After a
/// change confined to positions below some `q`, entries at `q` and above
/// are still correct and [`RankingEngine::hash_resume`] can restart there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankCache {
    sums: Box<[Rank]>,
}

impl RankCache {
    /// An empty cache for sequences of `num_elements` positions.
    pub fn new(num_elements: usize) -> Self {
        Self {
            sums: vec![0; num_elements + 1].into_boxed_slice(),
        }
    }

    /// Rank of the cached state.
    pub fn rank(&self) -> Rank {
        self.sums[0]
    }

    /// Rank contribution of positions at or above `position`.
    pub fn suffix_rank(&self, position: usize) -> Rank {
        self.sums[position]
    }

    fn num_elements(&self) -> usize {
        self.sums.len() - 1
    }
}

impl<O: CountingOracle> RankingEngine<O> {
    /// Rank of a complete valid state.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::LengthMismatch`] for a state of another layout,
    /// [`RankError::IncompleteState`] when positions are unassigned and
    /// [`RankError::InvalidState`] when the oracle rejects the sequence.
    pub fn hash(&self, state: &SequenceState<O::Tally>) -> Result<Rank> {
        self.check_valid(state)?;
        Ok(self.rank_below(state, state.len()))
    }

    /// Rank contribution of positions `[0, k)`.
    ///
    /// This is the rank of `state` among the states sharing its digits at
    /// `k` and above. Adding the rank of the first such state gives
    /// [`hash`](Self::hash).
    pub fn partial_hash(&self, state: &SequenceState<O::Tally>, k: usize) -> Result<Rank> {
        self.check_valid(state)?;
        if k > state.len() {
            return Err(RankError::LengthMismatch {
                expected: state.len(),
                actual: k,
            });
        }
        Ok(self.rank_below(state, k))
    }

    pub(crate) fn rank_below(&self, state: &SequenceState<O::Tally>, k: usize) -> Rank {
        let mut scratch = self.scratch.acquire();
        scratch.copy_from(state);
        scratch.truncate_to(k);
        let mut rank = 0;
        while !scratch.is_complete() {
            scratch.push_stored();
            rank += self.sig_value(&mut scratch);
        }
        rank
    }

    /// Ranks `state` and records its partial sums in `cache`.
    pub fn hash_cached(&self, state: &SequenceState<O::Tally>, cache: &mut RankCache) -> Result<Rank> {
        self.hash_resume(state, cache, state.len())
    }

    /// Ranks `state` reusing the cached sums of positions `>= unchanged_from`.
    ///
    /// `cache` must hold the sums of a state that agrees with `state` on
    /// every position at or above `unchanged_from`. The entries below are
    /// refreshed.
    pub fn hash_resume(
        &self,
        state: &SequenceState<O::Tally>,
        cache: &mut RankCache,
        unchanged_from: usize,
    ) -> Result<Rank> {
        self.check_valid(state)?;
        if cache.num_elements() != state.len() {
            return Err(RankError::LengthMismatch {
                expected: state.len(),
                actual: cache.num_elements(),
            });
        }
        let start = unchanged_from.min(state.len());
        let mut scratch = self.scratch.acquire();
        scratch.copy_from(state);
        scratch.truncate_to(start);
        let mut rank = cache.sums[start];
        while !scratch.is_complete() {
            scratch.push_stored();
            rank += self.sig_value(&mut scratch);
            cache.sums[scratch.cursor()] = rank;
        }
        drop(scratch);

        if self.strict {
            let full = self.rank_below(state, state.len());
            if full != rank {
                self.violation("resumed rank disagrees with full rank", state);
            }
        }
        Ok(rank)
    }

    /// Fills `state` with the sequence of rank `rank`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::RankOutOfRange`] unless `rank < total_positions()`,
    /// and [`RankError::InvalidState`] with `state` cleared when the oracle's
    /// counts do not cover `rank`.
    pub fn unhash(&self, rank: Rank, state: &mut SequenceState<O::Tally>) -> Result<()> {
        self.check_layout(state)?;
        let total = self.total_positions();
        if rank >= total {
            return Err(RankError::RankOutOfRange { rank, total });
        }

        state.clear();
        let mut remaining = rank;
        while !state.is_complete() {
            let position = state.cursor() - 1;
            let mut placed = false;
            for digit in 0..self.radix(position) {
                state.push(digit);
                let count = self.completions(state);
                if remaining < count {
                    placed = true;
                    break;
                }
                remaining -= count;
                state.truncate();
            }
            if !placed {
                if self.strict {
                    self.violation("completions do not cover the requested rank", state);
                }
                state.clear();
                return Err(RankError::InvalidState(format!(
                    "no digit at position {} covers rank {}",
                    position, rank
                )));
            }
        }
        debug_assert_eq!(remaining, 0);

        if self.strict && (remaining != 0 || self.rank_below(state, state.len()) != rank) {
            self.violation("unranked state does not rank back", state);
        }
        Ok(())
    }

    /// Unranks a uniformly random rank into `state` and returns it.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        state: &mut SequenceState<O::Tally>,
    ) -> Result<Rank> {
        let total = self.total_positions();
        if total == 0 {
            return Err(RankError::EmptyDomain);
        }
        let rank = rng.random_range(0..total);
        self.unhash(rank, state)?;
        Ok(rank)
    }

    /// Number of valid sequences whose top positions hold `suffix`.
    ///
    /// `suffix[i]` sits at position `N - suffix.len() + i`.
    pub fn num_positions(&self, suffix: &[Digit]) -> Result<Rank> {
        let mut scratch = self.scratch.acquire();
        if self.assign_suffix(&mut scratch, suffix)? {
            Ok(self.completions(&scratch))
        } else {
            Ok(0)
        }
    }

    /// Fills `state` with the lowest-ranked valid sequence ending in
    /// `suffix`. Returns `false` when there is none.
    pub fn first_position(
        &self,
        suffix: &[Digit],
        state: &mut SequenceState<O::Tally>,
    ) -> Result<bool> {
        self.check_layout(state)?;
        if !self.assign_suffix(state, suffix)? || self.completions(state) == 0 {
            return Ok(false);
        }
        self.extend_to_complete(state, Direction::Forward);
        Ok(true)
    }

    /// Clears `state` and assigns `suffix` at the top. Returns `false` as
    /// soon as a digit is out of range or the suffix so far has no
    /// completions.
    pub(crate) fn assign_suffix(
        &self,
        state: &mut SequenceState<O::Tally>,
        suffix: &[Digit],
    ) -> Result<bool> {
        if suffix.len() > state.len() {
            return Err(RankError::SuffixTooLong {
                length: suffix.len(),
                num_elements: state.len(),
            });
        }
        state.clear();
        for &digit in suffix.iter().rev() {
            state.push(digit);
            if self.completions(state) == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
