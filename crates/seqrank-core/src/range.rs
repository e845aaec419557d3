//! Suffix ranges: contiguous rank intervals sharing their top digits.
//!
//! Fixing the `k` most significant positions splits the rank space into
//! consecutive, independently processable intervals. [`RangeSweep`] walks
//! every interval on a rayon pool, stepping within each one.

use rayon::prelude::*;
use seqrank_config::{PartitionConfig, ThreadCount};
use tracing::{debug, trace};

use crate::engine::RankingEngine;
use crate::error::{RankError, Result};
use crate::oracle::CountingOracle;
use crate::state::{Direction, SequenceState, Tally};
use crate::{Digit, Rank};

const DEFAULT_SUFFIX_LENGTH: usize = 2;

/// The ranks of all valid sequences ending in one fixed suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuffixRange {
    digits: Vec<Digit>,
    start: Rank,
    len: Rank,
}

impl SuffixRange {
    /// The fixed digits, lowest position first.
    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    /// Number of fixed positions.
    pub fn suffix_len(&self) -> usize {
        self.digits.len()
    }

    /// Rank of the first sequence in the range.
    pub fn start(&self) -> Rank {
        self.start
    }

    /// Number of sequences in the range.
    pub fn len(&self) -> Rank {
        self.len
    }

    /// True when the range holds no sequence.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last rank in the range.
    pub fn end(&self) -> Rank {
        self.start + self.len
    }

    /// Whether `rank` falls in the range.
    pub fn contains(&self, rank: Rank) -> bool {
        rank >= self.start && rank < self.end()
    }

    /// Whether `state` holds this range's suffix at its top positions.
    pub fn matches<T: Tally>(&self, state: &SequenceState<T>) -> bool {
        let from = state.len().saturating_sub(self.digits.len());
        state.cursor() <= from
            && state.len() >= self.digits.len()
            && state.assigned()[from - state.cursor()..] == self.digits[..]
    }

    /// Rank of `state` within the range.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidState`] when `state` lies outside the
    /// range, and the errors of [`RankingEngine::partial_hash`].
    pub fn sub_rank<O: CountingOracle>(
        &self,
        engine: &RankingEngine<O>,
        state: &SequenceState<O::Tally>,
    ) -> Result<Rank> {
        if !self.matches(state) {
            return Err(RankError::InvalidState(format!(
                "{} does not end in {:?}",
                state, self.digits
            )));
        }
        engine.partial_hash(state, state.len() - self.digits.len())
    }

    /// Fills `state` with the first sequence of the range.
    pub fn first_position<O: CountingOracle>(
        &self,
        engine: &RankingEngine<O>,
        state: &mut SequenceState<O::Tally>,
    ) -> Result<bool> {
        engine.first_position(&self.digits, state)
    }
}

impl<O: CountingOracle> RankingEngine<O> {
    /// Splits `[0, total_positions)` into the non-empty ranges sharing their
    /// top `suffix_len` digits, in rank order.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::EmptySuffix`] for a zero length and
    /// [`RankError::SuffixTooLong`] beyond the sequence length.
    pub fn suffix_ranges(&self, suffix_len: usize) -> Result<Vec<SuffixRange>> {
        if suffix_len == 0 {
            return Err(RankError::EmptySuffix);
        }
        if suffix_len > self.num_elements() {
            return Err(RankError::SuffixTooLong {
                length: suffix_len,
                num_elements: self.num_elements(),
            });
        }
        let mut ranges = Vec::new();
        if self.total_positions() == 0 {
            return Ok(ranges);
        }

        let mut state = self.acquire_state();
        state.clear();
        let floor = self.num_elements() - suffix_len;
        self.extend_to(&mut state, Direction::Forward, floor);

        let mut start = 0;
        loop {
            let len = self.completions(&state);
            trace!(start, len, suffix = ?state.assigned(), "Suffix range");
            ranges.push(SuffixRange {
                digits: state.assigned().to_vec(),
                start,
                len,
            });
            start += len;
            if self.step(&mut state, Direction::Forward).is_none() {
                break;
            }
        }
        debug!(suffix_len, ranges = ranges.len(), total = start, "Suffix ranges built");
        Ok(ranges)
    }
}

/// Visits every valid sequence in parallel, one suffix range per task.
#[derive(Debug)]
pub struct RangeSweep<'e, O: CountingOracle> {
    engine: &'e RankingEngine<O>,
    ranges: Vec<SuffixRange>,
    threads: ThreadCount,
}

impl<'e, O: CountingOracle> RangeSweep<'e, O> {
    /// Partitions on the top `suffix_len` positions using the global pool.
    pub fn new(engine: &'e RankingEngine<O>, suffix_len: usize) -> Result<Self> {
        Ok(Self {
            ranges: engine.suffix_ranges(suffix_len)?,
            engine,
            threads: ThreadCount::Auto,
        })
    }

    /// Partitions as configured. Without a configured suffix length, the
    /// top two positions (or fewer for shorter sequences) are fixed.
    pub fn from_config(engine: &'e RankingEngine<O>, config: &PartitionConfig) -> Result<Self> {
        let suffix_len = config
            .suffix_length
            .unwrap_or(DEFAULT_SUFFIX_LENGTH)
            .min(engine.num_elements());
        Ok(Self::new(engine, suffix_len)?.with_thread_count(config.thread_count))
    }

    /// Uses a dedicated pool of the given size.
    pub fn with_thread_count(mut self, threads: ThreadCount) -> Self {
        self.threads = threads;
        self
    }

    /// The ranges, in rank order.
    pub fn ranges(&self) -> &[SuffixRange] {
        &self.ranges
    }

    /// Calls `visit(rank, state)` for every valid sequence and returns how
    /// many were visited.
    ///
    /// Ranges are processed concurrently; within a range states arrive in
    /// increasing rank order.
    pub fn run<F>(&self, visit: F) -> Result<u64>
    where
        F: Fn(Rank, &SequenceState<O::Tally>) + Sync,
    {
        let threads = self.threads.resolve(self.ranges.len());
        debug!(ranges = self.ranges.len(), threads, mode = %self.threads, "Starting range sweep");

        let sweep = || -> Result<u64> {
            let counts: Vec<u64> = self
                .ranges
                .par_iter()
                .map(|range| self.sweep_range(range, &visit))
                .collect::<Result<_>>()?;
            Ok(counts.into_iter().sum())
        };

        let visited = match self.threads {
            ThreadCount::Auto => sweep()?,
            ThreadCount::Specific(_) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| RankError::ThreadPool(e.to_string()))?
                .install(sweep)?,
        };
        debug!(visited, "Range sweep finished");
        Ok(visited)
    }

    fn sweep_range<F>(&self, range: &SuffixRange, visit: &F) -> Result<u64>
    where
        F: Fn(Rank, &SequenceState<O::Tally>) + Sync,
    {
        let mut state = self.engine.acquire_state();
        if !range.first_position(self.engine, &mut state)? {
            return Ok(0);
        }
        trace!(start = range.start(), len = range.len(), "Sweeping range");
        let mut rank = range.start();
        loop {
            visit(rank, &state);
            rank += 1;
            if rank == range.end() {
                break;
            }
            if self.engine.step(&mut state, Direction::Forward).is_none() {
                return Err(RankError::InvalidState(format!(
                    "range ended early at rank {}",
                    rank
                )));
            }
        }
        Ok(range.len())
    }
}
