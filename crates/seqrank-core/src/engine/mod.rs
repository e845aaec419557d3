//! The ranking engine.
//!
//! [`RankingEngine`] maps every valid complete sequence onto a dense rank in
//! `[0, total_positions)` and back, using nothing but a [`CountingOracle`]
//! and the digit bases of each position. Position `N - 1` is the most
//! significant; ranks follow lexicographic order read from the top.
//!
//! # Example
//!
//! ```
//! use seqrank_core::prelude::*;
//!
//! // Two blanks (digit 0), four X (1) and three O (2) on a 3x3 board.
//! let engine = RankingEngine::piece_count(&[2, 4, 3]).unwrap();
//! assert_eq!(engine.total_positions(), 1260);
//!
//! let mut state = engine.blank_state();
//! engine.unhash(700, &mut state).unwrap();
//! assert_eq!(engine.hash(&state).unwrap(), 700);
//!
//! engine.step(&mut state, Direction::Forward).unwrap();
//! assert_eq!(engine.hash(&state).unwrap(), 701);
//! ```

mod moves;
mod pool;
mod rank;
mod step;

#[cfg(test)]
mod tests;

pub use pool::PooledState;
pub use rank::RankCache;

use std::fmt;
use std::sync::{Arc, OnceLock};

use seqrank_config::EngineConfig;
use tracing::{debug, error};

use crate::error::{RankError, Result};
use crate::oracle::{ColumnGravity, CountingOracle, Memoized, MixedRadix, PieceCount};
use crate::state::{Direction, SequenceState};
use crate::{Digit, Rank};

use pool::StatePool;

const DEFAULT_POOL_CAPACITY: usize = 16;
const DEFAULT_SCRATCH_CAPACITY: usize = 8;

/// Ranks, unranks and enumerates the valid sequences of one layout.
///
/// The engine itself holds no per-call mutable data apart from its two
/// state pools and the memoised total, so a single instance can be shared
/// by any number of threads as long as each thread mutates its own states.
pub struct RankingEngine<O: CountingOracle> {
    oracle: O,
    radices: Arc<[Digit]>,
    total: OnceLock<Rank>,
    strict: bool,
    states: StatePool<O::Tally>,
    scratch: StatePool<O::Tally>,
}

impl<O: CountingOracle> RankingEngine<O> {
    /// Creates an engine with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::EmptyLayout`] for zero positions and
    /// [`RankError::InvalidRadix`] for a digit base below 1.
    pub fn new(radices: impl Into<Vec<Digit>>, oracle: O) -> Result<Self> {
        Self::build(
            radices.into(),
            oracle,
            false,
            DEFAULT_POOL_CAPACITY,
            DEFAULT_SCRATCH_CAPACITY,
        )
    }

    /// Creates an engine from a configuration.
    pub fn with_config(
        radices: impl Into<Vec<Digit>>,
        oracle: O,
        config: &EngineConfig,
    ) -> Result<Self> {
        Self::build(
            radices.into(),
            oracle,
            config.is_strict(),
            config.pool.capacity,
            config.pool.scratch_capacity,
        )
    }

    fn build(
        radices: Vec<Digit>,
        oracle: O,
        strict: bool,
        capacity: usize,
        scratch_capacity: usize,
    ) -> Result<Self> {
        if radices.is_empty() {
            return Err(RankError::EmptyLayout);
        }
        if let Some((position, &radix)) = radices.iter().enumerate().find(|(_, r)| **r < 1) {
            return Err(RankError::InvalidRadix { position, radix });
        }
        let radices: Arc<[Digit]> = Arc::from(radices);
        let prototype = SequenceState::new(radices.clone(), oracle.new_tally(&radices));

        debug!(
            num_elements = radices.len(),
            strict, capacity, scratch_capacity, "Ranking engine built"
        );

        Ok(Self {
            states: StatePool::new(prototype.clone(), capacity),
            scratch: StatePool::new(prototype, scratch_capacity),
            oracle,
            radices,
            total: OnceLock::new(),
            strict,
        })
    }

    /// Switches strict validation on or off.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Sequence length.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.radices.len()
    }

    /// Digit base of a position.
    #[inline]
    pub fn radix(&self, position: usize) -> Digit {
        self.radices[position]
    }

    /// All digit bases.
    pub fn radices(&self) -> &Arc<[Digit]> {
        &self.radices
    }

    /// The counting oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Whether strict validation is on.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// A freshly allocated empty state.
    pub fn blank_state(&self) -> SequenceState<O::Tally> {
        SequenceState::new(self.radices.clone(), self.oracle.new_tally(&self.radices))
    }

    /// A complete state holding `digits`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::LengthMismatch`] for a slice of the wrong length
    /// and [`RankError::InvalidState`] if the digits are out of range or
    /// rejected by the oracle.
    pub fn state_from_digits(&self, digits: &[Digit]) -> Result<SequenceState<O::Tally>> {
        let mut state = self.blank_state();
        state.assign_all(digits)?;
        self.check_valid(&state)?;
        Ok(state)
    }

    /// The lowest-ranked valid state.
    pub fn first_state(&self) -> Result<SequenceState<O::Tally>> {
        self.extremal_state(Direction::Forward)
    }

    /// The highest-ranked valid state.
    pub fn last_state(&self) -> Result<SequenceState<O::Tally>> {
        self.extremal_state(Direction::Backward)
    }

    fn extremal_state(&self, direction: Direction) -> Result<SequenceState<O::Tally>> {
        let mut state = self.blank_state();
        if self.total_positions() == 0 {
            return Err(RankError::EmptyDomain);
        }
        self.extend_to_complete(&mut state, direction);
        Ok(state)
    }

    /// Borrows a state from the general pool; it returns on drop.
    ///
    /// The state's contents are unspecified. Initialise it before reading.
    pub fn acquire_state(&self) -> PooledState<'_, O::Tally> {
        self.states.acquire()
    }

    /// Hands a detached state back to the general pool.
    pub fn release_state(&self, state: SequenceState<O::Tally>) {
        self.states.release(state);
    }

    /// Number of states idle in the general pool.
    pub fn pooled_states(&self) -> usize {
        self.states.available()
    }

    /// Upper bound of idle states kept by the general pool.
    pub fn pool_capacity(&self) -> usize {
        self.states.capacity()
    }

    /// Completions of `state`, or 0 without consulting the oracle when the
    /// cursor digit is out of range.
    pub fn completions(&self, state: &SequenceState<O::Tally>) -> u64 {
        if !state.lsd_in_range() {
            return 0;
        }
        let count = self.oracle.completions(state);
        if self.strict && state.is_complete() {
            if count > 1 {
                self.violation("complete state counted more than once", state);
            }
            if (count == 1) != self.oracle.validate_complete(state) {
                self.violation("oracle disagrees with its own validity check", state);
            }
        }
        count
    }

    /// Number of valid complete sequences. Computed on first use.
    pub fn total_positions(&self) -> Rank {
        *self.total.get_or_init(|| {
            let state = self.blank_state();
            let total = self.completions(&state);
            debug!(num_elements = self.num_elements(), total, "Total positions computed");
            total
        })
    }

    pub(crate) fn check_layout(&self, state: &SequenceState<O::Tally>) -> Result<()> {
        if state.len() != self.num_elements() {
            return Err(RankError::LengthMismatch {
                expected: self.num_elements(),
                actual: state.len(),
            });
        }
        Ok(())
    }

    /// Checks that `state` is a complete valid sequence of this layout.
    pub(crate) fn check_valid(&self, state: &SequenceState<O::Tally>) -> Result<()> {
        self.check_layout(state)?;
        if !state.is_complete() {
            return Err(RankError::IncompleteState {
                cursor: state.cursor(),
            });
        }
        if !state.digits_in_range() || self.completions(state) != 1 {
            return Err(RankError::InvalidState(format!(
                "{} is not a valid sequence",
                state
            )));
        }
        Ok(())
    }

    /// Sum of the completions of every lower digit at the cursor, holding
    /// the rest of the suffix fixed.
    pub(crate) fn sig_value(&self, state: &mut SequenceState<O::Tally>) -> Rank {
        let position = state.cursor();
        let digit = state.get(position);
        let mut sum = 0;
        for lower in 0..digit {
            state.replace(position, lower);
            sum += self.completions(state);
        }
        state.replace(position, digit);
        sum
    }

    /// Moves the cursor digit in `direction` until the suffix has
    /// completions. On `false` the digit is an overflow sentinel.
    fn inc_to_valid(&self, state: &mut SequenceState<O::Tally>, direction: Direction) -> bool {
        loop {
            if self.completions(state) > 0 {
                return true;
            }
            if !state.bump(direction) {
                return false;
            }
        }
    }

    /// Assigns the next position with its extremal valid digit.
    pub(crate) fn add_valid(&self, state: &mut SequenceState<O::Tally>, direction: Direction) -> bool {
        state.push_extremal(direction.starts_high());
        self.inc_to_valid(state, direction)
    }

    /// Extends a suffix that has completions down to a complete state,
    /// choosing extremal digits in `direction`.
    pub(crate) fn extend_to_complete(&self, state: &mut SequenceState<O::Tally>, direction: Direction) {
        self.extend_to(state, direction, 0);
    }

    pub(crate) fn extend_to(&self, state: &mut SequenceState<O::Tally>, direction: Direction, floor: usize) {
        while state.cursor() > floor {
            if !self.add_valid(state, direction) {
                self.violation("suffix with completions has no valid extension", state);
            }
        }
    }

    #[cold]
    pub(crate) fn violation<T>(&self, message: &str, state: &SequenceState<T>) -> ! {
        error!(state = %state, "{}", message);
        panic!("ranking invariant violated: {}: {}", message, state);
    }
}

impl RankingEngine<MixedRadix> {
    /// An engine over all digit sequences with the given bases.
    pub fn mixed_radix(radices: &[Digit]) -> Result<Self> {
        let oracle = MixedRadix::new(radices)?;
        Self::new(radices.to_vec(), oracle)
    }
}

impl RankingEngine<PieceCount> {
    /// An engine over arrangements of `counts[d]` copies of each digit `d`.
    pub fn piece_count(counts: &[usize]) -> Result<Self> {
        let oracle = PieceCount::new(counts)?;
        Self::new(oracle.radices(), oracle)
    }
}

impl RankingEngine<Memoized<ColumnGravity>> {
    /// An engine over `width` x `height` drop-style boards.
    pub fn column_gravity(width: usize, height: usize) -> Result<Self> {
        let board = ColumnGravity::new(width, height)?;
        Self::new(board.radices(), board.memoized())
    }
}

impl<O: CountingOracle + fmt::Debug> fmt::Debug for RankingEngine<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingEngine")
            .field("oracle", &self.oracle)
            .field("radices", &self.radices)
            .field("total", &self.total.get())
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
