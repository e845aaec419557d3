//! Counting oracles - the single game-specific hook of the ranking engine.
//!
//! An oracle answers one question: given a state whose low positions are
//! unassigned, in how many ways can those positions be filled so that the
//! whole sequence is valid? Every engine algorithm (rank, unrank, stepping,
//! move deltas) is expressed purely in terms of this count plus digit-range
//! arithmetic.
//!
//! # Contract
//!
//! - On a complete state the count is 1 for a valid sequence, 0 otherwise.
//! - If a suffix has no valid completion, neither has any extension of it.
//! - The count depends only on the assigned suffix (and the tally, which is
//!   itself a function of the suffix), never on unassigned buffer contents.
//! - The engine never calls the oracle when the cursor digit is out of
//!   range; such states count as 0.
//!
//! # Example
//!
//! ```
//! use seqrank_core::oracle::{from_fn, CountingOracle};
//! use seqrank_core::state::SequenceState;
//! use std::sync::Arc;
//!
//! // Binary strings containing at most one 1.
//! let oracle = from_fn(|s: &SequenceState| {
//!     match s.assigned().iter().filter(|&&d| d == 1).count() {
//!         0 => s.cursor() as u64 + 1,
//!         1 => 1,
//!         _ => 0,
//!     }
//! });
//!
//! let mut state = SequenceState::new(Arc::from(vec![2, 2, 2]), ());
//! state.push(0);
//! assert_eq!(oracle.completions(&state), 3);
//! state.push(1);
//! assert_eq!(oracle.completions(&state), 1);
//! ```

mod gravity;
mod invariant;
mod mixed_radix;
mod piece_count;


pub use gravity::ColumnGravity;
pub use invariant::{InvariantOracle, Memoized};
pub use mixed_radix::MixedRadix;
pub use piece_count::PieceCount;

use std::sync::Arc;

use crate::state::{SequenceState, Tally};
use crate::Digit;

/// Counts the valid completions of a partially assigned sequence.
///
/// This is the entire surface a game must implement (together with its
/// digit bases) to plug into the engine.
pub trait CountingOracle: Send + Sync {
    /// Auxiliary per-state summary the oracle reads.
    type Tally: Tally;

    /// Creates an empty tally for a sequence with these digit bases.
    fn new_tally(&self, radices: &[Digit]) -> Self::Tally;

    /// Number of ways to fill the unassigned prefix validly.
    fn completions(&self, state: &SequenceState<Self::Tally>) -> u64;

    /// Independent validity check of a complete state.
    ///
    /// Strict validation compares this against `completions`. Override it
    /// with a from-scratch check when `completions` relies on shortcuts.
    fn validate_complete(&self, state: &SequenceState<Self::Tally>) -> bool {
        self.completions(state) == 1
    }
}

impl<O: CountingOracle + ?Sized> CountingOracle for Box<O> {
    type Tally = O::Tally;

    fn new_tally(&self, radices: &[Digit]) -> Self::Tally {
        (**self).new_tally(radices)
    }

    fn completions(&self, state: &SequenceState<Self::Tally>) -> u64 {
        (**self).completions(state)
    }

    fn validate_complete(&self, state: &SequenceState<Self::Tally>) -> bool {
        (**self).validate_complete(state)
    }
}

impl<O: CountingOracle + ?Sized> CountingOracle for Arc<O> {
    type Tally = O::Tally;

    fn new_tally(&self, radices: &[Digit]) -> Self::Tally {
        (**self).new_tally(radices)
    }

    fn completions(&self, state: &SequenceState<Self::Tally>) -> u64 {
        (**self).completions(state)
    }

    fn validate_complete(&self, state: &SequenceState<Self::Tally>) -> bool {
        (**self).validate_complete(state)
    }
}

/// An oracle backed by a plain closure over tally-free states.
pub struct FnOracle<F> {
    count: F,
}

/// Wraps a closure as a [`CountingOracle`].
pub fn from_fn<F>(count: F) -> FnOracle<F>
where
    F: Fn(&SequenceState) -> u64 + Send + Sync,
{
    FnOracle { count }
}

impl<F> CountingOracle for FnOracle<F>
where
    F: Fn(&SequenceState) -> u64 + Send + Sync,
{
    type Tally = ();

    fn new_tally(&self, _radices: &[Digit]) -> Self::Tally {}

    fn completions(&self, state: &SequenceState) -> u64 {
        (self.count)(state)
    }
}

impl<F> std::fmt::Debug for FnOracle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOracle").finish_non_exhaustive()
    }
}
