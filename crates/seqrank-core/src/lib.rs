//! seqrank core - dense ranking of constrained digit sequences
//!
//! This crate maps every fixed-length digit sequence accepted by a
//! pluggable validity rule onto a contiguous rank range and back:
//! - [`state`]: reusable digit buffers with an assignment cursor
//! - `move`: sparse edits describing one game transition
//! - [`oracle`]: the counting contract and bundled oracles
//! - [`engine`]: rank, unrank, stepping and incremental move deltas
//! - [`range`]: suffix partitioning and parallel sweeps
//! - [`tracker`]: child ranks maintained while walking parents

pub mod engine;
pub mod error;
pub mod oracle;
pub mod r#move;
pub mod range;
pub mod state;
pub mod tracker;

#[cfg(test)]
mod test_utils;

/// A digit value.
pub type Digit = i32;

/// A rank in `[0, total_positions)`.
pub type Rank = u64;

pub use engine::{PooledState, RankCache, RankingEngine};
pub use error::{RankError, Result};
pub use oracle::{
    ColumnGravity, CountingOracle, InvariantOracle, Memoized, MixedRadix, PieceCount,
};
pub use r#move::{Change, Move};
pub use range::{RangeSweep, SuffixRange};
pub use state::{DigitCounts, Direction, SequenceState, Tally};
pub use tracker::ChildTracker;

/// Common imports.
pub mod prelude {
    pub use crate::engine::RankingEngine;
    pub use crate::error::{RankError, Result};
    pub use crate::oracle::{CountingOracle, MixedRadix, PieceCount};
    pub use crate::r#move::{Change, Move};
    pub use crate::range::{RangeSweep, SuffixRange};
    pub use crate::state::{Direction, SequenceState};
    pub use crate::tracker::ChildTracker;
    pub use crate::{Digit, Rank};
}
