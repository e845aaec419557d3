//! seqrank - dense ranking of constrained digit sequences
//!
//! Plug in a counting oracle describing which fixed-length digit sequences
//! are valid and get a bijection between those sequences and
//! `[0, total_positions)`, together with in-order stepping, incremental
//! move deltas and parallel sweeps.
//!
//! # Example
//!
//! ```rust
//! use seqrank::prelude::*;
//!
//! // Two blanks (digit 0), four X (1) and three O (2) on a 3x3 board.
//! let engine = RankingEngine::piece_count(&[2, 4, 3]).unwrap();
//! assert_eq!(engine.total_positions(), 1260);
//!
//! let mut state = engine.blank_state();
//! engine.unhash(700, &mut state).unwrap();
//! assert_eq!(engine.hash(&state).unwrap(), 700);
//! ```

pub use seqrank_core::{
    engine, oracle, r#move, range, state, tracker, ChildTracker, Change, ColumnGravity,
    CountingOracle, Digit, DigitCounts, Direction, InvariantOracle, Memoized, MixedRadix, Move,
    PieceCount, PooledState, Rank, RankCache, RankError, RankingEngine, RangeSweep, Result,
    SequenceState, SuffixRange, Tally,
};

pub use seqrank_config::{
    ConfigError, EngineConfig, PartitionConfig, PoolConfig, ThreadCount, ValidationMode,
};

pub mod logging;

pub mod prelude {
    pub use seqrank_core::prelude::*;
    pub use seqrank_config::{EngineConfig, ThreadCount, ValidationMode};
}
