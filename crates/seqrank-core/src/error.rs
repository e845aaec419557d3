//! Error types for seqrank

use thiserror::Error;

use crate::{Digit, Rank};

/// Main error type for ranking operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    /// A digit base below 1 was supplied at construction
    #[error("Invalid radix {radix} at position {position}")]
    InvalidRadix { position: usize, radix: Digit },

    /// The sequence layout has no positions
    #[error("Sequence layout must have at least one position")]
    EmptyLayout,

    /// A digit slice or state of the wrong length
    #[error("Length mismatch: expected {expected}, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Hash requested on a state with unassigned positions
    #[error("State is incomplete: positions below {cursor} are unassigned")]
    IncompleteState { cursor: usize },

    /// A complete state the counting oracle rejects
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Unhash requested for a rank outside `[0, total)`
    #[error("Rank {rank} out of range: only {total} positions")]
    RankOutOfRange { rank: Rank, total: Rank },

    /// The rank space is empty, so there is no state to produce
    #[error("No valid positions exist")]
    EmptyDomain,

    /// A move expected a different digit than the state holds
    #[error("Move expects digit {expected} at position {position}, found {found}")]
    MoveMismatch {
        position: usize,
        expected: Digit,
        found: Digit,
    },

    /// A malformed move
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// A completion count that does not fit in a rank
    #[error("Completion count overflows a 64-bit rank")]
    CountOverflow,

    /// A suffix range request with no fixed positions
    #[error("Suffix length must be at least 1")]
    EmptySuffix,

    /// A suffix range request longer than the sequence
    #[error("Suffix length {length} exceeds sequence length {num_elements}")]
    SuffixTooLong { length: usize, num_elements: usize },

    /// The worker pool for a parallel sweep could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type alias for ranking operations
pub type Result<T> = std::result::Result<T, RankError>;
