//! Move descriptors - sparse edits describing one game transition.
//!
//! A [`Move`] lists exactly the positions a transition touches, each with the
//! digit it expects to find there and the digit it writes. Positions not
//! listed are unchanged. Moves are immutable and engine-agnostic; any number
//! of states may read the same move concurrently.
//!
//! # Example
//!
//! ```
//! use seqrank_core::r#move::{Change, Move};
//!
//! // Drop a piece into cell 4 and flip the turn marker at cell 9.
//! let mv = Move::from_triples(&[(9, 0, 1), (4, 0, 2)]).unwrap();
//! assert_eq!(mv.min_position(), 4);
//! assert_eq!(mv.max_position(), 9);
//! assert_eq!(mv.changes()[0], Change::new(4, 0, 2));
//! ```


use std::fmt;

use smallvec::SmallVec;

use crate::error::{RankError, Result};
use crate::state::{SequenceState, Tally};
use crate::Digit;

/// One edited position of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Change {
    /// Position in the sequence.
    pub position: usize,
    /// Digit the move expects to find.
    pub from: Digit,
    /// Digit the move writes.
    pub to: Digit,
}

impl Change {
    /// Creates a change.
    pub const fn new(position: usize, from: Digit, to: Digit) -> Self {
        Self { position, from, to }
    }

    /// The same position edited the other way round.
    pub const fn reversed(self) -> Self {
        Self {
            position: self.position,
            from: self.to,
            to: self.from,
        }
    }
}

/// An ordered set of position edits, sorted by position.
///
/// Most game transitions touch a handful of cells, so the changes live
/// inline up to four entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    changes: SmallVec<[Change; 4]>,
}

impl Move {
    /// Builds a move from changes in any order.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidMove`] if there are no changes or a
    /// position is listed twice.
    pub fn new(changes: impl IntoIterator<Item = Change>) -> Result<Self> {
        let mut changes: SmallVec<[Change; 4]> = changes.into_iter().collect();
        if changes.is_empty() {
            return Err(RankError::InvalidMove("move has no changes".to_string()));
        }
        changes.sort_by_key(|c| c.position);
        if let Some(pair) = changes.windows(2).find(|w| w[0].position == w[1].position) {
            return Err(RankError::InvalidMove(format!(
                "position {} listed twice",
                pair[0].position
            )));
        }
        Ok(Self { changes })
    }

    /// Builds a move from `(position, from, to)` triples.
    pub fn from_triples(triples: &[(usize, Digit, Digit)]) -> Result<Self> {
        Self::new(triples.iter().map(|&(p, f, t)| Change::new(p, f, t)))
    }

    /// A move that edits a single position.
    pub fn single(position: usize, from: Digit, to: Digit) -> Self {
        let mut changes = SmallVec::new();
        changes.push(Change::new(position, from, to));
        Self { changes }
    }

    /// The changes, lowest position first.
    #[inline]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Number of edited positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Always false; a move edits at least one position.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Lowest edited position.
    #[inline]
    pub fn min_position(&self) -> usize {
        self.changes[0].position
    }

    /// Highest edited position.
    #[inline]
    pub fn max_position(&self) -> usize {
        self.changes[self.changes.len() - 1].position
    }

    /// The digit the move expects at `position`, if it edits that position.
    pub fn expected_at(&self, position: usize) -> Option<Digit> {
        self.changes
            .iter()
            .find(|c| c.position == position)
            .map(|c| c.from)
    }

    /// The inverse move: writes every `from` digit back over `to`.
    pub fn reversed(&self) -> Self {
        Self {
            changes: self.changes.iter().map(|c| c.reversed()).collect(),
        }
    }

    /// Lowest position whose digit disagrees with what the move expects.
    ///
    /// Unassigned positions always disagree. `None` means the move applies.
    pub fn first_mismatch<T: Tally>(&self, state: &SequenceState<T>) -> Option<usize> {
        self.changes
            .iter()
            .find(|c| state.try_get(c.position) != Some(c.from))
            .map(|c| c.position)
    }

    /// Highest position whose digit disagrees with what the move expects.
    pub fn last_mismatch<T: Tally>(&self, state: &SequenceState<T>) -> Option<usize> {
        self.changes
            .iter()
            .rev()
            .find(|c| state.try_get(c.position) != Some(c.from))
            .map(|c| c.position)
    }

    /// True when every expected digit is present.
    #[inline]
    pub fn applies_to<T: Tally>(&self, state: &SequenceState<T>) -> bool {
        self.first_mismatch(state).is_none()
    }

    /// Checks that every position fits a sequence of `num_elements`.
    pub(crate) fn check_bounds(&self, num_elements: usize) -> Result<()> {
        if self.max_position() >= num_elements {
            return Err(RankError::InvalidMove(format!(
                "position {} is past the end of a {}-element sequence",
                self.max_position(),
                num_elements
            )));
        }
        Ok(())
    }

    /// Checks the move against `state`, reporting the lowest mismatch.
    pub(crate) fn check_applies<T: Tally>(&self, state: &SequenceState<T>) -> Result<()> {
        match self.first_mismatch(state) {
            None => Ok(()),
            Some(position) => Err(RankError::MoveMismatch {
                position,
                expected: self.expected_at(position).unwrap_or_default(),
                found: state.try_get(position).unwrap_or(-1),
            }),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.changes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}->{}", c.position, c.from, c.to)?;
        }
        write!(f, "]")
    }
}
