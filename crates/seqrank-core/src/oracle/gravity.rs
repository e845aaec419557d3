//! Column-gravity boards in the style of connect-four.

use crate::error::{RankError, Result};
use crate::state::{DigitCounts, SequenceState};
use crate::Digit;

use super::{InvariantOracle, Memoized};

const EMPTY: Digit = 0;
const FIRST: Digit = 1;
const SECOND: Digit = 2;

// 3^40 < 2^64, so every count up to this size fits in a rank.
const MAX_CELLS: usize = 40;

/// A `width` x `height` board where pieces rest on the piece below.
///
/// Cell `(column, row)` lives at position `column * height + row`, with row
/// 0 at the bottom. Digits are 0 for an empty cell, 1 for the first player
/// and 2 for the second. A board is valid when no piece floats over an
/// empty cell and the first player has placed as many pieces as the second,
/// or one more.
///
/// The suffix is assigned from the top of the last column downwards, so
/// the only constraint carried into the unassigned prefix is whether the
/// cell just assigned holds a piece that needs support.
///
/// # Example
///
/// ```
/// use seqrank_core::oracle::{ColumnGravity, CountingOracle};
/// use seqrank_core::state::SequenceState;
/// use std::sync::Arc;
///
/// let board = ColumnGravity::new(2, 2).unwrap();
/// let radices: Arc<[i32]> = Arc::from(board.radices());
/// let oracle = board.memoized();
/// let state = SequenceState::new(radices.clone(), oracle.new_tally(&radices));
/// // Boards holding zero, one, two, three and four pieces.
/// assert_eq!(oracle.completions(&state), 1 + 2 + 6 + 6 + 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnGravity {
    width: usize,
    height: usize,
}

impl ColumnGravity {
    /// Creates a board.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::EmptyLayout`] for a zero dimension and
    /// [`RankError::CountOverflow`] for boards of more than 40 cells.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RankError::EmptyLayout);
        }
        if width * height > MAX_CELLS {
            return Err(RankError::CountOverflow);
        }
        Ok(Self { width, height })
    }

    /// Board width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn num_elements(&self) -> usize {
        self.width * self.height
    }

    /// Position of a cell.
    #[inline]
    pub fn position(&self, column: usize, row: usize) -> usize {
        column * self.height + row
    }

    /// Digit bases for an engine over this board.
    pub fn radices(&self) -> Vec<Digit> {
        vec![3; self.num_elements()]
    }

    /// Whether an assigned empty cell sits under an assigned piece.
    fn has_floating_piece(&self, state: &SequenceState<DigitCounts>) -> bool {
        let n = self.num_elements();
        (state.cursor()..n.saturating_sub(1)).any(|position| {
            position % self.height + 1 < self.height
                && state.get(position) == EMPTY
                && state.get(position + 1) != EMPTY
        })
    }

    /// Wraps the board in a memoizing counting oracle.
    pub fn memoized(self) -> Memoized<Self> {
        let n = self.num_elements();
        Memoized::new(self, n)
    }
}

impl InvariantOracle for ColumnGravity {
    type Tally = DigitCounts;

    fn new_tally(&self, radices: &[Digit]) -> DigitCounts {
        DigitCounts::new(3, radices.len())
    }

    fn num_invariants(&self, _cursor: usize) -> usize {
        let n = self.num_elements() + 1;
        n * n * 2
    }

    fn invariant(&self, state: &SequenceState<DigitCounts>) -> Option<usize> {
        if state.is_empty() {
            return Some(0);
        }
        let position = state.cursor();
        if self.has_floating_piece(state) {
            return None;
        }
        let digit = state.get(position);
        let row = position % self.height;
        let needs_support = digit != EMPTY && row > 0;
        let tally = state.tally();
        let first = tally.count(FIRST);
        let second = tally.count(SECOND);
        Some(((first * (self.num_elements() + 1)) + second) * 2 + usize::from(needs_support))
    }

    fn is_valid(&self, state: &SequenceState<DigitCounts>) -> bool {
        if !state.is_complete() {
            return false;
        }
        let mut first = 0usize;
        let mut second = 0usize;
        for column in 0..self.width {
            for row in 0..self.height {
                let digit = state.get(self.position(column, row));
                match digit {
                    EMPTY => {}
                    FIRST => first += 1,
                    SECOND => second += 1,
                    _ => return false,
                }
                if digit != EMPTY && row > 0 && state.get(self.position(column, row - 1)) == EMPTY {
                    return false;
                }
            }
        }
        first == second || first == second + 1
    }
}
