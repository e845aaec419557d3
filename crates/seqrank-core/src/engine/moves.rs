//! Move application and incremental re-ranking.

use crate::error::{RankError, Result};
use crate::oracle::CountingOracle;
use crate::r#move::{Change, Move};
use crate::state::{Direction, SequenceState};
use crate::Digit;

use super::RankingEngine;

impl<O: CountingOracle> RankingEngine<O> {
    /// Writes `parent` with `mv` applied into `child`.
    ///
    /// `parent` may be partially assigned as long as every position the
    /// move touches is assigned.
    ///
    /// # Errors
    ///
    /// [`RankError::MoveMismatch`] if `parent` does not hold the digits the
    /// move expects, [`RankError::InvalidMove`] for positions or digits
    /// outside the layout, and [`RankError::InvalidState`] if the result
    /// has no valid completion.
    pub fn apply_move(
        &self,
        parent: &SequenceState<O::Tally>,
        mv: &Move,
        child: &mut SequenceState<O::Tally>,
    ) -> Result<()> {
        self.check_layout(parent)?;
        self.check_layout(child)?;
        self.check_move(mv)?;
        mv.check_applies(parent)?;

        child.copy_from(parent);
        for change in mv.changes() {
            child.replace(change.position, change.to);
        }
        if self.completions(child) == 0 {
            return Err(RankError::InvalidState(format!(
                "{} applied to {} gives invalid {}",
                mv, parent, child
            )));
        }
        Ok(())
    }

    /// Applies `mv` to `state` in place, leaving it untouched on error.
    pub fn apply_move_in_place(&self, state: &mut SequenceState<O::Tally>, mv: &Move) -> Result<()> {
        self.check_layout(state)?;
        self.check_move(mv)?;
        mv.check_applies(state)?;

        for change in mv.changes() {
            state.replace(change.position, change.to);
        }
        if self.completions(state) == 0 {
            for change in mv.changes() {
                state.replace(change.position, change.from);
            }
            return Err(RankError::InvalidState(format!(
                "{} leaves {} without completions",
                mv, state
            )));
        }
        Ok(())
    }

    /// Lowest position where `state` disagrees with what `mv` expects.
    #[inline]
    pub fn match_position(&self, mv: &Move, state: &SequenceState<O::Tally>) -> Option<usize> {
        mv.first_mismatch(state)
    }

    /// Signed rank change caused by applying `mv` to the complete `state`.
    ///
    /// `Forward` applies the move's `from -> to` edits, `Backward` the
    /// reverse edits. `state` is left as it was.
    pub fn incremental_delta(
        &self,
        state: &SequenceState<O::Tally>,
        mv: &Move,
        direction: Direction,
    ) -> Result<i64> {
        let mut scratch = self.scratch.acquire();
        scratch.copy_from(state);
        self.apply_move_with_delta(&mut scratch, mv, direction)
    }

    /// Applies `mv` to the complete `state` and returns the rank change.
    ///
    /// Only the positions up to the move's highest edit are re-ranked.
    /// On error `state` is left as it was.
    pub fn apply_move_with_delta(
        &self,
        state: &mut SequenceState<O::Tally>,
        mv: &Move,
        direction: Direction,
    ) -> Result<i64> {
        self.check_valid(state)?;
        let edits = match direction {
            Direction::Forward => mv.clone(),
            Direction::Backward => mv.reversed(),
        };
        self.check_move(&edits)?;
        edits.check_applies(state)?;
        let before = self.strict.then(|| self.rank_below(state, state.len()));

        let top = edits.max_position();
        let mut delta = 0i64;
        while state.cursor() <= top {
            delta -= self.sig_value(state) as i64;
            state.truncate();
        }
        self.rewrite_below_cursor(state, edits.changes(), |c| c.to);
        while !state.is_complete() {
            state.push_stored();
            delta += self.sig_value(state) as i64;
        }

        if self.completions(state) != 1 {
            state.truncate_to(top + 1);
            self.rewrite_below_cursor(state, edits.changes(), |c| c.from);
            while !state.is_complete() {
                state.push_stored();
            }
            return Err(RankError::InvalidState(format!(
                "{} leaves {} invalid",
                edits, state
            )));
        }

        if let Some(before) = before {
            let after = self.rank_below(state, state.len());
            if after as i64 - before as i64 != delta {
                self.violation("incremental delta disagrees with full re-rank", state);
            }
        }
        Ok(delta)
    }

    /// Checks positions and target digits against the layout.
    pub(crate) fn check_move(&self, mv: &Move) -> Result<()> {
        mv.check_bounds(self.num_elements())?;
        for change in mv.changes() {
            let radix = self.radix(change.position);
            if change.to < 0 || change.to >= radix {
                return Err(RankError::InvalidMove(format!(
                    "digit {} at position {} is outside [0, {})",
                    change.to, change.position, radix
                )));
            }
        }
        Ok(())
    }

    fn rewrite_below_cursor(
        &self,
        state: &mut SequenceState<O::Tally>,
        changes: &[Change],
        digit: impl Fn(&Change) -> Digit,
    ) {
        for change in changes {
            debug_assert!(change.position < state.cursor());
            state.replace(change.position, digit(change));
        }
    }
}
