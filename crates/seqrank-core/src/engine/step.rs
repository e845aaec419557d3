//! In-order stepping.

use crate::oracle::CountingOracle;
use crate::r#move::Move;
use crate::state::{Direction, SequenceState};
use crate::Rank;

use super::RankingEngine;

impl<O: CountingOracle> RankingEngine<O> {
    /// Moves `state` to its successor (or predecessor) in rank order.
    ///
    /// Works on any non-empty state: positions below the cursor stay
    /// unassigned and the assigned suffix steps through the suffixes that
    /// have completions. Returns the lowest position whose digit is
    /// unchanged (every position from there up is untouched), or `None`
    /// with `state` untouched when there is nothing further in that
    /// direction.
    pub fn step(&self, state: &mut SequenceState<O::Tally>, direction: Direction) -> Option<usize> {
        if state.is_empty() {
            return None;
        }
        let floor = state.cursor();
        let before = self.strict_rank(state);

        let changed = match self.advance_suffix(state, direction, None) {
            Some(changed) => changed,
            None => {
                self.extend_to(state, direction.reverse(), floor);
                return None;
            }
        };
        self.extend_to(state, direction, floor);

        if let Some(before) = before {
            let after = self.rank_below(state, state.len());
            let expected = match direction {
                Direction::Forward => before.checked_add(1),
                Direction::Backward => before.checked_sub(1),
            };
            if expected != Some(after) {
                self.violation("step did not move exactly one rank", state);
            }
            if !state.tally_consistent() {
                self.violation("tally drifted while stepping", state);
            }
        }
        Some(changed + 1)
    }

    /// Jumps to the first state (or, backwards, the last state) whose digits
    /// at positions `>= min_change` differ from the current ones.
    ///
    /// Returns the signed rank change, or `None` with `state` untouched
    /// when no such state exists.
    pub fn skip_suffix(
        &self,
        state: &mut SequenceState<O::Tally>,
        direction: Direction,
        min_change: usize,
    ) -> Option<i64> {
        self.skip_from(state, direction, min_change)
            .map(|(_, delta)| delta)
    }

    /// Advances `state` to the first state at or after it that `mv` applies
    /// to, changing only positions below `cutoff`.
    ///
    /// Returns the rank change, or `None` with `state` untouched when that
    /// state would differ at `cutoff` or above, or does not exist.
    pub fn step_to_match(
        &self,
        state: &mut SequenceState<O::Tally>,
        mv: &Move,
        cutoff: usize,
    ) -> Option<i64> {
        debug_assert!(state.is_complete());
        let mut saved = self.scratch.acquire();
        saved.copy_from(state);

        let mut delta = 0i64;
        while let Some(position) = mv.last_mismatch(state) {
            // With a larger digit than wanted, nothing sharing the suffix
            // above `position` can match.
            let min_change = if state.get(position) > mv.expected_at(position).unwrap_or_default() {
                position + 1
            } else {
                position
            };
            let skipped = if min_change < cutoff {
                self.skip_from(state, Direction::Forward, min_change)
            } else {
                None
            };
            match skipped {
                Some((changed, step)) if changed < cutoff => delta += step,
                _ => {
                    state.copy_from(&*saved);
                    return None;
                }
            }
        }
        Some(delta)
    }

    pub(crate) fn skip_from(
        &self,
        state: &mut SequenceState<O::Tally>,
        direction: Direction,
        min_change: usize,
    ) -> Option<(usize, i64)> {
        debug_assert!(state.is_complete());
        if min_change >= state.len() {
            return None;
        }
        let mut delta = 0i64;
        while state.cursor() < min_change {
            delta -= self.sig_value(state) as i64;
            state.truncate();
        }
        match self.advance_suffix(state, direction, Some(&mut delta)) {
            Some(changed) => {
                while !state.is_complete() {
                    if !self.add_valid(state, direction) {
                        self.violation("suffix with completions has no valid extension", state);
                    }
                    delta += self.sig_value(state) as i64;
                }
                Some((changed, delta))
            }
            None => {
                self.extend_to(state, direction.reverse(), min_change);
                while !state.is_complete() {
                    state.push_stored();
                }
                None
            }
        }
    }

    /// Odometer over the assigned suffix.
    ///
    /// Bumps the cursor digit until the suffix has completions, truncating
    /// and carrying outward on overflow. Positions truncated on the way are
    /// left unassigned. Returns the position that accepted the bump, or
    /// `None` with the state empty once every suffix is exhausted.
    fn advance_suffix(
        &self,
        state: &mut SequenceState<O::Tally>,
        direction: Direction,
        mut delta: Option<&mut i64>,
    ) -> Option<usize> {
        while !state.is_empty() {
            if let Some(delta) = delta.as_deref_mut() {
                *delta -= self.sig_value(state) as i64;
            }
            while state.bump(direction) {
                if self.completions(state) > 0 {
                    if let Some(delta) = delta.as_deref_mut() {
                        *delta += self.sig_value(state) as i64;
                    }
                    return Some(state.cursor());
                }
            }
            state.truncate();
        }
        None
    }

    /// Rank of a complete state when strict checks need it.
    fn strict_rank(&self, state: &SequenceState<O::Tally>) -> Option<Rank> {
        if !self.strict || !state.is_complete() {
            return None;
        }
        if self.check_valid(state).is_err() {
            self.violation("stepping from an invalid state", state);
        }
        Some(self.rank_below(state, state.len()))
    }
}
