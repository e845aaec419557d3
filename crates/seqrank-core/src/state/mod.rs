//! Mutable fixed-length digit sequences with an assignment cursor.
//!
//! A [`SequenceState`] is a reusable buffer: positions `[cursor, len)` are
//! assigned (the suffix), positions `[0, cursor)` are unassigned (the
//! prefix). The ranking engine extends and truncates the suffix one position
//! at a time, so every operation here is O(1) apart from bulk copies.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use seqrank_core::state::SequenceState;
//!
//! let radices: Arc<[i32]> = Arc::from(vec![3, 3, 3]);
//! let mut state = SequenceState::new(radices, ());
//! assert!(state.is_empty());
//!
//! state.push(2); // position 2
//! state.push(0); // position 1
//! assert_eq!(state.cursor(), 1);
//! assert_eq!(state.assigned(), &[0, 2]);
//! assert_eq!(state.to_string(), "[*, 0, 2]");
//! ```

mod tally;


pub use tally::{DigitCounts, Tally};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{RankError, Result};
use crate::Digit;

/// Stepping direction through rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards higher ranks.
    Forward,
    /// Towards lower ranks.
    Backward,
}

impl Direction {
    /// The digit increment for this direction.
    #[inline]
    pub fn delta(self) -> Digit {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Whether fresh positions start at the top of their digit range.
    ///
    /// Stepping forward re-extends with the lowest valid digit, stepping
    /// backward with the highest.
    #[inline]
    pub fn starts_high(self) -> bool {
        self == Direction::Backward
    }

    /// The opposite direction.
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// A fixed-length digit sequence with an unassigned prefix.
///
/// Digit bases are shared with the owning engine through an `Arc`; only
/// the digit buffer, the cursor and the tally belong to the state.
///
/// While stepping, the digit at the cursor may transiently sit one past its
/// range (`radix` or `-1`). Such sentinels are never reported to the tally.
#[derive(Debug, Clone)]
pub struct SequenceState<T = ()> {
    digits: Box<[Digit]>,
    radices: Arc<[Digit]>,
    cursor: usize,
    tally: T,
}

impl<T: Tally> SequenceState<T> {
    /// Creates an empty state over the given digit bases.
    pub fn new(radices: Arc<[Digit]>, tally: T) -> Self {
        let len = radices.len();
        let mut state = Self {
            digits: vec![0; len].into_boxed_slice(),
            radices,
            cursor: len,
            tally,
        };
        state.tally.reset();
        state
    }

    /// Sequence length.
    #[inline]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Lowest assigned position; equals `len()` when empty.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when no position is assigned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == self.digits.len()
    }

    /// True when every position is assigned.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.cursor == 0
    }

    /// Exclusive upper bound for the digit at `position`.
    #[inline]
    pub fn radix(&self, position: usize) -> Digit {
        self.radices[position]
    }

    /// All digit bases.
    pub fn radices(&self) -> &Arc<[Digit]> {
        &self.radices
    }

    /// The tally of the assigned suffix.
    #[inline]
    pub fn tally(&self) -> &T {
        &self.tally
    }

    /// Digit at an assigned position.
    #[inline]
    pub fn get(&self, position: usize) -> Digit {
        debug_assert!(
            position >= self.cursor,
            "position {} is unassigned (cursor {})",
            position,
            self.cursor
        );
        self.digits[position]
    }

    /// Digit at an assigned position, or `None` if unassigned or out of bounds.
    pub fn try_get(&self, position: usize) -> Option<Digit> {
        if position >= self.cursor && position < self.digits.len() {
            Some(self.digits[position])
        } else {
            None
        }
    }

    /// The assigned suffix, lowest position first.
    #[inline]
    pub fn assigned(&self) -> &[Digit] {
        &self.digits[self.cursor..]
    }

    /// The full digit buffer, position 0 first.
    #[inline]
    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    /// Copies the full digit buffer into a new vector.
    ///
    /// Only meaningful for complete states; unassigned positions hold
    /// whatever was last written there.
    pub fn to_vec(&self) -> Vec<Digit> {
        self.digits.to_vec()
    }

    /// Digit at the cursor.
    #[inline]
    pub fn least_significant(&self) -> Digit {
        debug_assert!(!self.is_empty());
        self.digits[self.cursor]
    }

    /// True when the state is empty or its cursor digit is in range.
    #[inline]
    pub fn lsd_in_range(&self) -> bool {
        self.is_empty() || self.in_range(self.cursor, self.digits[self.cursor])
    }

    #[inline]
    fn in_range(&self, position: usize, digit: Digit) -> bool {
        digit >= 0 && digit < self.radices[position]
    }

    /// Unassigns every position.
    pub fn clear(&mut self) {
        self.cursor = self.digits.len();
        self.tally.reset();
    }

    /// Assigns `digit` to the position just below the cursor.
    #[inline]
    pub fn push(&mut self, digit: Digit) {
        debug_assert!(self.cursor > 0, "state is already complete");
        self.cursor -= 1;
        self.digits[self.cursor] = digit;
        if self.in_range(self.cursor, digit) {
            self.tally.assign(self.cursor, digit);
        }
    }

    /// Assigns the lowest (or highest) digit of the next position.
    #[inline]
    pub fn push_extremal(&mut self, high: bool) {
        let digit = if high {
            self.radices[self.cursor - 1] - 1
        } else {
            0
        };
        self.push(digit);
    }

    /// Re-assigns the next position with the digit already in the buffer.
    ///
    /// Used after [`truncate`](Self::truncate) to walk back over digits that
    /// were unassigned but not overwritten.
    #[inline]
    pub fn push_stored(&mut self) {
        let digit = self.digits[self.cursor - 1];
        self.push(digit);
    }

    /// Unassigns the position at the cursor.
    #[inline]
    pub fn truncate(&mut self) {
        debug_assert!(!self.is_empty(), "state is already empty");
        let digit = self.digits[self.cursor];
        if self.in_range(self.cursor, digit) {
            self.tally.unassign(self.cursor, digit);
        }
        self.cursor += 1;
    }

    /// Unassigns every position below `position`.
    pub fn truncate_to(&mut self, position: usize) {
        debug_assert!(self.cursor <= position && position <= self.digits.len());
        while self.cursor < position {
            self.truncate();
        }
    }

    /// Moves the cursor digit one step in `direction`.
    ///
    /// Returns whether the new digit is still in `[0, radix)`. On `false` the
    /// digit is left as an overflow sentinel and must be truncated or reset
    /// before any other use.
    #[inline]
    pub fn bump(&mut self, direction: Direction) -> bool {
        let position = self.cursor;
        let old = self.digits[position];
        if self.in_range(position, old) {
            self.tally.unassign(position, old);
        }
        let new = old + direction.delta();
        self.digits[position] = new;
        if self.in_range(position, new) {
            self.tally.assign(position, new);
            true
        } else {
            false
        }
    }

    /// Resets the cursor digit to the bottom (or top) of its range.
    pub fn reset_least_significant(&mut self, high: bool) {
        let position = self.cursor;
        let digit = if high { self.radices[position] - 1 } else { 0 };
        self.replace(position, digit);
    }

    /// Overwrites the digit at any position, keeping the tally in step for
    /// assigned positions.
    pub fn replace(&mut self, position: usize, digit: Digit) {
        if position >= self.cursor {
            let old = self.digits[position];
            if self.in_range(position, old) {
                self.tally.unassign(position, old);
            }
            if self.in_range(position, digit) {
                self.tally.assign(position, digit);
            }
        }
        self.digits[position] = digit;
    }

    /// Makes this state an exact copy of `other`'s assigned suffix.
    ///
    /// The digit bases and the tally type of `self` are kept; only digits and
    /// cursor are taken from `other`. The tally is rebuilt from scratch.
    pub fn copy_from<U: Tally>(&mut self, other: &SequenceState<U>) {
        debug_assert_eq!(self.len(), other.len());
        let cursor = other.cursor;
        self.digits[cursor..].copy_from_slice(&other.digits[cursor..]);
        self.cursor = cursor;
        self.rebuild_tally();
    }

    /// Copies positions `[0, upto)` of a complete `other` into this complete
    /// state, leaving positions at or above `upto` alone.
    pub fn copy_prefix_from<U: Tally>(&mut self, other: &SequenceState<U>, upto: usize) {
        debug_assert!(self.is_complete() && other.is_complete());
        for position in 0..upto {
            let digit = other.digits[position];
            if self.digits[position] != digit {
                self.replace(position, digit);
            }
        }
    }

    /// Assigns every position from a digit slice.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::LengthMismatch`] for a slice of the wrong length.
    pub fn assign_all(&mut self, digits: &[Digit]) -> Result<()> {
        if digits.len() != self.len() {
            return Err(RankError::LengthMismatch {
                expected: self.len(),
                actual: digits.len(),
            });
        }
        self.digits.copy_from_slice(digits);
        self.cursor = 0;
        self.rebuild_tally();
        Ok(())
    }

    /// Returns true if every digit at or above `from` is assigned in both
    /// states and equal.
    pub fn matches_from<U: Tally>(&self, other: &SequenceState<U>, from: usize) -> bool {
        self.len() == other.len()
            && self.cursor <= from
            && other.cursor <= from
            && self.digits[from..] == other.digits[from..]
    }

    /// Checks that every assigned digit is within its range.
    pub fn digits_in_range(&self) -> bool {
        (self.cursor..self.len()).all(|p| self.in_range(p, self.digits[p]))
    }

    /// Recomputes the tally from the assigned suffix.
    pub fn rebuild_tally(&mut self) {
        self.tally.reset();
        for position in self.cursor..self.digits.len() {
            let digit = self.digits[position];
            if self.in_range(position, digit) {
                self.tally.assign(position, digit);
            }
        }
    }

    /// Returns true if the incrementally maintained tally equals a fresh
    /// rebuild.
    pub fn tally_consistent(&self) -> bool {
        let mut fresh = self.clone();
        fresh.rebuild_tally();
        fresh.tally == self.tally
    }
}

impl<T> PartialEq for SequenceState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cursor == other.cursor && self.digits[self.cursor..] == other.digits[other.cursor..]
    }
}

impl<T> Eq for SequenceState<T> {}

impl<T> Hash for SequenceState<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cursor.hash(state);
        self.digits[self.cursor..].hash(state);
    }
}

/// Orders states by their assigned suffix, most significant position first.
///
/// When one suffix is a proper extension of the other, the shorter suffix
/// sorts first. For complete states this is rank order under the
/// always-valid oracle.
impl<T> Ord for SequenceState<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| {
                let floor = self.cursor.max(other.cursor);
                for position in (floor..self.digits.len()).rev() {
                    match self.digits[position].cmp(&other.digits[position]) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                other.cursor.cmp(&self.cursor)
            })
    }
}

impl<T> PartialOrd for SequenceState<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> fmt::Display for SequenceState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for position in 0..self.digits.len() {
            if position > 0 {
                write!(f, ", ")?;
            }
            if position < self.cursor {
                write!(f, "*")?;
            } else {
                write!(f, "{}", self.digits[position])?;
            }
        }
        write!(f, "]")
    }
}
