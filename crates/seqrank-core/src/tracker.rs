//! Incremental child ranks while walking parents in rank order.
//!
//! A solver sweeping parents forward usually needs the rank of every child
//! of every parent. Consecutive parents differ only in their low positions,
//! so [`ChildTracker`] keeps one cached child state and [`RankCache`] per
//! move and re-ranks only the positions that changed since that child was
//! last computed.

use tracing::trace;

use crate::engine::{RankCache, RankingEngine};
use crate::error::{RankError, Result};
use crate::oracle::CountingOracle;
use crate::r#move::Move;
use crate::state::{Direction, SequenceState};
use crate::{Digit, Rank};

struct ChildSlot<'e, O: CountingOracle> {
    engine: &'e RankingEngine<O>,
    mv: Move,
    state: SequenceState<O::Tally>,
    cache: RankCache,
    // Tick of the parent when `state` and `cache` were last brought up to
    // date, and the rank found then.
    computed: Option<(u64, Rank)>,
}

/// Walks parent states in rank order and ranks their children lazily.
///
/// # Example
///
/// ```
/// use seqrank_core::prelude::*;
///
/// let engine = RankingEngine::mixed_radix(&[2, 2, 2]).unwrap();
/// let flip_low = Move::single(0, 0, 1);
/// let mut tracker = ChildTracker::new(&engine, vec![flip_low]).unwrap();
///
/// assert_eq!(tracker.rank(), 0);
/// assert_eq!(tracker.child(0).unwrap(), Some(1));
/// tracker.advance();
/// assert_eq!(tracker.child(0).unwrap(), None);
/// ```
pub struct ChildTracker<'e, O: CountingOracle> {
    engine: &'e RankingEngine<O>,
    state: SequenceState<O::Tally>,
    rank: Rank,
    tick: u64,
    last_change: Vec<u64>,
    has_next: bool,
    children: Vec<ChildSlot<'e, O>>,
}

impl<'e, O: CountingOracle> ChildTracker<'e, O> {
    /// Tracks children produced by `moves`, ranked in the parent's engine.
    /// The parent starts at rank 0.
    pub fn new(engine: &'e RankingEngine<O>, moves: Vec<Move>) -> Result<Self> {
        let targets = moves.into_iter().map(|mv| (engine, mv)).collect();
        Self::with_child_engines(engine, targets)
    }

    /// Tracks children each ranked in its own engine, for games whose
    /// children live in a different tier.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::LengthMismatch`] when a child engine has another
    /// sequence length, [`RankError::InvalidMove`] for moves outside the
    /// child layout and [`RankError::EmptyDomain`] when the parent engine
    /// has no valid state.
    pub fn with_child_engines(
        engine: &'e RankingEngine<O>,
        targets: Vec<(&'e RankingEngine<O>, Move)>,
    ) -> Result<Self> {
        let n = engine.num_elements();
        let mut children = Vec::with_capacity(targets.len());
        for (child_engine, mv) in targets {
            if child_engine.num_elements() != n {
                return Err(RankError::LengthMismatch {
                    expected: n,
                    actual: child_engine.num_elements(),
                });
            }
            child_engine.check_move(&mv)?;
            children.push(ChildSlot {
                engine: child_engine,
                mv,
                state: child_engine.blank_state(),
                cache: RankCache::new(n),
                computed: None,
            });
        }

        Ok(Self {
            state: engine.first_state()?,
            engine,
            rank: 0,
            tick: 0,
            last_change: vec![0; n],
            has_next: true,
            children,
        })
    }

    /// Rank of the current parent.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// The current parent.
    pub fn state(&self) -> &SequenceState<O::Tally> {
        &self.state
    }

    /// Number of tracked moves.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Whether the last [`advance`](Self::advance) found a successor.
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Steps the parent to the next rank. Returns the lowest unchanged
    /// position, or `None` at the last rank.
    pub fn advance(&mut self) -> Option<usize> {
        match self.engine.step(&mut self.state, Direction::Forward) {
            Some(unchanged) => {
                self.rank += 1;
                self.mark_changed(unchanged);
                Some(unchanged)
            }
            None => {
                self.has_next = false;
                None
            }
        }
    }

    /// Moves the parent to `rank`.
    pub fn seek(&mut self, rank: Rank) -> Result<()> {
        self.engine.unhash(rank, &mut self.state)?;
        self.rank = rank;
        self.has_next = true;
        self.mark_changed(self.last_change.len());
        Ok(())
    }

    /// Moves the parent to the state holding `digits` and returns its rank.
    pub fn set_digits(&mut self, digits: &[Digit]) -> Result<Rank> {
        let state = self.engine.state_from_digits(digits)?;
        let rank = self.engine.hash(&state)?;
        self.state = state;
        self.rank = rank;
        self.has_next = true;
        self.mark_changed(self.last_change.len());
        Ok(rank)
    }

    /// Rank of the child reached by move `index`, or `None` if the move
    /// does not apply to the current parent.
    pub fn child(&mut self, index: usize) -> Result<Option<Rank>> {
        let Some(slot) = self.children.get_mut(index) else {
            return Err(RankError::InvalidMove(format!("no tracked move {}", index)));
        };
        if !slot.mv.applies_to(&self.state) {
            return Ok(None);
        }

        let unchanged_from = match slot.computed {
            Some((tick, rank)) => {
                let stale = self
                    .last_change
                    .iter()
                    .rposition(|&changed| changed > tick)
                    .map_or(0, |p| p + 1);
                if stale == 0 {
                    return Ok(Some(rank));
                }
                slot.state.copy_prefix_from(&self.state, stale);
                stale
            }
            None => {
                slot.state.copy_from(&self.state);
                self.state.len()
            }
        };
        for change in slot.mv.changes() {
            if change.position < unchanged_from {
                slot.state.replace(change.position, change.to);
            }
        }

        slot.computed = None;
        let rank = slot
            .engine
            .hash_resume(&slot.state, &mut slot.cache, unchanged_from)?;
        slot.computed = Some((self.tick, rank));
        trace!(index, parent = self.rank, child = rank, unchanged_from, "Child ranked");
        Ok(Some(rank))
    }

    /// Ranks of every applicable child, with their move indices.
    pub fn children(&mut self) -> Result<Vec<(usize, Rank)>> {
        let mut ranks = Vec::with_capacity(self.children.len());
        for index in 0..self.children.len() {
            if let Some(rank) = self.child(index)? {
                ranks.push((index, rank));
            }
        }
        Ok(ranks)
    }

    fn mark_changed(&mut self, upto: usize) {
        self.tick += 1;
        for changed in &mut self.last_change[..upto] {
            *changed = self.tick;
        }
    }
}

impl<O: CountingOracle> std::fmt::Debug for ChildTracker<'_, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildTracker")
            .field("rank", &self.rank)
            .field("state", &self.state.to_string())
            .field("children", &self.children.len())
            .finish()
    }
}
