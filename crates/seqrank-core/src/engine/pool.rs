//! Bounded free lists of reusable sequence states.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crossbeam::queue::ArrayQueue;

use crate::state::{SequenceState, Tally};

/// A lock-free pool of states sharing one layout.
///
/// `acquire` hands out a pooled state in whatever configuration its last
/// user left it, or a fresh empty one when the pool is dry. `release`
/// accepts any state of the right length and silently drops it once the
/// pool is full.
pub(crate) struct StatePool<T> {
    free: ArrayQueue<SequenceState<T>>,
    prototype: SequenceState<T>,
}

impl<T: Tally> StatePool<T> {
    pub(crate) fn new(prototype: SequenceState<T>, capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
            prototype,
        }
    }

    pub(crate) fn acquire(&self) -> PooledState<'_, T> {
        let state = self.take();
        PooledState {
            pool: self,
            state: Some(state),
        }
    }

    pub(crate) fn take(&self) -> SequenceState<T> {
        self.free.pop().unwrap_or_else(|| self.prototype.clone())
    }

    pub(crate) fn release(&self, state: SequenceState<T>) {
        if state.len() == self.prototype.len() {
            let _ = self.free.push(state);
        }
    }

    pub(crate) fn available(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.free.capacity()
    }
}

impl<T> fmt::Debug for StatePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePool")
            .field("available", &self.free.len())
            .field("capacity", &self.free.capacity())
            .finish()
    }
}

/// A state borrowed from an engine pool; returned on drop.
pub struct PooledState<'p, T: Tally> {
    pool: &'p StatePool<T>,
    state: Option<SequenceState<T>>,
}

impl<T: Tally> PooledState<'_, T> {
    /// Detaches the state from the pool.
    pub fn into_inner(mut self) -> SequenceState<T> {
        self.state
            .take()
            .unwrap_or_else(|| self.pool.prototype.clone())
    }
}

impl<T: Tally> Deref for PooledState<'_, T> {
    type Target = SequenceState<T>;

    fn deref(&self) -> &SequenceState<T> {
        match &self.state {
            Some(state) => state,
            None => &self.pool.prototype,
        }
    }
}

impl<T: Tally> DerefMut for PooledState<'_, T> {
    fn deref_mut(&mut self) -> &mut SequenceState<T> {
        let pool = self.pool;
        self.state.get_or_insert_with(|| pool.prototype.clone())
    }
}

impl<T: Tally> Drop for PooledState<'_, T> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            self.pool.release(state);
        }
    }
}

impl<T: Tally> fmt::Debug for PooledState<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledState").field(&**self).finish()
    }
}
