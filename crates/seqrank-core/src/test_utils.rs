//! Test utilities for seqrank-core
//!
//! Small oracles and brute-force references shared by the unit tests.

use crate::engine::RankingEngine;
use crate::oracle::CountingOracle;
use crate::state::SequenceState;
use crate::Digit;

/// Binary strings without two adjacent ones.
#[derive(Debug, Clone, Copy)]
pub struct NoAdjacentOnes;

impl NoAdjacentOnes {
    /// Number of free binary strings of length `k` without adjacent ones.
    fn free(k: usize) -> u64 {
        let (mut a, mut b) = (1u64, 2u64);
        for _ in 0..k {
            (a, b) = (b, a + b);
        }
        a
    }
}

impl CountingOracle for NoAdjacentOnes {
    type Tally = ();

    fn new_tally(&self, _radices: &[Digit]) -> Self::Tally {}

    fn completions(&self, state: &SequenceState) -> u64 {
        if state.assigned().windows(2).any(|w| w[0] == 1 && w[1] == 1) {
            return 0;
        }
        let free = state.cursor();
        if free == 0 {
            return 1;
        }
        if !state.is_empty() && state.least_significant() == 1 {
            // The next position is forced to 0.
            Self::free(free - 1)
        } else {
            Self::free(free)
        }
    }
}

/// An engine over `n`-bit strings without adjacent ones.
pub fn no_adjacent_ones(n: usize) -> RankingEngine<NoAdjacentOnes> {
    RankingEngine::new(vec![2; n], NoAdjacentOnes).unwrap()
}

/// Every digit sequence over `radices`, in rank order (position 0 varies
/// fastest).
pub fn all_sequences(radices: &[Digit]) -> Vec<Vec<Digit>> {
    let mut out = Vec::new();
    let mut digits = vec![0; radices.len()];
    loop {
        out.push(digits.clone());
        let mut position = 0;
        loop {
            if position == radices.len() {
                return out;
            }
            digits[position] += 1;
            if digits[position] < radices[position] {
                break;
            }
            digits[position] = 0;
            position += 1;
        }
    }
}

/// The sequences `engine` accepts, in rank order.
pub fn valid_sequences<O: CountingOracle>(engine: &RankingEngine<O>) -> Vec<Vec<Digit>> {
    let mut state = engine.blank_state();
    all_sequences(engine.radices())
        .into_iter()
        .filter(|digits| {
            state.assign_all(digits).unwrap();
            engine.completions(&state) == 1
        })
        .collect()
}
