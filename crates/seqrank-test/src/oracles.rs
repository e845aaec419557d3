//! Oracles with known counts.

use seqrank_core::{CountingOracle, Digit, RankingEngine, SequenceState};

/// Binary strings without two adjacent ones. There are `fib(n + 2)` of
/// length `n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdjacentOnes;

impl NoAdjacentOnes {
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
            1
        } else if !state.is_empty() && state.least_significant() == 1 {
            Self::free(free - 1)
        } else {
            Self::free(free)
        }
    }
}

/// An engine over `n`-bit strings without adjacent ones.
pub fn no_adjacent_ones(n: usize) -> RankingEngine<NoAdjacentOnes> {
    RankingEngine::new(vec![2; n], NoAdjacentOnes).expect("binary layout is valid")
}
