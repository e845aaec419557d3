//! Shared test fixtures for seqrank crates.
//!
//! - [`oracles`] - small oracles with closed-form counts
//! - [`brute`] - exhaustive reference rankers
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! seqrank-test = { workspace = true }
//! ```

pub mod brute;
pub mod oracles;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seqrank_core::{CountingOracle, Digit, MixedRadix, PieceCount, Rank, RankingEngine};

pub use brute::{all_sequences, BruteRanker};
pub use oracles::{no_adjacent_ones, NoAdjacentOnes};

/// Layout of the 3x3 board used across the suites: two blanks (digit 0),
/// four X (1) and three O (2). It has 1260 arrangements.
pub const CARDINALITY_LAYOUT: [usize; 3] = [2, 4, 3];

/// An engine over [`CARDINALITY_LAYOUT`].
pub fn cardinality_engine() -> RankingEngine<PieceCount> {
    RankingEngine::piece_count(&CARDINALITY_LAYOUT).expect("fixed layout is valid")
}

/// An engine where every digit sequence over `radices` is valid, so rank
/// and mixed-radix value coincide.
pub fn mixed_radix_engine(radices: &[Digit]) -> RankingEngine<MixedRadix> {
    RankingEngine::mixed_radix(radices).expect("radices are positive")
}

/// `count` uniformly sampled valid states of `engine` with their ranks,
/// reproducible from `seed`.
pub fn random_states<O: CountingOracle>(
    engine: &RankingEngine<O>,
    seed: u64,
    count: usize,
) -> Vec<(Rank, Vec<Digit>)> {
    let mut rng = seeded_rng(seed);
    let mut state = engine.blank_state();
    (0..count)
        .map(|_| {
            let rank = engine
                .sample(&mut rng, &mut state)
                .expect("engine has valid states");
            (rank, state.to_vec())
        })
        .collect()
}

/// A deterministic RNG for reproducible sampling.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
