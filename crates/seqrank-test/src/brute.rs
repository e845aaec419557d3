//! Exhaustive reference ranking.
//!
//! Enumerates every digit sequence in rank order and keeps the ones the
//! engine's oracle accepts. Only usable for small layouts.

use std::collections::HashMap;

use rand::Rng;
use seqrank_core::{CountingOracle, Digit, Rank, RankingEngine};

/// Every digit sequence over `radices`, position 0 varying fastest.
pub fn all_sequences(radices: &[Digit]) -> Vec<Vec<Digit>> {
    let mut out = Vec::new();
    if radices.iter().any(|&r| r <= 0) {
        return out;
    }
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

/// Ranks by table lookup over every valid sequence.
#[derive(Debug, Clone)]
pub struct BruteRanker {
    sequences: Vec<Vec<Digit>>,
    ranks: HashMap<Vec<Digit>, Rank>,
}

impl BruteRanker {
    /// Builds the table for `engine`, asking its oracle about each
    /// complete sequence.
    pub fn new<O: CountingOracle>(engine: &RankingEngine<O>) -> Self {
        let mut state = engine.blank_state();
        let sequences: Vec<Vec<Digit>> = all_sequences(engine.radices())
            .into_iter()
            .filter(|digits| {
                state
                    .assign_all(digits)
                    .map(|()| engine.completions(&state) == 1)
                    .unwrap_or(false)
            })
            .collect();
        let ranks = sequences
            .iter()
            .enumerate()
            .map(|(rank, digits)| (digits.clone(), rank as Rank))
            .collect();
        Self { sequences, ranks }
    }

    /// Number of valid sequences.
    pub fn total(&self) -> u64 {
        self.sequences.len() as u64
    }

    /// Rank of `digits`, or `None` if they are not valid.
    pub fn rank(&self, digits: &[Digit]) -> Option<Rank> {
        self.ranks.get(digits).copied()
    }

    /// Digits of rank `rank`.
    pub fn unrank(&self, rank: Rank) -> Option<&[Digit]> {
        self.sequences.get(rank as usize).map(Vec::as_slice)
    }

    /// Valid sequences in rank order.
    pub fn sequences(&self) -> &[Vec<Digit>] {
        &self.sequences
    }

    /// A uniformly chosen valid sequence.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&[Digit]> {
        if self.sequences.is_empty() {
            return None;
        }
        let rank = rng.random_range(0..self.sequences.len());
        Some(&self.sequences[rank])
    }
}
