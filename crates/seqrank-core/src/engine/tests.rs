//! Tests for the ranking engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seqrank_config::{EngineConfig, ValidationMode};

use super::*;
use crate::oracle::from_fn;
use crate::r#move::Move;
use crate::state::DigitCounts;
use crate::test_utils::{all_sequences, no_adjacent_ones, valid_sequences, NoAdjacentOnes};

fn cardinality() -> RankingEngine<PieceCount> {
    RankingEngine::piece_count(&[2, 4, 3]).unwrap()
}

fn unranked(engine: &RankingEngine<PieceCount>, rank: Rank) -> SequenceState<DigitCounts> {
    let mut state = engine.blank_state();
    engine.unhash(rank, &mut state).unwrap();
    state
}

fn swaps(state: &SequenceState<DigitCounts>) -> Vec<Move> {
    let digits = state.to_vec();
    let mut moves = Vec::new();
    for i in 0..digits.len() {
        for j in i + 1..digits.len() {
            if digits[i] != digits[j] {
                moves.push(
                    Move::from_triples(&[(i, digits[i], digits[j]), (j, digits[j], digits[i])])
                        .unwrap(),
                );
            }
        }
    }
    moves
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_rejects_empty_layout() {
    let result = RankingEngine::new(Vec::<Digit>::new(), NoAdjacentOnes);
    assert!(matches!(result, Err(RankError::EmptyLayout)));
}

#[test]
fn test_rejects_bad_radix() {
    let result = RankingEngine::new(vec![2, 0, 2], NoAdjacentOnes);
    assert!(matches!(
        result,
        Err(RankError::InvalidRadix {
            position: 1,
            radix: 0
        })
    ));
}

#[test]
fn test_with_config() {
    let config = EngineConfig::new()
        .with_validation(ValidationMode::Strict)
        .with_pool_capacity(2);
    let engine = RankingEngine::with_config(vec![2; 4], NoAdjacentOnes, &config).unwrap();
    assert!(engine.is_strict());
    assert_eq!(engine.pool_capacity(), 2);
    assert_eq!(engine.num_elements(), 4);
    assert_eq!(engine.radix(3), 2);
}

#[test]
fn test_pool_returns_states() {
    let engine = no_adjacent_ones(4);
    assert_eq!(engine.pooled_states(), 0);
    {
        let mut state = engine.acquire_state();
        state.clear();
        state.push(1);
        assert_eq!(state.cursor(), 3);
    }
    assert_eq!(engine.pooled_states(), 1);

    let detached = engine.acquire_state().into_inner();
    assert_eq!(engine.pooled_states(), 0);
    engine.release_state(detached);
    assert_eq!(engine.pooled_states(), 1);
}

// ============================================================================
// Totals and extremes
// ============================================================================

#[test]
fn test_cardinality_total() {
    let engine = cardinality();
    assert_eq!(engine.total_positions(), 1260);
    assert_eq!(engine.num_elements(), 9);
}

#[test]
fn test_first_and_last_state() {
    let engine = cardinality();
    let first = engine.first_state().unwrap();
    assert_eq!(first.to_vec(), vec![2, 2, 2, 1, 1, 1, 1, 0, 0]);
    assert_eq!(engine.hash(&first).unwrap(), 0);

    let last = engine.last_state().unwrap();
    assert_eq!(last.to_vec(), vec![0, 0, 1, 1, 1, 1, 2, 2, 2]);
    assert_eq!(engine.hash(&last).unwrap(), 1259);

    let fib = no_adjacent_ones(4);
    assert_eq!(fib.total_positions(), 8);
    assert_eq!(fib.last_state().unwrap().to_vec(), vec![0, 1, 0, 1]);
}

#[test]
fn test_empty_domain() {
    let engine = RankingEngine::new(vec![2; 3], from_fn(|_: &SequenceState| 0)).unwrap();
    assert_eq!(engine.total_positions(), 0);
    assert!(matches!(engine.first_state(), Err(RankError::EmptyDomain)));

    let mut state = engine.blank_state();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    assert_eq!(engine.sample(&mut rng, &mut state), Err(RankError::EmptyDomain));
    assert_eq!(
        engine.unhash(0, &mut state),
        Err(RankError::RankOutOfRange { rank: 0, total: 0 })
    );
}

// ============================================================================
// Hash / unhash
// ============================================================================

#[test]
fn test_round_trip_every_rank() {
    let engine = cardinality();
    let mut state = engine.blank_state();
    for rank in 0..engine.total_positions() {
        engine.unhash(rank, &mut state).unwrap();
        assert!(state.is_complete());
        assert_eq!(engine.hash(&state).unwrap(), rank);
    }
}

#[test]
fn test_matches_brute_force_order() {
    let engine = no_adjacent_ones(6);
    let expected = valid_sequences(&engine);
    assert_eq!(expected.len(), 21);
    assert_eq!(engine.total_positions(), 21);
    for (rank, digits) in expected.iter().enumerate() {
        let state = engine.state_from_digits(digits).unwrap();
        assert_eq!(engine.hash(&state).unwrap(), rank as Rank, "{:?}", digits);
    }

    let small = RankingEngine::piece_count(&[1, 2, 1]).unwrap();
    let expected = valid_sequences(&small);
    assert_eq!(expected.len(), 12);
    let mut state = small.blank_state();
    for (rank, digits) in expected.iter().enumerate() {
        small.unhash(rank as Rank, &mut state).unwrap();
        assert_eq!(&state.to_vec(), digits);
    }
}

#[test]
fn test_mixed_radix_is_plain_numbering() {
    let engine = RankingEngine::mixed_radix(&[2, 3, 4]).unwrap();
    assert_eq!(engine.total_positions(), 24);
    for (rank, digits) in all_sequences(&[2, 3, 4]).iter().enumerate() {
        let state = engine.state_from_digits(digits).unwrap();
        assert_eq!(engine.hash(&state).unwrap(), rank as Rank);
    }
}

#[test]
fn test_hash_errors() {
    let engine = cardinality();
    let mut state = engine.first_state().unwrap();
    state.truncate_to(3);
    assert_eq!(engine.hash(&state), Err(RankError::IncompleteState { cursor: 3 }));

    state.assign_all(&[1; 9]).unwrap();
    assert!(matches!(engine.hash(&state), Err(RankError::InvalidState(_))));

    let mut short = SequenceState::new(Arc::from(vec![3; 4]), DigitCounts::new(3, 4));
    assert_eq!(
        engine.unhash(0, &mut short),
        Err(RankError::LengthMismatch {
            expected: 9,
            actual: 4
        })
    );
}

#[test]
fn test_unhash_out_of_range() {
    let engine = cardinality();
    let mut state = engine.blank_state();
    assert_eq!(
        engine.unhash(1260, &mut state),
        Err(RankError::RankOutOfRange {
            rank: 1260,
            total: 1260
        })
    );
}

#[test]
fn test_unhash_failure_clears_state() {
    // Claims five sequences at the root but none below it.
    let engine = RankingEngine::new(
        vec![2; 2],
        from_fn(|state: &SequenceState| if state.cursor() == 2 { 5 } else { 0 }),
    )
    .unwrap();
    let mut state = engine.blank_state();
    state.push(1);
    assert!(matches!(
        engine.unhash(0, &mut state),
        Err(RankError::InvalidState(_))
    ));
    assert!(state.is_empty());
    assert_eq!(state.cursor(), 2);
}

#[test]
fn test_state_from_digits_rejects_invalid() {
    let engine = no_adjacent_ones(3);
    assert!(engine.state_from_digits(&[1, 0, 1]).is_ok());
    assert!(matches!(
        engine.state_from_digits(&[1, 1, 0]),
        Err(RankError::InvalidState(_))
    ));
    assert!(matches!(
        engine.state_from_digits(&[0, 2, 0]),
        Err(RankError::InvalidState(_))
    ));
    assert!(matches!(
        engine.state_from_digits(&[0, 0]),
        Err(RankError::LengthMismatch { .. })
    ));
}

#[test]
fn test_sample_is_reproducible() {
    let engine = cardinality();
    let mut state = engine.blank_state();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut again = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..20 {
        let rank = engine.sample(&mut rng, &mut state).unwrap();
        assert!(rank < 1260);
        assert_eq!(engine.hash(&state).unwrap(), rank);
        assert_eq!(engine.sample(&mut again, &mut state).unwrap(), rank);
    }
}

// ============================================================================
// Partial ranks
// ============================================================================

#[test]
fn test_partial_hash_composes() {
    let engine = cardinality();
    let mut first = engine.blank_state();
    for rank in (0..1260).step_by(61) {
        let state = unranked(&engine, rank);
        let digits = state.to_vec();
        for k in 0..=9 {
            assert!(engine.first_position(&digits[k..], &mut first).unwrap());
            let outer = engine.hash(&first).unwrap();
            let inner = engine.partial_hash(&state, k).unwrap();
            assert_eq!(inner + outer, rank, "split at {} of {}", k, state);
        }
        assert_eq!(engine.partial_hash(&state, 0).unwrap(), 0);
        assert_eq!(engine.partial_hash(&state, 9).unwrap(), rank);
    }
    let state = unranked(&engine, 3);
    assert!(engine.partial_hash(&state, 10).is_err());
}

#[test]
fn test_hash_resume_after_steps() {
    let engine = cardinality();
    let mut state = unranked(&engine, 500);
    let mut cache = RankCache::new(9);
    assert_eq!(engine.hash_cached(&state, &mut cache).unwrap(), 500);
    assert_eq!(cache.rank(), 500);
    assert_eq!(cache.suffix_rank(9), 0);

    for expected in 501..540 {
        let unchanged = engine.step(&mut state, Direction::Forward).unwrap();
        let rank = engine.hash_resume(&state, &mut cache, unchanged).unwrap();
        assert_eq!(rank, expected);
        assert_eq!(cache.rank(), expected);
    }
}

#[test]
fn test_num_positions() {
    let engine = cardinality();
    assert_eq!(engine.num_positions(&[]).unwrap(), 1260);
    assert_eq!(engine.num_positions(&[1]).unwrap(), 560);
    assert_eq!(engine.num_positions(&[0, 0]).unwrap(), 35);
    assert_eq!(engine.num_positions(&[0, 0, 0]).unwrap(), 0);
    assert_eq!(engine.num_positions(&[5]).unwrap(), 0);
    assert_eq!(
        engine.num_positions(&[0; 10]),
        Err(RankError::SuffixTooLong {
            length: 10,
            num_elements: 9
        })
    );
}

#[test]
fn test_first_position() {
    let engine = RankingEngine::mixed_radix(&[3, 3, 3]).unwrap();
    let mut state = engine.blank_state();
    assert!(engine.first_position(&[2], &mut state).unwrap());
    assert_eq!(state.to_vec(), vec![0, 0, 2]);
    assert_eq!(engine.hash(&state).unwrap(), 18);

    assert!(engine.first_position(&[1, 2], &mut state).unwrap());
    assert_eq!(engine.hash(&state).unwrap(), 21);
    assert!(!engine.first_position(&[3], &mut state).unwrap());

    let fib = no_adjacent_ones(4);
    let mut state = fib.blank_state();
    assert!(!fib.first_position(&[1, 1], &mut state).unwrap());
}

#[test]
fn test_dead_suffix_leaves_counts_intact() {
    let engine = RankingEngine::column_gravity(2, 2).unwrap();
    // Top cell of the second column holds a piece over an empty cell.
    assert_eq!(engine.num_positions(&[0, 0, 1]).unwrap(), 0);
    let mut state = engine.blank_state();
    assert!(!engine.first_position(&[0, 0, 1], &mut state).unwrap());

    assert_eq!(engine.num_positions(&[0, 1, 0]).unwrap(), 2);
    assert_eq!(engine.total_positions(), 21);
    assert!(engine.first_position(&[0, 1, 0], &mut state).unwrap());
    assert_eq!(state.to_vec(), vec![0, 0, 1, 0]);

    let mut visited = 1;
    let mut state = engine.first_state().unwrap();
    while engine.step(&mut state, Direction::Forward).is_some() {
        visited += 1;
    }
    assert_eq!(visited, 21);
}

// ============================================================================
// Stepping
// ============================================================================

#[test]
fn test_density_by_stepping() {
    let engine = cardinality();
    let mut state = engine.first_state().unwrap();
    assert_eq!(engine.hash(&state).unwrap(), 0);
    for expected in 1..1260 {
        assert!(engine.step(&mut state, Direction::Forward).is_some());
        assert_eq!(engine.hash(&state).unwrap(), expected);
    }
    let last = engine.last_state().unwrap();
    assert_eq!(state, last);
    assert_eq!(engine.step(&mut state, Direction::Forward), None);
    assert_eq!(state, last);
    assert_eq!(engine.hash(&state).unwrap(), 1259);
}

#[test]
fn test_step_backward_visits_all() {
    let engine = no_adjacent_ones(7);
    let mut state = engine.last_state().unwrap();
    let total = engine.total_positions();
    assert_eq!(total, 34);
    for expected in (0..total - 1).rev() {
        assert!(engine.step(&mut state, Direction::Backward).is_some());
        assert_eq!(engine.hash(&state).unwrap(), expected);
    }
    let first = state.clone();
    assert_eq!(engine.step(&mut state, Direction::Backward), None);
    assert_eq!(state, first);
    assert_eq!(state.to_vec(), vec![0; 7]);
}

#[test]
fn test_step_inverse() {
    let engine = cardinality();
    for rank in (1..1259).step_by(37) {
        let original = unranked(&engine, rank);
        let mut state = original.clone();
        engine.step(&mut state, Direction::Forward).unwrap();
        engine.step(&mut state, Direction::Backward).unwrap();
        assert_eq!(state, original);
        assert_eq!(state.tally(), original.tally());
    }
}

#[test]
fn test_step_reports_lowest_unchanged_position() {
    let engine = RankingEngine::mixed_radix(&[2, 2, 2]).unwrap();
    let mut state = engine.state_from_digits(&[0, 0, 0]).unwrap();
    assert_eq!(engine.step(&mut state, Direction::Forward), Some(1));
    assert_eq!(state.to_vec(), vec![1, 0, 0]);
    assert_eq!(engine.step(&mut state, Direction::Forward), Some(2));
    assert_eq!(state.to_vec(), vec![0, 1, 0]);
    assert_eq!(engine.step(&mut state, Direction::Forward), Some(1));
    assert_eq!(state.to_vec(), vec![1, 1, 0]);
    assert_eq!(engine.step(&mut state, Direction::Backward), Some(1));
    assert_eq!(engine.step(&mut state, Direction::Backward), Some(2));
    assert_eq!(state.to_vec(), vec![1, 0, 0]);
}

#[test]
fn test_step_on_suffix() {
    let engine = RankingEngine::mixed_radix(&[2, 3]).unwrap();
    let mut state = engine.blank_state();
    state.push(0);
    assert_eq!(engine.step(&mut state, Direction::Forward), Some(2));
    assert_eq!(state.assigned(), &[1]);
    assert_eq!(engine.step(&mut state, Direction::Forward), Some(2));
    assert_eq!(engine.step(&mut state, Direction::Forward), None);
    assert_eq!(state.assigned(), &[2]);
    assert_eq!(state.cursor(), 1);

    let mut empty = engine.blank_state();
    assert_eq!(engine.step(&mut empty, Direction::Forward), None);
}

#[test]
fn test_skip_suffix() {
    let engine = RankingEngine::mixed_radix(&[3, 3, 3]).unwrap();
    let mut state = engine.state_from_digits(&[1, 1, 1]).unwrap();
    assert_eq!(engine.skip_suffix(&mut state, Direction::Forward, 1), Some(2));
    assert_eq!(state.to_vec(), vec![0, 2, 1]);
    assert_eq!(engine.hash(&state).unwrap(), 15);

    let mut state = engine.state_from_digits(&[1, 1, 1]).unwrap();
    assert_eq!(engine.skip_suffix(&mut state, Direction::Backward, 1), Some(-2));
    assert_eq!(state.to_vec(), vec![2, 0, 1]);

    let mut state = engine.state_from_digits(&[0, 1, 2]).unwrap();
    assert_eq!(engine.skip_suffix(&mut state, Direction::Forward, 2), None);
    assert_eq!(state.to_vec(), vec![0, 1, 2]);
    assert_eq!(engine.skip_suffix(&mut state, Direction::Forward, 3), None);
}

#[test]
fn test_skip_suffix_delta_matches_hash() {
    let engine = cardinality();
    for rank in (0..1260).step_by(83) {
        for min_change in 0..9 {
            let mut state = unranked(&engine, rank);
            if let Some(delta) = engine.skip_suffix(&mut state, Direction::Forward, min_change) {
                let after = engine.hash(&state).unwrap();
                assert_eq!(after as i64 - rank as i64, delta);
                assert!(delta > 0);
            } else {
                assert_eq!(engine.hash(&state).unwrap(), rank);
            }
        }
    }
}

// ============================================================================
// Moves
// ============================================================================

#[test]
fn test_apply_move() {
    let engine = no_adjacent_ones(5);
    let parent = engine.state_from_digits(&[1, 0, 0, 0, 1]).unwrap();
    let mut child = engine.blank_state();

    engine
        .apply_move(&parent, &Move::single(2, 0, 1), &mut child)
        .unwrap();
    assert_eq!(child.to_vec(), vec![1, 0, 1, 0, 1]);

    assert_eq!(
        engine.apply_move(&parent, &Move::single(2, 1, 0), &mut child),
        Err(RankError::MoveMismatch {
            position: 2,
            expected: 1,
            found: 0
        })
    );
    assert!(matches!(
        engine.apply_move(&parent, &Move::single(1, 0, 1), &mut child),
        Err(RankError::InvalidState(_))
    ));
    assert!(matches!(
        engine.apply_move(&parent, &Move::single(7, 0, 1), &mut child),
        Err(RankError::InvalidMove(_))
    ));
    assert!(matches!(
        engine.apply_move(&parent, &Move::single(2, 0, 2), &mut child),
        Err(RankError::InvalidMove(_))
    ));
}

#[test]
fn test_apply_move_in_place() {
    let engine = no_adjacent_ones(5);
    let mut state = engine.state_from_digits(&[1, 0, 0, 0, 1]).unwrap();
    engine
        .apply_move_in_place(&mut state, &Move::single(2, 0, 1))
        .unwrap();
    assert_eq!(state.to_vec(), vec![1, 0, 1, 0, 1]);
    assert!(engine
        .apply_move_in_place(&mut state, &Move::single(1, 0, 1))
        .is_err());
    assert_eq!(state.to_vec(), vec![1, 0, 1, 0, 1]);
}

#[test]
fn test_match_position() {
    let engine = no_adjacent_ones(5);
    let state = engine.state_from_digits(&[1, 0, 0, 0, 1]).unwrap();
    let mv = Move::from_triples(&[(0, 0, 1), (4, 1, 0)]).unwrap();
    assert_eq!(engine.match_position(&mv, &state), Some(0));
    let mv = Move::from_triples(&[(0, 1, 0), (3, 1, 0)]).unwrap();
    assert_eq!(engine.match_position(&mv, &state), Some(3));
    let mv = Move::from_triples(&[(0, 1, 0), (4, 1, 0)]).unwrap();
    assert_eq!(engine.match_position(&mv, &state), None);
}

#[test]
fn test_delta_consistency() {
    let engine = cardinality();
    let mut child = engine.blank_state();
    for rank in (0..1260).step_by(97) {
        let state = unranked(&engine, rank);
        for mv in swaps(&state) {
            let delta = engine
                .incremental_delta(&state, &mv, Direction::Forward)
                .unwrap();
            engine.apply_move(&state, &mv, &mut child).unwrap();
            let child_rank = engine.hash(&child).unwrap();
            assert_eq!(child_rank as i64 - rank as i64, delta, "{} on {}", mv, state);

            let back = engine
                .incremental_delta(&child, &mv, Direction::Backward)
                .unwrap();
            assert_eq!(back, -delta);
        }
        assert_eq!(engine.hash(&state).unwrap(), rank);
    }
}

#[test]
fn test_apply_move_with_delta_mutates() {
    let engine = no_adjacent_ones(5);
    let mut state = engine.state_from_digits(&[1, 0, 0, 0, 1]).unwrap();
    let before = engine.hash(&state).unwrap();
    let delta = engine
        .apply_move_with_delta(&mut state, &Move::single(2, 0, 1), Direction::Forward)
        .unwrap();
    assert_eq!(state.to_vec(), vec![1, 0, 1, 0, 1]);
    assert_eq!(engine.hash(&state).unwrap() as i64, before as i64 + delta);
    assert!(state.tally_consistent());
}

#[test]
fn test_apply_move_with_delta_rejects_invalid_result() {
    let engine = no_adjacent_ones(5);
    let mut state = engine.state_from_digits(&[1, 0, 0, 0, 1]).unwrap();
    let result = engine.apply_move_with_delta(&mut state, &Move::single(1, 0, 1), Direction::Forward);
    assert!(matches!(result, Err(RankError::InvalidState(_))));
    assert_eq!(state.to_vec(), vec![1, 0, 0, 0, 1]);
    assert!(state.is_complete());
    assert!(engine.hash(&state).is_ok());
}

#[test]
fn test_step_to_match() {
    let engine = RankingEngine::mixed_radix(&[3, 3, 3]).unwrap();

    let mut state = engine.state_from_digits(&[0, 0, 0]).unwrap();
    let mv = Move::single(1, 2, 0);
    assert_eq!(engine.step_to_match(&mut state, &mv, 3), Some(6));
    assert_eq!(state.to_vec(), vec![0, 2, 0]);
    assert_eq!(engine.step_to_match(&mut state, &mv, 3), Some(0));

    let mut state = engine.state_from_digits(&[0, 0, 0]).unwrap();
    assert_eq!(engine.step_to_match(&mut state, &mv, 1), None);
    assert_eq!(state.to_vec(), vec![0, 0, 0]);

    let mut state = engine.state_from_digits(&[0, 0, 1]).unwrap();
    let mv = Move::single(2, 0, 1);
    assert_eq!(engine.step_to_match(&mut state, &mv, 3), None);
    assert_eq!(state.to_vec(), vec![0, 0, 1]);

    let mut state = engine.state_from_digits(&[0, 0, 0]).unwrap();
    let mv = Move::from_triples(&[(0, 2, 0), (2, 1, 0)]).unwrap();
    assert_eq!(engine.step_to_match(&mut state, &mv, 3), Some(11));
    assert_eq!(state.to_vec(), vec![2, 0, 1]);
}

// ============================================================================
// Strict validation
// ============================================================================

#[test]
fn test_strict_mode_accepts_consistent_oracle() {
    let config = EngineConfig::new().with_validation(ValidationMode::Strict);
    let oracle = PieceCount::new(&[1, 2, 2]).unwrap();
    let engine = RankingEngine::with_config(oracle.radices(), oracle, &config).unwrap();

    let mut state = engine.first_state().unwrap();
    let mut rank = 0;
    while engine.step(&mut state, Direction::Forward).is_some() {
        rank += 1;
        let mut probe = engine.blank_state();
        engine.unhash(rank, &mut probe).unwrap();
        assert_eq!(probe, state);
        for mv in swaps(&state) {
            engine.incremental_delta(&state, &mv, Direction::Forward).unwrap();
        }
    }
    assert_eq!(rank + 1, engine.total_positions());
}

#[test]
#[should_panic(expected = "ranking invariant violated")]
fn test_strict_mode_catches_overcounting() {
    let mut engine = RankingEngine::new(vec![2; 2], from_fn(|_: &SequenceState| 2)).unwrap();
    engine.set_strict(true);
    let mut state = engine.blank_state();
    state.assign_all(&[0, 0]).unwrap();
    engine.completions(&state);
}
