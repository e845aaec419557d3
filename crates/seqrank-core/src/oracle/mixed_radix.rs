//! Plain mixed-radix counting: every digit sequence is valid.

use crate::error::{RankError, Result};
use crate::state::SequenceState;
use crate::Digit;

use super::CountingOracle;

/// Oracle for unconstrained sequences.
///
/// Completions are the product of the radices of the unassigned positions,
/// so ranking reduces to ordinary mixed-radix numbering with position
/// `N - 1` most significant.
///
/// # Example
///
/// ```
/// use seqrank_core::oracle::{CountingOracle, MixedRadix};
/// use seqrank_core::state::SequenceState;
/// use std::sync::Arc;
///
/// let oracle = MixedRadix::new(&[2, 3, 4]).unwrap();
/// let state = SequenceState::new(Arc::from(vec![2, 3, 4]), ());
/// assert_eq!(oracle.completions(&state), 24);
/// ```
#[derive(Debug, Clone)]
pub struct MixedRadix {
    // products[c] = radix(0) * ... * radix(c - 1)
    products: Vec<u64>,
}

impl MixedRadix {
    /// Creates the oracle for the given digit bases.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::CountOverflow`] if the product of all radices does
    /// not fit in 64 bits, or [`RankError::InvalidRadix`] for a radix below 1.
    pub fn new(radices: &[Digit]) -> Result<Self> {
        let mut products = Vec::with_capacity(radices.len() + 1);
        let mut product = 1u64;
        products.push(product);
        for (position, &radix) in radices.iter().enumerate() {
            if radix < 1 {
                return Err(RankError::InvalidRadix { position, radix });
            }
            product = product
                .checked_mul(radix as u64)
                .ok_or(RankError::CountOverflow)?;
            products.push(product);
        }
        Ok(Self { products })
    }
}

impl CountingOracle for MixedRadix {
    type Tally = ();

    fn new_tally(&self, _radices: &[Digit]) -> Self::Tally {}

    #[inline]
    fn completions(&self, state: &SequenceState) -> u64 {
        self.products[state.cursor()]
    }

    fn validate_complete(&self, state: &SequenceState) -> bool {
        state.is_complete() && state.digits_in_range()
    }
}
