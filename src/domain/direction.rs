//! Swap direction resolution.
//!
//! A pool has two tokens. The AMM quote endpoint receives the direction as
//! a boolean flag, the DLMM endpoint receives the input token's address and
//! the direction is derived from which side of the pool it matches.

use std::fmt;

use super::Pubkey;

/// Which of a pool's two tokens is the input side of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The first token (A, or X for bin pools) is the input.
    AToB,
    /// The second token (B, or Y for bin pools) is the input.
    BToA,
}

impl Direction {
    /// Maps the `swapAtoB` query flag. Only the exact string `"true"` selects
    /// [`Direction::AToB`].
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        if flag == "true" { Self::AToB } else { Self::BToA }
    }

    /// `true` when the swap sells the first token for the second, which is
    /// what bin-pool quoting calls "swap for Y".
    #[must_use]
    pub const fn is_a_to_b(self) -> bool {
        matches!(self, Self::AToB)
    }

    /// Picks the input token out of a pool's pair.
    #[must_use]
    pub fn input_of<T>(self, token_a: T, token_b: T) -> T {
        match self {
            Self::AToB => token_a,
            Self::BToA => token_b,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AToB => f.write_str("a_to_b"),
            Self::BToA => f.write_str("b_to_a"),
        }
    }
}

/// The supplied token matches neither side of the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token {supplied} does not match pool tokens {token_a} / {token_b}")]
pub struct DirectionMismatch {
    /// Address the caller supplied.
    pub supplied: String,
    /// The pool's first token.
    pub token_a: Pubkey,
    /// The pool's second token.
    pub token_b: Pubkey,
}

/// Determines the swap direction from the caller's input token.
///
/// Comparison is exact equality of canonical base58 strings, so a supplied
/// value that is not a valid address simply fails to match.
///
/// # Errors
///
/// Returns [`DirectionMismatch`] when `supplied` is neither `token_a` nor
/// `token_b`.
pub fn resolve_direction(
    supplied: &str,
    token_a: &Pubkey,
    token_b: &Pubkey,
) -> Result<Direction, DirectionMismatch> {
    if supplied == token_a.to_base58() {
        Ok(Direction::AToB)
    } else if supplied == token_b.to_base58() {
        Ok(Direction::BToA)
    } else {
        Err(DirectionMismatch {
            supplied: supplied.to_string(),
            token_a: *token_a,
            token_b: *token_b,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> (Pubkey, Pubkey, Pubkey) {
        (
            Pubkey::new([1u8; 32]),
            Pubkey::new([2u8; 32]),
            Pubkey::new([3u8; 32]),
        )
    }

    #[test]
    fn first_token_resolves_a_to_b() {
        let (a, b, _) = tokens();
        assert_eq!(resolve_direction(&a.to_base58(), &a, &b), Ok(Direction::AToB));
    }

    #[test]
    fn second_token_resolves_b_to_a() {
        let (a, b, _) = tokens();
        assert_eq!(resolve_direction(&b.to_base58(), &a, &b), Ok(Direction::BToA));
    }

    #[test]
    fn unrelated_token_is_mismatch() {
        let (a, b, other) = tokens();
        let result = resolve_direction(&other.to_base58(), &a, &b);
        assert_eq!(
            result,
            Err(DirectionMismatch {
                supplied: other.to_base58(),
                token_a: a,
                token_b: b,
            })
        );
    }

    #[test]
    fn comparison_is_exact() {
        let (a, b, _) = tokens();
        let padded = format!(" {}", a.to_base58());
        assert!(resolve_direction(&padded, &a, &b).is_err());
        assert!(resolve_direction("", &a, &b).is_err());
    }

    #[test]
    fn flag_only_accepts_literal_true() {
        assert_eq!(Direction::from_flag("true"), Direction::AToB);
        assert_eq!(Direction::from_flag("false"), Direction::BToA);
        assert_eq!(Direction::from_flag("TRUE"), Direction::BToA);
        assert_eq!(Direction::from_flag(""), Direction::BToA);
    }

    #[test]
    fn input_of_picks_side() {
        assert_eq!(Direction::AToB.input_of('a', 'b'), 'a');
        assert_eq!(Direction::BToA.input_of('a', 'b'), 'b');
        assert!(Direction::AToB.is_a_to_b());
        assert!(!Direction::BToA.is_a_to_b());
    }
}
