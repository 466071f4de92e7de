use std::fmt;

use super::{Closed, Invertible, Semiring, SemiringError};

/// The tropical (min-plus) semiring `⟨ℝ ∪ {∞}, min, +, ∞, 0⟩`.
///
/// `⊕ = min`, `⊗ = +`. Idempotent (`min(a,a) = a`) and superior: the natural
/// order is the usual `≤` on reals (with `∞` as the maximum), which is
/// total.
#[derive(Clone, Copy, Debug)]
pub struct Tropical(pub f64);

impl Tropical {
    /// `zero = ∞`, the identity of `min`.
    pub fn infinity() -> Self {
        Tropical(f64::INFINITY)
    }
}

impl PartialEq for Tropical {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for Tropical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            write!(f, "∞")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Semiring for Tropical {
    fn zero() -> Self {
        Tropical::infinity()
    }
    fn one() -> Self {
        Tropical(0.0)
    }
    fn plus(&self, rhs: &Self) -> Self {
        Tropical(self.0.min(rhs.0))
    }
    fn times(&self, rhs: &Self) -> Self {
        Tropical(self.0 + rhs.0)
    }
    const IS_IDEMPOTENT: bool = true;
    const IS_SUPERIOR: bool = true;

    fn le(&self, other: &Self) -> bool {
        self.0 <= other.0
    }
}

impl Closed for Tropical {
    /// `star(a) = 0` (i.e. `one`) when `a ≥ 0`; divergent (`-∞` under
    /// repeated addition) otherwise.
    fn star(&self) -> Result<Self, SemiringError> {
        if self.0 >= 0.0 {
            Ok(Tropical::one())
        } else {
            Err(SemiringError::DivergentClosure)
        }
    }
}

impl Invertible for Tropical {
    /// `~a = -a`; undefined at `zero = ∞`.
    fn inverse(&self) -> Result<Self, SemiringError> {
        if self.0.is_infinite() {
            Err(SemiringError::NoInverse)
        } else {
            Ok(Tropical(-self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_plus_identities() {
        let a = Tropical(2.0);
        let b = Tropical(3.0);
        assert_eq!(a.plus(&b), Tropical(2.0));
        assert_eq!(a.times(&b), Tropical(5.0));
        assert_eq!(Tropical::zero().plus(&a), a);
        assert_eq!(Tropical::one().times(&a), a);
    }

    #[test]
    fn zero_annihilates() {
        assert_eq!(Tropical::zero().times(&Tropical(4.0)), Tropical::zero());
    }

    #[test]
    fn star_domain() {
        assert_eq!(Tropical(0.0).star().unwrap(), Tropical::one());
        assert_eq!(Tropical(5.0).star().unwrap(), Tropical::one());
        assert!(Tropical(-1.0).star().is_err());
    }

    #[test]
    fn superior_order_total() {
        assert!(Tropical(1.0).le(&Tropical(2.0)));
        assert!(!Tropical(2.0).le(&Tropical(1.0)));
    }
}
