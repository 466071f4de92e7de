use std::fmt;

use super::{Invertible, Semiring, SemiringError};

/// The real (probability) semiring `⟨ℝ, +, ×, 0, 1⟩`.
///
/// Not idempotent, not superior: `1 + 1 ≠ 1` and there is no natural total
/// order compatible with `⊕`.
#[derive(Clone, Copy, Debug)]
pub struct Real(pub f64);

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Semiring for Real {
    fn zero() -> Self {
        Real(0.0)
    }
    fn one() -> Self {
        Real(1.0)
    }
    fn plus(&self, rhs: &Self) -> Self {
        Real(self.0 + rhs.0)
    }
    fn times(&self, rhs: &Self) -> Self {
        Real(self.0 * rhs.0)
    }
    const IS_IDEMPOTENT: bool = false;
    const IS_SUPERIOR: bool = false;
}

impl super::Closed for Real {
    /// `star(a) = 1 / (1 - a)` when `|a| < 1`, else divergent.
    fn star(&self) -> Result<Self, SemiringError> {
        if self.0.abs() < 1.0 {
            Ok(Real(1.0 / (1.0 - self.0)))
        } else {
            Err(SemiringError::DivergentClosure)
        }
    }
}

impl Invertible for Real {
    fn inverse(&self) -> Result<Self, SemiringError> {
        if self.0 == 0.0 {
            Err(SemiringError::NoInverse)
        } else {
            Ok(Real(1.0 / self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_mul() {
        let a = Real(2.0);
        let b = Real(3.0);
        assert_eq!(a.plus(&b), Real(5.0));
        assert_eq!(a.times(&b), Real(6.0));
    }

    #[test]
    fn star_fixed_point_inside_domain() {
        let a = Real(0.5);
        let star = a.star().unwrap();
        // star(a) = one ⊕ a ⊗ star(a)
        let rhs = Real::one().plus(&a.times(&star));
        assert!((star.0 - rhs.0).abs() < 1e-9);
    }

    #[test]
    fn star_diverges_outside_domain() {
        assert!(Real(2.0).star().is_err());
        assert!(Real(-1.0).star().is_err());
    }

    #[test]
    fn inverse_undefined_at_zero() {
        assert!(Real(0.0).inverse().is_err());
        assert_eq!(Real(4.0).inverse().unwrap(), Real(0.25));
    }
}
