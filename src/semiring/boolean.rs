use std::fmt;

use super::{Closed, Semiring, SemiringError};

/// The Boolean semiring `⟨{⊥,⊤}, ∨, ∧, ⊥, ⊤⟩`.
///
/// `⊕ = ∨`, `⊗ = ∧`, idempotent and superior (`false < true`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Boolean(pub bool);

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Semiring for Boolean {
    fn zero() -> Self {
        Boolean(false)
    }
    fn one() -> Self {
        Boolean(true)
    }
    fn plus(&self, rhs: &Self) -> Self {
        Boolean(self.0 || rhs.0)
    }
    fn times(&self, rhs: &Self) -> Self {
        Boolean(self.0 && rhs.0)
    }
    const IS_IDEMPOTENT: bool = true;
    const IS_SUPERIOR: bool = true;
}

impl Closed for Boolean {
    fn star(&self) -> Result<Self, SemiringError> {
        // one ⊕ a ⊗ star(a) = true always, since one = true already.
        Ok(Boolean(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_and_identities() {
        let t = Boolean(true);
        let f = Boolean(false);
        assert_eq!(t.plus(&f), t);
        assert_eq!(f.plus(&f), f);
        assert_eq!(t.times(&f), f);
        assert_eq!(t.times(&t), t);
    }

    #[test]
    fn star_is_always_true() {
        assert_eq!(Boolean(false).star().unwrap(), Boolean(true));
        assert_eq!(Boolean(true).star().unwrap(), Boolean(true));
    }

    #[test]
    fn superior_order() {
        assert!(Boolean(false).le(&Boolean(true)));
        assert!(!Boolean(true).le(&Boolean(false)));
    }
}
