use std::fmt;

use super::{Closed, Invertible, Semiring, SemiringError};

/// Componentwise product of two semirings `R₁ × R₂`.
///
/// `⊕`, `⊗`, `zero`, `one` (and `star`/`~` when both components support
/// them) are applied componentwise. `IS_IDEMPOTENT`/`IS_SUPERIOR` are
/// inherited as the conjunction of the two components' flags — a
/// conservative choice: the product of two superior semirings need not
/// itself have a *total* componentwise order (e.g. `(1,0)` vs `(0,1)` are
/// incomparable), so callers should not feed `Product` into Dijkstra unless
/// they know their particular component values stay comparable.
#[derive(Clone, Debug, PartialEq)]
pub struct Product<A, B>(pub A, pub B);

impl<A: fmt::Display, B: fmt::Display> fmt::Display for Product<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

impl<A: Semiring, B: Semiring> Semiring for Product<A, B> {
    fn zero() -> Self {
        Product(A::zero(), B::zero())
    }
    fn one() -> Self {
        Product(A::one(), B::one())
    }
    fn plus(&self, rhs: &Self) -> Self {
        Product(self.0.plus(&rhs.0), self.1.plus(&rhs.1))
    }
    fn times(&self, rhs: &Self) -> Self {
        Product(self.0.times(&rhs.0), self.1.times(&rhs.1))
    }
    const IS_IDEMPOTENT: bool = A::IS_IDEMPOTENT && B::IS_IDEMPOTENT;
    const IS_SUPERIOR: bool = A::IS_SUPERIOR && B::IS_SUPERIOR;
}

impl<A: Closed, B: Closed> Closed for Product<A, B> {
    fn star(&self) -> Result<Self, SemiringError> {
        Ok(Product(self.0.star()?, self.1.star()?))
    }
}

impl<A: Invertible, B: Invertible> Invertible for Product<A, B> {
    fn inverse(&self) -> Result<Self, SemiringError> {
        Ok(Product(self.0.inverse()?, self.1.inverse()?))
    }
}
