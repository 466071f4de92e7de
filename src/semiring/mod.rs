//! Semiring algebra
//!
//! A semiring `R = ⟨R, ⊕, ⊗, zero, one⟩` is a commutative monoid under `⊕`
//! (identity `zero`) paired with a monoid under `⊗` (identity `one`), where
//! `⊗` distributes over `⊕` and `zero` annihilates under `⊗`. Two flags are
//! decidable per concrete `R` and are exposed as associated constants rather
//! than runtime checks, since they depend only on the type, not the value:
//! `IS_IDEMPOTENT` (`x ⊕ x = x`) and `IS_SUPERIOR` (the natural order
//! `a ≤ b ⟺ a ⊕ b = a` is total).
//!
//! `star` (closed semirings) and `~` (multiplicative inverse) are modeled as
//! separate sub-traits ([`Closed`], [`Invertible`]) since not every semiring
//! supports them (see the Derivation semiring, which has no `star`).

mod boolean;
mod derivation;
mod product;
mod real;
mod string_semiring;
mod tropical;

pub use boolean::Boolean;
pub use derivation::Derivation;
pub use product::Product;
pub use real::Real;
pub use string_semiring::StringSemiring;
pub use tropical::Tropical;

use std::fmt;

/// Errors raised by semiring operations that are only partially defined.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SemiringError {
    /// `star` was invoked on an element outside the domain on which the
    /// closure series `one ⊕ a ⊕ a² ⊕ …` converges.
    #[error("star invoked on a non-closed element")]
    DivergentClosure,
    /// `~` (multiplicative inverse) has no defined value for this element
    /// (typically `zero`, or an out-of-domain value for a partial field).
    #[error("no multiplicative inverse defined for this element")]
    NoInverse,
}

/// A semiring value: `⟨R, ⊕, ⊗, zero, one⟩` satisfying the monoid laws,
/// distributivity, and annihilation by `zero`.
///
/// Implementors should satisfy, for all `a, b, c: R`:
/// - `(a ⊕ b) ⊕ c = a ⊕ (b ⊕ c)`, `a ⊕ b = b ⊕ a`, `a ⊕ zero = a`
/// - `(a ⊗ b) ⊗ c = a ⊗ (b ⊗ c)`, `a ⊗ one = one ⊗ a = a`
/// - `a ⊗ (b ⊕ c) = (a ⊗ b) ⊕ (a ⊗ c)` and symmetrically
/// - `a ⊗ zero = zero ⊗ a = zero`
pub trait Semiring: Clone + fmt::Debug + fmt::Display + PartialEq {
    /// `⊕`-identity.
    fn zero() -> Self;
    /// `⊗`-identity.
    fn one() -> Self;
    /// `⊕` (sum).
    fn plus(&self, rhs: &Self) -> Self;
    /// `⊗` (product).
    fn times(&self, rhs: &Self) -> Self;

    /// `x ⊕ x = x` for all `x`.
    const IS_IDEMPOTENT: bool;
    /// The natural order `a ≤ b ⟺ a ⊕ b = a` is total, so `a ⊕ b ∈ {a, b}`.
    const IS_SUPERIOR: bool;

    /// Natural order derived from `⊕`, meaningful only when `IS_SUPERIOR`.
    ///
    /// Used by Dijkstra's algorithm to order the agenda without requiring a
    /// separate `Ord` bound on every semiring (e.g. `Real`'s `f64` payload
    /// has no total order because of `NaN`, but superior semirings never
    /// produce one in practice).
    fn le(&self, other: &Self) -> bool {
        self.plus(other) == *self
    }
}

/// A semiring supporting `star(a) = one ⊕ a ⊕ a² ⊕ …`.
///
/// `star` may diverge outside the domain on which the series converges; see
/// each implementation's doc comment for the exact domain. Callers must not
/// invoke `star` on an out-of-domain element; implementations signal this
/// with [`SemiringError::DivergentClosure`] rather than looping forever.
pub trait Closed: Semiring {
    /// `star(a) = one ⊕ a ⊗ star(a)`, when defined.
    fn star(&self) -> Result<Self, SemiringError>;
}

/// A semiring supporting a (partial) multiplicative inverse `~a`.
///
/// Required only by [`crate::fsa::determinize`], [`crate::fsa::push`], and
/// Johnson's algorithm ([`crate::pathsum::Strategy::Johnson`]).
pub trait Invertible: Semiring {
    /// `~a` such that `a ⊗ ~a = one`, when defined.
    fn inverse(&self) -> Result<Self, SemiringError>;
}
