use std::fmt;

use super::{Closed, Semiring, SemiringError};

/// The string (longest-common-prefix) semiring.
///
/// Elements are either a finite string or the absorbing element `⊤`
/// (`None`), which behaves as `zero`: `lcp(⊤, s) = s` and `concat(⊤, s) = ⊤`.
/// `⊕ = lcp`, `⊗ = concat`, `one = ""`. Idempotent (`lcp(s,s) = s`) and
/// treated as superior along any chain of strings related by the prefix
/// order — as in the textbook presentation this semiring is drawn from, the
/// natural order is total only along such a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringSemiring(pub Option<String>);

fn lcp(a: &str, b: &str) -> String {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

impl fmt::Display for StringSemiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "⊤"),
            Some(s) => write!(f, "\"{s}\""),
        }
    }
}

impl Semiring for StringSemiring {
    fn zero() -> Self {
        StringSemiring(None)
    }
    fn one() -> Self {
        StringSemiring(Some(String::new()))
    }
    fn plus(&self, rhs: &Self) -> Self {
        match (&self.0, &rhs.0) {
            (None, x) => StringSemiring(x.clone()),
            (x, None) => StringSemiring(x.clone()),
            (Some(a), Some(b)) => StringSemiring(Some(lcp(a, b))),
        }
    }
    fn times(&self, rhs: &Self) -> Self {
        match (&self.0, &rhs.0) {
            (None, _) | (_, None) => StringSemiring(None),
            (Some(a), Some(b)) => StringSemiring(Some(format!("{a}{b}"))),
        }
    }
    const IS_IDEMPOTENT: bool = true;
    const IS_SUPERIOR: bool = true;
}

impl Closed for StringSemiring {
    /// `star(a) = one`: `lcp("", a) = ""` for any `a`.
    fn star(&self) -> Result<Self, SemiringError> {
        Ok(StringSemiring::one())
    }
}
