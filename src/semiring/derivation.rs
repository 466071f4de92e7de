use std::collections::BTreeSet;
use std::fmt;

use super::Semiring;

/// The derivation semiring `⊕ = set union, ⊗ = concatenation`.
///
/// A value is a finite set of derivations, each modeled as the sequence of
/// leaf labels it yields (a faithful simplification of full derivation
/// trees: concatenation of sequences is associative by construction, which
/// is all the semiring laws require here). Idempotent (union is idempotent)
/// but not superior: set union gives no total order. Has no `star` — the
/// series `one ⊕ a ⊕ a² ⊕ …` would require an infinite set whenever `a` is
/// non-empty, so `Derivation` does not implement [`super::Closed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivation(pub BTreeSet<Vec<String>>);

impl Derivation {
    /// A single derivation yielding exactly `leaves`.
    pub fn leaf(leaves: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Derivation(BTreeSet::from([leaves.into_iter().map(Into::into).collect()]))
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{}]", d.join("."))?;
        }
        write!(f, "}}")
    }
}

impl Semiring for Derivation {
    fn zero() -> Self {
        Derivation(BTreeSet::new())
    }
    fn one() -> Self {
        Derivation(BTreeSet::from([Vec::new()]))
    }
    fn plus(&self, rhs: &Self) -> Self {
        Derivation(self.0.union(&rhs.0).cloned().collect())
    }
    fn times(&self, rhs: &Self) -> Self {
        let mut out = BTreeSet::new();
        for a in &self.0 {
            for b in &rhs.0 {
                let mut seq = a.clone();
                seq.extend(b.iter().cloned());
                out.insert(seq);
            }
        }
        Derivation(out)
    }
    const IS_IDEMPOTENT: bool = true;
    const IS_SUPERIOR: bool = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_idempotent() {
        let a = Derivation::leaf(["x"]);
        assert_eq!(a.plus(&a), a);
    }

    #[test]
    fn zero_annihilates_times() {
        let a = Derivation::leaf(["x"]);
        assert_eq!(Derivation::zero().times(&a), Derivation::zero());
        assert_eq!(a.times(&Derivation::zero()), Derivation::zero());
    }

    #[test]
    fn concat_is_associative_via_sequence_append() {
        let a = Derivation::leaf(["a"]);
        let b = Derivation::leaf(["b"]);
        let c = Derivation::leaf(["c"]);
        assert_eq!(a.times(&b).times(&c), a.times(&b.times(&c)));
    }
}
