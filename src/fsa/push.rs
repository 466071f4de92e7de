//! Weight pushing: reweight every arc by a per-state potential so that, for
//! every state on an accepting path, locally-available weight reflects the
//! best completion — the classical use is turning a tropical automaton into
//! one usable for admissible A* search.

use std::collections::BTreeMap;

use crate::pathsum::{self, PathsumError, Strategy};
use crate::semiring::{Closed, Invertible, Semiring};
use crate::state::State;

use super::Fsa;

/// Errors specific to weight pushing.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PushError {
    /// The potential computation itself failed.
    #[error(transparent)]
    Pathsum(#[from] PathsumError),
    /// After pushing, re-verification found the automaton is not pushed —
    /// an internal-consistency failure, not a user precondition violation.
    #[error("weight pushing postcondition violated: potentials are not all `one` after push")]
    NotPushed,
}

/// `w(i,a,j) ↦ V(i)⁻¹ ⊗ w(i,a,j) ⊗ V(j)`, `ρ(i) ↦ V(i)⁻¹ ⊗ ρ(i)`, and
/// `λ(i) ↦ λ(i) ⊗ V(i)`, for an arbitrary potential map `V`.
///
/// Does not verify the result is actually pushed (`V` could be anything) —
/// used internally by [`crate::pathsum::johnson`], which supplies
/// Bellman-Ford potentials it already trusts. Prefer [`push`] for the
/// checked, backward-potential-computing entry point.
pub fn push_with_potential_unchecked<R: Semiring + Invertible>(
    fsa: &Fsa<R>,
    v: &BTreeMap<State, R>,
) -> Result<Fsa<R>, PathsumError> {
    let get = |q: &State| v.get(q).cloned().unwrap_or_else(R::one);
    let mut out = Fsa::new();
    for q in fsa.states() {
        out.add_state(q.clone());
    }
    for (q, w) in fsa.initials() {
        out.set_i(q.clone(), Some(w.times(&get(&q))));
    }
    for (q, w) in fsa.finals() {
        let vi = get(&q);
        let inv = vi.inverse()?;
        out.set_f(q, Some(inv.times(&w)));
    }
    for i in fsa.states() {
        let vi_inv = get(i).inverse()?;
        for (a, j, w) in fsa.arcs(i) {
            let vj = get(&j);
            out.set_arc(i.clone(), a, j, vi_inv.times(&w).times(&vj));
        }
    }
    Ok(out)
}

/// Push weights by the automaton's own backward potentials (`V = β`),
/// computed via [`Strategy::Lehmann`], then verify the result is actually
/// pushed (every state's recomputed potential is `one`).
pub fn push<R: Semiring + Closed + Invertible>(fsa: &Fsa<R>) -> Result<Fsa<R>, PushError> {
    let v = pathsum::decomposed_lehmann_bwd(fsa)?;
    let out = push_with_potential_unchecked(fsa, &v)?;
    if !is_pushed(&out)? {
        return Err(PushError::NotPushed);
    }
    Ok(out)
}

/// True iff every state's backward potential is `one` — the defining
/// property of a pushed automaton.
pub fn is_pushed<R: Semiring + Closed>(fsa: &Fsa<R>) -> Result<bool, PathsumError> {
    let beta = pathsum::decomposed_lehmann_bwd(fsa)?;
    Ok(fsa.states().all(|q| {
        let b = beta.get(q).cloned().unwrap_or_else(R::zero);
        b == R::one() || b == R::zero()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Tropical;
    use crate::symbol::Sym;

    #[test]
    fn pushing_preserves_pathsum() {
        let mut fsa: Fsa<Tropical> = Fsa::new();
        let a = fsa.fresh_state();
        let b = fsa.fresh_state();
        let c = fsa.fresh_state();
        fsa.set_i(a.clone(), Some(Tropical(0.0)));
        fsa.add_arc(a, Sym::sym("x"), b.clone(), Tropical(2.0));
        fsa.add_arc(b.clone(), Sym::sym("y"), c.clone(), Tropical(3.0));
        fsa.set_f(c, Some(Tropical(0.0)));

        let before = pathsum::pathsum(&fsa, Strategy::Viterbi).unwrap();
        let pushed = push(&fsa).unwrap();
        let after = pathsum::pathsum(&pushed, Strategy::Viterbi).unwrap();
        assert_eq!(before, after);
    }
}
