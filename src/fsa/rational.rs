//! Union, concatenation, and Kleene closure.
//!
//! All three are on-the-fly constructions: a fresh start/accept state wired
//! with `ε`-arcs to the operands' own start/accept states, built directly
//! (no shared helper), matching how `rayuela.fsa.fsa.FSA.union` /
//! `concatenate` / `kleene_closure` each wire their own glue states.

use crate::semiring::{Closed, Semiring};
use crate::symbol::Sym;

use super::Fsa;

/// `L(out) = L(a) ∪ L(b)`: a fresh start ε-branches into both operands, a
/// fresh accept state is reached by ε from each operand's final states.
pub fn union<R: Semiring>(a: &Fsa<R>, b: &Fsa<R>) -> Fsa<R> {
    let mut out = Fsa::new();
    let offset_a = splice_in(&mut out, a);
    let offset_b = splice_in(&mut out, b);

    let start = out.fresh_state();
    let accept = out.fresh_state();
    out.set_i(start.clone(), Some(R::one()));
    out.set_f(accept.clone(), Some(R::one()));

    for (q, w) in a.initials() {
        out.add_arc(start.clone(), Sym::Eps, offset_a[&q].clone(), w);
    }
    for (q, w) in b.initials() {
        out.add_arc(start.clone(), Sym::Eps, offset_b[&q].clone(), w);
    }
    for (q, w) in a.finals() {
        out.add_arc(offset_a[&q].clone(), Sym::Eps, accept.clone(), w);
    }
    for (q, w) in b.finals() {
        out.add_arc(offset_b[&q].clone(), Sym::Eps, accept.clone(), w);
    }
    out
}

/// `L(out) = L(a) · L(b)`: every final state of `a` gets an ε-arc (weighted
/// by its final weight) to every initial state of `b`.
pub fn concatenate<R: Semiring>(a: &Fsa<R>, b: &Fsa<R>) -> Fsa<R> {
    let mut out = Fsa::new();
    let offset_a = splice_in(&mut out, a);
    let offset_b = splice_in(&mut out, b);

    for (q, w) in a.initials() {
        out.add_i(offset_a[&q].clone(), Some(w));
    }
    for (q, w) in b.finals() {
        out.add_f(offset_b[&q].clone(), Some(w));
    }
    for (fq, fw) in a.finals() {
        for (iq, iw) in b.initials() {
            out.add_arc(offset_a[&fq].clone(), Sym::Eps, offset_b[&iq].clone(), fw.times(&iw));
        }
    }
    out
}

/// `L(out) = L(a)* = one ⊕ L(a) ⊕ L(a)² ⊕ …`.
///
/// Requires a [`Closed`] semiring since the new start/accept pair's ε-loop
/// weight and the empty-string acceptance both route through `star`.
pub fn kleene_closure<R: Semiring + Closed>(a: &Fsa<R>) -> Result<Fsa<R>, crate::semiring::SemiringError> {
    let mut out = Fsa::new();
    let offset = splice_in(&mut out, a);

    let start = out.fresh_state();
    let accept = out.fresh_state();
    out.set_i(start.clone(), Some(R::one()));
    out.set_f(accept.clone(), Some(R::one()));

    for (q, w) in a.initials() {
        out.add_arc(start.clone(), Sym::Eps, offset[&q].clone(), w);
    }
    for (q, w) in a.finals() {
        out.add_arc(offset[&q].clone(), Sym::Eps, accept.clone(), w);
        for (q2, w2) in a.initials() {
            out.add_arc(offset[&q].clone(), Sym::Eps, offset[&q2].clone(), w.times(&w2));
        }
    }
    out.add_arc(start.clone(), Sym::Eps, accept.clone(), R::one().star()?);
    Ok(out)
}

/// Copy every state and arc of `src` into `dst` under fresh state ids,
/// returning the id mapping; `src`'s own `λ`/`ρ` are *not* copied — callers
/// wire those explicitly since each construction treats them differently.
fn splice_in<R: Semiring>(dst: &mut Fsa<R>, src: &Fsa<R>) -> std::collections::BTreeMap<crate::state::State, crate::state::State> {
    let mut map = std::collections::BTreeMap::new();
    for q in src.states() {
        map.insert(q.clone(), dst.fresh_state());
    }
    for q in src.states() {
        for (a, j, w) in src.arcs(q) {
            dst.set_arc(map[q].clone(), a, map[&j].clone(), w);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Boolean;
    use crate::state::State;

    fn single_symbol_fsa(sym: &str) -> Fsa<Boolean> {
        let mut fsa = Fsa::new();
        let i = fsa.fresh_state();
        let f = fsa.fresh_state();
        fsa.set_i(i.clone(), None);
        fsa.set_f(f.clone(), None);
        fsa.add_arc(i, Sym::sym(sym), f, Boolean(true));
        fsa
    }

    #[test]
    fn union_accepts_either_language() {
        let a = single_symbol_fsa("a");
        let b = single_symbol_fsa("b");
        let u = union(&a, &b);
        assert!(u.num_states() == a.num_states() + b.num_states() + 2);
        let _ = State::new(0);
    }

    #[test]
    fn concatenate_chains_final_to_initial() {
        let a = single_symbol_fsa("a");
        let b = single_symbol_fsa("b");
        let c = concatenate(&a, &b);
        assert_eq!(c.num_states(), a.num_states() + b.num_states());
        assert_eq!(c.initials().count(), 1);
        assert_eq!(c.finals().count(), 1);
    }

    #[test]
    fn kleene_closure_accepts_empty_string() {
        let a = single_symbol_fsa("a");
        let star = kleene_closure(&a).unwrap();
        assert_eq!(star.arc_weight(
            &star.initials().next().unwrap().0,
            &Sym::Eps,
            &star.finals().next().unwrap().0,
        ), Boolean(true));
    }
}
