//! Epsilon removal: fold every `ε`-only path into the real-symbol arcs (and
//! initial/final weights) it connects, producing an equivalent
//! epsilon-free automaton.
//!
//! The automaton is partitioned into its `ε`-only sub-automaton `E` and its
//! non-epsilon arcs `N`. `W = closure(E)` (via [`crate::pathsum::lehmann`],
//! restricted to `E`'s arcs) gives, for every pair `(i, k)`, the total
//! weight of every `ε`-path from `i` to `k` (including the identity path
//! `i = k`, weight `one`). Every real-symbol arc `i --a/w--> j` is then
//! raised to `i --a/(w ⊗ W[j][k])--> k` for every `k` reachable from `j` by
//! a pure-`ε` path (this subsumes `j` itself, via `W[j][j] = one`, so `N`'s
//! own arcs don't need to be copied separately). Only initial weights are
//! raised through the closure, `λ'(j) = ⊕_i λ(i) ⊗ W[i][j]`; final weights
//! are carried over unchanged (`ρ'= ρ`) — an `ε`-path already ends at a
//! real-symbol arc's target or at `N`'s own final states, so raising `ρ`
//! as well would double-count the weight of every `ε`-path into a final
//! state.

use crate::semiring::Closed;
use crate::state::State;
use crate::symbol::Sym;

use super::Fsa;

/// `δ`, `λ`, `ρ` with every `ε`-path folded away. Requires `R: Closed` since
/// the `ε`-closure may itself contain cycles.
pub fn eps_removal<R: crate::semiring::Semiring + Closed>(
    fsa: &Fsa<R>,
) -> Result<Fsa<R>, crate::semiring::SemiringError> {
    let mut e = Fsa::new();
    for q in fsa.states() {
        e.add_state(q.clone());
    }
    for q in fsa.states() {
        for (a, j, w) in fsa.arcs(q) {
            if a.is_epsilon() {
                e.set_arc(q.clone(), a, j, w);
            }
        }
    }
    let w = crate::pathsum::lehmann(&e)?;

    let mut out: Fsa<R> = Fsa::new();
    for q in fsa.states() {
        out.add_state(q.clone());
    }

    let get_w = |i: &State, k: &State| w.get(&(i.clone(), k.clone())).cloned().unwrap_or_else(R::zero);

    for (i, lam) in fsa.initials() {
        for j in fsa.states() {
            let wij = get_w(&i, j);
            if wij == R::zero() {
                continue;
            }
            out.add_i(j.clone(), Some(lam.times(&wij)));
        }
    }

    for i in fsa.states() {
        let rho_i = fsa.rho(i);
        if rho_i != R::zero() {
            out.add_f(i.clone(), Some(rho_i));
        }
    }

    for i in fsa.states() {
        for (a, j, weight) in fsa.arcs(i) {
            if a.is_epsilon() {
                continue;
            }
            for k in fsa.states() {
                let wjk = get_w(&j, k);
                if wjk == R::zero() {
                    continue;
                }
                out.add_arc(i.clone(), a.clone(), k.clone(), weight.times(&wjk));
            }
        }
    }

    Ok(out)
}
