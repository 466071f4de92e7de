//! On-the-fly weighted intersection with a 3-state epsilon filter.
//!
//! Naively pairing up every `ε`-arc of the left operand with every `ε`-arc
//! of the right operand lets the product automaton take both operands'
//! epsilon arcs in either order, producing two distinct paths for what
//! should be one step — and the reconstructed weight would double-count. A
//! 3-state filter blocks this: in filter state 0 either side may start
//! advancing alone; having started, the *other* side is blocked from also
//! advancing on `ε` until a real, jointly-matched symbol resets the filter
//! back to 0.
//!
//! States advancing alone are re-tagged `ε₁`/`ε₂` ([`Sym::Eps1`]/
//! [`Sym::Eps2`]) rather than left as plain `ε`, so the emitted automaton
//! records which operand moved.

use std::collections::VecDeque;

use crate::semiring::Semiring;
use crate::state::{PairStateTable, State};
use crate::symbol::Sym;

use super::Fsa;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Filter {
    Neutral = 0,
    OnlyLeft = 1,
    OnlyRight = 2,
}

/// `L(out) = L(a) ∩ L(b)` (as a weighted language: `w_out(x) = w_a(x) ⊗ w_b(x)`).
pub fn intersect<R: Semiring>(a: &Fsa<R>, b: &Fsa<R>) -> Fsa<R> {
    let mut out = Fsa::new();
    // One PairStateTable per filter state: the same `(p, q)` pair reached
    // under a different filter marker is a genuinely different product
    // state, so each marker gets its own identity table.
    let mut tables = [PairStateTable::new(), PairStateTable::new(), PairStateTable::new()];

    let mut queue: VecDeque<(State, State, Filter)> = VecDeque::new();
    let mut seen: std::collections::BTreeSet<State> = std::collections::BTreeSet::new();

    for (p1, w1) in a.initials() {
        for (p2, w2) in b.initials() {
            let s = tables[Filter::Neutral as usize].get_or_insert(&p1, &p2);
            out.add_state(s.clone());
            out.add_i(s.clone(), Some(w1.times(&w2)));
            if seen.insert(s.clone()) {
                queue.push_back((p1.clone(), p2.clone(), Filter::Neutral));
            }
        }
    }

    while let Some((p1, p2, f)) = queue.pop_front() {
        let here = tables[f as usize].get_or_insert(&p1, &p2);

        let f1 = a.rho(&p1);
        let f2 = b.rho(&p2);
        if f1 != R::zero() && f2 != R::zero() {
            out.add_f(here.clone(), Some(f1.times(&f2)));
        }

        // Jointly-matched real symbols: always allowed, resets to Neutral.
        for (sym, j1, w1) in a.arcs(&p1) {
            if sym.is_epsilon() {
                continue;
            }
            for (j2, w2) in b.arcs_on(&p2, &sym) {
                let target = tables[Filter::Neutral as usize].get_or_insert(&j1, &j2);
                out.add_state(target.clone());
                out.add_arc(here.clone(), sym.clone(), target.clone(), w1.times(&w2));
                if seen.insert(target.clone()) {
                    queue.push_back((j1.clone(), j2.clone(), Filter::Neutral));
                }
            }
        }

        // Left operand advances alone on its own ε, unless the right
        // operand is mid-advance (filter state OnlyRight).
        if f != Filter::OnlyRight {
            for (j1, w1) in a.arcs_on(&p1, &Sym::Eps) {
                let target = tables[Filter::OnlyLeft as usize].get_or_insert(&j1, &p2);
                out.add_state(target.clone());
                out.add_arc(here.clone(), Sym::Eps2, target.clone(), w1);
                if seen.insert(target.clone()) {
                    queue.push_back((j1.clone(), p2.clone(), Filter::OnlyLeft));
                }
            }
        }

        // Right operand advances alone on its own ε, unless the left
        // operand is mid-advance.
        if f != Filter::OnlyLeft {
            for (j2, w2) in b.arcs_on(&p2, &Sym::Eps) {
                let target = tables[Filter::OnlyRight as usize].get_or_insert(&p1, &j2);
                out.add_state(target.clone());
                out.add_arc(here.clone(), Sym::Eps1, target.clone(), w2);
                if seen.insert(target.clone()) {
                    queue.push_back((p1.clone(), j2.clone(), Filter::OnlyRight));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Boolean;

    fn accepts(fsa: &Fsa<Boolean>, word: &[&str]) -> bool {
        fsa.initials().any(|(q0, w0)| {
            let mut states = vec![(q0, w0)];
            for sym in word {
                let mut next = Vec::new();
                for (q, w) in &states {
                    for (j, wj) in fsa.arcs_on(q, &Sym::sym(*sym)) {
                        next.push((j, w.times(&wj)));
                    }
                }
                states = next;
                if states.is_empty() {
                    return false;
                }
            }
            states.iter().any(|(q, w)| {
                let f = fsa.rho(q);
                f != Boolean(false) && (*w).times(&f) != Boolean(false)
            })
        })
    }

    fn linear_acceptor(word: &[&str]) -> Fsa<Boolean> {
        let mut fsa = Fsa::new();
        let mut prev = fsa.fresh_state();
        fsa.set_i(prev.clone(), None);
        for sym in word {
            let next = fsa.fresh_state();
            fsa.add_arc(prev.clone(), Sym::sym(*sym), next.clone(), Boolean(true));
            prev = next;
        }
        fsa.set_f(prev, None);
        fsa
    }

    #[test]
    fn intersection_of_disjoint_words_rejects_everything() {
        let a = linear_acceptor(&["a", "b"]);
        let b = linear_acceptor(&["a", "c"]);
        let both = intersect(&a, &b);
        assert!(!accepts(&both, &["a", "b"]));
        assert!(!accepts(&both, &["a", "c"]));
    }

    #[test]
    fn intersection_of_identical_words_accepts_the_word() {
        let a = linear_acceptor(&["a", "b"]);
        let b = linear_acceptor(&["a", "b"]);
        let both = intersect(&a, &b);
        assert!(accepts(&both, &["a", "b"]));
    }
}
