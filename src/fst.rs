//! Weighted finite-state transducers: a WFSA-like automaton whose arcs carry
//! an independent input and output symbol.
//!
//! `top_compose`/`bottom_compose` build the on-the-fly product of two
//! transducers, matching one's output against the other's input (or vice
//! versa). Unlike [`crate::fsa::intersect`], there is **no epsilon filter**
//! here — a known simplification carried over as-is from the source this
//! crate is grounded on, which omits one too. Without it, an `ε` on one
//! side only composes against an explicit `ε` on the other (it cannot
//! advance independently), so compositions involving genuinely
//! epsilon-heavy transducers may under-produce arcs relative to a
//! filtered composition. This is a documented caveat, not a bug to silently
//! patch by importing `fsa::intersect`'s filter — composing transducers
//! with a proper filter is out of scope here.

use std::collections::BTreeMap;

use crate::semiring::Semiring;
use crate::state::{PairStateTable, State, StateArena};
use crate::symbol::Sym;

/// A weighted transducer `⟨Σ, Δ, Q, δ, λ, ρ⟩`: like [`crate::fsa::Fsa`] but
/// each arc carries an input symbol *and* an output symbol.
#[derive(Clone, Debug)]
pub struct Wfst<R: Semiring> {
    q: std::collections::BTreeSet<State>,
    delta: BTreeMap<(State, Sym, Sym, State), R>,
    lambda: BTreeMap<State, R>,
    rho: BTreeMap<State, R>,
    arena: StateArena,
}

impl<R: Semiring> Default for Wfst<R> {
    fn default() -> Self {
        Wfst {
            q: std::collections::BTreeSet::new(),
            delta: BTreeMap::new(),
            lambda: BTreeMap::new(),
            rho: BTreeMap::new(),
            arena: StateArena::new(),
        }
    }
}

impl<R: Semiring> Wfst<R> {
    /// An empty transducer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh state.
    pub fn fresh_state(&mut self) -> State {
        let s = self.arena.fresh();
        self.q.insert(s.clone());
        s
    }

    /// Register a state allocated elsewhere.
    pub fn add_state(&mut self, q: State) {
        self.q.insert(q);
    }

    /// `δ(i, x, y, j) ⊕= w`.
    pub fn add_arc(&mut self, i: State, x: Sym, y: Sym, j: State, w: R) {
        self.q.insert(i.clone());
        self.q.insert(j.clone());
        let e = self.delta.entry((i, x, y, j)).or_insert_with(R::zero);
        *e = e.plus(&w);
    }

    /// `λ(q) := w` (default `one`).
    pub fn set_i(&mut self, q: State, w: Option<R>) {
        self.q.insert(q.clone());
        self.lambda.insert(q, w.unwrap_or_else(R::one));
    }

    /// `ρ(q) := w` (default `one`).
    pub fn set_f(&mut self, q: State, w: Option<R>) {
        self.q.insert(q.clone());
        self.rho.insert(q, w.unwrap_or_else(R::one));
    }

    /// All registered states.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.q.iter()
    }

    /// `λ`.
    pub fn initials(&self) -> impl Iterator<Item = (State, R)> + '_ {
        self.lambda.iter().map(|(q, w)| (q.clone(), w.clone()))
    }

    /// `ρ`.
    pub fn finals(&self) -> impl Iterator<Item = (State, R)> + '_ {
        self.rho.iter().map(|(q, w)| (q.clone(), w.clone()))
    }

    /// `ρ(q)`, or `zero`.
    pub fn rho(&self, q: &State) -> R {
        self.rho.get(q).cloned().unwrap_or_else(R::zero)
    }

    /// `λ(q)`, or `zero`.
    pub fn lambda(&self, q: &State) -> R {
        self.lambda.get(q).cloned().unwrap_or_else(R::zero)
    }

    /// All outgoing `(input, output, target, weight)` arcs from `q`.
    pub fn arcs(&self, q: &State) -> impl Iterator<Item = (Sym, Sym, State, R)> + '_ {
        self.delta
            .iter()
            .filter(move |((i, _, _, _), _)| i == q)
            .map(|((_, x, y, j), w)| (x.clone(), y.clone(), j.clone(), w.clone()))
    }
}

/// Match `left`'s output symbol against `right`'s input symbol: the result
/// maps `left`'s input tape to `right`'s output tape.
pub fn top_compose<R: Semiring>(left: &Wfst<R>, right: &Wfst<R>) -> Wfst<R> {
    compose(left, right, true)
}

/// Match `left`'s input symbol against `right`'s output symbol: the result
/// maps `right`'s input tape to `left`'s output tape.
pub fn bottom_compose<R: Semiring>(left: &Wfst<R>, right: &Wfst<R>) -> Wfst<R> {
    compose(left, right, false)
}

fn compose<R: Semiring>(left: &Wfst<R>, right: &Wfst<R>, top: bool) -> Wfst<R> {
    let mut out = Wfst::new();
    let mut table = PairStateTable::new();
    let mut queue: std::collections::VecDeque<(State, State)> = std::collections::VecDeque::new();
    let mut seen: std::collections::BTreeSet<State> = std::collections::BTreeSet::new();

    for (p1, w1) in left.initials() {
        for (p2, w2) in right.initials() {
            let s = table.get_or_insert(&p1, &p2);
            out.add_state(s.clone());
            out.set_i(s.clone(), Some(w1.times(&w2)));
            if seen.insert(s.clone()) {
                queue.push_back((p1.clone(), p2.clone()));
            }
        }
    }

    while let Some((p1, p2)) = queue.pop_front() {
        let here = table.get_or_insert(&p1, &p2);

        let f1 = left.rho(&p1);
        let f2 = right.rho(&p2);
        if f1 != R::zero() && f2 != R::zero() {
            out.set_f(here.clone(), Some(f1.times(&f2)));
        }

        for (x1, y1, j1, w1) in left.arcs(&p1) {
            for (x2, y2, j2, w2) in right.arcs(&p2) {
                let matches = if top { y1 == x2 } else { x1 == y2 };
                if !matches {
                    continue;
                }
                let target = table.get_or_insert(&j1, &j2);
                out.add_state(target.clone());
                let (outer_in, outer_out) = if top { (x1.clone(), y2.clone()) } else { (x2.clone(), y1.clone()) };
                out.add_arc(here.clone(), outer_in, outer_out, target.clone(), w1.times(&w2));
                if seen.insert(target.clone()) {
                    queue.push_back((j1.clone(), j2.clone()));
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

    #[test]
    fn composes_matching_symbols() {
        let mut left: Wfst<Boolean> = Wfst::new();
        let l0 = left.fresh_state();
        let l1 = left.fresh_state();
        left.set_i(l0.clone(), None);
        left.set_f(l1.clone(), None);
        left.add_arc(l0, Sym::sym("a"), Sym::sym("b"), l1, Boolean(true));

        let mut right: Wfst<Boolean> = Wfst::new();
        let r0 = right.fresh_state();
        let r1 = right.fresh_state();
        right.set_i(r0.clone(), None);
        right.set_f(r1.clone(), None);
        right.add_arc(r0, Sym::sym("b"), Sym::sym("c"), r1, Boolean(true));

        let composed = top_compose(&left, &right);
        let (start, _) = composed.initials().next().unwrap();
        let (sym_in, sym_out, _, w) = composed.arcs(&start).next().unwrap();
        assert_eq!(sym_in, Sym::sym("a"));
        assert_eq!(sym_out, Sym::sym("c"));
        assert_eq!(w, Boolean(true));
    }
}
