//! The weighted finite-state automaton (WFSA) data model.
//!
//! An [`Fsa<R>`] is `⟨Σ, Q, δ, λ, ρ⟩`: an alphabet, a finite state set, a
//! weighted transition function, and initial/final weight maps. Construction
//! is imperative (`add_state`/`add_arc`/`set_i`/`set_f`); algorithms over an
//! `Fsa` always build and return a *fresh* one rather than mutating their
//! input, so a reference to an automaton remains valid for reuse across
//! multiple algorithm calls.

pub mod determinize;
pub mod epsremoval;
pub mod intersect;
pub mod minimize;
pub mod push;
pub mod rational;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::semiring::Semiring;
use crate::state::{State, StateArena};
use crate::symbol::Sym;

/// `⟨Σ, Q, δ, λ, ρ⟩` over a semiring `R`.
#[derive(Clone, Debug)]
pub struct Fsa<R: Semiring> {
    sigma: BTreeSet<Sym>,
    q: BTreeSet<State>,
    delta: BTreeMap<State, BTreeMap<Sym, BTreeMap<State, R>>>,
    lambda: BTreeMap<State, R>,
    rho: BTreeMap<State, R>,
    arena: StateArena,
    frozen: bool,
}

impl<R: Semiring> Default for Fsa<R> {
    fn default() -> Self {
        Fsa {
            sigma: BTreeSet::new(),
            q: BTreeSet::new(),
            delta: BTreeMap::new(),
            lambda: BTreeMap::new(),
            rho: BTreeMap::new(),
            arena: StateArena::new(),
            frozen: false,
        }
    }
}

impl<R: Semiring> Fsa<R> {
    /// An automaton with no states, no arcs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate and register a fresh state, owned by this automaton's arena.
    pub fn fresh_state(&mut self) -> State {
        let s = self.arena.fresh();
        self.q.insert(s.clone());
        s
    }

    /// Allocate and register a fresh, display-labeled state.
    pub fn fresh_state_labeled(&mut self, label: impl Into<String>) -> State {
        let s = self.arena.fresh_labeled(label);
        self.q.insert(s.clone());
        s
    }

    /// Register a state built by some other arena (e.g. a `PairStateTable`).
    pub fn add_state(&mut self, q: State) {
        self.q.insert(q);
    }

    /// `δ(i, a, j) ⊕= w`: add to any existing weight on this transition
    /// rather than overwriting it, matching repeated calls accumulating
    /// weight the way `rayuela`'s `add_arc` does.
    pub fn add_arc(&mut self, i: State, a: Sym, j: State, w: R) {
        self.q.insert(i.clone());
        self.q.insert(j.clone());
        self.sigma.insert(a.clone());
        let existing = self
            .delta
            .entry(i)
            .or_default()
            .entry(a)
            .or_default()
            .entry(j)
            .or_insert_with(R::zero);
        *existing = existing.plus(&w);
    }

    /// `δ(i, a, j) := w`, overwriting any existing weight.
    pub fn set_arc(&mut self, i: State, a: Sym, j: State, w: R) {
        self.q.insert(i.clone());
        self.q.insert(j.clone());
        self.sigma.insert(a.clone());
        self.delta.entry(i).or_default().entry(a).or_default().insert(j, w);
    }

    /// `λ(q) ⊕= w` (default `one` when `w` is `None`).
    pub fn add_i(&mut self, q: State, w: Option<R>) {
        self.q.insert(q.clone());
        let w = w.unwrap_or_else(R::one);
        let existing = self.lambda.entry(q).or_insert_with(R::zero);
        *existing = existing.plus(&w);
    }

    /// `λ(q) := w` (default `one` when `w` is `None`).
    pub fn set_i(&mut self, q: State, w: Option<R>) {
        self.q.insert(q.clone());
        self.lambda.insert(q, w.unwrap_or_else(R::one));
    }

    /// `ρ(q) ⊕= w` (default `one` when `w` is `None`).
    pub fn add_f(&mut self, q: State, w: Option<R>) {
        self.q.insert(q.clone());
        let w = w.unwrap_or_else(R::one);
        let existing = self.rho.entry(q).or_insert_with(R::zero);
        *existing = existing.plus(&w);
    }

    /// `ρ(q) := w` (default `one` when `w` is `None`).
    pub fn set_f(&mut self, q: State, w: Option<R>) {
        self.q.insert(q.clone());
        self.rho.insert(q, w.unwrap_or_else(R::one));
    }

    /// Mark construction complete. Purely advisory bookkeeping; no method on
    /// `Fsa` actually refuses to mutate a frozen automaton, since every
    /// algorithm in this crate only ever builds a fresh automaton rather
    /// than mutating one it was handed.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether [`Fsa::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The alphabet observed so far (every symbol used by some arc).
    pub fn sigma(&self) -> &BTreeSet<Sym> {
        &self.sigma
    }

    /// All registered states, in id order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.q.iter()
    }

    /// `|Q|`.
    pub fn num_states(&self) -> usize {
        self.q.len()
    }

    /// `λ`: initial states with nonzero initial weight.
    pub fn initials(&self) -> impl Iterator<Item = (State, R)> + '_ {
        self.lambda.iter().map(|(q, w)| (q.clone(), w.clone()))
    }

    /// `ρ`: final states with nonzero final weight.
    pub fn finals(&self) -> impl Iterator<Item = (State, R)> + '_ {
        self.rho.iter().map(|(q, w)| (q.clone(), w.clone()))
    }

    /// `λ(q)`, or `zero` if `q` is not initial.
    pub fn lambda(&self, q: &State) -> R {
        self.lambda.get(q).cloned().unwrap_or_else(R::zero)
    }

    /// `ρ(q)`, or `zero` if `q` is not final.
    pub fn rho(&self, q: &State) -> R {
        self.rho.get(q).cloned().unwrap_or_else(R::zero)
    }

    /// All outgoing arcs `(a, j, w)` from `q`, in `(symbol, target)` order.
    pub fn arcs(&self, q: &State) -> impl Iterator<Item = (Sym, State, R)> + '_ {
        self.delta.get(q).into_iter().flat_map(|by_sym| {
            by_sym.iter().flat_map(|(a, by_tgt)| {
                by_tgt.iter().map(move |(j, w)| (a.clone(), j.clone(), w.clone()))
            })
        })
    }

    /// `δ(q, a)`: targets reachable from `q` on `a` alone.
    pub fn arcs_on(&self, q: &State, a: &Sym) -> impl Iterator<Item = (State, R)> + '_ {
        self.delta
            .get(q)
            .and_then(|by_sym| by_sym.get(a))
            .into_iter()
            .flat_map(|by_tgt| by_tgt.iter().map(|(j, w)| (j.clone(), w.clone())))
    }

    /// `δ(i, a, j)`, or `zero` if no such arc exists.
    pub fn arc_weight(&self, i: &State, a: &Sym, j: &State) -> R {
        self.delta
            .get(i)
            .and_then(|by_sym| by_sym.get(a))
            .and_then(|by_tgt| by_tgt.get(j))
            .cloned()
            .unwrap_or_else(R::zero)
    }

    /// True iff no cycle is reachable from an initial state.
    pub fn acyclic(&self) -> bool {
        crate::graph::acyclic(self)
    }

    /// True iff every state has at most one outgoing arc per symbol.
    pub fn deterministic(&self) -> bool {
        self.delta
            .values()
            .all(|by_sym| by_sym.values().all(|by_tgt| by_tgt.len() <= 1))
    }

    /// True iff, for every symbol used anywhere, every state has an
    /// outgoing arc on it — the precondition [`minimize`](minimize::minimize)
    /// requires.
    pub fn complete(&self) -> bool {
        self.q.iter().all(|q| {
            self.sigma.iter().all(|a| self.delta.get(q).map(|by_sym| by_sym.contains_key(a)).unwrap_or(false))
        })
    }

    /// A fresh, empty automaton over the same state/alphabet bookkeeping
    /// convention (new arena, no states copied) — used by algorithms that
    /// build a result from scratch but want id allocation independent of
    /// `self`.
    pub fn spawn(&self) -> Self {
        Self::new()
    }

    /// A deep copy (same states, arcs, weights); the copy's arena continues
    /// allocating past the highest id currently assigned, so further
    /// `fresh_state` calls on the copy never collide with `self`'s states.
    pub fn copy(&self) -> Self {
        let mut out = self.clone();
        let max_id = out.q.iter().map(State::id).max().unwrap_or(0);
        out.arena = StateArena::new();
        for _ in 0..=max_id {
            out.arena.fresh();
        }
        out
    }

    /// The reverse automaton: `Σ` unchanged, arcs flipped (`δ(j,a,i) := δ(i,a,j)`),
    /// and `λ`/`ρ` swapped.
    pub fn reverse(&self) -> Self {
        let mut out = Fsa {
            sigma: self.sigma.clone(),
            q: self.q.clone(),
            delta: BTreeMap::new(),
            lambda: self.rho.clone(),
            rho: self.lambda.clone(),
            arena: self.arena.clone(),
            frozen: false,
        };
        for (i, by_sym) in &self.delta {
            for (a, by_tgt) in by_sym {
                for (j, w) in by_tgt {
                    out.set_arc(j.clone(), a.clone(), i.clone(), w.clone());
                }
            }
        }
        out
    }

    /// States reachable from some initial state.
    pub fn accessible(&self) -> BTreeSet<State> {
        crate::graph::accessible(self)
    }

    /// States from which some final state is reachable.
    pub fn coaccessible(&self) -> BTreeSet<State> {
        crate::graph::coaccessible(self)
    }

    /// The sub-automaton induced by states that are both accessible and
    /// coaccessible — every surviving state lies on some accepting path.
    pub fn trim(&self) -> Self {
        let keep: BTreeSet<State> = self.accessible().intersection(&self.coaccessible()).cloned().collect();
        let mut out = Fsa::new();
        out.arena = self.arena.clone();
        for q in &keep {
            out.add_state(q.clone());
        }
        for (q, w) in self.initials() {
            if keep.contains(&q) {
                out.set_i(q, Some(w));
            }
        }
        for (q, w) in self.finals() {
            if keep.contains(&q) {
                out.set_f(q, Some(w));
            }
        }
        for i in &keep {
            for (a, j, w) in self.arcs(i) {
                if keep.contains(&j) {
                    out.set_arc(i.clone(), a, j, w);
                }
            }
        }
        out
    }

    /// The weight every arc contributes to the total pathsum, via
    /// [`crate::pathsum::edge_marginals`].
    pub fn edge_marginals(&self) -> Result<BTreeMap<(State, Sym, State), R>, crate::pathsum::PathsumError> {
        crate::pathsum::edge_marginals(self)
    }

    /// The weight this automaton assigns to `word`, by intersecting with a
    /// straight-line acceptor for `word` (weight `one` on every transition)
    /// and summing the result with `strategy`.
    pub fn accept(&self, word: &[Sym], strategy: crate::pathsum::Strategy) -> Result<R, crate::pathsum::PathsumError> {
        let mut acceptor = Fsa::new();
        let mut prev = acceptor.fresh_state();
        acceptor.set_i(prev.clone(), None);
        for sym in word {
            let next = acceptor.fresh_state();
            acceptor.add_arc(prev.clone(), sym.clone(), next.clone(), R::one());
            prev = next;
        }
        acceptor.set_f(prev, None);
        crate::pathsum::pathsum(&intersect::intersect(self, &acceptor), strategy)
    }

    /// Weighted language equivalence — left unimplemented, matching
    /// `FSA.equivalent` in the source this crate is grounded on.
    pub fn equivalent(&self, _other: &Fsa<R>) -> Result<bool, EquivalentError> {
        Err(EquivalentError::NotSupported)
    }
}

/// [`Fsa::equivalent`] failure modes.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EquivalentError {
    /// Left unimplemented, matching `FSA.equivalent` in the source this
    /// crate is grounded on.
    #[error("equivalence checking is not supported")]
    NotSupported,
}

impl<R: Semiring> fmt::Display for Fsa<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FSA with {} states, {} symbols", self.q.len(), self.sigma.len())?;
        for (q, w) in self.initials() {
            writeln!(f, "  initial: {q} / {w}")?;
        }
        for q in self.states() {
            for (a, j, w) in self.arcs(q) {
                writeln!(f, "  {q} --{a}/{w}--> {j}")?;
            }
        }
        for (q, w) in self.finals() {
            writeln!(f, "  final: {q} / {w}")?;
        }
        Ok(())
    }
}
