//! Grammar-to-grammar transforms: epsilon removal, unary-chain collapsing,
//! and Chomsky normal form conversion, built on top of [`Wcfg`] plus the
//! automaton machinery in [`crate::fsa`]/[`crate::pathsum`] (unary chains
//! are just a single-symbol automaton in disguise — see [`unary_remove`]).
//!
//! Every fresh nonterminal minted here is named `@0`, `@1`, ... from a
//! counter private to one [`Transformer`] instance, so two transformer runs
//! never collide and the names stay visibly distinct from user nonterminals.

use std::collections::{BTreeMap, BTreeSet};

use crate::fsa::Fsa;
use crate::semiring::{Closed, Semiring};
use crate::state::State;
use crate::symbol::Sym;

use super::{treesum, CfgSym, Wcfg};

/// Mints fresh nonterminal names for one grammar-transform pipeline.
#[derive(Default)]
pub struct Transformer {
    counter: u64,
}

impl Transformer {
    /// A transformer with its fresh-name counter at zero.
    pub fn new() -> Self {
        Transformer { counter: 0 }
    }

    fn fresh_nonterminal(&mut self) -> String {
        let name = format!("@{}", self.counter);
        self.counter += 1;
        name
    }

    /// The weight of deriving `ε` from each nonterminal: `val(A) = ⊕` over
    /// productions `A → α` where every symbol in `α` is itself nullable, of
    /// `w ⊗ ⊗_{X ∈ α} val(X)` (`val` of an `ε` terminal is `one`). Computed
    /// the same way [`treesum::inside_values`] computes `value`, restricted
    /// to epsilon-only contributions, with the same acyclic-fast-path /
    /// bounded-relaxation fallback for nullability cycles (`A` nullable
    /// because `B` is nullable because `A` is).
    fn nullable_weights<R: Semiring>(g: &Wcfg<R>) -> BTreeMap<String, R> {
        let nonterminals: Vec<String> = g.nonterminals().map(str::to_string).collect();
        let mut value: BTreeMap<String, R> = nonterminals.iter().map(|n| (n.clone(), R::zero())).collect();

        let contribution = |rhs: &[CfgSym], value: &BTreeMap<String, R>| -> Option<R> {
            let mut acc = R::one();
            for sym in rhs {
                match sym {
                    CfgSym::Term(t) if t.is_epsilon() => {}
                    CfgSym::Term(_) => return None,
                    CfgSym::NonTerm(n) => {
                        let v = value.get(n).cloned().unwrap_or_else(R::zero);
                        if v == R::zero() {
                            return None;
                        }
                        acc = acc.times(&v);
                    }
                }
            }
            Some(acc)
        };

        // Nullability cycles through nonterminals are possible even when
        // the overall grammar's derivation graph is acyclic for ordinary
        // symbols, so this always relaxes to a fixpoint rather than trying
        // a topological fast path: `|V| + 1` rounds is enough for an
        // idempotent semiring, and a bounded approximation otherwise.
        let rounds = nonterminals.len() + 1;
        for _ in 0..rounds {
            for n in &nonterminals {
                let mut v = value[n].clone();
                for (rhs, w) in g.productions_for(n) {
                    if let Some(c) = contribution(rhs, &value) {
                        v = v.plus(&w.times(&c));
                    }
                }
                value.insert(n.clone(), v);
            }
        }
        value
    }

    /// Remove `ε`-productions, redistributing their weight into every
    /// production that could have dropped them: for a production `A → α`
    /// and any subset of `α`'s nullable positions, emit `A → α'` (`α` with
    /// that subset deleted) weighted by the original weight times each
    /// dropped symbol's nullable weight. The start symbol's own capacity to
    /// derive `ε` is preserved by always emitting `S → ε` weighted by
    /// `nullable_weights(S)` — unconditionally, even when that weight is
    /// `zero`, matching the always-emit default in the source this crate is
    /// grounded on. [`Transformer::nullary_remove_conditional`] is the
    /// alternative that skips the emission when the weight is `zero`.
    pub fn nullary_remove<R: Semiring>(&mut self, g: &Wcfg<R>) -> Wcfg<R> {
        self.nullary_remove_impl(g, true)
    }

    /// As [`Transformer::nullary_remove`], but omits the trailing `S → ε`
    /// production when the start symbol's nullable weight is `zero`.
    pub fn nullary_remove_conditional<R: Semiring>(&mut self, g: &Wcfg<R>) -> Wcfg<R> {
        self.nullary_remove_impl(g, false)
    }

    fn nullary_remove_impl<R: Semiring>(&mut self, g: &Wcfg<R>, unconditional: bool) -> Wcfg<R> {
        tracing::debug!(productions = g.num_productions(), unconditional, "removing epsilon productions");
        let nullable = Self::nullable_weights(g);
        let mut out: Wcfg<R> = Wcfg::new(g.start());

        for (lhs, rhs, w) in g.productions() {
            let real: Vec<CfgSym> =
                rhs.iter().filter(|s| !matches!(s, CfgSym::Term(t) if t.is_epsilon())).cloned().collect();
            let nullable_positions: Vec<bool> = real
                .iter()
                .map(|s| matches!(s, CfgSym::NonTerm(n) if nullable.get(n.as_str()).map(|v| *v != R::zero()).unwrap_or(false)))
                .collect();
            let n = real.len();
            for mask in 0u32..(1u32 << n) {
                let mut rhs_prime: Vec<CfgSym> = Vec::new();
                let mut wprime = w.clone();
                for (i, sym) in real.iter().enumerate() {
                    let drop = nullable_positions[i] && (mask & (1 << i)) != 0;
                    if drop {
                        if let CfgSym::NonTerm(name) = sym {
                            wprime = wprime.times(&nullable[name]);
                        }
                    } else {
                        rhs_prime.push(sym.clone());
                    }
                }
                if rhs_prime.is_empty() {
                    // This combination derives ε entirely; the start
                    // symbol's ε-capacity is handled separately below, and
                    // non-start ε productions are simply not re-emitted.
                    continue;
                }
                out.add(lhs.to_string(), rhs_prime, wprime);
            }
        }

        let s_weight = nullable.get(g.start()).cloned().unwrap_or_else(R::zero);
        if unconditional || s_weight != R::zero() {
            out.add(g.start().to_string(), Vec::new(), s_weight);
        }

        out
    }

    /// Collapse unary chains `A → B → C → ...` into direct productions: the
    /// unary productions (`rhs` a single nonterminal) form a one-symbol
    /// automaton over states named for nonterminals; its Lehmann closure
    /// `U[A][B]` gives the total weight of every unary chain from `A` to
    /// `B` (including the identity chain: `U[A][A]` is at least `one`). Every
    /// non-unary production `B → α` weighted `w` is then re-derived as
    /// `A → α` weighted `U[A][B] ⊗ w` for every `A` with nonzero `U[A][B]`.
    pub fn unary_remove<R: Semiring + Closed>(
        &mut self,
        g: &Wcfg<R>,
    ) -> Result<Wcfg<R>, crate::semiring::SemiringError> {
        tracing::debug!(productions = g.num_productions(), "collapsing unary chains");
        let nonterminals: Vec<String> = g.nonterminals().map(str::to_string).collect();
        let mut by_name: BTreeMap<String, State> = BTreeMap::new();
        let mut unary_fsa: Fsa<R> = Fsa::new();
        for n in &nonterminals {
            let s = unary_fsa.fresh_state_labeled(n.clone());
            by_name.insert(n.clone(), s);
        }

        for (lhs, rhs, w) in g.productions() {
            if let [CfgSym::NonTerm(rhs_nt)] = rhs {
                unary_fsa.add_arc(
                    by_name[lhs].clone(),
                    Sym::sym(rhs_nt.as_str()),
                    by_name[rhs_nt].clone(),
                    w,
                );
            }
        }

        let closure = crate::pathsum::lehmann(&unary_fsa).map_err(|e| match e {
            crate::pathsum::PathsumError::Semiring(s) => s,
            _ => crate::semiring::SemiringError::DivergentClosure,
        })?;

        let mut out: Wcfg<R> = Wcfg::new(g.start());
        for (b, rhs, w) in g.productions() {
            if matches!(rhs, [CfgSym::NonTerm(_)]) {
                continue;
            }
            for a in &nonterminals {
                let u = closure[&(by_name[a].clone(), by_name[b].clone())].clone();
                if u == R::zero() {
                    continue;
                }
                out.add(a.clone(), rhs.to_vec(), u.times(&w));
            }
        }

        Ok(out)
    }

    /// Replace `rhs[range]` with a fresh nonterminal `X` that derives it:
    /// adds `X → rhs[range]` weighted `one` to `g` and returns `(X, rhs')`
    /// with the range collapsed to `CfgSym::NonTerm(X)`. The binarization
    /// primitive: folding off one symbol at a time from a long right-hand
    /// side turns it into a chain of fresh binary productions.
    pub fn fold<R: Semiring>(&mut self, g: &mut Wcfg<R>, rhs: &[CfgSym], range: std::ops::Range<usize>) -> (String, Vec<CfgSym>) {
        let x = self.fresh_nonterminal();
        g.add(x.clone(), rhs[range.clone()].to_vec(), R::one());
        let mut rhs_prime: Vec<CfgSym> = rhs[..range.start].to_vec();
        rhs_prime.push(CfgSym::nt(x.clone()));
        rhs_prime.extend_from_slice(&rhs[range.end..]);
        (x, rhs_prime)
    }

    /// Replace every terminal appearing alongside another symbol with a
    /// fresh nonterminal that derives just that terminal: a production
    /// `A → a` (a lone terminal) is left as-is, but `A → a B` becomes
    /// `A → @k B`, `@k → a`, since CNF only allows a bare terminal on a
    /// unit right-hand side.
    pub fn separate_terminals<R: Semiring>(&mut self, g: &Wcfg<R>) -> Wcfg<R> {
        let mut out: Wcfg<R> = Wcfg::new(g.start());
        let mut terminal_nt: BTreeMap<Sym, String> = BTreeMap::new();
        for (lhs, rhs, w) in g.productions() {
            if rhs.len() <= 1 {
                out.add(lhs.to_string(), rhs.to_vec(), w);
                continue;
            }
            let mut rhs_prime = Vec::with_capacity(rhs.len());
            for sym in rhs {
                match sym {
                    CfgSym::Term(t) if !t.is_epsilon() => {
                        let nt = terminal_nt.entry(t.clone()).or_insert_with(|| self.fresh_nonterminal());
                        out.add(nt.clone(), vec![CfgSym::Term(t.clone())], R::one());
                        rhs_prime.push(CfgSym::nt(nt.clone()));
                    }
                    other => rhs_prime.push(other.clone()),
                }
            }
            out.add(lhs.to_string(), rhs_prime, w);
        }
        out
    }

    /// Binarize every production with more than two symbols on its
    /// right-hand side, left-associatively: `A → X1 X2 X3 X4` becomes
    /// `A → X1 @0`, `@0 → X2 @1`, `@1 → X3 X4`, folding off the leftmost
    /// symbol one at a time into a chain of fresh binary productions (the
    /// same idea [`Transformer::fold`] names, applied iteratively).
    pub fn binarize<R: Semiring>(&mut self, g: &Wcfg<R>) -> Wcfg<R> {
        let mut out: Wcfg<R> = Wcfg::new(g.start());
        for (lhs, rhs, w) in g.productions() {
            if rhs.len() <= 2 {
                out.add(lhs.to_string(), rhs.to_vec(), w);
                continue;
            }
            let mut current_lhs = lhs.to_string();
            let mut remaining = rhs.to_vec();
            let mut first = true;
            while remaining.len() > 2 {
                let tail_start = 1;
                let x = self.fresh_nonterminal();
                let tail = remaining[tail_start..].to_vec();
                let head = remaining[0].clone();
                let production_weight = if first { w.clone() } else { R::one() };
                out.add(current_lhs.clone(), vec![head, CfgSym::nt(x.clone())], production_weight);
                current_lhs = x;
                remaining = tail;
                first = false;
            }
            let last_weight = if first { w } else { R::one() };
            out.add(current_lhs, remaining, last_weight);
        }
        out
    }

    /// Drop nonterminals unreachable from the start symbol or incapable of
    /// deriving any terminal string (`treesum` value `zero`) — the WCFG
    /// analogue of [`crate::fsa::Fsa::trim`].
    pub fn trim<R: Semiring>(&mut self, g: &Wcfg<R>) -> Wcfg<R> {
        let productive: BTreeSet<String> = treesum::inside_values(g)
            .into_iter()
            .filter(|(_, v)| *v != R::zero())
            .map(|(n, _)| n)
            .collect();

        let mut reachable: BTreeSet<String> = BTreeSet::new();
        let mut frontier = vec![g.start().to_string()];
        reachable.insert(g.start().to_string());
        while let Some(n) = frontier.pop() {
            for (rhs, _) in g.productions_for(&n) {
                for sym in rhs {
                    if let CfgSym::NonTerm(m) = sym {
                        if reachable.insert(m.clone()) {
                            frontier.push(m.clone());
                        }
                    }
                }
            }
        }

        let keep: BTreeSet<String> = reachable.intersection(&productive).cloned().collect();
        let mut out: Wcfg<R> = Wcfg::new(g.start());
        for (lhs, rhs, w) in g.productions() {
            if !keep.contains(lhs) {
                continue;
            }
            if rhs.iter().any(|s| matches!(s, CfgSym::NonTerm(n) if !keep.contains(n))) {
                continue;
            }
            out.add(lhs.to_string(), rhs.to_vec(), w);
        }
        out
    }

    /// The full Chomsky normal form pipeline: separate terminals out of
    /// mixed right-hand sides, remove `ε`-productions, collapse unary
    /// chains, binarize, then trim unreachable/unproductive nonterminals.
    pub fn cnf<R: Semiring + Closed>(&mut self, g: &Wcfg<R>) -> Result<Wcfg<R>, crate::semiring::SemiringError> {
        tracing::debug!(productions = g.num_productions(), "converting to Chomsky normal form");
        let g = self.separate_terminals(g);
        let g = self.nullary_remove(&g);
        let g = self.unary_remove(&g)?;
        let g = self.binarize(&g);
        Ok(self.trim(&g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::{Boolean, Real};

    #[test]
    fn nullary_remove_redistributes_epsilon_weight() {
        let mut g: Wcfg<Real> = Wcfg::new("S");
        g.add("S", vec![CfgSym::nt("A"), CfgSym::term("b")], Real(1.0));
        g.add("A", vec![], Real(0.5));
        let mut t = Transformer::new();
        let out = t.nullary_remove(&g);
        assert!(out.productions_for("S").any(|(rhs, w)| rhs == [CfgSym::term("b")][..] && w == Real(0.5)));
        assert!(out.productions_for("A").next().is_none());
    }

    #[test]
    fn unary_remove_collapses_chain() {
        let mut g: Wcfg<Boolean> = Wcfg::new("S");
        g.add("S", vec![CfgSym::nt("A")], Boolean(true));
        g.add("A", vec![CfgSym::nt("B")], Boolean(true));
        g.add("B", vec![CfgSym::term("x")], Boolean(true));
        let mut t = Transformer::new();
        let out = t.unary_remove(&g).unwrap();
        assert!(out.productions_for("S").any(|(rhs, w)| rhs == [CfgSym::term("x")][..] && w == Boolean(true)));
        assert!(out.productions_for("A").next().is_some());
    }

    #[test]
    fn binarize_shrinks_long_productions() {
        let mut g: Wcfg<Boolean> = Wcfg::new("S");
        g.add(
            "S",
            vec![CfgSym::term("a"), CfgSym::term("b"), CfgSym::term("c"), CfgSym::term("d")],
            Boolean(true),
        );
        let mut t = Transformer::new();
        let out = t.binarize(&g);
        assert!(out.productions().all(|(_, rhs, _)| rhs.len() <= 2));
        assert_eq!(treesum::treesum(&out), treesum::treesum(&g));
    }

    #[test]
    fn cnf_preserves_treesum_on_boolean_recognizer() {
        let mut g: Wcfg<Boolean> = Wcfg::new("S");
        g.add("S", vec![CfgSym::nt("A"), CfgSym::term("b"), CfgSym::term("c")], Boolean(true));
        g.add("A", vec![CfgSym::term("a")], Boolean(true));
        let mut t = Transformer::new();
        let out = t.cnf(&g).unwrap();
        assert_eq!(treesum::treesum(&out), Boolean(true));
        assert!(out.productions().all(|(_, rhs, _)| rhs.len() <= 2));
    }

    #[test]
    fn fold_collapses_a_range_into_a_fresh_nonterminal() {
        let mut g: Wcfg<Boolean> = Wcfg::new("S");
        let rhs = vec![CfgSym::term("a"), CfgSym::term("b"), CfgSym::term("c")];
        let mut t = Transformer::new();
        let (x, rhs_prime) = t.fold(&mut g, &rhs, 1..3);
        assert_eq!(rhs_prime, vec![CfgSym::term("a"), CfgSym::nt(x.clone())]);
        assert!(g.productions_for(&x).any(|(r, w)| r == [CfgSym::term("b"), CfgSym::term("c")][..] && w == Boolean(true)));
    }

    #[test]
    fn trim_drops_unreachable_nonterminals() {
        let mut g: Wcfg<Boolean> = Wcfg::new("S");
        g.add("S", vec![CfgSym::term("a")], Boolean(true));
        g.add("Dead", vec![CfgSym::term("z")], Boolean(true));
        let mut t = Transformer::new();
        let out = t.trim(&g);
        assert!(out.productions_for("Dead").next().is_none());
        assert!(out.productions_for("S").next().is_some());
    }
}
