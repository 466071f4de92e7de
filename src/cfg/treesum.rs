//! Treesum: `value(A) = ⊕_{A→α, weight w} w ⊗ ⊗_{X ∈ α} value(X)`,
//! `value(terminal) = one`, and `treesum(G) = value(S)` — the least
//! fixed point of the production system, summing every derivation tree's
//! weight.
//!
//! When the nonterminal dependency graph is acyclic, `value` is computed
//! exactly in one bottom-up pass. A cyclic grammar (some nonterminal
//! reachable from itself) needs relaxation to a fixpoint instead; this
//! converges in at most `|V|` rounds for an idempotent semiring (the same
//! bound Bellman-Ford uses), and is run for that many rounds regardless —
//! for a non-idempotent semiring with a genuinely cyclic grammar the true
//! value is an infinite series and this is a bounded approximation, not an
//! exact answer.

use std::collections::{BTreeMap, BTreeSet};

use crate::semiring::Semiring;

use super::{CfgSym, Wcfg};

fn nonterminal_deps<R: Semiring>(g: &Wcfg<R>) -> BTreeMap<String, BTreeSet<String>> {
    let mut deps: BTreeMap<String, BTreeSet<String>> =
        g.nonterminals().map(|n| (n.to_string(), BTreeSet::new())).collect();
    for (lhs, rhs, _) in g.productions() {
        for sym in rhs {
            if let CfgSym::NonTerm(n) = sym {
                deps.get_mut(lhs).unwrap().insert(n.clone());
            }
        }
    }
    deps
}

fn is_acyclic(deps: &BTreeMap<String, BTreeSet<String>>) -> bool {
    // Iterative DFS cycle check (white/gray/black) over the nonterminal
    // dependency graph.
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut color: BTreeMap<&str, Color> = deps.keys().map(|k| (k.as_str(), Color::White)).collect();
    for start in deps.keys() {
        if color[start.as_str()] != Color::White {
            continue;
        }
        let mut stack: Vec<(&str, Vec<&str>, usize)> = Vec::new();
        color.insert(start, Color::Gray);
        let succs: Vec<&str> = deps[start].iter().map(String::as_str).collect();
        stack.push((start, succs, 0));
        while let Some((node, succs, pos)) = stack.last_mut() {
            if *pos < succs.len() {
                let next = succs[*pos];
                *pos += 1;
                match color[next] {
                    Color::Gray => return false,
                    Color::Black => {}
                    Color::White => {
                        color.insert(next, Color::Gray);
                        let next_succs: Vec<&str> = deps[next].iter().map(String::as_str).collect();
                        stack.push((next, next_succs, 0));
                    }
                }
            } else {
                color.insert(node, Color::Black);
                stack.pop();
            }
        }
    }
    true
}

fn production_value<R: Semiring>(rhs: &[CfgSym], value: &BTreeMap<String, R>) -> R {
    rhs.iter().fold(R::one(), |acc, sym| match sym {
        CfgSym::NonTerm(n) => acc.times(value.get(n).unwrap_or(&R::zero())),
        CfgSym::Term(_) => acc,
    })
}

/// `value(A)` for every nonterminal `A`.
pub fn inside_values<R: Semiring>(g: &Wcfg<R>) -> BTreeMap<String, R> {
    let deps = nonterminal_deps(g);
    let mut value: BTreeMap<String, R> = deps.keys().map(|n| (n.clone(), R::zero())).collect();

    if is_acyclic(&deps) {
        // Topological order via DFS finishing order over the dependency
        // graph — leaves (nonterminals with no nonterminal dependencies
        // left unresolved) settle first.
        let mut order: Vec<String> = Vec::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();
        for n in deps.keys() {
            if visited.contains(n) {
                continue;
            }
            let mut stack: Vec<(String, Vec<String>, usize)> = Vec::new();
            visited.insert(n.clone());
            let succs: Vec<String> = deps[n].iter().cloned().collect();
            stack.push((n.clone(), succs, 0));
            while let Some((node, succs, pos)) = stack.last_mut() {
                if *pos < succs.len() {
                    let next = succs[*pos].clone();
                    *pos += 1;
                    if !visited.contains(&next) {
                        visited.insert(next.clone());
                        let next_succs: Vec<String> = deps[&next].iter().cloned().collect();
                        stack.push((next, next_succs, 0));
                    }
                } else {
                    order.push(node.clone());
                    stack.pop();
                }
            }
        }
        for n in &order {
            let mut v = R::zero();
            for (rhs, w) in g.productions_for(n) {
                v = v.plus(&w.times(&production_value(rhs, &value)));
            }
            value.insert(n.clone(), v);
        }
    } else {
        let rounds = deps.len() + 1;
        for _ in 0..rounds {
            let snapshot = value.clone();
            for n in deps.keys() {
                let mut v = R::zero();
                for (rhs, w) in g.productions_for(n) {
                    v = v.plus(&w.times(&production_value(rhs, &snapshot)));
                }
                value.insert(n.clone(), v);
            }
        }
    }

    value
}

/// `treesum(G) = value(S)`.
pub fn treesum<R: Semiring>(g: &Wcfg<R>) -> R {
    inside_values(g).remove(g.start()).unwrap_or_else(R::zero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::{Boolean, Real};

    #[test]
    fn acyclic_grammar_sums_alternatives() {
        let mut g: Wcfg<Real> = Wcfg::new("S");
        g.add("S", vec![CfgSym::term("a")], Real(0.4));
        g.add("S", vec![CfgSym::term("b")], Real(0.6));
        assert_eq!(treesum(&g), Real(1.0));
    }

    #[test]
    fn nested_nonterminals_multiply() {
        let mut g: Wcfg<Real> = Wcfg::new("S");
        g.add("S", vec![CfgSym::nt("A"), CfgSym::nt("A")], Real(1.0));
        g.add("A", vec![CfgSym::term("a")], Real(0.5));
        assert_eq!(treesum(&g), Real(0.25));
    }

    #[test]
    fn recognizer_grammar_is_boolean_reachability() {
        let mut g: Wcfg<Boolean> = Wcfg::new("S");
        g.add("S", vec![CfgSym::nt("A")], Boolean(true));
        g.add("A", vec![CfgSym::term("a")], Boolean(true));
        assert_eq!(treesum(&g), Boolean(true));
    }
}
