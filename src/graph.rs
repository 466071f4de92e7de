//! Graph utilities shared by the Pathsum engine and the rational
//! constructions: DFS-based cycle detection and topological order, and
//! Kosaraju's strongly-connected-components decomposition.
//!
//! DFS and Kosaraju are specified recursively in the source this crate is
//! grounded on; both are reimplemented here with an explicit stack so large
//! automata don't blow the call stack.

use std::collections::{BTreeMap, BTreeSet};

use crate::fsa::Fsa;
use crate::semiring::Semiring;
use crate::state::State;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// DFS from the automaton's initial states, classifying whether a back-edge
/// (cycle) was found and recording each visited state's finishing order.
///
/// Matches the convention that only states reachable from `I` participate —
/// [`acyclic`] and [`toposort`] below inherit this scope, consistent with
/// the source this crate is grounded on.
fn dfs_from_initials<R: Semiring>(fsa: &Fsa<R>) -> (bool, Vec<State>) {
    let mut color: BTreeMap<State, Color> = BTreeMap::new();
    let mut finish: Vec<State> = Vec::new();
    let mut cyclic = false;

    // Explicit-stack DFS: frames hold (node, iterator position over its
    // already-materialized successor list).
    for (q, _) in fsa.initials() {
        if matches!(color.get(&q), Some(Color::Black)) {
            continue;
        }
        let mut stack: Vec<(State, Vec<State>, usize)> = Vec::new();
        color.insert(q.clone(), Color::Gray);
        stack.push((q.clone(), successors(fsa, &q), 0));

        while let Some((node, succs, pos)) = stack.last_mut() {
            if *pos < succs.len() {
                let next = succs[*pos].clone();
                *pos += 1;
                match color.get(&next) {
                    Some(Color::Gray) => cyclic = true,
                    Some(Color::Black) => {}
                    _ => {
                        color.insert(next.clone(), Color::Gray);
                        let next_succs = successors(fsa, &next);
                        stack.push((next, next_succs, 0));
                    }
                }
            } else {
                color.insert(node.clone(), Color::Black);
                finish.push(node.clone());
                stack.pop();
            }
        }
    }

    (cyclic, finish)
}

fn successors<R: Semiring>(fsa: &Fsa<R>, q: &State) -> Vec<State> {
    fsa.arcs(q).map(|(_, j, _)| j).collect()
}

/// True iff no cycle is reachable from an initial state.
pub fn acyclic<R: Semiring>(fsa: &Fsa<R>) -> bool {
    !dfs_from_initials(fsa).0
}

/// Errors raised by graph queries with a structural precondition.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// [`toposort`] was called on a cyclic automaton.
    #[error("toposort requires an acyclic automaton")]
    NotAcyclic,
}

/// Topological order (states reachable from `I`), or its reverse.
///
/// A topological order is the reverse of DFS finishing order.
pub fn toposort<R: Semiring>(fsa: &Fsa<R>, rev: bool) -> Result<Vec<State>, GraphError> {
    let (cyclic, mut finish) = dfs_from_initials(fsa);
    if cyclic {
        return Err(GraphError::NotAcyclic);
    }
    if !rev {
        finish.reverse();
    }
    Ok(finish)
}

/// BFS reachability from the initial states.
pub fn accessible<R: Semiring>(fsa: &Fsa<R>) -> BTreeSet<State> {
    let mut visited = BTreeSet::new();
    let mut queue: std::collections::VecDeque<State> =
        fsa.initials().map(|(q, _)| q).collect();
    while let Some(i) = queue.pop_front() {
        if !visited.insert(i.clone()) {
            continue;
        }
        for (_, j, _) in fsa.arcs(&i) {
            if !visited.contains(&j) {
                queue.push_back(j);
            }
        }
    }
    visited
}

/// `coaccessible(F) = accessible(reverse(F))`.
pub fn coaccessible<R: Semiring>(fsa: &Fsa<R>) -> BTreeSet<State> {
    accessible(&fsa.reverse())
}

/// Kosaraju's algorithm: strongly-connected components, returned in forward
/// topological order over the condensation graph (so the *reverse* of this
/// order is the right one for backward propagation, as
/// [`crate::pathsum::Pathsum::decomposed_lehmann_bwd`] does explicitly).
///
/// Runs in `O(V + E)` using two explicit-stack DFS passes.
pub fn scc<R: Semiring>(fsa: &Fsa<R>) -> Vec<BTreeSet<State>> {
    // Pass 1: finishing order over the whole graph (not just from I).
    let mut visited: BTreeSet<State> = BTreeSet::new();
    let mut finish_stack: Vec<State> = Vec::new();

    for q in fsa.states() {
        if visited.contains(q) {
            continue;
        }
        let mut stack: Vec<(State, Vec<State>, usize)> = Vec::new();
        visited.insert(q.clone());
        stack.push((q.clone(), successors(fsa, q), 0));

        while let Some((node, succs, pos)) = stack.last_mut() {
            if *pos < succs.len() {
                let next = succs[*pos].clone();
                *pos += 1;
                if !visited.contains(&next) {
                    visited.insert(next.clone());
                    let next_succs = successors(fsa, &next);
                    stack.push((next, next_succs, 0));
                }
            } else {
                finish_stack.push(node.clone());
                stack.pop();
            }
        }
    }

    // Pass 2: DFS on the reverse graph, popping the finishing stack so each
    // root spawns one component.
    let rev = fsa.reverse();
    let mut component: BTreeMap<State, State> = BTreeMap::new();

    while let Some(q) = finish_stack.pop() {
        if component.contains_key(&q) {
            continue;
        }
        let root = q.clone();
        let mut stack = vec![q.clone()];
        component.insert(q, root.clone());
        while let Some(u) = stack.pop() {
            for (_, v, _) in rev.arcs(&u) {
                if !component.contains_key(&v) {
                    component.insert(v.clone(), root.clone());
                    stack.push(v);
                }
            }
        }
    }

    let mut sccs: BTreeMap<State, BTreeSet<State>> = BTreeMap::new();
    for (q, root) in &component {
        sccs.entry(root.clone()).or_default().insert(q.clone());
    }

    // Toposort the condensation graph by in-degree (Kahn's algorithm) so
    // components come back source-first.
    let mut g: BTreeMap<State, BTreeSet<State>> = BTreeMap::new();
    let mut indeg: BTreeMap<State, usize> = BTreeMap::new();
    for root in sccs.keys() {
        g.insert(root.clone(), BTreeSet::new());
        indeg.insert(root.clone(), 0);
    }
    for u in fsa.states() {
        for (_, v, _) in fsa.arcs(u) {
            let cu = &component[u];
            let cv = &component[&v];
            if cu != cv && g.get_mut(cu).unwrap().insert(cv.clone()) {
                *indeg.get_mut(cv).unwrap() += 1;
            }
        }
    }

    let mut ready: Vec<State> = indeg.iter().filter(|(_, d)| **d == 0).map(|(c, _)| c.clone()).collect();
    let mut result = Vec::new();
    while let Some(cu) = ready.pop() {
        result.push(sccs[&cu].clone());
        for cv in &g[&cu] {
            let d = indeg.get_mut(cv).unwrap();
            *d -= 1;
            if *d == 0 {
                ready.push(cv.clone());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Tropical;
    use crate::symbol::Sym;

    fn cyclic_fsa() -> Fsa<Tropical> {
        let mut fsa = Fsa::new();
        fsa.set_i(State::new(0), None);
        fsa.add_arc(State::new(0), Sym::sym("a"), State::new(1), Tropical(1.0));
        fsa.add_arc(State::new(1), Sym::sym("b"), State::new(0), Tropical(1.0));
        fsa.set_f(State::new(1), None);
        fsa
    }

    fn acyclic_fsa() -> Fsa<Tropical> {
        let mut fsa = Fsa::new();
        fsa.set_i(State::new(0), None);
        fsa.add_arc(State::new(0), Sym::sym("a"), State::new(1), Tropical(1.0));
        fsa.add_arc(State::new(1), Sym::sym("b"), State::new(2), Tropical(1.0));
        fsa.set_f(State::new(2), None);
        fsa
    }

    #[test]
    fn detects_cycle() {
        assert!(!acyclic(&cyclic_fsa()));
        assert!(acyclic(&acyclic_fsa()));
    }

    #[test]
    fn toposort_rejects_cyclic() {
        assert!(toposort(&cyclic_fsa(), false).is_err());
        assert!(toposort(&acyclic_fsa(), false).is_ok());
    }

    #[test]
    fn scc_merges_the_cycle() {
        let sccs = scc(&cyclic_fsa());
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), 2);
    }

    #[test]
    fn scc_is_trivial_on_acyclic_fsa() {
        let sccs = scc(&acyclic_fsa());
        assert_eq!(sccs.len(), 3);
        assert!(sccs.iter().all(|c| c.len() == 1));
    }
}
